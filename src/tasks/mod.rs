//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod alarm;
pub mod countdown;

// Re-export main functions
pub use alarm::alarm_task;
pub use countdown::{countdown_task, TICK_PERIOD};
