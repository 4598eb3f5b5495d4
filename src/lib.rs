//! Pomodoro Clock - a local Pomodoro countdown daemon
//!
//! This library provides the countdown engine, the manual time editor, the
//! key-to-action mapping and the HTTP surface that front ends drive it through.

pub mod config;
pub mod error;
pub mod state;
pub mod input;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use input::Action;
pub use state::{AppState, Snapshot, TimeEditor, TimerEngine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
