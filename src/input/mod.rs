//! Input module
//!
//! This module contains the typed action stream the timer consumes and the
//! mapping from key presses to actions.

pub mod actions;

// Re-export main types
pub use actions::{Action, INCREMENT_STEPS};
