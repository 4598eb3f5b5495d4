//! External service management module
//!
//! This module contains the alarm playback collaborator. Audio is produced by
//! an external player process; the timer only decides when it plays.

pub mod alarm;

// Re-export main types
pub use alarm::*;
