//! State management module
//!
//! This module contains the countdown engine, the time editor and the shared
//! application state that serializes access to them.

pub mod preset;
pub mod timer_state;
pub mod time_editor;
pub mod snapshot;
pub mod app_state;

// Re-export main types
pub use preset::{Preset, PresetKey, Presets};
pub use timer_state::{Phase, TimerEngine, TimerEvent, TimerState};
pub use time_editor::{EditBuffer, TimeEditor};
pub use snapshot::Snapshot;
pub use app_state::{AlarmCommand, AppState, Schedule};
