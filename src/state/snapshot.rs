//! Read-only view of the timer for rendering

use serde::{Deserialize, Serialize};

use super::{
    preset::PresetKey,
    time_editor::TimeEditor,
    timer_state::{Phase, TimerEngine},
};

/// Everything a presentation layer needs to draw the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub display_minutes: u64,
    /// Always two digits
    pub display_seconds: String,
    /// `m:ss`
    pub display: String,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_editing: bool,
    /// The edit field contents while editing
    pub edit_display: Option<String>,
    pub phase: Phase,
    pub active_preset: PresetKey,
    pub label: String,
    pub accent_color: String,
    pub button_color: String,
}

impl Snapshot {
    pub fn capture(engine: &TimerEngine, editor: &TimeEditor) -> Self {
        let remaining = engine.remaining_seconds();
        let display_minutes = remaining / 60;
        let display_seconds = format!("{:02}", remaining % 60);
        let preset = engine.preset();

        Self {
            display: format!("{}:{}", display_minutes, display_seconds),
            display_minutes,
            display_seconds,
            remaining_seconds: remaining,
            is_running: engine.is_running(),
            is_editing: editor.is_editing(),
            edit_display: editor.buffer().map(|buffer| buffer.display()),
            phase: engine.phase(),
            active_preset: preset.key,
            label: preset.label.clone(),
            accent_color: preset.accent_color.clone(),
            button_color: preset.button_color.clone(),
        }
    }
}
