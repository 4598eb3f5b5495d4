//! Timer presets and the preset table

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::TimerError;

/// Longest preset duration whose length in seconds still fits in a `u64`
pub const MAX_PRESET_MINUTES: u64 = u64::MAX / 60;

/// Keys of the three fixed presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PresetKey {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl PresetKey {
    /// Parse a preset key, rejecting anything that is not one of the three presets
    pub fn parse(key: &str) -> Result<Self, TimerError> {
        Self::from_str(key).map_err(|_| TimerError::invalid(format!("unknown preset key: {key:?}")))
    }
}

/// A named timer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub key: PresetKey,
    pub duration_minutes: u64,
    pub label: String,
    pub accent_color: String,
    pub button_color: String,
}

impl Preset {
    pub fn pomodoro(duration_minutes: u64) -> Self {
        Self {
            key: PresetKey::Pomodoro,
            duration_minutes,
            label: "Pomodoro".to_string(),
            accent_color: "#B0C5A4".to_string(),
            button_color: "#79ab5bff".to_string(),
        }
    }

    pub fn short_break(duration_minutes: u64) -> Self {
        Self {
            key: PresetKey::ShortBreak,
            duration_minutes,
            label: "Short Break".to_string(),
            accent_color: "#f1b85dff".to_string(),
            button_color: "#ec9100ff".to_string(),
        }
    }

    pub fn long_break(duration_minutes: u64) -> Self {
        Self {
            key: PresetKey::LongBreak,
            duration_minutes,
            label: "Long Break".to_string(),
            accent_color: "#ca5f5fff".to_string(),
            button_color: "#aa1818ff".to_string(),
        }
    }

    /// Full duration of this preset in seconds
    pub fn duration_seconds(&self) -> u64 {
        self.duration_minutes.saturating_mul(60)
    }
}

/// The immutable set of presets, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presets {
    pomodoro: Preset,
    short_break: Preset,
    long_break: Preset,
}

impl Presets {
    pub fn new(pomodoro_minutes: u64, short_break_minutes: u64, long_break_minutes: u64) -> Self {
        Self {
            pomodoro: Preset::pomodoro(pomodoro_minutes),
            short_break: Preset::short_break(short_break_minutes),
            long_break: Preset::long_break(long_break_minutes),
        }
    }

    pub fn get(&self, key: PresetKey) -> &Preset {
        match key {
            PresetKey::Pomodoro => &self.pomodoro,
            PresetKey::ShortBreak => &self.short_break,
            PresetKey::LongBreak => &self.long_break,
        }
    }

    /// Presets in display order
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        PresetKey::iter().map(move |key| self.get(key))
    }
}

impl Default for Presets {
    fn default() -> Self {
        Self::new(25, 5, 15)
    }
}
