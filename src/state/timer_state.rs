//! Timer state and the countdown engine

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TimerError;

use super::preset::{Preset, PresetKey, Presets};

/// Countdown state of record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub active_preset: PresetKey,
    pub remaining_seconds: u64,
    pub is_running: bool,
}

impl TimerState {
    /// Create a paused timer at the full duration of a preset
    pub fn for_preset(preset: &Preset) -> Self {
        Self {
            active_preset: preset.key,
            remaining_seconds: preset.duration_seconds(),
            is_running: false,
        }
    }
}

/// Derived phase of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Paused, at any remaining value
    Idle,
    Running,
    /// Still marked running but at zero; the alarm is ringing
    Expired,
}

/// Signals the engine wants its owner to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown reached zero while running. Start the alarm.
    Expired,
    /// Left the expired phase. Stop the alarm.
    Silenced,
}

/// Countdown engine over a fixed preset table
#[derive(Debug, Clone)]
pub struct TimerEngine {
    presets: Presets,
    state: TimerState,
    /// Latched on entry to the expired phase so the event fires once
    alarm_active: bool,
}

impl TimerEngine {
    pub fn new(presets: Presets, initial: PresetKey) -> Self {
        let state = TimerState::for_preset(presets.get(initial));
        Self {
            presets,
            state,
            alarm_active: false,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    /// The active preset
    pub fn preset(&self) -> &Preset {
        self.presets.get(self.state.active_preset)
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn is_alarm_active(&self) -> bool {
        self.alarm_active
    }

    pub fn phase(&self) -> Phase {
        match (self.state.is_running, self.alarm_active) {
            (false, _) => Phase::Idle,
            (true, true) => Phase::Expired,
            (true, false) => Phase::Running,
        }
    }

    /// Switch to another preset, pausing at its full duration
    pub fn select_preset(&mut self, key: &str) -> Result<Option<TimerEvent>, TimerError> {
        let key = PresetKey::parse(key)?;
        self.state = TimerState::for_preset(self.presets.get(key));
        info!("Selected preset {} ({}s)", key, self.state.remaining_seconds);
        Ok(self.silence())
    }

    /// Toggle the countdown.
    ///
    /// Resuming from zero restarts at the full preset duration. While expired
    /// this silences the alarm and restarts the countdown instead of pausing.
    pub fn start_stop(&mut self) -> Option<TimerEvent> {
        if self.alarm_active {
            self.state.remaining_seconds = self.preset().duration_seconds();
            info!("Alarm acknowledged, restarting countdown at {}s", self.state.remaining_seconds);
            return self.silence();
        }

        if self.state.is_running {
            self.state.is_running = false;
            info!("Countdown paused at {}s", self.state.remaining_seconds);
        } else {
            if self.state.remaining_seconds == 0 {
                self.state.remaining_seconds = self.preset().duration_seconds();
            }
            self.state.is_running = true;
            info!("Countdown started at {}s", self.state.remaining_seconds);
        }
        None
    }

    /// Pause at the full duration of the active preset
    pub fn reset(&mut self) -> Option<TimerEvent> {
        self.state.remaining_seconds = self.preset().duration_seconds();
        self.state.is_running = false;
        info!("Countdown reset to {}s", self.state.remaining_seconds);
        self.silence()
    }

    /// Add time, regardless of run state. There is no upper bound.
    pub fn increment(&mut self, seconds: i64) -> Result<Option<TimerEvent>, TimerError> {
        if seconds <= 0 {
            return Err(TimerError::invalid(format!("increment must be positive, got {seconds}")));
        }
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_add(seconds.unsigned_abs());
        debug!("Added {}s, remaining {}s", seconds, self.state.remaining_seconds);
        Ok(self.silence_if_nonzero())
    }

    /// Replace the remaining time without touching the run status
    pub fn set_absolute(&mut self, total_seconds: u64) -> Option<TimerEvent> {
        self.state.remaining_seconds = total_seconds;
        debug!("Remaining time set to {}s", self.state.remaining_seconds);
        self.silence_if_nonzero()
    }

    /// Advance the countdown by one second.
    ///
    /// Emits `Expired` once on entry to the expired phase; further ticks at
    /// zero are no-ops until something leaves that phase.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.state.is_running {
            return None;
        }

        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
        }

        if self.state.remaining_seconds == 0 && !self.alarm_active {
            self.alarm_active = true;
            info!("Countdown expired for preset {}", self.state.active_preset);
            return Some(TimerEvent::Expired);
        }
        None
    }

    fn silence(&mut self) -> Option<TimerEvent> {
        if std::mem::take(&mut self.alarm_active) {
            Some(TimerEvent::Silenced)
        } else {
            None
        }
    }

    fn silence_if_nonzero(&mut self) -> Option<TimerEvent> {
        if self.state.remaining_seconds > 0 {
            self.silence()
        } else {
            None
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Presets::default(), PresetKey::Pomodoro)
    }
}
