//! Main application state management

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::{error::TimerError, input::Action};
use super::{PresetKey, Presets, Snapshot, TimeEditor, TimerEngine, TimerEvent};

/// What the alarm player should be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmCommand {
    Play,
    Stop,
}

/// Countdown schedule published to the countdown task.
///
/// A new epoch means any running interval must be dropped and, if `running`,
/// replaced by a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub running: bool,
    pub epoch: u64,
}

/// Engine and editor, mutated together under one lock
#[derive(Debug)]
struct Clock {
    engine: TimerEngine,
    editor: TimeEditor,
}

impl Clock {
    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.engine, &self.editor)
    }

    /// Commit a pending edit into the engine, if any
    fn commit_edit(&mut self) -> Option<TimerEvent> {
        let total = self.editor.commit()?;
        self.engine.set_absolute(total)
    }

    fn apply(&mut self, action: Action, events: &mut Vec<TimerEvent>) -> Result<(), TimerError> {
        let event = match action {
            Action::SelectPreset(key) => self.engine.select_preset(&key)?,
            Action::StartStop => self.engine.start_stop(),
            Action::Reset => self.engine.reset(),
            Action::Increment(seconds) => self.engine.increment(seconds)?,
            Action::BeginEdit => {
                if self.engine.is_running() {
                    debug!("Ignoring edit request while the countdown is running");
                } else {
                    self.editor.begin_edit(self.engine.remaining_seconds());
                }
                None
            }
            Action::PushDigit(digit) => {
                self.editor.push_digit(digit)?;
                None
            }
            Action::Backspace => {
                self.editor.backspace();
                None
            }
            Action::Submit => self.commit_edit(),
            Action::CancelEdit => {
                self.editor.cancel();
                None
            }
        };
        events.extend(event);
        Ok(())
    }
}

/// Main application state: the timer of record plus server metadata
#[derive(Debug)]
pub struct AppState {
    clock: Mutex<Clock>,
    presets: Presets,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Most recent alarm playback failure
    alarm_error: Mutex<Option<String>>,
    /// Whether an alarm player process is currently running
    alarm_playing: AtomicBool,
    /// Player launches since startup
    alarm_plays: AtomicU64,
    /// Snapshot after every mutation, for presentation observers
    pub snapshot_tx: watch::Sender<Snapshot>,
    /// Countdown schedule for the countdown task
    pub schedule_tx: watch::Sender<Schedule>,
    /// Alarm commands for the alarm task
    pub alarm_tx: watch::Sender<AlarmCommand>,
}

impl AppState {
    /// Create a paused timer on the initial preset
    pub fn new(port: u16, host: String, presets: Presets, initial: PresetKey) -> Self {
        let clock = Clock {
            engine: TimerEngine::new(presets.clone(), initial),
            editor: TimeEditor::new(),
        };
        let (snapshot_tx, _) = watch::channel(clock.snapshot());
        let (schedule_tx, _) = watch::channel(Schedule { running: false, epoch: 0 });
        let (alarm_tx, _) = watch::channel(AlarmCommand::Stop);

        Self {
            clock: Mutex::new(clock),
            presets,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            alarm_error: Mutex::new(None),
            alarm_playing: AtomicBool::new(false),
            alarm_plays: AtomicU64::new(0),
            snapshot_tx,
            schedule_tx,
            alarm_tx,
        }
    }

    fn lock_clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a user action and publish the resulting state.
    ///
    /// On error the state may still have changed (a pending edit is committed
    /// before the failing action runs); observers are notified either way.
    pub fn dispatch(&self, action: Action) -> Result<Snapshot, TimerError> {
        let name = action.name();
        let reschedules = matches!(action, Action::SelectPreset(_) | Action::StartStop | Action::Reset);
        debug!("Dispatching {:?}", action);

        let mut clock = self.lock_clock();
        let was_running = clock.engine.is_running();
        let mut events = Vec::new();

        // Any non-edit action while editing behaves like leaving the field
        let blurred = clock.editor.is_editing() && !action.is_edit();
        if blurred {
            events.extend(clock.commit_edit());
        }
        let result = clock.apply(action, &mut events);

        let is_running = clock.engine.is_running();
        if (reschedules && result.is_ok()) || is_running != was_running {
            self.schedule_tx.send_modify(|schedule| {
                schedule.running = is_running;
                schedule.epoch += 1;
            });
        }
        for event in events {
            self.signal_alarm(event);
        }
        let snapshot = self.publish(&clock);
        drop(clock);

        if blurred {
            self.record_action(Action::Submit.name());
        }
        match result {
            Ok(()) => {
                self.record_action(name);
                Ok(snapshot)
            }
            Err(e) => {
                warn!("Rejected {}: {}", name, e);
                Err(e)
            }
        }
    }

    /// Advance the countdown by one second
    pub fn tick(&self) -> Snapshot {
        let mut clock = self.lock_clock();
        if let Some(event) = clock.engine.tick() {
            self.signal_alarm(event);
        }
        trace!("Tick, {}s remaining", clock.engine.remaining_seconds());
        self.publish(&clock)
    }

    fn publish(&self, clock: &Clock) -> Snapshot {
        let snapshot = clock.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        snapshot
    }

    fn signal_alarm(&self, event: TimerEvent) {
        let command = match event {
            TimerEvent::Expired => AlarmCommand::Play,
            TimerEvent::Silenced => AlarmCommand::Stop,
        };
        info!("Alarm command: {:?}", command);
        self.alarm_tx.send_replace(command);
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.lock_clock().snapshot()
    }

    pub fn is_editing(&self) -> bool {
        self.lock_clock().editor.is_editing()
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    /// Remember an alarm playback failure for status reporting
    pub fn record_alarm_error(&self, error: String) {
        warn!("Alarm playback failed: {}", error);
        if let Ok(mut alarm_error) = self.alarm_error.lock() {
            *alarm_error = Some(error);
        }
    }

    pub fn clear_alarm_error(&self) {
        if let Ok(mut alarm_error) = self.alarm_error.lock() {
            *alarm_error = None;
        }
    }

    pub fn alarm_error(&self) -> Option<String> {
        self.alarm_error.lock().ok().and_then(|e| e.clone())
    }

    /// Note that a player process was launched
    pub fn alarm_started(&self) {
        self.alarm_plays.fetch_add(1, Ordering::Relaxed);
        self.alarm_playing.store(true, Ordering::Relaxed);
    }

    /// Note that no player process is running anymore
    pub fn alarm_finished(&self) {
        self.alarm_playing.store(false, Ordering::Relaxed);
    }

    pub fn is_alarm_playing(&self) -> bool {
        self.alarm_playing.load(Ordering::Relaxed)
    }

    pub fn alarm_plays(&self) -> u64 {
        self.alarm_plays.load(Ordering::Relaxed)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
