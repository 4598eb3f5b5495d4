//! Alarm playback background task

use std::{io, process::ExitStatus, sync::Arc, time::Duration};
use tokio::{sync::watch, time::sleep};
use tracing::{debug, info, warn};

use crate::{
    services::AlarmPlayer,
    state::{AlarmCommand, AppState},
};

/// Gap between two plays of the alarm
pub const REPLAY_PAUSE: Duration = Duration::from_millis(500);

enum Wake {
    Exited(io::Result<ExitStatus>),
    Command(bool),
}

/// Outcome of a command change seen while ringing
enum Ringing {
    Continue,
    Stopped,
    Closed,
}

fn on_command(alarm_rx: &mut watch::Receiver<AlarmCommand>, open: bool) -> Ringing {
    if !open {
        return Ringing::Closed;
    }
    if *alarm_rx.borrow_and_update() == AlarmCommand::Stop {
        info!("Alarm stopped");
        return Ringing::Stopped;
    }
    Ringing::Continue
}

/// Background task that plays the alarm in a loop while it is ringing.
///
/// With no player configured the alarm is only logged. Playback failures are
/// recorded on the state and never touch the countdown.
pub async fn alarm_task(state: Arc<AppState>, player: Option<AlarmPlayer>) {
    info!("Starting alarm task");

    let mut alarm_rx = state.alarm_tx.subscribe();

    while alarm_rx.changed().await.is_ok() {
        if *alarm_rx.borrow_and_update() != AlarmCommand::Play {
            continue;
        }

        state.clear_alarm_error();
        let Some(player) = player.as_ref() else {
            info!("Alarm ringing (playback disabled)");
            continue;
        };

        if !play_until_stopped(&state, player, &mut alarm_rx).await {
            break;
        }
    }

    info!("Alarm channel closed, stopping alarm task");
}

/// Replay the alarm until a stop arrives.
/// Returns false once the alarm channel is closed.
async fn play_until_stopped(
    state: &AppState,
    player: &AlarmPlayer,
    alarm_rx: &mut watch::Receiver<AlarmCommand>,
) -> bool {
    info!("Alarm ringing");
    let ringing = ring(state, player, alarm_rx).await;
    state.alarm_finished();
    !matches!(ringing, Ringing::Closed)
}

async fn ring(
    state: &AppState,
    player: &AlarmPlayer,
    alarm_rx: &mut watch::Receiver<AlarmCommand>,
) -> Ringing {
    loop {
        let mut child = match player.spawn() {
            Ok(child) => child,
            Err(e) => {
                state.record_alarm_error(e);
                return Ringing::Stopped;
            }
        };
        state.alarm_started();

        let wake = tokio::select! {
            status = child.wait() => Wake::Exited(status),
            changed = alarm_rx.changed() => Wake::Command(changed.is_ok()),
        };

        match wake {
            Wake::Exited(Ok(status)) if status.success() => {
                debug!("Alarm playback finished, looping");
                state.alarm_finished();
            }
            Wake::Exited(Ok(status)) => {
                state.record_alarm_error(format!("{} exited with {}", player.program, status));
                return Ringing::Stopped;
            }
            Wake::Exited(Err(e)) => {
                state.record_alarm_error(format!("Failed to wait for {}: {}", player.program, e));
                return Ringing::Stopped;
            }
            Wake::Command(open) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop alarm playback: {}", e);
                }
                match on_command(alarm_rx, open) {
                    Ringing::Continue => continue,
                    done => return done,
                }
            }
        }

        // Pause between plays
        let changed = tokio::select! {
            _ = sleep(REPLAY_PAUSE) => None,
            changed = alarm_rx.changed() => Some(changed.is_ok()),
        };
        if let Some(open) = changed {
            match on_command(alarm_rx, open) {
                Ringing::Continue => {}
                done => return done,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::Action,
        state::{PresetKey, Presets},
    };
    use std::time::Duration;

    fn app() -> Arc<AppState> {
        Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Presets::default(),
            PresetKey::Pomodoro,
        ))
    }

    async fn expire_once(state: &AppState) {
        state.dispatch(Action::BeginEdit).unwrap();
        for digit in ['0', '0', '0', '1'] {
            state.dispatch(Action::PushDigit(digit)).unwrap();
        }
        state.dispatch(Action::StartStop).unwrap();
        state.tick();
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    #[tokio::test]
    async fn unavailable_player_is_recorded_without_affecting_timer() {
        let state = app();
        let player = AlarmPlayer::new("definitely-not-an-audio-player", "alarm.wav");
        tokio::spawn(alarm_task(Arc::clone(&state), Some(player)));
        tokio::task::yield_now().await;

        expire_once(&state).await;

        let error = state.alarm_error().expect("alarm error recorded");
        assert!(error.contains("definitely-not-an-audio-player"));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.remaining_seconds, 0);
        assert!(snapshot.is_running);
    }

    #[tokio::test]
    async fn player_is_relaunched_until_stopped() {
        let state = app();
        let player = AlarmPlayer::new("true", "alarm.wav");
        tokio::spawn(alarm_task(Arc::clone(&state), Some(player)));
        tokio::task::yield_now().await;

        expire_once(&state).await;
        tokio::time::sleep(REPLAY_PAUSE * 2 + Duration::from_millis(300)).await;

        let plays = state.alarm_plays();
        assert!((2..=4).contains(&plays), "plays = {plays}");
        assert_eq!(state.alarm_error(), None);

        state.dispatch(Action::Reset).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let stopped_at = state.alarm_plays();
        tokio::time::sleep(REPLAY_PAUSE * 2).await;
        assert_eq!(state.alarm_plays(), stopped_at);
        assert!(!state.is_alarm_playing());
    }

    #[tokio::test]
    async fn stop_kills_running_player_and_task_waits_for_next_alarm() {
        let state = app();
        let player = AlarmPlayer::new("sleep", "30");
        tokio::spawn(alarm_task(Arc::clone(&state), Some(player)));
        tokio::task::yield_now().await;

        expire_once(&state).await;
        assert!(state.is_alarm_playing());
        assert_eq!(state.alarm_plays(), 1);

        state.dispatch(Action::Reset).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!state.is_alarm_playing());
        assert_eq!(state.alarm_error(), None);

        // The task is idle again and rings on the next expiry
        expire_once(&state).await;
        assert!(state.is_alarm_playing());
        assert_eq!(state.alarm_plays(), 2);

        state.dispatch(Action::StartStop).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!state.is_alarm_playing());
    }

    #[tokio::test]
    async fn disabled_playback_only_logs() {
        let state = app();
        tokio::spawn(alarm_task(Arc::clone(&state), None));
        tokio::task::yield_now().await;

        expire_once(&state).await;
        assert_eq!(state.alarm_error(), None);

        state.dispatch(Action::Reset).unwrap();
        assert_eq!(*state.alarm_tx.borrow(), AlarmCommand::Stop);
    }
}
