//! Countdown background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::AppState;

/// Time between countdown ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that drives the countdown while the timer is running.
///
/// This is the only caller of `AppState::tick`. Every schedule change drops
/// the current interval before a new one is created, so a stop, reset or
/// preset switch can never leave a stale or duplicate tick behind.
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task");

    let mut schedule_rx = state.schedule_tx.subscribe();

    loop {
        let schedule = *schedule_rx.borrow_and_update();

        if !schedule.running {
            debug!("Countdown idle (epoch {})", schedule.epoch);
            if schedule_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        debug!("Countdown scheduled (epoch {})", schedule.epoch);
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                // Schedule change - drop this interval and re-evaluate
                changed = schedule_rx.changed() => {
                    if changed.is_err() {
                        info!("Schedule channel closed, stopping countdown task");
                        return;
                    }
                    break;
                }

                _ = interval.tick() => {
                    state.tick();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::Action,
        state::{AlarmCommand, Phase, PresetKey, Presets},
    };

    fn spawn_app() -> Arc<AppState> {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Presets::new(1, 5, 15),
            PresetKey::Pomodoro,
        ));
        tokio::spawn(countdown_task(Arc::clone(&state)));
        state
    }

    async fn wait(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_while_running() {
        let state = spawn_app();
        wait(10).await;

        state.dispatch(Action::StartStop).unwrap();
        wait(3_500).await;
        assert_eq!(state.snapshot().remaining_seconds, 57);

        state.dispatch(Action::StartStop).unwrap();
        wait(5_000).await;
        assert_eq!(state.snapshot().remaining_seconds, 57);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_does_not_double_tick() {
        let state = spawn_app();
        wait(10).await;

        for _ in 0..5 {
            state.dispatch(Action::StartStop).unwrap();
            wait(100).await;
            state.dispatch(Action::StartStop).unwrap();
            wait(100).await;
        }
        state.dispatch(Action::StartStop).unwrap();
        wait(2_500).await;
        assert_eq!(state.snapshot().remaining_seconds, 58);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_and_rings_until_acknowledged() {
        let state = spawn_app();
        let alarm_rx = state.alarm_tx.subscribe();
        wait(10).await;

        state.dispatch(Action::StartStop).unwrap();
        wait(60_500).await;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.phase, Phase::Expired);
        assert_eq!(*alarm_rx.borrow(), AlarmCommand::Play);

        // Ticking at zero keeps the timer expired
        wait(5_000).await;
        assert_eq!(state.snapshot().phase, Phase::Expired);

        state.dispatch(Action::StartStop).unwrap();
        assert_eq!(*alarm_rx.borrow(), AlarmCommand::Stop);
        wait(1_500).await;
        assert_eq!(state.snapshot().remaining_seconds, 59);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_preset_stops_countdown() {
        let state = spawn_app();
        wait(10).await;

        state.dispatch(Action::StartStop).unwrap();
        wait(2_500).await;
        state.dispatch(Action::SelectPreset("shortBreak".to_string())).unwrap();
        wait(3_000).await;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.remaining_seconds, 300);
        assert!(!snapshot.is_running);
    }
}
