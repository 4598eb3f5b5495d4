//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    input::{Action, INCREMENT_STEPS},
    state::AppState,
};
use super::responses::{ApiResponse, HealthResponse, PresetsResponse, StatusResponse};

/// Result of an action endpoint; rejected actions carry the current snapshot
pub type ActionResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

fn run_action(state: &AppState, action: Action) -> ActionResult {
    let name = action.name();
    match state.dispatch(action) {
        Ok(snapshot) => {
            info!("{} endpoint called - now {}", name, snapshot.display);
            Ok(Json(ApiResponse::ok(format!("{} applied", name), snapshot)))
        }
        Err(e) => {
            warn!("{} endpoint rejected: {}", name, e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(e.to_string(), state.snapshot())),
            ))
        }
    }
}

fn reject(state: &AppState, error: TimerError) -> (StatusCode, Json<ApiResponse>) {
    warn!("Rejected request: {}", error);
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(error.to_string(), state.snapshot())),
    )
}

/// Handle POST /preset/:key - Switch preset
pub async fn select_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ActionResult {
    run_action(&state, Action::SelectPreset(key))
}

/// Handle POST /start-stop - Toggle the countdown
pub async fn start_stop_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    run_action(&state, Action::StartStop)
}

/// Handle POST /reset - Reset to the preset duration
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    run_action(&state, Action::Reset)
}

/// Handle POST /increment/:seconds - Add time
pub async fn increment_handler(
    State(state): State<Arc<AppState>>,
    Path(seconds): Path<i64>,
) -> ActionResult {
    run_action(&state, Action::Increment(seconds))
}

/// Handle POST /edit - Enter edit mode
pub async fn begin_edit_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    run_action(&state, Action::BeginEdit)
}

/// Handle POST /edit/digit/:digit - Shift a digit into the edit buffer
pub async fn digit_handler(
    State(state): State<Arc<AppState>>,
    Path(digit): Path<String>,
) -> ActionResult {
    let mut chars = digit.chars();
    match (chars.next(), chars.next()) {
        (Some(d), None) => run_action(&state, Action::PushDigit(d)),
        _ => Err(reject(&state, TimerError::invalid(format!("expected a single digit, got {digit:?}")))),
    }
}

/// Handle POST /edit/backspace
pub async fn backspace_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    run_action(&state, Action::Backspace)
}

/// Handle POST /edit/submit - Commit the edit buffer
pub async fn submit_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    run_action(&state, Action::Submit)
}

/// Handle POST /edit/cancel - Leave edit mode without committing
pub async fn cancel_edit_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    run_action(&state, Action::CancelEdit)
}

/// Handle POST /key/:key - Deliver a key press through the key mapping
pub async fn key_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ActionResult {
    match Action::from_key(&key, state.is_editing()) {
        Some(action) => run_action(&state, action),
        None => {
            debug!("No binding for key {:?}", key);
            Ok(Json(ApiResponse::ok(format!("no binding for key {key:?}"), state.snapshot())))
        }
    }
}

/// Handle POST /action - Deliver a JSON-encoded action
pub async fn action_handler(
    State(state): State<Arc<AppState>>,
    Json(action): Json<Action>,
) -> ActionResult {
    run_action(&state, action)
}

/// Handle GET /status - Return the timer snapshot and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.snapshot(),
        alarm_error: state.alarm_error(),
        alarm_playing: state.is_alarm_playing(),
        alarm_plays: state.alarm_plays(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /presets - List presets and increment shortcuts
pub async fn presets_handler(State(state): State<Arc<AppState>>) -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: state.presets().iter().cloned().collect(),
        increments: INCREMENT_STEPS.to_vec(),
    })
}

/// Handle GET /events - Stream a snapshot event on every change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.snapshot_tx.subscribe();
    debug!("Snapshot stream opened");

    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("snapshot")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Some((Ok(event), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
