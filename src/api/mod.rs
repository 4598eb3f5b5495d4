//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/preset/:key", post(select_preset_handler))
        .route("/start-stop", post(start_stop_handler))
        .route("/reset", post(reset_handler))
        .route("/increment/:seconds", post(increment_handler))
        // Manual time entry
        .route("/edit", post(begin_edit_handler))
        .route("/edit/digit/:digit", post(digit_handler))
        .route("/edit/backspace", post(backspace_handler))
        .route("/edit/submit", post(submit_handler))
        .route("/edit/cancel", post(cancel_edit_handler))
        .route("/key/:key", post(key_handler))
        .route("/action", post(action_handler))
        .route("/status", get(status_handler))
        .route("/presets", get(presets_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::state::{PresetKey, Presets};

    fn app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Presets::default(),
            PresetKey::Pomodoro,
        ));
        (Arc::clone(&state), create_router(state))
    }

    async fn call(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn post(router: &Router, uri: &str) -> (StatusCode, Value) {
        call(router, Method::POST, uri).await
    }

    #[tokio::test]
    async fn select_preset_and_start() {
        let (_, router) = app();

        let (status, body) = post(&router, "/preset/shortBreak").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["snapshot"]["display"], "5:00");
        assert_eq!(body["snapshot"]["active_preset"], "shortBreak");
        assert_eq!(body["snapshot"]["accent_color"], "#f1b85dff");

        let (_, body) = post(&router, "/start-stop").await;
        assert_eq!(body["snapshot"]["is_running"], true);
        assert_eq!(body["snapshot"]["phase"], "running");
    }

    #[tokio::test]
    async fn invalid_arguments_are_bad_requests() {
        let (_, router) = app();

        let (status, body) = post(&router, "/preset/siesta").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["snapshot"]["remaining_seconds"], 1500);

        let (status, _) = post(&router, "/increment/-30").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post(&router, "/edit/digit/x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn increments_accumulate() {
        let (_, router) = app();
        for _ in 0..3 {
            post(&router, "/increment/30").await;
        }
        let (_, body) = call(&router, Method::GET, "/status").await;
        assert_eq!(body["timer"]["remaining_seconds"], 1590);
        assert_eq!(body["timer"]["display"], "26:30");
        assert_eq!(body["last_action"], "increment");
    }

    #[tokio::test]
    async fn keys_drive_edit_mode() {
        let (state, router) = app();

        post(&router, "/edit").await;
        for key in ["0", "1", "3", "0", "ArrowLeft"] {
            post(&router, &format!("/key/{key}")).await;
        }
        let (_, body) = post(&router, "/key/Enter").await;
        assert_eq!(body["snapshot"]["is_editing"], false);
        assert_eq!(body["snapshot"]["remaining_seconds"], 90);

        let (_, body) = post(&router, "/key/%20").await;
        assert_eq!(body["snapshot"]["is_running"], true);
        assert!(!state.is_editing());
    }

    #[tokio::test]
    async fn json_actions_are_accepted() {
        let (_, router) = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/action")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"action":"increment","value":300}"#))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["snapshot"]["remaining_seconds"], 1800);
    }

    #[tokio::test]
    async fn presets_and_health() {
        let (_, router) = app();

        let (status, body) = call(&router, Method::GET, "/presets").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["presets"].as_array().unwrap().len(), 3);
        assert_eq!(body["presets"][2]["label"], "Long Break");
        assert_eq!(body["increments"], serde_json::json!([30, 60, 300]));

        let (status, body) = call(&router, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
