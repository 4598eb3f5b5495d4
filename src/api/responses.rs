//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Preset, Snapshot};

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub snapshot: Snapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, snapshot: Snapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            snapshot,
        }
    }

    /// Create a response for an applied action
    pub fn ok(message: String, snapshot: Snapshot) -> Self {
        Self::new("ok".to_string(), message, snapshot)
    }

    /// Create an error response
    pub fn error(message: String, snapshot: Snapshot) -> Self {
        Self::new("error".to_string(), message, snapshot)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: Snapshot,
    pub alarm_error: Option<String>,
    pub alarm_playing: bool,
    pub alarm_plays: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Preset table and increment shortcuts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsResponse {
    pub presets: Vec<Preset>,
    pub increments: Vec<i64>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
