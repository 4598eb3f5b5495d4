//! Error types for timer operations

use thiserror::Error;

/// Errors reported synchronously by timer and editor operations.
///
/// These are contract violations by the caller (unknown preset, negative
/// amounts, non-digit edit input). Nothing is retried or recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl TimerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
