//! Error types for the pacer toolkit.

use crate::outcome::CallOutcome;
use thiserror::Error;

/// Result type alias for pacer operations.
pub type PacerResult<T> = Result<T, PacerError>;

/// Main error type for pacer operations.
///
/// Admission denials and non-retryable classifications are decision data,
/// not errors; this type covers malformed configuration and the terminal
/// failure states a dispatched request can end in.
#[derive(Error, Debug, Clone)]
pub enum PacerError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input (programming error, never retried)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Admission denied and the caller's wait budget ran out
    #[error("Admission denied for {provider}: {reason} (retry in {wait_ms} ms)")]
    Denied {
        provider: String,
        wait_ms: u64,
        reason: String,
    },

    /// Non-retryable failure, surfaced immediately
    #[error("Request to {provider} failed: {outcome}")]
    Fatal {
        provider: String,
        outcome: CallOutcome,
    },

    /// Retries exhausted; carries the last underlying outcome for diagnostics
    #[error("Request to {provider} failed after {attempts} attempts: {last}")]
    Exhausted {
        provider: String,
        attempts: u32,
        last: CallOutcome,
    },

    /// The dispatched operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl PacerError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new denied error
    pub fn denied(provider: impl Into<String>, wait_ms: u64, reason: impl Into<String>) -> Self {
        Self::Denied {
            provider: provider.into(),
            wait_ms,
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for PacerError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<serde_json::Error> for PacerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}
