//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility. These types carry the context needed to
//! build meaningful log entries.

use thiserror::Error;

/// Errors that can occur while talking to the completion endpoint.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// TCP/HTTP connection to the completion endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed {
        endpoint: String,
        reason: String,
    },

    /// The completion endpoint did not respond within the configured timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout {
        duration_secs: u64,
    },

    /// Non-2xx HTTP response from the completion endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        body: String,
    },

    /// The decoded response carried an `error` field.
    #[error("upstream error: {message}")]
    UpstreamError {
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {reason}")]
    InvalidResponse {
        reason: String,
    },

    /// Configuration loading or validation error.
    #[error("config error: {reason}")]
    ConfigError {
        reason: String,
    },
}

impl InferenceError {
    /// Whether the failure happened before an HTTP status was received.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            InferenceError::ConnectionFailed { .. } | InferenceError::Timeout { .. }
        )
    }
}
