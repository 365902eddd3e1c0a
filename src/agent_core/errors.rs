//! Supervisor error types.

use thiserror::Error;

use crate::inference::InferenceError;

/// The only failure text the front agent ever relays to the nurse.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

/// Coarse grouping used for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No HTTP status was received (connect failure, timeout).
    Network,
    /// The endpoint answered with a failure status, marker or bad body, or
    /// local data could not be encoded.
    Application,
    /// A single tool invocation failed; the conversation continues.
    Tool,
    /// A local guard stopped the run (turn limit, cancellation, config).
    Policy,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Application => "application",
            ErrorCategory::Tool => "tool",
            ErrorCategory::Policy => "policy",
        }
    }
}

/// Errors that can occur during a supervisor run.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The completion endpoint could not be reached or timed out.
    #[error("network error: {reason}")]
    Network { reason: String },

    /// Non-2xx status from the completion endpoint.
    #[error("completion endpoint returned HTTP {status}")]
    HttpStatus { status: u16, body: String },

    /// The decoded reply carried an error marker.
    #[error("upstream error: {message}")]
    Upstream { message: String },

    /// The reply body was not a valid completion reply.
    #[error("invalid completion reply: {reason}")]
    InvalidResponse { reason: String },

    /// Tool-call arguments were not valid for the named tool.
    #[error("invalid arguments for '{tool}': {reason}")]
    ArgumentDecode { tool: String, reason: String },

    /// A tool produced a value that could not be encoded as tool output.
    #[error("failed to encode result of '{tool}': {reason}")]
    ToolResultEncode { tool: String, reason: String },

    /// Patient lookup by id found nothing.
    #[error("patient not found: '{patient_id}'")]
    PatientNotFound { patient_id: String },

    /// The model asked for a tool that is not in the catalog.
    #[error("unknown tool: '{name}'")]
    UnknownTool { name: String },

    /// The model kept requesting tools past the configured turn budget.
    #[error("tool-call loop exceeded {max_turns} turns")]
    TurnLimitExceeded { max_turns: u32 },

    /// The caller cancelled the run.
    #[error("supervisor run cancelled")]
    Cancelled,

    /// Configuration or prompt template error.
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl SupervisorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SupervisorError::Network { .. } => ErrorCategory::Network,
            SupervisorError::HttpStatus { .. }
            | SupervisorError::Upstream { .. }
            | SupervisorError::InvalidResponse { .. }
            | SupervisorError::ToolResultEncode { .. } => ErrorCategory::Application,
            SupervisorError::ArgumentDecode { .. }
            | SupervisorError::PatientNotFound { .. }
            | SupervisorError::UnknownTool { .. } => ErrorCategory::Tool,
            SupervisorError::TurnLimitExceeded { .. }
            | SupervisorError::Cancelled
            | SupervisorError::Config { .. } => ErrorCategory::Policy,
        }
    }

    /// Text safe to hand back across the delegation boundary.
    pub fn user_message(&self) -> &'static str {
        GENERIC_ERROR_MESSAGE
    }
}

impl From<InferenceError> for SupervisorError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::ConnectionFailed { endpoint, reason } => SupervisorError::Network {
                reason: format!("{endpoint}: {reason}"),
            },
            InferenceError::Timeout { duration_secs } => SupervisorError::Network {
                reason: format!("timed out after {duration_secs}s"),
            },
            InferenceError::HttpError { status, body } => {
                SupervisorError::HttpStatus { status, body }
            }
            InferenceError::UpstreamError { message } => SupervisorError::Upstream { message },
            InferenceError::InvalidResponse { reason } => {
                SupervisorError::InvalidResponse { reason }
            }
            InferenceError::ConfigError { reason } => SupervisorError::Config { reason },
        }
    }
}
