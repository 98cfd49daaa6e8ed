//! Huginn error types

use std::time::Duration;

/// Message reported to the caller when the AI service cannot be reached.
pub const COMMUNICATION_MESSAGE: &str = "Failed to communicate with the AI service.";
/// Message reported when the service answers without calling the analysis tool.
pub const PROTOCOL_MESSAGE: &str = "AI did not return a valid tool call.";
/// Message reported when the tool call arguments do not match the declared shape.
pub const FORMAT_MESSAGE: &str = "AI returned an invalid data format.";

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("empty response from model")]
    EmptyResponse,

    // Structured-output errors
    /// The model answered without invoking the analysis tool.
    #[error("model did not call '{0}'")]
    MissingToolCall(String),

    /// The tool was invoked but its arguments failed to decode.
    #[error("invalid tool arguments: {0}")]
    InvalidFormat(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Per-record failure class.
///
/// Every [`HuginnError`] raised while annotating a record falls into exactly
/// one of these, and each class has a fixed caller-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The service could not be reached, or rejected the request.
    Communication,
    /// The service answered, but not through the analysis tool.
    Protocol,
    /// The tool was called with a payload of the wrong shape.
    Format,
}

impl FailureKind {
    /// Fixed message shown to the caller for this class.
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::Communication => COMMUNICATION_MESSAGE,
            FailureKind::Protocol => PROTOCOL_MESSAGE,
            FailureKind::Format => FORMAT_MESSAGE,
        }
    }

    /// Short label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Communication => "communication",
            FailureKind::Protocol => "protocol",
            FailureKind::Format => "format",
        }
    }
}

impl HuginnError {
    /// Classify this error into the per-record failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            HuginnError::MissingToolCall(_) => FailureKind::Protocol,
            HuginnError::InvalidFormat(_) => FailureKind::Format,
            HuginnError::Http(_)
            | HuginnError::Api { .. }
            | HuginnError::RateLimited { .. }
            | HuginnError::AuthenticationFailed
            | HuginnError::EmptyResponse
            | HuginnError::Configuration(_)
            | HuginnError::InvalidInput(_) => FailureKind::Communication,
        }
    }

    /// Caller-facing message. The detailed error stays in the logs.
    pub fn user_message(&self) -> &'static str {
        self.kind().message()
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
