// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// The link is not something the extraction tool can be pointed at
    #[error("Invalid link '{url}': {reason}")]
    InvalidLink { url: String, reason: String },

    /// Time text that could not be read as seconds
    #[error("Invalid time: '{0}'. Expected seconds, MM:SS or HH:MM:SS")]
    InvalidTime(String),

    /// Requested cut does not fit the media
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A format must be backed by one combined stream or a video+audio pair
    #[error("Unsupported source shape: expected 1 or 2 stream URLs, got {count}")]
    UnsupportedSourceShape { count: usize },

    /// Both video and audio were excluded
    #[error("Nothing to download: both video and audio are excluded")]
    NoContentSelected,

    /// Format key that does not match any resolved format
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Bounded wait expired with no result
    #[error("Timeout expired, no response\n{command}")]
    ProcessTimeout { command: String },

    /// Tool exited abnormally, reported an error, or produced nothing usable
    #[error("{message}\n{command}")]
    ProcessFailed { command: String, message: String },

    /// Tool could not be started at all
    #[error("Failed to start {command}: {message}")]
    LaunchFailed { command: String, message: String },

    /// Operation not allowed in the current session state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InvalidLink { .. } => "invalid_link",
            DomainError::InvalidTime(_) => "invalid_time",
            DomainError::InvalidInterval(_) => "invalid_interval",
            DomainError::UnsupportedSourceShape { .. } => "unsupported_source_shape",
            DomainError::NoContentSelected => "no_content_selected",
            DomainError::UnknownFormat(_) => "unknown_format",
            DomainError::ProcessTimeout { .. } => "process_timeout",
            DomainError::ProcessFailed { .. } => "process_failed",
            DomainError::LaunchFailed { .. } => "launch_failed",
            DomainError::InvalidState(_) => "invalid_state",
            DomainError::InternalError(_) => "internal_error",
        }
    }
}
