/// Core error types for Vesna
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type for audio backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors raised while loading or storing skill options
#[derive(Error, Debug)]
pub enum CoreError {
    /// Options failed validation
    #[error("Invalid options for '{scope}': {reason}")]
    InvalidOptions { scope: String, reason: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid options error
    pub fn invalid_options(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            scope: scope.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reported by an audio backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend could not be initialized or has gone away
    #[error("Audio backend unavailable: {0}")]
    Unavailable(String),

    /// Media could not be opened
    #[error("Failed to open {uri}: {reason}")]
    Open { uri: String, reason: String },

    /// Any other command failure
    #[error("Audio backend command failed: {0}")]
    Command(String),
}
