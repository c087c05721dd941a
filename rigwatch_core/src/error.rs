//! Error types for the status-resolution engine

use thiserror::Error;

/// Errors raised while fetching, resolving or formatting a status line
#[derive(Debug, Error)]
pub enum RigwatchError {
    #[error("Invalid basal schedule: {0}")]
    InvalidSchedule(String),

    #[error("Feed request for '{resource}' failed: {message}")]
    Feed { resource: String, message: String },

    #[error("No {0} records in feed")]
    MissingRecord(&'static str),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for rigwatch operations
pub type RigwatchResult<T> = Result<T, RigwatchError>;

impl RigwatchError {
    pub fn invalid_schedule(msg: impl Into<String>) -> Self {
        RigwatchError::InvalidSchedule(msg.into())
    }

    pub fn feed(resource: impl Into<String>, message: impl ToString) -> Self {
        RigwatchError::Feed {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        RigwatchError::MalformedRecord(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        RigwatchError::Config(msg.into())
    }
}
