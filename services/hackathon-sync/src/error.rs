//! Error types for the hackathon sync layer

use crate::gate::ActionKey;

/// Errors that can occur while synchronizing with the hackathon API
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Action {0} is already running")]
    ConcurrencyRejected(ActionKey),

    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used by the error surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request failed or the server answered with a non-success status
    Transport,
    /// A required field was missing; no request was issued
    Validation,
    /// The action gate refused a start because the key is already running
    ConcurrencyRejected,
    /// Local configuration or IO problems
    Local,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Transport(_)
            | SyncError::UnexpectedStatus { .. }
            | SyncError::InvalidResponse { .. } => ErrorKind::Transport,
            SyncError::Validation(_) => ErrorKind::Validation,
            SyncError::ConcurrencyRejected(_) => ErrorKind::ConcurrencyRejected,
            SyncError::Config(_)
            | SyncError::Panicked(_)
            | SyncError::Io(_)
            | SyncError::Json(_) => ErrorKind::Local,
        }
    }
}

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
