//! Error types for the ceremony session

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur in the session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Ceremony error
    #[error("Ceremony error: {0}")]
    Ceremony(#[from] quorum_core::CeremonyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session loop has stopped
    #[error("Session closed")]
    Closed,
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Serialization(e.to_string())
    }
}
