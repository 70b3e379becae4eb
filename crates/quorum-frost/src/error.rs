//! Error types for FROST operations

use quorum_core::PortFault;
use thiserror::Error;

/// Result type for FROST operations
pub type Result<T> = std::result::Result<T, FrostError>;

/// Errors that can occur during FROST operations
#[derive(Debug, Error)]
pub enum FrostError {
    /// Invalid number of participants
    #[error("Invalid participant count: need at least {min}, got {got}")]
    InvalidParticipantCount { min: usize, got: usize },

    /// Invalid threshold
    #[error("Invalid threshold: {threshold} must be <= {participants} and >= 2")]
    InvalidThreshold {
        threshold: usize,
        participants: usize,
    },

    /// Signer list does not match the threshold
    #[error("Expected {expected} signer indices, got {got}")]
    SignerCountMismatch { expected: usize, got: usize },

    /// Index outside `[0, n)` or listed twice
    #[error("Invalid participant index {index} for {participants} participants")]
    InvalidIndex { index: u16, participants: u16 },

    /// Duplicate participant index
    #[error("Participant index {0} listed more than once")]
    DuplicateIndex(u16),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Signature aggregation failed
    #[error("Signature aggregation failed: {0}")]
    Aggregation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal FROST error: {0}")]
    Internal(String),
}

impl FrostError {
    /// Whether the error stems from a malformed request rather than the math
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            FrostError::InvalidParticipantCount { .. }
                | FrostError::InvalidThreshold { .. }
                | FrostError::SignerCountMismatch { .. }
                | FrostError::InvalidIndex { .. }
                | FrostError::DuplicateIndex(_)
        )
    }
}

impl From<FrostError> for PortFault {
    fn from(e: FrostError) -> Self {
        if e.is_request_error() {
            PortFault::Rejected(e.to_string())
        } else {
            PortFault::Internal(e.to_string())
        }
    }
}
