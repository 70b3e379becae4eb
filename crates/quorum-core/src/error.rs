//! Error types for ceremony operations
//!
//! The `Display` text of each [`CeremonyError`] is what the presentation
//! layer shows as a transient notification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ParticipantId;

/// Result type for ceremony operations
pub type Result<T> = std::result::Result<T, CeremonyError>;

/// Refusals raised while configuring or driving a ceremony
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CeremonyError {
    /// Participant count is not part of the configured domain
    #[error("Unsupported number of participants: {got} (supported: {supported:?})")]
    UnsupportedParticipantCount { got: u16, supported: Vec<u16> },

    /// An operation needs the participant count first
    #[error("Please select participants first")]
    ParticipantsNotChosen,

    /// Threshold outside `[2, n]`
    #[error("Invalid threshold: {threshold} must be >= 2 and <= {participants}")]
    ThresholdOutOfRange { threshold: u16, participants: u16 },

    /// No threshold value is legal for the current participant count
    #[error("No signers can be selected. Please select participants first.")]
    EmptyThresholdDomain,

    /// The signing gate needs a threshold
    #[error("Please select the number of signers")]
    ThresholdNotChosen,

    /// Identity outside `[0, n)`
    #[error("Unknown participant {id}: identities range over 0..{participants}")]
    UnknownParticipant {
        id: ParticipantId,
        participants: u16,
    },

    /// Signer selection grew past the cap and the toggled member was dropped
    #[error("You cannot select more than {cap} participants.")]
    SignerCapExceeded { cap: u16 },

    /// Signer selection size differs from the threshold
    #[error("Please select exactly {threshold} signers ({selected} selected).")]
    SignerCountMismatch { selected: usize, threshold: u16 },

    /// A signing request is already outstanding
    #[error("A signing request is already in progress")]
    SigningInFlight,

    /// A verification request is already outstanding
    #[error("A verification request is already in progress")]
    VerificationInFlight,

    /// Message is empty or blank
    #[error("Message cannot be empty.")]
    EmptyMessage,

    /// Verification needs at least one verifier
    #[error("Please select at least one verifier.")]
    NoVerifiers,

    /// Ceremony configuration rejected
    #[error("Invalid ceremony configuration: {0}")]
    InvalidConfig(String),
}

/// Fault raised by an external signing or verification module
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortFault {
    /// The module refused the request (malformed input)
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The module could not be reached or loaded
    #[error("module unavailable: {0}")]
    Unavailable(String),

    /// The module failed while processing
    #[error("{0}")]
    Internal(String),
}
