//! Request, result and message types shared with the external modules

use serde::{Deserialize, Serialize};

/// Participant identity (0-indexed, stable for one configuration)
pub type ParticipantId = u16;

/// Message payload shared by signing and verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(String);

impl Message {
    /// Create a new message
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Get the message text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the message bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether the message is empty or only whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Request handed to the external signing module
///
/// `signer_indices` is ascending and its length equals `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    /// Threshold (t)
    pub threshold: u16,
    /// Total participants (n)
    pub total: u16,
    /// Message to sign
    pub message: String,
    /// Participants taking part in signing
    pub signer_indices: Vec<ParticipantId>,
}

/// Request handed to the external verification module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Message the signature should cover
    pub message: String,
    /// Participants checking the signature
    pub verifier_indices: Vec<ParticipantId>,
}

/// Completion payload of a signing request
///
/// A missing field means generation failed; it is a terminal outcome, not a fault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningResult {
    /// Hex-encoded signature
    pub signature_hex: Option<String>,
    /// Hex-encoded hash
    pub hash_hex: Option<String>,
}

impl SigningResult {
    /// Create a result carrying both values
    pub fn new(signature_hex: impl Into<String>, hash_hex: impl Into<String>) -> Self {
        Self {
            signature_hex: Some(signature_hex.into()),
            hash_hex: Some(hash_hex.into()),
        }
    }

    /// A result where neither value was produced
    pub fn failed() -> Self {
        Self::default()
    }

    /// Whether both signature and hash are present
    pub fn is_complete(&self) -> bool {
        self.signature_hex.is_some() && self.hash_hex.is_some()
    }
}
