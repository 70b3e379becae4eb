//! Transient user-facing notifications

use serde::{Deserialize, Serialize};

use crate::error::{CeremonyError, PortFault};

/// What a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Informational (e.g. signing dispatched)
    Info,
    /// A configuration or precondition refusal
    Refusal,
    /// Verification succeeded
    Success,
    /// Verification failed
    Failure,
    /// The external module faulted
    Fault,
}

/// A transient notification for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, text)
    }

    pub fn refusal(error: &CeremonyError) -> Self {
        Self::new(NotificationKind::Refusal, error.to_string())
    }

    /// Fault raised by the signing module
    pub fn signing_fault(fault: &PortFault) -> Self {
        Self::new(
            NotificationKind::Fault,
            format!("Error during signing: {}", fault),
        )
    }

    /// Fault raised by the verification module
    pub fn verification_fault(fault: &PortFault) -> Self {
        Self::new(
            NotificationKind::Fault,
            format!("Verification error: {}", fault),
        )
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
