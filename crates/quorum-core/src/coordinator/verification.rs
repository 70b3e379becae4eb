//! Verification request assembly and outcome mapping

use tracing::{info, warn};

use crate::error::{CeremonyError, PortFault, Result};
use crate::notification::{Notification, NotificationKind};
use crate::selection::SelectionTracker;
use crate::types::{Message, VerificationRequest};
use crate::validation::check_verification;

/// Builds verification requests and maps their outcomes to notifications
#[derive(Debug, Clone, Default)]
pub struct VerificationCoordinator {
    /// Whether a request is outstanding
    in_flight: bool,

    /// Last boolean returned by the verifier
    last_result: Option<bool>,
}

impl VerificationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight
    }

    /// Last verification outcome, if any verification has completed
    pub fn last_result(&self) -> Option<bool> {
        self.last_result
    }

    /// Build a request, refusing before any external call when preconditions fail
    pub fn request(
        &mut self,
        message: &Message,
        selection: &SelectionTracker,
    ) -> Result<VerificationRequest> {
        if self.in_flight {
            return Err(CeremonyError::VerificationInFlight);
        }
        check_verification(message, selection.verifiers().len())?;

        let request = VerificationRequest {
            message: message.as_str().to_string(),
            verifier_indices: selection.verifier_indices(),
        };
        info!("Dispatching verification with {:?}", request.verifier_indices);
        self.in_flight = true;
        Ok(request)
    }

    /// Map the verifier's answer to a notification
    pub fn complete(&mut self, outcome: std::result::Result<bool, PortFault>) -> Notification {
        self.in_flight = false;
        match outcome {
            Ok(true) => {
                info!("Signature verification succeeded");
                self.last_result = Some(true);
                Notification::new(
                    NotificationKind::Success,
                    "Signature verification succeeded!",
                )
            }
            Ok(false) => {
                info!("Signature verification failed");
                self.last_result = Some(false);
                Notification::new(NotificationKind::Failure, "Signature verification failed!")
            }
            Err(fault) => {
                warn!("Verification module fault: {}", fault);
                Notification::verification_fault(&fault)
            }
        }
    }
}
