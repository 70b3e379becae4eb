//! Signing request assembly and completion handling

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CeremonyConfig;
use crate::error::{CeremonyError, PortFault, Result};
use crate::notification::Notification;
use crate::participants::ParticipantConfig;
use crate::selection::SelectionTracker;
use crate::threshold::ThresholdConfig;
use crate::types::{Message, SigningRequest, SigningResult};
use crate::validation::check_signing;

/// Signature and hash as shown to the user after a completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDisplay {
    pub signature: String,
    pub hash: String,
}

/// Builds signing requests and folds their completions back into state
#[derive(Debug, Clone, Default)]
pub struct SigningCoordinator {
    /// Outstanding request, at most one
    pending: Option<SigningRequest>,

    /// Last completion as rendered
    display: Option<SigningDisplay>,

    /// Last completion as received
    last_result: Option<SigningResult>,

    /// Request the last completion answered
    last_request: Option<SigningRequest>,
}

impl SigningCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request is outstanding
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The outstanding request
    pub fn pending(&self) -> Option<&SigningRequest> {
        self.pending.as_ref()
    }

    /// Rendered signature and hash of the last completion
    pub fn display(&self) -> Option<&SigningDisplay> {
        self.display.as_ref()
    }

    /// Raw result of the last completion
    pub fn last_result(&self) -> Option<&SigningResult> {
        self.last_result.as_ref()
    }

    /// Request the last completion answered, if one was outstanding
    pub fn last_request(&self) -> Option<&SigningRequest> {
        self.last_request.as_ref()
    }

    /// Build a request from current state and mark it outstanding
    ///
    /// Every input is re-derived here; the gate shown to the user is not trusted.
    pub fn request(
        &mut self,
        participants: &ParticipantConfig,
        threshold: &ThresholdConfig,
        message: &Message,
        selection: &SelectionTracker,
    ) -> Result<SigningRequest> {
        if self.pending.is_some() {
            return Err(CeremonyError::SigningInFlight);
        }

        let n = participants.count();
        let t = threshold.get();
        check_signing(n, t, message, selection.signers().len())?;

        let (total, threshold) = match (n, t) {
            (Some(n), Some(t)) => (n, t),
            (None, _) => return Err(CeremonyError::ParticipantsNotChosen),
            (_, None) => return Err(CeremonyError::ThresholdNotChosen),
        };

        let request = SigningRequest {
            threshold,
            total,
            message: message.as_str().to_string(),
            signer_indices: selection.signer_indices(),
        };

        info!(
            "Dispatching {}-of-{} signing with participants {:?}",
            request.threshold, request.total, request.signer_indices
        );
        self.pending = Some(request.clone());
        Ok(request)
    }

    /// Fold a completion back into state
    ///
    /// Missing values are rendered with the configured placeholders. A fault
    /// leaves the previous display in place and yields a notification.
    pub fn complete(
        &mut self,
        outcome: std::result::Result<SigningResult, PortFault>,
        config: &CeremonyConfig,
    ) -> Option<Notification> {
        let answered = self.pending.take();
        if answered.is_none() {
            warn!("Signing completion received with no request outstanding");
        }

        match outcome {
            Ok(result) => {
                if !result.is_complete() {
                    warn!("Signing completed without signature or hash");
                } else {
                    info!("Signing completed");
                }
                self.display = Some(SigningDisplay {
                    signature: result
                        .signature_hex
                        .clone()
                        .unwrap_or_else(|| config.signature_failure_text.clone()),
                    hash: result
                        .hash_hex
                        .clone()
                        .unwrap_or_else(|| config.hash_failure_text.clone()),
                });
                self.last_result = Some(result);
                self.last_request = answered;
                None
            }
            Err(fault) => {
                warn!("Signing module fault: {}", fault);
                Some(Notification::signing_fault(&fault))
            }
        }
    }
}
