//! Signer and verifier selection
//!
//! Two independent sets of [`ParticipantId`], each drawn from the `n` slots
//! materialized when the participant count is chosen. The sets never
//! constrain each other; only the signer set is capped.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::{CeremonyError, Result};
use crate::types::ParticipantId;

/// Tracks the signer and verifier selections by identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    /// Number of slots (identities `0..slots`)
    slots: u16,

    /// Selected signers
    signers: BTreeSet<ParticipantId>,

    /// Selected verifiers
    verifiers: BTreeSet<ParticipantId>,
}

impl SelectionTracker {
    /// Create an empty tracker with no slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both selections and materialize `slots` candidates
    pub fn reset(&mut self, slots: u16) {
        self.slots = slots;
        self.signers.clear();
        self.verifiers.clear();
    }

    /// Number of candidate slots
    pub fn slots(&self) -> u16 {
        self.slots
    }

    /// Selected signers, ascending
    pub fn signers(&self) -> &BTreeSet<ParticipantId> {
        &self.signers
    }

    /// Selected verifiers, ascending
    pub fn verifiers(&self) -> &BTreeSet<ParticipantId> {
        &self.verifiers
    }

    /// Ordered signer indices
    pub fn signer_indices(&self) -> Vec<ParticipantId> {
        self.signers.iter().copied().collect()
    }

    /// Ordered verifier indices
    pub fn verifier_indices(&self) -> Vec<ParticipantId> {
        self.verifiers.iter().copied().collect()
    }

    /// Flip signer membership of `id`, then enforce `cap`
    ///
    /// Returns whether `id` is selected afterwards. When the cap is exceeded
    /// the just-toggled member is deselected and [`CeremonyError::SignerCapExceeded`]
    /// is returned.
    pub fn toggle_signer(&mut self, id: ParticipantId, cap: u16) -> Result<bool> {
        let checked = !self.signers.contains(&id);
        self.set_signer(id, checked, cap)?;
        Ok(checked)
    }

    /// Set signer membership of `id`, then enforce `cap`
    pub fn set_signer(&mut self, id: ParticipantId, checked: bool, cap: u16) -> Result<()> {
        self.check_slot(id)?;
        if !checked {
            self.signers.remove(&id);
            debug!("Signer {} deselected", id);
            return Ok(());
        }

        // Re-asserting an existing member never trips the cap
        if !self.signers.insert(id) {
            return Ok(());
        }
        debug!("Signer {} selected", id);
        if self.signers.len() > cap as usize {
            self.signers.remove(&id);
            warn!("Signer {} deselected: cap of {} reached", id, cap);
            return Err(CeremonyError::SignerCapExceeded { cap });
        }
        Ok(())
    }

    /// Flip verifier membership of `id`
    ///
    /// Returns whether `id` is selected afterwards.
    pub fn toggle_verifier(&mut self, id: ParticipantId) -> Result<bool> {
        let checked = !self.verifiers.contains(&id);
        self.set_verifier(id, checked)?;
        Ok(checked)
    }

    /// Set verifier membership of `id`
    pub fn set_verifier(&mut self, id: ParticipantId, checked: bool) -> Result<()> {
        self.check_slot(id)?;
        if checked {
            self.verifiers.insert(id);
        } else {
            self.verifiers.remove(&id);
        }
        debug!("Verifier {} checked={}", id, checked);
        Ok(())
    }

    fn check_slot(&self, id: ParticipantId) -> Result<()> {
        if self.slots == 0 {
            return Err(CeremonyError::ParticipantsNotChosen);
        }
        if id >= self.slots {
            return Err(CeremonyError::UnknownParticipant {
                id,
                participants: self.slots,
            });
        }
        Ok(())
    }
}
