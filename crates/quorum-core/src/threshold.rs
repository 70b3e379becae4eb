//! Threshold selection, constrained by the participant count

use std::ops::RangeInclusive;

use tracing::debug;

use crate::config::MIN_THRESHOLD;
use crate::error::{CeremonyError, Result};

/// Holds the chosen threshold `t`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdConfig {
    value: Option<u16>,
}

impl ThresholdConfig {
    /// Create an unset threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Legal thresholds for participant count `n`: `[2, n]`
    pub fn domain(participants: Option<u16>) -> Result<RangeInclusive<u16>> {
        let n = participants.unwrap_or(0);
        if n < MIN_THRESHOLD {
            return Err(CeremonyError::ParticipantsNotChosen);
        }
        let domain = MIN_THRESHOLD..=n;
        if domain.is_empty() {
            return Err(CeremonyError::EmptyThresholdDomain);
        }
        Ok(domain)
    }

    /// Chosen threshold
    pub fn get(&self) -> Option<u16> {
        self.value
    }

    /// Choose `t` for the current participant count
    pub fn set(&mut self, participants: Option<u16>, threshold: u16) -> Result<()> {
        let domain = Self::domain(participants)?;
        if !domain.contains(&threshold) {
            return Err(CeremonyError::ThresholdOutOfRange {
                threshold,
                participants: *domain.end(),
            });
        }
        debug!("Threshold set to {}", threshold);
        self.value = Some(threshold);
        Ok(())
    }

    /// Forget the chosen threshold
    pub fn clear(&mut self) {
        self.value = None;
    }
}
