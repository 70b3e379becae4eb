//! Participant count and the identities it materializes

use tracing::debug;

use crate::error::{CeremonyError, Result};
use crate::types::ParticipantId;

/// Holds the chosen participant count `n` and its legal domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantConfig {
    /// Supported values of `n`, ascending and deduplicated
    domain: Vec<u16>,

    /// Chosen value, if any
    count: Option<u16>,
}

impl ParticipantConfig {
    /// Create a configurator over the given domain
    pub fn new(domain: &[u16]) -> Self {
        let mut domain = domain.to_vec();
        domain.sort_unstable();
        domain.dedup();
        Self {
            domain,
            count: None,
        }
    }

    /// Legal values of `n`
    pub fn domain(&self) -> &[u16] {
        &self.domain
    }

    /// Whether `n` may be chosen
    pub fn is_supported(&self, n: u16) -> bool {
        self.domain.binary_search(&n).is_ok()
    }

    /// Chosen participant count
    pub fn count(&self) -> Option<u16> {
        self.count
    }

    /// Store `n`; the caller is responsible for resetting dependent state
    pub fn set_count(&mut self, n: u16) -> Result<()> {
        if !self.is_supported(n) {
            return Err(CeremonyError::UnsupportedParticipantCount {
                got: n,
                supported: self.domain.clone(),
            });
        }
        debug!("Participant count set to {}", n);
        self.count = Some(n);
        Ok(())
    }

    /// Identities `0..n` for the current configuration
    pub fn identities(&self) -> impl Iterator<Item = ParticipantId> {
        0..self.count.unwrap_or(0)
    }
}
