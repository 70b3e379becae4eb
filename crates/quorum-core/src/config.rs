//! Ceremony configuration

use serde::{Deserialize, Serialize};

use crate::error::{CeremonyError, Result};

/// Participant counts offered when no configuration is given
pub const DEFAULT_PARTICIPANT_COUNTS: [u16; 4] = [2, 3, 4, 5];

/// Smallest legal threshold
pub const MIN_THRESHOLD: u16 = 2;

/// Which bound the signer selection is capped against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerCap {
    /// Cap at the participant count `n`
    #[default]
    ParticipantCount,
    /// Cap at the threshold `t` (falls back to `n` while `t` is unset)
    Threshold,
}

/// Configuration for a ceremony
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeremonyConfig {
    /// Discrete domain of the participant count
    pub supported_participant_counts: Vec<u16>,

    /// Bound applied after every signer toggle
    pub signer_cap: SignerCap,

    /// Shown when a signing completion carries no signature
    pub signature_failure_text: String,

    /// Shown when a signing completion carries no hash
    pub hash_failure_text: String,
}

impl Default for CeremonyConfig {
    fn default() -> Self {
        Self {
            supported_participant_counts: DEFAULT_PARTICIPANT_COUNTS.to_vec(),
            signer_cap: SignerCap::default(),
            signature_failure_text: "Signature generation failed".to_string(),
            hash_failure_text: "Hash generation failed".to_string(),
        }
    }
}

impl CeremonyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.supported_participant_counts.is_empty() {
            return Err(CeremonyError::InvalidConfig(
                "supported_participant_counts must not be empty".to_string(),
            ));
        }
        if let Some(n) = self
            .supported_participant_counts
            .iter()
            .find(|&&n| n < MIN_THRESHOLD)
        {
            return Err(CeremonyError::InvalidConfig(format!(
                "participant count {} is below {}",
                n, MIN_THRESHOLD
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CeremonyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.supported_participant_counts, vec![2, 3, 4, 5]);
        assert_eq!(config.signer_cap, SignerCap::ParticipantCount);
    }

    #[test]
    fn test_rejects_bad_domain() {
        let empty = CeremonyConfig {
            supported_participant_counts: vec![],
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let too_small = CeremonyConfig {
            supported_participant_counts: vec![1, 2, 3],
            ..Default::default()
        };
        assert!(matches!(
            too_small.validate(),
            Err(CeremonyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CeremonyConfig =
            serde_json::from_str(r#"{"signer_cap":"threshold"}"#).unwrap();
        assert_eq!(config.signer_cap, SignerCap::Threshold);
        assert_eq!(config.supported_participant_counts, vec![2, 3, 4, 5]);
    }
}
