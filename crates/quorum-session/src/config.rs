//! Session configuration

use quorum_core::CeremonyConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SessionError};

/// Environment variable overriding the config location
pub const CONFIG_ENV: &str = "QUORUM_CONFIG";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ceremony rules
    pub ceremony: CeremonyConfig,

    /// Capacity of the output broadcast channel
    pub output_buffer: usize,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ceremony: CeremonyConfig::default(),
            output_buffer: 64,
            log_filter: "quorum=info".to_string(),
        }
    }
}

impl SessionConfig {
    /// Config path from `QUORUM_CONFIG`, else the platform config directory
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("quorum")
                    .join("session.json")
            })
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.ceremony.validate()?;
        if self.output_buffer == 0 {
            return Err(SessionError::Config(
                "output_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::SignerCap;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut config = SessionConfig::default();
        config.ceremony.signer_cap = SignerCap::Threshold;
        config.ceremony.supported_participant_counts = vec![2, 3];
        config.save(&path).unwrap();

        let loaded = SessionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_path_under_platform_config_dir() {
        let path = SessionConfig::default_path();
        match std::env::var_os(CONFIG_ENV) {
            Some(overridden) => assert_eq!(path, PathBuf::from(overridden)),
            None => {
                assert!(path.ends_with("quorum/session.json"));
                if let Some(base) = dirs::config_dir() {
                    assert!(path.starts_with(base));
                }
            }
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        std::fs::write(&path, r#"{"ceremony":{"supported_participant_counts":[]}}"#).unwrap();
        assert!(matches!(
            SessionConfig::load(&path),
            Err(SessionError::Ceremony(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SessionConfig::load(&path),
            Err(SessionError::Serialization(_))
        ));
    }
}
