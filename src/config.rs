//! Scheduler configuration
//!
//! Read from an optional TOML file. Every field has a default, so a missing
//! file or a partial file is fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// What `due_cards` does with the cards it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueMode {
    /// Returned cards leave the due ordering until reviewed or requeued
    #[default]
    Extract,
    /// Returned cards stay in the due ordering
    Peek,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    pub due_mode: DueMode,
    /// Batch size used when the caller does not give one
    pub default_study_limit: usize,
    pub default_search_limit: usize,
    /// Stale due-index entries tolerated per live entry before compaction
    pub compaction_ratio: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            due_mode: DueMode::Extract,
            default_study_limit: 20,
            default_search_limit: 10,
            compaction_ratio: 2,
        }
    }
}

impl SchedulerConfig {
    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        log::info!("Loaded scheduler config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = SchedulerConfig::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "dueMode = \"peek\"\ndefaultStudyLimit = 5\n").unwrap();

        let config = SchedulerConfig::load(&path).unwrap();
        assert_eq!(config.due_mode, DueMode::Peek);
        assert_eq!(config.default_study_limit, 5);
        assert_eq!(config.default_search_limit, 10);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let config = SchedulerConfig {
            due_mode: DueMode::Peek,
            compaction_ratio: 4,
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(SchedulerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "dueMode = \"sideways\"").unwrap();

        assert!(matches!(SchedulerConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
