//! Configuration management
//!
//! This module handles loading and saving the sampling configuration.

use crate::error::Result;
use crate::sampling::FixedGroupConfig;
use crate::tasks::TaskConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Task store and episode sampling
    #[serde(default)]
    pub tasks: TaskConfig<i64>,
    /// Fixed-grouping index sampler
    #[serde(default)]
    pub fixed: FixedGroupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create default configuration file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        Config::default().save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskSource;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.tasks.ways, 2);
        assert_eq!(config.tasks.shots, Some(1));
        assert!(config.tasks.tasks.is_all());
        assert_eq!(config.fixed.episodes, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sampling.toml");

        let mut config = Config::default();
        config.tasks = TaskConfig::new()
            .with_ways(3)
            .with_shots(5)
            .with_classes(vec![1, 2, 3, 4])
            .with_tasks(TaskSource::Count(20));
        config.fixed.query = 15;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.tasks.ways, 3);
        assert_eq!(loaded.tasks.shots, Some(5));
        assert_eq!(loaded.tasks.classes, Some(vec![1, 2, 3, 4]));
        assert_eq!(loaded.tasks.tasks, TaskSource::Count(20));
        assert_eq!(loaded.fixed.query, 15);
    }

    #[test]
    fn test_default_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");

        Config::create_default(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert!(loaded.tasks.tasks.is_all());
        assert_eq!(loaded.fixed, FixedGroupConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::load_or_default("/nonexistent/sampling.toml");
        assert_eq!(config.tasks.ways, 2);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("[tasks]\nways = 4\n\n[fixed]\nshots = 3\n").unwrap();
        assert_eq!(config.tasks.ways, 4);
        assert_eq!(config.fixed.shots, 3);
        assert_eq!(config.logging.level, "info");
    }
}
