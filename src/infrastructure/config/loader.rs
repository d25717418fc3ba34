use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid similarity_threshold: {0}. Must be within (0.0, 1.0]")]
    InvalidSimilarityThreshold(f64),

    #[error("Invalid cache_confidence_floor: {0}. Must be within [similarity_threshold, 1.0]")]
    InvalidCacheConfidenceFloor(f64),

    #[error("Invalid max_scored_candidates: {0}. Must be at least 1")]
    InvalidMaxScoredCandidates(usize),

    #[error("Invalid pattern_lookback: {0}. Must be at least 3")]
    InvalidPatternLookback(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .testloom/config.yaml (project config, created by init)
    /// 3. .testloom/local.yaml (project local overrides, optional)
    /// 4. Environment variables (`TESTLOOM_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".testloom/config.yaml"))
            .merge(Yaml::file(".testloom/local.yaml"))
            .merge(Env::prefixed("TESTLOOM_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let engine = &config.engine;
        if engine.similarity_threshold <= 0.0 || engine.similarity_threshold > 1.0 {
            return Err(ConfigError::InvalidSimilarityThreshold(
                engine.similarity_threshold,
            ));
        }
        if engine.cache_confidence_floor < engine.similarity_threshold
            || engine.cache_confidence_floor > 1.0
        {
            return Err(ConfigError::InvalidCacheConfidenceFloor(
                engine.cache_confidence_floor,
            ));
        }
        if engine.max_scored_candidates == 0 {
            return Err(ConfigError::InvalidMaxScoredCandidates(
                engine.max_scored_candidates,
            ));
        }
        if engine.pattern_lookback < 3 {
            return Err(ConfigError::InvalidPatternLookback(engine.pattern_lookback));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigLoader::validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "engine:\n  similarity_threshold: 0.75\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.engine.similarity_threshold, 0.75);
        // Untouched sections keep their defaults.
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let mut config = Config::default();
        config.engine.similarity_threshold = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidSimilarityThreshold(_))
        ));

        config.engine.similarity_threshold = 1.5;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_rejects_cache_floor_below_threshold() {
        let mut config = Config::default();
        config.engine.cache_confidence_floor = 0.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCacheConfidenceFloor(_))
        ));
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_rejects_short_lookback() {
        let mut config = Config::default();
        config.engine.pattern_lookback = 2;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPatternLookback(_))
        ));
    }
}
