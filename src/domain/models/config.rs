//! Application configuration model.

use serde::{Deserialize, Serialize};

use super::correlation::ScoreWeights;

/// Main configuration structure for Testloom
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Correlation engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".testloom/testloom.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Correlation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Similarity threshold below which a correlation is unmatched
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Minimum confidence an outcome needs to enter the result cache
    #[serde(default = "default_cache_confidence_floor")]
    pub cache_confidence_floor: f64,

    /// Maximum number of cached correlation outcomes
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Maximum candidates admitted to weighted scoring per result
    #[serde(default = "default_max_scored_candidates")]
    pub max_scored_candidates: usize,

    /// Number of recent failures consulted by the pattern detector
    #[serde(default = "default_pattern_lookback")]
    pub pattern_lookback: usize,

    /// Weights of the composite similarity score
    #[serde(default)]
    pub weights: ScoreWeights,
}

const fn default_similarity_threshold() -> f64 {
    0.6
}

const fn default_cache_confidence_floor() -> f64 {
    0.7
}

const fn default_cache_capacity() -> usize {
    4096
}

const fn default_max_scored_candidates() -> usize {
    64
}

const fn default_pattern_lookback() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            cache_confidence_floor: default_cache_confidence_floor(),
            cache_capacity: default_cache_capacity(),
            max_scored_candidates: default_max_scored_candidates(),
            pattern_lookback: default_pattern_lookback(),
            weights: ScoreWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.similarity_threshold, 0.6);
        assert_eq!(config.engine.cache_confidence_floor, 0.7);
        assert_eq!(config.database.path, ".testloom/testloom.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_deserialize_partial_yaml_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"engine": {"similarity_threshold": 0.7}}"#).unwrap();
        assert_eq!(config.engine.similarity_threshold, 0.7);
        assert_eq!(config.engine.cache_capacity, 4096);
        assert_eq!(config.database.max_connections, 10);
    }
}
