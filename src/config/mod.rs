//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the league data API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.sleeper.app/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Batch sizing and pacing for multi-league scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Concurrent remote fetches per batch
    #[serde(default = "default_fetch_batch")]
    pub fetch_batch_size: usize,

    /// Concurrent league analyses per batch
    #[serde(default = "default_analysis_batch")]
    pub analysis_batch_size: usize,

    /// Pause between batches, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_fetch_batch() -> usize {
    5
}

fn default_analysis_batch() -> usize {
    3
}

fn default_delay_ms() -> u64 {
    100
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: default_fetch_batch(),
            analysis_batch_size: default_analysis_batch(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for the persisted cache file
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Path to the players JSON snapshot
    #[serde(default = "default_players_path")]
    pub players_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_players_path() -> PathBuf {
    PathBuf::from("./data/players.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            players_path: default_players_path(),
            log_level: default_log_level(),
            api: ApiConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "API base URL is not a valid URL: {}",
                self.api.base_url
            )));
        }

        if self.scan.fetch_batch_size == 0 || self.scan.analysis_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "Batch sizes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
