//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::ranking::{TieBreakerOrder, UnknownTieBreaker, DEFAULT_TIE_BREAKERS};
use crate::calculate::schedule::{DEFAULT_RECENT_ROUNDS, DEFAULT_UPCOMING_ROUNDS};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid ranking configuration: {0}")]
    UnknownTieBreaker(#[from] UnknownTieBreaker),
}

/// Tie-breaker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Tie-breaker names in the order they are applied
    #[serde(default = "default_tie_breakers")]
    pub tie_breakers: Vec<String>,
}

fn default_tie_breakers() -> Vec<String> {
    DEFAULT_TIE_BREAKERS.iter().map(|s| s.to_string()).collect()
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            tie_breakers: default_tie_breakers(),
        }
    }
}

/// How many rounds the schedule listing shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_upcoming_rounds")]
    pub upcoming_rounds: usize,

    #[serde(default = "default_recent_rounds")]
    pub recent_rounds: usize,
}

fn default_upcoming_rounds() -> usize {
    DEFAULT_UPCOMING_ROUNDS
}

fn default_recent_rounds() -> usize {
    DEFAULT_RECENT_ROUNDS
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            upcoming_rounds: default_upcoming_rounds(),
            recent_rounds: default_recent_rounds(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Cup used when a command does not name one
    #[serde(default = "default_current_cup")]
    pub current_cup: u32,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_current_cup() -> u32 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            current_cup: default_current_cup(),
            ranking: RankingConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.current_cup == 0 {
            return Err(ConfigError::ValidationError(
                "Current cup number must be greater than 0".to_string(),
            ));
        }

        self.tie_breaker_order()?;

        Ok(())
    }

    /// Resolve the configured tie-breaker names.
    pub fn tie_breaker_order(&self) -> Result<TieBreakerOrder, UnknownTieBreaker> {
        TieBreakerOrder::from_names(&self.ranking.tie_breakers)
    }
}
