// Configuration module for sigdb
// Reads from environment variables with sensible defaults

use crate::registry::pypi::DEFAULT_INDEX_URL;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Packages attempted per run at most (SIGDB_BATCH_SIZE)
    pub batch_size: usize,

    /// Wall-clock budget of one run in seconds (SIGDB_TIME_LIMIT_SECS)
    pub time_limit_secs: u64,

    /// Timeout for version lookups in seconds (SIGDB_RESOLVE_TIMEOUT_SECS)
    pub resolve_timeout_secs: u64,

    /// Timeout for artifact downloads in seconds, 0 disables it (SIGDB_DOWNLOAD_TIMEOUT_SECS)
    pub download_timeout_secs: u64,

    /// Base URL of the JSON package index (SIGDB_INDEX_URL)
    pub index_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 500,
            time_limit_secs: 3300,
            resolve_timeout_secs: 10,
            download_timeout_secs: 600,
            index_url: DEFAULT_INDEX_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(val) = lookup("SIGDB_BATCH_SIZE") {
            match val.parse::<usize>() {
                Ok(parsed) if parsed > 0 => config.batch_size = parsed,
                _ => warn!(
                    "Invalid SIGDB_BATCH_SIZE value: {}, using default: {}",
                    val, config.batch_size
                ),
            }
        }

        if let Some(val) = lookup("SIGDB_TIME_LIMIT_SECS") {
            if let Ok(parsed) = val.parse() {
                config.time_limit_secs = parsed;
            } else {
                warn!(
                    "Invalid SIGDB_TIME_LIMIT_SECS value: {}, using default: {}",
                    val, config.time_limit_secs
                );
            }
        }

        if let Some(val) = lookup("SIGDB_RESOLVE_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(parsed) if parsed > 0 => config.resolve_timeout_secs = parsed,
                _ => warn!(
                    "Invalid SIGDB_RESOLVE_TIMEOUT_SECS value: {}, using default: {}",
                    val, config.resolve_timeout_secs
                ),
            }
        }

        if let Some(val) = lookup("SIGDB_DOWNLOAD_TIMEOUT_SECS") {
            if let Ok(parsed) = val.parse() {
                config.download_timeout_secs = parsed;
            } else {
                warn!(
                    "Invalid SIGDB_DOWNLOAD_TIMEOUT_SECS value: {}, using default: {}",
                    val, config.download_timeout_secs
                );
            }
        }

        if let Some(val) = lookup("SIGDB_INDEX_URL") {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                warn!("Empty SIGDB_INDEX_URL, using default: {}", config.index_url);
            } else {
                config.index_url = trimmed.to_string();
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn download_timeout(&self) -> Option<Duration> {
        match self.download_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
