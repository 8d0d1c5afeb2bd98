//! Configuration management for the rate limiter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SluiceError};

/// Configuration for the rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Default rate limit in requests per minute, applied when a call
    /// carries no per-caller override. Zero selects the built-in
    /// default of 600 (10 requests per second).
    #[serde(default = "default_rate_per_minute")]
    pub rate_per_minute: u32,

    /// Hard cap on the number of per-key buckets held in memory.
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,

    /// How often the opportunistic stale-bucket sweep runs, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// How long a bucket may go untouched before a sweep removes it,
    /// in seconds.
    #[serde(default = "default_inactive_threshold")]
    pub inactive_threshold_secs: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            rate_per_minute: default_rate_per_minute(),
            max_buckets: default_max_buckets(),
            cleanup_interval_secs: default_cleanup_interval(),
            inactive_threshold_secs: default_inactive_threshold(),
        }
    }
}

fn default_rate_per_minute() -> u32 {
    600
}

fn default_max_buckets() -> usize {
    10_000
}

fn default_cleanup_interval() -> u64 {
    300
}

fn default_inactive_threshold() -> u64 {
    900
}

impl LimiterConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LimiterConfig = serde_yaml::from_str(&contents)
            .map_err(|e| SluiceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_buckets == 0 {
            return Err(SluiceError::Config(
                "max_buckets must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(SluiceError::Config(
                "cleanup_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.inactive_threshold_secs == 0 {
            return Err(SluiceError::Config(
                "inactive_threshold_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Interval between opportunistic stale sweeps.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Inactivity threshold beyond which a bucket is considered stale.
    pub fn inactive_threshold(&self) -> Duration {
        Duration::from_secs(self.inactive_threshold_secs)
    }
}
