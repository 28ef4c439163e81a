//! Monitor configuration
//!
//! Supports loading from TOML and overriding thresholds from environment
//! variables.

use assetlift_core::error::{AssetLiftError, Result};
use assetlift_core::strategy::MemoryThresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment overrides for the tier thresholds (bytes)
pub const ENV_FULL_BYTES: &str = "ASSETLIFT_MEMORY_FULL_BYTES";
pub const ENV_REDUCED_BYTES: &str = "ASSETLIFT_MEMORY_REDUCED_BYTES";
pub const ENV_MINIMAL_BYTES: &str = "ASSETLIFT_MEMORY_MINIMAL_BYTES";

/// Resource strategy monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Tier thresholds
    #[serde(flatten)]
    pub thresholds: MemoryThresholds,

    /// Publish gauges/counters through the `metrics` facade
    #[serde(default = "default_record_metrics")]
    pub record_metrics: bool,
}

fn default_record_metrics() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: MemoryThresholds::default(),
            record_metrics: default_record_metrics(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content)
            .map_err(|e| AssetLiftError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with any threshold environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Overlay threshold environment variables onto this configuration
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| {
            std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
        })
    }

    /// Overlay threshold values looked up by variable name.
    ///
    /// A variable that is set but is not a plain byte count is an error.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str, current: u64| -> Result<u64> {
            match lookup(name) {
                None => Ok(current),
                Some(value) => value.trim().parse::<u64>().map_err(|e| {
                    AssetLiftError::Configuration(format!(
                        "{} must be a byte count, got {:?}: {}",
                        name, value, e
                    ))
                }),
            }
        };

        self.thresholds.full_min_bytes = read(ENV_FULL_BYTES, self.thresholds.full_min_bytes)?;
        self.thresholds.reduced_min_bytes =
            read(ENV_REDUCED_BYTES, self.thresholds.reduced_min_bytes)?;
        self.thresholds.minimal_min_bytes =
            read(ENV_MINIMAL_BYTES, self.thresholds.minimal_min_bytes)?;

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.thresholds.is_valid() {
            return Err(AssetLiftError::Configuration(format!(
                "memory thresholds must strictly descend and be non-zero (full {} > reduced {} > minimal {} > 0)",
                self.thresholds.full_min_bytes,
                self.thresholds.reduced_min_bytes,
                self.thresholds.minimal_min_bytes
            )));
        }
        Ok(())
    }
}
