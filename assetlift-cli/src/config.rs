//! CLI configuration
//!
//! Config directory: ~/.assetlift/ (cross-platform)
//!
//! Config file format (~/.assetlift/config.toml):
//! ```toml
//! [storage]
//! path = "/home/me/.assetlift/sessions"
//! prefix = "assetlift:upload-session:"
//!
//! [monitor]
//! full_min_bytes = 2147483648
//! reduced_min_bytes = 1073741824
//! minimal_min_bytes = 536870912
//! record_metrics = true
//! ```

use anyhow::{Context, Result};
use assetlift_monitor::MonitorConfig;
use assetlift_storage::DEFAULT_PREFIX;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Structure of ~/.assetlift/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssetLiftConfig {
    /// Session database settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Memory strategy thresholds
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Session database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Sled database directory
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key namespace for this client's sessions
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            prefix: default_storage_prefix(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    if let Ok(path) = std::env::var("ASSETLIFT_SESSION_DB") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .map(|home| home.join(".assetlift").join("sessions"))
        .unwrap_or_else(|| PathBuf::from("./assetlift_sessions"))
}

fn default_storage_prefix() -> String {
    std::env::var("ASSETLIFT_SESSION_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Get the config directory path (~/.assetlift/)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_dir = home.join(".assetlift");

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory ~/.assetlift/")?;
    }

    Ok(config_dir)
}

/// Get the config file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from ~/.assetlift/config.toml
/// Falls back to defaults if the file doesn't exist or can't be parsed
pub fn load_config() -> AssetLiftConfig {
    match config_file_path() {
        Ok(path) if path.exists() => load_config_from(&path).unwrap_or_else(|e| {
            eprintln!("Warning: {:#}", e);
            AssetLiftConfig::default()
        }),
        _ => AssetLiftConfig::default(),
    }
}

/// Load configuration from an explicit file
pub fn load_config_from(path: &Path) -> Result<AssetLiftConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    let config: AssetLiftConfig =
        toml::from_str(&content).context("Failed to parse config file")?;
    config
        .monitor
        .validate()
        .context("Invalid [monitor] section")?;
    Ok(config)
}

/// Save configuration to ~/.assetlift/config.toml
pub fn save_config(config: &AssetLiftConfig) -> Result<PathBuf> {
    let path = config_file_path()?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save configuration to an explicit file
pub fn save_config_to(config: &AssetLiftConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}
