//! Application configuration loading from config.toml
//!
//! Only the overdue sweep is tunable today. A missing file yields the defaults;
//! a file that exists but does not parse is an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "RENTALDESK_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Overdue sweep scheduling
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Scheduling of the overdue sweep
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SweepConfig {
    /// Seconds between two sweeps
    pub interval_secs: u64,
    /// Whether to sweep once immediately when the scheduler starts
    pub run_on_startup: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            run_on_startup: true,
        }
    }
}

impl SweepConfig {
    /// Interval between sweeps; never shorter than one second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `$RENTALDESK_CONFIG` or `./config.toml`,
/// falling back to defaults when the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No config file at {}, using defaults", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}
