//! Configuration for evhz
//!
//! Settings are read once at startup from an optional TOML file. When the
//! file does not exist the built-in defaults are used. The file only covers
//! presentation and source selection; the window size and report cadence
//! are fixed in [`crate::rate::CAPACITY`] and [`crate::reporter::REPORT_INTERVAL`].
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/evhz/config.toml` |
//! | macOS | `~/Library/Application Support/evhz/config.toml` |
//! | Windows | `%APPDATA%\evhz\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use evhz::Config;
//!
//! let config = Config::load().unwrap_or_default();
//! println!("Polling at {} Hz", config.source.frame_rate_hz);
//! ```

use crate::reporter::DEFAULT_PRECISION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Largest supported number of decimal places in report lines
const MAX_PRECISION: usize = 9;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// A setting is out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Returns the path to the config file.
///
/// Does not create anything; a missing file simply means defaults.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("evhz").join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Report formatting and export
    #[serde(default)]
    pub report: ReportConfig,
    /// Event source selection and loop pacing
    #[serde(default)]
    pub source: SourceConfig,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Decimal places for rates
    pub precision: usize,
    /// Write a JSON session report here on exit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            export_path: None,
        }
    }
}

/// Which event source backend to open
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// evdev when available, terminal otherwise
    Auto,
    Terminal,
    Evdev,
}

/// Event source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Loop iterations per second
    pub frame_rate_hz: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Auto,
            frame_rate_hz: 60,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "report.precision must be at most {}",
                MAX_PRECISION
            )));
        }
        if self.source.frame_rate_hz == 0 {
            return Err(ConfigError::Invalid(
                "source.frame_rate_hz must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get loop frame interval as Duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.source.frame_rate_hz.max(1) as u64)
    }
}
