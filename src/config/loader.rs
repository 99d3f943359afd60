use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::NavigationConfig;

/// Largest rapid window still considered "tens of milliseconds".
pub const MAX_RAPID_WINDOW_MS: u64 = 250;

/// Largest accepted back-navigation decay window.
pub const MAX_DECAY_WINDOW_MS: u64 = 10_000;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl NavigationConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/navguard/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("navguard").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `NavigationConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(NavigationConfig::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: NavigationConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The rapid window is non-zero and at most [`MAX_RAPID_WINDOW_MS`]
    /// - The decay window is non-zero and at most [`MAX_DECAY_WINDOW_MS`]
    /// - The programmatic reset is non-zero
    /// - The back button root path is absolute
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rapid = self.guard.rapid_window_ms;
        if rapid == 0 || rapid > MAX_RAPID_WINDOW_MS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "guard.rapid_window_ms must be between 1 and {}, got {}",
                    MAX_RAPID_WINDOW_MS, rapid
                ),
            });
        }

        let decay = self.detector.decay_window_ms;
        if decay == 0 || decay > MAX_DECAY_WINDOW_MS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "detector.decay_window_ms must be between 1 and {}, got {}",
                    MAX_DECAY_WINDOW_MS, decay
                ),
            });
        }

        if self.guard.programmatic_reset_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "guard.programmatic_reset_ms must be greater than 0".to_string(),
            });
        }

        if !self.back_button.root_path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "back_button.root_path must start with '/', got '{}'",
                    self.back_button.root_path
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
