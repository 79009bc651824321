use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable consulted when `catalog.api_key` is unset.
pub const CATALOG_KEY_ENV: &str = "TMDB_API_KEY";
/// Environment variable consulted when `ai.api_key` is unset.
pub const AI_KEY_ENV: &str = "ANTHROPIC_API_KEY";

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

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/cinelist/config.toml` on Unix,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("cinelist").join("config.toml")
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, starts from `Config::default()`.
    /// - Missing API keys are filled from the environment.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Self::parse(&content, path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Fill unset API keys from `lookup` (normally the process environment).
    pub fn apply_env_overrides<L>(&mut self, lookup: L)
    where
        L: Fn(&str) -> Option<String>,
    {
        if self.catalog.api_key.is_none() {
            self.catalog.api_key = lookup(CATALOG_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
        if self.ai.api_key.is_none() {
            self.ai.api_key = lookup(AI_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Base URLs are non-empty http(s) URLs
    /// - Timeouts and token limits are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("catalog.base_url", &self.catalog.base_url),
            ("ai.base_url", &self.ai.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError {
                    message: format!("{} must be an http(s) URL, got '{}'", name, url),
                });
            }
        }

        if self.catalog.timeout_seconds == 0 || self.catalog.connect_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "catalog timeouts must be greater than zero".to_string(),
            });
        }

        if self.ai.max_tokens == 0 || self.ai.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "ai.max_tokens and ai.timeout_seconds must be greater than zero"
                    .to_string(),
            });
        }

        Ok(())
    }
}
