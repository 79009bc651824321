use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{ItemKind, SortOption};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
}

/// Catalog API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL including the version segment (e.g., "https://api.themoviedb.org/3").
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// v3 API key or v4 read access token. Falls back to `TMDB_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Response language (e.g., "en-US").
    #[serde(default = "default_language")]
    pub language: String,
    /// Request timeout in seconds (default: 15).
    #[serde(default = "default_catalog_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Max retry attempts for connection errors and throttling (default: 2).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds for retry (default: 250).
    #[serde(default = "default_retry_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
}

/// Settings for the "ask AI about this item" client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Anthropic-compatible API base URL.
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where favorites are kept. Defaults to the platform data directory.
    #[serde(default)]
    pub favorites_path: Option<PathBuf>,
}

/// What a new browsing session starts with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default)]
    pub default_sort: SortOption,
    #[serde(default)]
    pub default_kind: ItemKind,
}

fn default_catalog_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_catalog_timeout() -> u32 {
    15
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_base_ms() -> u64 {
    250
}

fn default_ai_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ai_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_ai_max_tokens() -> u32 {
    512
}

fn default_ai_timeout() -> u32 {
    60
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            api_key: None,
            language: default_language(),
            timeout_seconds: default_catalog_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_base_ms: default_retry_backoff_base_ms(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            api_key: None,
            model: default_ai_model(),
            max_tokens: default_ai_max_tokens(),
            timeout_seconds: default_ai_timeout(),
        }
    }
}

impl StorageConfig {
    /// Configured favorites path, or `<data dir>/cinelist/favorites.json`.
    pub fn resolved_favorites_path(&self) -> PathBuf {
        self.favorites_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cinelist")
                .join("favorites.json")
        })
    }
}
