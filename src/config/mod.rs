//! Configuration: TOML file plus environment fallbacks for API keys.

mod loader;
mod store;
mod types;

pub use loader::{ConfigError, AI_KEY_ENV, CATALOG_KEY_ENV};
pub use store::ConfigStore;
pub use types::{AiConfig, BrowseConfig, CatalogConfig, Config, StorageConfig};
