//! Favorite flags: the persistence seam and the optimistic toggle.

mod json_store;

pub use json_store::JsonFavoriteStore;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{CatalogItem, ItemId, ItemKind};

/// Errors raised by a favorites store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access favorites file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode favorites: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to parse favorites file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Favorites store unavailable: {0}")]
    Unavailable(String),
}

/// Store key for one item: `"{kind}:{id}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FavoriteKey {
    pub kind: ItemKind,
    pub id: ItemId,
}

impl FavoriteKey {
    pub fn new(kind: ItemKind, id: ItemId) -> Self {
        Self { kind, id }
    }

    pub fn of<I: CatalogItem>(item: &I) -> Self {
        Self::new(I::KIND, item.id())
    }
}

impl fmt::Display for FavoriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for FavoriteKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("favorite key '{}' is missing ':'", s))?;
        let kind = kind.parse::<ItemKind>()?;
        let id = id
            .parse::<u64>()
            .map_err(|e| format!("favorite key '{}' has a bad id: {}", s, e))?;
        Ok(Self::new(kind, ItemId(id)))
    }
}

/// Persistent record of which items are favorites.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Cached read, used to flag freshly fetched items. Must not block.
    fn is_favorite(&self, key: &FavoriteKey) -> bool;

    /// Record the new value. Resolves once it is durable or has failed.
    async fn set_favorite(&self, key: &FavoriteKey, value: bool) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: FavoriteStore + ?Sized> FavoriteStore for std::sync::Arc<T> {
    fn is_favorite(&self, key: &FavoriteKey) -> bool {
        (**self).is_favorite(key)
    }

    async fn set_favorite(&self, key: &FavoriteKey, value: bool) -> Result<(), StoreError> {
        (**self).set_favorite(key, value).await
    }
}

/// One favorite flip: the record before and after.
///
/// The controller shows `updated` right away and falls back to `original` if
/// [`persist`](Self::persist) fails.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteToggle<I> {
    pub original: I,
    pub updated: I,
}

impl<I: CatalogItem> FavoriteToggle<I> {
    pub fn flip(item: &I) -> Self {
        Self {
            original: item.clone(),
            updated: item.with_favorite(!item.is_favorite()),
        }
    }

    pub fn key(&self) -> FavoriteKey {
        FavoriteKey::of(&self.updated)
    }

    pub async fn persist<S>(&self, store: &S) -> Result<(), StoreError>
    where
        S: FavoriteStore + ?Sized,
    {
        let key = self.key();
        let value = self.updated.is_favorite();
        tracing::debug!(key = %key, value, "Persisting favorite");
        store.set_favorite(&key, value).await
    }
}
