//! Favorites persisted as a JSON object on disk.
//!
//! File format: `{ "movie:550": true, "tv:1399": true }`. Only `true` entries
//! are written; unknown keys are skipped on load.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::RwLock;

use super::{FavoriteKey, FavoriteStore, StoreError};
use crate::catalog::{ItemId, ItemKind};

/// File-backed favorites with an in-memory read cache.
pub struct JsonFavoriteStore {
    path: PathBuf,
    entries: Arc<RwLock<BTreeSet<FavoriteKey>>>,
    // Serialises writers so a slower write cannot overwrite a newer one.
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFavoriteStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        tracing::debug!(path = %path.display(), count = entries.len(), "Loaded favorites");

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Favorite ids of one kind, ascending.
    pub fn favorites(&self, kind: ItemKind) -> Vec<ItemId> {
        self.entries
            .read()
            .iter()
            .filter(|key| key.kind == kind)
            .map(|key| key.id)
            .collect()
    }
}

#[async_trait]
impl FavoriteStore for JsonFavoriteStore {
    fn is_favorite(&self, key: &FavoriteKey) -> bool {
        self.entries.read().contains(key)
    }

    async fn set_favorite(&self, key: &FavoriteKey, value: bool) -> Result<(), StoreError> {
        let _writer = self.write_lock.lock().await;

        let mut next = self.entries.read().clone();
        let changed = if value {
            next.insert(*key)
        } else {
            next.remove(key)
        };
        if !changed {
            return Ok(());
        }

        let path = self.path.clone();
        let to_write = next.clone();
        tokio::task::spawn_blocking(move || write_entries(&path, &to_write))
            .await
            .map_err(|e| StoreError::Unavailable(format!("favorites writer failed: {}", e)))??;

        *self.entries.write() = next;
        tracing::info!(key = %key, value, "Favorite saved");
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeSet<FavoriteKey>, StoreError> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }

    let content = fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    let raw: BTreeMap<String, bool> =
        serde_json::from_str(&content).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut entries = BTreeSet::new();
    for (key, value) in raw {
        match key.parse::<FavoriteKey>() {
            Ok(parsed) if value => {
                entries.insert(parsed);
            }
            Ok(_) => {}
            Err(reason) => tracing::warn!(%reason, "Skipping unreadable favorite entry"),
        }
    }
    Ok(entries)
}

fn write_entries(path: &Path, entries: &BTreeSet<FavoriteKey>) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let lock_path = path.with_extension("lock");
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(io_err)?;
    lock.lock_exclusive().map_err(io_err)?;

    let body: BTreeMap<String, bool> = entries.iter().map(|k| (k.to_string(), true)).collect();
    let json = serde_json::to_string_pretty(&body)?;

    let tmp_path = path.with_extension("json.tmp");
    let result = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&tmp_path, path))
        .map_err(io_err);

    let _ = FileExt::unlock(&lock);
    result
}
