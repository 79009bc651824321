//! Intents accepted by the collection reducer.

use crate::catalog::{CatalogItem, ErrorKind, ItemId, QueryParameters};
use crate::mvi::Intent;

#[derive(Debug, Clone)]
pub enum CollectionIntent<I> {
    /// Start over with `query`: page 1, empty collection, `Loading`.
    Reset { query: QueryParameters },

    /// A page request left; marks the controller busy.
    LoadStarted,

    /// A page arrived.
    PageLoaded {
        generation: u64,
        /// Append to the collection instead of replacing it.
        continuation: bool,
        items: Vec<I>,
    },

    /// A page request failed.
    PageFailed {
        generation: u64,
        page: u32,
        kind: ErrorKind,
    },

    /// The request for `generation` finished, whatever the outcome.
    LoadSettled { generation: u64 },

    /// Set the favorite flag of one item in place.
    FavoriteSet { id: ItemId, value: bool },

    /// Persisting a favorite failed: restore `restored` and raise a notice.
    FavoriteRolledBack {
        id: ItemId,
        restored: bool,
        reason: String,
    },

    LastViewedChanged { index: usize },

    NoticeDismissed,
}

impl<I: CatalogItem> Intent for CollectionIntent<I> {}
