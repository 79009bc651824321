//! Async driver for a paginated, searchable collection.
//!
//! The controller turns intents into page fetches and favorite writes, feeds
//! the outcomes through [`CollectionReducer`], and publishes a snapshot after
//! every transition. The state lock is never held across an `.await`.
//!
//! Only one page fetch runs at a time. A reset announces its new generation
//! and the superseded fetch is dropped before the next one is issued.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::catalog::{
    CatalogItem, FilterSet, ItemId, ItemPage, PageFetcher, QueryParameters, Resource,
    SortOption,
};
use crate::favorites::{FavoriteKey, FavoriteStore, FavoriteToggle};
use crate::mvi::Reducer;
use crate::session::SessionScope;

use super::intent::CollectionIntent;
use super::reducer::CollectionReducer;
use super::state::{CollectionSnapshot, CollectionState};

/// Everything a page request needs, captured when it is issued.
#[derive(Debug, Clone)]
struct PageRequest {
    page: u32,
    continuation: bool,
    generation: u64,
    query: QueryParameters,
}

struct Inner<I, F, S> {
    state: Mutex<CollectionState<I>>,
    fetcher: F,
    store: S,
    scope: SessionScope,
    snapshots: watch::Sender<CollectionSnapshot<I>>,
    /// Current reset generation, for cancelling superseded fetches.
    generations: watch::Sender<u64>,
    /// Held for the whole lifetime of a fetch future.
    fetch_slot: tokio::sync::Mutex<()>,
}

/// One collection session over items of type `I`.
///
/// Cheap to clone; clones drive the same session. Call [`discard`](Self::discard)
/// when the owning screen goes away.
pub struct CollectionController<I, F, S> {
    inner: Arc<Inner<I, F, S>>,
}

impl<I, F, S> Clone for CollectionController<I, F, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, F, S> CollectionController<I, F, S>
where
    I: CatalogItem,
    F: PageFetcher<I>,
    S: FavoriteStore,
{
    /// Create a session in `Loading` for `query`. Nothing is fetched until
    /// [`refresh`](Self::refresh) or [`load_next`](Self::load_next).
    pub fn new(fetcher: F, store: S, query: QueryParameters) -> Self {
        let state = CollectionState::new(query);
        let (snapshots, _) = watch::channel(state.snapshot());
        let (generations, _) = watch::channel(state.generation);

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                fetcher,
                store,
                scope: SessionScope::new(),
                snapshots,
                generations,
                fetch_slot: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Observe snapshots. The receiver starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot<I>> {
        self.inner.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> CollectionSnapshot<I> {
        self.inner.state.lock().snapshot()
    }

    pub fn query(&self) -> QueryParameters {
        self.inner.state.lock().query.clone()
    }

    pub fn is_discarded(&self) -> bool {
        self.inner.scope.is_cancelled()
    }

    /// End the session. Outstanding fetches are abandoned and no later result
    /// changes state.
    pub fn discard(&self) {
        tracing::debug!("Discarding collection session");
        self.inner.scope.cancel();
    }

    /// Load the next page of the current query.
    ///
    /// Returns at once when a load is already in flight, the last page was
    /// reached, the view is in `Error` (use [`retry`](Self::retry)), or the
    /// session was discarded.
    pub async fn load_next(&self) {
        let request = {
            let mut state = self.inner.state.lock();
            if self.inner.scope.is_cancelled() {
                return;
            }
            if state.page.is_loading_page || state.page.is_last_page || state.view.is_error() {
                tracing::trace!(
                    loading = state.page.is_loading_page,
                    last = state.page.is_last_page,
                    "load_next ignored"
                );
                return;
            }
            let request = begin_load(&mut *state);
            self.publish(&*state);
            request
        };
        self.run(request).await;
    }

    /// Reload the current query from page 1, replacing the collection.
    pub async fn refresh(&self) {
        let Some(request) = self.reset_with(|state| Some(state.query.clone())) else {
            return;
        };
        self.run(request).await;
    }

    /// Switch to `query`. Identical parameters are a no-op; anything else
    /// resets pagination and loads page 1.
    pub async fn set_query(&self, query: QueryParameters) {
        let request = self.reset_with(|state| {
            if state.query == query {
                tracing::trace!("Query unchanged, keeping collection");
                None
            } else {
                Some(query)
            }
        });
        if let Some(request) = request {
            self.run(request).await;
        }
    }

    pub async fn set_search_text(&self, text: impl Into<String>) {
        let query = self.query().with_search_text(text);
        self.set_query(query).await;
    }

    pub async fn set_sort(&self, sort: SortOption) {
        let query = self.query().with_sort(sort);
        self.set_query(query).await;
    }

    pub async fn set_filters(&self, filters: FilterSet) {
        let query = self.query().with_filters(filters);
        self.set_query(query).await;
    }

    /// Leave the `Error` view by reloading the same query. No-op otherwise.
    pub async fn retry(&self) {
        let request =
            self.reset_with(|state| state.view.is_error().then(|| state.query.clone()));
        if let Some(request) = request {
            self.run(request).await;
        }
    }

    /// Flip the favorite flag of `id`, optimistically.
    ///
    /// The item is updated in place right away; if the store rejects the write
    /// the flag is restored and a [`Notice::FavoriteNotSaved`] is raised.
    /// Returns the item as it stands afterwards, or `None` if it is not in the
    /// collection.
    ///
    /// [`Notice::FavoriteNotSaved`]: super::Notice::FavoriteNotSaved
    pub async fn toggle_favorite(&self, id: ItemId) -> Option<I> {
        let toggle = {
            let mut state = self.inner.state.lock();
            if self.inner.scope.is_cancelled() {
                return None;
            }
            let Some(item) = state.find(id) else {
                tracing::debug!(item_id = %id, "Favorite toggle for unknown item");
                return None;
            };
            let toggle = FavoriteToggle::flip(item);
            reduce(
                &mut *state,
                CollectionIntent::FavoriteSet {
                    id,
                    value: toggle.updated.is_favorite(),
                },
            );
            self.publish(&*state);
            toggle
        };

        match toggle.persist(&self.inner.store).await {
            Ok(()) => {
                // A reload during the write may have brought the item back unflagged.
                self.apply(CollectionIntent::FavoriteSet {
                    id,
                    value: toggle.updated.is_favorite(),
                });
                Some(toggle.updated)
            }
            Err(err) => {
                tracing::warn!(item_id = %id, error = %err, "Favorite not saved, rolling back");
                self.apply(CollectionIntent::FavoriteRolledBack {
                    id,
                    restored: toggle.original.is_favorite(),
                    reason: err.to_string(),
                });
                Some(toggle.original)
            }
        }
    }

    /// Look up an item for a detail view. No side effects.
    pub fn select_item(&self, id: ItemId) -> Option<I> {
        self.inner.state.lock().find(id).cloned()
    }

    /// Remember the scroll position so a returning view can restore it.
    pub fn set_last_viewed_index(&self, index: usize) {
        self.apply(CollectionIntent::LastViewedChanged { index });
    }

    pub fn dismiss_notice(&self) {
        self.apply(CollectionIntent::NoticeDismissed);
    }

    /// Reset under the lock if `decide` returns the query to reset to.
    fn reset_with<D>(&self, decide: D) -> Option<PageRequest>
    where
        D: FnOnce(&CollectionState<I>) -> Option<QueryParameters>,
    {
        let mut state = self.inner.state.lock();
        if self.inner.scope.is_cancelled() {
            return None;
        }
        let query = decide(&*state)?;
        reduce(&mut *state, CollectionIntent::Reset { query });
        tracing::info!(generation = state.generation, "Collection reset");
        self.inner.generations.send_replace(state.generation);
        let request = begin_load(&mut *state);
        self.publish(&*state);
        Some(request)
    }

    async fn run(&self, request: PageRequest) {
        // Release the busy flag however this future ends: success, failure,
        // session discard, or the caller dropping it.
        let _settle = scopeguard::guard(request.generation, |generation| {
            self.apply(CollectionIntent::LoadSettled { generation });
        });

        tracing::debug!(
            page = request.page,
            continuation = request.continuation,
            generation = request.generation,
            "Fetching page"
        );

        let reset = superseded(self.inner.generations.subscribe(), request.generation);
        let resource = tokio::select! {
            _ = self.inner.scope.cancelled() => {
                tracing::debug!(page = request.page, "Session discarded, dropping fetch");
                return;
            }
            _ = reset => {
                tracing::debug!(
                    page = request.page,
                    generation = request.generation,
                    "Query reset, dropping fetch"
                );
                return;
            }
            resource = self.fetch_exclusive(&request) => resource,
        };

        let intent = match resource {
            Resource::Success(page) => {
                tracing::debug!(
                    page = request.page,
                    count = page.items.len(),
                    total_pages = ?page.total_pages,
                    "Page loaded"
                );
                let items = page
                    .items
                    .into_iter()
                    .map(|item| self.flag_favorite(item))
                    .collect();
                CollectionIntent::PageLoaded {
                    generation: request.generation,
                    continuation: request.continuation,
                    items,
                }
            }
            Resource::Failure(err) => {
                let kind = err.kind();
                tracing::warn!(
                    page = request.page,
                    kind = kind.as_str(),
                    error = %err,
                    "Page load failed"
                );
                CollectionIntent::PageFailed {
                    generation: request.generation,
                    page: request.page,
                    kind,
                }
            }
        };

        self.apply(intent);
    }

    /// Wait for any previous fetch future to be dropped, then fetch.
    async fn fetch_exclusive(&self, request: &PageRequest) -> Resource<ItemPage<I>> {
        let _slot = self.inner.fetch_slot.lock().await;
        self.inner
            .fetcher
            .fetch_page(request.page, &request.query)
            .await
    }

    fn flag_favorite(&self, item: I) -> I {
        if !item.is_favorite() && self.inner.store.is_favorite(&FavoriteKey::of(&item)) {
            item.with_favorite(true)
        } else {
            item
        }
    }

    fn apply(&self, intent: CollectionIntent<I>) {
        let mut state = self.inner.state.lock();
        if self.inner.scope.is_cancelled() {
            return;
        }
        reduce(&mut *state, intent);
        self.publish(&*state);
    }

    /// Send while still holding the state lock so snapshots go out in order.
    fn publish(&self, state: &CollectionState<I>) {
        let snapshot = state.snapshot();
        self.inner.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

impl<I, F, S> CollectionController<I, F, S>
where
    I: CatalogItem,
    F: PageFetcher<I> + 'static,
    S: FavoriteStore + 'static,
{
    /// Run [`load_next`](Self::load_next) on the runtime, for callers that
    /// cannot await (scroll callbacks).
    pub fn spawn_load_next(&self) -> tokio::task::JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.load_next().await })
    }
}

/// Resolves once the reset generation moves past `generation`.
async fn superseded(mut generations: watch::Receiver<u64>, generation: u64) {
    loop {
        let current = *generations.borrow_and_update();
        if current != generation {
            return;
        }
        if generations.changed().await.is_err() {
            // Sender lives as long as the controller.
            std::future::pending::<()>().await;
        }
    }
}

fn reduce<I: CatalogItem>(state: &mut CollectionState<I>, intent: CollectionIntent<I>) {
    let current = std::mem::take(state);
    *state = CollectionReducer::reduce(current, intent);
}

/// Mark the state busy and describe the request to send.
fn begin_load<I: CatalogItem>(state: &mut CollectionState<I>) -> PageRequest {
    reduce(state, CollectionIntent::LoadStarted);
    PageRequest {
        page: state.page.current_page,
        continuation: state.page.current_page > 1,
        generation: state.generation,
        query: state.query.clone(),
    }
}
