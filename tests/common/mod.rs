//! Shared test utilities: scripted collaborators for the collection controller.

#![allow(dead_code, unused_imports)]

pub mod mock_api;

use async_trait::async_trait;
use cinelist::catalog::{
    CatalogItem, FetchError, ItemId, ItemPage, Movie, PageFetcher, QueryParameters, Resource,
    TvShow,
};
use cinelist::favorites::{FavoriteKey, FavoriteStore, StoreError};
use parking_lot::Mutex;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub fn movie(id: u64) -> Movie {
    Movie {
        id: ItemId(id),
        title: format!("Movie {}", id),
        overview: format!("Overview of movie {}", id),
        poster_path: Some(format!("/poster{}.jpg", id)),
        vote_average: 7.0,
        release_date: None,
        is_favorite: false,
    }
}

/// Movies with ids `from..from + count`.
pub fn movies(from: u64, count: u64) -> Vec<Movie> {
    (from..from + count).map(movie).collect()
}

pub fn tv_show(id: u64) -> TvShow {
    TvShow {
        id: ItemId(id),
        name: format!("Show {}", id),
        overview: format!("Overview of show {}", id),
        poster_path: None,
        vote_average: 8.0,
        first_air_date: None,
        is_favorite: false,
    }
}

/// Shows with ids `from..from + count`.
pub fn tv_shows(from: u64, count: u64) -> Vec<TvShow> {
    (from..from + count).map(tv_show).collect()
}

pub fn ids<I: CatalogItem>(items: &[I]) -> Vec<u64> {
    items.iter().map(|item| item.id().0).collect()
}

/// What a scripted fetch returns.
pub enum Outcome<I> {
    Items(Vec<I>),
    Status(u16),
    Timeout,
}

struct Step<I> {
    outcome: Outcome<I>,
    gate: Option<Arc<Notify>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub page: u32,
    pub query: QueryParameters,
}

/// Page fetcher that replays queued outcomes in order. Once the script runs
/// out it answers with empty pages.
pub struct ScriptedFetcher<I> {
    steps: Mutex<VecDeque<Step<I>>>,
    calls: Mutex<Vec<FetchCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl<I> Default for ScriptedFetcher<I> {
    fn default() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl<I: CatalogItem> ScriptedFetcher<I> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, outcome: Outcome<I>) {
        self.steps.lock().push_back(Step {
            outcome,
            gate: None,
        });
    }

    pub fn push_page(&self, items: Vec<I>) {
        self.push(Outcome::Items(items));
    }

    /// Queue an outcome that is held back until the returned gate is
    /// notified with `notify_one`.
    pub fn push_gated(&self, outcome: Outcome<I>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.steps.lock().push_back(Step {
            outcome,
            gate: Some(Arc::clone(&gate)),
        });
        gate
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.calls.lock().iter().map(|c| c.page).collect()
    }

    /// Most fetch futures that were alive at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` fetches have started.
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.call_count() < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("timed out waiting for fetch calls");
    }
}

#[async_trait]
impl<I: CatalogItem> PageFetcher<I> for ScriptedFetcher<I> {
    async fn fetch_page(&self, page: u32, query: &QueryParameters) -> Resource<ItemPage<I>> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let _running = scopeguard::guard(&self.in_flight, |count| {
            count.fetch_sub(1, Ordering::SeqCst);
        });

        let step = self.steps.lock().pop_front();
        self.calls.lock().push(FetchCall {
            page,
            query: query.clone(),
        });

        let Some(step) = step else {
            return Resource::Success(ItemPage::new(page, Vec::new()));
        };
        if let Some(gate) = step.gate {
            gate.notified().await;
        }

        match step.outcome {
            Outcome::Items(items) => Resource::Success(ItemPage::new(page, items)),
            Outcome::Status(status) => Resource::Failure(FetchError::Status {
                status,
                message: "scripted failure".to_string(),
            }),
            Outcome::Timeout => Resource::Failure(FetchError::Timeout { duration: 1 }),
        }
    }
}

/// In-memory favorite store with switchable failure and an optional gate on
/// writes.
#[derive(Default)]
pub struct MemoryFavoriteStore {
    entries: Mutex<BTreeSet<FavoriteKey>>,
    writes: Mutex<Vec<(FavoriteKey, bool)>>,
    fail: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryFavoriteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_favorites(keys: &[FavoriteKey]) -> Arc<Self> {
        let store = Self::default();
        store.entries.lock().extend(keys.iter().copied());
        Arc::new(store)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Hold the next writes until the returned gate is notified.
    pub fn gate_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn writes(&self) -> Vec<(FavoriteKey, bool)> {
        self.writes.lock().clone()
    }

    pub fn contains(&self, key: &FavoriteKey) -> bool {
        self.entries.lock().contains(key)
    }
}

#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    fn is_favorite(&self, key: &FavoriteKey) -> bool {
        self.entries.lock().contains(key)
    }

    async fn set_favorite(&self, key: &FavoriteKey, value: bool) -> Result<(), StoreError> {
        self.writes.lock().push((*key, value));

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }

        let mut entries = self.entries.lock();
        if value {
            entries.insert(*key);
        } else {
            entries.remove(key);
        }
        Ok(())
    }
}
