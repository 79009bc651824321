//! Collection state and the snapshot published to observers.

use crate::catalog::{CatalogItem, ErrorKind, ItemId, QueryParameters};
use crate::mvi::UiState;

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<I> {
    /// First page outstanding (initial state, and after every reset).
    Loading,
    /// Items loaded so far, in arrival order.
    Success(Vec<I>),
    /// The first page failed; only `retry` leaves this state.
    Error(ErrorKind),
}

impl<I> Default for ViewState<I> {
    fn default() -> Self {
        ViewState::Loading
    }
}

impl<I> ViewState<I> {
    /// Items currently shown; empty unless `Success`.
    pub fn items(&self) -> &[I] {
        match self {
            ViewState::Success(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            ViewState::Error(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Pagination bookkeeping. Never published directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// Next page to request; starts at 1.
    pub current_page: u32,
    pub is_last_page: bool,
    pub is_loading_page: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            is_last_page: false,
            is_loading_page: false,
        }
    }
}

impl PageState {
    pub fn can_load_more(&self) -> bool {
        !self.is_last_page && !self.is_loading_page
    }
}

/// Transient, dismissible signal that does not change the view state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A continuation page failed; already loaded items are kept.
    PageLoadFailed { page: u32, kind: ErrorKind },
    /// Persisting a favorite failed and the flag was rolled back.
    FavoriteNotSaved { id: ItemId, reason: String },
}

/// Full state owned by the collection reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<I> {
    pub view: ViewState<I>,
    pub page: PageState,
    pub query: QueryParameters,
    /// Bumped on every reset; results tagged with an older value are stale.
    pub generation: u64,
    pub last_viewed_index: usize,
    pub notice: Option<Notice>,
}

impl<I> Default for CollectionState<I> {
    fn default() -> Self {
        Self::new(QueryParameters::default())
    }
}

impl<I: CatalogItem> UiState for CollectionState<I> {}

impl<I> CollectionState<I> {
    pub fn new(query: QueryParameters) -> Self {
        Self {
            view: ViewState::Loading,
            page: PageState::default(),
            query,
            generation: 0,
            last_viewed_index: 0,
            notice: None,
        }
    }

    pub fn items(&self) -> &[I] {
        self.view.items()
    }
}

impl<I: CatalogItem> CollectionState<I> {
    pub fn find(&self, id: ItemId) -> Option<&I> {
        self.items().iter().find(|item| item.id() == id)
    }

    pub fn snapshot(&self) -> CollectionSnapshot<I> {
        CollectionSnapshot {
            view: self.view.clone(),
            can_load_more: self.page.can_load_more(),
            query: self.query.clone(),
            last_viewed_index: self.last_viewed_index,
            notice: self.notice.clone(),
        }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<I> {
    pub view: ViewState<I>,
    /// `!is_last_page && !is_loading_page`
    pub can_load_more: bool,
    pub query: QueryParameters,
    pub last_viewed_index: usize,
    pub notice: Option<Notice>,
}

impl<I> CollectionSnapshot<I> {
    pub fn items(&self) -> &[I] {
        self.view.items()
    }
}
