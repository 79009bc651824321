//! Paginated, filterable, searchable collection.
//!
//! [`CollectionController`] owns one session: it issues page fetches through a
//! [`PageFetcher`](crate::catalog::PageFetcher), merges results, reacts to
//! query changes, and publishes [`CollectionSnapshot`]s. The transitions
//! themselves live in [`CollectionReducer`] and can be exercised without a
//! runtime.

mod controller;
mod intent;
mod reducer;
mod state;

pub use controller::CollectionController;
pub use intent::CollectionIntent;
pub use reducer::CollectionReducer;
pub use state::{CollectionSnapshot, CollectionState, Notice, PageState, ViewState};
