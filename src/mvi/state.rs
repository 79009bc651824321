//! Marker trait for reducer-owned state.

/// State owned by a reducer.
///
/// `Default` is the state a fresh session starts in; `PartialEq` lets drivers
/// skip publishing when nothing changed.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
