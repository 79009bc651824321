//! Marker trait for intents.

/// Something that happened: a user action (refresh, toggle favorite) or the
/// outcome of an asynchronous call (page loaded, answer received).
pub trait Intent: Send + 'static {}
