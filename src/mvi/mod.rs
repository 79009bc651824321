//! Model-View-Intent primitives shared by the collection and ask-AI state machines.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Snapshot ──→ View
//!    ↑                                            │
//!    └────────────────────────────────────────────┘
//! ```
//!
//! Reducers hold no I/O. Drivers (`CollectionController`, `AskSession`) perform
//! the asynchronous work and feed its outcome back as intents.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
