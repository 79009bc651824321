//! TMDB-compatible catalog backend.

mod client;
mod wire;

pub use client::TmdbClient;
