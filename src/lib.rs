//! Paginated, searchable movie and TV catalogs with favorites.

pub mod ai;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod favorites;
pub mod logging;
pub mod mvi;
pub mod session;
pub mod tmdb;
