//! Catalog domain: item records, query parameters, and the page-fetch seam.

mod error;
mod fetcher;
mod query;
mod resource;

pub use error::{ErrorKind, FetchError};
pub use fetcher::PageFetcher;
pub use query::{FilterSet, ParseSortError, QueryParameters, SortOption};
pub use resource::{ItemPage, Resource};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Catalog identifier, unique within one [`ItemKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The kinds of catalog entries a collection can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Movie,
    Tv,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Movie => "movie",
            ItemKind::Tv => "tv",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(ItemKind::Movie),
            "tv" | "show" | "shows" => Ok(ItemKind::Tv),
            other => Err(format!("unknown item kind '{}'", other)),
        }
    }
}

/// Accessor bundle every collection item exposes.
///
/// The collection controller never inspects concrete records; it goes through
/// these accessors so one controller serves movies and TV shows alike.
pub trait CatalogItem: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Which catalog this record belongs to. Part of the favorites key.
    const KIND: ItemKind;

    fn id(&self) -> ItemId;
    fn title(&self) -> &str;
    fn overview(&self) -> &str;
    fn poster_path(&self) -> Option<&str>;
    /// Average vote on a 0..=10 scale.
    fn vote_average(&self) -> f32;
    fn is_favorite(&self) -> bool;

    /// Copy of this record with only the favorite flag changed.
    fn with_favorite(&self, favorite: bool) -> Self;
}

/// A movie as listed by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: ItemId,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub vote_average: f32,
    pub release_date: Option<String>,
    pub is_favorite: bool,
}

impl CatalogItem for Movie {
    const KIND: ItemKind = ItemKind::Movie;

    fn id(&self) -> ItemId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn overview(&self) -> &str {
        &self.overview
    }

    fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    fn vote_average(&self) -> f32 {
        self.vote_average
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn with_favorite(&self, favorite: bool) -> Self {
        Self {
            is_favorite: favorite,
            ..self.clone()
        }
    }
}

/// A TV series as listed by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TvShow {
    pub id: ItemId,
    pub name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub vote_average: f32,
    pub first_air_date: Option<String>,
    pub is_favorite: bool,
}

impl CatalogItem for TvShow {
    const KIND: ItemKind = ItemKind::Tv;

    fn id(&self) -> ItemId {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn overview(&self) -> &str {
        &self.overview
    }

    fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    fn vote_average(&self) -> f32 {
        self.vote_average
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn with_favorite(&self, favorite: bool) -> Self {
        Self {
            is_favorite: favorite,
            ..self.clone()
        }
    }
}
