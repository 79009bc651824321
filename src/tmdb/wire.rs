//! JSON shapes returned by the catalog's list endpoints.

use serde::Deserialize;

use crate::catalog::{ItemId, ItemPage, Movie, TvShow};

/// `{ "page": 1, "results": [...], "total_pages": 500 }`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct PageResponse<T> {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    results: Vec<T>,
    total_pages: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl<T> PageResponse<T> {
    pub(crate) fn into_page<I>(self) -> ItemPage<I>
    where
        T: Into<I>,
    {
        let items = self.results.into_iter().map(Into::into).collect();
        let page = ItemPage::new(self.page, items);
        match self.total_pages {
            Some(total) => page.with_total_pages(total),
            None => page,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MovieResult {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: f32,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TvResult {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: f32,
    first_air_date: Option<String>,
}

impl From<MovieResult> for Movie {
    fn from(raw: MovieResult) -> Self {
        Movie {
            id: ItemId(raw.id),
            title: raw.title,
            overview: raw.overview.unwrap_or_default(),
            poster_path: non_empty(raw.poster_path),
            vote_average: clamp_rating(raw.vote_average),
            release_date: non_empty(raw.release_date),
            is_favorite: false,
        }
    }
}

impl From<TvResult> for TvShow {
    fn from(raw: TvResult) -> Self {
        TvShow {
            id: ItemId(raw.id),
            name: raw.name,
            overview: raw.overview.unwrap_or_default(),
            poster_path: non_empty(raw.poster_path),
            vote_average: clamp_rating(raw.vote_average),
            first_air_date: non_empty(raw.first_air_date),
            is_favorite: false,
        }
    }
}

// The catalog sends "" for unknown dates.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn clamp_rating(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 10.0)
    } else {
        0.0
    }
}
