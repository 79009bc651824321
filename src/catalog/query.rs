//! Search, sort, and filter parameters for a collection session.
//!
//! Two `QueryParameters` values that compare equal describe the same result
//! set; any difference restarts pagination.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ItemKind;

/// Closed set of orderings the catalog supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    PopularityDesc,
    PopularityAsc,
    RatingDesc,
    RatingAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
    TitleAsc,
    TitleDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 8] = [
        SortOption::PopularityDesc,
        SortOption::PopularityAsc,
        SortOption::RatingDesc,
        SortOption::RatingAsc,
        SortOption::ReleaseDateDesc,
        SortOption::ReleaseDateAsc,
        SortOption::TitleAsc,
        SortOption::TitleDesc,
    ];

    /// Name used in config files and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            SortOption::PopularityDesc => "popularity-desc",
            SortOption::PopularityAsc => "popularity-asc",
            SortOption::RatingDesc => "rating-desc",
            SortOption::RatingAsc => "rating-asc",
            SortOption::ReleaseDateDesc => "release-date-desc",
            SortOption::ReleaseDateAsc => "release-date-asc",
            SortOption::TitleAsc => "title-asc",
            SortOption::TitleDesc => "title-desc",
        }
    }

    /// `sort_by` value for the discover endpoint of `kind`.
    pub fn api_value(&self, kind: ItemKind) -> &'static str {
        match (self, kind) {
            (SortOption::PopularityDesc, _) => "popularity.desc",
            (SortOption::PopularityAsc, _) => "popularity.asc",
            (SortOption::RatingDesc, _) => "vote_average.desc",
            (SortOption::RatingAsc, _) => "vote_average.asc",
            (SortOption::ReleaseDateDesc, ItemKind::Movie) => "primary_release_date.desc",
            (SortOption::ReleaseDateAsc, ItemKind::Movie) => "primary_release_date.asc",
            (SortOption::ReleaseDateDesc, ItemKind::Tv) => "first_air_date.desc",
            (SortOption::ReleaseDateAsc, ItemKind::Tv) => "first_air_date.asc",
            (SortOption::TitleAsc, ItemKind::Movie) => "title.asc",
            (SortOption::TitleDesc, ItemKind::Movie) => "title.desc",
            (SortOption::TitleAsc, ItemKind::Tv) => "name.asc",
            (SortOption::TitleDesc, ItemKind::Tv) => "name.desc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort option '{input}' (expected one of: {expected})")]
pub struct ParseSortError {
    input: String,
    expected: String,
}

impl FromStr for SortOption {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SortOption::ALL
            .iter()
            .copied()
            .find(|option| option.slug() == wanted)
            .ok_or_else(|| ParseSortError {
                input: s.to_string(),
                expected: SortOption::ALL
                    .iter()
                    .map(SortOption::slug)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Optional narrowing applied on top of the sort.
///
/// Cleared fields are normalised to `None` by the builders: an empty genre
/// set, a zero or non-finite minimum rating, and an absent year all compare
/// equal to a filter that was never set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    genres: Option<BTreeSet<u32>>,
    release_year: Option<u16>,
    min_rating: Option<f32>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genres<G>(mut self, genres: G) -> Self
    where
        G: IntoIterator<Item = u32>,
    {
        let genres: BTreeSet<u32> = genres.into_iter().collect();
        self.genres = (!genres.is_empty()).then_some(genres);
        self
    }

    pub fn with_release_year(mut self, year: Option<u16>) -> Self {
        self.release_year = year;
        self
    }

    pub fn with_min_rating(mut self, rating: Option<f32>) -> Self {
        self.min_rating = rating
            .filter(|r| r.is_finite() && *r > 0.0)
            .map(|r| r.min(10.0));
        self
    }

    pub fn genres(&self) -> Option<&BTreeSet<u32>> {
        self.genres.as_ref()
    }

    pub fn release_year(&self) -> Option<u16> {
        self.release_year
    }

    pub fn min_rating(&self) -> Option<f32> {
        self.min_rating
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_none() && self.release_year.is_none() && self.min_rating.is_none()
    }
}

/// Everything that determines which items a collection session shows.
///
/// Equality compares the effective search term, so `""` and `"  "` are the
/// same query.
#[derive(Debug, Clone, Default)]
pub struct QueryParameters {
    pub search_text: String,
    pub sort: SortOption,
    pub filters: FilterSet,
}

impl QueryParameters {
    pub fn new(search_text: impl Into<String>, sort: SortOption, filters: FilterSet) -> Self {
        Self {
            search_text: search_text.into(),
            sort,
            filters,
        }
    }

    pub fn with_search_text(&self, text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortOption) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    pub fn with_filters(&self, filters: FilterSet) -> Self {
        Self {
            filters,
            ..self.clone()
        }
    }

    /// The trimmed search term, if this query is a text search.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search_text.trim();
        (!term.is_empty()).then_some(term)
    }
}

impl PartialEq for QueryParameters {
    fn eq(&self, other: &Self) -> bool {
        self.search_term() == other.search_term()
            && self.sort == other.sort
            && self.filters == other.filters
    }
}
