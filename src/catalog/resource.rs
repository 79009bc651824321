//! Result of one page fetch.

use super::error::FetchError;

/// Outcome of a single asynchronous fetch.
///
/// Only the collection controller looks inside; the presentation layer sees
/// the resulting view state.
#[derive(Debug)]
pub enum Resource<T> {
    Success(T),
    Failure(FetchError),
}

impl<T> Resource<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            Resource::Success(value) => Ok(value),
            Resource::Failure(err) => Err(err),
        }
    }
}

impl<T> From<Result<T, FetchError>> for Resource<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Resource::Success(value),
            Err(err) => Resource::Failure(err),
        }
    }
}

/// One page of catalog results, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPage<I> {
    pub page: u32,
    pub items: Vec<I>,
    /// What the catalog reports; informational only. The end of a collection
    /// is detected by an empty page.
    pub total_pages: Option<u32>,
}

impl<I> ItemPage<I> {
    pub fn new(page: u32, items: Vec<I>) -> Self {
        Self {
            page,
            items,
            total_pages: None,
        }
    }

    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
