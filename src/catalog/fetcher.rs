//! The page-fetch seam between the collection controller and a catalog.

use async_trait::async_trait;

use super::query::QueryParameters;
use super::resource::{ItemPage, Resource};
use super::CatalogItem;

/// Fetches one page of `I` for a query.
///
/// Transport, endpoints, and decoding are entirely the implementor's concern.
/// Pages are 1-based.
#[async_trait]
pub trait PageFetcher<I: CatalogItem>: Send + Sync {
    async fn fetch_page(&self, page: u32, query: &QueryParameters) -> Resource<ItemPage<I>>;
}

#[async_trait]
impl<I, F> PageFetcher<I> for std::sync::Arc<F>
where
    I: CatalogItem,
    F: PageFetcher<I> + ?Sized,
{
    async fn fetch_page(&self, page: u32, query: &QueryParameters) -> Resource<ItemPage<I>> {
        (**self).fetch_page(page, query).await
    }
}
