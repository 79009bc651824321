use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tokio::time::timeout;

use crate::catalog::{
    FetchError, ItemKind, ItemPage, Movie, PageFetcher, QueryParameters, Resource, TvShow,
};
use crate::config::{CatalogConfig, CATALOG_KEY_ENV};

use super::wire::{MovieResult, PageResponse, TvResult};

/// HTTP client for a TMDB-compatible catalog.
///
/// A non-empty search term goes to `/search/{kind}` (sort and filters do not
/// apply there); everything else goes to `/discover/{kind}`.
pub struct TmdbClient {
    client: Client,
    config: CatalogConfig,
}

impl TmdbClient {
    pub fn new(config: CatalogConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds as u64))
            .build()
            .map_err(|e| FetchError::Other(format!("Failed to build catalog client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Endpoint path and query pairs for one list request.
    pub fn list_request(
        kind: ItemKind,
        page: u32,
        query: &QueryParameters,
    ) -> (String, Vec<(&'static str, String)>) {
        let mut params = vec![("page", page.to_string()), ("include_adult", "false".to_string())];

        if let Some(term) = query.search_term() {
            params.push(("query", term.to_string()));
            return (format!("search/{}", kind), params);
        }

        params.push(("sort_by", query.sort.api_value(kind).to_string()));

        let filters = &query.filters;
        if let Some(genres) = filters.genres() {
            let joined = genres
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("with_genres", joined));
        }
        if let Some(year) = filters.release_year() {
            let key = match kind {
                ItemKind::Movie => "primary_release_year",
                ItemKind::Tv => "first_air_date_year",
            };
            params.push((key, year.to_string()));
        }
        if let Some(rating) = filters.min_rating() {
            params.push(("vote_average.gte", rating.to_string()));
        }

        (format!("discover/{}", kind), params)
    }

    async fn fetch<T, I>(
        &self,
        kind: ItemKind,
        page: u32,
        query: &QueryParameters,
    ) -> Result<ItemPage<I>, FetchError>
    where
        T: DeserializeOwned + Into<I> + Send,
    {
        let (path, params) = Self::list_request(kind, page, query);
        let response: PageResponse<T> = self.get_with_retry(&path, &params).await?;
        Ok(response.into_page())
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            let err = match self.get_once(path, params).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.config.max_retries {
                return Err(err);
            }

            let delay = backoff(self.config.retry_backoff_base_ms, attempt);
            tracing::debug!(
                path,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying catalog request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let duration = self.config.timeout_seconds as u64;
        match timeout(Duration::from_secs(duration), self.do_get(path, params)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { duration }),
        }
    }

    async fn do_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                FetchError::NotConfigured(format!(
                    "no API key; set catalog.api_key or {}",
                    CATALOG_KEY_ENV
                ))
            })?;

        let endpoint = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        pairs.push(("language", self.config.language.as_str()));

        let bearer = is_bearer_token(api_key);
        if !bearer {
            pairs.push(("api_key", api_key));
        }

        let url = Url::parse_with_params(&endpoint, &pairs)
            .map_err(|e| FetchError::NotConfigured(format!("invalid catalog URL '{}': {}", endpoint, e)))?;

        let mut builder: RequestBuilder = self.client.get(url).header("Accept", "application/json");
        if bearer {
            builder = builder.bearer_auth(api_key);
        }

        tracing::trace!(endpoint = %endpoint, "Catalog request");
        let response = builder.send().await.map_err(|e| FetchError::Connection {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::warn!(status = %status, endpoint = %endpoint, "Catalog returned an error");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Connection {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl PageFetcher<Movie> for TmdbClient {
    async fn fetch_page(&self, page: u32, query: &QueryParameters) -> Resource<ItemPage<Movie>> {
        self.fetch::<MovieResult, Movie>(ItemKind::Movie, page, query)
            .await
            .into()
    }
}

#[async_trait]
impl PageFetcher<TvShow> for TmdbClient {
    async fn fetch_page(&self, page: u32, query: &QueryParameters) -> Resource<ItemPage<TvShow>> {
        self.fetch::<TvResult, TvShow>(ItemKind::Tv, page, query)
            .await
            .into()
    }
}

/// v4 read access tokens are JWTs; v3 keys are plain hex.
fn is_bearer_token(key: &str) -> bool {
    key.contains('.')
}

fn backoff(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(1u64 << attempt.min(6)))
}
