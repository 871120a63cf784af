//! Page retrieval for paginated collection endpoints
//!
//! Provides a single-request fetch plus two strategies for retrieving every page
//! of a collection: following `next` cursors one request at a time, or reading
//! page 1 and requesting every remaining page concurrently.

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{FetchError, HttpGet, Page, Record, UrlBuilder};

/// How to retrieve all pages of a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Follow `next` cursors serially until exhausted
    CursorWalk,
    /// Read page 1, then request pages 2..N concurrently
    #[default]
    FanOut,
}

/// Fetches pages of collections from the remote API
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn HttpGet>,
    urls: UrlBuilder,
}

impl fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFetcher")
            .field("urls", &self.urls)
            .finish_non_exhaustive()
    }
}

impl PageFetcher {
    /// Creates a fetcher sending requests through `transport`
    pub fn new(transport: Arc<dyn HttpGet>, urls: UrlBuilder) -> Self {
        Self { transport, urls }
    }

    /// The URL builder used for endpoint paths
    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Issues one GET and decodes the JSON body
    ///
    /// # Returns
    /// * `Ok(T)` - The decoded body
    /// * `Err(FetchError::HttpStatus)` - If the server answered with a non-2xx status
    /// * `Err(FetchError::MalformedResponse)` - If the body does not decode as `T`
    /// * `Err(FetchError::Transport)` - If the request could not be completed
    pub async fn get_json<T>(&self, url: &Url) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send,
    {
        debug!(%url, "GET");
        let response = self.transport.get(url).await?;

        if !response.is_success() {
            error!(%url, status = response.status, reason = %response.reason, "request failed");
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status,
                reason: response.reason,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            warn!(%url, error = %e, "response body is not the expected JSON");
            FetchError::MalformedResponse {
                url: url.to_string(),
                source: Arc::new(e),
            }
        })
    }

    /// Fetches a single resource by path, without following pagination
    ///
    /// Use `T = Record` for an individual resource such as `"/people/1"`, or
    /// `T = Page` for the first page of a collection.
    pub async fn fetch<T>(&self, endpoint: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.urls.url(endpoint)?;
        self.get_json(&url).await
    }

    /// Fetches one page of a collection from an absolute URL
    pub async fn fetch_page(&self, url: &Url) -> Result<Page, FetchError> {
        self.get_json(url).await
    }

    /// Retrieves every page of `endpoint` using `strategy`
    pub async fn fetch_all(
        &self,
        endpoint: &str,
        strategy: FetchStrategy,
    ) -> Result<Vec<Record>, FetchError> {
        match strategy {
            FetchStrategy::CursorWalk => self.cursor_walk(endpoint).await,
            FetchStrategy::FanOut => self.fan_out(endpoint).await,
        }
    }

    /// Follows `next` cursors from the first page until none is left
    ///
    /// Records are returned in page order, server order preserved within each
    /// page. One request is in flight at a time.
    pub async fn cursor_walk(&self, endpoint: &str) -> Result<Vec<Record>, FetchError> {
        let first_url = self.urls.url(endpoint)?;
        let mut page = self.fetch_page(&first_url).await?;
        let mut records = std::mem::take(&mut page.results);
        let mut pages = 1usize;

        while let Some(next) = page.next.take() {
            let next_url = Url::parse(&next).map_err(|source| FetchError::InvalidUrl {
                url: next.clone(),
                source,
            })?;
            page = self.fetch_page(&next_url).await?;
            records.append(&mut page.results);
            pages += 1;
        }

        debug!(endpoint, pages, records = records.len(), "cursor walk complete");
        Ok(records)
    }

    /// Reads page 1, derives the page count, then fetches the rest concurrently
    ///
    /// The page count is `ceil(count / per_page)` where `per_page` is the size of
    /// page 1. Pages 2..N are addressed directly with `?page=k` and awaited
    /// jointly; the first failure aborts the whole retrieval. Output order is by
    /// page number, not completion order.
    pub async fn fan_out(&self, endpoint: &str) -> Result<Vec<Record>, FetchError> {
        let first_url = self.urls.url(endpoint)?;
        let first = self.fetch_page(&first_url).await?;

        let per_page = first.results.len() as u64;
        if first.count == 0 || per_page == 0 {
            return Ok(first.results);
        }

        let page_count = first.count.div_ceil(per_page);
        if page_count > 1 {
            info!(endpoint, count = first.count, per_page, page_count, "fetching remaining pages");
        }

        let page_urls = (2..=page_count)
            .map(|page| self.urls.page_url(endpoint, page))
            .collect::<Result<Vec<_>, _>>()?;

        let rest = try_join_all(page_urls.iter().map(|url| self.fetch_page(url))).await?;

        let mut records = first.results;
        for page in rest {
            records.extend(page.results);
        }
        Ok(records)
    }
}
