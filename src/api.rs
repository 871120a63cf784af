//! Public retrieval API
//!
//! `SwapiClient` wires the page fetcher, the transforms and the TTL cache
//! together. Callers pick between a single raw fetch, an uncached full-collection
//! fetch, and the cached, transformed collection.

use chrono::Duration;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheStore, MemoryStore, TtlCache, DEFAULT_TTL_MS};
use crate::data::endpoint::SWAPI_BASE_URL;
use crate::data::{
    find_by_id, resolve_links, Collection, FetchError, FetchStrategy, HttpGet, PageFetcher,
    Record, ReqwestTransport, Transform, UrlBuilder, FILMS, PEOPLE, SPECIES, STARSHIPS,
};

/// Settings for a [`SwapiClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Base address all endpoint paths are appended to
    pub base_url: String,
    /// Default time-to-live for cached collections
    pub ttl: Duration,
    /// Strategy for uncached full-collection fetches
    pub strategy: FetchStrategy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: SWAPI_BASE_URL.to_string(),
            ttl: Duration::milliseconds(DEFAULT_TTL_MS),
            strategy: FetchStrategy::default(),
        }
    }
}

/// Entry point for retrieving SWAPI resources and collections
#[derive(Debug, Clone)]
pub struct SwapiClient {
    pages: PageFetcher,
    cache: TtlCache,
    config: RetrievalConfig,
}

impl Default for SwapiClient {
    fn default() -> Self {
        Self::new(RetrievalConfig::default())
    }
}

impl SwapiClient {
    /// Create a new client talking to the network with an in-memory cache
    pub fn new(config: RetrievalConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Create a new client with a custom transport and cache store
    ///
    /// Lets tests substitute canned responses and a controllable clock.
    pub fn with_parts(
        config: RetrievalConfig,
        transport: Arc<dyn HttpGet>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        let urls = UrlBuilder::new(config.base_url.clone());
        Self {
            pages: PageFetcher::new(transport, urls),
            cache: TtlCache::new(store),
            config,
        }
    }

    /// The client's configuration
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Fetches one resource by path, without pagination or caching
    ///
    /// Returns the decoded body unchanged, e.g. a single record for
    /// `"/people/1"` or the first [`Page`](crate::data::Page) of a collection.
    pub async fn fetch<T>(&self, endpoint: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send,
    {
        self.pages.fetch(endpoint).await
    }

    /// Fetches one record by path
    pub async fn fetch_record(&self, endpoint: &str) -> Result<Record, FetchError> {
        self.fetch(endpoint).await
    }

    /// Fetches every page of a collection using the configured strategy
    ///
    /// Uncached and untransformed: records come back in page order.
    pub async fn fetch_all(&self, endpoint: &str) -> Result<Vec<Record>, FetchError> {
        self.fetch_all_with(endpoint, self.config.strategy).await
    }

    /// Fetches every page of a collection using `strategy`
    pub async fn fetch_all_with(
        &self,
        endpoint: &str,
        strategy: FetchStrategy,
    ) -> Result<Vec<Record>, FetchError> {
        self.pages.fetch_all(endpoint, strategy).await
    }

    /// Returns the transformed collection, served from cache while fresh
    pub async fn collection(&self, endpoint: &str) -> Result<Collection, FetchError> {
        self.collection_with_ttl(endpoint, self.config.ttl).await
    }

    /// Like [`SwapiClient::collection`] with an explicit time-to-live
    ///
    /// # Arguments
    /// * `endpoint` - Collection path such as `"/people"`; also the cache key
    /// * `ttl` - Lifetime of the entry stored if this call has to fetch
    ///
    /// # Returns
    /// * `Ok(Collection)` - All records, merged across pages, sorted and augmented
    /// * `Err(FetchError)` - If any page request failed; nothing is cached then
    pub async fn collection_with_ttl(
        &self,
        endpoint: &str,
        ttl: Duration,
    ) -> Result<Collection, FetchError> {
        let pages = self.pages.clone();
        let path = endpoint.to_string();

        self.cache
            .get_or_fetch(endpoint, ttl, move || async move {
                let records = pages.fan_out(&path).await?;
                let transform = Transform::for_endpoint(&path);
                debug!(endpoint = %path, ?transform, records = records.len(), "transforming");
                Ok(transform.apply(records))
            })
            .await
    }

    /// Builds a character's profile with cross-references resolved to names
    ///
    /// Loads people, films, starships and species through the cache, picks the
    /// character whose (positional) id is `id`, and replaces the URLs in its
    /// `films`, `starships` and `species` lists with titles and names.
    ///
    /// # Returns
    /// * `Ok(Some(Record))` - The resolved character
    /// * `Ok(None)` - If no character has that id
    /// * `Err(FetchError)` - If any of the four collections could not be loaded
    pub async fn character(&self, id: &str) -> Result<Option<Record>, FetchError> {
        let (people, films, starships, species) = futures::try_join!(
            self.collection(PEOPLE),
            self.collection(FILMS),
            self.collection(STARSHIPS),
            self.collection(SPECIES),
        )?;

        let Some(character) = find_by_id(&people, id) else {
            debug!(id, "no character with this id");
            return Ok(None);
        };

        let character = resolve_links(character, &films, "films", "title");
        let character = resolve_links(&character, &starships, "starships", "name");
        let character = resolve_links(&character, &species, "species", "name");
        Ok(Some(character))
    }
}
