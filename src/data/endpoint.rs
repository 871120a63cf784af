//! Request URL composition
//!
//! Joins the fixed API base address with a logical collection path and optional
//! query parameters.

use url::Url;

use super::FetchError;

/// Base URL for the public Star Wars API
pub const SWAPI_BASE_URL: &str = "https://swapi.dev/api";

/// Builds absolute request URLs for logical endpoint paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base: String,
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new(SWAPI_BASE_URL)
    }
}

impl UrlBuilder {
    /// Creates a builder for the given base address
    ///
    /// A trailing slash on the base is dropped so that `"/people"` style paths
    /// join without doubling it.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// The base address without trailing slash
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Builds the URL for `path` with no query string
    pub fn url(&self, path: &str) -> Result<Url, FetchError> {
        self.url_with_query(path, &[])
    }

    /// Builds the URL for `path` followed by `query` pairs in the given order
    ///
    /// # Arguments
    /// * `path` - Logical endpoint path such as `"/people"`
    /// * `query` - Key/value pairs appended as a form-encoded query string
    ///
    /// # Returns
    /// * `Ok(Url)` - Absolute, directly fetchable URL
    /// * `Err(FetchError::InvalidUrl)` - If the joined string is not a valid URL
    pub fn url_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base, path);
        let mut url = Url::parse(&raw).map_err(|source| FetchError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }

        Ok(url)
    }

    /// Builds the URL addressing page `page` of `path` directly
    pub fn page_url(&self, path: &str, page: u64) -> Result<Url, FetchError> {
        let page = page.to_string();
        self.url_with_query(path, &[("page", page.as_str())])
    }
}
