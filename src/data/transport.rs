//! HTTP GET capability
//!
//! The fetchers only need "send GET to URL, receive status + body". That
//! capability is expressed as the [`HttpGet`] trait so the network can be swapped
//! out for canned responses in tests.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use super::FetchError;

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Numeric HTTP status code
    pub status: u16,
    /// Reason phrase for the status, empty if unknown
    pub reason: String,
    /// Raw response body
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a GET request and returns the raw response
#[async_trait]
pub trait HttpGet: Send + Sync {
    /// Performs the request
    ///
    /// Only failures to complete the exchange are errors here; a response with a
    /// failure status is still `Ok`.
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError>;
}

/// [`HttpGet`] backed by a `reqwest` client
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with default client settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpGet for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// In-memory transport serving canned responses, for unit tests
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::data::{Record, UrlBuilder};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub(crate) struct FakeTransport {
        responses: Mutex<HashMap<String, HttpResponse>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn set_json(&self, url: &str, body: Value) {
            self.set_raw(url, 200, body.to_string());
        }

        pub(crate) fn set_raw(&self, url: &str, status: u16, body: impl Into<String>) {
            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                500 => "Internal Server Error",
                _ => "",
            };
            self.responses.lock().unwrap().insert(
                url.to_string(),
                HttpResponse {
                    status,
                    reason: reason.to_string(),
                    body: body.into(),
                },
            );
        }

        /// Serves `pages` as a paginated collection under `path`.
        ///
        /// Page 1 lives at the bare path, page `k` at `?page=k`, and every page
        /// but the last links to its successor through `next`.
        pub(crate) fn set_collection(&self, urls: &UrlBuilder, path: &str, pages: &[Vec<Record>]) {
            let count: usize = pages.iter().map(Vec::len).sum();
            for (index, results) in pages.iter().enumerate() {
                let page_no = index as u64 + 1;
                let url = if page_no == 1 {
                    urls.url(path).unwrap()
                } else {
                    urls.page_url(path, page_no).unwrap()
                };
                let next = if index + 1 < pages.len() {
                    Value::String(urls.page_url(path, page_no + 1).unwrap().to_string())
                } else {
                    Value::Null
                };
                self.set_json(
                    url.as_str(),
                    json!({
                        "count": count,
                        "next": next,
                        "previous": null,
                        "results": results,
                    }),
                );
            }
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpGet for FakeTransport {
        async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
            // Give concurrent callers a chance to interleave
            tokio::task::yield_now().await;

            self.requests.lock().unwrap().push(url.to_string());
            let canned = self.responses.lock().unwrap().get(url.as_str()).cloned();
            Ok(canned.unwrap_or_else(|| HttpResponse {
                status: 404,
                reason: "Not Found".to_string(),
                body: r#"{"detail":"Not found"}"#.to_string(),
            }))
        }
    }
}
