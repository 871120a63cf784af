//! Errors raised while retrieving pages from the remote API

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when fetching pages or records
///
/// The error is `Clone` so that a single failed in-flight fetch can be handed to
/// every caller waiting on it; underlying sources are therefore held in `Arc`s.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request could not be completed (connection, DNS, TLS, ...)
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-success status
    #[error("request to {url} failed with status {status} {reason}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    /// The response body was not the JSON shape we expected
    #[error("Failed to parse JSON response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// A URL could not be built or a next-page cursor could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    /// Wraps any transport-level error for the given URL
    pub fn transport<E>(url: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FetchError::Transport {
            url: url.into(),
            source: Arc::new(source),
        }
    }

    /// The HTTP status code, if the server answered with a failure status
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
