//! Core data models for the SWAPI cache
//!
//! This module contains the record and page types returned by the remote API,
//! along with the clients and pure functions that fetch, merge and transform them.

pub mod endpoint;
pub mod error;
pub mod lookup;
pub mod pages;
pub mod transform;
pub mod transport;

pub use endpoint::UrlBuilder;
pub use error::FetchError;
pub use lookup::{find_by_id, find_by_url, resolve_links};
pub use pages::{FetchStrategy, PageFetcher};
pub use transform::Transform;
pub use transport::{HttpGet, HttpResponse, ReqwestTransport};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Collection path for characters
pub const PEOPLE: &str = "/people";
/// Collection path for films
pub const FILMS: &str = "/films";
/// Collection path for starships
pub const STARSHIPS: &str = "/starships";
/// Collection path for species
pub const SPECIES: &str = "/species";

/// A fully merged collection as handed out by the cache.
///
/// Shared rather than cloned so that every caller served from the same cache
/// entry observes the identical payload.
pub type Collection = Arc<Vec<Record>>;

/// One item of a remote collection
///
/// Records are kept as an open mapping of field names to JSON values. Only a
/// handful of fields (`name`, `url`, `id`, `birth_year`, `episode_id`) carry
/// meaning for this crate; everything else is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field's value if it is a JSON string
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// The record's display name, if it has one
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// The record's canonical URL, used as its identity across collections
    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    /// The record's identifier, if it carries a string `id`
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Sets a field, replacing any previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style variant of [`Record::insert`]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One response of a paginated collection endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Total number of items in the whole collection
    pub count: u64,
    /// Absolute URL of the next page, absent on the last page
    pub next: Option<String>,
    /// Absolute URL of the previous page, absent on the first page
    #[serde(default)]
    pub previous: Option<String>,
    /// Records on this page, in server order
    pub results: Vec<Record>,
}
