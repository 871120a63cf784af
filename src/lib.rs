//! SWAPI Cache Library
//!
//! Retrieves every page of a Star Wars API collection, merges and transforms
//! the records, and serves them from an in-memory TTL cache.

pub mod api;
pub mod cache;
pub mod cli;
pub mod data;

pub use api::{RetrievalConfig, SwapiClient};
pub use data::{Collection, FetchError, Record};
