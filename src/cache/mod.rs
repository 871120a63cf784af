//! Cache module for fetched collections
//!
//! This module provides an in-memory, process-lifetime cache keyed by endpoint
//! path. Entries expire after a TTL and are replaced on the next miss; concurrent
//! misses for the same endpoint are collapsed into a single fetch.

mod manager;
mod store;

pub use manager::{TtlCache, DEFAULT_TTL_MS};
pub use store::{CacheEntry, CacheStore, Clock, ManualClock, MemoryStore, SystemClock};
