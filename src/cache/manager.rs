//! Time-bounded cache of fully fetched collections
//!
//! Provides a `TtlCache` that serves a stored collection while it is fresh and
//! otherwise runs a caller-supplied fetch, storing its result with an expiry.
//! Concurrent misses for the same key share one in-flight fetch.

use chrono::Duration;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use super::store::{lock, CacheEntry, CacheStore};
use crate::data::{Collection, FetchError, Record};

/// Default time-to-live for cache entries in milliseconds (one hour)
pub const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

type PendingFill = Shared<BoxFuture<'static, Result<Collection, FetchError>>>;

/// TTL cache keyed by endpoint path, with single-flight misses
///
/// On a hit the stored collection is returned as-is, with no I/O. On a miss the
/// fetch runs once; every caller asking for the same key meanwhile awaits that
/// same fetch. Only successful fetches are stored, so a failure never replaces
/// (or creates) an entry.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    in_flight: Arc<Mutex<HashMap<String, PendingFill>>>,
}

impl fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("in_flight", &lock(&self.in_flight).len())
            .finish_non_exhaustive()
    }
}

impl TtlCache {
    /// Creates a cache over `store`
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached collection for `key`, fetching it if stale or absent
    ///
    /// # Arguments
    /// * `key` - Endpoint path; matched exactly
    /// * `ttl` - How long a freshly fetched collection stays servable
    /// * `fetch` - Produces the complete, transformed collection on a miss
    ///
    /// # Returns
    /// * `Ok(Collection)` - The fresh cached payload, or the newly fetched one
    /// * `Err(FetchError)` - If the fetch (shared or own) failed
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Collection, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Record>, FetchError>> + Send + 'static,
    {
        let pending = {
            let mut in_flight = lock(&self.in_flight);

            // Checked under the in-flight lock: a fill stores its entry before
            // it leaves the in-flight map.
            if let Some(entry) = self.store.get(key) {
                if entry.is_fresh(self.store.now()) {
                    debug!(key, "cache hit");
                    return Ok(entry.data);
                }
            }

            match in_flight.get(key) {
                Some(pending) => {
                    debug!(key, "joining in-flight fetch");
                    pending.clone()
                }
                None => {
                    info!(key, "cache miss");
                    let pending = self.fill(key.to_string(), ttl, fetch()).boxed().shared();
                    in_flight.insert(key.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Runs `fetch`, stores a successful result and clears the in-flight slot
    fn fill<Fut>(
        &self,
        key: String,
        ttl: Duration,
        fetch: Fut,
    ) -> impl Future<Output = Result<Collection, FetchError>> + Send + 'static
    where
        Fut: Future<Output = Result<Vec<Record>, FetchError>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);

        async move {
            let outcome = AssertUnwindSafe(async {
                let result = fetch.await.map(Arc::new);
                if let Ok(data) = &result {
                    store.put(&key, CacheEntry::new(Arc::clone(data), store.now(), ttl));
                    info!(key = %key, records = data.len(), "cache filled");
                }
                result
            })
            .catch_unwind()
            .await;

            // A panicked fill must not stay joinable, or every later call for
            // this key would re-raise it.
            lock(&in_flight).remove(&key);

            outcome.unwrap_or_else(|payload| {
                error!(key = %key, "cache fill panicked");
                panic::resume_unwind(payload)
            })
        }
    }
}
