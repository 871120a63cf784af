//! Storage and clock abstractions behind the TTL cache

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::data::Collection;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Useful for exercising TTL expiry without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }

    /// Sets the clock to `to`
    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// A cached, fully transformed collection
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached records
    pub data: Collection,
    /// When the entry was stored
    pub cached_at: DateTime<Utc>,
    /// When the entry stops being servable
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stored at `cached_at` that lives for `ttl`
    ///
    /// An expiry past the representable range saturates, so a huge `ttl`
    /// means the entry never expires.
    pub fn new(data: Collection, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        let saturated = if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        let expires_at = cached_at.checked_add_signed(ttl).unwrap_or(saturated);

        Self {
            data,
            cached_at,
            expires_at,
        }
    }

    /// Whether the entry may be served at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Key/value store for cache entries, keyed by endpoint path
pub trait CacheStore: Send + Sync {
    /// Returns the entry for `key`, fresh or not
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores `entry` under `key`, replacing any previous entry
    fn put(&self, key: &str, entry: CacheEntry);

    /// The store's notion of the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Process-lifetime in-memory store
///
/// Entries are only ever replaced, never evicted, so the store holds one entry
/// per distinct endpoint ever fetched.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Creates an empty store using the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        lock(&self.entries).get(key).cloned()
    }

    fn put(&self, key: &str, entry: CacheEntry) {
        lock(&self.entries).insert(key.to_string(), entry);
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    fn collection(names: &[&str]) -> Collection {
        Arc::new(names.iter().map(|n| Record::new().with("name", *n)).collect())
    }

    #[test]
    fn test_entry_fresh_until_expiry() {
        let start = Utc::now();
        let entry = CacheEntry::new(collection(&["a"]), start, Duration::milliseconds(1_000));

        assert!(entry.is_fresh(start));
        assert!(entry.is_fresh(start + Duration::milliseconds(999)));
        assert!(!entry.is_fresh(start + Duration::milliseconds(1_000)));
        assert!(!entry.is_fresh(start + Duration::hours(2)));
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let start = Utc::now();
        let entry = CacheEntry::new(collection(&[]), start, Duration::zero());
        assert!(!entry.is_fresh(start));
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_overflowing() {
        let start = Utc::now();
        let entry = CacheEntry::new(collection(&["a"]), start, Duration::milliseconds(i64::MAX));

        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(entry.is_fresh(start + Duration::days(365 * 1_000)));
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("/people").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let store = MemoryStore::new();
        let now = store.now();

        store.put("/people", CacheEntry::new(collection(&["first"]), now, Duration::hours(1)));
        store.put("/people", CacheEntry::new(collection(&["second"]), now, Duration::hours(1)));

        let entry = store.get("/people").unwrap();
        assert_eq!(entry.data[0].name(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_are_exact_match() {
        let store = MemoryStore::new();
        let now = store.now();
        store.put("/people", CacheEntry::new(collection(&["a"]), now, Duration::hours(1)));

        assert!(store.get("/people/").is_none());
        assert!(store.get("/People").is_none());
        assert!(store.get("/people?page=1").is_none());
    }

    #[test]
    fn test_manual_clock_drives_store_time() {
        let start = Utc::now();
        let clock = Arc::new(ManualClock::new(start));
        let store = MemoryStore::with_clock(clock.clone());

        assert_eq!(store.now(), start);
        clock.advance(Duration::minutes(61));
        assert_eq!(store.now(), start + Duration::minutes(61));

        clock.set(start);
        assert_eq!(store.now(), start);
    }
}
