//! Thread-safe Cache
//!
//! Wraps a [`CacheStore`] in a single readers/writer lock so the index and the
//! recency list always change together.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::entry::expiration_from;
use crate::cache::{CacheStats, CacheStore, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache ==
/// Bounded LRU cache with optional per-entry TTL, safe to share across threads.
///
/// Lookups mutate recency, so [`Cache::get`] takes the write lock like every
/// other mutating call. Only size and non-promoting probes use the read lock.
/// Expired entries are removed lazily when a lookup finds them, or when
/// [`Cache::purge_expired`] is called; nothing runs in the background.
///
/// ```
/// use std::time::Duration;
/// use ttl_lru_cache::Cache;
///
/// let cache = Cache::new(2).unwrap();
/// cache.add("a", 1);
/// cache.add_with_ttl("b", 2, Duration::from_secs(60));
/// assert_eq!(cache.get("a"), Some(1));
///
/// cache.add("c", 3); // evicts "b", the least recently used
/// assert_eq!(cache.get("b"), None);
/// assert_eq!(cache.len(), 2);
/// ```
pub struct Cache<K, V, C = SystemClock> {
    inner: RwLock<CacheStore<K, V>>,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache using the system clock.
    ///
    /// Fails with [`crate::CacheError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_clock(capacity, SystemClock)
    }

    /// Creates an empty cache from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.capacity)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates an empty cache that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: C) -> Result<Self> {
        let capacity = CacheConfig::new(capacity).validate()?;
        debug!(capacity = capacity.get(), "cache created");

        Ok(Self {
            inner: RwLock::new(CacheStore::new(capacity)),
            clock,
        })
    }

    /// Returns the fixed capacity.
    pub fn cap(&self) -> usize {
        self.inner.read().capacity()
    }

    /// Returns the number of stored entries, including expired entries that
    /// have not been looked up or purged yet.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drops every entry. Capacity and statistics are unchanged.
    pub fn clear(&self) {
        self.inner.write().clear();
        trace!("cache cleared");
    }

    /// Inserts or updates a permanent entry and marks it most recently used.
    ///
    /// Updating an entry that had a TTL makes it permanent.
    pub fn add(&self, key: K, value: V) {
        self.inner.write().insert(key, value, None);
    }

    /// Inserts or updates an entry that expires `ttl` from now.
    ///
    /// A zero `ttl` stores an entry that is already expired.
    pub fn add_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expires_at = expiration_from(self.clock.now(), ttl);
        self.inner.write().insert(key, value, expires_at);
    }

    /// Looks up `key`, marking it most recently used on a hit.
    ///
    /// Returns `None` if the key is absent or expired; an expired entry is
    /// removed as part of the lookup.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let now = self.clock.now();
        self.inner.write().get(key, now).cloned()
    }

    /// Removes `key` if present. Removing a missing key is a no-op.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(key);
    }

    /// Reports whether a live entry exists for `key`, without promoting it
    /// or purging it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.inner.read().peek(key, now).is_some()
    }

    /// Remaining lifetime of a live entry. `None` for absent, expired and
    /// permanent entries.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.inner.read().peek(key, now)?.ttl_remaining(now)
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.inner.write().purge_expired(now);

        if removed > 0 {
            debug!(removed, "purged expired entries");
        } else {
            trace!("no expired entries to purge");
        }
        removed
    }

    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }

    pub fn reset_stats(&self) {
        self.inner.write().reset_stats();
    }
}

impl<K, V, C> fmt::Debug for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.read();
        f.debug_struct("Cache")
            .field("capacity", &store.capacity())
            .field("len", &store.len())
            .finish_non_exhaustive()
    }
}
