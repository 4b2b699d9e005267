//! Cache Store Module
//!
//! Main cache engine combining a key index with LRU ordering and TTL expiration.
//! The store is not synchronized; [`crate::cache::Cache`] wraps it in a lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Instant;

use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, LruList, SlotId};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// Every key in `index` has exactly one node in `order` and vice versa.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key to node handle
    index: HashMap<K, SlotId>,
    /// Entries from most to least recently used
    order: LruList<K, V>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: NonZeroUsize,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty CacheStore holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity.get()),
            order: LruList::with_capacity(capacity.get()),
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Insert ==
    /// Stores a key-value pair, replacing any existing expiration.
    ///
    /// An existing key is updated in place and moved to the front. A new key
    /// arriving at a full store first evicts the least recently used entry,
    /// whether or not that entry has expired.
    pub fn insert(&mut self, key: K, value: V, expires_at: Option<Instant>) {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.value = value;
                entry.expires_at = expires_at;
            }
            self.order.move_to_front(id);
            return;
        }

        if self.order.len() >= self.capacity.get() {
            self.evict_oldest();
        }

        let id = self
            .order
            .push_front(CacheEntry::new(key.clone(), value, expires_at));
        self.index.insert(key, id);
    }

    // == Get ==
    /// Looks up a live entry and marks it most recently used.
    ///
    /// An entry found expired as of `now` is removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.order.get(id).is_some_and(|entry| entry.is_expired(now)) {
            self.index.remove(key);
            self.order.remove(id);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            trace!(len = self.order.len(), "removed expired entry on access");
            return None;
        }

        self.stats.record_hit();
        self.order.move_to_front(id);
        self.order.get(id).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Returns the live entry for `key` without touching recency or stats.
    pub fn peek<Q>(&self, key: &Q, now: Instant) -> Option<&CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.order.get(id).filter(|entry| !entry.is_expired(now))
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.remove(key)?;
        self.order.remove(id).map(|entry| entry.value)
    }

    // == Clear ==
    /// Drops every entry, live or expired. Statistics are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Purge Expired ==
    /// Removes all entries expired as of `now`.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<SlotId> = self
            .order
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(id, _)| id)
            .collect();

        for &id in &expired {
            if let Some(entry) = self.order.remove(id) {
                self.index.remove(&entry.key);
            }
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.order.len());
        stats
    }

    /// Zeroes the hit, miss, eviction and expiration counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::new();
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.iter().map(|(_, entry)| &entry.key)
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn evict_oldest(&mut self) {
        if let Some(evicted) = self.order.pop_back() {
            self.index.remove(&evicted.key);
            self.stats.record_eviction();
            debug!(
                capacity = self.capacity.get(),
                "evicted least recently used entry"
            );
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store(capacity: usize) -> CacheStore<String, String> {
        CacheStore::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn set(store: &mut CacheStore<String, String>, key: &str, value: &str) {
        store.insert(key.to_string(), value.to_string(), None);
    }

    fn assert_consistent<K: Eq + Hash + Clone, V>(store: &CacheStore<K, V>) {
        assert_eq!(store.index.len(), store.order.len());
        assert!(store.order.len() <= store.capacity());
        for (id, entry) in store.order.iter() {
            assert_eq!(store.index.get(&entry.key), Some(&id));
        }
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);
        let now = Instant::now();

        set(&mut store, "key1", "value1");

        assert_eq!(store.get("key1", now).map(String::as_str), Some("value1"));
        assert_eq!(store.len(), 1);
        assert_consistent(&store);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);
        assert!(store.get("nonexistent", Instant::now()).is_none());
    }

    #[test]
    fn test_store_remove() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");

        assert_eq!(store.remove("key1").as_deref(), Some("value1"));
        assert!(store.is_empty());
        assert!(store.get("key1", Instant::now()).is_none());
        assert_consistent(&store);
    }

    #[test]
    fn test_store_remove_nonexistent() {
        let mut store = store(100);
        set(&mut store, "key1", "value1");

        assert!(store.remove("nonexistent").is_none());
        assert!(store.remove("nonexistent").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");
        set(&mut store, "key1", "value2");

        assert_eq!(
            store.get("key1", Instant::now()).map(String::as_str),
            Some("value2")
        );
        assert_eq!(store.len(), 1);
        assert_consistent(&store);
    }

    #[test]
    fn test_store_overwrite_moves_to_front() {
        let mut store = store(3);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "c", "3");
        set(&mut store, "a", "4");

        let keys: Vec<&str> = store.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);
        let now = Instant::now();

        store.insert(
            "key1".to_string(),
            "value1".to_string(),
            Some(now + Duration::from_secs(1)),
        );

        // Accessible before the deadline
        assert!(store.get("key1", now).is_some());
        assert!(store.get("key1", now + Duration::from_millis(999)).is_some());

        // Gone at the deadline, and purged from both views
        assert!(store.get("key1", now + Duration::from_secs(1)).is_none());
        assert_eq!(store.len(), 0);
        assert_consistent(&store);
    }

    #[test]
    fn test_store_insert_clears_ttl() {
        let mut store = store(100);
        let now = Instant::now();

        store.insert("key1".to_string(), "v1".to_string(), Some(now));
        set(&mut store, "key1", "v2");

        let later = now + Duration::from_secs(3600);
        assert_eq!(store.get("key1", later).map(String::as_str), Some("v2"));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Cache is full, adding key4 should evict key1 (oldest)
        set(&mut store, "key4", "value4");

        assert_eq!(store.len(), 3);
        assert!(store.get("key1", now).is_none());
        assert!(store.get("key2", now).is_some());
        assert!(store.get("key3", now).is_some());
        assert!(store.get("key4", now).is_some());
        assert_consistent(&store);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Access key1 to make it most recently used
        store.get("key1", now).unwrap();

        // Adding key4 should evict key2 (now oldest)
        set(&mut store, "key4", "value4");

        assert!(store.get("key1", now).is_some());
        assert!(store.get("key2", now).is_none());
    }

    #[test]
    fn test_store_eviction_ignores_expiry() {
        let mut store = store(2);
        let now = Instant::now();

        // "old" is least recent but still live; "dead" has expired
        set(&mut store, "old", "1");
        store.insert("dead".to_string(), "2".to_string(), Some(now));

        set(&mut store, "new", "3");

        // Eviction is purely recency-based, so the live "old" goes
        let keys: Vec<&str> = store.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["new", "dead"]);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_peek_does_not_promote() {
        let mut store = store(2);
        let now = Instant::now();

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");

        assert!(store.peek("a", now).is_some());
        set(&mut store, "c", "3");

        assert!(store.peek("a", now).is_none());
        assert_eq!(store.stats().hits, 0);
    }

    #[test]
    fn test_store_peek_hides_expired_without_purging() {
        let mut store = store(2);
        let now = Instant::now();

        store.insert("a".to_string(), "1".to_string(), Some(now));

        assert!(store.peek("a", now).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);
        let now = Instant::now();

        set(&mut store, "key1", "value1");
        store.get("key1", now).unwrap(); // hit
        let _ = store.get("nonexistent", now); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);

        store.reset_stats();
        assert_eq!(store.stats().hits, 0);
        assert_eq!(store.stats().total_entries, 1);
    }

    #[test]
    fn test_store_purge_expired() {
        let mut store = store(100);
        let now = Instant::now();

        store.insert("key1".to_string(), "v".to_string(), Some(now + Duration::from_secs(1)));
        store.insert("key2".to_string(), "v".to_string(), Some(now + Duration::from_secs(10)));
        set(&mut store, "key3", "v");

        let removed = store.purge_expired(now + Duration::from_secs(2));

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().expirations, 1);
        assert!(store.get("key2", now).is_some());
        assert_consistent(&store);
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.capacity(), 3);
        assert!(store.get("a", now).is_none());

        // Usable again after clearing
        set(&mut store, "c", "3");
        assert_eq!(store.len(), 1);
        assert_consistent(&store);
    }
}
