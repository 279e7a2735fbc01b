//! Bounded LRU cache for decoded book records.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Default number of records kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Plain LRU map. Not synchronized; see [`RecordCache`].
#[derive(Debug)]
struct Lru<V> {
    cap: usize,
    map: HashMap<String, V>,
    /// Keys from least to most recently used.
    order: Vec<String>,
}

impl<V: Clone> Lru<V> {
    fn new(cap: usize) -> Self {
        Self {
            cap,
            map: HashMap::with_capacity(cap),
            order: Vec::with_capacity(cap),
        }
    }

    fn get(&mut self, key: &str) -> Option<V> {
        let value = self.map.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn insert(&mut self, key: String, value: V) {
        if self.cap == 0 {
            return;
        }

        if self.map.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }

        self.order.push(key);

        while self.map.len() > self.cap {
            if self.order.is_empty() {
                break;
            }
            let evicted = self.order.remove(0);
            self.map.remove(&evicted);
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos);
            self.order.push(k);
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Thread-safe cache of immutable record snapshots keyed by folder name.
///
/// A lookup and an insert are each a single critical section, so two
/// concurrent misses on the same folder may both decode it; the later insert
/// simply replaces the earlier one.
pub struct RecordCache<V> {
    inner: Mutex<Lru<Arc<V>>>,
}

impl<V> RecordCache<V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Lru::new(capacity)),
        }
    }

    /// Look up an entry, marking it most recently used.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.inner.lock().get(key)
    }

    /// Insert an entry, evicting the least recently used one if full.
    pub fn insert(&self, key: impl Into<String>, value: Arc<V>) {
        self.inner.lock().insert(key.into(), value);
    }

    /// Whether `key` is cached. Does not affect recency.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().map.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl<V> Default for RecordCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
