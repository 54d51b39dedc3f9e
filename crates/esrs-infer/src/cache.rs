//! LRU cache for inference results.
//!
//! Query embeddings and cross-encoder scores are both deterministic for a
//! given input, so repeated questions skip the model entirely.
//! Default: 1000 entries, 1-hour TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe LRU cache keyed by input text.
pub struct InferenceCache<V> {
    inner: Mutex<CacheInner<V>>,
}

struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: Vec<String>,
    max_size: usize,
    ttl: Duration,
}

impl<V: Clone> InferenceCache<V> {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: Vec::with_capacity(max_size),
                max_size,
                ttl,
            }),
        }
    }

    /// Create a cache with default settings (1000 entries, 1hr TTL).
    pub fn default_cache() -> Self {
        Self::new(1000, Duration::from_secs(3600))
    }

    /// Key for a (query, passage) pair.
    pub fn pair_key(query: &str, passage: &str) -> String {
        format!("{query}\u{1f}{passage}")
    }

    /// Get a cached value. Returns None on miss or expired entry.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();

        let (value, expired) = match inner.entries.get(key) {
            Some(entry) => (
                entry.value.clone(),
                entry.inserted_at.elapsed() >= inner.ttl,
            ),
            None => return None,
        };

        inner.order.retain(|k| k != key);
        if expired {
            inner.entries.remove(key);
            return None;
        }
        inner.order.push(key.to_string());
        Some(value)
    }

    /// Insert a value, evicting the least recently used entries at capacity.
    pub fn put(&self, key: String, value: V) {
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else {
            while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
                let oldest = inner.order.remove(0);
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}
