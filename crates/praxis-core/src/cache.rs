//! Optional shared cache collaborator.

use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;

/// A shared, concurrency-safe byte cache.
///
/// Values are serialised bytes so one cache instance can serve
/// operations with different response types. Implementations must be
/// safe to call from many invocations at once.
pub trait ValueCache: Send + Sync + 'static {
    /// Returns the cached value for `key`, if present.
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Stores a value under `key`, replacing any previous one.
    fn put(&self, key: &str, value: Bytes);

    /// Drops the value under `key`, if present.
    fn invalidate(&self, key: &str);
}

/// In-memory [`ValueCache`] backed by a concurrent map.
///
/// Intended for single-process deployments and tests. Clones share the
/// same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Bytes>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, value: Bytes) {
        self.entries.insert(key.to_owned(), value);
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}
