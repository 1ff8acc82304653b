//! Cache abstraction for parsed stats manifests.
//!
//! Production deployments keep the parsed manifest in a process-wide cache
//! so each request does not re-read the stats file. The cache is injected
//! into the [`Loader`](crate::Loader) rather than reached through a global,
//! and the whole manifest lives under one fixed key with no expiration: the
//! entry is overwritten on reload and deleted at startup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use webpack_stats_core::Stats;

/// Fixed key the parsed manifest is cached under.
pub const STATS_CACHE_KEY: &str = "webpack-loader-stats";

/// Key-value store for parsed manifests.
///
/// Implementations are free to back this with anything that can hold an
/// `Arc<Stats>` (an in-process map, a framework cache, ...). Entries have no
/// TTL; invalidation is explicit.
pub trait StatsCache {
    /// Returns the cached manifest, if any.
    fn get(&self, key: &str) -> Option<Arc<Stats>>;
    /// Stores a manifest, overwriting any previous entry.
    fn set(&self, key: &str, stats: Arc<Stats>);
    /// Removes an entry; absent keys are a no-op.
    fn delete(&self, key: &str);
}

impl<C: StatsCache + ?Sized> StatsCache for &C {
    fn get(&self, key: &str) -> Option<Arc<Stats>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, stats: Arc<Stats>) {
        (**self).set(key, stats)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }
}

impl<C: StatsCache + ?Sized> StatsCache for Arc<C> {
    fn get(&self, key: &str) -> Option<Arc<Stats>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, stats: Arc<Stats>) {
        (**self).set(key, stats)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }
}

/// Mutex-guarded in-process cache.
///
/// Share one instance (behind an `Arc`) across request handlers to get the
/// process-wide single-slot behavior.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use webpack_stats_core::Stats;
/// use webpack_stats_loader::{MemoryCache, STATS_CACHE_KEY, StatsCache};
///
/// let cache = MemoryCache::new();
/// cache.set(STATS_CACHE_KEY, Arc::new(Stats::default()));
/// assert!(cache.get(STATS_CACHE_KEY).is_some());
/// cache.delete(STATS_CACHE_KEY);
/// assert!(cache.get(STATS_CACHE_KEY).is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Arc<Stats>>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<Stats>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, stats: Arc<Stats>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), stats);
        }
    }

    fn delete(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// Cache that never stores anything.
///
/// The development-mode choice: every lookup misses, so the loader re-reads
/// the stats file on each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl StatsCache for NoCache {
    fn get(&self, _key: &str) -> Option<Arc<Stats>> {
        None
    }

    fn set(&self, _key: &str, _stats: Arc<Stats>) {}

    fn delete(&self, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_set_get_delete() {
        let cache = MemoryCache::new();
        assert!(cache.get(STATS_CACHE_KEY).is_none());

        cache.set(STATS_CACHE_KEY, Arc::new(Stats::default()));
        assert!(cache.get(STATS_CACHE_KEY).is_some());

        cache.delete(STATS_CACHE_KEY);
        assert!(cache.get(STATS_CACHE_KEY).is_none());
    }

    #[test]
    fn test_memory_cache_overwrites() {
        let cache = MemoryCache::new();
        let first = Arc::new(Stats::default());
        cache.set(STATS_CACHE_KEY, Arc::clone(&first));

        let second = Arc::new(Stats {
            error: Some("SyntaxError".into()),
            ..Default::default()
        });
        cache.set(STATS_CACHE_KEY, second);

        let cached = cache.get(STATS_CACHE_KEY).unwrap();
        assert_eq!(cached.error.as_deref(), Some("SyntaxError"));
    }

    #[test]
    fn test_no_cache_never_stores() {
        let cache = NoCache;
        cache.set(STATS_CACHE_KEY, Arc::new(Stats::default()));
        assert!(cache.get(STATS_CACHE_KEY).is_none());
    }

    #[test]
    fn test_shared_cache_through_arc() {
        let cache = Arc::new(MemoryCache::new());
        let other = Arc::clone(&cache);

        cache.set(STATS_CACHE_KEY, Arc::new(Stats::default()));
        assert!(other.get(STATS_CACHE_KEY).is_some());
    }
}
