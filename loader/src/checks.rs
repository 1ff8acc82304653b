//! Startup validation and cache invalidation.
//!
//! Hosts that run validation hooks at boot call [`startup`] with the raw
//! configuration collection and the shared cache. The returned diagnostics
//! are advisory; a malformed collection does not halt the process here.

use serde_json::Value;
use webpack_stats_core::{CheckError, validate_settings};

use crate::cache::{STATS_CACHE_KEY, StatsCache};

/// Runs the boot-time checks for the loader.
///
/// Clears any manifest cached by a previous process (a restart usually
/// means a fresh build) and validates the shape of the configuration
/// collection. Empty result means healthy.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use webpack_stats_loader::{MemoryCache, startup};
///
/// let cache = MemoryCache::new();
/// let diagnostics = startup(&json!({"DEFAULT": {"local": true}}), &cache);
/// assert!(diagnostics.is_empty());
///
/// let diagnostics = startup(&json!({"DEFAULT": "oops"}), &cache);
/// assert_eq!(diagnostics.len(), 1);
/// ```
pub fn startup<C: StatsCache>(raw_configs: &Value, cache: &C) -> Vec<CheckError> {
    cache.delete(STATS_CACHE_KEY);
    validate_settings(raw_configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, StatsCache};
    use serde_json::json;
    use std::sync::Arc;
    use webpack_stats_core::Stats;

    #[test]
    fn test_startup_clears_stale_cache() {
        let cache = MemoryCache::new();
        cache.set(STATS_CACHE_KEY, Arc::new(Stats::default()));

        let diagnostics = startup(&Value::Null, &cache);
        assert!(diagnostics.is_empty());
        assert!(cache.get(STATS_CACHE_KEY).is_none());
    }

    #[test]
    fn test_startup_reports_bad_shape() {
        let cache = MemoryCache::new();
        let diagnostics = startup(&json!(["DEFAULT"]), &cache);
        assert_eq!(diagnostics, vec![CheckError::NotAMapping]);
    }
}
