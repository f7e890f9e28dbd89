//! Match caching
//!
//! Memoises `pathname -> (route index, params)` with LRU eviction so repeated
//! syncs to the same pathname skip pattern matching. Misses (no route) are
//! cached too. Any change to the route table must [`clear`](MatchCache::clear)
//! the cache.

use crate::params::RouteParams;
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cached resolution: `None` records that no route matched
pub type CachedMatch = Option<(usize, RouteParams)>;

/// Pathname resolution cache with LRU eviction
#[derive(Debug)]
pub struct MatchCache {
    entries: LruCache<String, CachedMatch>,
    stats: CacheStats,
}

impl MatchCache {
    /// Default capacity: 256 pathnames.
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, pathname: &str) -> Option<CachedMatch> {
        if let Some(entry) = self.entries.get(pathname) {
            self.stats.hits += 1;
            trace_log!("Match cache hit for '{}'", pathname);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Match cache miss for '{}'", pathname);
            None
        }
    }

    pub fn insert(&mut self, pathname: String, resolved: CachedMatch) {
        self.entries.push(pathname, resolved);
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing match cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}
