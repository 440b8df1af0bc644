//! Recognition result caching
//!
//! Walking the automaton is cheap but not free; hosts that re-handle the
//! same URLs (back/forward navigation, link hovering) can put an LRU cache
//! in front of recognition with the `cache` feature. Purely an optimization:
//! cached results are never observable in recognition output.

use crate::trace_log;
use crate::Recognition;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    /// Fraction of probes answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of path string to recognition result
///
/// Default capacity: 1000 entries.
#[derive(Debug)]
pub struct RecognitionCache {
    entries: LruCache<String, Recognition>,
    stats: CacheStats,
}

impl RecognitionCache {
    const DEFAULT_CAPACITY: usize = 1000;

    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache with a specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("Cache capacity must be non-zero");
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up a previously recognized path
    pub fn get(&mut self, path: &str) -> Option<Recognition> {
        if let Some(recognition) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("recognition cache hit for '{}'", path);
            Some(recognition.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("recognition cache miss for '{}'", path);
            None
        }
    }

    /// Store a recognition result
    pub fn put(&mut self, path: String, recognition: Recognition) {
        self.entries.push(path, recognition);
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        trace_log!("clearing recognition cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    /// Cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset statistics without touching entries
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Default for RecognitionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecognitionCache {
    fn clone(&self) -> Self {
        // Entries are not cloned; a cloned cache starts cold at the same
        // capacity, keeping stats for continuity.
        Self {
            entries: LruCache::new(self.entries.cap()),
            stats: self.stats.clone(),
        }
    }
}
