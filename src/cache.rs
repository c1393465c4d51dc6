//! Match resolution caching
//!
//! Repeated navigations, link activity checks and preloads resolve the same
//! pathnames over and over. [`MatchCache`] memoizes pathname -> chain lookups
//! (misses included) with an LRU eviction policy.

use crate::matcher::MatchChain;
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
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

/// Pathname -> match chain cache with LRU eviction
///
/// A cached `None` records that no chain matches the pathname.
///
/// Default capacity: 1000 entries.
#[derive(Debug)]
pub struct MatchCache {
    chains: LruCache<String, Option<MatchChain>>,
    stats: CacheStats,
}

impl MatchCache {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A capacity of zero is bumped to one
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            chains: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Outer `None` is a cache miss; inner `None` a cached no-match
    pub fn get(&mut self, pathname: &str) -> Option<Option<MatchChain>> {
        if let Some(chain) = self.chains.get(pathname) {
            self.stats.hits += 1;
            trace_log!("match cache hit for '{}'", pathname);
            Some(chain.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("match cache miss for '{}'", pathname);
            None
        }
    }

    pub fn insert(&mut self, pathname: impl Into<String>, chain: Option<MatchChain>) {
        self.chains.push(pathname.into(), chain);
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.chains.cap().get()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}
