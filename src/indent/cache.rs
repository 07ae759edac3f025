//! Capture map cache
//!
//! Building a capture map runs the whole `indents` query, so maps are kept
//! per (buffer, tree generation, root, language). Every parse gets a new
//! generation, which makes every old key unreachable; the LRU bound then
//! evicts stale entries without an explicit invalidation protocol.

use crate::indent::captures::CaptureMap;
use crate::model::document::BufferId;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Identity of one capture map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub buffer: BufferId,
    pub generation: u64,
    /// Root node identity, distinguishing injected trees of the same language
    pub root: usize,
    pub language: String,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded LRU of capture maps
pub struct CaptureCache {
    entries: LruCache<CacheKey, Rc<CaptureMap>>,
    stats: CacheStats,
}

impl CaptureCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Return the cached map for `key`, building it on a miss
    pub fn get_or_build(
        &mut self,
        key: CacheKey,
        build: impl FnOnce() -> CaptureMap,
    ) -> Rc<CaptureMap> {
        if let Some(map) = self.entries.get(&key) {
            self.stats.hits += 1;
            tracing::trace!("Capture cache hit for {:?}", key);
            return Rc::clone(map);
        }

        self.stats.misses += 1;
        tracing::debug!(
            "Capture cache miss for {} (buffer {:?}, generation {})",
            key.language,
            key.buffer,
            key.generation
        );
        let map = Rc::new(build());
        self.entries.put(key, Rc::clone(&map));
        map
    }

    /// Drop every entry belonging to a buffer (e.g. when it is closed)
    pub fn invalidate_buffer(&mut self, buffer: BufferId) {
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.buffer == buffer)
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.entries.pop(&key);
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
