//! LRU store of rendered tile rasters.
//!
//! Entries are keyed by a 31-multiplier polynomial hash of the tile path,
//! with the path itself compared on hash hits so collisions cannot serve the
//! wrong tile. Every hit stamps the entry with a monotonically increasing
//! access counter; when full, the entry with the smallest stamp goes.
//!
//! Rasters are zoom-specific. A zoom change clears the cache and bumps its
//! generation, and results computed for an older generation are dropped by
//! [`TileCache::put_if_current`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, trace};

use crate::render::Raster;

/// Polynomial (×31, wrapping) hash of a tile path.
pub fn path_hash(path: &str) -> u32 {
    path.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Cache statistics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub capacity: usize,
    pub generation: u64,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`, or zero before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// One cached raster.
#[derive(Debug, Clone)]
pub struct CachedTile {
    pub raster: Arc<Raster>,
    pub path: String,
    pub path_hash: u32,
    pub last_access: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<CachedTile>,
    counter: u64,
    generation: u64,
    zoom: Option<u8>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Inner {
    fn position(&self, hash: u32, path: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.path_hash == hash && e.path == path)
    }

    fn tick(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }
}

/// Bounded LRU raster cache.
///
/// The lock is only held for bookkeeping; callers decode outside it.
/// A capacity of zero disables the cache: every `get` misses and `put` does
/// nothing.
#[derive(Debug)]
pub struct TileCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                entries: Vec::with_capacity(capacity),
                ..Default::default()
            }),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current generation; bumped by every invalidation.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Whether `path` is cached, without touching its access stamp.
    pub fn contains(&self, path: &str) -> bool {
        let inner = self.inner.lock();
        inner.position(path_hash(path), path).is_some()
    }

    /// Looks up a raster, refreshing its access stamp on a hit.
    pub fn get(&self, path: &str) -> Option<Arc<Raster>> {
        let hash = path_hash(path);
        let mut inner = self.inner.lock();
        match inner.position(hash, path) {
            Some(i) => {
                let stamp = inner.tick();
                inner.hits += 1;
                let entry = &mut inner.entries[i];
                entry.last_access = stamp;
                Some(Arc::clone(&entry.raster))
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Stores a raster, evicting the least recently used entry when full.
    pub fn put(&self, path: &str, raster: Arc<Raster>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        self.insert_locked(&mut inner, path, raster);
    }

    /// Stores a raster only if no invalidation happened since `generation`.
    ///
    /// Returns whether the raster was stored.
    pub fn put_if_current(&self, generation: u64, path: &str, raster: Arc<Raster>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            trace!(path, generation, current = inner.generation, "dropping stale tile");
            return false;
        }
        self.insert_locked(&mut inner, path, raster);
        true
    }

    fn insert_locked(&self, inner: &mut Inner, path: &str, raster: Arc<Raster>) {
        let hash = path_hash(path);
        let stamp = inner.tick();
        if let Some(i) = inner.position(hash, path) {
            let entry = &mut inner.entries[i];
            entry.raster = raster;
            entry.last_access = stamp;
            return;
        }

        if inner.entries.len() >= self.capacity {
            if let Some(victim) = inner
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(i, _)| i)
            {
                let evicted = inner.entries.swap_remove(victim);
                inner.evictions += 1;
                trace!(path = %evicted.path, last_access = evicted.last_access, "evicted tile");
            }
        }

        inner.entries.push(CachedTile {
            raster,
            path: path.to_string(),
            path_hash: hash,
            last_access: stamp,
        });
    }

    /// Records the zoom level, invalidating everything if it changed.
    ///
    /// Returns whether the cache was invalidated.
    pub fn set_zoom(&self, zoom: u8) -> bool {
        let mut inner = self.inner.lock();
        match inner.zoom.replace(zoom) {
            Some(previous) if previous != zoom => {
                let dropped = inner.entries.len();
                inner.clear();
                info!(
                    from = previous,
                    to = zoom,
                    dropped,
                    generation = inner.generation,
                    "zoom changed, tile cache invalidated"
                );
                true
            }
            _ => false,
        }
    }

    /// Drops every entry and bumps the generation.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        inner.clear();
        trace!(generation = inner.generation, "tile cache invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.entries.len(),
            capacity: self.capacity,
            generation: inner.generation,
        }
    }

    /// Access stamp of a cached path, for diagnostics and tests.
    pub fn last_access(&self, path: &str) -> Option<u64> {
        let inner = self.inner.lock();
        inner
            .position(path_hash(path), path)
            .map(|i| inner.entries[i].last_access)
    }
}
