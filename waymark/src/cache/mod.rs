//! Raster cache and background preloading.
//!
//! The [`TileCache`] keeps a handful of rendered tiles so panning back over
//! recent ground skips the decode. Its size is planned once from available
//! memory ([`detect_capacity`]); on constrained hardware it may come out as
//! zero, which disables caching without affecting correctness.
//!
//! The [`Preloader`] warms the cache with the neighbors of the tile under
//! the viewport. It is an optimization only.

mod capacity;
mod preloader;
mod tile_cache;

pub use capacity::{compute_capacity, detect_capacity, DEFAULT_MAX_TILES};
pub use preloader::{
    PreloadRequest, PreloadStats, Preloader, DEFAULT_QUEUE_DEPTH, NEIGHBOR_OFFSETS,
};
pub use tile_cache::{path_hash, CacheStats, CachedTile, TileCache};

/// Cache and preloader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Master switch. When off the cache has capacity zero.
    pub enabled: bool,
    /// Upper bound on cached tiles after the memory check.
    pub max_tiles: usize,
    /// Fixed capacity, bypassing the memory check.
    pub capacity: Option<usize>,
    /// Run the background preloader.
    pub preload: bool,
    /// Preload request queue depth.
    pub queue_depth: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tiles: DEFAULT_MAX_TILES,
            capacity: None,
            preload: true,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl CacheConfig {
    /// Capacity this configuration resolves to on the current machine.
    pub fn resolve_capacity(&self) -> usize {
        if !self.enabled {
            return 0;
        }
        match self.capacity {
            Some(fixed) => fixed,
            None => detect_capacity(self.max_tiles),
        }
    }

    /// Builds a cache sized by this configuration.
    pub fn build(&self) -> TileCache {
        TileCache::new(self.resolve_capacity())
    }
}
