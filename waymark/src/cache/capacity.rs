//! Cache sizing from available memory.

use sysinfo::System;
use tracing::{debug, warn};

use crate::render::Raster;

/// Default upper bound on cached tiles.
pub const DEFAULT_MAX_TILES: usize = 4;

/// Tiles that fit in half of `available` bytes, capped at `max_tiles`.
///
/// The other half stays free for the canvas, decode scratch and the rest of
/// the firmware.
pub fn compute_capacity(available: usize, raster_bytes: usize, max_tiles: usize) -> usize {
    if raster_bytes == 0 {
        return 0;
    }
    ((available / 2) / raster_bytes).min(max_tiles)
}

/// Probes available system memory and sizes the cache for tile rasters.
pub fn detect_capacity(max_tiles: usize) -> usize {
    let mut sys = System::new();
    sys.refresh_memory();
    let available = usize::try_from(sys.available_memory()).unwrap_or(usize::MAX);
    let capacity = compute_capacity(available, Raster::tile_bytes(), max_tiles);
    if capacity == 0 {
        warn!(available, "not enough free memory for a tile cache, caching disabled");
    } else {
        debug!(available, capacity, "sized tile cache");
    }
    capacity
}
