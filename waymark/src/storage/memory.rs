//! In-memory tile store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{StorageError, TileStore};

/// Tile store backed by a map. Counts reads so tests can observe caching.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    tiles: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.tiles.write().insert(path.into(), bytes);
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.tiles.write().remove(path)
    }

    pub fn len(&self) -> usize {
        self.tiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.read().is_empty()
    }

    /// Number of `read` calls so far, hits and misses alike.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl TileStore for MemoryTileStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.tiles
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn contains(&self, path: &str) -> bool {
        self.tiles.read().contains_key(path)
    }
}
