//! Tile storage abstraction.
//!
//! The engine reads tile and palette files through [`TileStore`] so the
//! decode path can be tested without a filesystem. [`FsTileStore`] serves
//! the on-device layout `{root}/{zoom}/{x}/{y}.fmp`; [`MemoryTileStore`]
//! backs tests and tools.

mod fs;
mod memory;

pub use fs::{FsTileStore, DEFAULT_TILE_EXTENSION};
pub use memory::MemoryTileStore;

use thiserror::Error;

/// Errors from a tile store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No file at the requested path. Expected for tiles outside the map.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other I/O failure.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Read access to tile files.
///
/// Paths are the tile's `"{zoom}/{x}/{y}"` key; the store adds its own root
/// and extension.
pub trait TileStore: Send + Sync {
    /// Reads the whole file for a tile path.
    ///
    /// # Returns
    ///
    /// The file bytes, [`StorageError::NotFound`] when the tile does not
    /// exist, or [`StorageError::Io`] for anything else.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Whether a tile file exists. Defaults to attempting a read.
    fn contains(&self, path: &str) -> bool {
        self.read(path).is_ok()
    }
}

impl<T: TileStore + ?Sized> TileStore for std::sync::Arc<T> {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).read(path)
    }

    fn contains(&self, path: &str) -> bool {
        (**self).contains(path)
    }
}
