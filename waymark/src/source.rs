//! Tile source: storage, palette, decoder and renderer in one place.
//!
//! Answers "give me the raster for this tile path". Used in the foreground
//! by the viewport and in the background by the preloader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::codec::{CodecError, DecodedTile, Palette, TileDecoder};
use crate::render::{RenderConfig, Raster, Renderer};
use crate::storage::{FsTileStore, StorageError, TileStore, DEFAULT_TILE_EXTENSION};

/// Name of the palette file at the root of a map directory.
pub const PALETTE_FILE: &str = "palette.bin";

/// Errors loading a tile.
#[derive(Debug, Error)]
pub enum TileError {
    /// The tile does not exist; the caller shows a placeholder.
    #[error("tile {0} not found")]
    NotFound(String),

    #[error("failed to read tile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode tile {path}: {source}")]
    Codec {
        path: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to load palette {}: {message}", path.display())]
    Palette { path: PathBuf, message: String },
}

impl TileError {
    /// Whether the tile is simply absent (missing file or nothing drawable).
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            TileError::NotFound(_)
                | TileError::Codec {
                    source: CodecError::Empty,
                    ..
                }
        )
    }
}

impl From<StorageError> for TileError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => TileError::NotFound(path),
            StorageError::Io { path, source } => TileError::Io { path, source },
        }
    }
}

/// Loads a palette file.
pub fn load_palette(path: &Path) -> Result<Palette, TileError> {
    let bytes = std::fs::read(path).map_err(|e| TileError::Palette {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Palette::parse(&bytes).map_err(|e| TileError::Palette {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Reads, decodes and renders tiles.
#[derive(Clone)]
pub struct TileSource {
    store: Arc<dyn TileStore>,
    decoder: TileDecoder,
    renderer: Renderer,
}

impl TileSource {
    pub fn new(store: Arc<dyn TileStore>, decoder: TileDecoder, renderer: Renderer) -> Self {
        Self {
            store,
            decoder,
            renderer,
        }
    }

    /// Opens a map directory, loading `palette.bin` from its root if present.
    ///
    /// A missing palette is not an error: indexed colors in tiles are then
    /// skipped command by command. A palette that exists but fails to parse is.
    pub fn open(root: impl AsRef<Path>, render: RenderConfig) -> Result<Self, TileError> {
        Self::open_with_extension(root, DEFAULT_TILE_EXTENSION, render)
    }

    /// Like [`TileSource::open`] for tile files with a custom extension.
    pub fn open_with_extension(
        root: impl AsRef<Path>,
        extension: &str,
        render: RenderConfig,
    ) -> Result<Self, TileError> {
        let root = root.as_ref();
        let palette_path = root.join(PALETTE_FILE);
        let decoder = if palette_path.is_file() {
            let palette = load_palette(&palette_path)?;
            info!(path = %palette_path.display(), colors = palette.len(), "loaded palette");
            TileDecoder::with_palette(Arc::new(palette))
        } else {
            debug!(path = %palette_path.display(), "no palette file, indexed colors disabled");
            TileDecoder::new()
        };
        Ok(Self::new(
            Arc::new(FsTileStore::new(root).with_extension(extension)),
            decoder,
            Renderer::new(render),
        ))
    }

    pub fn store(&self) -> &Arc<dyn TileStore> {
        &self.store
    }

    pub fn decoder(&self) -> &TileDecoder {
        &self.decoder
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Reads and decodes one tile.
    pub fn decode(&self, path: &str) -> Result<DecodedTile, TileError> {
        let bytes = self.store.read(path)?;
        self.decoder
            .decode(&bytes)
            .map_err(|source| TileError::Codec {
                path: path.to_string(),
                source,
            })
    }

    /// Reads, decodes and renders one tile into a 256×256 raster.
    pub fn render(&self, path: &str) -> Result<Raster, TileError> {
        let tile = self.decode(path)?;
        if tile.skipped > 0 {
            debug!(path, skipped = tile.skipped, "tile had malformed commands");
        }
        Ok(self.renderer.render(&tile))
    }
}

impl std::fmt::Debug for TileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileSource")
            .field("decoder", &self.decoder)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Color332, TileWriter, LOGICAL_PER_PIXEL as PX};
    use crate::storage::MemoryTileStore;
    use tempfile::TempDir;

    fn memory_source() -> (Arc<MemoryTileStore>, TileSource) {
        let store = Arc::new(MemoryTileStore::new());
        let source = TileSource::new(store.clone(), TileDecoder::new(), Renderer::default());
        (store, source)
    }

    #[test]
    fn test_render_from_memory() {
        let (store, source) = memory_source();
        store.insert(
            "2/1/1",
            TileWriter::new()
                .set_color(Color332::RED)
                .rectangle(10 * PX, 10 * PX, 10 * PX, 10 * PX)
                .finish(),
        );
        let raster = source.render("2/1/1").unwrap();
        assert_eq!(raster.get(15, 15), Some(Color332::RED));
    }

    #[test]
    fn test_missing_and_empty_tiles_are_absent() {
        let (store, source) = memory_source();
        assert!(source.render("2/0/0").unwrap_err().is_absent());

        store.insert("2/0/1", vec![0]);
        let err = source.render("2/0/1").unwrap_err();
        assert!(err.is_absent());
        assert!(matches!(err, TileError::Codec { .. }));
    }

    #[test]
    fn test_open_loads_palette() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PALETTE_FILE),
            Palette::encode(&[(0, 0, 0), (255, 0, 0)]),
        )
        .unwrap();
        let source = TileSource::open(dir.path(), RenderConfig::default()).unwrap();
        assert_eq!(source.decoder().palette().map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_open_without_palette() {
        let dir = TempDir::new().unwrap();
        let source = TileSource::open(dir.path(), RenderConfig::default()).unwrap();
        assert!(source.decoder().palette().is_none());
    }

    #[test]
    fn test_broken_palette_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PALETTE_FILE), [5, 0]).unwrap();
        let err = TileSource::open(dir.path(), RenderConfig::default()).unwrap_err();
        assert!(matches!(err, TileError::Palette { .. }));
    }
}
