//! Filesystem tile store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{StorageError, TileStore};

/// Extension of tile files on the device.
pub const DEFAULT_TILE_EXTENSION: &str = "fmp";

/// Reads tiles from `{root}/{zoom}/{x}/{y}.{extension}`.
#[derive(Debug, Clone)]
pub struct FsTileStore {
    root: PathBuf,
    extension: String,
}

impl FsTileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_TILE_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full filesystem path of a tile key.
    pub fn file_path(&self, path: &str) -> PathBuf {
        let mut file = self.root.join(path);
        file.set_extension(&self.extension);
        file
    }
}

impl TileStore for FsTileStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let file = self.file_path(path);
        trace!(file = %file.display(), "reading tile file");
        std::fs::read(&file).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            _ => StorageError::Io {
                path: path.to_string(),
                source,
            },
        })
    }

    fn contains(&self, path: &str) -> bool {
        self.file_path(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_tile_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("16/19295")).unwrap();
        std::fs::write(dir.path().join("16/19295/24640.fmp"), [1, 2, 3]).unwrap();

        let store = FsTileStore::new(dir.path());
        assert_eq!(store.read("16/19295/24640").unwrap(), vec![1, 2, 3]);
        assert!(store.contains("16/19295/24640"));
    }

    #[test]
    fn test_missing_tile_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsTileStore::new(dir.path());
        let err = store.read("3/1/1").unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.contains("3/1/1"));
    }

    #[test]
    fn test_custom_extension() {
        let store = FsTileStore::new("/maps").with_extension("bin");
        assert_eq!(store.file_path("1/0/1"), PathBuf::from("/maps/1/0/1.bin"));
    }
}
