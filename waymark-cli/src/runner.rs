//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, opening the map
//! directory and writing images, to reduce duplication across command
//! handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use waymark::config::{config_file_path, ConfigFile};
use waymark::logging::{init_logging, LoggingGuard};
use waymark::render::Raster;
use waymark::source::TileSource;

use crate::error::CliError;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file to use instead of the default location.
    pub config: Option<PathBuf>,
    /// Map directory overriding `[map] root`.
    pub map: Option<PathBuf>,
    /// Log at debug level regardless of the config file.
    pub verbose: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config_path = options.config.clone().unwrap_or_else(config_file_path);
        let mut config = ConfigFile::load_from(&config_path)?;
        if let Some(map) = &options.map {
            config.map.root = map.clone();
        }

        let level = if options.verbose {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        };
        let logging_guard = init_logging(&config.logging.directory, &config.logging.file, &level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            config_path,
        })
    }

    /// Log startup information.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            config = %self.config_path.display(),
            map = %self.config.map.root.display(),
            "waymark starting"
        );
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Open the configured map directory.
    pub fn open_source(&self) -> Result<Arc<TileSource>, CliError> {
        let map = &self.config.map;
        let source =
            TileSource::open_with_extension(&map.root, &map.extension, map.render_config())?;
        Ok(Arc::new(source))
    }
}

/// Write a raster as a PNG file.
pub fn save_png(raster: &Raster, path: &Path) -> Result<(), CliError> {
    raster
        .to_rgba_image()
        .save(path)
        .map_err(|e| CliError::FileWrite {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    println!("Saved {}x{} image to {}", raster.width(), raster.height(), path.display());
    Ok(())
}
