//! User configuration.
//!
//! A single INI file with one section per component:
//!
//! ```ini
//! [map]        ; tile directory, extension, background, culling
//! [cache]      ; raster cache and preloader
//! [viewport]   ; display mode, zoom range, inertia, route style
//! [navigation] ; matcher distances and guidance thresholds
//! [turns]      ; turn detection
//! [logging]    ; log directory, file and level
//! ```
//!
//! Missing files and missing keys fall back to defaults; malformed values
//! are reported with their section and key.

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    default_map_root, ConfigFile, LoggingSettings, MapSettings, NavigationSettings,
};
