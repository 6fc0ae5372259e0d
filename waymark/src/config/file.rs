//! Configuration file handling for `config.ini`.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], parsing in
//! [`super::parser`], and serialization in [`super::writer`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(ini::Error::Parse)?;
        super::parser::parse_ini(&ini)
    }

    /// Commented INI text for this configuration.
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, self.to_ini_string())
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create a default config file at `path` if it doesn't exist.
    ///
    /// Returns whether a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        Self::ensure_exists_at(&path)?;
        Ok(path)
    }
}

/// Get the path to the config directory (`<config dir>/waymark`).
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("waymark")
}

/// Get the path to the config file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Color332;
    use crate::viewport::DisplayMode;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.map.root = PathBuf::from("/srv/maps");
        config.map.background = Color332::WHITE;
        config.cache.capacity = Some(12);
        config.viewport.mode = DisplayMode::NorthUp;
        config.viewport.inertia_decay = 0.7;
        config.navigation.matcher.off_track_threshold_m = 35.0;
        config.turns.window = 4;
        config.logging.level = "debug".to_string();

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ConfigFile::from_ini_str(
            "[viewport]\nzoom = 14\n\n[cache]\ncapacity = auto\npreload = no\n",
        )
        .unwrap();

        let defaults = ConfigFile::default();
        assert_eq!(config.viewport.default_zoom, 14);
        assert_eq!(config.viewport.max_zoom, defaults.viewport.max_zoom);
        assert_eq!(config.cache.capacity, None);
        assert!(!config.cache.preload);
        assert_eq!(config.map, defaults.map);
        assert_eq!(config.turns, defaults.turns);
    }

    #[test]
    fn test_color_forms() {
        let config =
            ConfigFile::from_ini_str("[map]\nbackground = 0xE0\n[viewport]\nroute_color = 3\n")
                .unwrap();
        assert_eq!(config.map.background, Color332::RED);
        assert_eq!(config.viewport.route_color, Color332::BLUE);
    }

    #[test]
    fn test_extension_leading_dot_is_stripped() {
        let config = ConfigFile::from_ini_str("[map]\nextension = .tile\n").unwrap();
        assert_eq!(config.map.extension, "tile");
    }

    fn invalid_key(content: &str) -> (String, String) {
        match ConfigFile::from_ini_str(content) {
            Err(ConfigFileError::InvalidValue { section, key, .. }) => (section, key),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_values_name_section_and_key() {
        assert_eq!(
            invalid_key("[viewport]\nzoom = 20\n"),
            ("viewport".to_string(), "zoom".to_string())
        );
        assert_eq!(
            invalid_key("[viewport]\nmin_zoom = 12\nmax_zoom = 10\n"),
            ("viewport".to_string(), "min_zoom".to_string())
        );
        assert_eq!(
            invalid_key("[viewport]\ninertia_decay = 1.0\n"),
            ("viewport".to_string(), "inertia_decay".to_string())
        );
        assert_eq!(
            invalid_key("[viewport]\nroute_width = 9\n"),
            ("viewport".to_string(), "route_width".to_string())
        );
        assert_eq!(
            invalid_key("[viewport]\nmode = sideways\n"),
            ("viewport".to_string(), "mode".to_string())
        );
        assert_eq!(
            invalid_key("[map]\ncull = maybe\n"),
            ("map".to_string(), "cull".to_string())
        );
        assert_eq!(
            invalid_key("[map]\nbackground = 0x1ff\n"),
            ("map".to_string(), "background".to_string())
        );
        assert_eq!(
            invalid_key("[navigation]\noff_track_m = -5\n"),
            ("navigation".to_string(), "off_track_m".to_string())
        );
        assert_eq!(
            invalid_key("[turns]\nwindow = 0\n"),
            ("turns".to_string(), "window".to_string())
        );
        assert_eq!(
            invalid_key("[turns]\nsharp_threshold = 270\n"),
            ("turns".to_string(), "sharp_threshold".to_string())
        );
    }

    #[test]
    fn test_ensure_exists_at_writes_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        assert!(ConfigFile::ensure_exists_at(&config_path).unwrap());
        std::fs::write(&config_path, "[viewport]\nzoom = 9\n").unwrap();
        assert!(!ConfigFile::ensure_exists_at(&config_path).unwrap());

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.viewport.default_zoom, 9);
    }

    #[test]
    fn test_written_file_is_commented() {
        let text = ConfigFile::default().to_ini_string();
        assert!(text.contains("[navigation]"));
        assert!(text.contains("mode = heading-up"));
        assert!(text.contains("background = 0xfe"));
        assert!(text.lines().any(|l| l.starts_with(';')));
    }

    #[test]
    fn test_config_file_path_name() {
        assert!(config_file_path().ends_with("waymark/config.ini"));
    }
}
