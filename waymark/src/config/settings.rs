//! Settings structs for every configuration section.
//!
//! Sections that map one-to-one onto a component hold that component's
//! config type directly; the rest get a small settings struct here.

use std::path::PathBuf;

use crate::cache::CacheConfig;
use crate::codec::Color332;
use crate::logging::{default_log_dir, DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL};
use crate::nav::{MatcherConfig, TurnDetectionConfig, TurnThresholds};
use crate::render::RenderConfig;
use crate::storage::DEFAULT_TILE_EXTENSION;
use crate::viewport::ViewportConfig;

/// Complete configuration loaded from `config.ini`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// `[map]`
    pub map: MapSettings,
    /// `[cache]`
    pub cache: CacheConfig,
    /// `[viewport]`
    pub viewport: ViewportConfig,
    /// `[navigation]`
    pub navigation: NavigationSettings,
    /// `[turns]`
    pub turns: TurnDetectionConfig,
    /// `[logging]`
    pub logging: LoggingSettings,
}

/// Map data location and tile rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Directory holding `{zoom}/{x}/{y}.{ext}` tiles and `palette.bin`.
    pub root: PathBuf,
    pub extension: String,
    pub background: Color332,
    pub cull: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            root: default_map_root(),
            extension: DEFAULT_TILE_EXTENSION.to_string(),
            background: Color332::BACKGROUND,
            cull: true,
        }
    }
}

impl MapSettings {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            cull: self.cull,
            background: self.background,
        }
    }
}

/// Matcher settings plus guidance icon thresholds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationSettings {
    pub matcher: MatcherConfig,
    pub thresholds: TurnThresholds,
}

/// Log output.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Default map directory: the platform data directory, else `./maps`.
pub fn default_map_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("waymark").join("maps"))
        .unwrap_or_else(|| PathBuf::from("maps"))
}
