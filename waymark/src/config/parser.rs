//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.
//! Unknown sections and keys are ignored.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::codec::Color332;
use crate::coord::MAX_ZOOM;
use crate::viewport::DisplayMode;

/// Parses an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        let s = Section::new("map", section);
        if let Some(v) = s.string("root") {
            config.map.root = expand_tilde(&v);
        }
        if let Some(v) = s.string("extension") {
            config.map.extension = v.trim_start_matches('.').to_string();
        }
        if let Some(v) = s.color("background")? {
            config.map.background = v;
        }
        if let Some(v) = s.boolean("cull")? {
            config.map.cull = v;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        let s = Section::new("cache", section);
        if let Some(v) = s.boolean("enabled")? {
            config.cache.enabled = v;
        }
        if let Some(v) = s.parse("max_tiles", "must be a non-negative integer")? {
            config.cache.max_tiles = v;
        }
        if let Some(v) = s.get("capacity") {
            config.cache.capacity = if v.eq_ignore_ascii_case("auto") {
                None
            } else {
                Some(s.parse_value("capacity", v, "must be 'auto' or a non-negative integer")?)
            };
        }
        if let Some(v) = s.boolean("preload")? {
            config.cache.preload = v;
        }
        if let Some(v) = s.parse::<usize>("queue_depth", "must be a positive integer")? {
            if v == 0 {
                return Err(s.invalid("queue_depth", "0", "must be a positive integer"));
            }
            config.cache.queue_depth = v;
        }
    }

    // [viewport] section
    if let Some(section) = ini.section(Some("viewport")) {
        let s = Section::new("viewport", section);
        if let Some(v) = s.get("mode") {
            config.viewport.mode = DisplayMode::parse(v)
                .ok_or_else(|| s.invalid("mode", v, "must be 'heading-up' or 'north-up'"))?;
        }
        if let Some(v) = s.boolean("foreground_decode")? {
            config.viewport.foreground_decode = v;
        }
        if let Some(v) = s.zoom("zoom")? {
            config.viewport.default_zoom = v;
        }
        if let Some(v) = s.zoom("min_zoom")? {
            config.viewport.min_zoom = v;
        }
        if let Some(v) = s.zoom("max_zoom")? {
            config.viewport.max_zoom = v;
        }
        if config.viewport.min_zoom > config.viewport.max_zoom {
            return Err(s.invalid(
                "min_zoom",
                &config.viewport.min_zoom.to_string(),
                "must not exceed max_zoom",
            ));
        }
        if let Some(v) = s.parse::<f64>("inertia_decay", "must be a number in [0, 1)")? {
            if !(0.0..1.0).contains(&v) {
                return Err(s.invalid("inertia_decay", &v.to_string(), "must be in [0, 1)"));
            }
            config.viewport.inertia_decay = v;
        }
        if let Some(v) = s.color("route_color")? {
            config.viewport.route_color = v;
        }
        if let Some(v) = s.parse::<u8>("route_width", "must be an integer from 1 to 8")? {
            if !(1..=8).contains(&v) {
                return Err(s.invalid("route_width", &v.to_string(), "must be from 1 to 8"));
            }
            config.viewport.route_width = v;
        }
    }

    // [navigation] section
    if let Some(section) = ini.section(Some("navigation")) {
        let s = Section::new("navigation", section);
        let matcher = &mut config.navigation.matcher;
        if let Some(v) = s.parse("search_window", "must be a non-negative integer")? {
            matcher.search_window = v;
        }
        if let Some(v) = s.parse("max_backward_jump", "must be a non-negative integer")? {
            matcher.max_backward_jump = v;
        }
        if let Some(v) = s.distance("fast_path_m")? {
            matcher.fast_path_m = v;
        }
        if let Some(v) = s.distance("off_track_m")? {
            matcher.off_track_threshold_m = v;
        }
        if let Some(v) = s.distance("pre_warn_m")? {
            matcher.pre_warn_distance_m = v;
        }
        if let Some(v) = s.distance("pre_warn_fast_m")? {
            matcher.pre_warn_distance_fast_m = v;
        }
        if let Some(v) = s.distance("fast_speed_kmh")? {
            matcher.fast_speed_kmh = v;
        }
        if let Some(v) = s.distance("turn_warn_m")? {
            matcher.turn_warn_distance_m = v;
        }
        if let Some(v) = s.angle("min_curve_angle")? {
            config.navigation.thresholds.min_curve_angle = v;
        }
        if let Some(v) = s.distance("warn_distance_m")? {
            config.navigation.thresholds.warn_distance = v;
        }
    }

    // [turns] section
    if let Some(section) = ini.section(Some("turns")) {
        let s = Section::new("turns", section);
        if let Some(v) = s.parse::<usize>("window", "must be a positive integer")? {
            if v == 0 {
                return Err(s.invalid("window", "0", "must be a positive integer"));
            }
            config.turns.window = v;
        }
        if let Some(v) = s.angle("sharp_threshold")? {
            config.turns.sharp_threshold_deg = v;
        }
        if let Some(v) = s.angle("soft_threshold")? {
            config.turns.soft_threshold_deg = v;
        }
        if let Some(v) = s.distance("min_window_distance_m")? {
            config.turns.min_window_distance_m = v;
        }
        if let Some(v) = s.distance("max_segment_jump_m")? {
            config.turns.max_segment_jump_m = v;
        }
        if let Some(v) = s.distance("min_leg_distance_m")? {
            config.turns.min_leg_distance_m = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        let s = Section::new("logging", section);
        if let Some(v) = s.string("directory") {
            config.logging.directory = expand_tilde(&v);
        }
        if let Some(v) = s.string("file") {
            config.logging.file = v;
        }
        if let Some(v) = s.string("level") {
            config.logging.level = v;
        }
    }

    Ok(config)
}

/// One INI section with typed getters that name the section and key in errors.
struct Section<'a> {
    name: &'static str,
    props: &'a Properties,
}

impl<'a> Section<'a> {
    fn new(name: &'static str, props: &'a Properties) -> Self {
        Self { name, props }
    }

    fn invalid(&self, key: &str, value: &str, reason: &str) -> ConfigFileError {
        ConfigFileError::InvalidValue {
            section: self.name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Raw trimmed value; empty values count as unset.
    fn get(&self, key: &str) -> Option<&'a str> {
        self.props
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn parse_value<T: FromStr>(&self, key: &str, v: &str, reason: &str) -> Result<T, ConfigFileError> {
        v.parse().map_err(|_| self.invalid(key, v, reason))
    }

    fn parse<T: FromStr>(&self, key: &str, reason: &str) -> Result<Option<T>, ConfigFileError> {
        self.get(key)
            .map(|v| self.parse_value(key, v, reason))
            .transpose()
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>, ConfigFileError> {
        let Some(v) = self.get(key) else {
            return Ok(None);
        };
        match v.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(self.invalid(key, v, "must be true or false")),
        }
    }

    fn zoom(&self, key: &str) -> Result<Option<u8>, ConfigFileError> {
        let reason = "must be a zoom level from 0 to 19";
        match self.parse::<u8>(key, reason)? {
            Some(z) if z > MAX_ZOOM => Err(self.invalid(key, &z.to_string(), reason)),
            other => Ok(other),
        }
    }

    /// A finite, non-negative number.
    fn distance(&self, key: &str) -> Result<Option<f64>, ConfigFileError> {
        let reason = "must be a non-negative number";
        match self.parse::<f64>(key, reason)? {
            Some(d) if !d.is_finite() || d < 0.0 => Err(self.invalid(key, &d.to_string(), reason)),
            other => Ok(other),
        }
    }

    fn angle(&self, key: &str) -> Result<Option<f64>, ConfigFileError> {
        let reason = "must be an angle from 0 to 180 degrees";
        match self.parse::<f64>(key, reason)? {
            Some(a) if !(0.0..=180.0).contains(&a) => {
                Err(self.invalid(key, &a.to_string(), reason))
            }
            other => Ok(other),
        }
    }

    /// A 3-3-2 color as `0xRR` hex or decimal.
    fn color(&self, key: &str) -> Result<Option<Color332>, ConfigFileError> {
        let Some(v) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16).ok(),
            None => v.parse::<u8>().ok(),
        };
        parsed
            .map(|c| Some(Color332(c)))
            .ok_or_else(|| self.invalid(key, v, "must be a byte, e.g. 0xfe or 254"))
    }
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
