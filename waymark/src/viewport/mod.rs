//! Viewport composition and display.
//!
//! The viewport keeps a 3×3 tile canvas around a reference tile. Panning
//! shifts the canvas and fills only the exposed strip; a zoom change throws
//! everything away. [`ViewportController::display`] rotates the finished
//! canvas onto a [`DisplaySurface`].

mod controller;
mod rotate;
mod surface;

pub use controller::{ViewportController, CANVAS_SIZE, CANVAS_TILES};
pub use rotate::rotate_into;
pub use surface::{DisplaySurface, FrameBuffer};

use crate::codec::Color332;
use crate::coord::MAX_ZOOM;

/// Lowest zoom the device offers by default.
pub const DEFAULT_MIN_ZOOM: u8 = 6;

/// Highest zoom the device offers by default.
pub const DEFAULT_MAX_ZOOM: u8 = 18;

/// Zoom used until the user picks one.
pub const DEFAULT_ZOOM: u8 = 16;

/// Per-tick velocity multiplier for scroll inertia.
pub const DEFAULT_INERTIA_DECAY: f64 = 0.85;

/// Transparent key for rotated blits.
pub const TRANSPARENT: Color332 = Color332::MAGENTA;

/// Map orientation on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Direction of travel points up.
    #[default]
    HeadingUp,
    /// North points up.
    NorthUp,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::HeadingUp => "heading-up",
            DisplayMode::NorthUp => "north-up",
        }
    }

    /// Parses the names used in configuration files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heading-up" | "heading_up" | "heading" => Some(DisplayMode::HeadingUp),
            "north-up" | "north_up" | "north" => Some(DisplayMode::NorthUp),
            _ => None,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the viewport did last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Idle,
    Scrolling,
    ZoomChanged,
    Rotating,
}

impl ViewportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewportState::Idle => "Idle",
            ViewportState::Scrolling => "Scrolling",
            ViewportState::ZoomChanged => "ZoomChanged",
            ViewportState::Rotating => "Rotating",
        }
    }
}

impl std::fmt::Display for ViewportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Viewport settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub mode: DisplayMode,
    /// Decode cache misses inline. Off by default: a missing tile shows a
    /// placeholder until the preloader has cached it. Misses are still
    /// decoded inline when no preloader is attached or the cache is disabled.
    pub foreground_decode: bool,
    pub inertia_decay: f64,
    /// Scroll speed in px/tick below which inertia stops.
    pub min_velocity: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub default_zoom: u8,
    pub background: Color332,
    pub transparent: Color332,
    pub route_color: Color332,
    pub route_width: u8,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            foreground_decode: false,
            inertia_decay: DEFAULT_INERTIA_DECAY,
            min_velocity: 0.5,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            default_zoom: DEFAULT_ZOOM,
            background: Color332::BACKGROUND,
            transparent: TRANSPARENT,
            route_color: Color332::BLUE,
            route_width: 3,
        }
    }
}

impl ViewportConfig {
    /// Clamps `zoom` to the configured range (and the supported maximum).
    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        let max = self.max_zoom.min(MAX_ZOOM);
        zoom.clamp(self.min_zoom.min(max), max)
    }
}
