//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Converts a `ConfigFile` to the commented INI text written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let capacity = config
        .cache
        .capacity
        .map(|c| c.to_string())
        .unwrap_or_else(|| "auto".to_string());
    let matcher = &config.navigation.matcher;
    let thresholds = &config.navigation.thresholds;

    format!(
        r#"[map]
; Directory holding {{zoom}}/{{x}}/{{y}}.<extension> tiles and an optional palette.bin
root = {}
; Tile file extension
extension = {}
; Background color as a 3-3-2 byte (e.g. 0xfe)
background = {:#04x}
; Skip shapes entirely outside the tile
cull = {}

[cache]
; Keep recently rendered tiles in memory
enabled = {}
; Upper bound on cached tiles
max_tiles = {}
; Fixed capacity, or 'auto' to size from free memory
capacity = {}
; Render neighbouring tiles in the background
preload = {}
; Pending preload requests before new ones are dropped
queue_depth = {}

[viewport]
; heading-up or north-up
mode = {}
; Render missing tiles immediately instead of waiting for the preloader
foreground_decode = {}
; Initial zoom level and allowed range (0-19)
zoom = {}
min_zoom = {}
max_zoom = {}
; Scroll inertia: velocity multiplier per tick, in [0, 1)
inertia_decay = {}
; Route line color (3-3-2 byte) and width in pixels (1-8)
route_color = {:#04x}
route_width = {}

[navigation]
; Track points searched on each side of the last match
search_window = {}
; Accept a local match within this many meters without a wider search
fast_path_m = {}
; Backward index moves larger than this are treated as GPS noise
max_backward_jump = {}
; Distance from the route that counts as off-track
off_track_m = {}
; Smallest bearing change shown as a curve (degrees)
min_curve_angle = {}
; Beyond this distance the next turn is shown as "straight"
warn_distance_m = {}
; Pre-warning distance, and the one used above fast_speed_kmh
pre_warn_m = {}
pre_warn_fast_m = {}
fast_speed_kmh = {}
; Distance at which the turn itself is announced
turn_warn_m = {}

[turns]
; Points on each side of a candidate turn
window = {}
; Bearing change (degrees) that is always a turn
sharp_threshold = {}
; Bearing change that is a turn when the window is long enough
soft_threshold = {}
min_window_distance_m = {}
; Windows containing a longer single step are ignored
max_segment_jump_m = {}
; Legs shorter than this (a stationary receiver) are ignored
min_leg_distance_m = {}

[logging]
directory = {}
file = {}
; error, warn, info, debug or trace (RUST_LOG overrides)
level = {}
"#,
        path_to_string(&config.map.root),
        config.map.extension,
        config.map.background.0,
        config.map.cull,
        config.cache.enabled,
        config.cache.max_tiles,
        capacity,
        config.cache.preload,
        config.cache.queue_depth,
        config.viewport.mode,
        config.viewport.foreground_decode,
        config.viewport.default_zoom,
        config.viewport.min_zoom,
        config.viewport.max_zoom,
        config.viewport.inertia_decay,
        config.viewport.route_color.0,
        config.viewport.route_width,
        matcher.search_window,
        matcher.fast_path_m,
        matcher.max_backward_jump,
        matcher.off_track_threshold_m,
        thresholds.min_curve_angle,
        thresholds.warn_distance,
        matcher.pre_warn_distance_m,
        matcher.pre_warn_distance_fast_m,
        matcher.fast_speed_kmh,
        matcher.turn_warn_distance_m,
        config.turns.window,
        config.turns.sharp_threshold_deg,
        config.turns.soft_threshold_deg,
        config.turns.min_window_distance_m,
        config.turns.max_segment_jump_m,
        config.turns.min_leg_distance_m,
        path_to_string(&config.logging.directory),
        config.logging.file,
        config.logging.level,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
