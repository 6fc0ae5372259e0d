//! Turn precomputation for a loaded route.
//!
//! Each candidate point is judged by the bearing change between its incoming
//! leg (N points back) and its outgoing leg (N points ahead). A sharp change
//! counts outright; a softer change counts only when the window covers
//! enough ground to not be GPS jitter. Windows where either leg is shorter
//! than a minimum length (a receiver standing still repeats its fix) have no
//! meaningful bearing and are skipped. Neighbouring candidates describing the
//! same bend are folded into a single [`TurnPoint`].
//!
//! ```text
//!   i-N ────────► i ────────► i+N
//!         in           out
//!   angle = bearing_delta(in, out)   (+ right, - left)
//! ```

use tracing::debug;

use super::geo::{bearing, bearing_delta, haversine};
use super::track::Track;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of points on each side of a candidate.
pub const DEFAULT_WINDOW: usize = 3;

/// Default bearing change that is a turn regardless of window length.
pub const DEFAULT_SHARP_THRESHOLD_DEG: f64 = 45.0;

/// Default bearing change that is a turn on a long enough window.
pub const DEFAULT_SOFT_THRESHOLD_DEG: f64 = 20.0;

/// Default minimum window length for soft turns.
pub const DEFAULT_MIN_WINDOW_DISTANCE_M: f64 = 20.0;

/// Default single-segment length above which a window is considered corrupt.
pub const DEFAULT_MAX_SEGMENT_JUMP_M: f64 = 200.0;

/// Default shortest incoming or outgoing leg with a usable bearing.
pub const DEFAULT_MIN_LEG_DISTANCE_M: f64 = 2.0;

/// Turn detection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDetectionConfig {
    /// Points on each side of a candidate.
    pub window: usize,
    pub sharp_threshold_deg: f64,
    pub soft_threshold_deg: f64,
    pub min_window_distance_m: f64,
    pub max_segment_jump_m: f64,
    pub min_leg_distance_m: f64,
}

impl Default for TurnDetectionConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            sharp_threshold_deg: DEFAULT_SHARP_THRESHOLD_DEG,
            soft_threshold_deg: DEFAULT_SOFT_THRESHOLD_DEG,
            min_window_distance_m: DEFAULT_MIN_WINDOW_DISTANCE_M,
            max_segment_jump_m: DEFAULT_MAX_SEGMENT_JUMP_M,
            min_leg_distance_m: DEFAULT_MIN_LEG_DISTANCE_M,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn points
// ─────────────────────────────────────────────────────────────────────────────

/// A precomputed turn along the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnPoint {
    /// Index of the track point at the apex of the bend.
    pub track_index: usize,
    /// Signed bearing change in degrees; positive turns right.
    pub angle: f64,
    /// Distance along the route to the apex.
    pub cumulative_distance: f64,
}

impl TurnPoint {
    pub fn is_left(&self) -> bool {
        self.angle < 0.0
    }
}

/// Finds the turns of a route, in track order.
pub fn detect_turns(track: &Track, config: &TurnDetectionConfig) -> Vec<TurnPoint> {
    let points = track.points();
    let n = config.window.max(1);
    if points.len() < 2 * n + 1 {
        return Vec::new();
    }

    let mut turns: Vec<TurnPoint> = Vec::new();
    let mut last_candidate: Option<usize> = None;

    for i in n..points.len() - n {
        let (lo, hi) = (i - n, i + n);
        let window = &points[lo..=hi];
        let jump = window
            .windows(2)
            .any(|w| haversine(w[0].lat, w[0].lon, w[1].lat, w[1].lon) > config.max_segment_jump_m);
        if jump {
            continue;
        }

        let (a, b, c) = (points[lo], points[i], points[hi]);
        let short_leg = haversine(a.lat, a.lon, b.lat, b.lon) < config.min_leg_distance_m
            || haversine(b.lat, b.lon, c.lat, c.lon) < config.min_leg_distance_m;
        if short_leg {
            continue;
        }

        let incoming = bearing(a.lat, a.lon, b.lat, b.lon);
        let outgoing = bearing(b.lat, b.lon, c.lat, c.lon);
        let angle = bearing_delta(incoming, outgoing);
        let magnitude = angle.abs();

        let span = track.distance_to(hi) - track.distance_to(lo);
        let is_turn = magnitude >= config.sharp_threshold_deg
            || (magnitude >= config.soft_threshold_deg && span >= config.min_window_distance_m);
        if !is_turn {
            continue;
        }

        let candidate = TurnPoint {
            track_index: i,
            angle,
            cumulative_distance: track.distance_to(i),
        };

        // Same bend: adjacent within one window and turning the same way.
        let same_bend = match (last_candidate, turns.last()) {
            (Some(prev), Some(last)) => i - prev <= n && last.is_left() == candidate.is_left(),
            _ => false,
        };
        if same_bend {
            if let Some(last) = turns.last_mut() {
                if magnitude > last.angle.abs() {
                    *last = candidate;
                }
            }
        } else {
            turns.push(candidate);
        }
        last_candidate = Some(i);
    }

    debug!(points = points.len(), turns = turns.len(), "detected route turns");
    turns
}
