//! Map-matching of GPS fixes against a route.
//!
//! [`update`] is called once per fix. It finds the closest track point,
//! projects the fix onto the neighbouring segments, decides whether the user
//! has left the route and, if not, reports guidance for the next turn. It
//! never fails: degenerate routes produce [`NavEvent::Inactive`].

use tracing::{debug, info};

use super::geo::{haversine, LocalFrame, METERS_PER_DEGREE};
use super::track::Track;
use super::Route;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default points scanned on each side of the last match.
pub const DEFAULT_SEARCH_WINDOW: usize = 20;

/// Default distance under which a local match is accepted without fallback.
pub const DEFAULT_FAST_PATH_M: f64 = 40.0;

/// Default largest backward index move accepted from the search.
pub const DEFAULT_MAX_BACKWARD_JUMP: usize = 20;

/// Default distance from the route that counts as off-track.
pub const DEFAULT_OFF_TRACK_THRESHOLD_M: f64 = 50.0;

/// Default smallest bearing change shown as a curve.
pub const DEFAULT_MIN_CURVE_ANGLE_DEG: f64 = 15.0;

/// Default distance beyond which guidance says "straight".
pub const DEFAULT_WARN_DISTANCE_M: f64 = 200.0;

/// Bearing change at which a curve becomes a sharp turn.
pub const SHARP_TURN_ANGLE_DEG: f64 = 60.0;

/// Default pre-warning distance at walking/cycling speed.
pub const DEFAULT_PRE_WARN_DISTANCE_M: f64 = 80.0;

/// Default pre-warning distance above [`DEFAULT_FAST_SPEED_KMH`].
pub const DEFAULT_PRE_WARN_DISTANCE_FAST_M: f64 = 150.0;

/// Default speed that switches to the long pre-warning distance.
pub const DEFAULT_FAST_SPEED_KMH: f64 = 11.0;

/// Default distance at which the turn itself is announced.
pub const DEFAULT_TURN_WARN_DISTANCE_M: f64 = 50.0;

// ─────────────────────────────────────────────────────────────────────────────
// Inputs and state
// ─────────────────────────────────────────────────────────────────────────────

/// A validated GPS fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavFix {
    pub lat: f64,
    pub lon: f64,
    /// Course over ground in degrees.
    pub heading: f64,
    pub speed_kmh: f64,
}

impl NavFix {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            heading: 0.0,
            speed_kmh: 0.0,
        }
    }
}

/// Per-route matcher state, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavState {
    pub last_track_index: usize,
    pub next_turn_index: usize,
    /// Turn index frozen while off-track.
    pub last_valid_turn_index: usize,
    pub is_off_track: bool,
    /// Fix projected onto the route.
    pub projected_lat: f64,
    pub projected_lon: f64,
}

impl NavState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Icon selection thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnThresholds {
    pub min_curve_angle: f64,
    pub warn_distance: f64,
}

impl Default for TurnThresholds {
    fn default() -> Self {
        Self {
            min_curve_angle: DEFAULT_MIN_CURVE_ANGLE_DEG,
            warn_distance: DEFAULT_WARN_DISTANCE_M,
        }
    }
}

/// Matcher settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub search_window: usize,
    pub fast_path_m: f64,
    pub max_backward_jump: usize,
    pub off_track_threshold_m: f64,
    pub pre_warn_distance_m: f64,
    pub pre_warn_distance_fast_m: f64,
    pub fast_speed_kmh: f64,
    pub turn_warn_distance_m: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            search_window: DEFAULT_SEARCH_WINDOW,
            fast_path_m: DEFAULT_FAST_PATH_M,
            max_backward_jump: DEFAULT_MAX_BACKWARD_JUMP,
            off_track_threshold_m: DEFAULT_OFF_TRACK_THRESHOLD_M,
            pre_warn_distance_m: DEFAULT_PRE_WARN_DISTANCE_M,
            pre_warn_distance_fast_m: DEFAULT_PRE_WARN_DISTANCE_FAST_M,
            fast_speed_kmh: DEFAULT_FAST_SPEED_KMH,
            turn_warn_distance_m: DEFAULT_TURN_WARN_DISTANCE_M,
        }
    }
}

impl MatcherConfig {
    /// Pre-warning distance for the given speed.
    pub fn pre_warn_distance(&self, speed_kmh: f64) -> f64 {
        if speed_kmh > self.fast_speed_kmh {
            self.pre_warn_distance_fast_m
        } else {
            self.pre_warn_distance_m
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Guidance icon for the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnIcon {
    Straight,
    SoftLeft,
    SoftRight,
    SharpLeft,
    SharpRight,
}

impl TurnIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnIcon::Straight => "straight",
            TurnIcon::SoftLeft => "soft left",
            TurnIcon::SoftRight => "soft right",
            TurnIcon::SharpLeft => "sharp left",
            TurnIcon::SharpRight => "sharp right",
        }
    }
}

impl std::fmt::Display for TurnIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How close the next turn is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidanceStage {
    /// Beyond the pre-warning distance.
    Approaching,
    /// Inside the pre-warning distance.
    PreTurn,
    /// Inside the turn warning distance.
    Turn,
}

impl GuidanceStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceStage::Approaching => "approaching",
            GuidanceStage::PreTurn => "pre-turn",
            GuidanceStage::Turn => "turn",
        }
    }
}

impl std::fmt::Display for GuidanceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one matcher update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEvent {
    /// No usable route.
    Inactive,
    /// Further than the threshold from the route.
    OffTrack { distance_m: f64 },
    /// Past the last turn.
    Finish { remaining_m: f64 },
    /// Heading for `turn_index`.
    Guidance {
        icon: TurnIcon,
        distance_m: f64,
        turn_index: usize,
        angle: f64,
        stage: GuidanceStage,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Matching
// ─────────────────────────────────────────────────────────────────────────────

/// Index of the track point closest to (`lat`, `lon`).
///
/// Searches a window around `last_index` first and falls back to the
/// spatial index, or a full scan, when the local match is further than the
/// fast-path distance. A result more than `max_backward_jump` points behind
/// `last_index` is treated as GPS noise and `last_index` is kept.
///
/// Returns `None` for an empty track.
pub fn find_closest_track_point(
    track: &Track,
    lat: f64,
    lon: f64,
    last_index: usize,
    config: &MatcherConfig,
) -> Option<usize> {
    let points = track.points();
    if points.is_empty() {
        return None;
    }
    let frame = LocalFrame::new(lat);
    let last = last_index.min(points.len() - 1);

    let scan = |range: std::ops::RangeInclusive<usize>, best: &mut (usize, f64)| {
        for i in range {
            let p = points[i];
            let d = frame.distance_sq(lat, lon, p.lat, p.lon);
            if d < best.1 {
                *best = (i, d);
            }
        }
    };

    let lo = last.saturating_sub(config.search_window);
    let hi = (last + config.search_window).min(points.len() - 1);
    let mut best = (last, f64::MAX);
    scan(lo..=hi, &mut best);

    if best.1 > LocalFrame::meters_to_sq(config.fast_path_m) {
        let mut matched = false;
        if let Some(index) = track.index() {
            for seg in index.candidates(lat, lon) {
                scan(seg.start..=seg.end, &mut best);
                matched = true;
            }
        }
        if !matched {
            scan(0..=points.len() - 1, &mut best);
        }
    }

    let closest = best.0;
    if closest + config.max_backward_jump < last {
        debug!(last, closest, "rejected backward jump");
        return Some(last);
    }
    Some(closest)
}

/// Projection of a fix onto the route near `closest`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projection {
    lat: f64,
    lon: f64,
    distance_m: f64,
}

fn project_onto_route(track: &Track, closest: usize, lat: f64, lon: f64) -> Projection {
    let points = track.points();
    let frame = LocalFrame::new(lat);
    let anchor = points[closest];
    let mut best = Projection {
        lat: anchor.lat,
        lon: anchor.lon,
        distance_m: frame.distance_m(lat, lon, anchor.lat, anchor.lon),
    };

    let mut segments = Vec::with_capacity(2);
    if closest > 0 {
        segments.push((closest - 1, closest));
    }
    if closest + 1 < points.len() {
        segments.push((closest, closest + 1));
    }

    for (i, j) in segments {
        let (a, b) = (points[i], points[j]);
        // Plane anchored at `a`.
        let (bx, by) = frame.offset(a.lat, a.lon, b.lat, b.lon);
        let (px, py) = frame.offset(a.lat, a.lon, lat, lon);
        let len_sq = bx * bx + by * by;
        let t = if len_sq > 0.0 {
            ((px * bx + py * by) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let proj_lat = a.lat + (b.lat - a.lat) * t;
        let proj_lon = a.lon + (b.lon - a.lon) * t;
        let (dx, dy) = (px - bx * t, py - by * t);
        let distance_m = (dx * dx + dy * dy).sqrt() * METERS_PER_DEGREE;
        if distance_m < best.distance_m {
            best = Projection {
                lat: proj_lat,
                lon: proj_lon,
                distance_m,
            };
        }
    }
    best
}

fn pick_icon(angle: f64, distance_m: f64, thresholds: &TurnThresholds) -> TurnIcon {
    let magnitude = angle.abs();
    let left = angle < 0.0;
    if distance_m > thresholds.warn_distance || magnitude < thresholds.min_curve_angle {
        TurnIcon::Straight
    } else if magnitude < SHARP_TURN_ANGLE_DEG {
        if left {
            TurnIcon::SoftLeft
        } else {
            TurnIcon::SoftRight
        }
    } else if left {
        TurnIcon::SharpLeft
    } else {
        TurnIcon::SharpRight
    }
}

/// Matches one fix against the route and advances `state`.
pub fn update(
    fix: &NavFix,
    route: &Route,
    state: &mut NavState,
    thresholds: &TurnThresholds,
    config: &MatcherConfig,
) -> NavEvent {
    let track = route.track();
    if track.len() < 2 {
        return NavEvent::Inactive;
    }
    let Some(closest) =
        find_closest_track_point(track, fix.lat, fix.lon, state.last_track_index, config)
    else {
        return NavEvent::Inactive;
    };

    let projection = project_onto_route(track, closest, fix.lat, fix.lon);
    state.projected_lat = projection.lat;
    state.projected_lon = projection.lon;

    if projection.distance_m > config.off_track_threshold_m {
        if !state.is_off_track {
            state.is_off_track = true;
            state.last_valid_turn_index = state.next_turn_index;
            info!(
                distance_m = projection.distance_m,
                track_index = state.last_track_index,
                "left the route"
            );
        }
        return NavEvent::OffTrack {
            distance_m: projection.distance_m,
        };
    }

    if state.is_off_track {
        state.is_off_track = false;
        state.next_turn_index = state.last_valid_turn_index;
        info!(track_index = closest, "back on the route");
    }
    state.last_track_index = closest;

    let turns = route.turns();
    while state.next_turn_index < turns.len() && turns[state.next_turn_index].track_index < closest
    {
        state.next_turn_index += 1;
    }

    let Some(turn) = turns.get(state.next_turn_index) else {
        return NavEvent::Finish {
            remaining_m: track.remaining_from(closest),
        };
    };

    let apex = track.point(turn.track_index).unwrap_or(track.points()[closest]);
    let distance_m = haversine(fix.lat, fix.lon, apex.lat, apex.lon);
    let stage = if distance_m <= config.turn_warn_distance_m {
        GuidanceStage::Turn
    } else if distance_m <= config.pre_warn_distance(fix.speed_kmh) {
        GuidanceStage::PreTurn
    } else {
        GuidanceStage::Approaching
    };

    NavEvent::Guidance {
        icon: pick_icon(turn.angle, distance_m, thresholds),
        distance_m,
        turn_index: state.next_turn_index,
        angle: turn.angle,
        stage,
    }
}
