//! Route following.
//!
//! A [`Route`] is built once from a list of track points: the track gets a
//! spatial index and its turns are precomputed with [`detect_turns`]. The
//! matcher then consumes one [`NavFix`] at a time through [`update`], keeping
//! its progress in a caller-owned [`NavState`].
//!
//! # Example
//!
//! ```
//! use waymark::nav::{update, MatcherConfig, NavFix, NavState, Route, TrackPoint,
//!     TurnDetectionConfig, TurnThresholds};
//!
//! let points = (0..10).map(|i| TrackPoint::new(0.0, i as f64 * 0.0001)).collect();
//! let route = Route::from_points(points, &TurnDetectionConfig::default());
//! let mut state = NavState::new();
//!
//! let event = update(
//!     &NavFix::new(0.0, 0.0005),
//!     &route,
//!     &mut state,
//!     &TurnThresholds::default(),
//!     &MatcherConfig::default(),
//! );
//! assert_eq!(state.last_track_index, 5);
//! # let _ = event;
//! ```

pub mod geo;
mod matcher;
mod track;
mod turns;

use std::sync::Arc;

pub use matcher::{
    find_closest_track_point, update, GuidanceStage, MatcherConfig, NavEvent, NavFix, NavState,
    TurnIcon, TurnThresholds, DEFAULT_OFF_TRACK_THRESHOLD_M, SHARP_TURN_ANGLE_DEG,
};
pub use track::{SegmentBox, Track, TrackPoint, TrackSegmentIndex};
pub use turns::{detect_turns, TurnDetectionConfig, TurnPoint};

/// A track with its precomputed turns. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Route {
    track: Arc<Track>,
    turns: Arc<Vec<TurnPoint>>,
}

impl Route {
    pub fn new(track: Arc<Track>, turns: Arc<Vec<TurnPoint>>) -> Self {
        Self { track, turns }
    }

    /// Builds the track index and detects turns.
    pub fn from_points(points: Vec<TrackPoint>, turns: &TurnDetectionConfig) -> Self {
        let track = Track::new(points);
        let detected = detect_turns(&track, turns);
        Self::new(Arc::new(track), Arc::new(detected))
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn turns(&self) -> &[TurnPoint] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }
}
