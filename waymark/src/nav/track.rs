//! Route geometry and its spatial index.

use super::geo::{haversine, METERS_PER_DEGREE};

/// Points per indexed segment. Consecutive segments share an endpoint.
pub const DEFAULT_SEGMENT_POINTS: usize = 16;

/// Default padding around each segment's bounding box.
pub const DEFAULT_INDEX_MARGIN_M: f64 = 100.0;

/// One point of a loaded route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
}

impl TrackPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Bounding box of a run of track points, padded by the index margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBox {
    /// First point index.
    pub start: usize,
    /// Last point index (inclusive).
    pub end: usize,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl SegmentBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

/// Coarse spatial partition of a track for nearest-point pruning.
///
/// The track is cut into fixed-length segments, each with a padded bounding
/// box, and the boxes are bucketed into a uniform lat/lon grid. A query
/// looks at a single grid cell and keeps the segments whose box holds the
/// point.
#[derive(Debug, Clone)]
pub struct TrackSegmentIndex {
    segments: Vec<SegmentBox>,
    lat_min: f64,
    lon_min: f64,
    cell_lat: f64,
    cell_lon: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
}

impl TrackSegmentIndex {
    /// Builds the index. Returns `None` for tracks with fewer than two points.
    pub fn build(points: &[TrackPoint], segment_points: usize, margin_m: f64) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let step = segment_points.max(2) - 1;
        let margin_lat = margin_m / METERS_PER_DEGREE;

        let mut segments = Vec::with_capacity(points.len() / step + 1);
        let mut start = 0;
        while start < points.len() - 1 {
            let end = (start + step).min(points.len() - 1);
            let run = &points[start..=end];
            let (mut lat_min, mut lat_max) = (f64::MAX, f64::MIN);
            let (mut lon_min, mut lon_max) = (f64::MAX, f64::MIN);
            for p in run {
                lat_min = lat_min.min(p.lat);
                lat_max = lat_max.max(p.lat);
                lon_min = lon_min.min(p.lon);
                lon_max = lon_max.max(p.lon);
            }
            let cos_lat = ((lat_min + lat_max) / 2.0).to_radians().cos().max(0.01);
            let margin_lon = margin_lat / cos_lat;
            segments.push(SegmentBox {
                start,
                end,
                lat_min: lat_min - margin_lat,
                lat_max: lat_max + margin_lat,
                lon_min: lon_min - margin_lon,
                lon_max: lon_max + margin_lon,
            });
            start = end;
        }

        let lat_min = segments.iter().map(|s| s.lat_min).fold(f64::MAX, f64::min);
        let lat_max = segments.iter().map(|s| s.lat_max).fold(f64::MIN, f64::max);
        let lon_min = segments.iter().map(|s| s.lon_min).fold(f64::MAX, f64::min);
        let lon_max = segments.iter().map(|s| s.lon_max).fold(f64::MIN, f64::max);

        // Roughly one segment per cell along each axis.
        let side = ((segments.len() as f64).sqrt().ceil() as usize).max(1);
        let (cols, rows) = (side, side);
        let cell_lat = ((lat_max - lat_min) / rows as f64).max(f64::EPSILON);
        let cell_lon = ((lon_max - lon_min) / cols as f64).max(f64::EPSILON);

        let mut index = Self {
            segments,
            lat_min,
            lon_min,
            cell_lat,
            cell_lon,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };
        for (id, seg) in index.segments.iter().enumerate() {
            let (c0, r0) = index.cell_of(seg.lat_min, seg.lon_min);
            let (c1, r1) = index.cell_of(seg.lat_max, seg.lon_max);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    index.cells[r * cols + c].push(id as u32);
                }
            }
        }
        Some(index)
    }

    fn cell_of(&self, lat: f64, lon: f64) -> (usize, usize) {
        let c = ((lon - self.lon_min) / self.cell_lon).floor();
        let r = ((lat - self.lat_min) / self.cell_lat).floor();
        (
            (c.max(0.0) as usize).min(self.cols - 1),
            (r.max(0.0) as usize).min(self.rows - 1),
        )
    }

    pub fn segments(&self) -> &[SegmentBox] {
        &self.segments
    }

    /// Segments whose padded box contains the point.
    pub fn candidates(&self, lat: f64, lon: f64) -> impl Iterator<Item = &SegmentBox> + '_ {
        let (c, r) = self.cell_of(lat, lon);
        self.cells[r * self.cols + c]
            .iter()
            .map(|&id| &self.segments[id as usize])
            .filter(move |seg| seg.contains(lat, lon))
    }

    /// Grid dimensions as (columns, rows).
    pub fn grid_size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }
}

/// An immutable route: points, cumulative distances and spatial index.
#[derive(Debug, Clone)]
pub struct Track {
    points: Vec<TrackPoint>,
    cumulative: Vec<f64>,
    index: Option<TrackSegmentIndex>,
}

impl Track {
    /// Builds a track with the default spatial index.
    pub fn new(points: Vec<TrackPoint>) -> Self {
        let index =
            TrackSegmentIndex::build(&points, DEFAULT_SEGMENT_POINTS, DEFAULT_INDEX_MARGIN_M);
        Self::assemble(points, index)
    }

    /// Builds a track with custom index parameters.
    pub fn with_index(points: Vec<TrackPoint>, segment_points: usize, margin_m: f64) -> Self {
        let index = TrackSegmentIndex::build(&points, segment_points, margin_m);
        Self::assemble(points, index)
    }

    /// Builds a track without a spatial index; fallback searches scan it fully.
    pub fn without_index(points: Vec<TrackPoint>) -> Self {
        Self::assemble(points, None)
    }

    fn assemble(points: Vec<TrackPoint>, index: Option<TrackSegmentIndex>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                let prev = points[i - 1];
                total += haversine(prev.lat, prev.lon, p.lat, p.lon);
            }
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<TrackPoint> {
        self.points.get(index).copied()
    }

    pub fn index(&self) -> Option<&TrackSegmentIndex> {
        self.index.as_ref()
    }

    /// Route length in meters.
    pub fn total_distance(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Distance along the route from the start to point `index`.
    pub fn distance_to(&self, index: usize) -> f64 {
        self.cumulative
            .get(index.min(self.cumulative.len().saturating_sub(1)))
            .copied()
            .unwrap_or(0.0)
    }

    /// Distance along the route from point `index` to the end.
    pub fn remaining_from(&self, index: usize) -> f64 {
        self.total_distance() - self.distance_to(index)
    }
}
