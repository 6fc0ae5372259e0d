//! Coordinate types: tile addresses, pixel positions and geographic bounds.

use std::fmt;

use thiserror::Error;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;
/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;
/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;
/// Minimum supported zoom level.
pub const MIN_ZOOM: u8 = 0;
/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 19;
/// Edge length of one tile raster in pixels.
pub const TILE_SIZE: u32 = 256;

/// Errors produced when building tile addresses.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Zoom level outside `MIN_ZOOM..=MAX_ZOOM`.
    #[error("zoom level {0} out of range (max {MAX_ZOOM})")]
    ZoomOutOfRange(u8),

    /// Tile index outside `0..2^zoom`.
    #[error("tile {x}/{y} out of range at zoom {zoom}")]
    TileOutOfRange { x: i64, y: i64, zoom: u8 },

    /// NaN or infinite coordinate.
    #[error("coordinate is not finite: {0}")]
    NotFinite(f64),
}

/// Address of one map tile, derived from a geographic point and zoom.
///
/// `lat`/`lon` keep the point the address was derived from so the viewport
/// can tell when that point leaves the tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileAddress {
    pub zoom: u8,
    pub tile_x: u32,
    pub tile_y: u32,
    pub lat: f64,
    pub lon: f64,
    pub path: String,
}

impl TileAddress {
    /// Address of the tile containing (`lat`, `lon`) at `zoom`.
    ///
    /// Latitude is clamped to the Web Mercator range and longitude wrapped to
    /// `-180..180`.
    pub fn new(lat: f64, lon: f64, zoom: u8) -> Result<Self, CoordError> {
        if !lat.is_finite() {
            return Err(CoordError::NotFinite(lat));
        }
        if !lon.is_finite() {
            return Err(CoordError::NotFinite(lon));
        }
        if zoom > MAX_ZOOM {
            return Err(CoordError::ZoomOutOfRange(zoom));
        }
        let lat = super::clamp_latitude(lat);
        let lon = super::wrap_longitude(lon);
        let tile_x = super::lon_to_tile_x(lon, zoom);
        let tile_y = super::lat_to_tile_y(lat, zoom);
        Ok(Self {
            zoom,
            tile_x,
            tile_y,
            lat,
            lon,
            path: tile_path(zoom, tile_x, tile_y),
        })
    }

    /// Address of a tile given by its indices. `lat`/`lon` are set to the
    /// tile center.
    pub fn from_tile(tile_x: u32, tile_y: u32, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::ZoomOutOfRange(zoom));
        }
        let n = tiles_per_axis(zoom);
        if tile_x >= n || tile_y >= n {
            return Err(CoordError::TileOutOfRange {
                x: tile_x as i64,
                y: tile_y as i64,
                zoom,
            });
        }
        let (lat, lon) = super::tile_center(tile_x, tile_y, zoom);
        Ok(Self {
            zoom,
            tile_x,
            tile_y,
            lat,
            lon,
            path: tile_path(zoom, tile_x, tile_y),
        })
    }

    /// The tile `dx` columns east and `dy` rows south of this one.
    ///
    /// Columns wrap around the antimeridian; rows past the poles are out of range.
    pub fn neighbor(&self, dx: i32, dy: i32) -> Result<Self, CoordError> {
        let n = tiles_per_axis(self.zoom) as i64;
        let y = self.tile_y as i64 + dy as i64;
        if y < 0 || y >= n {
            return Err(CoordError::TileOutOfRange {
                x: self.tile_x as i64 + dx as i64,
                y,
                zoom: self.zoom,
            });
        }
        let x = (self.tile_x as i64 + dx as i64).rem_euclid(n);
        Self::from_tile(x as u32, y as u32, self.zoom)
    }

    /// Whether two addresses name the same tile.
    pub fn same_tile(&self, other: &TileAddress) -> bool {
        self.zoom == other.zoom && self.tile_x == other.tile_x && self.tile_y == other.tile_y
    }

    /// Geographic extent of this tile.
    pub fn bounds(&self) -> TileBounds {
        TileBounds::of_tile(self.tile_x, self.tile_y, self.zoom)
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom.min(MAX_ZOOM)
}

/// Relative storage path of a tile: `{zoom}/{x}/{y}`.
pub fn tile_path(zoom: u8, tile_x: u32, tile_y: u32) -> String {
    format!("{}/{}/{}", zoom, tile_x, tile_y)
}

/// A pixel inside a specific tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePixel {
    pub tile_x: u32,
    pub tile_y: u32,
    /// Column inside the tile (0..256).
    pub x: u16,
    /// Row inside the tile (0..256).
    pub y: u16,
}

/// Geographic bounding box of one tile or a union of tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl TileBounds {
    /// Bounds of the tile at (`tile_x`, `tile_y`, `zoom`).
    pub fn of_tile(tile_x: u32, tile_y: u32, zoom: u8) -> Self {
        let lon_min = super::tile_x_to_lon(tile_x, zoom);
        let lon_max = super::tile_x_to_lon(tile_x + 1, zoom);
        // Row numbers grow southwards.
        let lat_max = super::tile_y_to_lat(tile_y, zoom);
        let lat_min = super::tile_y_to_lat(tile_y + 1, zoom);
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Smallest bounds covering both.
    pub fn union(&self, other: &TileBounds) -> TileBounds {
        TileBounds {
            lat_min: self.lat_min.min(other.lat_min),
            lat_max: self.lat_max.max(other.lat_max),
            lon_min: self.lon_min.min(other.lon_min),
            lon_max: self.lon_max.max(other.lon_max),
        }
    }

    /// Whether the point lies inside (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}
