//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude),
//! Web Mercator tile indices, and pixels inside a 256×256 tile.
//!
//! All functions are pure. Latitude must be kept away from the poles by the
//! caller; [`clamp_latitude`] does that.

mod format;
mod types;

pub use format::{format_latitude, format_longitude, scale_label};
pub use types::{
    tile_path, tiles_per_axis, CoordError, TileAddress, TileBounds, TilePixel, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM, TILE_SIZE,
};

use std::f64::consts::PI;

/// Clamps latitude into the Web Mercator range.
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

/// Wraps longitude into `-180..180`.
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (MIN_LON..MAX_LON).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Fractional tile column of a longitude.
#[inline]
fn lon_to_tile_xf(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * tiles_per_axis(zoom) as f64
}

/// Fractional tile row of a latitude.
#[inline]
fn lat_to_tile_yf(lat: f64, zoom: u8) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * tiles_per_axis(zoom) as f64
}

#[inline]
fn tile_xf_to_lon(x: f64, zoom: u8) -> f64 {
    x / tiles_per_axis(zoom) as f64 * 360.0 - 180.0
}

#[inline]
fn tile_yf_to_lat(y: f64, zoom: u8) -> f64 {
    let y = y / tiles_per_axis(zoom) as f64;
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}

/// Converts a longitude to its tile column at `zoom`.
///
/// The result is clamped to the last column so that `lon == 180.0` stays valid.
#[inline]
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> u32 {
    let max = tiles_per_axis(zoom) - 1;
    let x = lon_to_tile_xf(lon, zoom).floor();
    if x <= 0.0 {
        0
    } else {
        (x as u32).min(max)
    }
}

/// Converts a latitude to its tile row at `zoom`.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> u32 {
    let max = tiles_per_axis(zoom) - 1;
    let y = lat_to_tile_yf(clamp_latitude(lat), zoom).floor();
    if y <= 0.0 {
        0
    } else {
        (y as u32).min(max)
    }
}

/// Longitude of the west edge of tile column `tile_x`.
#[inline]
pub fn tile_x_to_lon(tile_x: u32, zoom: u8) -> f64 {
    tile_xf_to_lon(tile_x as f64, zoom)
}

/// Latitude of the north edge of tile row `tile_y`.
#[inline]
pub fn tile_y_to_lat(tile_y: u32, zoom: u8) -> f64 {
    tile_yf_to_lat(tile_y as f64, zoom)
}

/// Latitude/longitude of the center of a tile.
#[inline]
pub fn tile_center(tile_x: u32, tile_y: u32, zoom: u8) -> (f64, f64) {
    (
        tile_yf_to_lat(tile_y as f64 + 0.5, zoom),
        tile_xf_to_lon(tile_x as f64 + 0.5, zoom),
    )
}

/// Projects a geographic point to the tile containing it and the pixel
/// inside that tile.
pub fn project(lat: f64, lon: f64, zoom: u8) -> TilePixel {
    let (gx, gy) = global_pixel(lat, lon, zoom);
    TilePixel {
        tile_x: (gx / TILE_SIZE as u64) as u32,
        tile_y: (gy / TILE_SIZE as u64) as u32,
        x: (gx % TILE_SIZE as u64) as u16,
        y: (gy % TILE_SIZE as u64) as u16,
    }
}

/// World pixel coordinates (tile index × 256 + pixel) of a point.
pub fn global_pixel(lat: f64, lon: f64, zoom: u8) -> (u64, u64) {
    let world = tiles_per_axis(zoom) as f64 * TILE_SIZE as f64;
    let max = world as u64 - 1;
    let x = (lon_to_tile_xf(wrap_longitude(lon), zoom) * TILE_SIZE as f64).floor();
    let y = (lat_to_tile_yf(clamp_latitude(lat), zoom) * TILE_SIZE as f64).floor();
    (
        (x.max(0.0) as u64).min(max),
        (y.max(0.0) as u64).min(max),
    )
}

/// Geographic coordinates of the north-west corner of a world pixel.
pub fn global_pixel_to_lat_lon(px: f64, py: f64, zoom: u8) -> (f64, f64) {
    let size = TILE_SIZE as f64;
    (tile_yf_to_lat(py / size, zoom), tile_xf_to_lon(px / size, zoom))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = TileAddress::new(40.7128, -74.0060, 16).unwrap();
        assert_eq!(tile.tile_y, 24640);
        assert_eq!(tile.tile_x, 19295);
        assert_eq!(tile.zoom, 16);
        assert_eq!(tile.path, "16/19295/24640");
    }

    #[test]
    fn test_zoom_out_of_range() {
        let result = TileAddress::new(40.0, 0.0, MAX_ZOOM + 1);
        assert!(matches!(result, Err(CoordError::ZoomOutOfRange(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let result = TileAddress::new(f64::NAN, 0.0, 10);
        assert!(matches!(result, Err(CoordError::NotFinite(_))));
    }

    #[test]
    fn test_polar_latitude_is_clamped() {
        let tile = TileAddress::new(90.0, 0.0, 5).unwrap();
        assert_eq!(tile.tile_y, 0);
        let tile = TileAddress::new(-90.0, 0.0, 5).unwrap();
        assert_eq!(tile.tile_y, 31);
    }

    #[test]
    fn test_antimeridian_longitude() {
        assert_eq!(lon_to_tile_x(180.0, 4), 15);
        assert_eq!(lon_to_tile_x(-180.0, 4), 0);
        assert!((wrap_longitude(190.0) - (-170.0)).abs() < 1e-9);
    }

    #[test]
    fn test_tile_corner_at_equator() {
        // At zoom 10, tile 512,512 has its north-west corner on 0,0
        assert!(tile_x_to_lon(512, 10).abs() < 1e-9);
        assert!(tile_y_to_lat(512, 10).abs() < 1e-9);
    }

    #[test]
    fn test_project_pixel_inside_tile() {
        let tp = project(40.7128, -74.0060, 16);
        assert_eq!(tp.tile_x, 19295);
        assert_eq!(tp.tile_y, 24640);
        assert!(tp.x < 256 && tp.y < 256);
    }

    #[test]
    fn test_project_tile_corner_is_pixel_zero() {
        let lat = tile_y_to_lat(100, 8);
        let lon = tile_x_to_lon(100, 8);
        let tp = project(lat - 1e-9, lon + 1e-9, 8);
        assert_eq!((tp.tile_x, tp.tile_y), (100, 100));
        assert_eq!((tp.x, tp.y), (0, 0));
    }

    #[test]
    fn test_neighbor_wraps_columns() {
        let tile = TileAddress::from_tile(0, 3, 3).unwrap();
        let west = tile.neighbor(-1, 0).unwrap();
        assert_eq!(west.tile_x, 7);
        assert!(tile.neighbor(0, -4).is_err());
        assert!(tile.neighbor(0, 5).is_err());
    }

    #[test]
    fn test_bounds_contains_center() {
        let tile = TileAddress::from_tile(300, 200, 9).unwrap();
        let bounds = tile.bounds();
        assert!(bounds.contains(tile.lat, tile.lon));
        assert!(bounds.lat_min < bounds.lat_max);
        assert!(bounds.lon_min < bounds.lon_max);
    }

    #[test]
    fn test_bounds_union() {
        let a = TileBounds::of_tile(10, 10, 5);
        let b = TileBounds::of_tile(11, 11, 5);
        let u = a.union(&b);
        assert_eq!(u.lon_min, a.lon_min);
        assert_eq!(u.lon_max, b.lon_max);
        assert_eq!(u.lat_max, a.lat_max);
        assert_eq!(u.lat_min, b.lat_min);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tile_x_roundtrip(raw in 0u32..u32::MAX, zoom in 0u8..=17) {
                let x = raw % tiles_per_axis(zoom);
                let half = 180.0 / tiles_per_axis(zoom) as f64;
                prop_assert_eq!(lon_to_tile_x(tile_x_to_lon(x, zoom) + half, zoom), x);
            }

            #[test]
            fn test_tile_y_roundtrip(raw in 0u32..u32::MAX, zoom in 0u8..=17) {
                let y = raw % tiles_per_axis(zoom);
                let (lat, _) = tile_center(0, y, zoom);
                prop_assert_eq!(lat_to_tile_y(lat, zoom), y);
            }

            #[test]
            fn test_tile_coords_in_bounds(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let tile = TileAddress::new(lat, lon, zoom)?;
                let max_tile = tiles_per_axis(zoom);
                prop_assert!(tile.tile_x < max_tile);
                prop_assert!(tile.tile_y < max_tile);
            }

            #[test]
            fn test_global_pixel_consistent_with_tile(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=17
            ) {
                let tile = TileAddress::new(lat, lon, zoom)?;
                let tp = project(lat, lon, zoom);
                prop_assert_eq!(tp.tile_x, tile.tile_x);
                prop_assert_eq!(tp.tile_y, tile.tile_y);
            }

            #[test]
            fn test_global_pixel_inverse(
                px in 0u64..(1 << 20),
                py in 0u64..(1 << 20),
            ) {
                // Pixel centers map back to the same pixel
                let zoom = 12;
                let (lat, lon) = global_pixel_to_lat_lon(px as f64 + 0.5, py as f64 + 0.5, zoom);
                prop_assert_eq!(global_pixel(lat, lon, zoom), (px, py));
            }

            #[test]
            fn test_longitude_monotonic(
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                prop_assert!(lon_to_tile_x(lon1, zoom) < lon_to_tile_x(lon2, zoom));
            }
        }
    }
}
