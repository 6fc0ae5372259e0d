//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::Args;
use waymark::coord::TileAddress;
use waymark::nav::{NavFix, TrackPoint};

use crate::error::CliError;

/// Selects one tile either by path or by a point inside it.
#[derive(Debug, Clone, Args)]
pub struct TileSelector {
    /// Tile path as zoom/x/y (e.g. 14/8290/6119)
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub tile: Option<String>,

    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Zoom level used with --lat/--lon (default: [viewport] zoom)
    #[arg(long)]
    pub zoom: Option<u8>,
}

impl TileSelector {
    /// Resolve to a tile address.
    pub fn resolve(&self, default_zoom: u8) -> Result<TileAddress, CliError> {
        if let Some(tile) = &self.tile {
            return parse_tile_path(tile);
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let zoom = self.zoom.unwrap_or(default_zoom);
                Ok(TileAddress::new(lat, lon, zoom)?)
            }
            _ => Err(CliError::InvalidInput(
                "specify a tile with --tile zoom/x/y or --lat and --lon".to_string(),
            )),
        }
    }
}

/// Parse a `zoom/x/y` tile path.
pub fn parse_tile_path(path: &str) -> Result<TileAddress, CliError> {
    let invalid = || CliError::InvalidInput(format!("'{}' is not a zoom/x/y tile path", path));
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    let [zoom, x, y] = parts.as_slice() else {
        return Err(invalid());
    };
    let zoom: u8 = zoom.parse().map_err(|_| invalid())?;
    let x: u32 = x.parse().map_err(|_| invalid())?;
    let y: u32 = y.parse().map_err(|_| invalid())?;
    Ok(TileAddress::from_tile(x, y, zoom)?)
}

/// Parse a `lat,lon` pair.
pub fn parse_lat_lon(value: &str) -> Result<(f64, f64), String> {
    let fields = parse_fields(value).ok_or_else(|| format!("'{}' is not lat,lon", value))?;
    match fields.as_slice() {
        [lat, lon] => Ok((*lat, *lon)),
        _ => Err(format!("'{}' is not lat,lon", value)),
    }
}

/// Read a track from a CSV file with one `lat,lon` point per line.
///
/// Blank lines, `#` comments and a non-numeric header line are skipped.
pub fn read_track(path: &Path) -> Result<Vec<TrackPoint>, CliError> {
    Ok(read_rows(path, 2)?
        .into_iter()
        .map(|row| TrackPoint::new(row[0], row[1]))
        .collect())
}

/// Read GPS fixes from a CSV file with `lat,lon[,heading[,speed_kmh]]` lines.
pub fn read_fixes(path: &Path) -> Result<Vec<NavFix>, CliError> {
    Ok(read_rows(path, 2)?
        .into_iter()
        .map(|row| NavFix {
            heading: row.get(2).copied().unwrap_or(0.0),
            speed_kmh: row.get(3).copied().unwrap_or(0.0),
            ..NavFix::new(row[0], row[1])
        })
        .collect())
}

fn read_rows(path: &Path, min_fields: usize) -> Result<Vec<Vec<f64>>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.to_path_buf(),
        error,
    })?;

    let mut rows = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_fields(line) {
            Some(fields) if fields.len() >= min_fields => rows.push(fields),
            // Header
            None if rows.is_empty() && number == 0 => {}
            _ => {
                return Err(CliError::InvalidInput(format!(
                    "{}:{}: expected at least {} numeric fields",
                    path.display(),
                    number + 1,
                    min_fields
                )))
            }
        }
    }
    Ok(rows)
}

fn parse_fields(line: &str) -> Option<Vec<f64>> {
    line.split(',')
        .map(|field| field.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_path() {
        let tile = parse_tile_path("14/8290/6119").unwrap();
        assert_eq!((tile.zoom, tile.tile_x, tile.tile_y), (14, 8290, 6119));
        assert!(parse_tile_path("14/8290").is_err());
        assert!(parse_tile_path("2/9/0").is_err());
    }

    #[test]
    fn test_parse_lat_lon() {
        assert_eq!(parse_lat_lon("41.5, -2.25"), Ok((41.5, -2.25)));
        assert!(parse_lat_lon("41.5").is_err());
        assert!(parse_lat_lon("north,east").is_err());
    }

    #[test]
    fn test_read_track_skips_header_and_comments() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("track.csv");
        std::fs::write(&path, "lat,lon\n# start\n41.0,2.0\n\n41.001,2.001\n").unwrap();

        let points = read_track(&path).unwrap();
        assert_eq!(points, vec![TrackPoint::new(41.0, 2.0), TrackPoint::new(41.001, 2.001)]);
    }

    #[test]
    fn test_read_track_rejects_bad_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("track.csv");
        std::fs::write(&path, "41.0,2.0\nbroken\n").unwrap();

        assert!(matches!(read_track(&path), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_read_fixes_optional_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fixes.csv");
        std::fs::write(&path, "41.0,2.0\n41.0,2.0,90,25\n").unwrap();

        let fixes = read_fixes(&path).unwrap();
        assert_eq!(fixes[0].speed_kmh, 0.0);
        assert_eq!(fixes[1].heading, 90.0);
        assert_eq!(fixes[1].speed_kmh, 25.0);
    }
}
