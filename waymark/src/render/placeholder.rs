//! "No map data" placeholder raster.
//!
//! Shown wherever a tile is missing or failed to decode so the viewport never
//! has holes. Built once and shared.

use std::sync::{Arc, OnceLock};

use crate::codec::{Color332, Point};

use super::stroke::draw_line;
use super::{Painter, Raster};

static NO_DATA: OnceLock<Arc<Raster>> = OnceLock::new();

/// Spacing of the hatch lines on the placeholder.
const HATCH_SPACING: i16 = 32;

/// Builds a hatched placeholder tile.
pub fn generate_placeholder(fill: Color332) -> Raster {
    let mut raster = Raster::tile(fill);
    let hatch = fill.darken(25);
    let mut painter = Painter::new(&mut raster);
    let mut offset = -255;
    while offset < 256 {
        draw_line(
            &mut painter,
            Point::new(offset, 0),
            Point::new(offset + 255, 255),
            hatch,
            1,
        );
        offset += HATCH_SPACING;
    }
    raster
}

/// The shared placeholder tile.
pub fn no_data_raster() -> Arc<Raster> {
    Arc::clone(NO_DATA.get_or_init(|| Arc::new(generate_placeholder(Color332::NO_DATA))))
}
