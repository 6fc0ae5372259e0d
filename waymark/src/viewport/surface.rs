//! Display output.

use crate::codec::Color332;
use crate::render::Raster;

use super::rotate::rotate_into;

/// Where the composed map ends up.
///
/// Implementations wrap a panel driver or, in tests and the CLI, an
/// in-memory [`FrameBuffer`].
pub trait DisplaySurface {
    /// Surface size in pixels as (width, height).
    fn size(&self) -> (u32, u32);

    /// Blits `src` rotated clockwise by `angle_deg` around `pivot`, with the
    /// pivot landing on the surface center. Pixels equal to `key` are not
    /// drawn.
    ///
    /// # Arguments
    ///
    /// * `src` - The composed canvas
    /// * `pivot` - Rotation center in canvas pixels
    /// * `angle_deg` - Clockwise rotation in degrees
    /// * `key` - Transparent color
    fn blit_rotated(&mut self, src: &Raster, pivot: (f64, f64), angle_deg: f64, key: Color332);
}

/// An in-memory display.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    raster: Raster,
    background: Color332,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, background: Color332) -> Self {
        Self {
            raster: Raster::new(width, height, background),
            background,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn clear(&mut self) {
        self.raster.fill(self.background);
    }
}

impl DisplaySurface for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.raster.width(), self.raster.height())
    }

    fn blit_rotated(&mut self, src: &Raster, pivot: (f64, f64), angle_deg: f64, key: Color332) {
        let center = (
            self.raster.width() as f64 / 2.0,
            self.raster.height() as f64 / 2.0,
        );
        self.clear();
        rotate_into(src, pivot, angle_deg, &mut self.raster, center, key);
    }
}
