//! Clipped drawing surface over a [`Raster`].

use crate::codec::{Color332, PixelRect};

use super::Raster;

/// Writes pixels into a raster, discarding anything outside `clip`.
pub struct Painter<'a> {
    raster: &'a mut Raster,
    clip: PixelRect,
}

impl<'a> Painter<'a> {
    /// Paints anywhere inside the raster.
    pub fn new(raster: &'a mut Raster) -> Self {
        let clip = PixelRect::new(0, 0, raster.width() as i32 - 1, raster.height() as i32 - 1);
        Self { raster, clip }
    }

    /// Paints only inside `clip` (intersected with the raster bounds).
    pub fn with_clip(raster: &'a mut Raster, clip: PixelRect) -> Self {
        let full = Self::new(raster);
        let clip = PixelRect::new(
            clip.min_x.max(full.clip.min_x),
            clip.min_y.max(full.clip.min_y),
            clip.max_x.min(full.clip.max_x),
            clip.max_y.min(full.clip.max_y),
        );
        Self {
            raster: full.raster,
            clip,
        }
    }

    pub fn clip(&self) -> PixelRect {
        self.clip
    }

    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, color: Color332) {
        if x >= self.clip.min_x && x <= self.clip.max_x && y >= self.clip.min_y && y <= self.clip.max_y
        {
            self.raster.set(x, y, color);
        }
    }

    /// Fills the inclusive horizontal span `x0..=x1` on row `y`.
    #[inline]
    pub fn span(&mut self, y: i32, x0: i32, x1: i32, color: Color332) {
        if y < self.clip.min_y || y > self.clip.max_y {
            return;
        }
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.raster
            .fill_span(y, x0.max(self.clip.min_x), x1.min(self.clip.max_x), color);
    }

    /// Fills an inclusive-exclusive block `x..x+w`, `y..y+h`.
    pub fn block(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color332) {
        if w <= 0 || h <= 0 {
            return;
        }
        for row in y..y + h {
            self.span(row, x, x + w - 1, color);
        }
    }
}
