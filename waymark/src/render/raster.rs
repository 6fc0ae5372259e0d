//! 8-bit color rasters.

use image::{Rgba, RgbaImage};

use crate::codec::Color332;
use crate::coord::TILE_SIZE;

/// A width×height grid of 3-3-2 pixels, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color332>,
}

impl Raster {
    /// Creates a raster filled with `color`.
    pub fn new(width: u32, height: u32, color: Color332) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// A single tile raster (256×256).
    pub fn tile(color: Color332) -> Self {
        Self::new(TILE_SIZE, TILE_SIZE, color)
    }

    /// Bytes one tile raster occupies; the unit of cache capacity planning.
    pub const fn tile_bytes() -> usize {
        (TILE_SIZE * TILE_SIZE) as usize * std::mem::size_of::<Color332>()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color332] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color332> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Sets one pixel; writes outside the raster are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color332) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fills the inclusive span `x0..=x1` on row `y`, clipped to the raster.
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color332) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32 - 1);
        if x0 > x1 {
            return;
        }
        let row = y as usize * self.width as usize;
        self.pixels[row + x0 as usize..=row + x1 as usize].fill(color);
    }

    pub fn fill(&mut self, color: Color332) {
        self.pixels.fill(color);
    }

    /// Copies `src` with its top-left corner at (`dx`, `dy`), clipped.
    pub fn blit(&mut self, src: &Raster, dx: i32, dy: i32) {
        let x0 = dx.max(0);
        let x1 = (dx + src.width as i32).min(self.width as i32);
        if x0 >= x1 {
            return;
        }
        let y0 = dy.max(0);
        let y1 = (dy + src.height as i32).min(self.height as i32);
        for y in y0..y1 {
            let sy = (y - dy) as usize;
            let src_row = sy * src.width as usize;
            let s0 = src_row + (x0 - dx) as usize;
            let s1 = src_row + (x1 - dx) as usize;
            let d0 = y as usize * self.width as usize + x0 as usize;
            self.pixels[d0..d0 + (s1 - s0)].copy_from_slice(&src.pixels[s0..s1]);
        }
    }

    /// Like [`Raster::blit`] but skips source pixels equal to `key`.
    pub fn blit_keyed(&mut self, src: &Raster, dx: i32, dy: i32, key: Color332) {
        for sy in 0..src.height as i32 {
            for sx in 0..src.width as i32 {
                let color = src.pixels[sy as usize * src.width as usize + sx as usize];
                if color != key {
                    self.set(dx + sx, dy + sy, color);
                }
            }
        }
    }

    /// Moves the contents by (`dx`, `dy`), filling exposed pixels with `fill`.
    pub fn shift(&mut self, dx: i32, dy: i32, fill: Color332) {
        if dx == 0 && dy == 0 {
            return;
        }
        let snapshot = self.clone();
        self.fill(fill);
        self.blit(&snapshot, dx, dy);
    }

    /// Converts to a 32-bit RGBA image for export.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let (r, g, b) = self.pixels[(y * self.width + x) as usize].to_rgb();
            Rgba([r, g, b, 255])
        })
    }

    /// Counts pixels of one color.
    pub fn count(&self, color: Color332) -> usize {
        self.pixels.iter().filter(|&&c| c == color).count()
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_outside_is_ignored() {
        let mut r = Raster::new(4, 4, Color332::BLACK);
        r.set(-1, 0, Color332::RED);
        r.set(4, 4, Color332::RED);
        assert_eq!(r.count(Color332::RED), 0);
        r.set(3, 3, Color332::RED);
        assert_eq!(r.get(3, 3), Some(Color332::RED));
    }

    #[test]
    fn test_fill_span_clips() {
        let mut r = Raster::new(8, 2, Color332::BLACK);
        r.fill_span(1, -5, 3, Color332::BLUE);
        r.fill_span(0, 6, 100, Color332::BLUE);
        assert_eq!(r.count(Color332::BLUE), 4 + 2);
        assert_eq!(r.get(0, 1), Some(Color332::BLUE));
        assert_eq!(r.get(4, 1), Some(Color332::BLACK));
    }

    #[test]
    fn test_blit_with_offset() {
        let mut dst = Raster::new(6, 6, Color332::BLACK);
        let src = Raster::new(4, 4, Color332::RED);
        dst.blit(&src, 4, -2);
        assert_eq!(dst.count(Color332::RED), 4);
        assert_eq!(dst.get(5, 1), Some(Color332::RED));
        assert_eq!(dst.get(5, 2), Some(Color332::BLACK));
    }

    #[test]
    fn test_blit_keyed_skips_key() {
        let mut dst = Raster::new(2, 1, Color332::WHITE);
        let mut src = Raster::new(2, 1, Color332::MAGENTA);
        src.set(1, 0, Color332::RED);
        dst.blit_keyed(&src, 0, 0, Color332::MAGENTA);
        assert_eq!(dst.get(0, 0), Some(Color332::WHITE));
        assert_eq!(dst.get(1, 0), Some(Color332::RED));
    }

    #[test]
    fn test_shift_exposes_fill() {
        let mut r = Raster::new(4, 4, Color332::RED);
        r.shift(-2, 0, Color332::BLACK);
        assert_eq!(r.get(1, 0), Some(Color332::RED));
        assert_eq!(r.get(2, 0), Some(Color332::BLACK));
    }

    #[test]
    fn test_to_rgba_image() {
        let img = Raster::new(2, 2, Color332::RED).to_rgba_image();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
    }
}
