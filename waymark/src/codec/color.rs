//! Truncated 8-bit colors (3 bits red, 3 bits green, 2 bits blue).

use std::fmt;

/// A 3-3-2 packed RGB color, the only color depth the tile format carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color332(pub u8);

impl Color332 {
    pub const BLACK: Color332 = Color332(0x00);
    pub const WHITE: Color332 = Color332(0xff);
    pub const RED: Color332 = Color332(0xe0);
    pub const GREEN: Color332 = Color332(0x1c);
    pub const BLUE: Color332 = Color332(0x03);
    pub const MAGENTA: Color332 = Color332(0xe3);
    /// Map background behind every tile.
    pub const BACKGROUND: Color332 = Color332(0xfe);
    /// Fill of the "no map data" placeholder.
    pub const NO_DATA: Color332 = Color332(0xb6);

    /// Truncates 8-bit channels to 3-3-2.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color332((r & 0xe0) | ((g & 0xe0) >> 3) | (b >> 6))
    }

    /// Expands back to 8-bit channels, mapping channel maxima to 255.
    #[inline]
    pub const fn to_rgb(self) -> (u8, u8, u8) {
        let r = (self.0 >> 5) as u16;
        let g = ((self.0 >> 2) & 0x07) as u16;
        let b = (self.0 & 0x03) as u16;
        ((r * 255 / 7) as u8, (g * 255 / 7) as u8, (b * 255 / 3) as u8)
    }

    /// Scales every channel down by `percent`.
    pub fn darken(self, percent: u8) -> Self {
        let keep = 100 - percent.min(100) as u16;
        let (r, g, b) = self.to_rgb();
        let scale = |c: u8| ((c as u16 * keep) / 100) as u8;
        Color332::from_rgb(scale(r), scale(g), scale(b))
    }

    /// Border color derived for filled shapes (40% darker).
    #[inline]
    pub fn border(self) -> Self {
        self.darken(40)
    }
}

impl fmt::Debug for Color332 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color332({:#04x})", self.0)
    }
}
