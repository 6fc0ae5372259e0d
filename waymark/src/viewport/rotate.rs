//! Nearest-neighbour raster rotation.

use crate::codec::Color332;
use crate::render::Raster;

/// Copies `src` into `dst` rotated clockwise by `angle_deg` around `pivot`,
/// placing the pivot at `dst_pivot`.
///
/// Works by inverse mapping: every destination pixel looks up the source
/// pixel it came from. Destination pixels that map outside `src`, or onto a
/// source pixel equal to `key`, are left untouched.
pub fn rotate_into(
    src: &Raster,
    pivot: (f64, f64),
    angle_deg: f64,
    dst: &mut Raster,
    dst_pivot: (f64, f64),
    key: Color332,
) {
    let angle = angle_deg.rem_euclid(360.0);
    if angle == 0.0 {
        let dx = (dst_pivot.0 - pivot.0).round() as i32;
        let dy = (dst_pivot.1 - pivot.1).round() as i32;
        dst.blit_keyed(src, dx, dy, key);
        return;
    }

    let (sin, cos) = angle.to_radians().sin_cos();
    let (sw, sh) = (src.width() as i32, src.height() as i32);
    for y in 0..dst.height() as i32 {
        let ry = y as f64 + 0.5 - dst_pivot.1;
        for x in 0..dst.width() as i32 {
            let rx = x as f64 + 0.5 - dst_pivot.0;
            // Inverse of a clockwise rotation in y-down coordinates.
            let sx = (pivot.0 + rx * cos + ry * sin).floor() as i32;
            let sy = (pivot.1 - rx * sin + ry * cos).floor() as i32;
            if sx < 0 || sy < 0 || sx >= sw || sy >= sh {
                continue;
            }
            if let Some(color) = src.get(sx, sy) {
                if color != key {
                    dst.set(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: Color332 = Color332::MAGENTA;

    #[test]
    fn test_zero_angle_is_a_keyed_blit() {
        let mut src = Raster::new(4, 4, Color332::RED);
        src.set(0, 0, KEY);
        let mut dst = Raster::new(4, 4, Color332::BLACK);
        rotate_into(&src, (2.0, 2.0), 360.0, &mut dst, (2.0, 2.0), KEY);
        assert_eq!(dst.get(0, 0), Some(Color332::BLACK));
        assert_eq!(dst.get(3, 3), Some(Color332::RED));
    }

    #[test]
    fn test_quarter_turn_moves_right_to_below() {
        let mut src = Raster::new(21, 21, Color332::WHITE);
        // Marker 6 px right of the pivot.
        src.set(16, 10, Color332::RED);
        let mut dst = Raster::new(21, 21, Color332::BLACK);
        rotate_into(&src, (10.5, 10.5), 90.0, &mut dst, (10.5, 10.5), KEY);
        assert_eq!(dst.get(10, 16), Some(Color332::RED));
        assert_eq!(dst.get(16, 10), Some(Color332::WHITE));
    }

    #[test]
    fn test_outside_source_is_untouched() {
        let src = Raster::new(4, 4, Color332::RED);
        let mut dst = Raster::new(20, 20, Color332::BLACK);
        rotate_into(&src, (2.0, 2.0), 45.0, &mut dst, (10.0, 10.0), KEY);
        assert_eq!(dst.get(0, 0), Some(Color332::BLACK));
        assert_eq!(dst.get(10, 10), Some(Color332::RED));
    }
}
