//! Tile seam suppression.
//!
//! Adjacent tiles are encoded independently, so a shape clipped at a tile
//! border carries an edge running along that border in both tiles. Stroking
//! it would draw a visible grid over the map. Edges lying on a border,
//! spanning the tile from one border to the opposite one, or cutting across
//! between opposite corners are marked so the renderer fills through them
//! without stroking them.

use super::command::Point;

/// Distance in pixels from a border within which a vertex counts as "on" it.
pub const SEAM_TOLERANCE: i16 = 1;

const LAST_PIXEL: i16 = 255;

#[inline]
fn near_min(v: i16) -> bool {
    v <= SEAM_TOLERANCE
}

#[inline]
fn near_max(v: i16) -> bool {
    v >= LAST_PIXEL - SEAM_TOLERANCE
}

/// Whether the edge `a`→`b` lies on a tile seam.
///
/// Both endpoints must be on the border: either on the same side, or on
/// opposite sides so the edge spans the whole tile. Corner-to-corner
/// diagonals fall in the second case.
pub fn is_seam_edge(a: Point, b: Point) -> bool {
    let same_side = (near_min(a.x) && near_min(b.x))
        || (near_max(a.x) && near_max(b.x))
        || (near_min(a.y) && near_min(b.y))
        || (near_max(a.y) && near_max(b.y));
    let opposite_sides = (near_min(a.x) && near_max(b.x))
        || (near_max(a.x) && near_min(b.x))
        || (near_min(a.y) && near_max(b.y))
        || (near_max(a.y) && near_min(b.y));
    same_side || opposite_sides
}

/// Suppression mask for a closed ring; bit `i` covers edge `i`→`i+1`.
pub fn ring_seam_mask(points: &[Point]) -> u32 {
    let n = points.len();
    (0..n.min(32)).fold(0u32, |mask, i| {
        if is_seam_edge(points[i], points[(i + 1) % n]) {
            mask | (1 << i)
        } else {
            mask
        }
    })
}

/// Suppression mask for a triangle.
pub fn triangle_seam_mask(points: &[Point; 3]) -> u8 {
    ring_seam_mask(points) as u8
}

/// Suppression mask for an axis-aligned rectangle: bits top, right, bottom, left.
pub fn rect_seam_mask(origin: Point, width: i16, height: i16) -> u8 {
    let right = origin.x + width - 1;
    let bottom = origin.y + height - 1;
    let corners = [
        origin,
        Point::new(right, origin.y),
        Point::new(right, bottom),
        Point::new(origin.x, bottom),
    ];
    ring_seam_mask(&corners) as u8
}

/// Splits an open polyline into the runs left after removing seam segments.
///
/// Runs shorter than two points are dropped.
pub fn split_polyline(points: &[Point]) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for pair in points.windows(2) {
        if is_seam_edge(pair[0], pair[1]) {
            if current.len() >= 2 {
                runs.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            continue;
        }
        if current.is_empty() {
            current.push(pair[0]);
        }
        current.push(pair[1]);
    }
    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i16, y: i16) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_edge_along_border_is_seam() {
        assert!(is_seam_edge(p(0, 0), p(255, 0)));
        assert!(is_seam_edge(p(1, 10), p(0, 200)));
        assert!(is_seam_edge(p(255, 0), p(254, 255)));
        assert!(is_seam_edge(p(30, 255), p(90, 254)));
    }

    #[test]
    fn test_interior_edges_kept() {
        assert!(!is_seam_edge(p(10, 10), p(200, 10)));
        assert!(!is_seam_edge(p(0, 0), p(128, 128)));
        assert!(!is_seam_edge(p(2, 2), p(2, 253)));
        assert!(!is_seam_edge(p(0, 128), p(253, 128)));
        // Touching two adjacent sides is a real edge.
        assert!(!is_seam_edge(p(0, 100), p(100, 0)));
    }

    #[test]
    fn test_border_to_opposite_border_is_seam() {
        assert!(is_seam_edge(p(0, 128), p(255, 128)));
        assert!(is_seam_edge(p(254, 40), p(1, 200)));
        assert!(is_seam_edge(p(2, 0), p(2, 255)));
        assert!(is_seam_edge(p(90, 255), p(160, 1)));
    }

    #[test]
    fn test_corner_to_corner_is_seam() {
        assert!(is_seam_edge(p(0, 0), p(255, 255)));
        assert!(is_seam_edge(p(255, 255), p(1, 1)));
        assert!(is_seam_edge(p(255, 0), p(0, 255)));
        assert!(is_seam_edge(p(0, 254), p(254, 1)));
    }

    #[test]
    fn test_full_tile_rect_mask() {
        assert_eq!(rect_seam_mask(p(0, 0), 256, 256), 0b1111);
        assert_eq!(rect_seam_mask(p(10, 10), 20, 20), 0);
        // Only the left side touches the border.
        assert_eq!(rect_seam_mask(p(0, 10), 20, 20), 0b1000);
    }

    #[test]
    fn test_ring_mask_bits() {
        let ring = [p(0, 0), p(100, 50), p(0, 200)];
        // Edge 2 runs 0,200 -> 0,0 along the left border.
        assert_eq!(ring_seam_mask(&ring), 0b100);
    }

    #[test]
    fn test_split_polyline_around_seam() {
        let line = [p(50, 50), p(0, 60), p(0, 120), p(50, 130), p(60, 140)];
        let runs = split_polyline(&line);
        assert_eq!(runs, vec![vec![p(50, 50), p(0, 60)], vec![p(0, 120), p(50, 130), p(60, 140)]]);
    }

    #[test]
    fn test_split_polyline_entirely_on_border() {
        let line = [p(0, 0), p(0, 100), p(0, 255)];
        assert!(split_polyline(&line).is_empty());
    }
}
