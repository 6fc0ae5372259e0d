//! Polygon fills.
//!
//! The general path is an even-odd scanline fill over every ring at once, so
//! inner rings punch holes. Triangles and axis-aligned rectangles are common
//! enough in the tile data to get direct paths, picked by [`classify`].

use crate::codec::{Color332, Point, Ring};

use super::Painter;

/// Fill strategy for a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStrategy {
    Triangle,
    Rect,
    Scanline,
}

/// Picks the cheapest correct fill for a set of rings.
pub fn classify(rings: &[Ring]) -> FillStrategy {
    let [ring] = rings else {
        return FillStrategy::Scanline;
    };
    match ring.points.len() {
        3 => FillStrategy::Triangle,
        4 if is_axis_aligned_rect(&ring.points) => FillStrategy::Rect,
        _ => FillStrategy::Scanline,
    }
}

fn is_axis_aligned_rect(p: &[Point]) -> bool {
    let horizontal_first =
        p[0].y == p[1].y && p[1].x == p[2].x && p[2].y == p[3].y && p[3].x == p[0].x;
    let vertical_first =
        p[0].x == p[1].x && p[1].y == p[2].y && p[2].x == p[3].x && p[3].y == p[0].y;
    horizontal_first || vertical_first
}

/// Fills rings with the strategy [`classify`] selects.
pub fn fill_polygon(painter: &mut Painter<'_>, rings: &[Ring], color: Color332) {
    match classify(rings) {
        FillStrategy::Triangle => {
            let p = &rings[0].points;
            fill_triangle(painter, [p[0], p[1], p[2]], color);
        }
        FillStrategy::Rect => {
            let p = &rings[0].points;
            let min_x = p.iter().map(|p| p.x).min().unwrap_or(0) as i32;
            let max_x = p.iter().map(|p| p.x).max().unwrap_or(0) as i32;
            let min_y = p.iter().map(|p| p.y).min().unwrap_or(0) as i32;
            let max_y = p.iter().map(|p| p.y).max().unwrap_or(0) as i32;
            painter.block(min_x, min_y, max_x - min_x, max_y - min_y, color);
        }
        FillStrategy::Scanline => fill_scanline(painter, rings, color),
    }
}

/// Even-odd scanline fill.
///
/// Each row is sampled through pixel centers; a pixel is inside when its
/// center lies left-inclusive of an odd number of crossings.
pub fn fill_scanline(painter: &mut Painter<'_>, rings: &[Ring], color: Color332) {
    let Some((min_y, max_y)) = rings
        .iter()
        .flat_map(|r| r.points.iter())
        .fold(None, |acc: Option<(i32, i32)>, p| {
            let y = p.y as i32;
            Some(acc.map_or((y, y), |(lo, hi)| (lo.min(y), hi.max(y))))
        })
    else {
        return;
    };

    let clip = painter.clip();
    let mut crossings: Vec<f32> = Vec::with_capacity(16);
    for y in min_y.max(clip.min_y)..=max_y.min(clip.max_y) {
        let yc = y as f32 + 0.5;
        crossings.clear();
        for ring in rings {
            let n = ring.points.len();
            for i in 0..n {
                let a = ring.points[i];
                let b = ring.points[(i + 1) % n];
                let (ay, by) = (a.y as f32, b.y as f32);
                if (ay <= yc && yc < by) || (by <= yc && yc < ay) {
                    let t = (yc - ay) / (by - ay);
                    crossings.push(a.x as f32 + t * (b.x as f32 - a.x as f32));
                }
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = (pair[1] - 0.5).floor() as i32;
            if x0 <= x1 {
                painter.span(y, x0, x1, color);
            }
        }
    }
}

/// Sorted-Y triangle fill, split at the middle vertex.
///
/// Vertices are inclusive so thin triangles still cover their outline.
pub fn fill_triangle(painter: &mut Painter<'_>, points: [Point; 3], color: Color332) {
    let mut v = points;
    v.sort_by_key(|p| p.y);
    let [top, mid, bottom] = v;

    let x_at = |a: Point, b: Point, y: i32| -> f32 {
        if a.y == b.y {
            a.x as f32
        } else {
            a.x as f32 + (b.x - a.x) as f32 * (y - a.y as i32) as f32 / (b.y - a.y) as f32
        }
    };

    if top.y == bottom.y {
        let l = top.x.min(mid.x).min(bottom.x);
        let r = top.x.max(mid.x).max(bottom.x);
        painter.span(top.y as i32, l as i32, r as i32, color);
        return;
    }

    for y in top.y as i32..=bottom.y as i32 {
        let long = x_at(top, bottom, y);
        let short = if y < mid.y as i32 {
            x_at(top, mid, y)
        } else {
            x_at(mid, bottom, y)
        };
        painter.span(y, long.round() as i32, short.round() as i32, color);
    }
}

/// Direct block fill of an axis-aligned rectangle.
pub fn fill_rect(painter: &mut Painter<'_>, origin: Point, width: i16, height: i16, color: Color332) {
    painter.block(origin.x as i32, origin.y as i32, width as i32, height as i32, color);
}
