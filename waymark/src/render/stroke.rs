//! Line, outline and pattern strokes.

use crate::codec::{Color332, Point, Ring};

use super::Painter;

/// Visits every pixel of the Bresenham line `a`→`b`, endpoints included.
fn bresenham(a: Point, b: Point, mut visit: impl FnMut(usize, i32, i32)) {
    let (mut x, mut y) = (a.x as i32, a.y as i32);
    let (x1, y1) = (b.x as i32, b.y as i32);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut step = 0usize;
    loop {
        visit(step, x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

/// Draws a line; widths above 1 use a square brush centered on the line.
pub fn draw_line(painter: &mut Painter<'_>, a: Point, b: Point, color: Color332, width: u8) {
    if width <= 1 {
        bresenham(a, b, |_, x, y| painter.plot(x, y, color));
        return;
    }
    let w = width as i32;
    let half = w / 2;
    bresenham(a, b, |_, x, y| painter.block(x - half, y - half, w, w, color));
}

/// Draws `dash` pixels on, `gap` pixels off, starting with a dash.
pub fn draw_dashed(
    painter: &mut Painter<'_>,
    a: Point,
    b: Point,
    dash: u8,
    gap: u8,
    color: Color332,
) {
    let period = (dash as usize + gap as usize).max(1);
    bresenham(a, b, |i, x, y| {
        if i % period < dash as usize {
            painter.plot(x, y, color);
        }
    });
}

/// Draws one pixel every `spacing` pixels.
pub fn draw_dotted(painter: &mut Painter<'_>, a: Point, b: Point, spacing: u8, color: Color332) {
    let spacing = spacing.max(1) as usize;
    bresenham(a, b, |i, x, y| {
        if i % spacing == 0 {
            painter.plot(x, y, color);
        }
    });
}

pub fn draw_polyline(painter: &mut Painter<'_>, points: &[Point], color: Color332) {
    for pair in points.windows(2) {
        draw_line(painter, pair[0], pair[1], color, 1);
    }
}

/// Strokes the edges of a closed ring whose seam bit is clear.
pub fn stroke_ring(painter: &mut Painter<'_>, ring: &Ring, color: Color332) {
    let n = ring.points.len();
    for i in 0..n {
        if ring.edge_visible(i) {
            draw_line(painter, ring.points[i], ring.points[(i + 1) % n], color, 1);
        }
    }
}

/// Strokes triangle edges; `seam_mask` bit `i` hides the edge from vertex `i`.
pub fn stroke_triangle(painter: &mut Painter<'_>, p: &[Point; 3], seam_mask: u8, color: Color332) {
    for i in 0..3 {
        if seam_mask & (1 << i) == 0 {
            draw_line(painter, p[i], p[(i + 1) % 3], color, 1);
        }
    }
}

/// Strokes rectangle edges; `seam_mask` bits are top, right, bottom, left.
pub fn stroke_rect(
    painter: &mut Painter<'_>,
    origin: Point,
    width: i16,
    height: i16,
    seam_mask: u8,
    color: Color332,
) {
    let (x0, y0) = (origin.x as i32, origin.y as i32);
    let (x1, y1) = (x0 + width as i32 - 1, y0 + height as i32 - 1);
    if seam_mask & 0b0001 == 0 {
        painter.span(y0, x0, x1, color);
    }
    if seam_mask & 0b0010 == 0 {
        for y in y0..=y1 {
            painter.plot(x1, y, color);
        }
    }
    if seam_mask & 0b0100 == 0 {
        painter.span(y1, x0, x1, color);
    }
    if seam_mask & 0b1000 == 0 {
        for y in y0..=y1 {
            painter.plot(x0, y, color);
        }
    }
}

/// Midpoint circle. `fill` paints the disc, `border` the outline.
pub fn draw_circle(
    painter: &mut Painter<'_>,
    center: Point,
    radius: i16,
    fill: Option<Color332>,
    border: Color332,
) {
    let (cx, cy) = (center.x as i32, center.y as i32);
    let r = radius as i32;
    if r <= 0 {
        painter.plot(cx, cy, border);
        return;
    }

    let mut x = r;
    let mut y = 0;
    let mut err = 1 - r;
    let mut octants: Vec<(i32, i32)> = Vec::with_capacity(r as usize * 2);
    while x >= y {
        octants.push((x, y));
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    if let Some(fill) = fill {
        for &(x, y) in &octants {
            painter.span(cy + y, cx - x, cx + x, fill);
            painter.span(cy - y, cx - x, cx + x, fill);
            painter.span(cy + x, cx - y, cx + y, fill);
            painter.span(cy - x, cx - y, cx + y, fill);
        }
    }
    for &(x, y) in &octants {
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            painter.plot(cx + px, cy + py, border);
        }
    }
}

/// Horizontal and vertical lines every `spacing` pixels inside a rectangle.
pub fn draw_grid(
    painter: &mut Painter<'_>,
    origin: Point,
    width: i16,
    height: i16,
    spacing: i16,
    color: Color332,
) {
    let (x0, y0) = (origin.x as i32, origin.y as i32);
    let (x1, y1) = (x0 + width as i32 - 1, y0 + height as i32 - 1);
    let step = spacing.max(1) as usize;
    for x in (x0..=x1).step_by(step) {
        for y in y0..=y1 {
            painter.plot(x, y, color);
        }
    }
    for y in (y0..=y1).step_by(step) {
        painter.span(y, x0, x1, color);
    }
}

/// A `cols`×`rows` array of filled blocks separated by `gap` pixels.
#[allow(clippy::too_many_arguments)]
pub fn draw_blocks(
    painter: &mut Painter<'_>,
    origin: Point,
    block_width: i16,
    block_height: i16,
    cols: u16,
    rows: u16,
    gap: i16,
    color: Color332,
) {
    let (bw, bh, gap) = (block_width as i32, block_height as i32, gap as i32);
    let clip = painter.clip();
    for row in 0..rows as i32 {
        let y = origin.y as i32 + row * (bh + gap);
        if y > clip.max_y {
            break;
        }
        for col in 0..cols as i32 {
            let x = origin.x as i32 + col * (bw + gap);
            if x > clip.max_x {
                break;
            }
            painter.block(x, y, bw, bh, color);
        }
    }
}
