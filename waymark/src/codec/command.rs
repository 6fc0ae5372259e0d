//! Decoded drawing commands in tile pixel space.

use std::fmt;

use super::Color332;

/// Most points a polygon ring may carry.
pub const MAX_RING_POINTS: usize = 32;

/// Most rings a multi-ring polygon may carry.
pub const MAX_RINGS: usize = 8;

/// Draw layer. Paint order is layer order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Layer {
    Terrain = 0,
    Water = 1,
    Buildings = 2,
    Outlines = 3,
    Roads = 4,
}

impl Layer {
    /// All layers in paint order.
    pub const ALL: [Layer; 5] = [
        Layer::Terrain,
        Layer::Water,
        Layer::Buildings,
        Layer::Outlines,
        Layer::Roads,
    ];

    /// Number of layers.
    pub const COUNT: usize = 5;

    pub fn from_id(id: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(id).ok()?).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Terrain => "terrain",
            Layer::Water => "water",
            Layer::Buildings => "buildings",
            Layer::Outlines => "outlines",
            Layer::Roads => "roads",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pixel position. Decoded coordinates are clamped to `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    #[inline]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl PixelRect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a point set; `None` when empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = PixelRect::new(
            first.x as i32,
            first.y as i32,
            first.x as i32,
            first.y as i32,
        );
        for p in iter {
            rect.min_x = rect.min_x.min(p.x as i32);
            rect.min_y = rect.min_y.min(p.y as i32);
            rect.max_x = rect.max_x.max(p.x as i32);
            rect.max_y = rect.max_y.max(p.y as i32);
        }
        Some(rect)
    }

    /// Grows the rectangle by `by` pixels on every side.
    pub fn inflate(self, by: i32) -> Self {
        PixelRect::new(
            self.min_x - by,
            self.min_y - by,
            self.max_x + by,
            self.max_y + by,
        )
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }
}

/// One closed polygon ring with its border-suppression mask.
///
/// Bit `i` of `seam_mask` marks the edge from point `i` to point `i + 1`
/// (wrapping) as lying on a tile seam; such edges are filled but not stroked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ring {
    pub points: heapless::Vec<Point, MAX_RING_POINTS>,
    pub seam_mask: u32,
}

impl Ring {
    /// Whether edge `i` should be stroked.
    #[inline]
    pub fn edge_visible(&self, i: usize) -> bool {
        self.seam_mask & (1 << i) == 0
    }
}

/// A drawing primitive in pixel space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Straight segment; `width` above 1 draws a wide road.
    Line {
        from: Point,
        to: Point,
        color: Color332,
        width: u8,
    },
    /// Open polyline.
    Polyline {
        points: Vec<Point>,
        color: Color332,
    },
    /// One or more rings filled together with the even-odd rule.
    Polygon {
        rings: Vec<Ring>,
        fill: Option<Color332>,
        border: Option<Color332>,
    },
    /// Axis-aligned rectangle. `seam_mask` bits: top, right, bottom, left.
    Rect {
        origin: Point,
        width: i16,
        height: i16,
        fill: Color332,
        border: Color332,
        seam_mask: u8,
    },
    /// Filled triangle. `seam_mask` bit `i` is the edge from vertex `i`.
    Triangle {
        points: [Point; 3],
        fill: Color332,
        border: Color332,
        seam_mask: u8,
    },
    Circle {
        center: Point,
        radius: i16,
        fill: Color332,
        border: Color332,
    },
    DashedLine {
        from: Point,
        to: Point,
        dash: u8,
        gap: u8,
        color: Color332,
    },
    DottedLine {
        from: Point,
        to: Point,
        spacing: u8,
        color: Color332,
    },
    /// Grid of horizontal and vertical lines inside a rectangle.
    Grid {
        origin: Point,
        width: i16,
        height: i16,
        spacing: i16,
        color: Color332,
    },
    /// `cols` × `rows` filled blocks separated by `gap`.
    Blocks {
        origin: Point,
        block_width: i16,
        block_height: i16,
        cols: u16,
        rows: u16,
        gap: i16,
        color: Color332,
    },
}

impl DrawCommand {
    /// Short name for logs and inspection output.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Line { .. } => "line",
            DrawCommand::Polyline { .. } => "polyline",
            DrawCommand::Polygon { .. } => "polygon",
            DrawCommand::Rect { .. } => "rect",
            DrawCommand::Triangle { .. } => "triangle",
            DrawCommand::Circle { .. } => "circle",
            DrawCommand::DashedLine { .. } => "dashed-line",
            DrawCommand::DottedLine { .. } => "dotted-line",
            DrawCommand::Grid { .. } => "grid",
            DrawCommand::Blocks { .. } => "blocks",
        }
    }

    /// Pixel bounding box covering everything the command may paint.
    pub fn bounds(&self) -> PixelRect {
        let point_rect = |p: &Point| PixelRect::new(p.x as i32, p.y as i32, p.x as i32, p.y as i32);
        match self {
            DrawCommand::Line {
                from, to, width, ..
            } => PixelRect::bounding([*from, *to])
                .unwrap_or_else(|| point_rect(from))
                .inflate(*width as i32 / 2),
            DrawCommand::DashedLine { from, to, .. } | DrawCommand::DottedLine { from, to, .. } => {
                PixelRect::bounding([*from, *to]).unwrap_or_else(|| point_rect(from))
            }
            DrawCommand::Polyline { points, .. } => {
                PixelRect::bounding(points.iter().copied()).unwrap_or(PixelRect::new(0, 0, -1, -1))
            }
            DrawCommand::Polygon { rings, .. } => {
                PixelRect::bounding(rings.iter().flat_map(|r| r.points.iter().copied()))
                    .unwrap_or(PixelRect::new(0, 0, -1, -1))
            }
            DrawCommand::Triangle { points, .. } => {
                PixelRect::bounding(points.iter().copied()).unwrap_or_else(|| point_rect(&points[0]))
            }
            DrawCommand::Rect {
                origin,
                width,
                height,
                ..
            }
            | DrawCommand::Grid {
                origin,
                width,
                height,
                ..
            } => PixelRect::new(
                origin.x as i32,
                origin.y as i32,
                origin.x as i32 + *width as i32 - 1,
                origin.y as i32 + *height as i32 - 1,
            ),
            DrawCommand::Circle { center, radius, .. } => {
                point_rect(center).inflate(*radius as i32)
            }
            DrawCommand::Blocks {
                origin,
                block_width,
                block_height,
                cols,
                rows,
                gap,
                ..
            } => {
                let w = *cols as i32 * (*block_width as i32 + *gap as i32) - *gap as i32;
                let h = *rows as i32 * (*block_height as i32 + *gap as i32) - *gap as i32;
                PixelRect::new(
                    origin.x as i32,
                    origin.y as i32,
                    origin.x as i32 + w - 1,
                    origin.y as i32 + h - 1,
                )
            }
        }
    }
}

/// A command tagged with the layer it paints on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredCommand {
    pub layer: Layer,
    pub command: DrawCommand,
}
