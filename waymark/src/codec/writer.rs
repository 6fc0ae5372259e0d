//! Tile stream writer.
//!
//! Emits the format [`TileDecoder`](super::TileDecoder) reads. Coordinates
//! are logical (0..65535 per tile); multiply pixel values by
//! [`LOGICAL_PER_PIXEL`](super::LOGICAL_PER_PIXEL) to place them exactly.
//!
//! ```
//! use waymark::codec::{Color332, Layer, TileDecoder, TileWriter, LOGICAL_PER_PIXEL as PX};
//!
//! let bytes = TileWriter::new()
//!     .set_layer(Layer::Water)
//!     .set_color(Color332::BLUE)
//!     .rectangle(10 * PX, 10 * PX, 50 * PX, 20 * PX)
//!     .finish();
//! let tile = TileDecoder::new().decode(&bytes).unwrap();
//! assert_eq!(tile.commands.len(), 1);
//! ```

use super::opcode::Opcode;
use super::varint::{write_uvarint, write_zigzag};
use super::{Color332, Layer};

/// Builder for a tile command stream.
#[derive(Debug, Clone, Default)]
pub struct TileWriter {
    body: Vec<u8>,
    count: u64,
}

impl TileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Finishes the stream, prefixing the command count.
    pub fn finish(self) -> Vec<u8> {
        let count = self.count;
        self.finish_with_count(count)
    }

    /// Finishes the stream with an explicit header count.
    pub fn finish_with_count(self, count: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 10);
        write_uvarint(&mut out, count);
        out.extend_from_slice(&self.body);
        out
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Starts a command with an arbitrary opcode ID.
    pub fn raw_op(mut self, id: u64) -> Self {
        write_uvarint(&mut self.body, id);
        self.count += 1;
        self
    }

    pub fn op(self, opcode: Opcode) -> Self {
        self.raw_op(opcode.id() as u64)
    }

    pub fn uvarint(mut self, value: u64) -> Self {
        write_uvarint(&mut self.body, value);
        self
    }

    pub fn zigzag(mut self, value: i64) -> Self {
        write_zigzag(&mut self.body, value);
        self
    }

    pub fn byte(mut self, value: u8) -> Self {
        self.body.push(value);
        self
    }

    /// Writes a length; negative values are written as zero.
    fn length(self, value: i64) -> Self {
        self.uvarint(u64::try_from(value).unwrap_or(0))
    }

    fn point(self, x: i64, y: i64) -> Self {
        self.zigzag(x).zigzag(y)
    }

    fn segment(self, x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        self.point(x1, y1).point(x2 - x1, y2 - y1)
    }

    fn abs_points(self, points: &[(i64, i64)]) -> Self {
        points.iter().fold(self, |w, &(x, y)| w.point(x, y))
    }

    fn delta_points(self, points: &[(i64, i64)]) -> Self {
        let mut w = self;
        let mut prev = (0, 0);
        for (i, &(x, y)) in points.iter().enumerate() {
            w = if i == 0 {
                w.point(x, y)
            } else {
                w.point(x - prev.0, y - prev.1)
            };
            prev = (x, y);
        }
        w
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn set_color(self, color: Color332) -> Self {
        self.op(Opcode::SetColor).byte(color.0)
    }

    pub fn set_color_index(self, index: u64) -> Self {
        self.op(Opcode::SetColorIndex).uvarint(index)
    }

    pub fn set_layer(self, layer: Layer) -> Self {
        self.set_layer_id(layer.index() as u64)
    }

    /// Writes a layer ID without checking it.
    pub fn set_layer_id(self, id: u64) -> Self {
        self.op(Opcode::SetLayer).uvarint(id)
    }

    pub fn relative_move(self, dx: i64, dy: i64) -> Self {
        self.op(Opcode::RelativeMove).point(dx, dy)
    }

    // =========================================================================
    // Lines
    // =========================================================================

    pub fn line(self, x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        self.op(Opcode::Line).segment(x1, y1, x2, y2)
    }

    pub fn horizontal_line(self, x1: i64, y: i64, x2: i64) -> Self {
        self.op(Opcode::HorizontalLine).point(x1, y).zigzag(x2 - x1)
    }

    pub fn vertical_line(self, x: i64, y1: i64, y2: i64) -> Self {
        self.op(Opcode::VerticalLine).point(x, y1).zigzag(y2 - y1)
    }

    /// Wide road segment; `width` is in pixels.
    pub fn highway(self, x1: i64, y1: i64, x2: i64, y2: i64, width: u64) -> Self {
        self.op(Opcode::Highway)
            .segment(x1, y1, x2, y2)
            .uvarint(width)
    }

    pub fn dashed_line(self, x1: i64, y1: i64, x2: i64, y2: i64, dash: u64, gap: u64) -> Self {
        self.op(Opcode::DashedLine)
            .segment(x1, y1, x2, y2)
            .uvarint(dash)
            .uvarint(gap)
    }

    pub fn dotted_line(self, x1: i64, y1: i64, x2: i64, y2: i64, spacing: u64) -> Self {
        self.op(Opcode::DottedLine)
            .segment(x1, y1, x2, y2)
            .uvarint(spacing)
    }

    pub fn polyline(self, points: &[(i64, i64)]) -> Self {
        self.op(Opcode::Polyline)
            .uvarint(points.len() as u64)
            .delta_points(points)
    }

    pub fn compressed_polyline(self, points: &[(i64, i64)]) -> Self {
        self.op(Opcode::CompressedPolyline)
            .uvarint(points.len() as u64)
            .delta_points(points)
    }

    // =========================================================================
    // Filled shapes
    // =========================================================================

    /// Filled polygon with every vertex absolute.
    pub fn stroke_polygon(self, points: &[(i64, i64)]) -> Self {
        self.op(Opcode::StrokePolygon)
            .uvarint(points.len() as u64)
            .abs_points(points)
    }

    /// Filled polygon with delta-encoded vertices.
    pub fn optimized_polygon(self, points: &[(i64, i64)]) -> Self {
        self.op(Opcode::OptimizedPolygon)
            .uvarint(points.len() as u64)
            .delta_points(points)
    }

    /// Outline-only polygon.
    pub fn hollow_polygon(self, points: &[(i64, i64)]) -> Self {
        self.op(Opcode::HollowPolygon)
            .uvarint(points.len() as u64)
            .abs_points(points)
    }

    /// Multi-ring polygon filled with the even-odd rule.
    pub fn stroke_polygons(self, rings: &[&[(i64, i64)]]) -> Self {
        let w = self.op(Opcode::StrokePolygons).uvarint(rings.len() as u64);
        rings
            .iter()
            .fold(w, |w, ring| w.uvarint(ring.len() as u64).delta_points(ring))
    }

    pub fn triangle(self, points: [(i64, i64); 3]) -> Self {
        self.op(Opcode::OptimizedTriangle).abs_points(&points)
    }

    pub fn rectangle(self, x: i64, y: i64, w: i64, h: i64) -> Self {
        self.op(Opcode::Rectangle).point(x, y).length(w).length(h)
    }

    pub fn circle(self, cx: i64, cy: i64, radius: i64) -> Self {
        self.op(Opcode::Circle).point(cx, cy).length(radius)
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    pub fn grid(self, x: i64, y: i64, w: i64, h: i64, spacing: i64) -> Self {
        self.op(Opcode::GridPattern)
            .point(x, y)
            .length(w)
            .length(h)
            .length(spacing)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blocks(
        self,
        x: i64,
        y: i64,
        block_w: i64,
        block_h: i64,
        cols: u64,
        rows: u64,
        gap: i64,
    ) -> Self {
        self.op(Opcode::BlockPattern)
            .point(x, y)
            .length(block_w)
            .length(block_h)
            .uvarint(cols)
            .uvarint(rows)
            .length(gap)
    }
}
