//! Tile stream decoder.
//!
//! A tile is an unsigned varint command count followed by that many
//! commands. Every command is an opcode varint plus its operands; see
//! [`Opcode`] for the numbering. Coordinates live in a 0..65535 logical
//! space and are rescaled to 256 pixels on decode.
//!
//! Errors inside a command are contained: a malformed command is skipped
//! once its operands are consumed, a truncated one ends the stream. Only a
//! stream that yields no drawable command at all fails as a whole.

use std::sync::Arc;

use tracing::debug;

use super::command::{DrawCommand, Layer, LayeredCommand, Point, Ring, MAX_RINGS};
use super::opcode::Opcode;
use super::seam::{
    is_seam_edge, rect_seam_mask, ring_seam_mask, split_polyline, triangle_seam_mask,
};
use super::varint::ByteReader;
use super::{CodecError, Color332, Palette};

/// Logical units per output pixel (65536 / 256).
pub const LOGICAL_PER_PIXEL: i64 = 256;

/// Largest line width the format allows.
pub const MAX_LINE_WIDTH: u64 = 8;

/// Most blocks per axis in a block pattern.
const MAX_BLOCKS_PER_AXIS: u64 = 256;

/// Upper bound on pre-allocation from an untrusted command count.
const MAX_PREALLOC: usize = 4096;

/// Maps a logical coordinate to a pixel index in `0..=255`.
#[inline]
fn to_px(v: i64) -> i16 {
    (v.saturating_mul(256) / 65536).clamp(0, 255) as i16
}

/// Maps a logical coordinate to an exclusive pixel end in `0..=256`.
#[inline]
fn to_px_end(v: i64) -> i16 {
    (v.saturating_mul(256) / 65536).clamp(0, 256) as i16
}

/// Maps a logical length to pixels, never below one.
#[inline]
fn len_to_px(v: u64) -> i16 {
    (v / LOGICAL_PER_PIXEL as u64).clamp(1, 256) as i16
}

/// Result of decoding one tile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedTile {
    /// Drawable commands in file order, each tagged with its layer.
    pub commands: Vec<LayeredCommand>,
    /// Command count declared in the header.
    pub declared: u64,
    /// Commands dropped because they were malformed.
    pub skipped: usize,
    /// Shapes that decoded cleanly but lay entirely on a tile seam.
    pub suppressed: usize,
    /// Set when the stream ended before the declared count was reached.
    pub truncated: bool,
}

/// Mutable decoder state, reset for every tile.
#[derive(Debug)]
struct DecodeState {
    color: Color332,
    layer: Layer,
    cursor_x: i64,
    cursor_y: i64,
}

impl Default for DecodeState {
    fn default() -> Self {
        Self {
            color: Color332::BLACK,
            layer: Layer::Terrain,
            cursor_x: 0,
            cursor_y: 0,
        }
    }
}

/// What one command produced.
enum Step {
    /// State change only.
    State,
    /// Shapes to emit (possibly none when every part lay on a seam).
    Draw(Vec<DrawCommand>),
}

/// Decodes tile command streams.
///
/// The decoder holds the palette used by `SetColorIndex`; everything else is
/// per-call state, so one decoder may be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TileDecoder {
    palette: Option<Arc<Palette>>,
}

impl TileDecoder {
    /// Creates a decoder without a palette. Indexed colors will be rejected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: Arc<Palette>) -> Self {
        Self {
            palette: Some(palette),
        }
    }

    pub fn palette(&self) -> Option<&Arc<Palette>> {
        self.palette.as_ref()
    }

    /// Decodes a whole tile.
    ///
    /// # Errors
    ///
    /// [`CodecError::Truncated`] when even the command count is missing, and
    /// [`CodecError::Empty`] when no drawable command survives.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedTile, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let declared = reader.read_uvarint()?;
        let mut tile = DecodedTile {
            commands: Vec::with_capacity((declared as usize).min(MAX_PREALLOC)),
            declared,
            ..Default::default()
        };
        let mut state = DecodeState::default();
        let mut drawable = 0usize;

        for index in 0..declared {
            let offset = reader.position();
            let id = match reader.read_uvarint() {
                Ok(id) => id,
                Err(err) => {
                    debug!(index, error = %err, "tile stream ended early");
                    tile.truncated = true;
                    break;
                }
            };
            let Some(opcode) = Opcode::from_id(id) else {
                let err = CodecError::UnknownOpcode { opcode: id, offset };
                debug!(index, error = %err, "stopping at unknown opcode");
                tile.skipped += 1;
                break;
            };

            match self.decode_command(opcode, &mut reader, &mut state) {
                Ok(Step::State) => {}
                Ok(Step::Draw(shapes)) => {
                    drawable += 1;
                    if shapes.is_empty() {
                        tile.suppressed += 1;
                    }
                    tile.commands.extend(shapes.into_iter().map(|command| LayeredCommand {
                        layer: state.layer,
                        command,
                    }));
                }
                Err(err) if err.is_recoverable() => {
                    debug!(index, %opcode, error = %err, "skipping malformed command");
                    tile.skipped += 1;
                }
                Err(err) => {
                    debug!(index, %opcode, error = %err, "tile stream truncated");
                    tile.skipped += 1;
                    tile.truncated = true;
                    break;
                }
            }
        }

        if drawable == 0 {
            return Err(CodecError::Empty);
        }
        Ok(tile)
    }

    fn decode_command(
        &self,
        opcode: Opcode,
        r: &mut ByteReader<'_>,
        state: &mut DecodeState,
    ) -> Result<Step, CodecError> {
        let offset = r.position();
        let malformed = |reason: &'static str| CodecError::Malformed { offset, reason };
        let color = state.color;

        let shapes = match opcode {
            Opcode::SetColor => {
                state.color = Color332(r.read_u8()?);
                return Ok(Step::State);
            }
            Opcode::SetColorIndex => {
                let index = r.read_uvarint()?;
                let palette = self.palette.as_ref().ok_or(malformed("no palette loaded"))?;
                state.color = usize::try_from(index)
                    .ok()
                    .and_then(|i| palette.get(i))
                    .ok_or(malformed("palette index out of range"))?;
                return Ok(Step::State);
            }
            Opcode::SetLayer => {
                let id = r.read_uvarint()?;
                state.layer = Layer::from_id(id).ok_or(malformed("layer id out of range"))?;
                return Ok(Step::State);
            }
            Opcode::RelativeMove => {
                let dx = r.read_zigzag()?;
                let dy = r.read_zigzag()?;
                state.cursor_x = state.cursor_x.saturating_add(dx);
                state.cursor_y = state.cursor_y.saturating_add(dy);
                return Ok(Step::State);
            }

            Opcode::Line | Opcode::StraightLine => {
                let (from, to) = read_segment(r, state)?;
                line_shapes(from, to, color, 1)
            }
            Opcode::HorizontalLine => {
                let (x, y) = read_abs(r, state)?;
                let dx = r.read_zigzag()?;
                line_shapes(
                    Point::new(to_px(x), to_px(y)),
                    Point::new(to_px(x.saturating_add(dx)), to_px(y)),
                    color,
                    1,
                )
            }
            Opcode::VerticalLine => {
                let (x, y) = read_abs(r, state)?;
                let dy = r.read_zigzag()?;
                line_shapes(
                    Point::new(to_px(x), to_px(y)),
                    Point::new(to_px(x), to_px(y.saturating_add(dy))),
                    color,
                    1,
                )
            }
            Opcode::Highway => {
                let (from, to) = read_segment(r, state)?;
                let width = r.read_uvarint()?;
                if !(1..=MAX_LINE_WIDTH).contains(&width) {
                    return Err(malformed("highway width outside 1..=8"));
                }
                line_shapes(from, to, color, width as u8)
            }
            Opcode::DashedLine => {
                let (from, to) = read_segment(r, state)?;
                let dash = r.read_uvarint()?;
                let gap = r.read_uvarint()?;
                let dash = pattern_px(dash).ok_or(malformed("dash length outside 1..=255"))?;
                let gap = pattern_px(gap).ok_or(malformed("gap length outside 1..=255"))?;
                if is_seam_edge(from, to) {
                    Vec::new()
                } else {
                    vec![DrawCommand::DashedLine {
                        from,
                        to,
                        dash,
                        gap,
                        color,
                    }]
                }
            }
            Opcode::DottedLine => {
                let (from, to) = read_segment(r, state)?;
                let spacing = r.read_uvarint()?;
                let spacing =
                    pattern_px(spacing).ok_or(malformed("dot spacing outside 1..=255"))?;
                if is_seam_edge(from, to) {
                    Vec::new()
                } else {
                    vec![DrawCommand::DottedLine {
                        from,
                        to,
                        spacing,
                        color,
                    }]
                }
            }

            Opcode::Polyline | Opcode::CompressedPolyline => {
                let n = r.read_uvarint()?;
                let points = read_points(r, state, n, true)?;
                if n < 2 {
                    return Err(malformed("polyline needs at least 2 points"));
                }
                split_polyline(&points)
                    .into_iter()
                    .map(|points| DrawCommand::Polyline { points, color })
                    .collect()
            }

            Opcode::StrokePolygon | Opcode::OptimizedPolygon | Opcode::HollowPolygon => {
                let n = r.read_uvarint()?;
                let delta = opcode == Opcode::OptimizedPolygon;
                let ring = read_ring(r, state, n, delta).map_err(|e| relocate(e, offset))?;
                let (fill, border) = if opcode == Opcode::HollowPolygon {
                    (None, Some(color))
                } else {
                    (Some(color), Some(color.border()))
                };
                vec![DrawCommand::Polygon {
                    rings: vec![ring],
                    fill,
                    border,
                }]
            }
            Opcode::StrokePolygons => {
                let count = r.read_uvarint()?;
                if !(1..=MAX_RINGS as u64).contains(&count) {
                    return Err(malformed("ring count outside 1..=8"));
                }
                let mut rings = Vec::with_capacity(count as usize);
                let mut bad_ring = None;
                for _ in 0..count {
                    let n = r.read_uvarint()?;
                    match read_ring(r, state, n, true) {
                        Ok(ring) => rings.push(ring),
                        Err(err) if err.is_recoverable() => bad_ring = Some(err),
                        Err(err) => return Err(err),
                    }
                }
                if let Some(err) = bad_ring {
                    return Err(relocate(err, offset));
                }
                vec![DrawCommand::Polygon {
                    rings,
                    fill: Some(color),
                    border: Some(color.border()),
                }]
            }

            Opcode::OptimizedTriangle | Opcode::SimpleTriangle => {
                let mut points = [Point::default(); 3];
                for p in points.iter_mut() {
                    let (x, y) = read_abs(r, state)?;
                    *p = Point::new(to_px(x), to_px(y));
                }
                vec![DrawCommand::Triangle {
                    points,
                    fill: color,
                    border: color.border(),
                    seam_mask: triangle_seam_mask(&points),
                }]
            }

            Opcode::Rectangle | Opcode::OptimizedRectangle | Opcode::SimpleRectangle => {
                let (x, y) = read_abs(r, state)?;
                let w = r.read_uvarint()?;
                let h = r.read_uvarint()?;
                if w == 0 || h == 0 {
                    return Err(malformed("zero-sized rectangle"));
                }
                let (origin, width, height) = rect_px(x, y, w, h);
                vec![DrawCommand::Rect {
                    origin,
                    width,
                    height,
                    fill: color,
                    border: color.border(),
                    seam_mask: rect_seam_mask(origin, width, height),
                }]
            }

            Opcode::Circle | Opcode::OptimizedCircle | Opcode::SimpleCircle => {
                let (cx, cy) = read_abs(r, state)?;
                let radius = r.read_uvarint()?;
                if radius == 0 {
                    return Err(malformed("zero-radius circle"));
                }
                vec![DrawCommand::Circle {
                    center: Point::new(to_px(cx), to_px(cy)),
                    radius: len_to_px(radius),
                    fill: color,
                    border: color.border(),
                }]
            }

            Opcode::GridPattern => {
                let (x, y) = read_abs(r, state)?;
                let w = r.read_uvarint()?;
                let h = r.read_uvarint()?;
                let spacing = r.read_uvarint()?;
                if w == 0 || h == 0 {
                    return Err(malformed("zero-sized grid"));
                }
                if spacing == 0 {
                    return Err(malformed("grid spacing must be positive"));
                }
                let (origin, width, height) = rect_px(x, y, w, h);
                vec![DrawCommand::Grid {
                    origin,
                    width,
                    height,
                    spacing: len_to_px(spacing),
                    color,
                }]
            }

            Opcode::BlockPattern => {
                let (x, y) = read_abs(r, state)?;
                let bw = r.read_uvarint()?;
                let bh = r.read_uvarint()?;
                let cols = r.read_uvarint()?;
                let rows = r.read_uvarint()?;
                let gap = r.read_uvarint()?;
                if bw == 0 || bh == 0 {
                    return Err(malformed("zero-sized block"));
                }
                if !(1..=MAX_BLOCKS_PER_AXIS).contains(&cols)
                    || !(1..=MAX_BLOCKS_PER_AXIS).contains(&rows)
                {
                    return Err(malformed("block pattern dimensions outside 1..=256"));
                }
                vec![DrawCommand::Blocks {
                    origin: Point::new(to_px(x), to_px(y)),
                    block_width: len_to_px(bw),
                    block_height: len_to_px(bh),
                    cols: cols as u16,
                    rows: rows as u16,
                    gap: (gap / LOGICAL_PER_PIXEL as u64).min(256) as i16,
                    color,
                }]
            }
        };

        Ok(Step::Draw(shapes))
    }
}

/// Reads an absolute coordinate pair and applies the cursor.
fn read_abs(r: &mut ByteReader<'_>, state: &DecodeState) -> Result<(i64, i64), CodecError> {
    let x = r.read_zigzag()?;
    let y = r.read_zigzag()?;
    Ok((
        x.saturating_add(state.cursor_x),
        y.saturating_add(state.cursor_y),
    ))
}

/// Reads `x1,y1` absolute followed by a `dx,dy` delta.
fn read_segment(r: &mut ByteReader<'_>, state: &DecodeState) -> Result<(Point, Point), CodecError> {
    let (x, y) = read_abs(r, state)?;
    let dx = r.read_zigzag()?;
    let dy = r.read_zigzag()?;
    Ok((
        Point::new(to_px(x), to_px(y)),
        Point::new(to_px(x.saturating_add(dx)), to_px(y.saturating_add(dy))),
    ))
}

/// Reads `n` points, either all absolute or first-absolute-then-deltas.
///
/// Always consumes every operand so the stream stays aligned.
fn read_points(
    r: &mut ByteReader<'_>,
    state: &DecodeState,
    n: u64,
    delta: bool,
) -> Result<Vec<Point>, CodecError> {
    let mut points = Vec::with_capacity((n as usize).min(MAX_PREALLOC));
    let (mut x, mut y) = (0i64, 0i64);
    for i in 0..n {
        if i == 0 || !delta {
            (x, y) = read_abs(r, state)?;
        } else {
            x = x.saturating_add(r.read_zigzag()?);
            y = y.saturating_add(r.read_zigzag()?);
        }
        points.push(Point::new(to_px(x), to_px(y)));
    }
    Ok(points)
}

/// Reads one polygon ring of `n` points and validates its size.
fn read_ring(
    r: &mut ByteReader<'_>,
    state: &DecodeState,
    n: u64,
    delta: bool,
) -> Result<Ring, CodecError> {
    let offset = r.position();
    let points = read_points(r, state, n, delta)?;
    if n < 3 {
        return Err(CodecError::Malformed {
            offset,
            reason: "polygon needs at least 3 points",
        });
    }
    let seam_mask = ring_seam_mask(&points);
    let points = heapless::Vec::from_slice(&points).map_err(|_| CodecError::Malformed {
        offset,
        reason: "polygon ring exceeds 32 points",
    })?;
    Ok(Ring { points, seam_mask })
}

/// Reports a ring error at the offset of the command that owns it.
fn relocate(err: CodecError, offset: usize) -> CodecError {
    match err {
        CodecError::Malformed { reason, .. } => CodecError::Malformed { offset, reason },
        other => other,
    }
}

fn line_shapes(from: Point, to: Point, color: Color332, width: u8) -> Vec<DrawCommand> {
    if is_seam_edge(from, to) {
        return Vec::new();
    }
    vec![DrawCommand::Line {
        from,
        to,
        color,
        width,
    }]
}

fn pattern_px(v: u64) -> Option<u8> {
    u8::try_from(v).ok().filter(|&v| v >= 1)
}

fn rect_px(x: i64, y: i64, w: u64, h: u64) -> (Point, i16, i16) {
    let w = i64::try_from(w).unwrap_or(i64::MAX);
    let h = i64::try_from(h).unwrap_or(i64::MAX);
    let origin = Point::new(to_px(x), to_px(y));
    let width = (to_px_end(x.saturating_add(w)) - origin.x).max(1);
    let height = (to_px_end(y.saturating_add(h)) - origin.y).max(1);
    (origin, width, height)
}
