//! Layered command execution.

use tracing::trace;

use crate::codec::{Color332, DecodedTile, DrawCommand, Layer, LayeredCommand, PixelRect};

use super::fill::{fill_polygon, fill_rect, fill_triangle};
use super::stroke::{
    draw_blocks, draw_circle, draw_dashed, draw_dotted, draw_grid, draw_line, draw_polyline,
    stroke_rect, stroke_ring, stroke_triangle,
};
use super::{Painter, Raster};

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Skip shapes whose bounding box misses the clip region.
    pub cull: bool,
    /// Color a tile raster is cleared to before painting.
    pub background: Color332,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cull: true,
            background: Color332::BACKGROUND,
        }
    }
}

/// Counters from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    pub culled: usize,
}

/// Paints decoded commands layer by layer.
///
/// Commands are bucketed by [`Layer`] and the buckets run in layer order,
/// so roads land on top of buildings no matter where they sit in the file.
/// Within a layer, file order is kept.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders a decoded tile into a fresh 256×256 raster.
    pub fn render(&self, tile: &DecodedTile) -> Raster {
        let mut raster = Raster::tile(self.config.background);
        let stats = self.render_commands(&tile.commands, &mut Painter::new(&mut raster));
        trace!(
            drawn = stats.drawn,
            culled = stats.culled,
            skipped = tile.skipped,
            "rendered tile"
        );
        raster
    }

    /// Paints commands through `painter`, honoring its clip region.
    pub fn render_commands(
        &self,
        commands: &[LayeredCommand],
        painter: &mut Painter<'_>,
    ) -> RenderStats {
        let mut buckets: [Vec<&DrawCommand>; Layer::COUNT] = Default::default();
        for cmd in commands {
            buckets[cmd.layer.index()].push(&cmd.command);
        }

        let clip = painter.clip();
        let mut stats = RenderStats::default();
        for bucket in &buckets {
            for command in bucket {
                if self.config.cull && !command.bounds().intersects(&clip) {
                    stats.culled += 1;
                    continue;
                }
                execute(painter, command);
                stats.drawn += 1;
            }
        }
        stats
    }

    /// Renders into a sub-region of an existing raster.
    pub fn render_clipped(
        &self,
        commands: &[LayeredCommand],
        raster: &mut Raster,
        clip: PixelRect,
    ) -> RenderStats {
        self.render_commands(commands, &mut Painter::with_clip(raster, clip))
    }
}

/// Executes a single command.
pub fn execute(painter: &mut Painter<'_>, command: &DrawCommand) {
    match command {
        DrawCommand::Line {
            from,
            to,
            color,
            width,
        } => draw_line(painter, *from, *to, *color, *width),
        DrawCommand::Polyline { points, color } => draw_polyline(painter, points, *color),
        DrawCommand::Polygon {
            rings,
            fill,
            border,
        } => {
            if let Some(fill) = fill {
                fill_polygon(painter, rings, *fill);
            }
            if let Some(border) = border {
                for ring in rings {
                    stroke_ring(painter, ring, *border);
                }
            }
        }
        DrawCommand::Rect {
            origin,
            width,
            height,
            fill,
            border,
            seam_mask,
        } => {
            fill_rect(painter, *origin, *width, *height, *fill);
            stroke_rect(painter, *origin, *width, *height, *seam_mask, *border);
        }
        DrawCommand::Triangle {
            points,
            fill,
            border,
            seam_mask,
        } => {
            fill_triangle(painter, *points, *fill);
            stroke_triangle(painter, points, *seam_mask, *border);
        }
        DrawCommand::Circle {
            center,
            radius,
            fill,
            border,
        } => draw_circle(painter, *center, *radius, Some(*fill), *border),
        DrawCommand::DashedLine {
            from,
            to,
            dash,
            gap,
            color,
        } => draw_dashed(painter, *from, *to, *dash, *gap, *color),
        DrawCommand::DottedLine {
            from,
            to,
            spacing,
            color,
        } => draw_dotted(painter, *from, *to, *spacing, *color),
        DrawCommand::Grid {
            origin,
            width,
            height,
            spacing,
            color,
        } => draw_grid(painter, *origin, *width, *height, *spacing, *color),
        DrawCommand::Blocks {
            origin,
            block_width,
            block_height,
            cols,
            rows,
            gap,
            color,
        } => draw_blocks(
            painter,
            *origin,
            *block_width,
            *block_height,
            *cols,
            *rows,
            *gap,
            *color,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Point, TileDecoder, TileWriter, LOGICAL_PER_PIXEL as PX};

    fn render(bytes: &[u8]) -> Raster {
        let tile = TileDecoder::new().decode(bytes).unwrap();
        Renderer::default().render(&tile)
    }

    #[test]
    fn test_background_cleared() {
        let raster = render(&TileWriter::new().circle(128 * PX, 128 * PX, 2 * PX).finish());
        assert_eq!(raster.get(0, 0), Some(Color332::BACKGROUND));
        assert_eq!(raster.get(128, 128), Some(Color332::BLACK));
    }

    #[test]
    fn test_layer_order_beats_file_order() {
        // Road written first, water over the same pixels second.
        let bytes = TileWriter::new()
            .set_layer(Layer::Roads)
            .set_color(Color332::RED)
            .highway(20 * PX, 50 * PX, 200 * PX, 50 * PX, 3)
            .set_layer(Layer::Water)
            .set_color(Color332::BLUE)
            .rectangle(10 * PX, 10 * PX, 100 * PX, 100 * PX)
            .finish();
        let raster = render(&bytes);
        assert_eq!(raster.get(60, 50), Some(Color332::RED));
        assert_eq!(raster.get(60, 80), Some(Color332::BLUE));
    }

    #[test]
    fn test_same_layer_keeps_file_order() {
        let bytes = TileWriter::new()
            .set_color(Color332::RED)
            .rectangle(10 * PX, 10 * PX, 50 * PX, 50 * PX)
            .set_color(Color332::GREEN)
            .rectangle(20 * PX, 20 * PX, 10 * PX, 10 * PX)
            .finish();
        let raster = render(&bytes);
        assert_eq!(raster.get(25, 25), Some(Color332::GREEN));
        assert_eq!(raster.get(40, 40), Some(Color332::RED));
    }

    #[test]
    fn test_culling_counts() {
        let commands = vec![
            LayeredCommand {
                layer: Layer::Terrain,
                command: DrawCommand::Circle {
                    center: Point::new(10, 10),
                    radius: 3,
                    fill: Color332::RED,
                    border: Color332::RED,
                },
            },
            LayeredCommand {
                layer: Layer::Terrain,
                command: DrawCommand::Circle {
                    center: Point::new(200, 200),
                    radius: 3,
                    fill: Color332::RED,
                    border: Color332::RED,
                },
            },
        ];
        let mut raster = Raster::tile(Color332::BLACK);
        let stats = Renderer::default().render_clipped(
            &commands,
            &mut raster,
            PixelRect::new(0, 0, 63, 63),
        );
        assert_eq!(stats, RenderStats { drawn: 1, culled: 1 });

        let no_cull = Renderer::new(RenderConfig {
            cull: false,
            ..Default::default()
        });
        let stats = no_cull.render_clipped(&commands, &mut raster, PixelRect::new(0, 0, 63, 63));
        assert_eq!(stats, RenderStats { drawn: 2, culled: 0 });
        assert_eq!(raster.get(200, 200), Some(Color332::BLACK));
    }

    #[test]
    fn test_seam_edges_not_stroked() {
        // Full-tile rectangle: fill everywhere, no darker border on the seams.
        let bytes = TileWriter::new()
            .set_color(Color332::GREEN)
            .rectangle(0, 0, 256 * PX, 256 * PX)
            .finish();
        let raster = render(&bytes);
        assert_eq!(raster.count(Color332::GREEN), 256 * 256);
    }
}
