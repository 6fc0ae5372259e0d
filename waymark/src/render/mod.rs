//! Command renderer.
//!
//! Turns decoded tile commands into 8-bit rasters. Filling uses an even-odd
//! scanline algorithm with fast paths for triangles and axis-aligned
//! rectangles; strokes are Bresenham lines with a square brush for wide
//! roads. The [`Renderer`] paints the five layers in fixed order.

pub mod fill;
mod painter;
mod placeholder;
mod raster;
mod renderer;
pub mod stroke;

pub use painter::Painter;
pub use placeholder::{generate_placeholder, no_data_raster};
pub use raster::Raster;
pub use renderer::{execute, RenderConfig, RenderStats, Renderer};
