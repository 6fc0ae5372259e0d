//! Binary vector-tile codec.
//!
//! A tile file is a compact command stream: a varint command count followed
//! by opcodes whose operands are unsigned varints (counts and lengths) or
//! zig-zag varints (coordinates and deltas). Decoding produces pixel-space
//! [`DrawCommand`]s tagged with one of five [`Layer`]s; the renderer paints
//! them layer by layer.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use waymark::codec::{Color332, Palette, TileDecoder, TileWriter, LOGICAL_PER_PIXEL as PX};
//!
//! let palette = Arc::new(Palette::from_rgb(&[(0, 0, 0), (0, 0, 0), (255, 0, 0)]));
//! let bytes = TileWriter::new()
//!     .set_color_index(2)
//!     .stroke_polygon(&[(10 * PX, 10 * PX), (60 * PX, 10 * PX), (60 * PX, 60 * PX)])
//!     .finish();
//!
//! let tile = TileDecoder::with_palette(palette).decode(&bytes).unwrap();
//! assert_eq!(tile.commands.len(), 1);
//! ```

mod color;
mod command;
mod decoder;
mod error;
mod opcode;
mod palette;
mod seam;
mod varint;
mod writer;

pub use color::Color332;
pub use command::{
    DrawCommand, Layer, LayeredCommand, PixelRect, Point, Ring, MAX_RINGS, MAX_RING_POINTS,
};
pub use decoder::{DecodedTile, TileDecoder, LOGICAL_PER_PIXEL, MAX_LINE_WIDTH};
pub use error::CodecError;
pub use opcode::Opcode;
pub use palette::{Palette, MAX_PALETTE_ENTRIES};
pub use seam::{is_seam_edge, SEAM_TOLERANCE};
pub use varint::{write_uvarint, write_zigzag, zigzag_decode, zigzag_encode, ByteReader};
pub use writer::TileWriter;
