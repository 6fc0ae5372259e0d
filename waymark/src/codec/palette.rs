//! Palette file parsing.
//!
//! Layout: a little-endian `u32` entry count followed by that many RGB
//! triples. Entries are truncated to 3-3-2 on load.

use super::varint::ByteReader;
use super::{CodecError, Color332};

/// Most entries a palette may hold (indices are single bytes on the device).
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Indexed colors used by `SetColorIndex`. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color332>,
}

impl Palette {
    /// Parses a palette file image.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let count = reader.read_u32_le()? as usize;
        if count > MAX_PALETTE_ENTRIES {
            return Err(CodecError::Malformed {
                offset: 0,
                reason: "palette holds more than 256 entries",
            });
        }
        let raw = reader.read_bytes(count * 3)?;
        let colors = raw
            .chunks_exact(3)
            .map(|rgb| Color332::from_rgb(rgb[0], rgb[1], rgb[2]))
            .collect();
        Ok(Self { colors })
    }

    /// Builds a palette from 8-bit RGB triples (truncating like [`Palette::parse`]).
    pub fn from_rgb(entries: &[(u8, u8, u8)]) -> Self {
        Self {
            colors: entries
                .iter()
                .take(MAX_PALETTE_ENTRIES)
                .map(|&(r, g, b)| Color332::from_rgb(r, g, b))
                .collect(),
        }
    }

    /// Serializes 8-bit RGB triples into the palette file layout.
    pub fn encode(entries: &[(u8, u8, u8)]) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + entries.len() * 3);
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for &(r, g, b) in entries {
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }

    pub fn get(&self, index: usize) -> Option<Color332> {
        self.colors.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
