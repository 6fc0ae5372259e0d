//! Opcode numbering. The numeric IDs are the on-disk format.

use std::fmt;

/// Every opcode the tile format defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Line = 0x01,
    Polyline = 0x02,
    StrokePolygon = 0x03,
    StrokePolygons = 0x04,
    HorizontalLine = 0x05,
    VerticalLine = 0x06,
    SetColor = 0x80,
    SetColorIndex = 0x81,
    Rectangle = 0x82,
    StraightLine = 0x83,
    Highway = 0x84,
    GridPattern = 0x85,
    BlockPattern = 0x86,
    Circle = 0x87,
    SetLayer = 0x88,
    RelativeMove = 0x89,
    CompressedPolyline = 0x8b,
    OptimizedPolygon = 0x8c,
    HollowPolygon = 0x8d,
    OptimizedTriangle = 0x8e,
    OptimizedRectangle = 0x8f,
    OptimizedCircle = 0x90,
    SimpleRectangle = 0x96,
    SimpleCircle = 0x97,
    SimpleTriangle = 0x98,
    DashedLine = 0x99,
    DottedLine = 0x9a,
}

impl Opcode {
    pub fn from_id(id: u64) -> Option<Self> {
        let op = match id {
            0x01 => Opcode::Line,
            0x02 => Opcode::Polyline,
            0x03 => Opcode::StrokePolygon,
            0x04 => Opcode::StrokePolygons,
            0x05 => Opcode::HorizontalLine,
            0x06 => Opcode::VerticalLine,
            0x80 => Opcode::SetColor,
            0x81 => Opcode::SetColorIndex,
            0x82 => Opcode::Rectangle,
            0x83 => Opcode::StraightLine,
            0x84 => Opcode::Highway,
            0x85 => Opcode::GridPattern,
            0x86 => Opcode::BlockPattern,
            0x87 => Opcode::Circle,
            0x88 => Opcode::SetLayer,
            0x89 => Opcode::RelativeMove,
            0x8b => Opcode::CompressedPolyline,
            0x8c => Opcode::OptimizedPolygon,
            0x8d => Opcode::HollowPolygon,
            0x8e => Opcode::OptimizedTriangle,
            0x8f => Opcode::OptimizedRectangle,
            0x90 => Opcode::OptimizedCircle,
            0x96 => Opcode::SimpleRectangle,
            0x97 => Opcode::SimpleCircle,
            0x98 => Opcode::SimpleTriangle,
            0x99 => Opcode::DashedLine,
            0x9a => Opcode::DottedLine,
            _ => return None,
        };
        Some(op)
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// State-only opcodes change decoder state and draw nothing.
    pub fn is_state(self) -> bool {
        matches!(
            self,
            Opcode::SetColor | Opcode::SetColorIndex | Opcode::SetLayer | Opcode::RelativeMove
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:#04x})", self, self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for id in 0u64..=0xff {
            if let Some(op) = Opcode::from_id(id) {
                assert_eq!(op.id() as u64, id);
            }
        }
    }

    #[test]
    fn test_gaps_are_unknown() {
        assert_eq!(Opcode::from_id(0x00), None);
        assert_eq!(Opcode::from_id(0x07), None);
        assert_eq!(Opcode::from_id(0x8a), None);
        assert_eq!(Opcode::from_id(0x91), None);
        assert_eq!(Opcode::from_id(0x9b), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::SetLayer.to_string(), "SetLayer(0x88)");
    }
}
