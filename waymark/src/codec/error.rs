//! Error types for tile and palette decoding.

use thiserror::Error;

/// Errors that can occur while decoding a tile or palette stream.
///
/// Inside a tile only [`CodecError::Empty`] and a truncated command count
/// reach the caller; every other variant is recovered locally by skipping
/// the command it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Stream ended in the middle of a value.
    #[error("stream truncated at byte {offset}")]
    Truncated { offset: usize },

    /// Operands decoded but describe something invalid.
    #[error("malformed command at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    /// Opcode not in the format; its operand length is unknown.
    #[error("unknown opcode {opcode:#04x} at byte {offset}")]
    UnknownOpcode { opcode: u64, offset: usize },

    /// No drawable command could be decoded ("tile absent").
    #[error("tile contains no drawable commands")]
    Empty,
}

impl CodecError {
    /// Whether decoding can resume with the next command after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CodecError::Malformed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::UnknownOpcode {
            opcode: 0x7f,
            offset: 12,
        };
        assert_eq!(err.to_string(), "unknown opcode 0x7f at byte 12");

        let err = CodecError::Malformed {
            offset: 3,
            reason: "polygon needs at least 3 points",
        };
        assert!(err.to_string().contains("at least 3 points"));
    }

    #[test]
    fn test_only_malformed_is_recoverable() {
        assert!(CodecError::Malformed {
            offset: 0,
            reason: "x"
        }
        .is_recoverable());
        assert!(!CodecError::Truncated { offset: 0 }.is_recoverable());
        assert!(!CodecError::Empty.is_recoverable());
    }
}
