//! Varint and zig-zag primitives over a byte cursor.
//!
//! Unsigned varints carry 7 value bits per byte, least significant group
//! first, with the high bit set on every byte but the last. Signed values are
//! zig-zag mapped first so small magnitudes of either sign stay short.

use super::CodecError;

/// Longest valid encoding of a `u64`.
const MAX_VARINT_BYTES: usize = 10;

/// Maps a signed value onto the unsigned range: 0, -1, 1, -2, 2 → 0, 1, 2, 3, 4.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Appends the varint encoding of `value`.
pub fn write_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Appends the zig-zag varint encoding of `value`.
pub fn write_zigzag(buf: &mut Vec<u8>, value: i64) {
    write_uvarint(buf, zigzag_encode(value));
}

/// Forward-only reader over an in-memory tile stream.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        let end = self.pos + 4;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        self.pos = end;
        Ok(value)
    }

    /// Borrows the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_uvarint(&mut self) -> Result<u64, CodecError> {
        let start = self.pos;
        let mut value = 0u64;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            let group = (byte & 0x7f) as u64;
            if i == MAX_VARINT_BYTES - 1 && group > 1 {
                return Err(CodecError::Malformed {
                    offset: start,
                    reason: "varint overflows 64 bits",
                });
            }
            value |= group << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::Malformed {
            offset: start,
            reason: "varint longer than 10 bytes",
        })
    }

    pub fn read_zigzag(&mut self) -> Result<i64, CodecError> {
        self.read_uvarint().map(zigzag_decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_varints() {
        let mut buf = Vec::new();
        write_uvarint(&mut buf, 0);
        write_uvarint(&mut buf, 127);
        assert_eq!(buf, vec![0x00, 0x7f]);
    }

    #[test]
    fn test_multi_byte_varint_layout() {
        let mut buf = Vec::new();
        write_uvarint(&mut buf, 300);
        assert_eq!(buf, vec![0xac, 0x02]);

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_uvarint().unwrap(), 300);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_zigzag_small_values() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_decode(3), -2);
        assert_eq!(zigzag_decode(u64::MAX), i64::MIN);
    }

    #[test]
    fn test_truncated_varint() {
        let mut reader = ByteReader::new(&[0x80, 0x80]);
        assert_eq!(
            reader.read_uvarint(),
            Err(CodecError::Truncated { offset: 2 })
        );
    }

    #[test]
    fn test_overlong_varint_is_malformed() {
        let bytes = [0xffu8; 11];
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.read_uvarint(),
            Err(CodecError::Malformed { offset: 0, .. })
        ));
    }

    #[test]
    fn test_read_u32_le() {
        let mut reader = ByteReader::new(&[3, 0, 0, 0, 9]);
        assert_eq!(reader.read_u32_le().unwrap(), 3);
        assert_eq!(reader.remaining(), 1);
        assert!(reader.read_u32_le().is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_uvarint_roundtrip(value in any::<u64>()) {
                let mut buf = Vec::new();
                write_uvarint(&mut buf, value);
                prop_assert!(buf.len() <= MAX_VARINT_BYTES);
                let mut reader = ByteReader::new(&buf);
                prop_assert_eq!(reader.read_uvarint()?, value);
                prop_assert!(reader.is_empty());
            }

            #[test]
            fn test_zigzag_roundtrip(value in any::<i64>()) {
                let mut buf = Vec::new();
                write_zigzag(&mut buf, value);
                let mut reader = ByteReader::new(&buf);
                prop_assert_eq!(reader.read_zigzag()?, value);
            }

            #[test]
            fn test_zigzag_keeps_small_values_short(value in -63i64..=63) {
                let mut buf = Vec::new();
                write_zigzag(&mut buf, value);
                prop_assert_eq!(buf.len(), 1);
            }
        }
    }
}
