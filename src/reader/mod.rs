#![doc = r#"
Bounds-checked primitive reads over a MIDI byte buffer.

A [`Reader`] borrows the file's bytes and keeps an explicit cursor. It never
copies the buffer and never moves backwards. Every read either returns the
requested value and advances, or fails with
[`ReaderErrorKind::OutOfBounds`] at the position where the missing bytes were
expected; nothing is ever zero-filled.

All multi-byte integers in a Standard MIDI File are big-endian.

# Variable-length quantities

Delta-times and several lengths are stored as VLQs: seven bits per byte,
most significant group first, with the high bit set on every byte except the
last.

```text
0x00        => 0
0x7F        => 127
0x81 0x00   => 128
0xFF 0x7F   => 16_383
0xFF 0xFF 0xFF 0x7F => 0x0FFF_FFFF (the largest value)
```
"#]

mod error;
pub use error::*;

use crate::ParseError;
use alloc::{string::String, vec::Vec};

/// MIDI caps variable-length quantities at four bytes.
pub const MAX_VARLEN_BYTES: usize = 4;

/// The largest value a four byte variable-length quantity can hold.
pub const MAX_VARLEN: u32 = 0x0FFF_FFFF;

/// A cursor over a borrowed byte slice.
///
/// Positions reported by the reader (and by its errors) are absolute offsets
/// into the whole input, including for readers created with
/// [`Reader::sub_reader`].
#[derive(Debug, Clone)]
pub struct Reader<'slc> {
    buf: &'slc [u8],
    position: usize,
    offset: usize,
}

impl<'slc> Reader<'slc> {
    /// Create a reader positioned at the start of `bytes`.
    pub const fn from_byte_slice(bytes: &'slc [u8]) -> Self {
        Self {
            buf: bytes,
            position: 0,
            offset: 0,
        }
    }

    /// The absolute offset of the next byte to be read.
    pub const fn buffer_position(&self) -> usize {
        self.offset + self.position
    }

    /// Number of bytes left before this reader's end.
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    /// True if every byte has been consumed.
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> ReadResult<u8> {
        self.buf
            .get(self.position)
            .copied()
            .ok_or(ReaderError::oob(self.buffer_position()))
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Ok(byte)
    }

    /// Reads the next `len` bytes as a borrowed slice.
    pub fn read_slice(&mut self, len: usize) -> ReadResult<&'slc [u8]> {
        let slice = self
            .position
            .checked_add(len)
            .and_then(|end| self.buf.get(self.position..end))
            .ok_or(ReaderError::oob(self.buffer_position()))?;
        self.position += len;
        Ok(slice)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_exact<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    /// Skips `len` bytes.
    pub fn skip(&mut self, len: usize) -> ReadResult<()> {
        self.read_slice(len).map(|_| ())
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16_be(&mut self) -> ReadResult<u16> {
        self.read_exact().map(u16::from_be_bytes)
    }

    /// Reads a big-endian 24-bit integer, as found in tempo meta events.
    pub fn read_u24_be(&mut self) -> ReadResult<u32> {
        let [a, b, c] = self.read_exact()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32_be(&mut self) -> ReadResult<u32> {
        self.read_exact().map(u32::from_be_bytes)
    }

    /// Reads `len` bytes as single-byte (Latin-1) characters.
    pub fn read_fixed_string(&mut self, len: usize) -> ReadResult<String> {
        Ok(self.read_slice(len)?.iter().copied().map(char::from).collect())
    }

    /// Reads a MIDI variable-length quantity.
    ///
    /// # Errors
    /// - [`ReaderErrorKind::OutOfBounds`] if the buffer ends mid-sequence
    /// - [`ParseError::VarLenTooLong`] if the 4th byte still has its
    ///   continuation bit set
    pub fn read_varlen(&mut self) -> ReadResult<u32> {
        let start = self.buffer_position();
        let mut value = 0u32;
        for _ in 0..MAX_VARLEN_BYTES {
            let byte = self.read_u8()?;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ReaderError::invalid(start, ParseError::VarLenTooLong))
    }

    /// Splits off a reader over exactly the next `len` bytes and advances past them.
    ///
    /// Reads on the returned reader can never go beyond those `len` bytes.
    pub fn sub_reader(&mut self, len: usize) -> ReadResult<Reader<'slc>> {
        let offset = self.buffer_position();
        let buf = self.read_slice(len)?;
        Ok(Reader {
            buf,
            position: 0,
            offset,
        })
    }
}

/// Encodes `value` as a minimal variable-length quantity.
///
/// Values above [`MAX_VARLEN`] are clamped to it.
pub fn encode_varlen(value: u32) -> Vec<u8> {
    let mut rest = value.min(MAX_VARLEN);
    let mut buf = [0u8; MAX_VARLEN_BYTES];
    let mut start = MAX_VARLEN_BYTES - 1;
    buf[start] = (rest & 0x7F) as u8;
    rest >>= 7;
    while rest > 0 {
        start -= 1;
        buf[start] = (rest & 0x7F) as u8 | 0x80;
        rest >>= 7;
    }
    buf[start..].to_vec()
}

#[test]
fn reads_big_endian_integers() {
    use pretty_assertions::assert_eq;
    let bytes = [0x01, 0xE0, 0x07, 0xA1, 0x20, 0x00, 0x00, 0x00, 0x06];
    let mut reader = Reader::from_byte_slice(&bytes);

    assert_eq!(reader.read_u16_be().unwrap(), 480);
    assert_eq!(reader.read_u24_be().unwrap(), 500_000);
    assert_eq!(reader.read_u32_be().unwrap(), 6);
    assert!(reader.is_empty());
}

#[test]
fn reads_latin1_strings() {
    use pretty_assertions::assert_eq;
    let bytes = [b'P', b'i', b'a', b'n', b'o', 0xE9];
    let mut reader = Reader::from_byte_slice(&bytes);

    assert_eq!(reader.read_fixed_string(6).unwrap(), "Piano\u{e9}");
    assert_eq!(reader.buffer_position(), 6);
}

#[test]
fn decodes_minimal_varlens() {
    use pretty_assertions::assert_eq;
    let cases: [(&[u8], u32); 6] = [
        (&[0x00], 0),
        (&[0x7F], 127),
        (&[0x81, 0x00], 128),
        (&[0xC0, 0x00], 0x2000),
        (&[0xFF, 0xFF, 0x7F], 0x1F_FFFF),
        (&[0xFF, 0xFF, 0xFF, 0x7F], MAX_VARLEN),
    ];
    for (bytes, expected) in cases {
        let mut reader = Reader::from_byte_slice(bytes);
        assert_eq!(reader.read_varlen().unwrap(), expected);
        assert!(reader.is_empty());
    }
}

#[test]
fn varlen_round_trips_at_group_boundaries() {
    use pretty_assertions::assert_eq;
    for value in [
        0,
        1,
        0x7F,
        0x80,
        0x3FFF,
        0x4000,
        0x1F_FFFF,
        0x20_0000,
        0x0ABC_DEF0,
        MAX_VARLEN,
    ] {
        let encoded = encode_varlen(value);
        let mut reader = Reader::from_byte_slice(&encoded);
        assert_eq!(reader.read_varlen().unwrap(), value);
        assert!(reader.is_empty(), "{value:#X} left bytes behind");
    }
    assert_eq!(encode_varlen(u32::MAX), encode_varlen(MAX_VARLEN));
}

#[test]
fn rejects_five_byte_varlen() {
    let bytes = [0x00, 0x80, 0x80, 0x80, 0x80, 0x00];
    let mut reader = Reader::from_byte_slice(&bytes);
    reader.skip(1).unwrap();

    let err = reader.read_varlen().unwrap_err();
    assert_eq!(err.position(), 1);
    assert_eq!(err.parse_error(), Some(&ParseError::VarLenTooLong));
}

#[test]
fn truncated_varlen_is_out_of_bounds() {
    let mut reader = Reader::from_byte_slice(&[0x81, 0x80]);
    let err = reader.read_varlen().unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 2);
}

#[test]
fn failed_reads_do_not_advance() {
    let mut reader = Reader::from_byte_slice(&[0x00, 0x01, 0x02]);
    reader.skip(1).unwrap();

    let err = reader.read_u32_be().unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 1);
    assert_eq!(reader.remaining(), 2);
}

#[test]
fn sub_reader_is_bounded_and_keeps_absolute_positions() {
    use pretty_assertions::assert_eq;
    let bytes = [0xAA, 0x01, 0x02, 0x03, 0xBB];
    let mut reader = Reader::from_byte_slice(&bytes);
    reader.skip(1).unwrap();

    let mut sub = reader.sub_reader(2).unwrap();
    assert_eq!(reader.buffer_position(), 3);
    assert_eq!(sub.buffer_position(), 1);
    assert_eq!(sub.read_u16_be().unwrap(), 0x0102);

    let err = sub.read_u8().unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 3);

    assert!(reader.sub_reader(5).unwrap_err().is_out_of_bounds());
}
