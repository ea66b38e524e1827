use crate::{
    ChunkError, ChunkId,
    file::{FormatType, Timing},
    reader::{ReadResult, Reader, ReaderError, ReaderErrorKind},
};

/// The header chunk is always exactly this long.
pub const HEADER_LENGTH: u32 = 6;

#[doc = r#"
The contents of the `MThd` chunk.

```text
"MThd" | length = 6 (u32) | format (u16) | track count (u16) | division (u16)
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    format: u16,
    track_count: u16,
    timing: Timing,
}

impl Header {
    /// Create a new header
    pub const fn new(format: u16, track_count: u16, timing: Timing) -> Self {
        Self {
            format,
            track_count,
            timing,
        }
    }

    /// Reads and validates the header chunk at the reader's position.
    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let id = ChunkId(reader.read_exact()?);
        if id != ChunkId::HEADER {
            return Err(ReaderError::new(
                position,
                ReaderErrorKind::chunk(ChunkError::InvalidHeaderChunk { found: id }),
            ));
        }

        let position = reader.buffer_position();
        let length = reader.read_u32_be()?;
        if length != HEADER_LENGTH {
            return Err(ReaderError::new(
                position,
                ReaderErrorKind::chunk(ChunkError::InvalidHeaderLength(length)),
            ));
        }

        let format = reader.read_u16_be()?;
        let track_count = reader.read_u16_be()?;
        let timing = Timing::read(reader)?;

        Ok(Self {
            format,
            track_count,
            timing,
        })
    }

    /// The raw format number
    pub const fn format(&self) -> u16 {
        self.format
    }
    /// The format, if it is one of the three defined ones
    pub fn format_type(&self) -> Option<FormatType> {
        FormatType::try_from(self.format).ok()
    }
    /// Number of track chunks declared by the header
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }
    /// Get the timing props
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }
}
