use core::fmt;

use thiserror::Error;

#[doc = r#"
The set of structural errors that make a MIDI file unreadable.

These are always fatal: the whole parse is abandoned and no partially
populated [`MidiFile`](crate::file::MidiFile) is produced. The byte offset of
the failing check is carried by the surrounding
[`ReaderError`](crate::reader::ReaderError).
"#]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A chunk identifier or length check failed
    #[error("Chunk: {0}")]
    Chunk(#[from] ChunkError),
    /// The header chunk carries values this reader cannot use
    #[error("Header: {0}")]
    Header(#[from] HeaderError),
    /// A variable-length quantity still had its continuation bit set on the 4th byte
    #[error("Variable-length quantity is longer than 4 bytes")]
    VarLenTooLong,
}

/// Errors raised while validating chunk identifiers and lengths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The file does not start with `MThd`
    #[error("Invalid file header (expected {}, found {found})", ChunkId::HEADER)]
    InvalidHeaderChunk {
        /// The four bytes found where `MThd` was expected
        found: ChunkId,
    },
    /// The header chunk length is not 6.
    ///
    /// Larger headers are allowed by the SMF specification, but are rejected here.
    #[error("Invalid header length (expected 6, found {0})")]
    InvalidHeaderLength(u32),
    /// A track chunk does not start with `MTrk`
    #[error("Invalid header for track {index} (expected {}, found {found})", ChunkId::TRACK)]
    InvalidTrackChunk {
        /// The 0-based index of the offending track
        index: usize,
        /// The four bytes found where `MTrk` was expected
        found: ChunkId,
    },
}

/// Errors raised by values found inside the header chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The time division has its top bit set (SMPTE time code)
    #[error("Unsupported timing mode {0:#06X} (SMPTE time code is not supported)")]
    UnsupportedTiming(u16),
    /// The time division declares zero ticks per quarter note
    #[error("Ticks per quarter note must be positive")]
    ZeroTicksPerQuarterNote,
}

/// The four byte identifier at the start of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    /// `MThd`
    pub const HEADER: Self = Self(*b"MThd");
    /// `MTrk`
    pub const TRACK: Self = Self(*b"MTrk");
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

#[test]
fn chunk_id_display_escapes_binary() {
    use alloc::string::ToString;
    use pretty_assertions::assert_eq;

    assert_eq!(ChunkId::HEADER.to_string(), "\"MThd\"");
    assert_eq!(ChunkId([b'R', b'I', 0x00, 0xFF]).to_string(), "\"RI\\x00\\xff\"");
}

#[test]
fn chunk_error_names_expected_and_found() {
    use alloc::string::ToString;
    use pretty_assertions::assert_eq;

    let err = ChunkError::InvalidTrackChunk {
        index: 2,
        found: ChunkId(*b"XXXX"),
    };
    assert_eq!(
        err.to_string(),
        "Invalid header for track 2 (expected \"MTrk\", found \"XXXX\")"
    );
}
