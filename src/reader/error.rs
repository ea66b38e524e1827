use crate::{ChunkError, ParseError};
use thiserror::Error;

#[doc = r#"
Why a file could not be read, and where.

`position` is the absolute byte offset of the read or check that failed, so
it can be used to point into a hex dump of the file.
"#]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("At byte {position}: {kind}")]
pub struct ReaderError {
    position: usize,
    pub(crate) kind: ReaderErrorKind,
}

/// What went wrong at a [`ReaderError`]'s position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderErrorKind {
    /// The bytes were there but held an invalid value
    #[error("{0}")]
    ParseError(#[from] ParseError),
    /// The input ended in the middle of a field
    #[error("Unexpected end of input")]
    OutOfBounds,
}

impl ReaderErrorKind {
    pub(crate) const fn chunk(chunk_err: ChunkError) -> Self {
        Self::ParseError(ParseError::Chunk(chunk_err))
    }
}

impl ReaderError {
    /// Pair a kind with the offset it was detected at
    pub const fn new(position: usize, kind: ReaderErrorKind) -> Self {
        Self { position, kind }
    }
    /// True if the file ended before a field could be read
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::OutOfBounds)
    }
    /// The kind of failure
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
    /// Returns the parse error, if this is not a truncation.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ReaderErrorKind::ParseError(e) => Some(e),
            ReaderErrorKind::OutOfBounds => None,
        }
    }
    /// Absolute byte offset of the failed read or check
    pub fn position(&self) -> usize {
        self.position
    }

    /// An invalid value at `position`
    pub const fn invalid(position: usize, error: ParseError) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::ParseError(error),
        }
    }

    /// Input exhausted at `position`
    pub const fn oob(position: usize) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::OutOfBounds,
        }
    }
}

/// Result of every fallible read
pub type ReadResult<T> = Result<T, ReaderError>;
