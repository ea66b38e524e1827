#![doc = r#"
Rusty representation of a [`MidiFile`]

# Layout

```text
[Header Chunk: "MThd"]
[Track Chunk 0: "MTrk"]
[Track Chunk 1: "MTrk"]
...
[Track Chunk N-1: "MTrk"]
```

Exactly as many track chunks as the header declares are read. Anything after
the last of them is ignored.
"#]

mod format;
pub use format::*;

mod header;
pub use header::*;

mod track;
pub use track::*;

mod timing;
pub use timing::*;

use crate::{
    reader::{ReadResult, Reader},
    reconstruct::{Note, ReconstructOptions},
};
use alloc::vec::Vec;
use tracing::debug;

#[doc = r#"
A successfully parsed Standard MIDI File.

# Example
```rust
# use keyfall::prelude::*;
let bytes = [
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0,
    b'M', b'T', b'r', b'k', 0, 0, 0, 9,
    0x00, 0x90, 60, 80,
    0x83, 0x60, 0x80, 60, 0,
];
let file = MidiFile::parse(&bytes).unwrap();

assert_eq!(file.ticks_per_quarter_note(), 480);
let notes = file.notes();
assert_eq!(notes.len(), 1);
assert_eq!(notes[0].end_tick(), 480);
```
"#]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiFile {
    header: Header,
    tracks: Vec<MidiTrack>,
}

impl MidiFile {
    /// Parse a set of bytes into a file struct
    ///
    /// # Errors
    /// Any structural problem (bad chunk identifiers, a header length other
    /// than 6, SMPTE timing, a truncated field) aborts the parse. See
    /// [`ParseError`](crate::ParseError).
    pub fn parse(bytes: &[u8]) -> ReadResult<Self> {
        let mut reader = Reader::from_byte_slice(bytes);
        let header = Header::read(&mut reader)?;

        debug!(
            "Parsing MIDI file: format {}, {} tracks, {} ticks per quarter note",
            header.format(),
            header.track_count(),
            header.timing().ticks_per_quarter_note()
        );

        let tracks = (0..usize::from(header.track_count()))
            .map(|index| MidiTrack::read(index, &mut reader))
            .collect::<ReadResult<Vec<_>>>()?;

        if !reader.is_empty() {
            debug!(
                "Ignoring {} bytes after the last track",
                reader.remaining()
            );
        }

        Ok(Self { header, tracks })
    }

    /// Read and parse the file at `path`.
    #[cfg(feature = "std")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!("Loading MIDI file {}", path.display());
        let bytes = std::fs::read(path)?;
        Ok(Self::parse(&bytes)?)
    }

    /// Returns header info
    pub const fn header(&self) -> &Header {
        &self.header
    }
    /// The raw format number
    pub const fn format(&self) -> u16 {
        self.header.format()
    }
    /// The format, if it is one of the three defined ones
    pub fn format_type(&self) -> Option<FormatType> {
        self.header.format_type()
    }
    /// Returns the timing of the file
    pub const fn timing(&self) -> Timing {
        *self.header.timing()
    }
    /// Shorthand for the timing's ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.header.timing().ticks_per_quarter_note()
    }
    /// Returns the tracks, in file order
    pub fn tracks(&self) -> &[MidiTrack] {
        &self.tracks
    }
    /// Consumes the file, returning its tracks
    pub fn into_tracks(self) -> Vec<MidiTrack> {
        self.tracks
    }

    /// Notes of every track with the default options, track by track.
    pub fn notes(&self) -> Vec<Note> {
        self.notes_with(&ReconstructOptions::default())
    }

    /// Notes of every track, track by track.
    pub fn notes_with(&self, options: &ReconstructOptions) -> Vec<Note> {
        self.tracks
            .iter()
            .flat_map(|track| track.notes_with(options))
            .collect()
    }

    /// A clock mapping this file's ticks onto a constant beat duration.
    pub fn clock(&self, beat_duration_ms: f64) -> TickClock {
        self.timing().clock(beat_duration_ms)
    }
}

/// Errors from [`MidiFile::load`]
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("Reading file: {0}")]
    Io(#[from] std::io::Error),
    /// The file's contents are not a readable MIDI file
    #[error(transparent)]
    Parse(#[from] crate::reader::ReaderError),
}

#[cfg(test)]
const TWO_TRACKS: &[u8] = &[
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 2, 0x00, 0x60, //
    b'M', b'T', b'r', b'k', 0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00, //
    b'M', b'T', b'r', b'k', 0, 0, 0, 8, 0x00, 0x90, 64, 90, 0x60, 0x90, 64, 0, //
];

#[test]
fn reads_tracks_in_order() {
    use pretty_assertions::assert_eq;
    let file = MidiFile::parse(TWO_TRACKS).unwrap();

    assert_eq!(file.format_type(), Some(FormatType::Simultaneous));
    assert_eq!(file.ticks_per_quarter_note(), 96);
    assert_eq!(file.tracks().len(), 2);
    assert_eq!(file.tracks()[0].index(), 0);
    assert!(file.tracks()[0].midi_events().is_empty());
    assert_eq!(file.tracks()[1].index(), 1);
    assert_eq!(file.tracks()[1].midi_events().len(), 2);

    let notes = file.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].track_index(), 1);
    assert_eq!(notes[0].duration_ticks(), 96);

    let tracks = file.into_tracks();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[1].midi_events()[1].event_type(), crate::events::MidiEventType::NoteOff);
}

#[test]
fn missing_track_is_out_of_bounds() {
    let err = MidiFile::parse(&TWO_TRACKS[..26]).unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 26);
}
