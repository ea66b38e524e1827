use crate::{
    HeaderError,
    reader::{ReadResult, Reader, ReaderError},
    reconstruct::Note,
};

/// The header timing type.
///
/// Only ticks-per-quarter-note division is supported. A division with its top
/// bit set describes SMPTE frames and is rejected while reading the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timing {
    ticks_per_quarter_note: u16,
}

impl Timing {
    /// The tickrate per quarter note defines what a "quarter note" means.
    ///
    /// The leading bit of the u16 is disregarded, so 1-32767
    pub const fn new_ticks_per_quarter_note(tpqn: u16) -> Self {
        Self {
            ticks_per_quarter_note: tpqn & 0x7FFF,
        }
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let division = reader.read_u16_be()?;
        if division & 0x8000 != 0 {
            return Err(ReaderError::invalid(
                position,
                HeaderError::UnsupportedTiming(division).into(),
            ));
        }
        if division == 0 {
            return Err(ReaderError::invalid(
                position,
                HeaderError::ZeroTicksPerQuarterNote.into(),
            ));
        }
        Ok(Self::new_ticks_per_quarter_note(division))
    }

    /// Returns the ticks per quarter note for the file.
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.ticks_per_quarter_note
    }

    /// A clock mapping ticks onto a constant beat duration.
    pub fn clock(&self, beat_duration_ms: f64) -> TickClock {
        TickClock::new(self.ticks_per_quarter_note, beat_duration_ms)
    }
}

#[doc = r#"
Converts ticks into milliseconds at a constant beat duration.

The beat duration comes from the caller (usually the host's timing point);
tempo events in the file are not consulted.

```text
ms = offset + tick * beat_duration_ms / ticks_per_quarter_note
```

# Example
```rust
# use keyfall::prelude::*;
let clock = TickClock::new(480, 500.).with_offset(25.);

assert_eq!(clock.ticks_to_ms(0), 25.);
assert_eq!(clock.ticks_to_ms(960), 1025.);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    ms_per_tick: f64,
    offset_ms: f64,
}

impl TickClock {
    /// Create a clock. A zero `ticks_per_quarter_note` is treated as 1.
    pub fn new(ticks_per_quarter_note: u16, beat_duration_ms: f64) -> Self {
        Self {
            ms_per_tick: beat_duration_ms / f64::from(ticks_per_quarter_note.max(1)),
            offset_ms: 0.,
        }
    }

    /// Shift every converted time by `offset_ms`.
    pub fn with_offset(mut self, offset_ms: f64) -> Self {
        self.offset_ms = offset_ms;
        self
    }

    /// Milliseconds covered by one tick
    pub fn ms_per_tick(&self) -> f64 {
        self.ms_per_tick
    }

    /// Convert an absolute tick into milliseconds
    pub fn ticks_to_ms(&self, tick: u32) -> f64 {
        f64::from(tick) * self.ms_per_tick + self.offset_ms
    }

    /// Start and end of `note` in milliseconds.
    ///
    /// The end may not be after the start; callers drop such notes.
    pub fn note_span(&self, note: &Note) -> (f64, f64) {
        (
            self.ticks_to_ms(note.start_tick()),
            self.ticks_to_ms(note.end_tick()),
        )
    }
}

#[test]
fn reads_ticks_per_quarter_note() {
    use pretty_assertions::assert_eq;
    let mut reader = Reader::from_byte_slice(&[0x01, 0xE0]);
    let timing = Timing::read(&mut reader).unwrap();
    assert_eq!(timing.ticks_per_quarter_note(), 480);
}

#[test]
fn rejects_smpte_division() {
    use crate::ParseError;
    use pretty_assertions::assert_eq;
    for division in [[0x80, 0x00], [0xE7, 0x28]] {
        let mut reader = Reader::from_byte_slice(&division);
        let err = Timing::read(&mut reader).unwrap_err();
        assert_eq!(
            err.parse_error(),
            Some(&ParseError::Header(HeaderError::UnsupportedTiming(
                u16::from_be_bytes(division)
            )))
        );
    }
}

#[test]
fn clock_scales_by_beat_duration() {
    use pretty_assertions::assert_eq;
    let clock = Timing::new_ticks_per_quarter_note(96).clock(600.);
    assert_eq!(clock.ms_per_tick(), 6.25);
    assert_eq!(clock.ticks_to_ms(48), 300.);

    let note = Note::new(crate::Pitch::new(60), 96, 192, 80, 1, 0);
    assert_eq!(clock.note_span(&note), (600., 1200.));
}
