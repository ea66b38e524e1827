use crate::reader::Reader;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Meta event types that are decoded into a [`MidiEvent`](super::MidiEvent).
///
/// Every other non-text meta event (end of track, SMPTE offset, sequencer
/// specific data, ...) is skipped by its declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MetaEventType {
    /// `FF 51 03 tttttt`: microseconds per quarter note
    Tempo = 0x51,
    /// `FF 58 04 nn dd cc bb`
    TimeSignature = 0x58,
    /// `FF 59 02 sf mi`
    KeySignature = 0x59,
}

impl MetaEventType {
    /// Decodes the payload of this meta type into the `(arg2, arg3)` pair
    /// stored on a [`MidiEvent`](super::MidiEvent).
    ///
    /// Returns `None` if the payload is too short to hold the fields.
    /// Trailing bytes are ignored.
    pub fn decode(&self, payload: &[u8]) -> Option<(u8, u8)> {
        match self {
            Self::Tempo => {
                let micros_per_quarter_note =
                    Reader::from_byte_slice(payload).read_u24_be().ok()?;
                Some((bpm_from_micros(micros_per_quarter_note), 0))
            }
            Self::TimeSignature => {
                let &[numerator, exponent, ..] = payload else {
                    return None;
                };
                let denominator = if exponent < 8 { 1 << exponent } else { u8::MAX };
                Some((numerator, denominator))
            }
            Self::KeySignature => {
                let &[accidentals, scale, ..] = payload else {
                    return None;
                };
                Some((accidentals, scale))
            }
        }
    }
}

/// `60_000_000 / micros_per_quarter_note`, truncated and saturated to a byte.
///
/// A zero tempo yields 0.
pub const fn bpm_from_micros(micros_per_quarter_note: u32) -> u8 {
    if micros_per_quarter_note == 0 {
        return 0;
    }
    let bpm = 60_000_000 / micros_per_quarter_note;
    if bpm > u8::MAX as u32 {
        u8::MAX
    } else {
        bpm as u8
    }
}

/// A decoded time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    /// Beats per bar
    pub numerator: u8,
    /// Beat unit, already expanded from its power-of-two exponent
    pub denominator: u8,
}

/// A decoded key signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySignature {
    /// Positive for sharps, negative for flats
    pub accidentals: i8,
    /// Minor key if set
    pub minor: bool,
}

#[test]
fn decodes_tempo() {
    use pretty_assertions::assert_eq;
    assert_eq!(MetaEventType::Tempo.decode(&[0x07, 0xA1, 0x20]), Some((120, 0)));
    // 140.0001 bpm truncates
    assert_eq!(MetaEventType::Tempo.decode(&[0x06, 0x8A, 0x1B]), Some((140, 0)));
    assert_eq!(MetaEventType::Tempo.decode(&[0x07, 0xA1]), None);
    // only the first three bytes are the tempo
    assert_eq!(
        MetaEventType::Tempo.decode(&[0x0F, 0x42, 0x40, 0xFF]),
        Some((60, 0))
    );
}

#[test]
fn tempo_saturates() {
    use pretty_assertions::assert_eq;
    assert_eq!(bpm_from_micros(100_000), 255);
    assert_eq!(bpm_from_micros(0), 0);
    assert_eq!(bpm_from_micros(0xFF_FFFF), 3);
}

#[test]
fn decodes_time_signature() {
    use pretty_assertions::assert_eq;
    assert_eq!(
        MetaEventType::TimeSignature.decode(&[0x06, 0x03, 0x24, 0x08]),
        Some((6, 8))
    );
    assert_eq!(MetaEventType::TimeSignature.decode(&[0x04, 0x09]), Some((4, 255)));
    assert_eq!(MetaEventType::TimeSignature.decode(&[0x04]), None);
}

#[test]
fn decodes_key_signature() {
    use pretty_assertions::assert_eq;
    assert_eq!(MetaEventType::KeySignature.decode(&[0xFD, 0x01]), Some((0xFD, 1)));
    assert_eq!(MetaEventType::KeySignature.decode(&[]), None);
}
