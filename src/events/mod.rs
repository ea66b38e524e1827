#![doc = r#"
Events decoded from a track chunk.

# Hierarchy
```text
                 |-------------|
                 | Track event |
                 |-------------|
                  /           \
      |-------------|       |-------------|
      | MidiEvent   |       | TextEvent   |
      |-------------|       |-------------|
       /          \
|---------|   |--------------------------|
| Channel |   | Meta (tempo, time sig,   |
| voice   |   | key sig)                 |
|---------|   |--------------------------|
```

A [`MidiEvent`] keeps the three raw argument bytes it was decoded from. Their
meaning depends on [`MidiEvent::event_type`]; the typed accessors
([`MidiEvent::note`], [`MidiEvent::tempo_bpm`], ...) return `None` when asked
for a field the event does not carry.
"#]

mod control;
pub use control::*;

mod meta;
pub use meta::*;

mod text;
pub use text::*;

use crate::Pitch;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The type of a [`MidiEvent`].
///
/// Channel voice types are the high nibble of their status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MidiEventType {
    /// A key was released
    NoteOff = 0x80,
    /// A key was pressed. Never carries a zero velocity once decoded.
    NoteOn = 0x90,
    /// Polyphonic key pressure
    KeyAfterTouch = 0xA0,
    /// A controller changed value
    ControlChange = 0xB0,
    /// The channel's program (patch) changed
    ProgramChange = 0xC0,
    /// Channel-wide pressure
    ChannelAfterTouch = 0xD0,
    /// The channel's pitch wheel moved
    PitchBendChange = 0xE0,
    /// An interpreted meta event, see [`MetaEventType`]
    MetaEvent = 0xFF,
}

impl MidiEventType {
    /// Number of data bytes following the status byte in the track stream.
    ///
    /// Meta events are length-prefixed and report 0.
    pub const fn data_len(&self) -> usize {
        match self {
            Self::ProgramChange | Self::ChannelAfterTouch => 1,
            Self::MetaEvent => 0,
            _ => 2,
        }
    }

    /// True for every type except [`MidiEventType::MetaEvent`]
    pub const fn is_channel_voice(&self) -> bool {
        !matches!(self, Self::MetaEvent)
    }
}

/// A decoded channel voice or meta event at an absolute tick.
///
/// | type            | `arg1`       | `arg2`          | `arg3`            |
/// |-----------------|--------------|-----------------|-------------------|
/// | channel voice   | channel 1-16 | first data byte | second data byte  |
/// | Tempo           | `0x51`       | beats per minute| 0                 |
/// | TimeSignature   | `0x58`       | numerator       | denominator       |
/// | KeySignature    | `0x59`       | sharps / flats  | 0 major, 1 minor  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiEvent {
    time: u32,
    event_type: MidiEventType,
    arg1: u8,
    arg2: u8,
    arg3: u8,
}

impl MidiEvent {
    /// Create an event from its raw parts.
    pub const fn new(time: u32, event_type: MidiEventType, arg1: u8, arg2: u8, arg3: u8) -> Self {
        Self {
            time,
            event_type,
            arg1,
            arg2,
            arg3,
        }
    }

    /// A note on event. `channel` is 1-based.
    pub const fn note_on(time: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(time, MidiEventType::NoteOn, channel, note, velocity)
    }

    /// A note off event. `channel` is 1-based.
    pub const fn note_off(time: u32, channel: u8, note: u8) -> Self {
        Self::new(time, MidiEventType::NoteOff, channel, note, 0)
    }

    /// Absolute tick, counted from the start of the track
    pub const fn time(&self) -> u32 {
        self.time
    }
    /// The event type
    pub const fn event_type(&self) -> MidiEventType {
        self.event_type
    }
    /// First raw argument
    pub const fn arg1(&self) -> u8 {
        self.arg1
    }
    /// Second raw argument
    pub const fn arg2(&self) -> u8 {
        self.arg2
    }
    /// Third raw argument
    pub const fn arg3(&self) -> u8 {
        self.arg3
    }

    /// True if this is a meta event
    pub const fn is_meta(&self) -> bool {
        matches!(self.event_type, MidiEventType::MetaEvent)
    }

    /// The 1-based channel of a channel voice event
    pub const fn channel(&self) -> Option<u8> {
        if self.event_type.is_channel_voice() {
            Some(self.arg1)
        } else {
            None
        }
    }

    /// The note number of a note or key aftertouch event
    pub const fn note(&self) -> Option<u8> {
        use MidiEventType::*;
        match self.event_type {
            NoteOff | NoteOn | KeyAfterTouch => Some(self.arg2),
            _ => None,
        }
    }

    /// The note number of a note event as a [`Pitch`]
    pub const fn pitch(&self) -> Option<Pitch> {
        match self.note() {
            Some(note) => Some(Pitch::new(note)),
            None => None,
        }
    }

    /// The velocity of a note event
    pub const fn velocity(&self) -> Option<u8> {
        use MidiEventType::*;
        match self.event_type {
            NoteOff | NoteOn => Some(self.arg3),
            _ => None,
        }
    }

    /// The value carried by a pressure, controller or program event.
    ///
    /// For [`MidiEventType::ProgramChange`] this is the program number.
    pub const fn value(&self) -> Option<u8> {
        use MidiEventType::*;
        match self.event_type {
            KeyAfterTouch | ControlChange => Some(self.arg3),
            ProgramChange | ChannelAfterTouch => Some(self.arg2),
            _ => None,
        }
    }

    /// The controller of a control change event, if it is one this crate names
    pub fn control_change_type(&self) -> Option<ControlChangeType> {
        match self.event_type {
            MidiEventType::ControlChange => ControlChangeType::try_from(self.arg2).ok(),
            _ => None,
        }
    }

    /// The 14-bit pitch wheel position (`0x2000` is centered)
    pub const fn pitch_bend(&self) -> Option<u16> {
        match self.event_type {
            MidiEventType::PitchBendChange => {
                Some(((self.arg3 as u16 & 0x7F) << 7) | (self.arg2 as u16 & 0x7F))
            }
            _ => None,
        }
    }

    /// The meta type of an interpreted meta event
    pub fn meta_event_type(&self) -> Option<MetaEventType> {
        if self.is_meta() {
            MetaEventType::try_from(self.arg1).ok()
        } else {
            None
        }
    }

    /// Beats per minute of a tempo event, truncated to a byte
    pub fn tempo_bpm(&self) -> Option<u8> {
        match self.meta_event_type()? {
            MetaEventType::Tempo => Some(self.arg2),
            _ => None,
        }
    }

    /// The time signature carried by a time signature event
    pub fn time_signature(&self) -> Option<TimeSignature> {
        match self.meta_event_type()? {
            MetaEventType::TimeSignature => Some(TimeSignature {
                numerator: self.arg2,
                denominator: self.arg3,
            }),
            _ => None,
        }
    }

    /// The key signature carried by a key signature event
    pub fn key_signature(&self) -> Option<KeySignature> {
        match self.meta_event_type()? {
            MetaEventType::KeySignature => Some(KeySignature {
                accidentals: self.arg2 as i8,
                minor: self.arg3 == 1,
            }),
            _ => None,
        }
    }
}

#[test]
fn note_accessors() {
    use pretty_assertions::assert_eq;
    let on = MidiEvent::note_on(96, 3, 60, 100);

    assert_eq!(on.channel(), Some(3));
    assert_eq!(on.note(), Some(60));
    assert_eq!(on.velocity(), Some(100));
    assert_eq!(on.value(), None);
    assert_eq!(on.pitch().map(|p| p.number()), Some(60));
    assert_eq!(on.meta_event_type(), None);
}

#[test]
fn controller_accessors() {
    use pretty_assertions::assert_eq;
    let sustain = MidiEvent::new(0, MidiEventType::ControlChange, 1, 0x40, 127);
    assert_eq!(sustain.control_change_type(), Some(ControlChangeType::Sustain));
    assert_eq!(sustain.value(), Some(127));
    assert_eq!(sustain.note(), None);

    let expression = MidiEvent::new(0, MidiEventType::ControlChange, 1, 0x0B, 90);
    assert_eq!(expression.control_change_type(), None);

    let program = MidiEvent::new(0, MidiEventType::ProgramChange, 10, 25, 0);
    assert_eq!(program.value(), Some(25));

    let bend = MidiEvent::new(0, MidiEventType::PitchBendChange, 1, 0x00, 0x40);
    assert_eq!(bend.pitch_bend(), Some(0x2000));
}

#[test]
fn meta_accessors() {
    use pretty_assertions::assert_eq;
    let tempo = MidiEvent::new(0, MidiEventType::MetaEvent, 0x51, 120, 0);
    assert_eq!(tempo.tempo_bpm(), Some(120));
    assert_eq!(tempo.channel(), None);
    assert_eq!(tempo.time_signature(), None);

    let signature = MidiEvent::new(0, MidiEventType::MetaEvent, 0x58, 6, 8);
    assert_eq!(
        signature.time_signature(),
        Some(TimeSignature {
            numerator: 6,
            denominator: 8
        })
    );

    let key = MidiEvent::new(0, MidiEventType::MetaEvent, 0x59, (-3i8) as u8, 1);
    assert_eq!(
        key.key_signature(),
        Some(KeySignature {
            accidentals: -3,
            minor: true
        })
    );
}

#[test]
fn data_lengths() {
    use pretty_assertions::assert_eq;
    assert_eq!(MidiEventType::NoteOn.data_len(), 2);
    assert_eq!(MidiEventType::ProgramChange.data_len(), 1);
    assert_eq!(MidiEventType::ChannelAfterTouch.data_len(), 1);
    assert_eq!(MidiEventType::try_from(0xE0).unwrap(), MidiEventType::PitchBendChange);
    assert!(MidiEventType::try_from(0xF0).is_err());
    assert!(MidiEventType::ControlChange.is_channel_voice());
    assert!(!MidiEventType::MetaEvent.is_channel_voice());
}
