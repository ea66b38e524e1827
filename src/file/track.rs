use crate::{
    ChunkError, ChunkId,
    events::{MetaEventType, MidiEvent, MidiEventType, TEXT_META_TYPES, TextEvent, TextEventType},
    reader::{ReadResult, Reader, ReaderError, ReaderErrorKind},
    reconstruct::{Note, NoteReconstructor, ReconstructOptions},
};
use alloc::vec::Vec;
use tracing::{trace, warn};

#[doc = r#"
The decoded contents of one `MTrk` chunk.

Events are kept in file order. Their times are absolute ticks accumulated
from delta-times, so they never decrease; nothing is sorted or deduplicated.
"#]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiTrack {
    index: usize,
    midi_events: Vec<MidiEvent>,
    text_events: Vec<TextEvent>,
}

impl MidiTrack {
    /// Create a track from already decoded events
    pub fn new(index: usize, midi_events: Vec<MidiEvent>, text_events: Vec<TextEvent>) -> Self {
        Self {
            index,
            midi_events,
            text_events,
        }
    }

    /// Reads one track chunk, including its `MTrk` header.
    ///
    /// The event stream is read through a reader bounded by the chunk's
    /// declared length, so a track can never consume bytes of the next chunk.
    pub(crate) fn read(index: usize, reader: &mut Reader<'_>) -> ReadResult<Self> {
        let position = reader.buffer_position();
        let id = ChunkId(reader.read_exact()?);
        if id != ChunkId::TRACK {
            return Err(ReaderError::new(
                position,
                ReaderErrorKind::chunk(ChunkError::InvalidTrackChunk { index, found: id }),
            ));
        }
        let length = reader.read_u32_be()?;
        let mut events = reader.sub_reader(length as usize)?;

        let mut parser = TrackParser::new(index);
        while !events.is_empty() {
            parser.read_event(&mut events)?;
        }
        Ok(parser.track)
    }

    /// 0-based position among the file's tracks
    pub const fn index(&self) -> usize {
        self.index
    }
    /// Channel voice and interpreted meta events, in file order
    pub fn midi_events(&self) -> &[MidiEvent] {
        &self.midi_events
    }
    /// Text meta events, in file order
    pub fn text_events(&self) -> &[TextEvent] {
        &self.text_events
    }

    /// The value of the first track name event
    pub fn name(&self) -> Option<&str> {
        self.text_events
            .iter()
            .find(|e| e.text_event_type() == Some(TextEventType::TrackName))
            .map(TextEvent::value)
    }

    /// Pairs this track's note events with the default options.
    pub fn notes(&self) -> Vec<Note> {
        self.notes_with(&ReconstructOptions::default())
    }

    /// Pairs this track's note events.
    pub fn notes_with(&self, options: &ReconstructOptions) -> Vec<Note> {
        NoteReconstructor::new(*options).reconstruct(self.index, &self.midi_events)
    }
}

struct TrackParser {
    track: MidiTrack,
    running_status: u8,
    current_time: u32,
}

impl TrackParser {
    fn new(index: usize) -> Self {
        Self {
            track: MidiTrack {
                index,
                ..Default::default()
            },
            running_status: 0,
            current_time: 0,
        }
    }

    fn read_event(&mut self, reader: &mut Reader<'_>) -> ReadResult<()> {
        let delta = reader.read_varlen()?;
        self.current_time = self.current_time.saturating_add(delta);

        let peek = reader.peek_u8()?;
        if peek & 0x80 != 0 {
            reader.read_u8()?;
            self.running_status = peek;
        }

        match self.running_status {
            0x80..=0xEF => self.read_channel_event(reader),
            0xFF => self.read_meta_event(reader),
            0xF0 | 0xF7 => {
                let length = reader.read_varlen()?;
                trace!(
                    "Track {}: skipping {length} bytes of system exclusive data",
                    self.track.index
                );
                reader.skip(length as usize)
            }
            status => {
                warn!(
                    "Track {}: unexpected status {status:#04X} at {}, skipping a byte",
                    self.track.index,
                    reader.buffer_position()
                );
                reader.skip(reader.remaining().min(1))
            }
        }
    }

    fn read_channel_event(&mut self, reader: &mut Reader<'_>) -> ReadResult<()> {
        let status = self.running_status;
        let Ok(mut event_type) = MidiEventType::try_from(status & 0xF0) else {
            return reader.skip(reader.remaining().min(1));
        };
        let channel = (status & 0x0F) + 1;

        let data1 = reader.read_u8()?;
        let data2 = if event_type.data_len() == 2 {
            reader.read_u8()?
        } else {
            0
        };

        if event_type == MidiEventType::NoteOn && data2 == 0 {
            event_type = MidiEventType::NoteOff;
        }

        self.track.midi_events.push(MidiEvent::new(
            self.current_time,
            event_type,
            channel,
            data1,
            data2,
        ));
        Ok(())
    }

    fn read_meta_event(&mut self, reader: &mut Reader<'_>) -> ReadResult<()> {
        let kind = reader.read_u8()?;
        let length = reader.read_varlen()? as usize;

        if TEXT_META_TYPES.contains(&kind) {
            let value = reader.read_fixed_string(length)?;
            self.track
                .text_events
                .push(TextEvent::new(self.current_time, kind, value));
            return Ok(());
        }

        let payload = reader.read_slice(length)?;
        let Ok(meta) = MetaEventType::try_from(kind) else {
            trace!(
                "Track {}: skipping meta event {kind:#04X} ({length} bytes)",
                self.track.index
            );
            return Ok(());
        };

        match meta.decode(payload) {
            Some((arg2, arg3)) => self.track.midi_events.push(MidiEvent::new(
                self.current_time,
                MidiEventType::MetaEvent,
                kind,
                arg2,
                arg3,
            )),
            None => warn!(
                "Track {}: {meta:?} meta event at tick {} is too short ({length} bytes), skipping",
                self.track.index,
                self.current_time
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
fn read_track(events: &[u8]) -> ReadResult<MidiTrack> {
    let mut bytes = alloc::vec::Vec::from(*b"MTrk");
    bytes.extend_from_slice(&(events.len() as u32).to_be_bytes());
    bytes.extend_from_slice(events);
    MidiTrack::read(0, &mut Reader::from_byte_slice(&bytes))
}

#[test]
fn running_status_reuses_previous_status() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[0x00, 0x91, 60, 100, 0x0A, 64, 0]).unwrap();

    assert_eq!(
        track.midi_events(),
        &[
            MidiEvent::note_on(0, 2, 60, 100),
            MidiEvent::new(10, MidiEventType::NoteOff, 2, 64, 0),
        ]
    );
}

#[test]
fn one_data_byte_events() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[0x00, 0xC0, 5, 0x00, 0xD9, 30, 0x00, 0xE0, 0x00, 0x40]).unwrap();

    assert_eq!(
        track.midi_events(),
        &[
            MidiEvent::new(0, MidiEventType::ProgramChange, 1, 5, 0),
            MidiEvent::new(0, MidiEventType::ChannelAfterTouch, 10, 30, 0),
            MidiEvent::new(0, MidiEventType::PitchBendChange, 1, 0x00, 0x40),
        ]
    );
}

#[test]
fn meta_events() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[
        0x00, 0xFF, 0x03, 0x05, b'P', b'i', b'a', b'n', b'o', // track name
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo 500_000
        0x00, 0xFF, 0x58, 0x04, 0x03, 0x02, 0x18, 0x08, // 3/4
        0x00, 0xFF, 0x59, 0x02, 0x02, 0x00, // D major
        0x00, 0xFF, 0x54, 0x05, 0x41, 0x17, 0x2D, 0x0C, 0x22, // smpte offset
        0x60, 0xFF, 0x2F, 0x00, // end of track
    ])
    .unwrap();

    assert_eq!(track.name(), Some("Piano"));
    assert_eq!(
        track.midi_events(),
        &[
            MidiEvent::new(0, MidiEventType::MetaEvent, 0x51, 120, 0),
            MidiEvent::new(0, MidiEventType::MetaEvent, 0x58, 3, 4),
            MidiEvent::new(0, MidiEventType::MetaEvent, 0x59, 2, 0),
        ]
    );
}

#[test]
fn short_meta_payload_is_skipped() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[0x00, 0xFF, 0x51, 0x02, 0x07, 0xA1, 0x00, 0x90, 60, 1]).unwrap();

    assert_eq!(track.midi_events(), &[MidiEvent::note_on(0, 1, 60, 1)]);
}

#[test]
fn sysex_is_skipped() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[
        0x00, 0xF0, 0x04, 0x43, 0x12, 0x00, 0xF7, // sysex
        0x00, 0xF7, 0x01, 0xF7, // escape
        0x05, 0x80, 60, 0x40,
    ])
    .unwrap();

    assert_eq!(
        track.midi_events(),
        &[MidiEvent::new(5, MidiEventType::NoteOff, 1, 60, 0x40)]
    );
}

#[test]
fn stray_data_byte_without_status_is_skipped() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[0x00, 0x3C, 0x00, 0x90, 60, 100]).unwrap();

    assert_eq!(track.midi_events(), &[MidiEvent::note_on(0, 1, 60, 100)]);
}

#[test]
fn system_common_status_is_skipped() {
    use pretty_assertions::assert_eq;
    let track = read_track(&[
        0x00, 0xF1, 0x05, // quarter frame and its data byte
        0x03, 0x90, 60, 100, //
        0x05, 0x80, 60, 0x40,
    ])
    .unwrap();

    assert_eq!(
        track.midi_events(),
        &[
            MidiEvent::note_on(3, 1, 60, 100),
            MidiEvent::new(8, MidiEventType::NoteOff, 1, 60, 0x40),
        ]
    );
    assert_eq!(
        track.notes(),
        [Note::new(crate::Pitch::new(60), 3, 8, 100, 1, 0)]
    );
}

#[test]
fn truncated_event_is_fatal() {
    let err = read_track(&[0x00, 0x90, 60]).unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 11);
}
