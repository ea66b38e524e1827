mod common;

use common::{SmfBuilder, TrackBytes};
use keyfall::prelude::*;
use pretty_assertions::assert_eq;

fn parse_error(bytes: &[u8]) -> (usize, ParseError) {
    let err = MidiFile::parse(bytes).unwrap_err();
    let kind = err
        .parse_error()
        .cloned()
        .unwrap_or_else(|| panic!("expected a parse error, got {err}"));
    (err.position(), kind)
}

#[test]
fn rejects_missing_header_chunk() {
    let mut bytes = SmfBuilder::new(480).track(TrackBytes::new()).build();
    bytes[..4].copy_from_slice(b"RIFF");

    assert_eq!(
        parse_error(&bytes),
        (
            0,
            ParseError::Chunk(ChunkError::InvalidHeaderChunk {
                found: ChunkId(*b"RIFF")
            })
        )
    );
}

#[test]
fn rejects_header_length_other_than_six() {
    let mut bytes = SmfBuilder::new(480).build();
    bytes[4..8].copy_from_slice(&8u32.to_be_bytes());

    assert_eq!(
        parse_error(&bytes),
        (4, ParseError::Chunk(ChunkError::InvalidHeaderLength(8)))
    );
}

#[test]
fn rejects_smpte_timing() {
    for division in [0x8000, 0xE728, 0xFFFF] {
        let bytes = SmfBuilder::new(division).track(TrackBytes::new()).build();

        assert_eq!(
            parse_error(&bytes),
            (12, ParseError::Header(HeaderError::UnsupportedTiming(division)))
        );
    }
}

#[test]
fn rejects_zero_ticks_per_quarter_note() {
    let bytes = SmfBuilder::new(0).build();

    assert_eq!(
        parse_error(&bytes),
        (12, ParseError::Header(HeaderError::ZeroTicksPerQuarterNote))
    );
}

#[test]
fn rejects_invalid_track_header() {
    let first = TrackBytes::new().end_of_track(0);
    let mut bytes = SmfBuilder::new(96)
        .track(first)
        .track(TrackBytes::new().end_of_track(0))
        .build();
    // header (14) + first track (8 + 4)
    bytes[26..30].copy_from_slice(b"MTrX");

    assert_eq!(
        parse_error(&bytes),
        (
            26,
            ParseError::Chunk(ChunkError::InvalidTrackChunk {
                index: 1,
                found: ChunkId(*b"MTrX")
            })
        )
    );
}

#[test]
fn truncated_header_is_out_of_bounds() {
    let bytes = SmfBuilder::new(480).build();
    let err = MidiFile::parse(&bytes[..10]).unwrap_err();

    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 10);
}

#[test]
fn reads_tracks_in_file_order() {
    let bytes = SmfBuilder::new(480)
        .track(TrackBytes::new().track_name("Conductor").tempo(0, 500_000))
        .track(TrackBytes::new().track_name("Piano").note_on(0, 0, 60, 90))
        .track(TrackBytes::new().track_name("Bass").note_on(0, 1, 36, 90))
        .build();
    let file = MidiFile::parse(&bytes).unwrap();

    assert_eq!(
        file.header(),
        &Header::new(1, 3, Timing::new_ticks_per_quarter_note(480))
    );
    assert_eq!(file.format_type(), Some(FormatType::Simultaneous));
    assert_eq!(file.ticks_per_quarter_note(), 480);

    let names: Vec<_> = file.tracks().iter().map(MidiTrack::name).collect();
    assert_eq!(names, [Some("Conductor"), Some("Piano"), Some("Bass")]);

    let indices: Vec<_> = file.tracks().iter().map(MidiTrack::index).collect();
    assert_eq!(indices, [0, 1, 2]);

    assert_eq!(file.tracks()[0].midi_events()[0].tempo_bpm(), Some(120));
}

#[test]
fn ticks_per_quarter_note_uses_low_bits() {
    let bytes = SmfBuilder::new(0x7FFF).format(0).build();
    let file = MidiFile::parse(&bytes).unwrap();

    assert_eq!(file.ticks_per_quarter_note(), 0x7FFF);
    assert_eq!(file.format_type(), Some(FormatType::SingleMultiChannel));
    assert!(file.tracks().is_empty());
}

#[test]
fn unknown_format_is_tolerated() {
    let bytes = SmfBuilder::new(96).format(7).track(TrackBytes::new()).build();
    let file = MidiFile::parse(&bytes).unwrap();

    assert_eq!(file.format(), 7);
    assert_eq!(file.format_type(), None);
    assert_eq!(file.tracks().len(), 1);
}

#[test]
fn running_status_note_on_with_zero_velocity_is_note_off() {
    let track = TrackBytes::new()
        .event(0, &[0x90, 60, 100])
        .event(10, &[64, 0]);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    let events = file.tracks()[0].midi_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], MidiEvent::note_on(0, 1, 60, 100));

    let off = events[1];
    assert_eq!(off.event_type(), MidiEventType::NoteOff);
    assert_eq!(off.time(), 10);
    assert_eq!(off.channel(), Some(1));
    assert_eq!(off.note(), Some(64));
    assert_eq!(off.velocity(), Some(0));
}

#[test]
fn times_accumulate_from_deltas() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(200, 0, 62, 100)
        .note_off(0, 0, 60)
        .note_off(0x0FFF_FFFF, 0, 62)
        .end_of_track(0);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    let times: Vec<_> = file.tracks()[0]
        .midi_events()
        .iter()
        .map(MidiEvent::time)
        .collect();
    assert_eq!(times, [0, 200, 200, 200 + 0x0FFF_FFFF]);
}

#[test]
fn track_is_bounded_by_its_declared_length() {
    let track = TrackBytes::new().note_on(0, 0, 60, 100);
    let mut bytes = SmfBuilder::new(96).track(track).build();
    // declare one byte less than the event needs
    bytes[18..22].copy_from_slice(&3u32.to_be_bytes());

    let err = MidiFile::parse(&bytes).unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 25);
}

#[test]
fn track_length_past_end_of_file_is_out_of_bounds() {
    let track = TrackBytes::new().note_on(0, 0, 60, 100);
    let mut bytes = SmfBuilder::new(96).track(track).build();
    bytes[18..22].copy_from_slice(&100u32.to_be_bytes());

    let err = MidiFile::parse(&bytes).unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 22);
}

#[test]
fn overlong_delta_time_is_rejected() {
    let mut track = TrackBytes::new().into_bytes();
    track.extend_from_slice(&[0x80, 0x80, 0x80, 0x80, 0x00, 0x90, 60, 100]);
    let mut bytes = SmfBuilder::new(96).build();
    bytes[10..12].copy_from_slice(&1u16.to_be_bytes());
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&track);

    assert_eq!(parse_error(&bytes), (22, ParseError::VarLenTooLong));
}

#[test]
fn text_events_are_latin1() {
    let track = TrackBytes::new()
        .meta(0, 0x01, b"caf\xe9")
        .meta(48, 0x05, b"la")
        .meta(96, 0x0F, b"?");
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    let text = file.tracks()[0].text_events();
    assert_eq!(text.len(), 3);
    assert_eq!(text[0].value(), "caf\u{e9}");
    assert_eq!(text[0].text_event_type(), Some(TextEventType::Text));
    assert_eq!(text[1].time(), 48);
    assert_eq!(text[1].text_event_type(), Some(TextEventType::Lyric));
    assert_eq!(text[2].kind(), 0x0F);
    assert_eq!(text[2].text_event_type(), None);
    assert!(file.tracks()[0].midi_events().is_empty());
}

#[test]
fn meta_events_are_decoded() {
    let track = TrackBytes::new()
        .tempo(0, 400_000)
        .meta(0, 0x58, &[7, 3, 24, 8])
        .meta(0, 0x59, &[0xFE, 1])
        .meta(0, 0x7F, &[0x00, 0x00, 0x41])
        .end_of_track(0);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    let events = file.tracks()[0].midi_events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].tempo_bpm(), Some(150));
    assert_eq!(
        events[1].time_signature(),
        Some(TimeSignature {
            numerator: 7,
            denominator: 8
        })
    );
    assert_eq!(
        events[2].key_signature(),
        Some(KeySignature {
            accidentals: -2,
            minor: true
        })
    );
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = SmfBuilder::new(96)
        .track(TrackBytes::new().end_of_track(0))
        .build();
    bytes.extend_from_slice(b"XFIH\x00\x00");

    let file = MidiFile::parse(&bytes).unwrap();
    assert_eq!(file.tracks().len(), 1);
}

#[test]
fn load_reads_from_disk() {
    let bytes = SmfBuilder::new(240)
        .track(TrackBytes::new().note_on(0, 0, 60, 90).note_off(240, 0, 60))
        .build();
    let path = std::env::temp_dir().join(format!("keyfall-load-{}.mid", std::process::id()));
    std::fs::write(&path, &bytes).unwrap();

    let loaded = MidiFile::load(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.unwrap(), MidiFile::parse(&bytes).unwrap());
    assert!(matches!(
        MidiFile::load(path.with_extension("missing")),
        Err(LoadError::Io(_))
    ));
}
