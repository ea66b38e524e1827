mod common;

use common::{SmfBuilder, TrackBytes, capture_warnings};
use keyfall::prelude::*;
use pretty_assertions::assert_eq;

fn spans(notes: &[Note]) -> Vec<(u8, u32, u32)> {
    notes
        .iter()
        .map(|n| (n.pitch().number(), n.start_tick(), n.end_tick()))
        .collect()
}

#[test]
fn single_quarter_note() {
    let bytes = SmfBuilder::new(480)
        .track(
            TrackBytes::new()
                .note_on(0, 0, 60, 80)
                .note_off(480, 0, 60)
                .end_of_track(0),
        )
        .build();
    let file = MidiFile::parse(&bytes).unwrap();
    let notes = file.notes();

    assert_eq!(notes, [Note::new(Pitch::new(60), 0, 480, 80, 1, 0)]);
    assert_eq!(notes[0].pitch().to_string(), "C4");

    let clock = file.clock(500.).with_offset(1000.);
    assert_eq!(clock.note_span(&notes[0]), (1000., 1500.));
}

#[test]
fn running_status_note_offs_close_notes() {
    let track = TrackBytes::new()
        .event(0, &[0x92, 64, 90])
        .event(0, &[67, 90])
        .event(240, &[64, 0])
        .event(0, &[67, 0]);
    let bytes = SmfBuilder::new(480).track(track).build();
    let notes = MidiFile::parse(&bytes).unwrap().notes();

    assert_eq!(spans(&notes), [(64, 0, 240), (67, 0, 240)]);
    assert!(notes.iter().all(|n| n.channel() == 3));
}

#[test]
fn interleaved_pairs_are_repaired() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(10, 0, 64, 100)
        .note_off(10, 0, 64)
        .note_off(10, 0, 60);
    let bytes = SmfBuilder::new(96).track(track).build();
    let notes = MidiFile::parse(&bytes).unwrap().notes();

    assert_eq!(spans(&notes), [(60, 0, 30), (64, 10, 20)]);
}

#[test]
fn repairs_are_logged() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(1, 0, 62, 100)
        .note_off(4, 0, 62);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    // the second note on has no note off at its own position
    let (notes, logs) = capture_warnings(|| file.notes());

    assert_eq!(spans(&notes), [(62, 1, 5)]);
    assert_eq!(logs.matches("repaired to end at tick 5").count(), 1, "{logs}");
    assert!(logs.contains("note 62 at tick 1"), "{logs}");
}

#[test]
fn interleaved_repair_is_logged() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(10, 0, 64, 100)
        .note_off(10, 0, 64)
        .note_off(10, 0, 60);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    let (_, logs) = capture_warnings(|| file.notes());

    assert_eq!(logs.matches("repaired to end at tick").count(), 2, "{logs}");
}

#[test]
fn tracks_built_in_memory_pair_notes() {
    let track = MidiTrack::new(
        4,
        vec![
            MidiEvent::note_on(0, 2, 67, 64),
            MidiEvent::note_off(48, 2, 67),
        ],
        vec![TextEvent::new(0, 0x03, "Lead")],
    );

    assert_eq!(track.name(), Some("Lead"));
    assert_eq!(track.notes(), [Note::new(Pitch::new(67), 0, 48, 64, 2, 4)]);
}

#[test]
fn notes_keep_their_track() {
    let bytes = SmfBuilder::new(96)
        .track(TrackBytes::new().track_name("Tempo").tempo(0, 500_000))
        .track(TrackBytes::new().note_on(0, 0, 48, 70).note_off(96, 0, 48))
        .track(TrackBytes::new().note_on(48, 9, 36, 127).note_off(12, 9, 36))
        .build();
    let notes = MidiFile::parse(&bytes).unwrap().notes();

    assert_eq!(spans(&notes), [(48, 0, 96), (36, 48, 60)]);
    assert_eq!(
        notes.iter().map(Note::track_index).collect::<Vec<_>>(),
        [1, 2]
    );
    assert_eq!(notes[1].channel(), 10);
}

#[test]
fn dangling_note_is_dropped() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(0, 0, 62, 100)
        .note_off(96, 0, 60);
    let bytes = SmfBuilder::new(96).track(track).build();
    let notes = MidiFile::parse(&bytes).unwrap().notes();

    assert_eq!(spans(&notes), [(60, 0, 96)]);
}

#[test]
fn channel_matching_is_opt_in() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(0, 1, 60, 100)
        .note_off(10, 1, 60)
        .note_off(10, 0, 60);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    assert_eq!(spans(&file.notes()), [(60, 0, 10), (60, 0, 20)]);

    let matched = file.notes_with(&ReconstructOptions::default().with_match_channel(true));
    assert_eq!(
        matched
            .iter()
            .map(|n| (n.channel(), n.end_tick()))
            .collect::<Vec<_>>(),
        [(1, 20), (2, 10)]
    );
}

#[test]
fn stack_strategy_closes_latest_note() {
    let track = TrackBytes::new()
        .note_on(0, 0, 60, 100)
        .note_on(10, 0, 60, 100)
        .note_off(10, 0, 60)
        .note_off(10, 0, 60);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();

    assert_eq!(spans(&file.notes()), [(60, 0, 20), (60, 10, 30)]);

    let stacked =
        file.notes_with(&ReconstructOptions::default().with_strategy(PairingStrategy::PerPitchStack));
    assert_eq!(spans(&stacked), [(60, 0, 30), (60, 10, 20)]);
}

#[test]
fn zero_length_notes_are_left_to_the_caller() {
    let track = TrackBytes::new().note_on(0, 0, 72, 100).note_off(0, 0, 72);
    let bytes = SmfBuilder::new(96).track(track).build();
    let file = MidiFile::parse(&bytes).unwrap();
    let notes = file.notes();

    assert_eq!(spans(&notes), [(72, 0, 0)]);
    assert_eq!(notes[0].duration_ticks(), 0);

    let clock = file.clock(500.);
    let kept: Vec<_> = notes
        .iter()
        .map(|n| clock.note_span(n))
        .filter(|(start, end)| end > start)
        .collect();
    assert!(kept.is_empty());
}
