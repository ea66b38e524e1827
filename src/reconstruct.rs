#![doc = r#"
Pairing note on and note off events into [`Note`]s.

# Strategies

[`PairingStrategy::IndexWindow`] (the default) pairs the `i`th note on of a
track with the `i`th note off, which is right for the common case where notes
are released in the order they were pressed. When that note off has a
different note number, the pairs are interleaved; the matching note off is
then searched for starting a few positions earlier (see
[`ReconstructOptions::lookback`]), taking the first one with the same note
number that comes strictly after the note on. This is a heuristic and
pathological interleavings can still be mis-paired.

[`PairingStrategy::PerPitchStack`] closes the most recent open note of the
same pitch at every note off. It is more robust, but produces different notes
than the default for some files.

Note ons that find no note off are dropped. Notes whose end is not after
their start are returned as-is; rejecting them is up to the caller, after any
remapping of times it performs.
"#]

use crate::{
    Pitch,
    events::{MidiEvent, MidiEventType},
};
use alloc::{collections::BTreeMap, vec::Vec};
use tracing::{debug, warn};

/// A note with a start and an end, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pitch: Pitch,
    start_tick: u32,
    end_tick: u32,
    velocity: u8,
    channel: u8,
    track_index: usize,
}

impl Note {
    /// Create a note. `channel` is 1-based.
    pub const fn new(
        pitch: Pitch,
        start_tick: u32,
        end_tick: u32,
        velocity: u8,
        channel: u8,
        track_index: usize,
    ) -> Self {
        Self {
            pitch,
            start_tick,
            end_tick,
            velocity,
            channel,
            track_index,
        }
    }

    fn from_pair(on: &MidiEvent, end_tick: u32, track_index: usize) -> Self {
        Self::new(
            Pitch::new(on.arg2()),
            on.time(),
            end_tick,
            on.arg3(),
            on.arg1(),
            track_index,
        )
    }

    /// The note number
    pub const fn pitch(&self) -> Pitch {
        self.pitch
    }
    /// Tick of the note on
    pub const fn start_tick(&self) -> u32 {
        self.start_tick
    }
    /// Tick of the matching note off
    pub const fn end_tick(&self) -> u32 {
        self.end_tick
    }
    /// Note on velocity
    pub const fn velocity(&self) -> u8 {
        self.velocity
    }
    /// 1-based channel of the note on
    pub const fn channel(&self) -> u8 {
        self.channel
    }
    /// Index of the track the note came from
    pub const fn track_index(&self) -> usize {
        self.track_index
    }
    /// `end - start`, negative if the pair is reversed
    pub const fn duration_ticks(&self) -> i64 {
        self.end_tick as i64 - self.start_tick as i64
    }
}

/// How note offs are matched to note ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairingStrategy {
    /// Pair by position, repairing interleaved pairs with a forward scan
    #[default]
    IndexWindow,
    /// Close the most recent open note of the same pitch
    PerPitchStack,
}

/// Options for [`NoteReconstructor`].
///
/// The default reproduces positional pairing, ignoring channels, with a
/// look-back of 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconstructOptions {
    /// The pairing strategy
    pub strategy: PairingStrategy,
    /// Only pair events on the same channel
    pub match_channel: bool,
    /// How many note offs before the `i`th one the repair scan starts at.
    ///
    /// Only used by [`PairingStrategy::IndexWindow`].
    pub lookback: usize,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            strategy: PairingStrategy::IndexWindow,
            match_channel: false,
            lookback: 2,
        }
    }
}

impl ReconstructOptions {
    /// Set the pairing strategy
    pub const fn with_strategy(mut self, strategy: PairingStrategy) -> Self {
        self.strategy = strategy;
        self
    }
    /// Require matching channels
    pub const fn with_match_channel(mut self, match_channel: bool) -> Self {
        self.match_channel = match_channel;
        self
    }
    /// Set the repair scan's look-back
    pub const fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }
}

/// Turns a track's ordered events into notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteReconstructor {
    options: ReconstructOptions,
}

impl NoteReconstructor {
    /// Create a reconstructor
    pub const fn new(options: ReconstructOptions) -> Self {
        Self { options }
    }

    /// The options in use
    pub const fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Pairs the note events of one track, in file order.
    ///
    /// Notes are returned in the order of their note on events.
    pub fn reconstruct(&self, track_index: usize, events: &[MidiEvent]) -> Vec<Note> {
        match self.options.strategy {
            PairingStrategy::IndexWindow => self.by_index(track_index, events),
            PairingStrategy::PerPitchStack => self.by_stack(track_index, events),
        }
    }

    fn pairs(&self, on: &MidiEvent, off: &MidiEvent) -> bool {
        on.arg2() == off.arg2() && (!self.options.match_channel || on.arg1() == off.arg1())
    }

    fn by_index(&self, track_index: usize, events: &[MidiEvent]) -> Vec<Note> {
        let of_type = |ty: MidiEventType| events.iter().filter(move |e| e.event_type() == ty);
        let ons: Vec<_> = of_type(MidiEventType::NoteOn).collect();
        let offs: Vec<_> = of_type(MidiEventType::NoteOff).collect();

        let mut notes = Vec::with_capacity(ons.len());
        for (i, on) in ons.into_iter().enumerate() {
            let paired = offs.get(i).copied();
            let end = match paired {
                Some(off) if self.pairs(on, off) => Some(off.time()),
                _ => {
                    let found = offs
                        .iter()
                        .skip(i.saturating_sub(self.options.lookback))
                        .find(|off| self.pairs(on, off) && off.time() > on.time())
                        .map(|off| off.time());
                    match (paired, found) {
                        (Some(off), Some(end)) => warn!(
                            "Track {track_index}: note {} at tick {} paired with note off for {}, \
                             repaired to end at tick {end}",
                            on.arg2(),
                            on.time(),
                            off.arg2()
                        ),
                        (None, Some(end)) => warn!(
                            "Track {track_index}: note {} at tick {} has no note off of its own, \
                             repaired to end at tick {end}",
                            on.arg2(),
                            on.time()
                        ),
                        _ => {}
                    }
                    found
                }
            };

            match end {
                Some(end) => notes.push(Note::from_pair(on, end, track_index)),
                None => debug!(
                    "Track {track_index}: dropping note {} at tick {} without a note off",
                    on.arg2(),
                    on.time()
                ),
            }
        }
        notes
    }

    fn by_stack(&self, track_index: usize, events: &[MidiEvent]) -> Vec<Note> {
        let key = |e: &MidiEvent| {
            let channel = if self.options.match_channel { e.arg1() } else { 0 };
            (channel, e.arg2())
        };

        let mut open: BTreeMap<(u8, u8), Vec<(usize, &MidiEvent)>> = BTreeMap::new();
        let mut closed = Vec::new();
        let mut order = 0;

        for event in events {
            match event.event_type() {
                MidiEventType::NoteOn => {
                    open.entry(key(event)).or_default().push((order, event));
                    order += 1;
                }
                MidiEventType::NoteOff => {
                    match open.get_mut(&key(event)).and_then(Vec::pop) {
                        Some((order, on)) => {
                            closed.push((order, Note::from_pair(on, event.time(), track_index)))
                        }
                        None => debug!(
                            "Track {track_index}: ignoring note off {} at tick {} with no open note",
                            event.arg2(),
                            event.time()
                        ),
                    }
                }
                _ => {}
            }
        }

        let dangling: usize = open.values().map(Vec::len).sum();
        if dangling > 0 {
            debug!("Track {track_index}: dropping {dangling} notes without a note off");
        }

        closed.sort_by_key(|(order, _)| *order);
        closed.into_iter().map(|(_, note)| note).collect()
    }
}

#[cfg(test)]
fn spans(notes: &[Note]) -> Vec<(u8, u32, u32)> {
    notes
        .iter()
        .map(|n| (n.pitch().number(), n.start_tick(), n.end_tick()))
        .collect()
}

#[test]
fn default_options_pair_by_index() {
    use pretty_assertions::assert_eq;
    let reconstructor = NoteReconstructor::default();
    assert_eq!(
        reconstructor.options(),
        &ReconstructOptions {
            strategy: PairingStrategy::IndexWindow,
            match_channel: false,
            lookback: 2,
        }
    );
}

#[test]
fn pairs_in_order() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 80),
        MidiEvent::new(0, MidiEventType::ControlChange, 1, 0x40, 127),
        MidiEvent::note_off(480, 1, 60),
    ];
    let notes = NoteReconstructor::default().reconstruct(3, &events);

    assert_eq!(notes, [Note::new(Pitch::new(60), 0, 480, 80, 1, 3)]);
}

#[test]
fn repairs_interleaved_pairs() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 100),
        MidiEvent::note_on(5, 1, 62, 100),
        MidiEvent::note_off(10, 1, 62),
        MidiEvent::note_off(20, 1, 60),
    ];
    let notes = NoteReconstructor::default().reconstruct(0, &events);

    assert_eq!(spans(&notes), [(60, 0, 20), (62, 5, 10)]);
}

#[test]
fn repair_requires_a_later_note_off() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 100),
        MidiEvent::note_off(10, 1, 60),
        MidiEvent::note_on(20, 1, 62, 100),
        MidiEvent::note_on(30, 1, 60, 100),
        MidiEvent::note_off(40, 1, 62),
    ];
    let notes = NoteReconstructor::default().reconstruct(0, &events);

    // the second 60 only has an earlier note off to pair with
    assert_eq!(spans(&notes), [(60, 0, 10), (62, 20, 40)]);
}

#[test]
fn drops_dangling_notes() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 100),
        MidiEvent::note_on(5, 1, 64, 100),
        MidiEvent::note_off(10, 1, 60),
    ];
    let notes = NoteReconstructor::default().reconstruct(0, &events);

    assert_eq!(spans(&notes), [(60, 0, 10)]);
}

#[test]
fn lookback_limits_the_repair_scan() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 100),
        MidiEvent::note_on(1, 1, 62, 100),
        MidiEvent::note_on(2, 1, 64, 100),
        MidiEvent::note_off(3, 1, 64),
        MidiEvent::note_off(4, 1, 60),
        MidiEvent::note_off(5, 1, 62),
    ];

    assert_eq!(
        spans(&NoteReconstructor::default().reconstruct(0, &events)),
        [(60, 0, 4), (62, 1, 5), (64, 2, 3)]
    );

    // the note off for 64 sits two positions before the third note on
    let zero = NoteReconstructor::new(ReconstructOptions::default().with_lookback(0));
    assert_eq!(
        spans(&zero.reconstruct(0, &events)),
        [(60, 0, 4), (62, 1, 5)]
    );
}

#[test]
fn channel_matching() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 100),
        MidiEvent::note_on(0, 2, 60, 90),
        MidiEvent::note_off(10, 2, 60),
        MidiEvent::note_off(20, 1, 60),
    ];

    let loose = NoteReconstructor::default().reconstruct(0, &events);
    assert_eq!(spans(&loose), [(60, 0, 10), (60, 0, 20)]);

    let strict = NoteReconstructor::new(ReconstructOptions::default().with_match_channel(true))
        .reconstruct(0, &events);
    assert_eq!(strict[0].channel(), 1);
    assert_eq!(spans(&strict), [(60, 0, 20), (60, 0, 10)]);
}

#[test]
fn stack_pairs_most_recent_open_note() {
    use pretty_assertions::assert_eq;
    let events = [
        MidiEvent::note_on(0, 1, 60, 100),
        MidiEvent::note_on(5, 1, 60, 100),
        MidiEvent::note_off(10, 1, 60),
        MidiEvent::note_on(12, 1, 64, 100),
        MidiEvent::note_off(20, 1, 60),
        MidiEvent::note_off(25, 1, 67),
    ];
    let stack = NoteReconstructor::new(
        ReconstructOptions::default().with_strategy(PairingStrategy::PerPitchStack),
    );

    assert_eq!(spans(&stack.reconstruct(0, &events)), [(60, 0, 20), (60, 5, 10)]);
    assert_eq!(
        spans(&NoteReconstructor::default().reconstruct(0, &events)),
        [(60, 0, 10), (60, 5, 20)]
    );
}

#[test]
fn reversed_pairs_are_kept_for_the_caller() {
    let events = [
        MidiEvent::note_off(0, 1, 60),
        MidiEvent::note_on(10, 1, 60, 100),
    ];
    let notes = NoteReconstructor::default().reconstruct(0, &events);

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].duration_ticks(), -10);
}
