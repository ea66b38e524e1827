#![allow(dead_code)]

use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

use keyfall::prelude::encode_varlen;
use tracing_subscriber::fmt::MakeWriter;

/// Builds the raw event bytes of a track chunk.
#[derive(Default)]
pub struct TrackBytes(Vec<u8>);

impl TrackBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta-time followed by raw bytes, status byte included or not.
    pub fn event(mut self, delta: u32, bytes: &[u8]) -> Self {
        self.0.extend(encode_varlen(delta));
        self.0.extend_from_slice(bytes);
        self
    }

    /// `channel` is 0-based, as on the wire
    pub fn note_on(self, delta: u32, channel: u8, note: u8, velocity: u8) -> Self {
        self.event(delta, &[0x90 | channel, note, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, note: u8) -> Self {
        self.event(delta, &[0x80 | channel, note, 0x40])
    }

    pub fn meta(self, delta: u32, kind: u8, payload: &[u8]) -> Self {
        let mut bytes = vec![0xFF, kind];
        bytes.extend(encode_varlen(payload.len() as u32));
        bytes.extend_from_slice(payload);
        self.event(delta, &bytes)
    }

    pub fn tempo(self, delta: u32, micros_per_quarter_note: u32) -> Self {
        self.meta(delta, 0x51, &micros_per_quarter_note.to_be_bytes()[1..])
    }

    pub fn track_name(self, name: &str) -> Self {
        self.meta(0, 0x03, name.as_bytes())
    }

    pub fn end_of_track(self, delta: u32) -> Self {
        self.meta(delta, 0x2F, &[])
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Builds a whole file, header included.
pub struct SmfBuilder {
    format: u16,
    division: u16,
    tracks: Vec<Vec<u8>>,
}

impl SmfBuilder {
    pub fn new(division: u16) -> Self {
        Self {
            format: 1,
            division,
            tracks: Vec::new(),
        }
    }

    pub fn format(mut self, format: u16) -> Self {
        self.format = format;
        self
    }

    pub fn track(mut self, track: TrackBytes) -> Self {
        self.tracks.push(track.into_bytes());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&self.format.to_be_bytes());
        bytes.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&self.division.to_be_bytes());
        for track in &self.tracks {
            bytes.extend_from_slice(b"MTrk");
            bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
            bytes.extend_from_slice(track);
        }
        bytes
    }
}

/// Collects formatted log lines emitted while `f` runs, at `WARN` and above.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    let bytes = logs.0.lock().unwrap_or_else(PoisonError::into_inner);
    (value, String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
