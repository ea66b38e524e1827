use alloc::string::String;
use core::ops::RangeInclusive;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Meta types `0x01..=0x0F` are all length-prefixed text.
pub const TEXT_META_TYPES: RangeInclusive<u8> = 0x01..=0x0F;

/// Named text meta events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TextEventType {
    #[allow(missing_docs)]
    Text = 0x01,
    #[allow(missing_docs)]
    Copyright = 0x02,
    /// Sequence name in the first track of a format 1 file, track name otherwise
    TrackName = 0x03,
    #[allow(missing_docs)]
    InstrumentName = 0x04,
    #[allow(missing_docs)]
    Lyric = 0x05,
    #[allow(missing_docs)]
    Marker = 0x06,
    #[allow(missing_docs)]
    CuePoint = 0x07,
}

/// A text meta event at an absolute tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextEvent {
    time: u32,
    kind: u8,
    value: String,
}

impl TextEvent {
    /// Create a text event. `kind` is the raw meta type.
    pub fn new(time: u32, kind: u8, value: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            value: value.into(),
        }
    }
    /// Absolute tick, counted from the start of the track
    pub const fn time(&self) -> u32 {
        self.time
    }
    /// The raw meta type, `0x01..=0x0F`
    pub const fn kind(&self) -> u8 {
        self.kind
    }
    /// The meta type, if it is one of the named ones
    pub fn text_event_type(&self) -> Option<TextEventType> {
        TextEventType::try_from(self.kind).ok()
    }
    /// The text, decoded one byte per character (Latin-1)
    pub fn value(&self) -> &str {
        &self.value
    }
}
