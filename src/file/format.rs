use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
How the tracks of a MIDI file relate to each other.

The raw header value is kept on [`Header::format`](super::Header::format);
files with a format number outside `0..=2` are still read.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum FormatType {
    /// Format 0: a single track holding every channel
    SingleMultiChannel = 0,
    /// Format 1: multiple tracks played simultaneously
    Simultaneous = 1,
    /// Format 2: multiple independent sequences
    SequentiallyIndependent = 2,
}
