use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Controllers that storyboard generators commonly key visuals off.
///
/// Any other controller number is still decoded; it simply has no name here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ControlChangeType {
    #[allow(missing_docs)]
    BankSelect = 0x00,
    #[allow(missing_docs)]
    Modulation = 0x01,
    #[allow(missing_docs)]
    Volume = 0x07,
    #[allow(missing_docs)]
    Balance = 0x08,
    #[allow(missing_docs)]
    Pan = 0x0A,
    /// Damper pedal. Values of 64 and above hold notes.
    Sustain = 0x40,
}
