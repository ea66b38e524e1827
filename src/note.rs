use core::fmt;

#[doc = r#"
A MIDI note number.

Each value corresponds to some [`Key`] and octave: [`Pitch`] `0` is `C-1`,
[`Pitch`] `60` is `C4` (middle C) and [`Pitch`] `127` is `G9`.

The [`Display`](fmt::Display) form is the key name followed by the octave,
e.g. `C4` or `CSharp4`, which is what storyboard scripts use to look up
piano key sprites.

# Example
```rust
# use keyfall::prelude::*;

let pitch = Pitch::new(63);

assert_eq!(pitch.key(), Key::DSharp);
assert_eq!(pitch.octave(), 4);
assert_eq!(pitch.to_string(), "DSharp4");
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pitch(u8);

impl Pitch {
    /// Wraps a note number. Well-formed files only use `0..=127`.
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// Create a pitch from a key and octave.
    ///
    /// Returns `None` if the result is not a valid 7-bit note number.
    pub const fn from_key(key: Key, octave: i8) -> Option<Self> {
        if octave < -1 {
            return None;
        }
        let number = (octave as i16 + 1) * 12 + key.get_mod_12() as i16;
        if number > 127 {
            return None;
        }
        Some(Self(number as u8))
    }

    /// The raw note number
    pub const fn number(&self) -> u8 {
        self.0
    }

    /// Identifies the key of the note pressed
    #[inline]
    pub const fn key(&self) -> Key {
        Key::from_number(self.0)
    }

    /// Identifies the octave of the note pressed, `-1` for the lowest notes
    #[inline]
    pub const fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Returns true if the key of the note is sharp (a black piano key)
    #[inline]
    pub const fn is_sharp(&self) -> bool {
        self.key().is_sharp()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key(), self.octave())
    }
}

impl From<u8> for Pitch {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[allow(missing_docs)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[doc = r#"
The pitch class of a [`Pitch`].

# Example
```rust
# use keyfall::prelude::*;

assert!(Key::FSharp.is_sharp());
assert_eq!(Key::FSharp.name(), "FSharp");
assert_eq!(Pitch::from_key(Key::FSharp, 4), Some(Pitch::new(66)));
```
"#]
pub enum Key {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl Key {
    /// Returns an array beginning with [`Key::C`] to [`Key::B`]
    pub fn all() -> [Key; 12] {
        use Key::*;
        [C, CSharp, D, DSharp, E, F, FSharp, G, GSharp, A, ASharp, B]
    }

    /// Returns true for the five black keys
    #[inline]
    pub const fn is_sharp(&self) -> bool {
        use Key::*;
        matches!(self, CSharp | DSharp | FSharp | GSharp | ASharp)
    }

    /// Identify the key from a note number.
    #[inline]
    pub const fn from_number(number: u8) -> Self {
        use Key::*;
        match number % 12 {
            0 => C,
            1 => CSharp,
            2 => D,
            3 => DSharp,
            4 => E,
            5 => F,
            6 => FSharp,
            7 => G,
            8 => GSharp,
            9 => A,
            10 => ASharp,
            _ => B,
        }
    }

    const fn get_mod_12(&self) -> u8 {
        use Key::*;
        match self {
            C => 0,
            CSharp => 1,
            D => 2,
            DSharp => 3,
            E => 4,
            F => 5,
            FSharp => 6,
            G => 7,
            GSharp => 8,
            A => 9,
            ASharp => 10,
            B => 11,
        }
    }

    /// The name used in storyboard key identifiers
    pub const fn name(&self) -> &'static str {
        use Key::*;
        match self {
            C => "C",
            CSharp => "CSharp",
            D => "D",
            DSharp => "DSharp",
            E => "E",
            F => "F",
            FSharp => "FSharp",
            G => "G",
            GSharp => "GSharp",
            A => "A",
            ASharp => "ASharp",
            B => "B",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[test]
fn test_key() {
    use pretty_assertions::assert_eq;
    assert_eq!(Pitch::new(12).key(), Key::C);
    assert_eq!(Pitch::new(94).key(), Key::ASharp);
}

#[test]
fn keys_follow_note_numbers() {
    use pretty_assertions::assert_eq;
    let keys = Key::all();
    for (number, key) in (0..12).zip(keys) {
        assert_eq!(Key::from_number(number + 36), key);
    }
    assert_eq!(keys.iter().filter(|k| k.is_sharp()).count(), 5);
}

#[test]
fn test_octave() {
    use pretty_assertions::assert_eq;
    assert_eq!(Pitch::new(0).octave(), -1);
    assert_eq!(Pitch::new(12).octave(), 0);
    assert_eq!(Pitch::new(94).octave(), 6);
    assert_eq!(Pitch::new(127).octave(), 9);
}

#[test]
fn display_matches_storyboard_ids() {
    use alloc::string::ToString;
    use pretty_assertions::assert_eq;
    assert_eq!(Pitch::new(60).to_string(), "C4");
    assert_eq!(Pitch::new(61).to_string(), "CSharp4");
    assert_eq!(Pitch::new(21).to_string(), "A0");
    assert_eq!(Pitch::new(11).to_string(), "B-1");
}

#[test]
fn pitch_from_key_octave_pairs() {
    for number in 0..128 {
        let pitch = Pitch::new(number);
        assert_eq!(Pitch::from_key(pitch.key(), pitch.octave()), Some(pitch));
    }
    assert_eq!(Pitch::from_key(Key::GSharp, 9), None);
    assert_eq!(Pitch::from_key(Key::C, -2), None);
}
