#![doc = r#"
Standard MIDI File decoding for storyboard generators.

`keyfall` reads the chunked binary SMF format into tracks of timestamped
events and pairs note on / note off events into [`Note`](reconstruct::Note)s
that a storyboard script can turn into falling keys, highlights or anything
else keyed off the music.

```text
bytes ──► MidiFile::parse ──► MidiFile { header, tracks }
                                      │
                                      ▼
                            MidiTrack::notes ──► Vec<Note>   (times in ticks)
                                      │
                                      ▼
                        TickClock::ticks_to_ms ──► milliseconds
```

Times stay in ticks until the caller maps them onto its own timeline, e.g.
with a [`TickClock`](file::TickClock) built from the host's beat duration.

# Example
```rust
use keyfall::prelude::*;

# fn main() -> Result<(), ReaderError> {
# let bytes = [
#     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0,
#     b'M', b'T', b'r', b'k', 0, 0, 0, 8,
#     0x00, 0x90, 60, 80, 0x83, 0x60, 60, 0,
# ];
let file = MidiFile::parse(&bytes)?;
let clock = file.clock(500.);

for note in file.notes() {
    let (start, end) = clock.note_span(&note);
    if end <= start {
        continue;
    }
    println!("{} from {start}ms to {end}ms", note.pitch());
}
# Ok(())
# }
```

# Features
- `std` (default): [`MidiFile::load`](file::MidiFile::load) and `std` error
  support. Without it the crate is `no_std` and needs `alloc`.
- `serde`: `Serialize`/`Deserialize` on the decoded types.

Structural problems in a file are returned as a [`ReaderError`](reader::ReaderError).
Recoverable oddities (unknown meta events, stray bytes, repaired note pairs)
are reported through [`tracing`] and never interrupt parsing.
"#]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod error;
pub use error::*;

pub mod events;
pub mod file;
pub mod reader;
pub mod reconstruct;

mod note;
pub use note::*;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        ChunkError, ChunkId, HeaderError, Key, ParseError, Pitch,
        events::*,
        file::*,
        reader::{ReadResult, Reader, ReaderError, ReaderErrorKind, encode_varlen},
        reconstruct::*,
    };
}
