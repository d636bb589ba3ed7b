#![doc = r#"
A bidirectional codec for the Standard MIDI File (SMF) binary format.

The crate decodes a byte buffer into a stream of musical and meta events,
and symmetrically encodes such a stream back into valid SMF bytes. Both
directions drive the same [`EventHandler`] contract:

- the decode entry point ([`decode`] / [`MidiDecoder`]) pulls bytes
  through a [`Reader`], classifies events (including running-status
  compression) and pushes typed handler calls through the
  [`EventDispatcher`],
- the encode side ([`MidiEncoder`]) *is* a handler whose methods validate
  and then serialize through a [`Writer`], buffering each track so its
  length prefix can be measured before emission.

Because both ends speak the same contract, a decoder can feed an encoder
directly to transcode a file, or feed any custom handler to transform or
inspect one.

```
use midifile::{EventHandler, MidiEncoder, decode};

let mut out = MidiEncoder::new();
out.header(0, 1, 480)?;
out.start_of_track(0)?;
out.update_time(0, true)?;
out.note_on(0, 64, 100, false)?;
out.update_time(1920, true)?;
out.note_off(0, 64, 0, false)?;
out.end_of_track()?;
let bytes = out.into_bytes()?;

// round-trip the bytes through the decoder into a fresh encoder
let rewritten = decode(&bytes, MidiEncoder::new())?;
assert_eq!(rewritten.into_bytes()?, bytes);
# Ok::<(), midifile::CodecError>(())
```

Everything is single-threaded and synchronous; a decode or encode
pipeline is a fully isolated instance graph with no shared state, so
independent files can be processed on independent threads freely.
"#]

pub mod codec;

mod error;
pub use error::*;

pub mod reader;
pub use reader::Reader;

pub mod writer;
pub use writer::Writer;

pub mod message;

pub mod events;
pub use events::{EventHandler, HandlerState, ValidatingHandler};

pub mod dispatch;
pub use dispatch::EventDispatcher;

pub mod file;
pub use file::{MidiDecoder, MidiEncoder, decode};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::{
        CodecError, EventDispatcher, EventHandler, FormatError, HandlerState, MidiDecoder,
        MidiEncoder, RangeError, Reader, Result, StateError, ValidatingHandler, ValidationError,
        Writer, decode,
        message::{ChannelMessageType, MetaType, SystemCommonType},
    };
}
