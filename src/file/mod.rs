#![doc = r#"
Whole-file orchestration: the decoder that walks chunk framing and the
encoder that produces it.

A Standard MIDI File is a header chunk followed by the number of track
chunks the header declares:

```text
File    := Header Track{trackCount}
Header  := "MThd" u32(size=6) u16(format) u16(trackCount) u16(division)
Track   := "MTrk" u32(length) Event*
Event   := VarInt(deltaTime) (StatusByte Payload | Payload-if-running-status)
```

[`MidiDecoder`] drives any [`EventHandler`] from the byte side;
[`MidiEncoder`] *is* an [`EventHandler`] that produces bytes. Feeding a
decoder an encoder transcodes; feeding it a transforming handler that
forwards to an encoder rewrites.

[`EventHandler`]: crate::events::EventHandler
"#]

mod decoder;
pub use decoder::*;

mod encoder;
pub use encoder::*;
