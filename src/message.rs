#![doc = r#"
The closed enumerations behind the codec's dispatch tables.

Status bytes pack the message type into the high nibble and, for voice
messages, the channel into the low nibble. Only Voice Category statuses
(`0x80..=0xEF`) participate in running status; any System status
invalidates it.

Meta events are tagged `0xFF` and only exist inside files; the known type
codes live in [`MetaType`]. Any other code is deliberately *not* an error:
it is forwarded as a generic meta event so unknown data survives a
round trip.
"#]

use num_enum::TryFromPrimitive;

/// Status byte tagging a meta event.
pub const META_EVENT: u8 = 0xFF;
/// Status byte opening a system exclusive event.
pub const SYSTEM_EXCLUSIVE: u8 = 0xF0;
/// Terminator byte closing a system exclusive event.
pub const END_OF_EXCLUSIVE: u8 = 0xF7;
/// Status byte for a tuning request (no payload).
pub const TUNING_REQUEST: u8 = 0xF6;

/// The header chunk tag.
pub const FILE_HEADER: &[u8; 4] = b"MThd";
/// The track chunk tag.
pub const TRACK_HEADER: &[u8; 4] = b"MTrk";

/// The type nibble of a channel voice message (status `0x80..=0xEF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ChannelMessageType {
    /// `8c nn vv` - note off
    NoteOff = 0x8,
    /// `9c nn vv` - note on (velocity 0 aliases note off)
    NoteOn = 0x9,
    /// `Ac nn vv` - polyphonic aftertouch
    Aftertouch = 0xA,
    /// `Bc cc vv` - continuous controller
    ContinuousController = 0xB,
    /// `Cc pp` - patch change
    PatchChange = 0xC,
    /// `Dc pp` - channel pressure
    ChannelPressure = 0xD,
    /// `Ec mm ll` - pitch bend
    PitchBend = 0xE,
}

impl ChannelMessageType {
    /// The status byte for this message type on `channel`.
    pub const fn status(self, channel: u8) -> u8 {
        ((self as u8) << 4) | (channel & 0x0F)
    }

    /// The fixed payload width for this message type.
    pub const fn data_size(self) -> usize {
        match self {
            Self::PatchChange | Self::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// The low nibble of a system common status byte (`0xF1..=0xF6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum SystemCommonType {
    /// `F1` - MIDI time code quarter frame
    MidiTimeCode = 0x1,
    /// `F2` - song position pointer
    SongPositionPointer = 0x2,
    /// `F3` - song select
    SongSelect = 0x3,
    /// `F6` - tuning request
    TuningRequest = 0x6,
}

impl SystemCommonType {
    /// The fixed payload width for this sub-type; unknown sub-types
    /// default to zero.
    pub const fn data_size(sub_type: u8) -> usize {
        match sub_type {
            0x1 | 0x3 => 1,
            0x2 => 2,
            _ => 0,
        }
    }
}

/// The known meta event type codes.
///
/// Every other code round-trips as a generic `(type, bytes)` meta event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum MetaType {
    /// `FF 00 02 ss ss`
    SequenceNumber = 0x00,
    /// `FF 01 len text`
    Text = 0x01,
    /// `FF 02 len text`
    Copyright = 0x02,
    /// `FF 03 len text`
    SequenceName = 0x03,
    /// `FF 04 len text`
    InstrumentName = 0x04,
    /// `FF 05 len text`
    Lyric = 0x05,
    /// `FF 06 len text`
    Marker = 0x06,
    /// `FF 07 len text`
    CuePoint = 0x07,
    /// `FF 08 len text`
    ProgramName = 0x08,
    /// `FF 09 len text`
    DeviceName = 0x09,
    /// `FF 20 01 cc`
    MidiChannelPrefix = 0x20,
    /// `FF 21 01 pp`
    MidiPort = 0x21,
    /// `FF 2F 00`
    EndOfTrack = 0x2F,
    /// `FF 51 03 tt tt tt` - microseconds per quarter note
    Tempo = 0x51,
    /// `FF 54 05 hr mn se fr ff`
    SmpteOffset = 0x54,
    /// `FF 58 04 nn dd cc bb`
    TimeSignature = 0x58,
    /// `FF 59 02 sf mi`
    KeySignature = 0x59,
    /// `FF 7F len id data`
    SequencerSpecific = 0x7F,
}

#[test]
fn status_bytes() {
    use pretty_assertions::assert_eq;
    assert_eq!(ChannelMessageType::NoteOn.status(1), 0x91);
    assert_eq!(ChannelMessageType::PitchBend.status(15), 0xEF);
    assert_eq!(ChannelMessageType::try_from(0x9), Ok(ChannelMessageType::NoteOn));
    assert!(ChannelMessageType::try_from(0xF).is_err());
}

#[test]
fn payload_widths() {
    use pretty_assertions::assert_eq;
    assert_eq!(ChannelMessageType::PatchChange.data_size(), 1);
    assert_eq!(ChannelMessageType::NoteOn.data_size(), 2);
    assert_eq!(SystemCommonType::data_size(0x1), 1);
    assert_eq!(SystemCommonType::data_size(0x2), 2);
    assert_eq!(SystemCommonType::data_size(0x5), 0);
}

#[test]
fn unknown_meta_types_fall_through() {
    use pretty_assertions::assert_eq;
    assert_eq!(MetaType::try_from(0x51), Ok(MetaType::Tempo));
    assert!(MetaType::try_from(0x4A).is_err());
}
