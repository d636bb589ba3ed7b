#![doc = r#"
The error taxonomy for the codec.

Every failure is local and synchronous; there is no retry policy and no
attempt to repair malformed input. A failure aborts the decode or encode of
the current file, and whatever the reader or writer has partially consumed
is simply discarded by the caller.

Four kinds of failure exist:
- [`FormatError`]: the bytes themselves are malformed or unexpected.
- [`RangeError`]: a value lies outside its field's legal numeric domain.
- [`ValidationError`]: a semantic rule was broken (running status mismatch,
  negative time, a running status without its high bit).
- [`StateError`]: API misuse, such as emitting an event before opening a
  track.

Note that unknown meta event types and unterminated sysex data are *not*
errors. They are forwarded verbatim to preserve round-trip fidelity.
"#]

use thiserror::Error;

/// Any error the codec can produce.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed or unexpected bytes
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A value outside its field's legal domain
    #[error(transparent)]
    Range(#[from] RangeError),
    /// A semantic rule violation
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// API misuse
    #[error(transparent)]
    State(#[from] StateError),
}

/// The codec result type (see [`CodecError`])
pub type Result<T> = core::result::Result<T, CodecError>;

/// The input bytes are malformed or end unexpectedly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The file did not start with the `MThd` magic.
    #[error("not a valid midi file (bad magic {0:02X?})")]
    NotAMidiFile([u8; 4]),
    /// A channel message with an unknown type nibble.
    #[error("illegal channel message: {0:#x}")]
    IllegalChannelMessage(u8),
    /// More bytes were needed than the buffer holds.
    #[error("unexpected end of data (wanted {wanted} bytes, got {got})")]
    UnexpectedEof {
        /// How many bytes the read asked for
        wanted: usize,
        /// How many were actually available
        got: usize,
    },
    /// A var-length integer was requested from an empty buffer.
    #[error("empty buffer while reading a variable-length integer")]
    EmptyVarInt,
    /// A word read with a width other than 1, 2 or 4.
    #[error("illegal word width for read: {0}")]
    WordWidth(usize),
    /// A data byte appeared with no prior status byte to reuse.
    #[error("running-status data byte with no prior status byte")]
    OrphanRunningStatus,
}

/// A value lies outside the legal numeric domain of its field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// Word widths are 1, 2 or 4 bytes.
    #[error("word width must be 1, 2 or 4; was {0}")]
    WordWidth(usize),
    /// A value too large for its fixed-width field.
    #[error("value {value} does not fit in a {width}-byte word")]
    WordOverflow {
        /// The offending value
        value: u64,
        /// The requested width in bytes
        width: usize,
    },
    /// VarInts hold at most 28 bits and are never negative.
    #[error("value out of varint range 0..=0x0FFFFFFF: {0}")]
    VarInt(i64),
    /// Nibbles are 4-bit values.
    #[error("nibble out of range 0-15: ({0}, {1})")]
    Nibble(u8, u8),
    /// MIDI channels are 0-15.
    #[error("illegal midi channel: {0}")]
    Channel(u8),
    /// Notes are 0-127.
    #[error("illegal note value: {0}")]
    Note(u8),
    /// Velocities are 0-127.
    #[error("illegal velocity value: {0}")]
    Velocity(u8),
    /// Controller numbers are 0-127.
    #[error("illegal controller: {0}")]
    Controller(u8),
    /// Controller values are 0-127.
    #[error("illegal controller value: {0}")]
    ControllerValue(u8),
    /// Patch/program numbers are 0-127.
    #[error("illegal patch: {0}")]
    Patch(u8),
    /// Channel pressure is 0-127.
    #[error("illegal pressure: {0}")]
    Pressure(u8),
    /// Pitch bend is a 14-bit value.
    #[error("pitch bend out of range 0..=16383: {0}")]
    PitchBend(u16),
    /// Song positions are 14-bit values.
    #[error("illegal song position: {0}")]
    SongPosition(u16),
    /// Song numbers are 0-127.
    #[error("illegal song number: {0}")]
    SongNumber(u8),
    /// MTC message types are 0-7.
    #[error("illegal midi time code message type: {0}")]
    MtcType(u8),
    /// MTC values are 0-15.
    #[error("illegal midi time code values: {0}")]
    MtcValues(u8),
    /// A sysex or sequencer-specific data byte above 0x7F.
    #[error("sysex data byte out of range 0-127: {0}")]
    SysexData(u8),
    /// Manufacturer ids are 1 byte (nonzero) or 3 bytes starting with zero.
    #[error("incorrect manufacturer id: {0:02X?}")]
    ManufacturerId(Vec<u8>),
    /// SMF formats are 0, 1 or 2.
    #[error("illegal format: {0}")]
    Format(u16),
    /// Sequence numbers are 14-bit values.
    #[error("sequence number out of range 0..=0x3FFF: {0}")]
    SequenceNumber(u16),
    /// Tempo is a 3-byte quantity in microseconds per quarter note.
    #[error("tempo in microseconds must be in the range 0..=16777215; was {0}")]
    Tempo(u32),
    /// Key signatures run from 7 flats to 7 sharps.
    #[error("key signature sharps/flats out of range -7..=7: {0}")]
    KeySignature(i8),
    /// Key signature mode is major (0) or minor (1).
    #[error("key signature mode must be 0 (major) or 1 (minor); was {0}")]
    KeyMode(u8),
    /// An SMPTE offset field failure.
    #[error(transparent)]
    Smpte(#[from] SmpteError),
    /// A meta event payload of the wrong length for its type.
    #[error("meta event {meta_type:#04x} payload must be {expected} bytes; was {actual}")]
    MetaLength {
        /// The meta type code
        meta_type: u8,
        /// The length the type requires
        expected: usize,
        /// The length actually present
        actual: usize,
    },
}

/// An SMPTE offset field outside its legal domain.
///
/// The frame bound depends on the frame rate encoded in bits 5-6 of the
/// hour byte: 24, 25, 29 (drop frame) and 30 fps allow at most 23, 24, 28
/// and 29 frames respectively.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmpteError {
    /// An SMPTE offset payload must be exactly 5 bytes.
    #[error("smpte offset must be 5 bytes; was {0}")]
    Length(usize),
    /// Hours are 0-23.
    #[error("hour must be in the 0..23 range; was {0}")]
    Hour(u8),
    /// Minutes are 0-59.
    #[error("minute must be in the 0..59 range; was {0}")]
    Minute(u8),
    /// Seconds are 0-59.
    #[error("second must be in the 0..59 range; was {0}")]
    Second(u8),
    /// The frame exceeded the bound for the encoded frame rate.
    #[error("frame rate code {rate} allows frames 0..={max}; was {frame}")]
    Frame {
        /// The 2-bit frame rate code from the hour byte
        rate: u8,
        /// The inclusive frame bound for that rate
        max: u8,
        /// The offending frame value
        frame: u8,
    },
    /// Fractional frames are 0-99.
    #[error("fractional frame must be in the 0..99 range; was {0}")]
    Subframe(u8),
}

/// A semantic rule violation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `use_running_status` was set but the status does not match the
    /// recorded running status.
    #[error("status was {status:#04x} but running status was {running:?}; they must match when use_running_status is set")]
    RunningStatusMismatch {
        /// The status implied by the event
        status: u8,
        /// The running status actually recorded
        running: Option<u8>,
    },
    /// Running status bytes always have the high bit set.
    #[error("running status must have the high bit set; was {0:#04x}")]
    StatusHighBitUnset(u8),
    /// The absolute time accumulator can never go negative.
    #[error("absolute time may not go negative; was {0}")]
    NegativeTime(i64),
    /// The header declared a different number of tracks than were written.
    #[error("header declared {declared} tracks but {written} were written")]
    TrackCountMismatch {
        /// The count from the header event
        declared: u16,
        /// The number of track chunks actually emitted
        written: u16,
    },
}

/// API misuse, independent of any particular input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// An event was emitted before `start_of_track`.
    #[error("no active track buffer; did you forget to call start_of_track()?")]
    NoActiveTrack,
}
