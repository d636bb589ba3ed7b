#![doc = r#"
The stateless router between decoded `(status, data)` pairs and the typed
[`EventHandler`] calls.

The dispatcher owns no codec state of its own; it translates the raw
byte-level classification the decoder produces into one handler call per
event, decoding the fixed-width sub-fields of meta events along the way.
Unknown meta types fall through to the generic [`EventHandler::meta_event`]
call; unknown system common sub-types are silently ignored. Both are
deliberate forward-compatibility choices, not errors.
"#]

use crate::{
    codec,
    error::{FormatError, RangeError, Result},
    events::EventHandler,
    message::{ChannelMessageType, MetaType, SystemCommonType},
};

/// Routes decoded events to an [`EventHandler`].
#[derive(Debug)]
pub struct EventDispatcher<H> {
    handler: H,
    /// A note-on with velocity 0 means note-off. When set, such events
    /// are delivered as `note_off` with velocity `0x40`, which is less
    /// surprising for callers not versed in that corner of the MIDI
    /// spec. Off by default.
    pub convert_zero_velocity: bool,
}

impl<H: EventHandler> EventDispatcher<H> {
    /// Wraps a handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            convert_zero_velocity: false,
        }
    }

    /// A shared view of the wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// A mutable view of the wrapped handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Unwraps the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Triggers the header event.
    pub fn header(&mut self, format: u16, n_tracks: u16, division: u16) -> Result<()> {
        self.handler.header(format, n_tracks, division)
    }

    /// Triggers the start-of-track event, updating the current track
    /// index first.
    pub fn start_of_track(&mut self, track: u16) -> Result<()> {
        self.handler.set_current_track(track);
        self.handler.start_of_track(track)
    }

    /// Triggers the end-of-file event.
    pub fn eof(&mut self) -> Result<()> {
        self.handler.eof()
    }

    /// Updates the handler's relative/absolute time.
    pub fn update_time(&mut self, new_time: i64, relative: bool) -> Result<()> {
        self.handler.update_time(new_time, relative)
    }

    /// Resets the handler's time accumulator.
    pub fn reset_time(&mut self) {
        self.handler.reset_time();
    }

    /// Records a running status byte on the handler.
    pub fn set_running_status(&mut self, status: u8) -> Result<()> {
        self.handler.set_running_status(status)
    }

    /// Invalidates the handler's running status.
    pub fn reset_running_status(&mut self) {
        self.handler.reset_running_status();
    }

    /// Dispatches a channel voice message from its type nibble, channel
    /// and payload.
    pub fn channel_message(
        &mut self,
        message_type: u8,
        channel: u8,
        data: &[u8],
        use_running_status: bool,
    ) -> Result<()> {
        let message = ChannelMessageType::try_from(message_type)
            .map_err(|_| FormatError::IllegalChannelMessage(message_type))?;
        let wanted = message.data_size();
        if data.len() < wanted {
            return Err(FormatError::UnexpectedEof {
                wanted,
                got: data.len(),
            }
            .into());
        }
        let events = &mut self.handler;
        match message {
            ChannelMessageType::NoteOn => {
                let (note, velocity) = (data[0], data[1]);
                if velocity == 0 && self.convert_zero_velocity {
                    events.note_off(channel, note, 0x40, use_running_status)
                } else {
                    events.note_on(channel, note, velocity, use_running_status)
                }
            }
            ChannelMessageType::NoteOff => {
                events.note_off(channel, data[0], data[1], use_running_status)
            }
            ChannelMessageType::Aftertouch => {
                events.aftertouch(channel, data[0], data[1], use_running_status)
            }
            ChannelMessageType::ContinuousController => {
                events.continuous_controller(channel, data[0], data[1], use_running_status)
            }
            ChannelMessageType::PatchChange => {
                events.patch_change(channel, data[0], use_running_status)
            }
            ChannelMessageType::ChannelPressure => {
                events.channel_pressure(channel, data[0], use_running_status)
            }
            ChannelMessageType::PitchBend => {
                let value = ((data[0] as u16) << 7) | data[1] as u16;
                events.pitch_bend(channel, value, use_running_status)
            }
        }
    }

    /// Dispatches a system common message from its sub-type nibble.
    ///
    /// Unrecognized sub-types are dropped without error.
    pub fn system_common(&mut self, common_type: u8, data: &[u8]) -> Result<()> {
        let Ok(common) = SystemCommonType::try_from(common_type) else {
            return Ok(());
        };
        let wanted = SystemCommonType::data_size(common_type);
        if data.len() < wanted {
            return Err(FormatError::UnexpectedEof {
                wanted,
                got: data.len(),
            }
            .into());
        }
        let events = &mut self.handler;
        match common {
            SystemCommonType::MidiTimeCode => {
                let byte = data[0];
                events.midi_time_code((byte >> 4) & 0x07, byte & 0x0F)
            }
            SystemCommonType::SongPositionPointer => {
                let value = ((data[1] as u16) << 7) | data[0] as u16;
                events.song_position_pointer(value)
            }
            SystemCommonType::SongSelect => events.song_select(data[0]),
            SystemCommonType::TuningRequest => events.tuning_request(),
        }
    }

    /// Dispatches a sysex payload. No validation happens here; the
    /// handler decides what the payload means.
    pub fn sysex_event(&mut self, data: &[u8]) -> Result<()> {
        self.handler.sysex_event(data)
    }

    /// Dispatches a meta event, decoding the fixed-width sub-fields of
    /// the known types. Unknown types trigger the generic
    /// [`EventHandler::meta_event`] call instead of failing.
    pub fn meta_event(&mut self, meta_type: u8, data: &[u8]) -> Result<()> {
        let events = &mut self.handler;
        let Ok(meta) = MetaType::try_from(meta_type) else {
            return events.meta_event(meta_type, data);
        };
        match meta {
            MetaType::SequenceNumber => {
                let number = fixed(meta_type, data, 2)?;
                events.sequence_number(codec::read_bew(number)? as u16)
            }
            MetaType::Text => events.text(data),
            MetaType::Copyright => events.copyright(data),
            MetaType::SequenceName => events.sequence_name(data),
            MetaType::InstrumentName => events.instrument_name(data),
            MetaType::Lyric => events.lyric(data),
            MetaType::Marker => events.marker(data),
            MetaType::CuePoint => events.cuepoint(data),
            MetaType::ProgramName => events.program_name(data),
            MetaType::DeviceName => events.device_name(data),
            MetaType::MidiChannelPrefix => {
                let channel = fixed(meta_type, data, 1)?;
                events.midi_channel_prefix(channel[0])
            }
            MetaType::MidiPort => {
                let port = fixed(meta_type, data, 1)?;
                events.midi_port(port[0])
            }
            MetaType::EndOfTrack => events.end_of_track(),
            MetaType::Tempo => {
                let t = fixed(meta_type, data, 3)?;
                events.tempo(((t[0] as u32) << 16) | ((t[1] as u32) << 8) | t[2] as u32)
            }
            MetaType::SmpteOffset => {
                let smpte = fixed(meta_type, data, 5)?;
                events.smpte_offset(smpte[0], smpte[1], smpte[2], smpte[3], smpte[4])
            }
            MetaType::TimeSignature => {
                let sig = fixed(meta_type, data, 4)?;
                events.time_signature(sig[0], sig[1], sig[2], sig[3])
            }
            MetaType::KeySignature => {
                let sig = fixed(meta_type, data, 2)?;
                events.key_signature(codec::from_twos_complement(sig[0]), sig[1])
            }
            MetaType::SequencerSpecific => {
                // a leading zero byte means a 3-byte manufacturer id
                let id_len = match data.first() {
                    Some(0) => 3,
                    Some(_) => 1,
                    None => 0,
                };
                if data.len() < id_len || id_len == 0 {
                    return Err(RangeError::ManufacturerId(data.to_vec()).into());
                }
                let (id, rest) = data.split_at(id_len);
                events.sequencer_specific(id, rest)
            }
        }
    }
}

fn fixed<'d>(meta_type: u8, data: &'d [u8], expected: usize) -> Result<&'d [u8]> {
    if data.len() != expected {
        return Err(RangeError::MetaLength {
            meta_type,
            expected,
            actual: data.len(),
        }
        .into());
    }
    Ok(data)
}
