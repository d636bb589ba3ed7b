use std::io;

use crate::{
    codec,
    error::{Result, StateError, ValidationError},
    events::{EventHandler, HandlerState, validate},
    message::{
        ChannelMessageType, END_OF_EXCLUSIVE, FILE_HEADER, META_EVENT, MetaType,
        SYSTEM_EXCLUSIVE, TRACK_HEADER, TUNING_REQUEST,
    },
    writer::Writer,
};

/// An [`EventHandler`] that serializes every event it receives into
/// Standard MIDI File bytes.
///
/// Each event method re-runs the contract's validation (the same checks
/// the default trait bodies run) and then writes the event, prefixed with
/// the relative-time varint, into the current track's buffer. Tracks are
/// buffered whole so their length is known before the length-prefixed
/// `MTrk` chunk is emitted.
///
/// Drive it by hand to compose a file, or hand it to
/// [`decode`](crate::file::decode) to transcode an existing one:
///
/// ```
/// use midifile::{EventHandler, MidiEncoder};
///
/// let mut out = MidiEncoder::new();
/// out.header(0, 1, 480)?;
/// out.start_of_track(0)?;
/// out.update_time(0, true)?;
/// out.note_on(0, 64, 100, false)?;
/// out.update_time(480, true)?;
/// out.note_off(0, 64, 0, false)?;
/// out.end_of_track()?;
/// let bytes = out.into_bytes()?;
/// assert_eq!(&bytes[..4], b"MThd");
/// # Ok::<(), midifile::CodecError>(())
/// ```
#[derive(Debug, Default)]
pub struct MidiEncoder {
    out: Writer,
    track: Option<Writer>,
    state: HandlerState,
    declared_tracks: Option<u16>,
    tracks_written: u16,
}

impl MidiEncoder {
    /// Creates an encoder with an empty output buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything flushed to the file so far (closed tracks and the
    /// header; the open track buffer, if any, is not included).
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Finishes the file, verifying that the number of track chunks
    /// written matches the header's declared count.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.check_track_count()?;
        Ok(self.out.into_bytes())
    }

    /// Writes the finished file to `out` and flushes it.
    ///
    /// A track-count mismatch surfaces as [`io::ErrorKind::InvalidData`].
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.check_track_count()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.out.write_to(out)
    }

    fn check_track_count(&self) -> Result<()> {
        if let Some(declared) = self.declared_tracks
            && declared != self.tracks_written
        {
            return Err(ValidationError::TrackCountMismatch {
                declared,
                written: self.tracks_written,
            }
            .into());
        }
        Ok(())
    }

    /// Writes one event into the current track buffer, prefixed with the
    /// relative-time varint.
    ///
    /// The delta is consumed by the event that writes it; a subsequent
    /// event without an `update_time` in between gets delta zero.
    fn event_slice(&mut self, slice: &[u8]) -> Result<()> {
        let relative_time = self.state.relative_time();
        let track = self.track.as_mut().ok_or(StateError::NoActiveTrack)?;
        track.write_var(relative_time)?;
        track.write_slice(slice);
        self.state.reset_relative_time();
        Ok(())
    }

    /// Writes a channel voice event, omitting the status byte when the
    /// event rides the running status.
    fn voice_slice(&mut self, status: u8, payload: &[u8], use_running_status: bool) -> Result<()> {
        let mut slice = Vec::with_capacity(payload.len() + 1);
        if !use_running_status {
            slice.push(status);
        }
        slice.extend_from_slice(payload);
        self.event_slice(&slice)
    }

    /// Writes a meta event: `FF type varint(len) payload`.
    fn meta_slice(&mut self, meta_type: u8, payload: &[u8]) -> Result<()> {
        let mut slice = Vec::with_capacity(payload.len() + 2 + codec::var_len(payload.len() as u32));
        slice.push(META_EVENT);
        slice.push(meta_type);
        slice.extend_from_slice(&codec::encode_var(payload.len() as i64)?);
        slice.extend_from_slice(payload);
        self.event_slice(&slice)
    }
}

impl EventHandler for MidiEncoder {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    /// Writes the header chunk straight to the output buffer.
    fn header(&mut self, format: u16, n_tracks: u16, division: u16) -> Result<()> {
        validate::header(format)?;
        self.declared_tracks = Some(n_tracks);
        self.out.write_slice(FILE_HEADER);
        self.out.write_word(6, 4)?;
        self.out.write_word(format as u32, 2)?;
        self.out.write_word(n_tracks as u32, 2)?;
        self.out.write_word(division as u32, 2)?;
        Ok(())
    }

    /// Opens a fresh track buffer and resets the per-track state.
    fn start_of_track(&mut self, track: u16) -> Result<()> {
        self.track = Some(Writer::new());
        self.state.reset_time();
        self.state.reset_running_status();
        self.state.set_current_track(track);
        Ok(())
    }

    /// Appends the mandatory end-of-track meta event, then emits the
    /// whole buffered track as a length-prefixed `MTrk` chunk.
    fn end_of_track(&mut self) -> Result<()> {
        let mut track = self.track.take().ok_or(StateError::NoActiveTrack)?;
        track.write_var(self.state.relative_time())?;
        track.write_slice(&[META_EVENT, MetaType::EndOfTrack as u8, 0]);
        self.state.reset_relative_time();
        // the chunk is length-prefixed, so measure before flushing
        self.out.write_slice(TRACK_HEADER);
        self.out.write_word(track.len() as u32, 4)?;
        self.out.write_slice(track.as_bytes());
        self.tracks_written += 1;
        Ok(())
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8, use_running_status: bool) -> Result<()> {
        validate::note_on(&mut self.state, channel, note, velocity, use_running_status)?;
        let status = ChannelMessageType::NoteOn.status(channel);
        self.voice_slice(status, &[note, velocity], use_running_status)
    }

    fn note_off(&mut self, channel: u8, note: u8, velocity: u8, use_running_status: bool) -> Result<()> {
        validate::note_off(&mut self.state, channel, note, velocity, use_running_status)?;
        let status = ChannelMessageType::NoteOff.status(channel);
        self.voice_slice(status, &[note, velocity], use_running_status)
    }

    fn aftertouch(&mut self, channel: u8, note: u8, velocity: u8, use_running_status: bool) -> Result<()> {
        validate::aftertouch(&mut self.state, channel, note, velocity, use_running_status)?;
        let status = ChannelMessageType::Aftertouch.status(channel);
        self.voice_slice(status, &[note, velocity], use_running_status)
    }

    fn continuous_controller(
        &mut self,
        channel: u8,
        controller: u8,
        value: u8,
        use_running_status: bool,
    ) -> Result<()> {
        validate::continuous_controller(&mut self.state, channel, controller, value, use_running_status)?;
        let status = ChannelMessageType::ContinuousController.status(channel);
        self.voice_slice(status, &[controller, value], use_running_status)
    }

    fn patch_change(&mut self, channel: u8, patch: u8, use_running_status: bool) -> Result<()> {
        validate::patch_change(&self.state, channel, patch, use_running_status)?;
        let status = ChannelMessageType::PatchChange.status(channel);
        self.voice_slice(status, &[patch], use_running_status)
    }

    fn channel_pressure(&mut self, channel: u8, pressure: u8, use_running_status: bool) -> Result<()> {
        validate::channel_pressure(&self.state, channel, pressure, use_running_status)?;
        let status = ChannelMessageType::ChannelPressure.status(channel);
        self.voice_slice(status, &[pressure], use_running_status)
    }

    /// The 14-bit value is split into two 7-bit bytes, most significant
    /// first (matching how the decode side reassembles it).
    fn pitch_bend(&mut self, channel: u8, value: u16, use_running_status: bool) -> Result<()> {
        validate::pitch_bend(&self.state, channel, value, use_running_status)?;
        let status = ChannelMessageType::PitchBend.status(channel);
        let msb = ((value >> 7) & 0x7F) as u8;
        let lsb = (value & 0x7F) as u8;
        self.voice_slice(status, &[msb, lsb], use_running_status)
    }

    /// `F0 varint(len+1) data F7`
    fn sysex_event(&mut self, data: &[u8]) -> Result<()> {
        validate::sysex_data(data)?;
        let mut slice = vec![SYSTEM_EXCLUSIVE];
        slice.extend_from_slice(&codec::encode_var(data.len() as i64 + 1)?);
        slice.extend_from_slice(data);
        slice.push(END_OF_EXCLUSIVE);
        self.event_slice(&slice)
    }

    fn midi_time_code(&mut self, msg_type: u8, values: u8) -> Result<()> {
        validate::midi_time_code(msg_type, values)?;
        self.event_slice(&[0xF1, (msg_type << 4) | values])
    }

    /// `F2 ll mm`: least significant 7 bits first on the wire.
    fn song_position_pointer(&mut self, position: u16) -> Result<()> {
        validate::song_position(position)?;
        let lsb = (position & 0x7F) as u8;
        let msb = ((position >> 7) & 0x7F) as u8;
        self.event_slice(&[0xF2, lsb, msb])
    }

    fn song_select(&mut self, number: u8) -> Result<()> {
        validate::song_number(number)?;
        self.event_slice(&[0xF3, number])
    }

    fn tuning_request(&mut self) -> Result<()> {
        self.event_slice(&[TUNING_REQUEST])
    }

    /// Unknown meta events round-trip verbatim.
    fn meta_event(&mut self, meta_type: u8, data: &[u8]) -> Result<()> {
        self.meta_slice(meta_type, data)
    }

    fn sequence_number(&mut self, number: u16) -> Result<()> {
        validate::sequence_number(number)?;
        let payload = codec::write_bew(number as u32, 2)?;
        self.meta_slice(MetaType::SequenceNumber as u8, &payload)
    }

    fn text(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::Text as u8, text)
    }

    fn copyright(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::Copyright as u8, text)
    }

    fn sequence_name(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::SequenceName as u8, text)
    }

    fn instrument_name(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::InstrumentName as u8, text)
    }

    fn lyric(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::Lyric as u8, text)
    }

    fn marker(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::Marker as u8, text)
    }

    fn cuepoint(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::CuePoint as u8, text)
    }

    fn program_name(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::ProgramName as u8, text)
    }

    fn device_name(&mut self, text: &[u8]) -> Result<()> {
        self.meta_slice(MetaType::DeviceName as u8, text)
    }

    fn midi_channel_prefix(&mut self, channel: u8) -> Result<()> {
        validate::channel(channel)?;
        self.meta_slice(MetaType::MidiChannelPrefix as u8, &[channel])
    }

    fn midi_port(&mut self, port: u8) -> Result<()> {
        validate::channel(port)?;
        self.meta_slice(MetaType::MidiPort as u8, &[port])
    }

    fn tempo(&mut self, tempo: u32) -> Result<()> {
        validate::tempo(tempo)?;
        let payload = [
            (tempo >> 16 & 0xFF) as u8,
            (tempo >> 8 & 0xFF) as u8,
            (tempo & 0xFF) as u8,
        ];
        self.meta_slice(MetaType::Tempo as u8, &payload)
    }

    fn smpte_offset(&mut self, hour: u8, minute: u8, second: u8, frame: u8, frame_part: u8) -> Result<()> {
        validate::smpte_offset(hour, minute, second, frame, frame_part)?;
        self.meta_slice(
            MetaType::SmpteOffset as u8,
            &[hour, minute, second, frame, frame_part],
        )
    }

    fn time_signature(&mut self, numerator: u8, denominator: u8, clocks_per_click: u8, notated_32nds: u8) -> Result<()> {
        self.meta_slice(
            MetaType::TimeSignature as u8,
            &[numerator, denominator, clocks_per_click, notated_32nds],
        )
    }

    fn key_signature(&mut self, sharps: i8, mode: u8) -> Result<()> {
        validate::key_signature(sharps, mode)?;
        self.meta_slice(
            MetaType::KeySignature as u8,
            &[codec::to_twos_complement(sharps), mode],
        )
    }

    /// The manufacturer id and data are the meta payload; the decode
    /// side re-splits the id by its leading byte.
    fn sequencer_specific(&mut self, id: &[u8], data: &[u8]) -> Result<()> {
        validate::sequencer_specific(id, data)?;
        let mut payload = Vec::with_capacity(id.len() + data.len());
        payload.extend_from_slice(id);
        payload.extend_from_slice(data);
        self.meta_slice(MetaType::SequencerSpecific as u8, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, StateError};
    use pretty_assertions::assert_eq;

    #[test]
    fn events_need_an_open_track() {
        let mut out = MidiEncoder::new();
        assert_eq!(
            out.note_on(0, 64, 127, false),
            Err(CodecError::State(StateError::NoActiveTrack))
        );
        out.start_of_track(0).unwrap();
        out.note_on(0, 64, 127, false).unwrap();
        assert_eq!(
            out.track.as_ref().unwrap().as_bytes(),
            &[0, 0x90, 64, 127]
        );
    }

    #[test]
    fn end_of_track_measures_before_flushing() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.note_on(0, 0x40, 0x40, false).unwrap();
        out.end_of_track().unwrap();
        assert_eq!(
            out.as_bytes(),
            &[77, 84, 114, 107, 0, 0, 0, 8, 0, 144, 64, 64, 0, 255, 47, 0]
        );
    }

    #[test]
    fn delta_is_consumed_by_the_event_that_writes_it() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.update_time(96, true).unwrap();
        out.note_on(0, 60, 100, false).unwrap();
        out.end_of_track().unwrap();
        // the end marker gets delta zero, not 96 again
        assert_eq!(
            out.as_bytes(),
            &[77, 84, 114, 107, 0, 0, 0, 8, 96, 0x90, 60, 100, 0, 0xFF, 0x2F, 0]
        );
    }

    #[test]
    fn header_chunk_layout() {
        let mut out = MidiEncoder::new();
        out.header(0, 1, 96).unwrap();
        assert_eq!(
            out.as_bytes(),
            &[77, 84, 104, 100, 0, 0, 0, 6, 0, 0, 0, 1, 0, 96]
        );
    }

    #[test]
    fn text_meta_layout() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.text(b"1234").unwrap();
        assert_eq!(
            out.track.as_ref().unwrap().as_bytes(),
            &[0, 255, 1, 4, 49, 50, 51, 52]
        );
    }

    #[test]
    fn running_status_omits_the_status_byte() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.note_on(0, 60, 100, false).unwrap();
        out.update_time(96, true).unwrap();
        out.note_on(0, 62, 100, true).unwrap();
        assert_eq!(
            out.track.as_ref().unwrap().as_bytes(),
            &[0, 0x90, 60, 100, 96, 62, 100]
        );
    }

    #[test]
    fn start_of_track_resets_running_status() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.note_on(0, 60, 100, false).unwrap();
        out.end_of_track().unwrap();
        out.start_of_track(1).unwrap();
        // the fresh track may not ride the previous track's status
        assert!(out.note_on(0, 62, 100, true).is_err());
    }

    #[test]
    fn track_count_is_verified() {
        let mut out = MidiEncoder::new();
        out.header(0, 2, 96).unwrap();
        out.start_of_track(0).unwrap();
        out.end_of_track().unwrap();
        assert_eq!(
            out.into_bytes().err(),
            Some(CodecError::Validation(ValidationError::TrackCountMismatch {
                declared: 2,
                written: 1,
            }))
        );
    }

    #[test]
    fn channel_prefix_layout() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.midi_channel_prefix(12).unwrap();
        out.end_of_track().unwrap();
        assert_eq!(
            out.as_bytes(),
            &[77, 84, 114, 107, 0, 0, 0, 9, 0, 255, 32, 1, 12, 0, 255, 47, 0]
        );
    }

    #[test]
    fn sysex_layout() {
        let mut out = MidiEncoder::new();
        out.start_of_track(0).unwrap();
        out.sysex_event(&[0x41, 0x10, 0x42]).unwrap();
        assert_eq!(
            out.track.as_ref().unwrap().as_bytes(),
            &[0, 0xF0, 4, 0x41, 0x10, 0x42, 0xF7]
        );
    }
}
