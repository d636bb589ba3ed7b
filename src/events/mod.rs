#![doc = r#"
The event handler contract both sides of the codec drive through.

[`EventHandler`] has one method per event kind. The default method bodies
validate argument domains and maintain the derived state (time, track,
running status) without performing any I/O, which makes the bare trait a
safe sink on the decode side and the base behavior the file encoder builds
on for the encode side. One call path, many behaviors: a decoder can push
straight into an encoder to transcode, or into any custom handler to
transform or report.

The domain checks themselves live in [`validate`], as free functions, so
implementations that override a method can re-run the exact base checks
before doing their own work.
"#]

mod state;
pub use state::*;

pub mod validate;

use crate::error::Result;

/// Receives every event a MIDI stream can produce.
///
/// Implementors supply storage for the derived [`HandlerState`] and
/// override whichever event methods they care about. Every default method
/// body validates its arguments and nothing else.
pub trait EventHandler {
    /// The handler's derived state.
    fn state(&self) -> &HandlerState;

    /// The handler's derived state, mutably.
    fn state_mut(&mut self) -> &mut HandlerState;

    // time and track bookkeeping

    /// Updates the time; `new_time` is a delta when `relative` is set,
    /// otherwise an absolute tick count.
    fn update_time(&mut self, new_time: i64, relative: bool) -> Result<()> {
        self.state_mut().update_time(new_time, relative)?;
        Ok(())
    }

    /// Resets the time accumulator to zero.
    fn reset_time(&mut self) {
        self.state_mut().reset_time();
    }

    /// Records a new running status byte (high bit required).
    fn set_running_status(&mut self, status: u8) -> Result<()> {
        self.state_mut().set_running_status(status)?;
        Ok(())
    }

    /// The recorded running status, if any.
    fn running_status(&self) -> Option<u8> {
        self.state().running_status()
    }

    /// Invalidates the running status.
    fn reset_running_status(&mut self) {
        self.state_mut().reset_running_status();
    }

    /// Sets the current track index.
    fn set_current_track(&mut self, track: u16) {
        self.state_mut().set_current_track(track);
    }

    // file structure

    /// The file header: format (0, 1 or 2), track count and division.
    fn header(&mut self, format: u16, n_tracks: u16, division: u16) -> Result<()> {
        let _ = (n_tracks, division);
        validate::header(format)
    }

    /// A track is starting.
    fn start_of_track(&mut self, track: u16) -> Result<()> {
        let _ = track;
        Ok(())
    }

    /// The mandatory end-of-track marker.
    fn end_of_track(&mut self) -> Result<()> {
        Ok(())
    }

    /// No more events will arrive.
    fn eof(&mut self) -> Result<()> {
        Ok(())
    }

    // channel voice events

    /// `9c nn vv`: channel 0-15, note and velocity 0-127.
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8, use_running_status: bool) -> Result<()> {
        validate::note_on(self.state_mut(), channel, note, velocity, use_running_status)
    }

    /// `8c nn vv`: channel 0-15, note and velocity 0-127.
    fn note_off(&mut self, channel: u8, note: u8, velocity: u8, use_running_status: bool) -> Result<()> {
        validate::note_off(self.state_mut(), channel, note, velocity, use_running_status)
    }

    /// `Ac nn vv`: polyphonic aftertouch.
    fn aftertouch(&mut self, channel: u8, note: u8, velocity: u8, use_running_status: bool) -> Result<()> {
        validate::aftertouch(self.state_mut(), channel, note, velocity, use_running_status)
    }

    /// `Bc cc vv`: controller and value 0-127.
    fn continuous_controller(
        &mut self,
        channel: u8,
        controller: u8,
        value: u8,
        use_running_status: bool,
    ) -> Result<()> {
        validate::continuous_controller(self.state_mut(), channel, controller, value, use_running_status)
    }

    /// `Cc pp`: patch 0-127.
    fn patch_change(&mut self, channel: u8, patch: u8, use_running_status: bool) -> Result<()> {
        validate::patch_change(self.state(), channel, patch, use_running_status)
    }

    /// `Dc pp`: pressure 0-127.
    fn channel_pressure(&mut self, channel: u8, pressure: u8, use_running_status: bool) -> Result<()> {
        validate::channel_pressure(self.state(), channel, pressure, use_running_status)
    }

    /// `Ec mm ll`: value 0-16383.
    fn pitch_bend(&mut self, channel: u8, value: u16, use_running_status: bool) -> Result<()> {
        validate::pitch_bend(self.state(), channel, value, use_running_status)
    }

    // system exclusive

    /// A sysex payload; every byte must be 0-127.
    fn sysex_event(&mut self, data: &[u8]) -> Result<()> {
        validate::sysex_data(data)
    }

    // system common events

    /// `F1 tv`: message type 0-7, values 0-15.
    fn midi_time_code(&mut self, msg_type: u8, values: u8) -> Result<()> {
        validate::midi_time_code(msg_type, values)
    }

    /// `F2 ll mm`: position 0-16383.
    fn song_position_pointer(&mut self, position: u16) -> Result<()> {
        validate::song_position(position)
    }

    /// `F3 ss`: song number 0-127.
    fn song_select(&mut self, number: u8) -> Result<()> {
        validate::song_number(number)
    }

    /// `F6`: no payload.
    fn tuning_request(&mut self) -> Result<()> {
        Ok(())
    }

    // meta events

    /// Any meta event with an unrecognized type code. Never an error;
    /// unknown metas pass through for forward compatibility.
    fn meta_event(&mut self, meta_type: u8, data: &[u8]) -> Result<()> {
        let _ = (meta_type, data);
        Ok(())
    }

    /// `FF 00 02 ss ss`: sequence number 0-16383.
    fn sequence_number(&mut self, number: u16) -> Result<()> {
        validate::sequence_number(number)
    }

    /// `FF 01 len text`
    fn text(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 02 len text`
    fn copyright(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 03 len text`
    fn sequence_name(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 04 len text`
    fn instrument_name(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 05 len text`
    fn lyric(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 06 len text`
    fn marker(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 07 len text`
    fn cuepoint(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 08 len text`
    fn program_name(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 09 len text`
    fn device_name(&mut self, text: &[u8]) -> Result<()> {
        let _ = text;
        Ok(())
    }

    /// `FF 20 01 cc`: channel 0-15 (deprecated in the spec).
    fn midi_channel_prefix(&mut self, channel: u8) -> Result<()> {
        validate::channel(channel)
    }

    /// `FF 21 01 pp`: port 0-15 (deprecated in the spec).
    fn midi_port(&mut self, port: u8) -> Result<()> {
        validate::channel(port)
    }

    /// `FF 51 03 tt tt tt`: tempo 0-16777215 microseconds per quarter
    /// note.
    fn tempo(&mut self, tempo: u32) -> Result<()> {
        validate::tempo(tempo)
    }

    /// Tempo from beats per minute. A helper, not part of the wire
    /// format.
    fn tempo_bpm(&mut self, bpm: f64) -> Result<()> {
        self.tempo((60_000_000.0 / bpm) as u32)
    }

    /// `FF 54 05 hr mn se fr ff`: the hour byte also encodes the frame
    /// rate, which bounds the frame field.
    fn smpte_offset(&mut self, hour: u8, minute: u8, second: u8, frame: u8, frame_part: u8) -> Result<()> {
        validate::smpte_offset(hour, minute, second, frame, frame_part)
    }

    /// `FF 58 04 nn dd cc bb`: numerator, denominator (as a negative
    /// power of two), clocks per metronome click and notated 32nds per
    /// quarter note.
    fn time_signature(&mut self, numerator: u8, denominator: u8, clocks_per_click: u8, notated_32nds: u8) -> Result<()> {
        let _ = (numerator, denominator, clocks_per_click, notated_32nds);
        Ok(())
    }

    /// `FF 59 02 sf mi`: sharps -7..=7 (negative means flats), mode 0
    /// (major) or 1 (minor).
    fn key_signature(&mut self, sharps: i8, mode: u8) -> Result<()> {
        validate::key_signature(sharps, mode)
    }

    /// `FF 7F len id data`: a 1- or 3-byte manufacturer id followed by
    /// data bytes.
    fn sequencer_specific(&mut self, id: &[u8], data: &[u8]) -> Result<()> {
        validate::sequencer_specific(id, data)
    }
}

/// The reference handler: validates every event and discards it.
///
/// Useful as a decode sink when only well-formedness matters, and as the
/// simplest example of implementing [`EventHandler`].
#[derive(Debug, Default)]
pub struct ValidatingHandler {
    state: HandlerState,
}

impl ValidatingHandler {
    /// Creates a fresh validating handler.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventHandler for ValidatingHandler {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }
}
