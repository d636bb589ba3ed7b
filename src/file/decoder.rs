use crate::{
    codec,
    dispatch::EventDispatcher,
    error::{FormatError, Result},
    events::EventHandler,
    message::{
        ChannelMessageType, END_OF_EXCLUSIVE, FILE_HEADER, META_EVENT, SYSTEM_EXCLUSIVE,
        SystemCommonType,
    },
    reader::Reader,
};

/// Decodes a Standard MIDI File byte buffer, driving an [`EventHandler`]
/// through an [`EventDispatcher`].
///
/// Decoding is strictly forward-only; the single exception is the 1-byte
/// peek that decides whether the next event reuses the running status.
#[derive(Debug)]
pub struct MidiDecoder<'a, H> {
    reader: Reader<'a>,
    dispatch: EventDispatcher<H>,
    running_status: Option<u8>,
    n_tracks: u16,
}

/// Decodes `bytes` as a complete MIDI file into `handler`, returning the
/// handler when every declared track has been walked.
pub fn decode<H: EventHandler>(bytes: &[u8], handler: H) -> Result<H> {
    let mut decoder = MidiDecoder::new(bytes, handler);
    decoder.read()?;
    Ok(decoder.into_handler())
}

impl<'a, H: EventHandler> MidiDecoder<'a, H> {
    /// Creates a decoder over `bytes` feeding `handler`.
    pub fn new(bytes: &'a [u8], handler: H) -> Self {
        Self {
            reader: Reader::new(bytes),
            dispatch: EventDispatcher::new(handler),
            running_status: None,
            n_tracks: 0,
        }
    }

    /// Delivers zero-velocity note-ons as note-offs (see
    /// [`EventDispatcher::convert_zero_velocity`]).
    pub fn convert_zero_velocity(mut self, convert: bool) -> Self {
        self.dispatch.convert_zero_velocity = convert;
        self
    }

    /// Parses the whole file: the header chunk, each declared track
    /// chunk, then the final `eof` call on the handler.
    pub fn read(&mut self) -> Result<()> {
        self.read_header()?;
        self.read_tracks()
    }

    /// Unwraps the handler.
    pub fn into_handler(self) -> H {
        self.dispatch.into_handler()
    }

    /// The cursor position, for error reporting.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Parses the header chunk and triggers the header event.
    pub fn read_header(&mut self) -> Result<()> {
        let magic = self.reader.read(4);
        if magic != FILE_HEADER {
            let mut found = [0u8; 4];
            found[..magic.len()].copy_from_slice(magic);
            return Err(FormatError::NotAMidiFile(found).into());
        }
        let chunk_size = self.reader.read_word(4)?;
        // the three header fields sit at fixed offsets
        let format = self.reader.read_word(2)? as u16;
        let n_tracks = self.reader.read_word(2)? as u16;
        let division = self.reader.read_word(2)? as u16;
        // a header longer than 6 bytes is theoretical but legal; skip
        // whatever the surplus holds without interpreting it
        if chunk_size > 6 {
            self.reader.advance(chunk_size as usize - 6);
        }
        self.n_tracks = n_tracks;
        self.dispatch.header(format, n_tracks, division)
    }

    /// Parses every declared track chunk, then triggers `eof`.
    pub fn read_tracks(&mut self) -> Result<()> {
        for track in 0..self.n_tracks {
            self.read_track(track)?;
        }
        self.dispatch.eof()
    }

    fn reset_running_status(&mut self) {
        self.running_status = None;
        self.dispatch.reset_running_status();
    }

    fn set_running_status(&mut self, status: u8) -> Result<()> {
        self.running_status = Some(status);
        self.dispatch.set_running_status(status)
    }

    /// Parses one track chunk, dispatching every event inside it.
    fn read_track(&mut self, track: u16) -> Result<()> {
        // both accumulators restart with every track
        self.dispatch.reset_time();
        self.reset_running_status();
        self.dispatch.start_of_track(track)?;

        // the track tag, then the chunk length
        self.reader.advance(4);
        let track_length = self.reader.read_word(4)?;
        let end_position = self.reader.position() + track_length as usize;

        while self.reader.position() < end_position {
            self.read_event()?;
        }
        Ok(())
    }

    fn read_event(&mut self) -> Result<()> {
        let delta = self.reader.read_var()?;
        self.dispatch.update_time(delta as i64, true)?;

        // running status lookahead: a high bit marks a fresh status
        // byte, anything else reuses the previous one
        let peek = self.reader.peek_byte().ok_or(FormatError::UnexpectedEof {
            wanted: 1,
            got: 0,
        })?;
        let (status, use_running_status) = if peek & 0x80 != 0 {
            let status = self.reader.read_byte()?;
            self.set_running_status(status)?;
            (status, false)
        } else {
            let status = self
                .running_status
                .ok_or(FormatError::OrphanRunningStatus)?;
            (status, true)
        };

        let (hi_nibble, lo_nibble) = codec::nibbles(status);
        // only Voice Category statuses (0x80..=0xEF) participate in
        // running status; any System status invalidates it
        if hi_nibble == 0xF {
            self.reset_running_status();
        }

        if status == META_EVENT {
            let meta_type = self.reader.read_byte()?;
            let meta_length = self.reader.read_var()? as usize;
            let meta_data = self.reader.read(meta_length);
            if meta_data.len() != meta_length {
                return Err(FormatError::UnexpectedEof {
                    wanted: meta_length,
                    got: meta_data.len(),
                }
                .into());
            }
            self.dispatch.meta_event(meta_type, meta_data)
        } else if status == SYSTEM_EXCLUSIVE {
            let sysex_length = self.reader.read_var()?;
            let sysex_data = self.reader.read((sysex_length as usize).saturating_sub(1));
            // the terminator should always be there, but only consume
            // the byte if it actually is one
            if self.reader.peek_byte() == Some(END_OF_EXCLUSIVE) {
                self.reader.advance(1);
            }
            self.dispatch.sysex_event(sysex_data)
        } else if hi_nibble == 0xF {
            let size = SystemCommonType::data_size(lo_nibble);
            let common_data = self.reader.read(size);
            self.dispatch.system_common(lo_nibble, common_data)
        } else {
            let size = match ChannelMessageType::try_from(hi_nibble) {
                Ok(message) => message.data_size(),
                Err(_) => 0,
            };
            let channel_data = self.reader.read(size);
            self.dispatch
                .channel_message(hi_nibble, lo_nibble, channel_data, use_running_status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CodecError,
        events::{HandlerState, ValidatingHandler},
    };
    use pretty_assertions::assert_eq;

    /// Records every call it receives, for asserting on event order.
    #[derive(Default)]
    struct Recorder {
        state: HandlerState,
        calls: Vec<String>,
    }

    impl EventHandler for Recorder {
        fn state(&self) -> &HandlerState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut HandlerState {
            &mut self.state
        }
        fn header(&mut self, format: u16, n_tracks: u16, division: u16) -> Result<()> {
            self.calls.push(format!("header {format} {n_tracks} {division}"));
            Ok(())
        }
        fn start_of_track(&mut self, track: u16) -> Result<()> {
            self.calls.push(format!("start_of_track {track}"));
            Ok(())
        }
        fn update_time(&mut self, new_time: i64, relative: bool) -> Result<()> {
            self.state.update_time(new_time, relative)?;
            self.calls.push(format!("update_time {new_time}"));
            Ok(())
        }
        fn note_on(&mut self, channel: u8, note: u8, velocity: u8, urs: bool) -> Result<()> {
            self.calls
                .push(format!("note_on {channel} {note} {velocity} {urs}"));
            Ok(())
        }
        fn note_off(&mut self, channel: u8, note: u8, velocity: u8, urs: bool) -> Result<()> {
            self.calls
                .push(format!("note_off {channel} {note} {velocity} {urs}"));
            Ok(())
        }
        fn sysex_event(&mut self, data: &[u8]) -> Result<()> {
            self.calls.push(format!("sysex {data:02X?}"));
            Ok(())
        }
        fn end_of_track(&mut self) -> Result<()> {
            self.calls.push("end_of_track".into());
            Ok(())
        }
        fn eof(&mut self) -> Result<()> {
            self.calls.push("eof".into());
            Ok(())
        }
    }

    fn simple_file() -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 1, 224]); // format 0, 1 track, 480
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 12]);
        bytes.extend_from_slice(&[0x00, 0x90, 64, 64]); // note on at 0
        bytes.extend_from_slice(&[0x60, 0x80, 64, 64]); // note off at 96
        bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]); // end of track
        bytes
    }

    #[test]
    fn walks_a_simple_file() {
        let recorder = decode(&simple_file(), Recorder::default()).unwrap();
        assert_eq!(
            recorder.calls,
            vec![
                "header 0 1 480",
                "start_of_track 0",
                "update_time 0",
                "note_on 0 64 64 false",
                "update_time 96",
                "note_off 0 64 64 false",
                "update_time 0",
                "end_of_track",
                "eof",
            ]
        );
    }

    #[test]
    fn bad_magic() {
        let result = decode(b"RIFF\x00\x00\x00\x06", ValidatingHandler::new());
        assert_eq!(
            result.err(),
            Some(CodecError::Format(FormatError::NotAMidiFile(*b"RIFF")))
        );
    }

    #[test]
    fn oversized_header_is_skipped() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 8, 0, 1, 0, 0, 1, 224]); // declared size 8
        bytes.extend_from_slice(&[0xAB, 0xCD]); // two surplus bytes
        let recorder = decode(&bytes, Recorder::default()).unwrap();
        assert_eq!(recorder.calls, vec!["header 1 0 480", "eof"]);
    }

    #[test]
    fn running_status_reuses_the_previous_status() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 11]);
        bytes.extend_from_slice(&[0x00, 0x90, 60, 100]); // fresh status
        bytes.extend_from_slice(&[0x10, 62, 100]); // running status
        bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        let recorder = decode(&bytes, Recorder::default()).unwrap();
        assert!(recorder.calls.contains(&"note_on 0 62 100 true".to_string()));
    }

    #[test]
    fn orphan_running_status() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 3]);
        bytes.extend_from_slice(&[0x00, 62, 100]); // data byte, no status yet
        let result = decode(&bytes, ValidatingHandler::new());
        assert_eq!(
            result.err(),
            Some(CodecError::Format(FormatError::OrphanRunningStatus))
        );
    }

    #[test]
    fn system_status_invalidates_running_status() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(&[0x00, 0x90, 60, 100]);
        bytes.extend_from_slice(&[0x00, 0xF6]); // tuning request
        bytes.extend_from_slice(&[0x00, 62, 100]); // would need running status
        bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        let result = decode(&bytes, ValidatingHandler::new());
        assert_eq!(
            result.err(),
            Some(CodecError::Format(FormatError::OrphanRunningStatus))
        );
    }

    #[test]
    fn unterminated_sysex_still_parses() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 10]);
        // declares 4 bytes (payload + terminator) but the 0xF7 is absent
        bytes.extend_from_slice(&[0x00, 0xF0, 0x04, 0x41, 0x10, 0x42]);
        bytes.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        let recorder = decode(&bytes, Recorder::default()).unwrap();
        assert!(recorder.calls.contains(&"sysex [41, 10, 42]".to_string()));
        assert!(recorder.calls.contains(&"end_of_track".to_string()));
    }

    #[test]
    fn truncated_meta_payload_is_an_error() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 9]);
        bytes.extend_from_slice(&[0x00, 0xFF, 0x01, 0x05, 0x68, 0x69]); // declares 5, has 2
        let result = decode(&bytes, ValidatingHandler::new());
        assert_eq!(
            result.err(),
            Some(CodecError::Format(FormatError::UnexpectedEof { wanted: 5, got: 2 }))
        );
    }

    #[test]
    fn truncated_file() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&[0, 0, 0, 20, 0x00]); // declares 20 bytes, has 1
        let result = decode(&bytes, ValidatingHandler::new());
        assert!(matches!(
            result,
            Err(CodecError::Format(FormatError::UnexpectedEof { .. }))
        ));
    }
}
