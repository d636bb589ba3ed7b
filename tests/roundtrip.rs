//! Transcoding tests: a file built by the encoder, decoded back into a
//! fresh encoder, must come out byte-identical.

use midifile::{EventHandler, MidiEncoder, decode};
use pretty_assertions::assert_eq;

/// Builds a two-track file exercising every event family the codec
/// knows, including running status compression.
fn rich_file() -> Vec<u8> {
    let mut out = MidiEncoder::new();
    out.header(1, 2, 480).unwrap();

    // a conductor track of meta events
    out.start_of_track(0).unwrap();
    out.update_time(0, true).unwrap();
    out.sequence_number(42).unwrap();
    out.update_time(0, true).unwrap();
    out.sequence_name(b"Synth 1").unwrap();
    out.update_time(0, true).unwrap();
    out.instrument_name(b"Synth 1").unwrap();
    out.update_time(0, true).unwrap();
    out.copyright(b"(c) nobody").unwrap();
    out.update_time(0, true).unwrap();
    out.time_signature(4, 2, 24, 8).unwrap();
    out.update_time(0, true).unwrap();
    out.key_signature(-3, 1).unwrap();
    out.update_time(0, true).unwrap();
    out.smpte_offset(0x41, 23, 45, 12, 34).unwrap();
    out.update_time(0, true).unwrap();
    out.tempo(500_000).unwrap();
    out.update_time(0, true).unwrap();
    out.midi_channel_prefix(3).unwrap();
    out.update_time(0, true).unwrap();
    out.midi_port(4).unwrap();
    out.update_time(0, true).unwrap();
    out.marker(b"verse").unwrap();
    out.update_time(480, true).unwrap();
    out.lyric(b"la").unwrap();
    out.update_time(0, true).unwrap();
    out.cuepoint(b"drop").unwrap();
    out.update_time(0, true).unwrap();
    out.program_name(b"lead").unwrap();
    out.update_time(0, true).unwrap();
    out.device_name(b"synth").unwrap();
    out.update_time(0, true).unwrap();
    out.text(b"hello").unwrap();
    out.update_time(0, true).unwrap();
    out.sequencer_specific(&[0x00, 0x00, 0x41], &[1, 2, 3]).unwrap();
    out.update_time(0, true).unwrap();
    out.meta_event(0x4A, &[9, 9, 9]).unwrap(); // an unknown meta type
    out.end_of_track().unwrap();

    // a performance track of voice and system events
    out.start_of_track(1).unwrap();
    out.update_time(0, true).unwrap();
    out.patch_change(0, 12, false).unwrap();
    out.update_time(0, true).unwrap();
    out.continuous_controller(0, 7, 100, false).unwrap();
    out.update_time(0, true).unwrap();
    out.note_on(0, 60, 100, false).unwrap();
    out.update_time(0, true).unwrap();
    out.note_on(0, 64, 100, true).unwrap(); // running status
    out.update_time(240, true).unwrap();
    out.aftertouch(0, 60, 80, false).unwrap();
    out.update_time(0, true).unwrap();
    out.channel_pressure(0, 90, false).unwrap();
    out.update_time(0, true).unwrap();
    out.pitch_bend(0, 8192, false).unwrap();
    out.update_time(240, true).unwrap();
    out.note_off(0, 60, 0, false).unwrap();
    out.update_time(0, true).unwrap();
    out.note_off(0, 64, 0, true).unwrap(); // running status again
    out.update_time(0, true).unwrap();
    out.sysex_event(&[0x41, 0x10, 0x42, 0x12]).unwrap();
    out.update_time(0, true).unwrap();
    out.midi_time_code(3, 9).unwrap();
    out.update_time(0, true).unwrap();
    out.song_position_pointer(1337).unwrap();
    out.update_time(0, true).unwrap();
    out.song_select(5).unwrap();
    out.update_time(0, true).unwrap();
    out.tuning_request().unwrap();
    out.update_time(960, true).unwrap();
    out.note_on(9, 36, 127, false).unwrap();
    out.update_time(120, true).unwrap();
    out.note_off(9, 36, 64, false).unwrap();
    out.end_of_track().unwrap();

    out.into_bytes().unwrap()
}

#[test]
fn transcode_is_identity() {
    let original = rich_file();
    let rewritten = decode(&original, MidiEncoder::new())
        .unwrap()
        .into_bytes()
        .unwrap();
    assert_eq!(rewritten, original);
}

#[test]
fn transcode_twice_is_still_identity() {
    let original = rich_file();
    let once = decode(&original, MidiEncoder::new())
        .unwrap()
        .into_bytes()
        .unwrap();
    let twice = decode(&once, MidiEncoder::new())
        .unwrap()
        .into_bytes()
        .unwrap();
    assert_eq!(twice, once);
}

#[test]
fn validating_sink_accepts_the_rich_file() {
    decode(&rich_file(), midifile::ValidatingHandler::new()).unwrap();
}

/// A handler that forwards everything to an encoder but transposes
/// every note up an octave: the classic transform pipeline.
struct Transpose {
    out: MidiEncoder,
}

impl EventHandler for Transpose {
    fn state(&self) -> &midifile::HandlerState {
        self.out.state()
    }
    fn state_mut(&mut self) -> &mut midifile::HandlerState {
        self.out.state_mut()
    }
    fn header(&mut self, format: u16, n_tracks: u16, division: u16) -> midifile::Result<()> {
        self.out.header(format, n_tracks, division)
    }
    fn start_of_track(&mut self, track: u16) -> midifile::Result<()> {
        self.out.start_of_track(track)
    }
    fn end_of_track(&mut self) -> midifile::Result<()> {
        self.out.end_of_track()
    }
    fn note_on(&mut self, ch: u8, note: u8, vel: u8, urs: bool) -> midifile::Result<()> {
        self.out.note_on(ch, note + 12, vel, urs)
    }
    fn note_off(&mut self, ch: u8, note: u8, vel: u8, urs: bool) -> midifile::Result<()> {
        self.out.note_off(ch, note + 12, vel, urs)
    }
}

#[test]
fn transform_pipeline() {
    let mut source = MidiEncoder::new();
    source.header(0, 1, 96).unwrap();
    source.start_of_track(0).unwrap();
    source.update_time(0, true).unwrap();
    source.note_on(0, 60, 100, false).unwrap();
    source.update_time(96, true).unwrap();
    source.note_off(0, 60, 0, false).unwrap();
    source.end_of_track().unwrap();
    let original = source.into_bytes().unwrap();

    let transposed = decode(&original, Transpose { out: MidiEncoder::new() })
        .unwrap()
        .out
        .into_bytes()
        .unwrap();

    let mut expected = MidiEncoder::new();
    expected.header(0, 1, 96).unwrap();
    expected.start_of_track(0).unwrap();
    expected.update_time(0, true).unwrap();
    expected.note_on(0, 72, 100, false).unwrap();
    expected.update_time(96, true).unwrap();
    expected.note_off(0, 72, 0, false).unwrap();
    expected.end_of_track().unwrap();
    assert_eq!(transposed, expected.into_bytes().unwrap());
}

#[test]
fn zero_velocity_conversion_changes_the_stream() {
    let mut source = MidiEncoder::new();
    source.header(0, 1, 96).unwrap();
    source.start_of_track(0).unwrap();
    source.update_time(0, true).unwrap();
    source.note_on(0, 60, 100, false).unwrap();
    source.update_time(96, true).unwrap();
    source.note_on(0, 60, 0, false).unwrap(); // vel 0: note off in disguise
    source.end_of_track().unwrap();
    let original = source.into_bytes().unwrap();

    let mut decoder = midifile::MidiDecoder::new(&original, MidiEncoder::new())
        .convert_zero_velocity(true);
    decoder.read().unwrap();
    let converted = decoder.into_handler().into_bytes().unwrap();

    let mut expected = MidiEncoder::new();
    expected.header(0, 1, 96).unwrap();
    expected.start_of_track(0).unwrap();
    expected.update_time(0, true).unwrap();
    expected.note_on(0, 60, 100, false).unwrap();
    expected.update_time(96, true).unwrap();
    expected.note_off(0, 60, 0x40, false).unwrap();
    expected.end_of_track().unwrap();
    assert_eq!(converted, expected.into_bytes().unwrap());
}
