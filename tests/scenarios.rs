//! Byte-exact encoding scenarios and the numeric boundary cases.

use midifile::{
    CodecError, EventHandler, MidiEncoder, RangeError, ValidatingHandler, codec, decode,
};
use pretty_assertions::assert_eq;

/// A format-0 file with one note held for four beats. The track length
/// is computed from the pieces rather than assumed: 4 bytes of note-on,
/// 2 bytes of delta varint plus 3 of note-off, and the 4-byte end
/// marker.
#[test]
fn one_note_file() {
    let mut out = MidiEncoder::new();
    out.header(0, 1, 480).unwrap();
    out.start_of_track(0).unwrap();
    out.update_time(0, true).unwrap();
    out.note_on(0, 64, 100, false).unwrap();
    out.update_time(1920, true).unwrap();
    out.note_off(0, 64, 0, false).unwrap();
    out.end_of_track().unwrap();
    let bytes = out.into_bytes().unwrap();

    let note_on = [0x00, 0x90, 0x40, 0x64];
    let note_off = [0x8F, 0x00, 0x80, 0x40, 0x00]; // delta 1920 is two varint bytes
    let end_of_track = [0x00, 0xFF, 0x2F, 0x00];
    let track_length = note_on.len() + note_off.len() + end_of_track.len();
    assert_eq!(track_length, 13);

    let mut expected = vec![];
    expected.extend_from_slice(b"MThd");
    expected.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 1, 224]);
    expected.extend_from_slice(b"MTrk");
    expected.extend_from_slice(&(track_length as u32).to_be_bytes());
    expected.extend_from_slice(&note_on);
    expected.extend_from_slice(&note_off);
    expected.extend_from_slice(&end_of_track);
    assert_eq!(bytes, expected);
}

#[test]
fn text_meta_event_bytes() {
    let mut out = MidiEncoder::new();
    out.start_of_track(0).unwrap();
    out.text(b"hi").unwrap();
    out.end_of_track().unwrap();
    let bytes = out.as_bytes();
    // delta 0, then FF 01 02 'h' 'i'
    assert_eq!(&bytes[8..14], &[0x00, 0xFF, 0x01, 0x02, 0x68, 0x69]);
}

/// A header that declares 8 bytes must have its 2 surplus bytes skipped
/// while the standard triple still parses.
#[test]
fn oversized_header() {
    struct Header {
        state: midifile::HandlerState,
        fields: Option<(u16, u16, u16)>,
    }
    impl EventHandler for Header {
        fn state(&self) -> &midifile::HandlerState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut midifile::HandlerState {
            &mut self.state
        }
        fn header(&mut self, format: u16, n_tracks: u16, division: u16) -> midifile::Result<()> {
            self.fields = Some((format, n_tracks, division));
            Ok(())
        }
    }

    let mut bytes = vec![];
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&[0, 0, 0, 8]);
    bytes.extend_from_slice(&[0, 1, 0, 0, 1, 224]);
    bytes.extend_from_slice(&[0xDE, 0xAD]); // the surplus
    let handler = decode(
        &bytes,
        Header {
            state: Default::default(),
            fields: None,
        },
    )
    .unwrap();
    assert_eq!(handler.fields, Some((1, 0, 480)));
}

#[test]
fn sequencer_specific_manufacturer_ids() {
    let mut handler = ValidatingHandler::new();
    // a 3-byte id starting with zero is the extended id space
    handler.sequencer_specific(&[0x00, 0x00, 0x41], &[1, 42, 45]).unwrap();
    handler.sequencer_specific(&[0x41], &[1, 42, 45]).unwrap();

    // zero alone must be a 3-byte id
    assert_eq!(
        handler.sequencer_specific(&[0x00], &[1, 42, 45]),
        Err(CodecError::Range(RangeError::ManufacturerId(vec![0x00])))
    );
    assert_eq!(
        handler.sequencer_specific(&[0x00, 0x00], &[]),
        Err(CodecError::Range(RangeError::ManufacturerId(vec![0x00, 0x00])))
    );
    assert!(handler.sequencer_specific(&[0x01, 0x00, 0x38], &[]).is_err());
}

#[test]
fn varint_boundary() {
    assert_eq!(codec::encode_var(0x0FFF_FFFF).unwrap().len(), 4);
    assert_eq!(
        codec::encode_var(0x1000_0000),
        Err(RangeError::VarInt(0x1000_0000))
    );
}

#[test]
fn word_round_trips() {
    for width in [1usize, 2, 4] {
        let max = match width {
            1 => 0xFFu32,
            2 => 0xFFFF,
            _ => u32::MAX,
        };
        for value in [0, 1, 42, max / 2, max] {
            let bytes = codec::write_bew(value, width).unwrap();
            assert_eq!(codec::read_bew(&bytes).unwrap(), value);
        }
    }
}

#[test]
fn varint_round_trips() {
    let mut value = 0u32;
    while value <= codec::VAR_MAX {
        let bytes = codec::encode_var(value as i64).unwrap();
        assert_eq!(codec::decode_var(&bytes).unwrap(), (value, codec::var_len(value)));
        // sample the space densely near the bottom, sparsely above
        value = value * 3 / 2 + 1;
    }
}

#[test]
fn time_formula() {
    let mut handler = ValidatingHandler::new();
    handler.update_time(100, true).unwrap();
    handler.update_time(50, true).unwrap();
    assert_eq!(handler.state().absolute_time(), 150);

    // an absolute update derives the relative delta from the prior
    // absolute time
    handler.update_time(400, false).unwrap();
    assert_eq!(handler.state().relative_time(), 250);
    assert_eq!(handler.state().absolute_time(), 400);
}

#[test]
fn monotone_under_relative_updates() {
    let mut handler = ValidatingHandler::new();
    let mut previous = 0;
    for delta in [0i64, 1, 0, 480, 96, 0, 1920] {
        handler.update_time(delta, true).unwrap();
        assert!(handler.state().absolute_time() >= previous);
        previous = handler.state().absolute_time();
    }
}
