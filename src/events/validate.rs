//! The argument-domain checks behind the [`EventHandler`] contract.
//!
//! The default trait methods and the file encoder run the *same* checks;
//! they live here as free functions so the encoder can invoke them before
//! serializing, the way an overriding handler re-invokes the base
//! validation.
//!
//! [`EventHandler`]: super::EventHandler

use crate::{
    error::{RangeError, Result, SmpteError},
    events::HandlerState,
    message::ChannelMessageType,
};

/// MIDI channels are 0-15.
pub fn channel(channel: u8) -> Result<()> {
    if channel > 15 {
        return Err(RangeError::Channel(channel).into());
    }
    Ok(())
}

fn data_byte(value: u8, err: fn(u8) -> RangeError) -> Result<()> {
    if value > 127 {
        return Err(err(value).into());
    }
    Ok(())
}

/// Checks a voice event that carries a note and velocity, and records the
/// new running status.
fn note_event(
    state: &mut HandlerState,
    message_type: ChannelMessageType,
    ch: u8,
    note: u8,
    velocity: u8,
    use_running_status: bool,
) -> Result<()> {
    channel(ch)?;
    state.check_running_status(use_running_status, message_type.status(ch))?;
    data_byte(note, RangeError::Note)?;
    data_byte(velocity, RangeError::Velocity)?;
    state.set_running_status(message_type.status(ch))?;
    Ok(())
}

/// note_on: channel 0-15, note and velocity 0-127.
pub fn note_on(
    state: &mut HandlerState,
    ch: u8,
    note: u8,
    velocity: u8,
    use_running_status: bool,
) -> Result<()> {
    note_event(state, ChannelMessageType::NoteOn, ch, note, velocity, use_running_status)
}

/// note_off: channel 0-15, note and velocity 0-127.
pub fn note_off(
    state: &mut HandlerState,
    ch: u8,
    note: u8,
    velocity: u8,
    use_running_status: bool,
) -> Result<()> {
    note_event(state, ChannelMessageType::NoteOff, ch, note, velocity, use_running_status)
}

/// aftertouch: channel 0-15, note and velocity 0-127.
pub fn aftertouch(
    state: &mut HandlerState,
    ch: u8,
    note: u8,
    velocity: u8,
    use_running_status: bool,
) -> Result<()> {
    note_event(state, ChannelMessageType::Aftertouch, ch, note, velocity, use_running_status)
}

/// continuous_controller: channel 0-15, controller and value 0-127.
pub fn continuous_controller(
    state: &mut HandlerState,
    ch: u8,
    controller: u8,
    value: u8,
    use_running_status: bool,
) -> Result<()> {
    channel(ch)?;
    let status = ChannelMessageType::ContinuousController.status(ch);
    state.check_running_status(use_running_status, status)?;
    data_byte(controller, RangeError::Controller)?;
    data_byte(value, RangeError::ControllerValue)?;
    state.set_running_status(status)?;
    Ok(())
}

/// patch_change: channel 0-15, patch 0-127.
pub fn patch_change(
    state: &HandlerState,
    ch: u8,
    patch: u8,
    use_running_status: bool,
) -> Result<()> {
    channel(ch)?;
    state.check_running_status(use_running_status, ChannelMessageType::PatchChange.status(ch))?;
    data_byte(patch, RangeError::Patch)
}

/// channel_pressure: channel 0-15, pressure 0-127.
pub fn channel_pressure(
    state: &HandlerState,
    ch: u8,
    pressure: u8,
    use_running_status: bool,
) -> Result<()> {
    channel(ch)?;
    state.check_running_status(
        use_running_status,
        ChannelMessageType::ChannelPressure.status(ch),
    )?;
    data_byte(pressure, RangeError::Pressure)
}

/// pitch_bend: channel 0-15, value 0-16383 (14 bits on the wire).
pub fn pitch_bend(
    state: &HandlerState,
    ch: u8,
    value: u16,
    use_running_status: bool,
) -> Result<()> {
    channel(ch)?;
    state.check_running_status(use_running_status, ChannelMessageType::PitchBend.status(ch))?;
    if value > 0x3FFF {
        return Err(RangeError::PitchBend(value).into());
    }
    Ok(())
}

/// Sysex payloads carry only data bytes (0-127).
pub fn sysex_data(data: &[u8]) -> Result<()> {
    for &byte in data {
        if byte > 127 {
            return Err(RangeError::SysexData(byte).into());
        }
    }
    Ok(())
}

/// song_position_pointer: 0-16383.
pub fn song_position(position: u16) -> Result<()> {
    if position > 0x3FFF {
        return Err(RangeError::SongPosition(position).into());
    }
    Ok(())
}

/// song_select: 0-127.
pub fn song_number(number: u8) -> Result<()> {
    data_byte(number, RangeError::SongNumber)
}

/// midi_time_code: message type 0-7, values 0-15.
pub fn midi_time_code(msg_type: u8, values: u8) -> Result<()> {
    if msg_type > 7 {
        return Err(RangeError::MtcType(msg_type).into());
    }
    if values > 15 {
        return Err(RangeError::MtcValues(values).into());
    }
    Ok(())
}

/// header: format must be 0, 1 or 2.
pub fn header(format: u16) -> Result<()> {
    if format > 2 {
        return Err(RangeError::Format(format).into());
    }
    Ok(())
}

/// sequence_number: 0-16383.
pub fn sequence_number(number: u16) -> Result<()> {
    if number > 0x3FFF {
        return Err(RangeError::SequenceNumber(number).into());
    }
    Ok(())
}

/// tempo: 0-16777215 microseconds per quarter note (3 bytes).
pub fn tempo(tempo: u32) -> Result<()> {
    if tempo > 0xFF_FFFF {
        return Err(RangeError::Tempo(tempo).into());
    }
    Ok(())
}

/// key_signature: sharps -7..=7, mode 0 (major) or 1 (minor).
pub fn key_signature(sharps: i8, mode: u8) -> Result<()> {
    if !(-7..=7).contains(&sharps) {
        return Err(RangeError::KeySignature(sharps).into());
    }
    if mode > 1 {
        return Err(RangeError::KeyMode(mode).into());
    }
    Ok(())
}

/// smpte_offset: the hour byte is `0rrhhhhh`, with the frame bound tied
/// to the `rr` frame rate code (24/25/29-drop/30 fps allow up to
/// 23/24/28/29 frames).
pub fn smpte_offset(hour: u8, minute: u8, second: u8, frame: u8, frame_part: u8) -> Result<()> {
    let rate = (hour & 0b0110_0000) >> 5;
    let hour_actual = hour & 0b0001_1111;
    if hour_actual > 23 {
        return Err(RangeError::Smpte(SmpteError::Hour(hour_actual)).into());
    }
    if minute > 59 {
        return Err(RangeError::Smpte(SmpteError::Minute(minute)).into());
    }
    if second > 59 {
        return Err(RangeError::Smpte(SmpteError::Second(second)).into());
    }
    let max = match rate {
        0 => 23,
        1 => 24,
        2 => 28,
        _ => 29,
    };
    if frame > max {
        return Err(RangeError::Smpte(SmpteError::Frame { rate, max, frame }).into());
    }
    if frame_part > 99 {
        return Err(RangeError::Smpte(SmpteError::Subframe(frame_part)).into());
    }
    Ok(())
}

/// Manufacturer ids are either a single nonzero data byte, or three bytes
/// starting with zero (the extended id space). The length matters:
/// a 1-byte `0x41` and a 3-byte `00 00 41` are different manufacturers.
pub fn manufacturer_id(id: &[u8]) -> Result<()> {
    let ok = match *id {
        [first] => first != 0 && first <= 127,
        [0, _, _] => true,
        _ => false,
    };
    if !ok {
        return Err(RangeError::ManufacturerId(id.to_vec()).into());
    }
    Ok(())
}

/// sequencer_specific: a legal manufacturer id plus data bytes.
pub fn sequencer_specific(id: &[u8], data: &[u8]) -> Result<()> {
    manufacturer_id(id)?;
    for &byte in data {
        if byte > 127 {
            return Err(RangeError::SysexData(byte).into());
        }
    }
    Ok(())
}

#[test]
fn channel_bounds() {
    use crate::error::CodecError;
    use pretty_assertions::assert_eq;
    channel(15).unwrap();
    assert_eq!(channel(16), Err(CodecError::Range(RangeError::Channel(16))));
}

#[test]
fn manufacturer_ids() {
    use pretty_assertions::assert_eq;
    manufacturer_id(&[0x41]).unwrap();
    manufacturer_id(&[0, 0, 0x41]).unwrap();
    assert!(manufacturer_id(&[0]).is_err());
    assert!(manufacturer_id(&[42, 0, 42]).is_err());
    assert!(manufacturer_id(&[0, 0]).is_err());
    assert_eq!(
        sequencer_specific(&[0x41], &[1, 42, 45]),
        Ok(())
    );
    assert!(sequencer_specific(&[0x41], &[1, 42, 200]).is_err());
}

#[test]
fn smpte_frame_bound_follows_rate() {
    use pretty_assertions::assert_eq;
    // rate code 1 = 25 fps, frame bound 24
    smpte_offset(0b0010_0000 + 13, 37, 0, 24, 0).unwrap();
    assert_eq!(
        smpte_offset(0b0010_0000 + 13, 37, 0, 31, 0),
        Err(RangeError::Smpte(SmpteError::Frame { rate: 1, max: 24, frame: 31 }).into())
    );
    // rate code 3 = 30 fps, frame bound 29
    smpte_offset(0b0110_0000 + 13, 37, 0, 29, 0).unwrap();
    assert!(smpte_offset(0b0000_0000 + 25, 0, 0, 0, 0).is_err());
}
