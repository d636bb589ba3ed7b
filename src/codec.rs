#![doc = r#"
Conversions for the primitive data types a MIDI file is built from.

Three families live here:
- big-endian words of 1, 2 or 4 bytes, used for chunk sizes and header
  fields,
- variable-length integers ("varints"): 1-4 bytes carrying 7 bits each,
  high bit set on every byte except the last, so the maximum value is
  28 bits (`0x0FFFFFFF`),
- small helpers for nibbles and two's-complement bytes (the key signature
  stores its sharps/flats count as a signed byte).

All functions are pure; the stateful cursor types in [`crate::reader`] and
[`crate::writer`] are built on top of them.
"#]

use crate::error::{FormatError, RangeError};

/// The largest value a varint can carry: four bytes of 7 bits each.
pub const VAR_MAX: u32 = 0x0FFF_FFFF;

/// Splits a byte into its (hi, lo) nibbles.
///
/// The status byte of a channel message packs the message type into the
/// high nibble and the channel into the low one.
pub const fn nibbles(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// Combines two nibbles into a byte; each must be 0-15.
pub const fn from_nibbles(hi: u8, lo: u8) -> Result<u8, RangeError> {
    if hi > 15 || lo > 15 {
        return Err(RangeError::Nibble(hi, lo));
    }
    Ok((hi << 4) | lo)
}

/// Reads an unsigned big-endian word of 1, 2 or 4 bytes.
pub const fn read_bew(bytes: &[u8]) -> Result<u32, RangeError> {
    match *bytes {
        [a] => Ok(a as u32),
        [a, b] => Ok(u16::from_be_bytes([a, b]) as u32),
        [a, b, c, d] => Ok(u32::from_be_bytes([a, b, c, d])),
        _ => Err(RangeError::WordWidth(bytes.len())),
    }
}

/// Writes a value as a big-endian word of `width` bytes (1, 2 or 4).
///
/// The value must fit in the requested width.
pub fn write_bew(value: u32, width: usize) -> Result<Vec<u8>, RangeError> {
    let fits = match width {
        1 => value <= 0xFF,
        2 => value <= 0xFFFF,
        4 => true,
        _ => return Err(RangeError::WordWidth(width)),
    };
    if !fits {
        return Err(RangeError::WordOverflow {
            value: value as u64,
            width,
        });
    }
    let be = value.to_be_bytes();
    Ok(be[4 - width..].to_vec())
}

/// Decodes a varint prefix of `bytes`.
///
/// Accumulates 7 bits per byte, most significant byte first, stopping at
/// the first byte whose high bit is clear. Trailing bytes past the
/// terminator are ignored, so it is fine to hand this more data than the
/// varint occupies. At most 4 bytes are consumed.
///
/// Returns the value and the number of bytes the varint occupied.
/// Fails only when `bytes` is empty.
pub const fn decode_var(bytes: &[u8]) -> Result<(u32, usize), FormatError> {
    if bytes.is_empty() {
        return Err(FormatError::EmptyVarInt);
    }
    let mut value: u32 = 0;
    let mut used = 0;
    while used < bytes.len() && used < 4 {
        let byte = bytes[used];
        value = (value << 7) | (byte & 0x7F) as u32;
        used += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok((value, used))
}

/// Encodes a value in varint format.
///
/// Fails for negative values and for values above [`VAR_MAX`].
pub fn encode_var(value: i64) -> Result<Vec<u8>, RangeError> {
    if value < 0 || value > VAR_MAX as i64 {
        return Err(RangeError::VarInt(value));
    }
    let value = value as u32;
    let len = var_len(value);
    let mut out = Vec::with_capacity(len);
    let mut shift = (len - 1) * 7;
    loop {
        let mut byte = ((value >> shift) & 0x7F) as u8;
        if shift > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if shift == 0 {
            break;
        }
        shift -= 7;
    }
    Ok(out)
}

/// The number of bytes `value` occupies in varint format (1-4).
pub const fn var_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Encodes a signed byte as its two's-complement bit pattern.
///
/// Used for the sharps/flats count of key signature events.
pub const fn to_twos_complement(value: i8) -> u8 {
    value as u8
}

/// Decodes a two's-complement bit pattern back into a signed byte.
pub const fn from_twos_complement(byte: u8) -> i8 {
    byte as i8
}

#[test]
fn nibble_round_trip() {
    use pretty_assertions::assert_eq;
    assert_eq!(nibbles(142), (8, 14));
    assert_eq!(from_nibbles(8, 14), Ok(142));
    assert_eq!(from_nibbles(8, 16), Err(RangeError::Nibble(8, 16)));
}

#[test]
fn bew_round_trip() {
    use pretty_assertions::assert_eq;
    assert_eq!(read_bew(&[0x61, 0xE1, 0xE2, 0xE3]), Ok(1_642_193_635));
    assert_eq!(read_bew(&[0x61, 0xE1]), Ok(25057));
    assert_eq!(read_bew(&[]), Err(RangeError::WordWidth(0)));
    assert_eq!(read_bew(&[0, 0, 1]), Err(RangeError::WordWidth(3)));

    for (value, width) in [(42, 1), (25057, 2), (1_642_193_635, 4)] {
        let bytes = write_bew(value, width).unwrap();
        assert_eq!(bytes.len(), width);
        assert_eq!(read_bew(&bytes), Ok(value));
    }
    assert_eq!(write_bew(16, 3), Err(RangeError::WordWidth(3)));
    assert_eq!(
        write_bew(256, 1),
        Err(RangeError::WordOverflow { value: 256, width: 1 })
    );
}

#[test]
fn var_round_trip() {
    use pretty_assertions::assert_eq;
    assert_eq!(decode_var(&[64]), Ok((64, 1)));
    assert_eq!(decode_var(&[225, 226, 227, 97]), Ok((205_042_145, 4)));
    // trailing bytes past the terminator are ignored
    assert_eq!(decode_var(&[0x81, 0x00, 0xFF, 0xFF]), Ok((128, 2)));
    assert_eq!(decode_var(&[]), Err(FormatError::EmptyVarInt));

    for value in [0u32, 127, 128, 16383, 16384, 2_097_151, 2_097_152, VAR_MAX] {
        let bytes = encode_var(value as i64).unwrap();
        assert_eq!(bytes.len(), var_len(value));
        assert_eq!(decode_var(&bytes), Ok((value, bytes.len())));
    }
}

#[test]
fn var_boundaries() {
    use pretty_assertions::assert_eq;
    assert_eq!(encode_var(VAR_MAX as i64).unwrap().len(), 4);
    assert_eq!(
        encode_var(0x1000_0000),
        Err(RangeError::VarInt(0x1000_0000))
    );
    assert_eq!(encode_var(-1), Err(RangeError::VarInt(-1)));
}

#[test]
fn twos_complement() {
    use pretty_assertions::assert_eq;
    assert_eq!(to_twos_complement(-7), 249);
    assert_eq!(to_twos_complement(-128), 0b1000_0000);
    assert_eq!(from_twos_complement(249), -7);
    assert_eq!(from_twos_complement(7), 7);
}
