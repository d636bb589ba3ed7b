#![doc = r#"
An append-only byte sink, for the encode side.

The encoder accumulates each track into its own [`Writer`] so the track's
length can be measured before the length-prefixed chunk is emitted, and
the whole file into another. [`Writer::as_bytes`] snapshots everything
written so far without disturbing future writes.

The writer holds no external resources; flushing to a file is a scoped
borrow of an [`std::io::Write`] via [`Writer::write_to`].
"#]

use std::io;

use crate::{
    codec,
    error::RangeError,
};

/// An append-only buffer of emitted bytes.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a slice of bytes.
    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a single byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Appends a value as a big-endian word of `width` bytes (1, 2 or 4).
    pub fn write_word(&mut self, value: u32, width: usize) -> Result<(), RangeError> {
        let word = codec::write_bew(value, width)?;
        self.write_slice(&word);
        Ok(())
    }

    /// Appends a value in variable-length format.
    ///
    /// Fails for negative values and values above [`codec::VAR_MAX`].
    pub fn write_var(&mut self, value: i64) -> Result<(), RangeError> {
        let var = codec::encode_var(value)?;
        self.write_slice(&var);
        Ok(())
    }

    /// Everything written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer, returning its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes the accumulated bytes to `out` and flushes it.
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.buf)?;
        out.flush()
    }
}

#[test]
fn snapshot_leaves_future_writes_alone() {
    use pretty_assertions::assert_eq;
    let mut writer = Writer::new();
    writer.write_slice(b"MTrk");
    assert_eq!(writer.as_bytes(), b"MTrk");
    writer.write_word(6, 4).unwrap();
    assert_eq!(writer.as_bytes(), b"MTrk\x00\x00\x00\x06");
    assert_eq!(writer.len(), 8);
}

#[test]
fn header_layout() {
    use pretty_assertions::assert_eq;
    let mut writer = Writer::new();
    writer.write_slice(b"MThd");
    writer.write_word(6, 4).unwrap();
    writer.write_word(1, 2).unwrap();
    writer.write_word(2, 2).unwrap();
    writer.write_word(15360, 2).unwrap();
    assert_eq!(
        writer.into_bytes(),
        vec![77, 84, 104, 100, 0, 0, 0, 6, 0, 1, 0, 2, 60, 0]
    );
}

#[test]
fn write_word_checks_domain() {
    use pretty_assertions::assert_eq;
    let mut writer = Writer::new();
    assert_eq!(writer.write_word(1, 3), Err(RangeError::WordWidth(3)));
    assert_eq!(
        writer.write_word(0x1_0000, 2),
        Err(RangeError::WordOverflow { value: 0x1_0000, width: 2 })
    );
    assert_eq!(writer.write_var(-1), Err(RangeError::VarInt(-1)));
    assert!(writer.is_empty());
}

#[test]
fn var_writes() {
    use pretty_assertions::assert_eq;
    let mut writer = Writer::new();
    writer.write_var(0).unwrap();
    writer.write_var(127).unwrap();
    writer.write_var(1920).unwrap();
    assert_eq!(writer.as_bytes(), &[0x00, 0x7F, 0x8F, 0x00]);
}
