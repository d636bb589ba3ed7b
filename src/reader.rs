#![doc = r#"
A cursor over an in-memory byte buffer, for the decode side.

The decoder only ever pulls bytes through a [`Reader`]; it never touches
the buffer directly. The reader takes care of big-endianness and keeps
track of the cursor position.

Short reads are not errors here: [`Reader::read`] and [`Reader::peek`]
return however many bytes remain (possibly none), and callers that require
an exact count check the returned length. Seeking past the end is likewise
deferred, the failure surfaces on the next read that comes up short.
"#]

use crate::{
    codec,
    error::FormatError,
};

/// A read cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// The current cursor position.
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor to an absolute position.
    ///
    /// No bounds check happens here; reads past the end simply come up
    /// empty.
    pub fn seek(&mut self, position: usize) {
        self.cursor = position;
    }

    /// Moves the cursor forward by `delta` bytes.
    pub fn advance(&mut self, delta: usize) {
        self.cursor += delta;
    }

    /// True if the cursor has passed the last byte.
    pub const fn is_at_end(&self) -> bool {
        self.cursor >= self.data.len()
    }

    /// Returns up to `length` bytes from the cursor without advancing.
    pub fn peek(&self, length: usize) -> &'a [u8] {
        let start = self.cursor.min(self.data.len());
        let end = (self.cursor + length).min(self.data.len());
        &self.data[start..end]
    }

    /// The byte under the cursor, if any, without advancing.
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.cursor).copied()
    }

    /// Returns up to `length` bytes from the cursor and advances by
    /// `length` (even when fewer bytes were available).
    ///
    /// Callers that need exactly `length` bytes must check the returned
    /// slice's length.
    pub fn read(&mut self, length: usize) -> &'a [u8] {
        let slice = self.peek(length);
        self.advance(length);
        slice
    }

    /// Reads an unsigned big-endian word of 1, 2 or 4 bytes.
    pub fn read_word(&mut self, n_bytes: usize) -> Result<u32, FormatError> {
        if !matches!(n_bytes, 1 | 2 | 4) {
            return Err(FormatError::WordWidth(n_bytes));
        }
        let slice = self.read(n_bytes);
        if slice.len() != n_bytes {
            return Err(FormatError::UnexpectedEof {
                wanted: n_bytes,
                got: slice.len(),
            });
        }
        // width already checked, read_bew cannot fail
        Ok(codec::read_bew(slice).unwrap_or(0))
    }

    /// Reads the next byte.
    pub fn read_byte(&mut self) -> Result<u8, FormatError> {
        self.read_word(1).map(|w| w as u8)
    }

    /// Reads a variable-length integer.
    ///
    /// Peeks at up to 4 bytes, decodes, then advances the cursor by
    /// exactly the number of bytes the varint occupied.
    pub fn read_var(&mut self) -> Result<u32, FormatError> {
        let (value, used) = codec::decode_var(self.peek(4))?;
        self.advance(used);
        Ok(value)
    }
}

#[test]
fn truncated_reads_are_not_errors() {
    use pretty_assertions::assert_eq;
    let mut reader = Reader::new(b"0123456789");
    assert_eq!(reader.read(3), b"012");
    assert_eq!(reader.read(3), b"345");
    assert_eq!(reader.read(3), b"678");
    assert_eq!(reader.read(3), b"9");
    assert_eq!(reader.read(3), b"");
    assert_eq!(reader.read(3), b"");
}

#[test]
fn peek_does_not_advance() {
    use pretty_assertions::assert_eq;
    let mut reader = Reader::new(b"0123456789");
    assert_eq!(reader.peek(4), b"0123");
    assert_eq!(reader.read(4), b"0123");
    assert_eq!(reader.peek_byte(), Some(b'4'));
    assert_eq!(reader.position(), 4);
}

#[test]
fn seek_past_end_defers_failure() {
    use pretty_assertions::assert_eq;
    let mut reader = Reader::new(b"0123");
    reader.seek(100);
    assert_eq!(reader.peek_byte(), None);
    assert_eq!(reader.read(2), b"");
    assert_eq!(
        reader.read_word(2),
        Err(FormatError::UnexpectedEof { wanted: 2, got: 0 })
    );
}

#[test]
fn words() {
    use pretty_assertions::assert_eq;
    let bytes = [0, 0, 0, 42, 0, 0, 1, 0, 1, 0, 42];
    let mut reader = Reader::new(&bytes);
    assert_eq!(reader.read_word(4), Ok(42));
    assert_eq!(reader.read_word(4), Ok(256));
    assert_eq!(reader.read_word(2), Ok(256));
    assert_eq!(reader.read_word(1), Ok(42));
    assert_eq!(reader.read_word(3), Err(FormatError::WordWidth(3)));
}

#[test]
fn varints_advance_by_their_own_length() {
    use pretty_assertions::assert_eq;
    let bytes = [0xFF, 0xFE, 0xFC, 0x2A, 0xFC, 0x2A, 0x2A];
    let mut reader = Reader::new(&bytes);
    assert_eq!(reader.read_var(), Ok(268_418_602));
    assert_eq!(reader.position(), 4);
    assert_eq!(reader.read_var(), Ok(15914));
    assert_eq!(reader.read_var(), Ok(42));
    assert_eq!(reader.read_var(), Err(FormatError::EmptyVarInt));
}
