//! Primitive encoding/decoding for the indexed database format.
//!
//! Implements fixed-width big-endian integers and length-prefixed strings.

use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_RELATIVE_OFFSET, MAX_STRING_LEN, MAX_U24};

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling. Offsets stored in the format
/// are absolute, so a reader can be opened at any position of the buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader positioned at an absolute offset.
    ///
    /// Fails if the offset lies past the end of the data.
    pub fn at(data: &'a [u8], offset: usize, field: &'static str) -> Result<Self, DecodeError> {
        if offset > data.len() {
            return Err(DecodeError::OffsetOutOfBounds {
                field,
                offset,
                size: data.len(),
            });
        }
        Ok(Self { data, pos: offset })
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.data.len() - self.pos {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a big-endian 2-byte unsigned integer.
    #[inline]
    pub fn read_u16(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(2, context)?;
        Ok(u32::from(bytes[0]) << 8 | u32::from(bytes[1]))
    }

    /// Reads a big-endian 3-byte unsigned integer.
    #[inline]
    pub fn read_u24(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(3, context)?;
        Ok(u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]))
    }

    /// Reads a string prefixed by a single length byte.
    pub fn read_short_bytes(&mut self, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let len = self.read_byte(context)? as usize;
        self.read_bytes(len, context)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
///
/// Every fixed-width write checks that the value fits its field; nothing is
/// truncated silently.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a writer whose first `len` bytes are zeroed, to be
    /// back-patched later.
    pub fn with_reserved(len: usize) -> Self {
        Self { buf: vec![0; len] }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a big-endian 2-byte unsigned integer.
    pub fn write_u16(&mut self, value: u32, field: &'static str) -> Result<(), EncodeError> {
        if value > MAX_RELATIVE_OFFSET {
            return Err(EncodeError::OffsetOverflow {
                field,
                value: value as usize,
                max: MAX_RELATIVE_OFFSET as usize,
            });
        }
        self.buf.extend_from_slice(&[(value >> 8) as u8, value as u8]);
        Ok(())
    }

    /// Writes a big-endian 3-byte unsigned integer.
    pub fn write_u24(&mut self, value: u32, field: &'static str) -> Result<(), EncodeError> {
        self.buf.extend_from_slice(&u24_bytes(value, field)?);
        Ok(())
    }

    /// Overwrites a previously reserved 3-byte field at `at`.
    pub fn patch_u24(&mut self, at: usize, value: u32, field: &'static str) -> Result<(), EncodeError> {
        let bytes = u24_bytes(value, field)?;
        self.buf[at..at + 3].copy_from_slice(&bytes);
        Ok(())
    }

    /// Writes a string prefixed by a single length byte.
    pub fn write_short_bytes(&mut self, bytes: &[u8], field: &'static str) -> Result<(), EncodeError> {
        self.write_byte(short_len(bytes.len(), field)?);
        self.write_bytes(bytes);
        Ok(())
    }
}

/// Checks that a string length fits in one length byte.
pub fn short_len(len: usize, field: &'static str) -> Result<u8, EncodeError> {
    if len > MAX_STRING_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field,
            len,
            max: MAX_STRING_LEN,
        });
    }
    Ok(len as u8)
}

fn u24_bytes(value: u32, field: &'static str) -> Result<[u8; 3], EncodeError> {
    if value > MAX_U24 {
        return Err(EncodeError::OffsetOverflow {
            field,
            value: value as usize,
            max: MAX_U24 as usize,
        });
    }
    Ok([(value >> 16) as u8, (value >> 8) as u8, value as u8])
}
