//! Error types for indexed database encoding/decoding, linear parsing and
//! validation.

use thiserror::Error;

/// Error while decoding an indexed database.
///
/// A lookup for an ID that is not in the database is not an error; see
/// [`IndexedDb::lookup`](crate::IndexedDb::lookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("not an indexed user database: bad magic number {found:02x?}")]
    InvalidMagic { found: [u8; 3] },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("{field} offset {offset} is outside the database (size: {size})")]
    OffsetOutOfBounds {
        field: &'static str,
        offset: usize,
        size: usize,
    },

    #[error("malformed header: {context}")]
    MalformedHeader { context: &'static str },

    #[error("database declares {declared} bytes but only {actual} are present")]
    TruncatedDatabase { declared: usize, actual: usize },

    #[error("database size {len} exceeds maximum {max}")]
    DatabaseTooLarge { len: usize, max: usize },
}

/// Error while encoding an indexed database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} offset {value:#x} does not fit in its field (maximum {max:#x})")]
    OffsetOverflow {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("record count {count} exceeds maximum {max}")]
    TooManyRecords { count: usize, max: usize },

    #[error("DMR ID {id} does not fit in 3 bytes")]
    IdOutOfRange { id: u32 },

    #[error("database size {size} exceeds maximum {max}")]
    DatabaseTooLarge { size: usize, max: usize },

    #[error("encoder was sized for {expected} records but received {actual}")]
    RecordCountMismatch { expected: usize, actual: usize },
}

/// Error while parsing a linear database.
///
/// Line numbers are 1-based and count the preamble line, if any.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line} has fewer than 7 fields ({found})")]
    TooFewFields { line: usize, found: usize },

    #[error("line {line} has more than 7 fields")]
    TooManyFields { line: usize },

    #[error("line {line}: bad DMR ID {value:?}")]
    InvalidId { line: usize, value: String },
}

/// Error found while validating a complete indexed database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("header declares {declared} bytes but the database is {actual} bytes")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("index entry {index} has ID {id}, not greater than the previous ID {previous}")]
    IndexNotSorted { index: usize, previous: u32, id: u32 },
}
