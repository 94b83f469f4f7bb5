//! Format constants and field-width limits.
//!
//! The indexed format stores every number in a fixed-width big-endian
//! field, so these limits follow directly from the field widths.

/// Magic number at offset 0: the bytes `'0'`, `'\n'`, `0x01`.
pub const MAGIC: u32 = 0x30_0A_01;

/// Header: magic(3) + record count(3) + table size(3).
pub const HEADER_SIZE: usize = 9;

/// Offset of the record count within the header.
pub const RECORD_COUNT_OFFSET: usize = 3;

/// Offset of the table size within the header.
pub const TABLE_SIZE_OFFSET: usize = 6;

/// Index entry: DMR ID(3) + callsign node offset(3).
pub const INDEX_ENTRY_SIZE: usize = 6;

/// Largest value of a 3-byte field (IDs, record count, absolute offsets).
pub const MAX_U24: u32 = 0xFF_FFFF;

/// Largest pool-relative country offset (2-byte field).
pub const MAX_RELATIVE_OFFSET: u32 = 0xFFFF;

/// Largest DMR ID.
pub const MAX_ID: u32 = MAX_U24;

/// Largest number of records in one database.
pub const MAX_RECORDS: usize = MAX_U24 as usize;

/// Largest string stored behind a single length byte.
pub const MAX_STRING_LEN: usize = 0xFF;

/// Callsigns up to this length share the lead byte with the flags.
///
/// Flags occupy the five high bits, leaving three bits of inline length.
/// Longer or empty callsigns get a separate length byte.
pub const SHORT_CALLSIGN_LEN: usize = 7;

/// Largest indexed database the decoder accepts (its fixed read buffer).
pub const MAX_DATABASE_SIZE: usize = 16 * 1024 * 1024;

/// Largest table size the encoder can declare in the 3-byte header field.
pub const MAX_TABLE_SIZE: usize = MAX_U24 as usize;
