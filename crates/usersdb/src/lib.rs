//! DMR user database conversion between the linear and indexed formats.
//!
//! Radios in the md380 family look up caller details (callsign, name, city,
//! state, nickname, country) by DMR ID. The canonical "linear" database is a
//! comma-separated text file with one user per line. The "indexed" database
//! carries the same information in roughly half the space: a sorted ID table
//! for binary search, followed by a pool of deduplicated, pointer-chained
//! nodes.
//!
//! # Quick Start
//!
//! ```rust
//! use usersdb::{RecordBuilder, encode_database, find_user};
//!
//! let records = vec![
//!     RecordBuilder::new(1001)
//!         .callsign("N0CALL")
//!         .name("John Doe")
//!         .city("Springfield")
//!         .state("IL")
//!         .country("USA")
//!         .build(),
//! ];
//!
//! // Encode to the indexed format
//! let bytes = encode_database(&records).unwrap();
//!
//! // Binary-search lookup by DMR ID
//! let user = find_user(&bytes, 1001).unwrap().unwrap();
//! assert_eq!(&*user.city, b"Springfield");
//! assert!(find_user(&bytes, 1002).unwrap().is_none());
//! ```
//!
//! # Modules
//!
//! - [`model`]: The user record and its builder
//! - [`codec`]: Indexed (binary) format encoder and decoder
//! - [`linear`]: Linear (delimited text) format reader and writer
//! - [`validate`]: Whole-database structural checks
//! - [`error`]: Error types
//! - [`limits`]: Format constants and field-width limits
//!
//! # Wire Format
//!
//! ```text
//! header   magic(3) record_count(3) table_size(3)
//! index    [ id(3) callsign_node(3) ] * record_count, ascending by id
//! pool     string / city / state / callsign nodes
//! ```
//!
//! All multi-byte integers are big-endian. Offsets are absolute from the
//! start of the buffer, except the 2-byte country pointers, which are
//! relative to the start of the node pool.

pub mod codec;
pub mod error;
pub mod limits;
pub mod linear;
pub mod model;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    decode_database, encode_database, find_user, EncodeStats, Encoder, FieldFlags, IndexedDb,
};
pub use error::{DecodeError, EncodeError, ParseError, ValidationError};
pub use linear::{format_record, parse_linear, write_linear, write_record};
pub use model::{RecordBuilder, UserRecord};
pub use validate::{validate_database, DatabaseSummary};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
