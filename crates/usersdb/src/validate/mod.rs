//! Structural validation of complete indexed databases.
//!
//! Decoding checks only what a lookup touches. This module checks a whole
//! artifact: the declared size, the index ordering that binary search
//! depends on, and that every record resolves.
//!
//! **Note:** The encoder keeps input order and never sorts. A database
//! built from unsorted input decodes fine record by record but fails
//! [`validate_database`] with [`ValidationError::IndexNotSorted`].

use crate::codec::IndexedDb;
use crate::error::ValidationError;

/// Shape of a validated database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub records: usize,
    pub index_bytes: usize,
    pub pool_bytes: usize,
    pub total_bytes: usize,
}

/// Validates an indexed database.
///
/// Unlike [`IndexedDb::open`], trailing bytes after the declared table are
/// an error here.
pub fn validate_database(data: &[u8]) -> Result<DatabaseSummary, ValidationError> {
    let db = IndexedDb::open(data)?;
    if db.total_size() != data.len() {
        return Err(ValidationError::SizeMismatch {
            declared: db.total_size(),
            actual: data.len(),
        });
    }

    let mut previous = None;
    for index in 0..db.len() {
        let id = db.id_at(index)?;
        if let Some(previous) = previous {
            if id <= previous {
                return Err(ValidationError::IndexNotSorted { index, previous, id });
            }
        }
        previous = Some(id);
    }

    for record in db.records() {
        record?;
    }

    let pool_base = db.pool_base();
    Ok(DatabaseSummary {
        records: db.len(),
        index_bytes: pool_base - crate::limits::HEADER_SIZE,
        pool_bytes: db.total_size() - pool_base,
        total_bytes: db.total_size(),
    })
}
