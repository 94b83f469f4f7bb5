//! Indexed database decoding.
//!
//! Decoding never copies strings: records borrow from the database buffer.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::codec::flags::{next_in_chain, ChainLink, FieldFlags};
use crate::codec::node::{read_pointer, resolve_callsign, resolve_string, NodeHandle};
use crate::codec::primitives::Reader;
use crate::error::DecodeError;
use crate::limits::{
    HEADER_SIZE, INDEX_ENTRY_SIZE, MAGIC, MAX_DATABASE_SIZE, RECORD_COUNT_OFFSET,
    TABLE_SIZE_OFFSET,
};
use crate::model::UserRecord;

/// A read-only view of an indexed database.
///
/// Construction checks the header; every later read is bounds-checked
/// against the declared table size, so a corrupt database yields a
/// [`DecodeError`], never a panic.
#[derive(Debug, Clone, Copy)]
pub struct IndexedDb<'a> {
    data: &'a [u8],
    count: usize,
}

impl<'a> IndexedDb<'a> {
    /// Opens a database, validating its header.
    ///
    /// Bytes past the declared table size are ignored.
    pub fn open(data: &'a [u8]) -> Result<Self, DecodeError> {
        if data.len() > MAX_DATABASE_SIZE {
            return Err(DecodeError::DatabaseTooLarge {
                len: data.len(),
                max: MAX_DATABASE_SIZE,
            });
        }
        if data.len() < HEADER_SIZE {
            return Err(DecodeError::UnexpectedEof { context: "header" });
        }

        let mut reader = Reader::new(data);
        let magic = reader.read_u24("magic")?;
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic {
                found: [data[0], data[1], data[2]],
            });
        }
        debug_assert_eq!(reader.position(), RECORD_COUNT_OFFSET);
        let count = reader.read_u24("record count")? as usize;
        debug_assert_eq!(reader.position(), TABLE_SIZE_OFFSET);
        let declared = reader.read_u24("table size")? as usize;

        if declared < HEADER_SIZE + count * INDEX_ENTRY_SIZE {
            return Err(DecodeError::MalformedHeader {
                context: "table size is smaller than the index",
            });
        }
        if declared > data.len() {
            return Err(DecodeError::TruncatedDatabase {
                declared,
                actual: data.len(),
            });
        }

        Ok(Self {
            data: &data[..declared],
            count,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Declared table size: header, index and node pool.
    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    /// Offset of the first byte after the index table.
    pub fn pool_base(&self) -> usize {
        HEADER_SIZE + self.count * INDEX_ENTRY_SIZE
    }

    /// Returns the DMR ID of the index entry at `index`.
    pub fn id_at(&self, index: usize) -> Result<u32, DecodeError> {
        let mut reader = Reader::at(self.data, entry_offset(index), "index entry")?;
        reader.read_u24("index entry")
    }

    /// Binary-searches the index for `id`, returning its entry position.
    ///
    /// The index must be sorted by ascending ID; on an unsorted index this
    /// may miss IDs that are present.
    pub fn find(&self, id: u32) -> Result<Option<usize>, DecodeError> {
        let (mut lo, mut hi) = (0, self.count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.id_at(mid)?.cmp(&id) {
                Ordering::Less => lo = mid + 1,
                Ordering::Equal => return Ok(Some(mid)),
                Ordering::Greater => hi = mid,
            }
        }
        Ok(None)
    }

    /// Looks up a record by DMR ID. `Ok(None)` means the ID is not present.
    pub fn lookup(&self, id: u32) -> Result<Option<UserRecord<'a>>, DecodeError> {
        match self.find(id)? {
            Some(index) => self.record(index).map(Some),
            None => Ok(None),
        }
    }

    /// Decodes the record at index position `index`.
    pub fn record(&self, index: usize) -> Result<UserRecord<'a>, DecodeError> {
        if index >= self.count {
            return Err(DecodeError::OffsetOutOfBounds {
                field: "index entry",
                offset: entry_offset(index),
                size: self.pool_base(),
            });
        }
        self.resolve_entry(entry_offset(index))
    }

    /// Decodes the record whose index entry starts at `entry`.
    ///
    /// Follows the callsign node's pointers to name and nickname, then walks
    /// the city → state → country chain. Each chain pointer is read from the
    /// tail of the last node resolved, so absent links are skipped.
    pub fn resolve_entry(&self, entry: usize) -> Result<UserRecord<'a>, DecodeError> {
        let mut reader = Reader::at(self.data, entry, "index entry")?;
        let id = reader.read_u24("index entry")?;
        let callsign = resolve_callsign(self.data, NodeHandle(reader.read_u24("index entry")?))?;

        let mut record = UserRecord::new(id);
        record.callsign = Cow::Borrowed(callsign.text);

        let flags = callsign.flags;
        let mut tail = Reader::at(self.data, callsign.tail, "callsign")?;
        if flags.contains(FieldFlags::NAME) {
            let handle = NodeHandle(tail.read_u24("name")?);
            record.name = Cow::Borrowed(resolve_string(self.data, handle, "name")?.text);
        }
        if flags.contains(FieldFlags::NICKNAME) {
            let handle = NodeHandle(tail.read_u24("nickname")?);
            record.nickname = Cow::Borrowed(resolve_string(self.data, handle, "nickname")?.text);
        }

        let mut at = None;
        while let Some(link) = next_in_chain(flags, at) {
            let handle = read_pointer(&mut tail, link.pointer_width(), self.pool_base(), link.name())?;
            let node = resolve_string(self.data, handle, link.name())?;
            let text = Cow::Borrowed(node.text);
            match link {
                ChainLink::City => record.city = text,
                ChainLink::State => record.state = text,
                ChainLink::Country => record.country = text,
            }
            tail = Reader::at(self.data, node.tail, link.name())?;
            at = Some(link);
        }

        Ok(record)
    }

    /// Iterates over all records in index order.
    pub fn records(&self) -> Records<'a> {
        Records {
            db: *self,
            next: 0,
        }
    }
}

/// Iterator over the records of an [`IndexedDb`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    db: IndexedDb<'a>,
    next: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<UserRecord<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.db.len() {
            return None;
        }
        let record = self.db.record(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.db.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

fn entry_offset(index: usize) -> usize {
    HEADER_SIZE + index * INDEX_ENTRY_SIZE
}

/// Looks up one record by DMR ID.
pub fn find_user(data: &[u8], id: u32) -> Result<Option<UserRecord<'_>>, DecodeError> {
    IndexedDb::open(data)?.lookup(id)
}

/// Decodes every record of a database, in index order.
pub fn decode_database(data: &[u8]) -> Result<Vec<UserRecord<'_>>, DecodeError> {
    IndexedDb::open(data)?.records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::encode_database;
    use crate::model::RecordBuilder;

    fn sample() -> Vec<u8> {
        let records: Vec<UserRecord> = (0..50u32)
            .map(|i| {
                let builder = RecordBuilder::new(3100000 + i * 7).callsign("KD0ABC");
                let builder = match i % 4 {
                    0 => builder.name("Ann").city("Denver").state("CO").country("USA"),
                    1 => builder.nickname("Bo").state("CO").country("USA"),
                    2 => builder.city("Toronto").country("Canada"),
                    _ => builder,
                };
                builder.build()
            })
            .collect();
        encode_database(&records).unwrap()
    }

    #[test]
    fn test_lookup_every_id() {
        let bytes = sample();
        let db = IndexedDb::open(&bytes).unwrap();
        assert_eq!(db.len(), 50);
        for i in 0..50u32 {
            let id = 3100000 + i * 7;
            let user = db.lookup(id).unwrap().unwrap();
            assert_eq!(user.id, id);
            assert_eq!(&*user.callsign, b"KD0ABC");
        }
    }

    #[test]
    fn test_lookup_missing_ids() {
        let bytes = sample();
        let db = IndexedDb::open(&bytes).unwrap();
        for id in [0, 3099999, 3100001, 3100000 + 49 * 7 + 1, 0xFFFFFF] {
            assert_eq!(db.lookup(id).unwrap(), None, "found {}", id);
        }
    }

    #[test]
    fn test_absent_fields_decode_empty() {
        let bytes = sample();
        let db = IndexedDb::open(&bytes).unwrap();

        let full = db.record(0).unwrap();
        assert_eq!(&*full.name, b"Ann");
        assert_eq!(&*full.city, b"Denver");
        assert_eq!(&*full.state, b"CO");
        assert_eq!(&*full.country, b"USA");
        assert!(full.nickname.is_empty());

        let state_only = db.record(1).unwrap();
        assert_eq!(&*state_only.nickname, b"Bo");
        assert!(state_only.city.is_empty());
        assert_eq!(&*state_only.state, b"CO");
        assert_eq!(&*state_only.country, b"USA");

        let city_country = db.record(2).unwrap();
        assert_eq!(&*city_country.city, b"Toronto");
        assert!(city_country.state.is_empty());
        assert_eq!(&*city_country.country, b"Canada");

        let bare = db.record(3).unwrap();
        assert_eq!(bare, UserRecord {
            id: 3100021,
            callsign: Cow::Borrowed(&b"KD0ABC"[..]),
            ..UserRecord::default()
        });
    }

    #[test]
    fn test_records_iterator() {
        let bytes = sample();
        let records = decode_database(&bytes).unwrap();
        assert_eq!(records.len(), 50);
        assert!(records.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(IndexedDb::open(&bytes).unwrap().records().len(), 50);
    }

    #[test]
    fn test_empty_database_lookup() {
        // Header only; a node pool read would run off the end
        let bytes = [0x30, 0x0A, 0x01, 0, 0, 0, 0, 0, 9];
        let db = IndexedDb::open(&bytes).unwrap();
        assert!(db.is_empty());
        assert_eq!(db.pool_base(), 9);
        assert_eq!(db.lookup(1234).unwrap(), None);
        assert_eq!(db.records().count(), 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = sample();
        bytes[0] = b'1';
        assert!(matches!(
            IndexedDb::open(&bytes),
            Err(DecodeError::InvalidMagic { found: [b'1', b'\n', 0x01] })
        ));
        assert!(find_user(&bytes, 3100000).is_err());
    }

    #[test]
    fn test_short_header() {
        assert!(matches!(
            IndexedDb::open(&[0x30, 0x0A, 0x01, 0]),
            Err(DecodeError::UnexpectedEof { context: "header" })
        ));
    }

    #[test]
    fn test_truncated_database() {
        let bytes = sample();
        let result = IndexedDb::open(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(DecodeError::TruncatedDatabase { .. })));
    }

    #[test]
    fn test_index_larger_than_table() {
        // Claims 2 records but only 9 bytes in total
        let bytes = [0x30, 0x0A, 0x01, 0, 0, 2, 0, 0, 9];
        assert!(matches!(
            IndexedDb::open(&bytes),
            Err(DecodeError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = sample();
        let size = bytes.len();
        bytes.extend_from_slice(&[0xFF; 32]);
        let db = IndexedDb::open(&bytes).unwrap();
        assert_eq!(db.total_size(), size);
        assert_eq!(db.records().filter(Result::is_ok).count(), 50);
    }

    #[test]
    fn test_dangling_pointer_is_an_error() {
        // One record whose callsign node offset points past the table
        let bytes = [0x30, 0x0A, 0x01, 0, 0, 1, 0, 0, 17, 0, 0, 5, 0, 0, 99, 0x01, b'A'];
        let db = IndexedDb::open(&bytes).unwrap();
        assert!(matches!(
            db.lookup(5),
            Err(DecodeError::OffsetOutOfBounds { offset: 99, .. })
        ));

        // Callsign claims a name pointer that is not there
        let bytes = [0x30, 0x0A, 0x01, 0, 0, 1, 0, 0, 17, 0, 0, 5, 0, 0, 15, 0x81, b'A'];
        let db = IndexedDb::open(&bytes).unwrap();
        assert!(matches!(db.lookup(5), Err(DecodeError::UnexpectedEof { context: "name" })));
    }

    #[test]
    fn test_record_index_out_of_range() {
        let bytes = sample();
        let db = IndexedDb::open(&bytes).unwrap();
        assert!(db.record(50).is_err());
    }
}
