//! Indexed database encoding.
//!
//! Nodes are written bottom-up: a node embeds the offsets of the nodes it
//! points to, so those are interned first. Every node is keyed by the full
//! content that determines its bytes, including the content of the nodes it
//! points to, and is written at most once per run.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::codec::flags::{next_in_chain, write_lead, ChainLink, FieldFlags, PointerWidth};
use crate::codec::node::NodeHandle;
use crate::codec::primitives::Writer;
use crate::error::EncodeError;
use crate::limits::{
    HEADER_SIZE, INDEX_ENTRY_SIZE, MAGIC, MAX_ID, MAX_RECORDS, MAX_TABLE_SIZE,
    RECORD_COUNT_OFFSET, TABLE_SIZE_OFFSET,
};
use crate::model::UserRecord;

/// Key of a callsign node: callsign, name, nickname, city, state, country.
type CallsignKey<'r> = [&'r [u8]; 6];

/// Key of a city node: city, state, country.
type CityKey<'r> = [&'r [u8]; 3];

/// Key of a state node: state, country.
type StateKey<'r> = [&'r [u8]; 2];

/// Maps node content to the handle of the node already written for it.
///
/// Purely additive: entries live for one encoder run.
#[derive(Debug, Clone)]
pub struct InternTable<K> {
    handles: FxHashMap<K, NodeHandle>,
}

impl<K: Hash + Eq> InternTable<K> {
    fn new() -> Self {
        Self {
            handles: FxHashMap::default(),
        }
    }

    fn get(&self, key: &K) -> Option<NodeHandle> {
        self.handles.get(key).copied()
    }

    fn insert(&mut self, key: K, handle: NodeHandle) {
        self.handles.insert(key, handle);
    }

    /// Number of distinct nodes written.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Node counts of a finished (or in-progress) encoding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeStats {
    pub records: usize,
    pub callsign_nodes: usize,
    pub city_nodes: usize,
    pub state_nodes: usize,
    pub string_nodes: usize,
    pub pool_bytes: usize,
    /// False once a record arrived out of ascending ID order.
    pub sorted: bool,
}

/// Per-run encoder context.
///
/// Owns the output buffer and the four intern tables. Keys borrow from the
/// input records, so the records must outlive the encoder.
///
/// Typical use is [`encode_database`]; driving the encoder by hand takes
/// the same two passes:
///
/// ```rust
/// use usersdb::{Encoder, RecordBuilder};
///
/// let records = vec![RecordBuilder::new(1).callsign("K1ABC").country("USA").build()];
/// let mut encoder = Encoder::new(records.len()).unwrap();
/// encoder.intern_countries(&records).unwrap();
/// for record in &records {
///     encoder.push_record(record).unwrap();
/// }
/// let bytes = encoder.finish().unwrap();
/// assert_eq!(&bytes[..3], b"0\n\x01");
/// ```
#[derive(Debug)]
pub struct Encoder<'r> {
    writer: Writer,
    pool_base: usize,
    expected: usize,
    pushed: usize,
    last_id: Option<u32>,
    sorted: bool,
    callsigns: InternTable<CallsignKey<'r>>,
    cities: InternTable<CityKey<'r>>,
    states: InternTable<StateKey<'r>>,
    strings: InternTable<&'r [u8]>,
}

impl<'r> Encoder<'r> {
    /// Creates an encoder for exactly `record_count` records.
    ///
    /// The header and index table are reserved up front; nodes are appended
    /// after them.
    pub fn new(record_count: usize) -> Result<Self, EncodeError> {
        if record_count > MAX_RECORDS {
            return Err(EncodeError::TooManyRecords {
                count: record_count,
                max: MAX_RECORDS,
            });
        }
        let pool_base = HEADER_SIZE + record_count * INDEX_ENTRY_SIZE;
        if pool_base > MAX_TABLE_SIZE {
            return Err(EncodeError::DatabaseTooLarge {
                size: pool_base,
                max: MAX_TABLE_SIZE,
            });
        }
        Ok(Self {
            writer: Writer::with_reserved(pool_base),
            pool_base,
            expected: record_count,
            pushed: 0,
            last_id: None,
            sorted: true,
            callsigns: InternTable::new(),
            cities: InternTable::new(),
            states: InternTable::new(),
            strings: InternTable::new(),
        })
    }

    /// Pass 1: writes every country string before any other node.
    ///
    /// Countries are reached through 2-byte pool-relative pointers, so they
    /// are packed at the start of the pool.
    pub fn intern_countries(&mut self, records: &'r [UserRecord<'_>]) -> Result<(), EncodeError> {
        for record in records {
            if !record.country.is_empty() {
                self.intern_country(&*record.country)?;
            }
        }
        Ok(())
    }

    /// Pass 2: interns a record's nodes and fills its index entry.
    ///
    /// Records must arrive in ascending ID order for lookups to work; the
    /// encoder does not sort them.
    pub fn push_record(&mut self, record: &'r UserRecord<'_>) -> Result<(), EncodeError> {
        if self.pushed == self.expected {
            return Err(EncodeError::RecordCountMismatch {
                expected: self.expected,
                actual: self.pushed + 1,
            });
        }
        if record.id > MAX_ID {
            return Err(EncodeError::IdOutOfRange { id: record.id });
        }
        if let Some(previous) = self.last_id {
            if self.sorted && record.id <= previous {
                tracing::warn!(
                    previous,
                    id = record.id,
                    "records are not in ascending ID order; lookups will miss entries"
                );
                self.sorted = false;
            }
        }

        let handle = self.intern_callsign(record)?;
        let entry = HEADER_SIZE + self.pushed * INDEX_ENTRY_SIZE;
        self.writer.patch_u24(entry, record.id, "id")?;
        self.writer.patch_u24(entry + 3, handle.0, "callsign")?;

        self.pushed += 1;
        self.last_id = Some(record.id);
        Ok(())
    }

    /// Returns node counts so far.
    pub fn stats(&self) -> EncodeStats {
        EncodeStats {
            records: self.pushed,
            callsign_nodes: self.callsigns.len(),
            city_nodes: self.cities.len(),
            state_nodes: self.states.len(),
            string_nodes: self.strings.len(),
            pool_bytes: self.writer.len() - self.pool_base,
            sorted: self.sorted,
        }
    }

    /// Back-patches the header and returns the database.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        if self.pushed != self.expected {
            return Err(EncodeError::RecordCountMismatch {
                expected: self.expected,
                actual: self.pushed,
            });
        }
        let size = self.writer.len();
        if size > MAX_TABLE_SIZE {
            return Err(EncodeError::DatabaseTooLarge {
                size,
                max: MAX_TABLE_SIZE,
            });
        }

        let stats = self.stats();
        tracing::debug!(
            records = stats.records,
            callsign_nodes = stats.callsign_nodes,
            city_nodes = stats.city_nodes,
            state_nodes = stats.state_nodes,
            string_nodes = stats.string_nodes,
            size,
            "encoded indexed database"
        );

        self.writer.patch_u24(0, MAGIC, "magic")?;
        self.writer.patch_u24(RECORD_COUNT_OFFSET, self.pushed as u32, "record count")?;
        self.writer.patch_u24(TABLE_SIZE_OFFSET, size as u32, "table size")?;
        Ok(self.writer.into_bytes())
    }

    // =========================================================================
    // Node interning
    // =========================================================================

    /// Handle of the next node appended to the pool.
    fn next_handle(&self, field: &'static str) -> Result<NodeHandle, EncodeError> {
        let offset = self.writer.len();
        if offset > MAX_TABLE_SIZE {
            return Err(EncodeError::OffsetOverflow {
                field,
                value: offset,
                max: MAX_TABLE_SIZE,
            });
        }
        Ok(NodeHandle(offset as u32))
    }

    fn intern_string(&mut self, text: &'r [u8], field: &'static str) -> Result<NodeHandle, EncodeError> {
        if let Some(handle) = self.strings.get(&text) {
            return Ok(handle);
        }
        let handle = self.next_handle(field)?;
        self.writer.write_short_bytes(text, field)?;
        self.strings.insert(text, handle);
        Ok(handle)
    }

    /// Interns a country string, returning its pool-relative offset.
    fn intern_country(&mut self, country: &'r [u8]) -> Result<u32, EncodeError> {
        let handle = self.intern_string(country, "country")?;
        Ok((handle.offset() - self.pool_base) as u32)
    }

    fn intern_state(&mut self, state: &'r [u8], country: &'r [u8]) -> Result<NodeHandle, EncodeError> {
        let key = [state, country];
        if let Some(handle) = self.states.get(&key) {
            return Ok(handle);
        }
        let flags = FieldFlags::for_chain(state, country);
        let pointer = self.chain_pointer(flags, Some(ChainLink::State), &[], state, country)?;

        let handle = self.next_handle("state")?;
        self.writer.write_short_bytes(state, "state")?;
        self.write_pointer(pointer)?;
        self.states.insert(key, handle);
        Ok(handle)
    }

    fn intern_city(
        &mut self,
        city: &'r [u8],
        state: &'r [u8],
        country: &'r [u8],
    ) -> Result<NodeHandle, EncodeError> {
        let key = [city, state, country];
        if let Some(handle) = self.cities.get(&key) {
            return Ok(handle);
        }
        let flags = FieldFlags::for_chain(state, country);
        let pointer = self.chain_pointer(flags, Some(ChainLink::City), city, state, country)?;

        let handle = self.next_handle("city")?;
        self.writer.write_short_bytes(city, "city")?;
        self.write_pointer(pointer)?;
        self.cities.insert(key, handle);
        Ok(handle)
    }

    fn intern_callsign(&mut self, record: &'r UserRecord<'_>) -> Result<NodeHandle, EncodeError> {
        let key: CallsignKey<'r> = [
            &*record.callsign,
            &*record.name,
            &*record.nickname,
            &*record.city,
            &*record.state,
            &*record.country,
        ];
        if let Some(handle) = self.callsigns.get(&key) {
            return Ok(handle);
        }

        let flags = FieldFlags::for_record(record);
        let name = if flags.contains(FieldFlags::NAME) {
            Some(self.intern_string(&record.name, "name")?)
        } else {
            None
        };
        let nickname = if flags.contains(FieldFlags::NICKNAME) {
            Some(self.intern_string(&record.nickname, "nickname")?)
        } else {
            None
        };
        let pointer = self.chain_pointer(flags, None, &record.city, &record.state, &record.country)?;

        let handle = self.next_handle("callsign")?;
        write_lead(&mut self.writer, flags, record.callsign.len())?;
        self.writer.write_bytes(&record.callsign);
        if let Some(name) = name {
            self.writer.write_u24(name.0, "name")?;
        }
        if let Some(nickname) = nickname {
            self.writer.write_u24(nickname.0, "nickname")?;
        }
        self.write_pointer(pointer)?;
        self.callsigns.insert(key, handle);
        Ok(handle)
    }

    /// Interns the node reached from the tail of the node for `after`,
    /// returning the link and the pointer value to store there.
    fn chain_pointer(
        &mut self,
        flags: FieldFlags,
        after: Option<ChainLink>,
        city: &'r [u8],
        state: &'r [u8],
        country: &'r [u8],
    ) -> Result<Option<(ChainLink, u32)>, EncodeError> {
        let Some(link) = next_in_chain(flags, after) else {
            return Ok(None);
        };
        let value = match link {
            ChainLink::City => self.intern_city(city, state, country)?.0,
            ChainLink::State => self.intern_state(state, country)?.0,
            ChainLink::Country => self.intern_country(country)?,
        };
        Ok(Some((link, value)))
    }

    fn write_pointer(&mut self, pointer: Option<(ChainLink, u32)>) -> Result<(), EncodeError> {
        let Some((link, value)) = pointer else {
            return Ok(());
        };
        match link.pointer_width() {
            PointerWidth::Absolute => self.writer.write_u24(value, link.name()),
            PointerWidth::PoolRelative => self.writer.write_u16(value, link.name()),
        }
    }
}

/// Encodes records into an indexed database.
///
/// Records must be sorted by ascending ID for lookups to find them; the
/// encoder keeps the given order.
pub fn encode_database(records: &[UserRecord<'_>]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = Encoder::new(records.len())?;
    encoder.intern_countries(records)?;
    for record in records {
        encoder.push_record(record)?;
    }
    encoder.finish()
}
