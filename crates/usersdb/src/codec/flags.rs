//! Presence flags, the callsign lead byte, and the pointer chain policy.
//!
//! A callsign node starts with a lead byte whose five high bits say which
//! of the record's other fields are present. The remaining three bits hold
//! the callsign length when it is short enough; otherwise they are zero and
//! a second byte carries the length.
//!
//! City, state and country form a chain: each present link is reached
//! through a pointer stored in the nearest present node before it
//! (callsign → city → state → country). Absent links cost nothing. The
//! encoder and decoder both route every pointer decision through
//! [`next_in_chain`].

use crate::codec::primitives::{short_len, Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::SHORT_CALLSIGN_LEN;
use crate::model::UserRecord;

/// Set of present fields, stored in the high bits of a callsign lead byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldFlags(u8);

impl FieldFlags {
    pub const NAME: FieldFlags = FieldFlags(1 << 7);
    pub const NICKNAME: FieldFlags = FieldFlags(1 << 6);
    pub const CITY: FieldFlags = FieldFlags(1 << 5);
    pub const STATE: FieldFlags = FieldFlags(1 << 4);
    pub const COUNTRY: FieldFlags = FieldFlags(1 << 3);

    /// All flag bits.
    pub const MASK: u8 = 0xF8;

    /// The empty set.
    pub const fn empty() -> Self {
        FieldFlags(0)
    }

    /// Extracts the flags from a lead byte, ignoring the length bits.
    pub const fn from_lead(byte: u8) -> Self {
        FieldFlags(byte & Self::MASK)
    }

    /// Returns the flags of every non-empty field of a record.
    pub fn for_record(record: &UserRecord<'_>) -> Self {
        Self::empty()
            .with(Self::NAME, !record.name.is_empty())
            .with(Self::NICKNAME, !record.nickname.is_empty())
            .with(Self::CITY, !record.city.is_empty())
            .with(Self::STATE, !record.state.is_empty())
            .with(Self::COUNTRY, !record.country.is_empty())
    }

    /// Returns the flags of a city or state node's own chain tail.
    pub fn for_chain(state: &[u8], country: &[u8]) -> Self {
        Self::empty()
            .with(Self::STATE, !state.is_empty())
            .with(Self::COUNTRY, !country.is_empty())
    }

    /// Returns these flags with `flag` added when `present` is true.
    pub const fn with(self, flag: FieldFlags, present: bool) -> Self {
        if present { FieldFlags(self.0 | flag.0) } else { self }
    }

    pub const fn contains(self, flag: FieldFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

// =============================================================================
// LEAD BYTE
// =============================================================================

/// Writes a callsign's flags and length.
///
/// Callsigns of 1 to [`SHORT_CALLSIGN_LEN`] bytes are packed into one byte.
/// Empty and longer callsigns write the flags alone, then a length byte:
/// a zero inline length always means "length follows".
pub fn write_lead(writer: &mut Writer, flags: FieldFlags, len: usize) -> Result<(), EncodeError> {
    if (1..=SHORT_CALLSIGN_LEN).contains(&len) {
        writer.write_byte(flags.bits() | len as u8);
    } else {
        writer.write_byte(flags.bits());
        writer.write_byte(short_len(len, "callsign")?);
    }
    Ok(())
}

/// Reads a callsign's flags and length.
pub fn read_lead(reader: &mut Reader<'_>) -> Result<(FieldFlags, usize), DecodeError> {
    let lead = reader.read_byte("callsign")?;
    let flags = FieldFlags::from_lead(lead);
    let len = match lead & !FieldFlags::MASK {
        0 => reader.read_byte("callsign length")?,
        len => len,
    };
    Ok((flags, len as usize))
}

// =============================================================================
// CHAIN POLICY
// =============================================================================

/// A field reached through the callsign → city → state → country chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainLink {
    City,
    State,
    Country,
}

/// How a chain pointer is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    /// 3 bytes, absolute offset.
    Absolute,
    /// 2 bytes, offset from the start of the node pool.
    PoolRelative,
}

impl ChainLink {
    /// Width of the pointer that reaches this link.
    pub const fn pointer_width(self) -> PointerWidth {
        match self {
            ChainLink::City | ChainLink::State => PointerWidth::Absolute,
            ChainLink::Country => PointerWidth::PoolRelative,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ChainLink::City => "city",
            ChainLink::State => "state",
            ChainLink::Country => "country",
        }
    }
}

/// Returns the next present link after `after` (`None` = the callsign node).
///
/// The pointer to that link is stored in the tail of the node for `after`.
pub fn next_in_chain(flags: FieldFlags, after: Option<ChainLink>) -> Option<ChainLink> {
    let candidates: &[(FieldFlags, ChainLink)] = match after {
        None => &[
            (FieldFlags::CITY, ChainLink::City),
            (FieldFlags::STATE, ChainLink::State),
            (FieldFlags::COUNTRY, ChainLink::Country),
        ],
        Some(ChainLink::City) => &[
            (FieldFlags::STATE, ChainLink::State),
            (FieldFlags::COUNTRY, ChainLink::Country),
        ],
        Some(ChainLink::State) => &[(FieldFlags::COUNTRY, ChainLink::Country)],
        Some(ChainLink::Country) => &[],
    };
    candidates
        .iter()
        .find(|(flag, _)| flags.contains(*flag))
        .map(|&(_, link)| link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordBuilder;

    #[test]
    fn test_flags_for_record() {
        let record = RecordBuilder::new(1)
            .callsign("N0CALL")
            .name("John")
            .country("USA")
            .build();
        let flags = FieldFlags::for_record(&record);
        assert_eq!(flags.bits(), 0x80 | 0x08);
        assert!(flags.contains(FieldFlags::NAME));
        assert!(!flags.contains(FieldFlags::NICKNAME));
        assert!(!flags.contains(FieldFlags::CITY));
    }

    #[test]
    fn test_short_callsign_packed_inline() {
        let flags = FieldFlags::NAME.with(FieldFlags::CITY, true);
        let mut writer = Writer::new();
        write_lead(&mut writer, flags, 6).unwrap();
        assert_eq!(writer.as_bytes(), &[0x80 | 0x20 | 6]);

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(read_lead(&mut reader).unwrap(), (flags, 6));
    }

    #[test]
    fn test_long_and_empty_callsigns_use_length_byte() {
        for len in [0usize, SHORT_CALLSIGN_LEN + 1, 255] {
            let mut writer = Writer::new();
            write_lead(&mut writer, FieldFlags::COUNTRY, len).unwrap();
            assert_eq!(writer.as_bytes(), &[0x08, len as u8], "failed for {}", len);

            let mut reader = Reader::new(writer.as_bytes());
            assert_eq!(read_lead(&mut reader).unwrap(), (FieldFlags::COUNTRY, len));
        }
    }

    #[test]
    fn test_threshold_callsign_is_inline() {
        let mut writer = Writer::new();
        write_lead(&mut writer, FieldFlags::empty(), SHORT_CALLSIGN_LEN).unwrap();
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_callsign_too_long() {
        let mut writer = Writer::new();
        let result = write_lead(&mut writer, FieldFlags::empty(), 256);
        assert!(matches!(result, Err(EncodeError::LengthExceedsLimit { field: "callsign", .. })));
    }

    #[test]
    fn test_chain_skips_absent_links() {
        let all = FieldFlags::CITY
            .with(FieldFlags::STATE, true)
            .with(FieldFlags::COUNTRY, true);
        assert_eq!(next_in_chain(all, None), Some(ChainLink::City));
        assert_eq!(next_in_chain(all, Some(ChainLink::City)), Some(ChainLink::State));
        assert_eq!(next_in_chain(all, Some(ChainLink::State)), Some(ChainLink::Country));
        assert_eq!(next_in_chain(all, Some(ChainLink::Country)), None);

        let city_country = FieldFlags::CITY.with(FieldFlags::COUNTRY, true);
        assert_eq!(next_in_chain(city_country, Some(ChainLink::City)), Some(ChainLink::Country));

        assert_eq!(next_in_chain(FieldFlags::STATE, None), Some(ChainLink::State));
        assert_eq!(next_in_chain(FieldFlags::COUNTRY, None), Some(ChainLink::Country));
        assert_eq!(next_in_chain(FieldFlags::NAME, None), None);
    }

    #[test]
    fn test_pointer_widths() {
        assert_eq!(ChainLink::City.pointer_width(), PointerWidth::Absolute);
        assert_eq!(ChainLink::State.pointer_width(), PointerWidth::Absolute);
        assert_eq!(ChainLink::Country.pointer_width(), PointerWidth::PoolRelative);
    }
}
