//! The user record shared by the linear and indexed formats.

use std::borrow::Cow;

/// One user: a DMR ID plus six free-form byte strings.
///
/// Fields are raw bytes, not UTF-8; the databases carry whatever encoding
/// the source list used. An empty field means "absent" and is never stored
/// in the indexed format.
///
/// Records decoded from an indexed database borrow their strings from the
/// database buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct UserRecord<'a> {
    /// DMR ID (0..=0xFFFFFF).
    pub id: u32,
    pub callsign: Cow<'a, [u8]>,
    pub name: Cow<'a, [u8]>,
    pub nickname: Cow<'a, [u8]>,
    pub city: Cow<'a, [u8]>,
    pub state: Cow<'a, [u8]>,
    pub country: Cow<'a, [u8]>,
}

impl<'a> UserRecord<'a> {
    /// Creates a record with the given ID and all fields absent.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Detaches the record from the buffer it was decoded from.
    pub fn into_owned(self) -> UserRecord<'static> {
        UserRecord {
            id: self.id,
            callsign: Cow::Owned(self.callsign.into_owned()),
            name: Cow::Owned(self.name.into_owned()),
            nickname: Cow::Owned(self.nickname.into_owned()),
            city: Cow::Owned(self.city.into_owned()),
            state: Cow::Owned(self.state.into_owned()),
            country: Cow::Owned(self.country.into_owned()),
        }
    }
}
