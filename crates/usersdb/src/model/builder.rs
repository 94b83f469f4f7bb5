//! Builder API for ergonomic record construction.
//!
//! # Example
//!
//! ```rust
//! use usersdb::RecordBuilder;
//!
//! let record = RecordBuilder::new(3112345)
//!     .callsign("VE3XYZ")
//!     .name("Pat Smith")
//!     .country("Canada")
//!     .build();
//!
//! assert_eq!(&*record.callsign, b"VE3XYZ");
//! assert!(record.city.is_empty());
//! ```

use std::borrow::Cow;

use crate::model::UserRecord;

/// Builder for constructing a [`UserRecord`].
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    record: UserRecord<'a>,
}

impl<'a> RecordBuilder<'a> {
    /// Creates a new builder for the given DMR ID with all fields absent.
    pub fn new(id: u32) -> Self {
        Self {
            record: UserRecord::new(id),
        }
    }

    pub fn callsign<S: AsRef<[u8]> + ?Sized>(mut self, callsign: &'a S) -> Self {
        self.record.callsign = Cow::Borrowed(callsign.as_ref());
        self
    }

    pub fn name<S: AsRef<[u8]> + ?Sized>(mut self, name: &'a S) -> Self {
        self.record.name = Cow::Borrowed(name.as_ref());
        self
    }

    pub fn nickname<S: AsRef<[u8]> + ?Sized>(mut self, nickname: &'a S) -> Self {
        self.record.nickname = Cow::Borrowed(nickname.as_ref());
        self
    }

    pub fn city<S: AsRef<[u8]> + ?Sized>(mut self, city: &'a S) -> Self {
        self.record.city = Cow::Borrowed(city.as_ref());
        self
    }

    pub fn state<S: AsRef<[u8]> + ?Sized>(mut self, state: &'a S) -> Self {
        self.record.state = Cow::Borrowed(state.as_ref());
        self
    }

    pub fn country<S: AsRef<[u8]> + ?Sized>(mut self, country: &'a S) -> Self {
        self.record.country = Cow::Borrowed(country.as_ref());
        self
    }

    /// Builds the record.
    pub fn build(self) -> UserRecord<'a> {
        self.record
    }
}
