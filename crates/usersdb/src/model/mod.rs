//! Data model types for the user database.
//!
//! This module contains:
//! - The user record shared by both database formats
//! - A builder for ergonomic record construction

pub mod builder;
pub mod record;

pub use builder::RecordBuilder;
pub use record::UserRecord;
