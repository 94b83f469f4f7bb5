//! Binary encoding/decoding for the indexed database format.
//!
//! - [`primitives`]: bounds-checked reader and writer
//! - [`flags`]: presence flags, callsign lead byte, pointer chain policy
//! - [`node`]: node handles and resolvers
//! - [`encode`]: the deduplicating encoder
//! - [`decode`]: binary-search lookup and record resolution

pub mod decode;
pub mod encode;
pub mod flags;
pub mod node;
pub mod primitives;

pub use decode::{decode_database, find_user, IndexedDb, Records};
pub use encode::{encode_database, EncodeStats, Encoder, InternTable};
pub use flags::{ChainLink, FieldFlags, PointerWidth};
pub use node::{Node, NodeHandle};
pub use primitives::{Reader, Writer};
