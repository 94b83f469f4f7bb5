//! Nodes of the indexed database's node pool.
//!
//! The pool is an arena addressed by absolute byte offset. A node is a
//! length-prefixed string followed by zero or more pointer fields; what
//! follows the string is the node's "tail".

use crate::codec::flags::{read_lead, FieldFlags, PointerWidth};
use crate::codec::primitives::Reader;
use crate::error::DecodeError;

/// Handle to a node: its absolute offset from the start of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

impl NodeHandle {
    pub fn offset(self) -> usize {
        self.0 as usize
    }
}

/// A node resolved from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node<'a> {
    /// Presence flags (callsign nodes only; empty otherwise).
    pub flags: FieldFlags,
    /// The node's string.
    pub text: &'a [u8],
    /// Offset of the first byte after the string, where pointers begin.
    pub tail: usize,
}

/// Resolves a plain string node (name, nickname, country, and the string
/// part of city and state nodes).
pub fn resolve_string<'a>(
    data: &'a [u8],
    handle: NodeHandle,
    field: &'static str,
) -> Result<Node<'a>, DecodeError> {
    let mut reader = Reader::at(data, handle.offset(), field)?;
    let text = reader.read_short_bytes(field)?;
    Ok(Node {
        flags: FieldFlags::empty(),
        text,
        tail: reader.position(),
    })
}

/// Resolves a callsign node: lead byte(s), then the callsign.
pub fn resolve_callsign(data: &[u8], handle: NodeHandle) -> Result<Node<'_>, DecodeError> {
    let mut reader = Reader::at(data, handle.offset(), "callsign")?;
    let (flags, len) = read_lead(&mut reader)?;
    let text = reader.read_bytes(len, "callsign")?;
    Ok(Node {
        flags,
        text,
        tail: reader.position(),
    })
}

/// Reads a chain pointer and converts it to an absolute handle.
pub fn read_pointer(
    reader: &mut Reader<'_>,
    width: PointerWidth,
    pool_base: usize,
    field: &'static str,
) -> Result<NodeHandle, DecodeError> {
    let offset = match width {
        PointerWidth::Absolute => reader.read_u24(field)?,
        PointerWidth::PoolRelative => reader.read_u16(field)? + pool_base as u32,
    };
    Ok(NodeHandle(offset))
}
