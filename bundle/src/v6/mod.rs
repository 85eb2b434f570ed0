/*!
BPv6 (RFC 5050) primary and payload block headers.

Integers are SDNV encoded. Endpoint IDs are either referenced by offset into
a dictionary of NUL terminated strings, or with Compressed Bundle Header
Encoding (RFC 6260) carried directly as `ipn` node/service numbers with an
empty dictionary.
*/

use super::*;

mod block;
mod dictionary;
mod primary_block;

pub use block::BlockHeader;
pub use primary_block::PrimaryBlock;

/// Bundle priority, carried in processing flag bits 7 and 8
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    #[default]
    Bulk = 0,
    Normal = 1,
    Expedited = 2,
    Unused = 3,
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        match value & 0x3 {
            0 => Self::Bulk,
            1 => Self::Normal,
            2 => Self::Expedited,
            _ => Self::Unused,
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value as u8
    }
}
