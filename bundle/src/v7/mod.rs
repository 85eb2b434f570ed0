/*!
BPv7 primary and payload block headers.

Blocks are CBOR arrays. The primary block carries no priority and no
custodian, and CRC values are carried but never computed or checked.
*/

use super::*;

mod block;
mod eid;
mod primary_block;

use eid::{encode_eid, parse_eid};

pub use block::BlockHeader;
pub use primary_block::PrimaryBlock;
