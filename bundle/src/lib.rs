/*!
Wire formats for the Bundle Protocol.

Both BPv6 (RFC 5050, SDNV fields with a string dictionary or CBHE) and BPv7
(CBOR arrays) primary and payload block headers are supported, wrapped in a
version tagged [`Bundle`]. Administrative records used for custody transfer
live in [`admin_record`].
*/

use dtnbp_cbor as cbor;

mod block_flags;
mod bundle;
mod bundle_flags;
mod bundle_id;
mod crc;
mod eid;
mod error;

pub mod admin_record;
pub mod sdnv;
pub mod v6;
pub mod v7;

pub use block_flags::BlockFlags;
pub use bundle::{Bundle, BundleVersion, PAYLOAD_BLOCK_TYPE, Version};
pub use bundle_flags::BundleFlags;
pub use bundle_id::{CreationTimestamp, FragmentInfo};
pub use crc::CrcType;
pub use eid::EndpointId;
pub use error::{CaptureFieldErr, Error};
