/*!
The error type shared by the BPv6 and BPv7 codecs and the administrative
record parsers.
*/

use super::*;
use thiserror::Error;

/// The primary error type for the `dtnbp-bundle` crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The input ended before a complete field could be read.
    #[error("Not enough data for encoded value")]
    NotEnoughData,

    /// An SDNV encodes a value larger than 64 bits.
    #[error("SDNV value exceeds 64 bits")]
    SdnvOverflow,

    /// The bundle protocol version is not 6 or 7.
    #[error("Unsupported bundle protocol version {0}")]
    InvalidVersion(u64),

    /// A BPv6 dictionary offset does not reference a NUL terminated string.
    #[error("Invalid dictionary offset {0}")]
    InvalidDictionaryOffset(u64),

    /// An EID cannot be represented with Compressed Bundle Header Encoding.
    #[error("Endpoint ID {0} cannot be CBHE encoded")]
    NotCbheCompatible(EndpointId),

    /// A BPv7 EID uses a URI scheme code other than `dtn` or `ipn`.
    #[error("Unsupported EID scheme {0}")]
    UnsupportedScheme(u64),

    /// An EID is malformed for its scheme.
    #[error("Invalid endpoint ID {0}")]
    InvalidEid(String),

    /// The block following the primary block is not a payload block.
    #[error("Expected a payload block, found block type {0}")]
    UnexpectedBlockType(u64),

    /// The fragment offset lies beyond the total application data unit length.
    #[error("Invalid fragment information: offset {0}, total length {1}")]
    InvalidFragmentInfo(u64, u64),

    /// There is data following the end of the bundle.
    #[error("Bundle has additional data after the payload block")]
    AdditionalData,

    /// An administrative record carries an unknown record type.
    #[error("Unknown administrative record type {0}")]
    UnknownAdminRecord(u8),

    /// The operation is not supported by this implementation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// An error related to CBOR decoding.
    #[error(transparent)]
    InvalidCBOR(#[from] cbor::decode::Error),

    /// A generic error for when parsing a specific field fails.
    #[error("Failed to parse {field}: {source}")]
    InvalidField {
        /// The name of the field that failed to parse.
        field: &'static str,
        /// The underlying error that caused the failure.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A trait for mapping errors to a `Error::InvalidField`.
pub trait CaptureFieldErr<T> {
    /// Maps the error to a `Error::InvalidField` with the given field name.
    fn map_field_err(self, field: &'static str) -> Result<T, Error>;
}

impl<T, E: Into<Box<dyn std::error::Error + Send + Sync>>> CaptureFieldErr<T>
    for std::result::Result<T, E>
{
    fn map_field_err(self, field: &'static str) -> Result<T, Error> {
        self.map_err(|e| Error::InvalidField {
            field,
            source: e.into(),
        })
    }
}
