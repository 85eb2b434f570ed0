/*!
BPv6 administrative records used for custody transfer (RFC 5050 §6.1).

Every record starts with a single byte carrying the record type in the high
nibble and record flags in the low nibble, followed by SDNV encoded content.
*/

use super::*;

mod acs;
mod custody_signal;

pub use acs::{AggregateCustodySignal, CustodyTransferEnhancementBlock};
pub use custody_signal::{CustodySignal, CustodySignalReason, SignalFragment};

/// Record type of a custody signal
pub const CUSTODY_SIGNAL: u8 = 0x2;

/// Record type of an aggregate custody signal
pub const AGGREGATE_CUSTODY_SIGNAL: u8 = 0x4;

/// Record flag set when the subject bundle is a fragment
pub const FRAGMENT: u8 = 0x1;

/// The status byte bit recording success
const SUCCEEDED: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRecord {
    CustodySignal(CustodySignal),
    AggregateCustodySignal(AggregateCustodySignal),
}

impl AdminRecord {
    /// The leading record type and flags byte
    pub fn type_flags(&self) -> u8 {
        match self {
            Self::CustodySignal(cs) => {
                let mut b = CUSTODY_SIGNAL << 4;
                if cs.fragment.is_some() {
                    b |= FRAGMENT;
                }
                b
            }
            Self::AggregateCustodySignal(_) => AGGREGATE_CUSTODY_SIGNAL << 4,
        }
    }

    pub fn emit(&self) -> Vec<u8> {
        let mut data = vec![self.type_flags()];
        match self {
            Self::CustodySignal(cs) => cs.emit(&mut data),
            Self::AggregateCustodySignal(acs) => acs.emit(&mut data),
        }
        data
    }

    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let mut r = sdnv::Reader::new(data);
        let type_flags = r.read_u8().map_field_err("record type")?;
        let record = match type_flags >> 4 {
            CUSTODY_SIGNAL => {
                Self::CustodySignal(CustodySignal::parse(&mut r, type_flags & FRAGMENT != 0)?)
            }
            AGGREGATE_CUSTODY_SIGNAL => {
                Self::AggregateCustodySignal(AggregateCustodySignal::parse(&mut r)?)
            }
            _ => return Err(Error::UnknownAdminRecord(type_flags)),
        };
        if !r.remaining().is_empty() {
            return Err(Error::AdditionalData);
        }
        Ok(record)
    }
}
