use super::*;

/// Custody signal reason codes (RFC 5050 §6.1.2)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CustodySignalReason {
    #[default]
    NoAdditionalInformation,
    RedundantReception,
    DepletedStorage,
    DestinationEndpointIdUnintelligible,
    NoKnownRouteToDestination,
    NoTimelyContactWithNextNode,
    BlockUnintelligible,
    Unassigned(u8),
}

impl From<u8> for CustodySignalReason {
    fn from(value: u8) -> Self {
        match value & 0x7F {
            0 => Self::NoAdditionalInformation,
            3 => Self::RedundantReception,
            4 => Self::DepletedStorage,
            5 => Self::DestinationEndpointIdUnintelligible,
            6 => Self::NoKnownRouteToDestination,
            7 => Self::NoTimelyContactWithNextNode,
            8 => Self::BlockUnintelligible,
            v => Self::Unassigned(v),
        }
    }
}

impl From<CustodySignalReason> for u8 {
    fn from(value: CustodySignalReason) -> Self {
        match value {
            CustodySignalReason::NoAdditionalInformation => 0,
            CustodySignalReason::RedundantReception => 3,
            CustodySignalReason::DepletedStorage => 4,
            CustodySignalReason::DestinationEndpointIdUnintelligible => 5,
            CustodySignalReason::NoKnownRouteToDestination => 6,
            CustodySignalReason::NoTimelyContactWithNextNode => 7,
            CustodySignalReason::BlockUnintelligible => 8,
            CustodySignalReason::Unassigned(v) => v & 0x7F,
        }
    }
}

/// The byte range of a fragment a custody signal refers to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SignalFragment {
    pub offset: u64,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodySignal {
    pub succeeded: bool,
    pub reason: CustodySignalReason,
    /// Present iff the subject bundle is a fragment
    pub fragment: Option<SignalFragment>,
    pub time_of_signal: time::Duration,
    pub timestamp: CreationTimestamp,
    pub source: EndpointId,
}

impl CustodySignal {
    /// The acknowledged byte range, the whole ADU of `total_len` bytes when not a fragment
    pub fn range(&self, total_len: u64) -> core::ops::Range<u64> {
        match self.fragment {
            Some(SignalFragment { offset, length }) => offset..offset.saturating_add(length),
            None => 0..total_len,
        }
    }

    pub(super) fn emit(&self, out: &mut Vec<u8>) {
        let status = if self.succeeded { SUCCEEDED } else { 0 };
        out.push(status | u8::from(self.reason));
        if let Some(fragment) = &self.fragment {
            sdnv::emit(fragment.offset, out);
            sdnv::emit(fragment.length, out);
        }
        sdnv::emit(
            u64::try_from(self.time_of_signal.whole_seconds()).unwrap_or(0),
            out,
        );
        sdnv::emit(self.time_of_signal.subsec_nanoseconds().unsigned_abs() as u64, out);
        sdnv::emit(self.timestamp.creation_time, out);
        sdnv::emit(self.timestamp.sequence_number, out);
        let source = self.source.uri().as_bytes();
        sdnv::emit(source.len() as u64, out);
        out.extend_from_slice(source);
    }

    pub(super) fn parse(r: &mut sdnv::Reader, fragment: bool) -> Result<Self, Error> {
        let status = r.read_u8().map_field_err("status")?;
        let fragment = if fragment {
            Some(SignalFragment {
                offset: r.read().map_field_err("fragment offset")?,
                length: r.read().map_field_err("fragment length")?,
            })
        } else {
            None
        };
        let seconds = r.read().map_field_err("time of signal")?;
        let nanoseconds = r.read().map_field_err("time of signal")?;
        if nanoseconds >= 1_000_000_000 {
            return Err(format!("{nanoseconds} nanoseconds out of range"))
                .map_field_err("time of signal");
        }
        let timestamp = CreationTimestamp {
            creation_time: r.read().map_field_err("creation timestamp time")?,
            sequence_number: r.read().map_field_err("creation timestamp sequence number")?,
        };
        let len = r.read().map_field_err("source EID length")?;
        let source = r.read_bytes(len).map_field_err("source EID")?;
        let source = core::str::from_utf8(source).map_field_err("source EID")?;

        Ok(Self {
            succeeded: status & SUCCEEDED != 0,
            reason: CustodySignalReason::from(status),
            fragment,
            time_of_signal: time::Duration::new(
                i64::try_from(seconds).unwrap_or(i64::MAX),
                nanoseconds as i32,
            ),
            timestamp,
            source: EndpointId::parse(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn signal(fragment: Option<SignalFragment>) -> CustodySignal {
        CustodySignal {
            succeeded: true,
            reason: CustodySignalReason::NoAdditionalInformation,
            fragment,
            time_of_signal: time::Duration::new(12, 500_000_000),
            timestamp: CreationTimestamp {
                creation_time: 10,
                sequence_number: 1,
            },
            source: EndpointId::parse("dtn://a"),
        }
    }

    #[test]
    fn whole_bundle() {
        let record = AdminRecord::CustodySignal(signal(None));
        let data = record.emit();
        assert_eq!(
            data,
            hex!(
                "20"          // custody signal, not a fragment
                "80"          // succeeded
                "0c 81EEB5CA00"  // time of signal
                "0a 01"         // creation timestamp
                "07 64746e3a2f2f61"
            )
        );
        assert_eq!(AdminRecord::parse(&data).unwrap(), record);
    }

    #[test]
    fn fragment() {
        let record = AdminRecord::CustodySignal(signal(Some(SignalFragment {
            offset: 200,
            length: 200,
        })));
        let data = record.emit();
        assert_eq!(data[0], 0x21);
        assert_eq!(&data[1..6], hex!("80 8148 8148"));

        let AdminRecord::CustodySignal(cs) = AdminRecord::parse(&data).unwrap() else {
            panic!("Not a custody signal");
        };
        assert_eq!(cs.range(500), 200..400);
        assert_eq!(signal(None).range(500), 0..500);
    }

    #[test]
    fn failure_reason() {
        let mut cs = signal(None);
        cs.succeeded = false;
        cs.reason = CustodySignalReason::DepletedStorage;
        let data = AdminRecord::CustodySignal(cs.clone()).emit();
        assert_eq!(data[1], 0x04);
        assert_eq!(
            AdminRecord::parse(&data).unwrap(),
            AdminRecord::CustodySignal(cs)
        );
    }

    #[test]
    fn truncated() {
        let data = AdminRecord::CustodySignal(signal(None)).emit();
        for len in 1..data.len() {
            assert!(AdminRecord::parse(&data[..len]).is_err());
        }
    }
}
