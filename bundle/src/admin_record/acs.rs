use super::*;
use core::ops::Range;

/// Aggregate custody signal, acknowledging runs of custody IDs.
///
/// Each fill is encoded as its start and length. The first start is
/// absolute and later starts are the gap since the end of the previous fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCustodySignal {
    pub succeeded: bool,
    pub reason: CustodySignalReason,
    /// Ascending, non-overlapping custody ID ranges
    pub fills: Vec<Range<u64>>,
}

impl AggregateCustodySignal {
    pub(super) fn emit(&self, out: &mut Vec<u8>) {
        let status = if self.succeeded { SUCCEEDED } else { 0 };
        out.push(status | u8::from(self.reason));
        let mut prev_end = 0;
        for fill in &self.fills {
            sdnv::emit(fill.start.saturating_sub(prev_end), out);
            sdnv::emit(fill.end.saturating_sub(fill.start), out);
            prev_end = fill.end;
        }
    }

    pub(super) fn parse(r: &mut sdnv::Reader) -> Result<Self, Error> {
        let status = r.read_u8().map_field_err("status")?;
        let mut fills = Vec::new();
        let mut prev_end = 0u64;
        while !r.remaining().is_empty() {
            let start = r
                .read()
                .map_field_err("fill start")?
                .checked_add(prev_end)
                .ok_or(Error::SdnvOverflow)?;
            let end = start
                .checked_add(r.read().map_field_err("fill length")?)
                .ok_or(Error::SdnvOverflow)?;
            fills.push(start..end);
            prev_end = end;
        }
        Ok(Self {
            succeeded: status & SUCCEEDED != 0,
            reason: CustodySignalReason::from(status),
            fills,
        })
    }
}

/// Content of the custody transfer enhancement block carried alongside custody bundles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodyTransferEnhancementBlock {
    pub custody_id: u64,
    pub creator: EndpointId,
}

impl CustodyTransferEnhancementBlock {
    pub const BLOCK_TYPE: u8 = 0x0A;

    /// Emit the complete BPv6 extension block
    pub fn emit(&self, out: &mut Vec<u8>) {
        let mut content = Vec::new();
        sdnv::emit(self.custody_id, &mut content);
        content.extend_from_slice(self.creator.uri().as_bytes());

        v6::BlockHeader {
            block_type: Self::BLOCK_TYPE,
            flags: BlockFlags {
                must_replicate: true,
                ..Default::default()
            },
            block_length: content.len() as u64,
            ..Default::default()
        }
        .emit(out);
        out.extend(content);
    }

    /// Parse a complete BPv6 extension block, returning the block and its encoded length
    pub fn parse(data: &[u8]) -> Result<(Self, usize), Error> {
        let (header, header_len) = v6::BlockHeader::parse(data)?;
        if header.block_type != Self::BLOCK_TYPE {
            return Err(Error::UnexpectedBlockType(header.block_type as u64));
        }
        let mut r = sdnv::Reader::new(&data[header_len..]);
        let content = r.read_bytes(header.block_length).map_field_err("block content")?;

        let mut r = sdnv::Reader::new(content);
        let custody_id = r.read().map_field_err("custody ID")?;
        let creator = core::str::from_utf8(r.remaining()).map_field_err("creator EID")?;
        Ok((
            Self {
                custody_id,
                creator: EndpointId::parse(creator),
            },
            header_len + content.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn aggregate_fills() {
        let record = AdminRecord::AggregateCustodySignal(AggregateCustodySignal {
            succeeded: true,
            reason: CustodySignalReason::NoAdditionalInformation,
            fills: vec![5..8, 10..11, 200..300],
        });
        let data = record.emit();
        assert_eq!(data, hex!("40 80 05 03 02 01 813D 64"));
        assert_eq!(AdminRecord::parse(&data).unwrap(), record);

        let empty = AdminRecord::AggregateCustodySignal(AggregateCustodySignal {
            succeeded: false,
            reason: CustodySignalReason::RedundantReception,
            fills: Vec::new(),
        });
        assert_eq!(empty.emit(), hex!("40 03"));
        assert_eq!(AdminRecord::parse(&hex!("40 03")).unwrap(), empty);

        // A fill start without a length
        assert!(AdminRecord::parse(&hex!("40 80 05")).is_err());
    }

    #[test]
    fn enhancement_block() {
        let cteb = CustodyTransferEnhancementBlock {
            custody_id: 300,
            creator: EndpointId::parse("ipn:1.0"),
        };
        let mut data = Vec::new();
        cteb.emit(&mut data);
        assert_eq!(data, hex!("0A 01 09 822C 69706e3a312e30"));

        data.extend_from_slice(b"trailing");
        let (parsed, len) = CustodyTransferEnhancementBlock::parse(&data).unwrap();
        assert_eq!(len, 12);
        assert_eq!(parsed, cteb);

        assert!(matches!(
            CustodyTransferEnhancementBlock::parse(&hex!("01 08 00")),
            Err(Error::UnexpectedBlockType(1))
        ));
    }
}
