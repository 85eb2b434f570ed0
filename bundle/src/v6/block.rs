use super::*;

const LAST_BLOCK: u64 = 1 << 3;
const FORWARDED_WITHOUT_PROCESSING: u64 = 1 << 5;
const EID_REFERENCES: u64 = 1 << 6;

const VERSION_BITS: u64 = LAST_BLOCK | FORWARDED_WITHOUT_PROCESSING | EID_REFERENCES;

/// A BPv6 canonical block header, the block data follows it directly
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_type: u8,
    pub flags: BlockFlags,
    pub last_block: bool,
    pub forwarded_without_processing: bool,
    pub eid_references: bool,
    pub block_length: u64,
}

impl BlockHeader {
    /// The header of a payload block carrying `len` bytes
    pub fn payload(len: u64) -> Self {
        Self {
            block_type: PAYLOAD_BLOCK_TYPE as u8,
            last_block: true,
            block_length: len,
            ..Default::default()
        }
    }

    fn flags_bits(&self) -> u64 {
        let mut flags = u64::from(self.flags) & !VERSION_BITS;
        if self.last_block {
            flags |= LAST_BLOCK;
        }
        if self.forwarded_without_processing {
            flags |= FORWARDED_WITHOUT_PROCESSING;
        }
        if self.eid_references {
            flags |= EID_REFERENCES;
        }
        flags
    }

    pub fn emit(&self, out: &mut Vec<u8>) {
        out.push(self.block_type);
        sdnv::emit(self.flags_bits(), out);
        if self.eid_references {
            // No EID references are ever generated
            sdnv::emit(0, out);
        }
        sdnv::emit(self.block_length, out);
    }

    /// Parse a block header from the start of `data`, returning the header and its encoded length
    pub fn parse(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut r = sdnv::Reader::new(data);
        let block_type = r.read_u8().map_field_err("block type")?;
        let flags = r.read().map_field_err("block processing control flags")?;
        if flags & EID_REFERENCES != 0 && r.read().map_field_err("EID reference count")? != 0 {
            return Err(Error::NotImplemented("Block EID references"));
        }
        let block_length = r.read().map_field_err("block length")?;
        Ok((
            Self {
                block_type,
                flags: BlockFlags::from(flags & !VERSION_BITS),
                last_block: flags & LAST_BLOCK != 0,
                forwarded_without_processing: flags & FORWARDED_WITHOUT_PROCESSING != 0,
                eid_references: flags & EID_REFERENCES != 0,
                block_length,
            },
            r.offset(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn payload_header() {
        let mut out = Vec::new();
        BlockHeader::payload(300).emit(&mut out);
        assert_eq!(out, hex!("01 08 822C"));

        let (header, len) = BlockHeader::parse(&out).unwrap();
        assert_eq!(len, 4);
        assert_eq!(header, BlockHeader::payload(300));
    }

    #[test]
    fn flags() {
        let (header, len) = BlockHeader::parse(&hex!("01 3B 05")).unwrap();
        assert_eq!(len, 3);
        assert!(header.flags.must_replicate);
        assert!(header.flags.report_on_failure);
        assert!(header.last_block);
        assert!(header.flags.delete_block_on_failure);
        assert!(header.forwarded_without_processing);
        assert!(!header.eid_references);
        assert_eq!(header.block_length, 5);

        let mut out = Vec::new();
        header.emit(&mut out);
        assert_eq!(out, hex!("01 3B 05"));
    }

    #[test]
    fn eid_references() {
        let (header, len) = BlockHeader::parse(&hex!("01 48 00 07")).unwrap();
        assert_eq!(len, 4);
        assert!(header.eid_references);
        assert_eq!(header.block_length, 7);

        let mut out = Vec::new();
        header.emit(&mut out);
        assert_eq!(out, hex!("01 48 00 07"));

        assert!(matches!(
            BlockHeader::parse(&hex!("01 48 01 00 00 07")),
            Err(Error::NotImplemented(_))
        ));
    }
}
