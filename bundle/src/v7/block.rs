use super::*;

/// The block number of the payload block is always 1
const PAYLOAD_BLOCK_NUMBER: u64 = 1;

/// A BPv7 canonical block header.
///
/// The block data is carried inside the canonical block array as a byte
/// string, so [`emit`](Self::emit) and [`parse_fields`](Self::parse_fields)
/// handle the header and data together.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_type: u64,
    pub flags: BlockFlags,
    pub block_length: u64,
    crc_type: CrcType,
    crc_value: Option<Vec<u8>>,
}

impl BlockHeader {
    /// The header of a payload block carrying `len` bytes
    pub fn payload(len: u64) -> Self {
        Self {
            block_type: PAYLOAD_BLOCK_TYPE,
            block_length: len,
            ..Default::default()
        }
    }

    pub fn block_number(&self) -> u64 {
        PAYLOAD_BLOCK_NUMBER
    }

    pub fn set_block_number(&mut self, _number: u64) -> Result<(), Error> {
        // TODO: support extension blocks, which need distinct block numbers
        Err(Error::NotImplemented("BPv7 block numbering"))
    }

    pub fn crc_type(&self) -> CrcType {
        self.crc_type
    }

    pub fn set_crc_type(&mut self, crc_type: CrcType) -> Result<(), Error> {
        match crc_type {
            CrcType::None => {
                self.crc_type = CrcType::None;
                self.crc_value = None;
                Ok(())
            }
            _ => Err(Error::NotImplemented("BPv7 block CRC")),
        }
    }

    pub fn crc(&self) -> Result<u32, Error> {
        // TODO: compute CRC-16/X.25 and CRC-32C over the encoded block
        Err(Error::NotImplemented("BPv7 block CRC"))
    }

    pub fn set_crc(&mut self, _crc: u32) -> Result<(), Error> {
        Err(Error::NotImplemented("BPv7 block CRC"))
    }

    /// Emit the canonical block array carrying `data`
    pub fn emit(&self, data: &[u8]) -> Vec<u8> {
        let has_crc = self.crc_type != CrcType::None;
        cbor::encode::emit_array(Some(if has_crc { 6 } else { 5 }), |a| {
            a.emit(&self.block_type);
            a.emit(&self.block_number());
            a.emit(&u64::from(self.flags));
            a.emit(&u64::from(self.crc_type));
            a.emit_bytes(data);
            if has_crc {
                // A received CRC is passed on untouched
                let crc = match (&self.crc_value, self.crc_type) {
                    (Some(crc), _) => crc.clone(),
                    (None, CrcType::CRC16_X25) => vec![0; 2],
                    (None, CrcType::CRC32_CASTAGNOLI) => vec![0; 4],
                    (None, _) => Vec::new(),
                };
                a.emit_bytes(&crc);
            }
        })
    }

    /// Parse the fields of a canonical block array, returning the header and the block data
    pub fn parse_fields<'a>(
        block: &mut cbor::decode::Array<'a>,
    ) -> Result<(Self, &'a [u8]), Error> {
        let block_type = block.parse::<u64>().map_field_err("block type code")?;
        block.parse::<u64>().map_field_err("block number")?;
        let flags = block
            .parse::<u64>()
            .map_field_err("block processing control flags")?;
        let crc_type = CrcType::from(block.parse::<u64>().map_field_err("CRC type")?);
        let data = block
            .parse_value(|value| match value {
                cbor::decode::Value::Bytes(data) => Ok(data),
                _ => Err(cbor::decode::Error::IncorrectType),
            })
            .map_field_err("block-type-specific data")?;
        let crc_value = if crc_type != CrcType::None {
            Some(block.parse::<Vec<u8>>().map_field_err("CRC value")?)
        } else {
            None
        };
        Ok((
            Self {
                block_type,
                flags: BlockFlags::from(flags),
                block_length: data.len() as u64,
                crc_type,
                crc_value,
            },
            data,
        ))
    }

    /// Parse a canonical block from the start of `data`, returning the header, the block data and the encoded length
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8], usize), Error> {
        cbor::decode::parse_array(data, Self::parse_fields)
            .map(|((header, block_data), len)| (header, block_data, len))
    }
}
