use super::*;
use bundle_flags::IS_FRAGMENT;

const STATUS_TIME_REQUESTED: u64 = 1 << 6;

const VERSION_BITS: u64 = IS_FRAGMENT | STATUS_TIME_REQUESTED;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PrimaryBlock {
    pub flags: BundleFlags,
    pub status_time_requested: bool,
    pub destination: EndpointId,
    pub source: EndpointId,
    pub report_to: EndpointId,
    pub timestamp: CreationTimestamp,
    /// Carried on the wire in milliseconds
    pub lifetime: time::Duration,
    pub fragment_info: Option<FragmentInfo>,
}

impl PrimaryBlock {
    fn flags_bits(&self) -> u64 {
        let mut flags = u64::from(self.flags) & !VERSION_BITS;
        if self.fragment_info.is_some() {
            flags |= IS_FRAGMENT;
        }
        if self.status_time_requested {
            flags |= STATUS_TIME_REQUESTED;
        }
        flags
    }

    pub fn emit(&self) -> Result<Vec<u8>, Error> {
        let destination = encode_eid(&self.destination).map_field_err("destination EID")?;
        let source = encode_eid(&self.source).map_field_err("source EID")?;
        let report_to = encode_eid(&self.report_to).map_field_err("report-to EID")?;

        Ok(cbor::encode::emit_array(
            Some(if self.fragment_info.is_some() { 10 } else { 8 }),
            |a| {
                a.emit(&7u64);
                a.emit(&self.flags_bits());
                a.emit(&u64::from(CrcType::None));
                a.emit(&destination);
                a.emit(&source);
                a.emit(&report_to);
                a.emit_array(Some(2), |a| {
                    a.emit(&self.timestamp.creation_time);
                    a.emit(&self.timestamp.sequence_number);
                });
                a.emit(&u64::try_from(self.lifetime.whole_milliseconds()).unwrap_or(0));
                if let Some(fragment_info) = &self.fragment_info {
                    a.emit(&fragment_info.offset);
                    a.emit(&fragment_info.total_len);
                }
            },
        ))
    }

    /// Parse a primary block from the start of `data`, returning the block and its encoded length
    pub fn parse(data: &[u8]) -> Result<(Self, usize), Error> {
        cbor::decode::parse_array(data, Self::parse_fields)
    }

    /// Parse the fields of a primary block array
    pub fn parse_fields(block: &mut cbor::decode::Array) -> Result<Self, Error> {
        let version = block.parse::<u64>().map_field_err("version")?;
        if version != 7 {
            return Err(Error::InvalidVersion(version));
        }

        let flags = block
            .parse::<u64>()
            .map_field_err("bundle processing control flags")?;
        let crc_type = CrcType::from(block.parse::<u64>().map_field_err("CRC type")?);

        let destination = parse_eid(block).map_field_err("destination EID")?;
        let source = parse_eid(block).map_field_err("source EID")?;
        let report_to = parse_eid(block).map_field_err("report-to EID")?;

        let timestamp = block
            .parse_array(|t| {
                Ok::<_, Error>(CreationTimestamp {
                    creation_time: t.parse()?,
                    sequence_number: t.parse()?,
                })
            })
            .map_field_err("creation timestamp")?;
        let lifetime = block.parse::<u64>().map_field_err("lifetime")?;

        let fragment_info = if flags & IS_FRAGMENT != 0 {
            let offset = block.parse().map_field_err("fragment offset")?;
            let total_len = block
                .parse()
                .map_field_err("total application data unit length")?;
            if offset >= total_len {
                return Err(Error::InvalidFragmentInfo(offset, total_len));
            }
            Some(FragmentInfo { offset, total_len })
        } else {
            None
        };

        // CRC values are not checked
        if crc_type != CrcType::None {
            block.skip_value().map_field_err("CRC value")?;
        }

        Ok(Self {
            flags: BundleFlags::from(flags & !VERSION_BITS),
            status_time_requested: flags & STATUS_TIME_REQUESTED != 0,
            destination,
            source,
            report_to,
            timestamp,
            lifetime: time::Duration::milliseconds(i64::try_from(lifetime).unwrap_or(i64::MAX)),
            fragment_info,
        })
    }
}
