use super::*;
use bundle_flags::IS_FRAGMENT;
use dictionary::{Dictionary, lookup};

const CUSTODY_REQUESTED: u64 = 1 << 3;
const SINGLETON: u64 = 1 << 4;
const PRIORITY_SHIFT: u64 = 7;
const PRIORITY_MASK: u64 = 0x3 << PRIORITY_SHIFT;
const CUSTODY_REPORT_REQUESTED: u64 = 1 << 15;

const VERSION_BITS: u64 =
    IS_FRAGMENT | CUSTODY_REQUESTED | SINGLETON | PRIORITY_MASK | CUSTODY_REPORT_REQUESTED;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PrimaryBlock {
    pub flags: BundleFlags,
    pub custody_requested: bool,
    pub singleton: bool,
    pub custody_report_requested: bool,
    pub priority: Priority,
    pub destination: EndpointId,
    pub source: EndpointId,
    pub report_to: EndpointId,
    pub custodian: EndpointId,
    pub timestamp: CreationTimestamp,
    pub lifetime: time::Duration,
    pub fragment_info: Option<FragmentInfo>,
    /// Encode EIDs with CBHE rather than a dictionary
    pub cbhe: bool,
}

impl PrimaryBlock {
    pub fn new(cbhe: bool) -> Self {
        Self {
            cbhe,
            ..Default::default()
        }
    }

    fn flags_bits(&self) -> u64 {
        let mut flags = u64::from(self.flags) & !VERSION_BITS;
        if self.fragment_info.is_some() {
            flags |= IS_FRAGMENT;
        }
        if self.custody_requested {
            flags |= CUSTODY_REQUESTED;
        }
        if self.singleton {
            flags |= SINGLETON;
        }
        if self.custody_report_requested {
            flags |= CUSTODY_REPORT_REQUESTED;
        }
        flags | ((u8::from(self.priority) as u64) << PRIORITY_SHIFT)
    }

    fn eids(&self) -> [&EndpointId; 4] {
        [
            &self.destination,
            &self.source,
            &self.report_to,
            &self.custodian,
        ]
    }

    pub fn emit(&self) -> Result<Vec<u8>, Error> {
        let mut body = Vec::new();
        let dictionary = if self.cbhe {
            for eid in self.eids() {
                let (node, service) = if eid.is_none() {
                    (0, 0)
                } else {
                    eid.ipn_parts()
                        .ok_or_else(|| Error::NotCbheCompatible(eid.clone()))?
                };
                sdnv::emit(node, &mut body);
                sdnv::emit(service, &mut body);
            }
            Vec::new()
        } else {
            let mut dictionary = Dictionary::default();
            for eid in self.eids() {
                let (scheme, ssp) = dictionary.insert_eid(eid);
                sdnv::emit(scheme, &mut body);
                sdnv::emit(ssp, &mut body);
            }
            dictionary.into_bytes()
        };

        sdnv::emit(self.timestamp.creation_time, &mut body);
        sdnv::emit(self.timestamp.sequence_number, &mut body);
        sdnv::emit(lifetime_seconds(self.lifetime), &mut body);
        sdnv::emit(dictionary.len() as u64, &mut body);
        body.extend_from_slice(&dictionary);

        if let Some(fragment_info) = &self.fragment_info {
            sdnv::emit(fragment_info.offset, &mut body);
            sdnv::emit(fragment_info.total_len, &mut body);
        }

        let mut data = vec![6];
        sdnv::emit(self.flags_bits(), &mut data);
        sdnv::emit(body.len() as u64, &mut data);
        data.extend(body);
        Ok(data)
    }

    /// Parse a primary block from the start of `data`, returning the block and its encoded length
    pub fn parse(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut r = sdnv::Reader::new(data);
        let version = r.read_u8().map_field_err("version")?;
        if version != 6 {
            return Err(Error::InvalidVersion(version as u64));
        }

        let flags = r.read().map_field_err("bundle processing control flags")?;
        let block_length = r.read().map_field_err("block length")?;
        let body_start = r.offset();

        let mut offsets = [0u64; 8];
        for o in offsets.iter_mut() {
            *o = r.read().map_field_err("dictionary offset")?;
        }
        let timestamp = CreationTimestamp {
            creation_time: r.read().map_field_err("creation timestamp time")?,
            sequence_number: r.read().map_field_err("creation timestamp sequence number")?,
        };
        let lifetime = r.read().map_field_err("lifetime")?;
        let dictionary_length = r.read().map_field_err("dictionary length")?;
        let dictionary = r
            .read_bytes(dictionary_length)
            .map_field_err("dictionary")?;

        let fragment_info = if flags & IS_FRAGMENT != 0 {
            let offset = r.read().map_field_err("fragment offset")?;
            let total_len = r
                .read()
                .map_field_err("total application data unit length")?;
            if offset >= total_len {
                return Err(Error::InvalidFragmentInfo(offset, total_len));
            }
            Some(FragmentInfo { offset, total_len })
        } else {
            None
        };

        let consumed = (r.offset() - body_start) as u64;
        if consumed != block_length {
            return Err(format!(
                "block length {block_length} does not match content length {consumed}"
            ))
            .map_field_err("block length");
        }

        let cbhe = dictionary.is_empty();
        let eid = |idx: usize, field: &'static str| -> Result<EndpointId, Error> {
            let (scheme, ssp) = (offsets[idx * 2], offsets[idx * 2 + 1]);
            if cbhe {
                Ok(match (scheme, ssp) {
                    (0, 0) => EndpointId::none(),
                    (node, service) => EndpointId::ipn(node, service),
                })
            } else {
                Ok(EndpointId::new(
                    lookup(dictionary, scheme).map_field_err(field)?,
                    lookup(dictionary, ssp).map_field_err(field)?,
                ))
            }
        };
        let destination = eid(0, "destination EID")?;
        let source = eid(1, "source EID")?;
        let report_to = eid(2, "report-to EID")?;
        let custodian = eid(3, "custodian EID")?;

        Ok((
            Self {
                flags: BundleFlags::from(flags & !VERSION_BITS),
                custody_requested: flags & CUSTODY_REQUESTED != 0,
                singleton: flags & SINGLETON != 0,
                custody_report_requested: flags & CUSTODY_REPORT_REQUESTED != 0,
                priority: Priority::from(((flags & PRIORITY_MASK) >> PRIORITY_SHIFT) as u8),
                destination,
                source,
                report_to,
                custodian,
                timestamp,
                lifetime: time::Duration::seconds(i64::try_from(lifetime).unwrap_or(i64::MAX)),
                fragment_info,
                cbhe,
            },
            r.offset(),
        ))
    }
}

/// Lifetime in whole seconds, rounded up: zero on the wire means the bundle never expires
fn lifetime_seconds(lifetime: time::Duration) -> u64 {
    if !lifetime.is_positive() {
        return 0;
    }
    let seconds = u64::try_from(lifetime.whole_seconds()).unwrap_or(u64::MAX);
    if lifetime.subsec_nanoseconds() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds
    }
}
