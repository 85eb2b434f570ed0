/*!
The version tagged bundle: one primary block, one payload block header and
the application data unit.
*/

use super::*;
use bytes::Bytes;

/// Block type code of the payload block in both protocol versions
pub const PAYLOAD_BLOCK_TYPE: u64 = 1;

/// Bundle protocol version
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Version {
    #[default]
    V6,
    V7,
}

/// Headers of a bundle, always of matching versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleVersion {
    V6(v6::PrimaryBlock, v6::BlockHeader),
    V7(v7::PrimaryBlock, v7::BlockHeader),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub headers: BundleVersion,
    pub adu: Bytes,
}

impl Bundle {
    pub fn new_v6(primary: v6::PrimaryBlock, adu: Bytes) -> Self {
        Self {
            headers: BundleVersion::V6(primary, v6::BlockHeader::payload(adu.len() as u64)),
            adu,
        }
    }

    pub fn new_v7(primary: v7::PrimaryBlock, adu: Bytes) -> Self {
        Self {
            headers: BundleVersion::V7(primary, v7::BlockHeader::payload(adu.len() as u64)),
            adu,
        }
    }

    pub fn version(&self) -> Version {
        match &self.headers {
            BundleVersion::V6(..) => Version::V6,
            BundleVersion::V7(..) => Version::V7,
        }
    }

    pub fn flags(&self) -> &BundleFlags {
        match &self.headers {
            BundleVersion::V6(p, _) => &p.flags,
            BundleVersion::V7(p, _) => &p.flags,
        }
    }

    pub fn source(&self) -> &EndpointId {
        match &self.headers {
            BundleVersion::V6(p, _) => &p.source,
            BundleVersion::V7(p, _) => &p.source,
        }
    }

    pub fn destination(&self) -> &EndpointId {
        match &self.headers {
            BundleVersion::V6(p, _) => &p.destination,
            BundleVersion::V7(p, _) => &p.destination,
        }
    }

    pub fn report_to(&self) -> &EndpointId {
        match &self.headers {
            BundleVersion::V6(p, _) => &p.report_to,
            BundleVersion::V7(p, _) => &p.report_to,
        }
    }

    /// The current custodian, BPv7 bundles have none
    pub fn custodian(&self) -> Option<&EndpointId> {
        match &self.headers {
            BundleVersion::V6(p, _) => Some(&p.custodian),
            BundleVersion::V7(..) => None,
        }
    }

    pub fn set_custodian(&mut self, custodian: EndpointId) -> Result<(), Error> {
        match &mut self.headers {
            BundleVersion::V6(p, _) => {
                p.custodian = custodian;
                Ok(())
            }
            BundleVersion::V7(..) => Err(Error::NotImplemented("BPv7 custody transfer")),
        }
    }

    pub fn custody_requested(&self) -> bool {
        match &self.headers {
            BundleVersion::V6(p, _) => p.custody_requested,
            BundleVersion::V7(..) => false,
        }
    }

    pub fn timestamp(&self) -> &CreationTimestamp {
        match &self.headers {
            BundleVersion::V6(p, _) => &p.timestamp,
            BundleVersion::V7(p, _) => &p.timestamp,
        }
    }

    /// Zero means the bundle never expires
    pub fn lifetime(&self) -> time::Duration {
        match &self.headers {
            BundleVersion::V6(p, _) => p.lifetime,
            BundleVersion::V7(p, _) => p.lifetime,
        }
    }

    /// BPv6 priority, always 0 for BPv7
    pub fn priority(&self) -> u8 {
        match &self.headers {
            BundleVersion::V6(p, _) => p.priority.into(),
            BundleVersion::V7(..) => 0,
        }
    }

    pub fn fragment_info(&self) -> Option<FragmentInfo> {
        match &self.headers {
            BundleVersion::V6(p, _) => p.fragment_info,
            BundleVersion::V7(p, _) => p.fragment_info,
        }
    }

    pub fn set_fragment_info(&mut self, fragment_info: Option<FragmentInfo>) {
        match &mut self.headers {
            BundleVersion::V6(p, _) => p.fragment_info = fragment_info,
            BundleVersion::V7(p, _) => p.fragment_info = fragment_info,
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment_info().is_some()
    }

    /// Offset of this bundle's ADU within the original ADU
    pub fn fragment_offset(&self) -> u64 {
        self.fragment_info().map_or(0, |f| f.offset)
    }

    /// Length of the original ADU
    pub fn total_adu_length(&self) -> u64 {
        self.fragment_info()
            .map_or(self.adu.len() as u64, |f| f.total_len)
    }

    pub fn is_admin_record(&self) -> bool {
        self.flags().is_admin_record
    }

    /// Replace the ADU, keeping the payload block length in step
    pub fn set_adu(&mut self, adu: Bytes) {
        let len = adu.len() as u64;
        match &mut self.headers {
            BundleVersion::V6(_, b) => b.block_length = len,
            BundleVersion::V7(_, b) => b.block_length = len,
        }
        self.adu = adu;
    }

    /// Build the fragment carrying `len` bytes of this bundle's ADU from `offset`.
    ///
    /// `offset` is relative to this bundle's ADU, the fragment records its
    /// offset within the original ADU.
    pub fn segment(&self, offset: u64, len: u64) -> Bundle {
        let start = (offset as usize).min(self.adu.len());
        let end = start.saturating_add(len as usize).min(self.adu.len());
        let mut fragment = self.clone();
        fragment.set_fragment_info(Some(FragmentInfo {
            offset: self.fragment_offset() + start as u64,
            total_len: self.total_adu_length(),
        }));
        fragment.set_adu(self.adu.slice(start..end));
        fragment
    }

    pub fn emit(&self) -> Result<Vec<u8>, Error> {
        match &self.headers {
            BundleVersion::V6(primary, block) => {
                let mut data = primary.emit()?;
                block.emit(&mut data);
                data.extend_from_slice(&self.adu);
                Ok(data)
            }
            BundleVersion::V7(primary, block) => {
                let primary = primary.emit()?;
                Ok(cbor::encode::emit_array(None, |a| {
                    a.emit_raw_slice(&primary);
                    a.emit_raw_slice(&block.emit(&self.adu));
                }))
            }
        }
    }

    /// Parse a complete bundle of either version, selected by the first byte
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        match data.first() {
            None => Err(Error::NotEnoughData),
            Some(6) => parse_v6(data),
            Some(b) if b >> 5 == 4 => parse_v7(data),
            Some(b) => Err(Error::InvalidVersion(*b as u64)),
        }
    }
}

fn parse_v6(data: &[u8]) -> Result<Bundle, Error> {
    let (primary, primary_len) = v6::PrimaryBlock::parse(data)?;
    let (block, block_len) =
        v6::BlockHeader::parse(&data[primary_len..]).map_field_err("payload block")?;
    if block.block_type as u64 != PAYLOAD_BLOCK_TYPE {
        return Err(Error::UnexpectedBlockType(block.block_type as u64));
    }
    let mut r = sdnv::Reader::new(&data[primary_len + block_len..]);
    let adu = r.read_bytes(block.block_length).map_field_err("payload")?;
    if !r.remaining().is_empty() {
        return Err(Error::AdditionalData);
    }
    check_fragment(primary.fragment_info, adu.len())?;
    Ok(Bundle {
        headers: BundleVersion::V6(primary, block),
        adu: Bytes::copy_from_slice(adu),
    })
}

fn parse_v7(data: &[u8]) -> Result<Bundle, Error> {
    let (bundle, len) = cbor::decode::parse_array(data, |a| {
        let primary = a
            .parse_array(v7::PrimaryBlock::parse_fields)
            .map_field_err("primary block")?;
        let (block, adu) = a
            .parse_array(v7::BlockHeader::parse_fields)
            .map_field_err("payload block")?;
        if block.block_type != PAYLOAD_BLOCK_TYPE {
            return Err(Error::UnexpectedBlockType(block.block_type));
        }
        check_fragment(primary.fragment_info, adu.len())?;
        Ok(Bundle {
            headers: BundleVersion::V7(primary, block),
            adu: Bytes::copy_from_slice(adu),
        })
    })?;
    if len != data.len() {
        return Err(Error::AdditionalData);
    }
    Ok(bundle)
}

fn check_fragment(fragment_info: Option<FragmentInfo>, len: usize) -> Result<(), Error> {
    match fragment_info {
        Some(FragmentInfo { offset, total_len })
            if offset.saturating_add(len as u64) > total_len =>
        {
            Err(Error::InvalidFragmentInfo(offset, total_len))
        }
        _ => Ok(()),
    }
}

impl std::fmt::Display for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timestamp = self.timestamp();
        write!(
            f,
            "{}/{}.{}",
            self.source(),
            timestamp.creation_time,
            timestamp.sequence_number
        )?;
        if let Some(fragment_info) = self.fragment_info() {
            write!(f, "+{}", fragment_info.offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn v6_bundle(cbhe: bool, adu: &'static [u8]) -> Bundle {
        Bundle::new_v6(
            v6::PrimaryBlock {
                custody_requested: true,
                priority: v6::Priority::Normal,
                source: EndpointId::ipn(1, 1),
                destination: EndpointId::ipn(2, 1),
                custodian: EndpointId::ipn(1, 1),
                timestamp: CreationTimestamp {
                    creation_time: 10,
                    sequence_number: 1,
                },
                lifetime: time::Duration::seconds(60),
                ..v6::PrimaryBlock::new(cbhe)
            },
            Bytes::from_static(adu),
        )
    }

    fn v7_bundle(adu: &'static [u8]) -> Bundle {
        Bundle::new_v7(
            v7::PrimaryBlock {
                source: EndpointId::parse("dtn://a/"),
                destination: EndpointId::parse("dtn://b/"),
                timestamp: CreationTimestamp {
                    creation_time: 10,
                    sequence_number: 1,
                },
                lifetime: time::Duration::seconds(60),
                ..Default::default()
            },
            Bytes::from_static(adu),
        )
    }

    #[test]
    fn v6_round_trip() {
        for cbhe in [false, true] {
            let bundle = v6_bundle(cbhe, b"hello world");
            let data = bundle.emit().unwrap();
            assert!(data.ends_with(b"\x01\x08\x0bhello world"));
            assert_eq!(Bundle::parse(&data).unwrap(), bundle);
        }
    }

    #[test]
    fn v7_round_trip() {
        let bundle = v7_bundle(b"hello");
        let data = bundle.emit().unwrap();
        assert_eq!(data[0], 0x9F);
        assert!(data.ends_with(&hex!("85 01 01 00 00 45 68656c6c6f ff")));
        let parsed = Bundle::parse(&data).unwrap();
        assert_eq!(parsed, bundle);
        assert_eq!(parsed.version(), Version::V7);
        assert_eq!(parsed.priority(), 0);
        assert_eq!(parsed.custodian(), None);
    }

    #[test]
    fn accessors() {
        let mut bundle = v6_bundle(false, b"data");
        assert_eq!(bundle.version(), Version::V6);
        assert_eq!(bundle.priority(), 1);
        assert!(bundle.custody_requested());
        assert!(!bundle.is_fragment());
        assert_eq!(bundle.total_adu_length(), 4);

        bundle.set_custodian(EndpointId::ipn(9, 9)).unwrap();
        assert_eq!(bundle.custodian(), Some(&EndpointId::ipn(9, 9)));

        let mut bundle = v7_bundle(b"");
        assert!(matches!(
            bundle.set_custodian(EndpointId::ipn(9, 9)),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn segments() {
        let bundle = v6_bundle(false, b"0123456789");
        let first = bundle.segment(0, 4);
        let last = bundle.segment(8, 4);
        assert_eq!(&first.adu[..], b"0123");
        assert_eq!(
            first.fragment_info(),
            Some(FragmentInfo {
                offset: 0,
                total_len: 10
            })
        );
        assert_eq!(&last.adu[..], b"89");
        assert_eq!(last.fragment_offset(), 8);

        // Re-fragmenting keeps offsets within the original ADU
        let inner = bundle.segment(4, 4).segment(2, 2);
        assert_eq!(&inner.adu[..], b"67");
        assert_eq!(
            inner.fragment_info(),
            Some(FragmentInfo {
                offset: 6,
                total_len: 10
            })
        );

        let data = inner.emit().unwrap();
        assert_eq!(Bundle::parse(&data).unwrap(), inner);
    }

    #[test]
    fn bad_input() {
        let mut data = v6_bundle(true, b"abc").emit().unwrap();
        data.push(0);
        assert!(matches!(Bundle::parse(&data), Err(Error::AdditionalData)));
        data.truncate(data.len() - 2);
        assert!(Bundle::parse(&data).is_err());

        let mut data = v7_bundle(b"abc").emit().unwrap();
        data.push(0);
        assert!(matches!(Bundle::parse(&data), Err(Error::AdditionalData)));

        assert!(matches!(
            Bundle::parse(&[5, 0]),
            Err(Error::InvalidVersion(5))
        ));
        assert!(matches!(Bundle::parse(&[]), Err(Error::NotEnoughData)));

        // Fragment extends past the end of the original ADU
        let mut bundle = v6_bundle(true, b"abcdef");
        bundle.set_fragment_info(Some(FragmentInfo {
            offset: 2,
            total_len: 6,
        }));
        assert!(matches!(
            Bundle::parse(&bundle.emit().unwrap()),
            Err(Error::InvalidFragmentInfo(2, 6))
        ));
    }
}
