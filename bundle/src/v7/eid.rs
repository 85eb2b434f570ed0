use super::*;

const DTN_SCHEME: u64 = 1;
const IPN_SCHEME: u64 = 2;

/// An EID checked for BPv7 encodability
pub(super) enum EncodedEid<'a> {
    None,
    Dtn(&'a str),
    Ipn(u64, u64),
}

impl cbor::encode::ToCbor for EncodedEid<'_> {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        encoder.emit_array(Some(2), |a| match self {
            Self::None => {
                a.emit(&DTN_SCHEME);
                a.emit(&0u64);
            }
            Self::Dtn(ssp) => {
                a.emit(&DTN_SCHEME);
                a.emit_bytes(ssp.as_bytes());
            }
            Self::Ipn(node, service) => {
                a.emit(&IPN_SCHEME);
                a.emit_array(Some(2), |a| {
                    a.emit(node);
                    a.emit(service);
                });
            }
        })
    }
}

pub(super) fn encode_eid(eid: &EndpointId) -> Result<EncodedEid<'_>, Error> {
    if eid.is_none() {
        return Ok(EncodedEid::None);
    }
    match eid.scheme() {
        "dtn" => Ok(EncodedEid::Dtn(eid.ssp())),
        "ipn" => eid
            .ipn_parts()
            .map(|(node, service)| EncodedEid::Ipn(node, service))
            .ok_or_else(|| Error::InvalidEid(eid.to_string())),
        _ => Err(Error::InvalidEid(eid.to_string())),
    }
}

/// Parse the next item of `a` as an EID
pub(super) fn parse_eid(a: &mut cbor::decode::Array) -> Result<EndpointId, Error> {
    a.parse_array(|a| {
        match a.parse::<u64>()? {
            DTN_SCHEME => a.parse_value(|value| match value {
                cbor::decode::Value::UnsignedInteger(0) => Ok(EndpointId::none()),
                cbor::decode::Value::Text(ssp) => Ok(EndpointId::new("dtn", ssp)),
                cbor::decode::Value::Bytes(ssp) => core::str::from_utf8(ssp)
                    .map(|ssp| EndpointId::new("dtn", ssp))
                    .map_err(|e| cbor::decode::Error::from(e).into()),
                _ => Err(Error::InvalidCBOR(cbor::decode::Error::IncorrectType)),
            }),
            IPN_SCHEME => a.parse_array(|a| {
                let node = a.parse()?;
                let service = a.parse()?;
                Ok::<_, Error>(EndpointId::ipn(node, service))
            }),
            scheme => Err(Error::UnsupportedScheme(scheme)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn emit(eid: &str) -> Vec<u8> {
        cbor::encode::emit(&encode_eid(&EndpointId::parse(eid)).unwrap())
    }

    fn parse(data: &[u8]) -> Result<EndpointId, Error> {
        let mut framed = vec![0x81];
        framed.extend_from_slice(data);
        cbor::decode::parse_array(&framed, parse_eid).map(|(eid, _)| eid)
    }

    #[test]
    fn encodings() {
        assert_eq!(emit("dtn:none"), hex!("82 01 00"));
        // dtn SSPs go out as byte strings
        assert_eq!(emit("dtn://a/b"), hex!("82 01 45 2f2f612f62"));
        assert_eq!(emit("ipn:1.2"), hex!("82 02 82 01 02"));
        assert_eq!(emit("ipn:0.0"), hex!("82 02 82 00 00"));
    }

    #[test]
    fn dtn_round_trip() {
        for eid in ["dtn://a/b", "dtn:none", "dtn://node/service/x"] {
            assert_eq!(parse(&emit(eid)).unwrap().uri(), eid);
        }
    }

    #[test]
    fn decodings() {
        assert_eq!(parse(&hex!("82 01 00")).unwrap(), EndpointId::none());
        assert_eq!(
            parse(&hex!("82 01 45 2f2f612f62")).unwrap().uri(),
            "dtn://a/b"
        );
        // Text string SSPs are accepted too
        assert_eq!(
            parse(&hex!("82 01 65 2f2f612f62")).unwrap().uri(),
            "dtn://a/b"
        );
        assert_eq!(
            parse(&hex!("82 02 82 18 2A 07")).unwrap(),
            EndpointId::ipn(42, 7)
        );
        assert!(matches!(
            parse(&hex!("82 03 00")),
            Err(Error::UnsupportedScheme(3))
        ));
        assert!(parse(&hex!("82 01 01")).is_err());
        assert!(parse(&hex!("82 02 81 01")).is_err());
    }

    #[test]
    fn unencodable() {
        assert!(matches!(
            encode_eid(&EndpointId::parse("http://x")),
            Err(Error::InvalidEid(_))
        ));
        assert!(encode_eid(&EndpointId::parse("ipn:x.y")).is_err());
    }
}
