use std::borrow::Cow;

/// Upper bound on the scheme and SSP lengths (RFC 5050 §4.4)
const MAX_PART_LEN: usize = 1023;

/// A `scheme:ssp` endpoint identifier.
///
/// Construction never fails: empty or malformed input is normalised to the
/// null endpoint `dtn:none`. Equality, ordering and hashing follow the URI
/// string.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", from = "String")
)]
pub struct EndpointId {
    uri: Cow<'static, str>,
    colon: usize,
}

impl EndpointId {
    /// The null endpoint, `dtn:none`.
    pub const fn none() -> Self {
        Self {
            uri: Cow::Borrowed("dtn:none"),
            colon: 3,
        }
    }

    pub fn new(scheme: &str, ssp: &str) -> Self {
        if scheme.is_empty() || ssp.is_empty() || scheme.contains(':') {
            return Self::none();
        }
        let scheme = truncate(scheme);
        let ssp = truncate(ssp);
        Self {
            colon: scheme.len(),
            uri: Cow::Owned(format!("{scheme}:{ssp}")),
        }
    }

    /// Parse a URI, splitting at the first `:`
    pub fn parse(uri: &str) -> Self {
        match uri.split_once(':') {
            Some((scheme, ssp)) => Self::new(scheme, ssp),
            None => Self::none(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn scheme(&self) -> &str {
        &self.uri[..self.colon]
    }

    pub fn ssp(&self) -> &str {
        &self.uri[self.colon + 1..]
    }

    pub fn is_none(&self) -> bool {
        *self == Self::none()
    }

    /// The `node.service` numbers of an `ipn` EID
    pub fn ipn_parts(&self) -> Option<(u64, u64)> {
        if self.scheme() != "ipn" {
            return None;
        }
        let (node, service) = self.ssp().split_once('.')?;
        Some((parse_number(node)?, parse_number(service)?))
    }

    /// The `node.service` pair of an `ipn` EID that can be CBHE encoded
    pub fn ipn_cbhe(&self) -> Option<(u64, u64)> {
        self.ipn_parts().filter(|(node, service)| *node != 0 && *service != 0)
    }

    pub fn is_ipn_cbhe(&self) -> bool {
        self.ipn_cbhe().is_some()
    }

    pub fn ipn(node: u64, service: u64) -> Self {
        Self::new("ipn", &format!("{node}.{service}"))
    }
}

impl Default for EndpointId {
    fn default() -> Self {
        Self::none()
    }
}

fn parse_number(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        None
    } else {
        s.parse().ok()
    }
}

fn truncate(s: &str) -> &str {
    if s.len() <= MAX_PART_LEN {
        return s;
    }
    let mut end = MAX_PART_LEN;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl From<&str> for EndpointId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for EndpointId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EndpointId> for String {
    fn from(value: EndpointId) -> Self {
        value.uri.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let eid = EndpointId::parse("dtn:none");
        assert_eq!(eid.scheme(), "dtn");
        assert_eq!(eid.ssp(), "none");
        assert!(eid.is_none());

        let eid = EndpointId::parse("dtn://node/service");
        assert_eq!(eid.scheme(), "dtn");
        assert_eq!(eid.ssp(), "//node/service");
        assert_eq!(eid.uri(), "dtn://node/service");

        // Only the first colon separates scheme and SSP
        let eid = EndpointId::parse("dtn://a:b");
        assert_eq!(eid.scheme(), "dtn");
        assert_eq!(eid.ssp(), "//a:b");
    }

    #[test]
    fn normalise() {
        assert_eq!(EndpointId::parse(""), EndpointId::none());
        assert_eq!(EndpointId::parse("nocolon"), EndpointId::none());
        assert_eq!(EndpointId::parse(":ssp"), EndpointId::none());
        assert_eq!(EndpointId::parse("dtn:"), EndpointId::none());
        assert_eq!(EndpointId::new("", "x"), EndpointId::none());
        assert_eq!(EndpointId::default().uri(), "dtn:none");
    }

    #[test]
    fn truncation() {
        let long = "x".repeat(2000);
        let eid = EndpointId::new(&long, &long);
        assert_eq!(eid.scheme().len(), 1023);
        assert_eq!(eid.ssp().len(), 1023);

        // Never split a multi-byte character
        let wide = "\u{00e9}".repeat(600);
        let eid = EndpointId::new("dtn", &wide);
        assert_eq!(eid.ssp().len(), 1022);
    }

    #[test]
    fn cbhe() {
        assert_eq!(EndpointId::parse("ipn:1.2").ipn_cbhe(), Some((1, 2)));
        assert_eq!(
            EndpointId::parse("ipn:18446744073709551615.7").ipn_cbhe(),
            Some((u64::MAX, 7))
        );
        assert!(!EndpointId::parse("ipn:0.2").is_ipn_cbhe());
        assert!(!EndpointId::parse("ipn:1.0").is_ipn_cbhe());
        assert!(!EndpointId::parse("ipn:18446744073709551616.1").is_ipn_cbhe());
        assert!(!EndpointId::parse("ipn:1.2.3").is_ipn_cbhe());
        assert!(!EndpointId::parse("ipn:+1.2").is_ipn_cbhe());
        assert!(!EndpointId::parse("ipn:1").is_ipn_cbhe());
        assert!(!EndpointId::parse("dtn:1.2").is_ipn_cbhe());
        assert_eq!(EndpointId::ipn(4, 5).uri(), "ipn:4.5");
        assert_eq!(EndpointId::parse("ipn:0.0").ipn_parts(), Some((0, 0)));
    }

    #[test]
    fn ordering() {
        let mut eids = vec![
            EndpointId::parse("dtn://b"),
            EndpointId::parse("dtn://a"),
            EndpointId::parse("ipn:1.1"),
        ];
        eids.sort();
        assert_eq!(eids[0].uri(), "dtn://a");
        assert_eq!(eids[1].uri(), "dtn://b");
        assert_eq!(eids[2].uri(), "ipn:1.1");
    }
}
