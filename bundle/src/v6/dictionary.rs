use super::*;

/// Builder for the BPv6 EID dictionary, identical strings share one entry
#[derive(Default)]
pub(super) struct Dictionary {
    data: Vec<u8>,
}

impl Dictionary {
    pub fn insert(&mut self, s: &str) -> u64 {
        let mut offset = 0;
        for entry in self.data.split(|b| *b == 0) {
            if offset >= self.data.len() {
                break;
            }
            if entry == s.as_bytes() {
                return offset as u64;
            }
            offset += entry.len() + 1;
        }
        let offset = self.data.len();
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        offset as u64
    }

    pub fn insert_eid(&mut self, eid: &EndpointId) -> (u64, u64) {
        (self.insert(eid.scheme()), self.insert(eid.ssp()))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Read the NUL terminated string at `offset`
pub(super) fn lookup(dictionary: &[u8], offset: u64) -> Result<&str, Error> {
    let tail = usize::try_from(offset)
        .ok()
        .and_then(|o| dictionary.get(o..))
        .ok_or(Error::InvalidDictionaryOffset(offset))?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or(Error::InvalidDictionaryOffset(offset))?;
    core::str::from_utf8(&tail[..end]).map_field_err("dictionary string")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_entries() {
        let mut d = Dictionary::default();
        assert_eq!(d.insert_eid(&EndpointId::parse("dtn://a")), (0, 4));
        assert_eq!(d.insert_eid(&EndpointId::parse("dtn://b")), (0, 8));
        assert_eq!(d.insert_eid(&EndpointId::none()), (0, 12));
        assert_eq!(d.insert_eid(&EndpointId::parse("dtn://a")), (0, 4));
        let bytes = d.into_bytes();
        assert_eq!(bytes, b"dtn\0//a\0//b\0none\0");

        assert_eq!(lookup(&bytes, 4).unwrap(), "//a");
        assert_eq!(lookup(&bytes, 5).unwrap(), "/a");
        assert!(matches!(
            lookup(&bytes, 18),
            Err(Error::InvalidDictionaryOffset(18))
        ));
        assert!(matches!(
            lookup(b"dtn", 0),
            Err(Error::InvalidDictionaryOffset(0))
        ));
    }
}
