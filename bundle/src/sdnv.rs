/*!
Self-Delimiting Numeric Values (RFC 5050 §4.1, RFC 6256).

Each byte carries 7 bits of the value, most significant group first, with the
high bit set on every byte except the last.
*/

use super::*;

/// The longest SDNV that can carry a 64-bit value
const MAX_LEN: usize = 10;

pub fn emit(value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_LEN];
    let mut len = 0;
    let mut v = value;
    loop {
        groups[len] = (v & 0x7F) as u8;
        len += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        out.push(if i == 0 { groups[i] } else { groups[i] | 0x80 });
    }
}

pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_LEN);
    emit(value, &mut out);
    out
}

/// Decode an SDNV from the start of `data`, returning the value and the number of bytes consumed
pub fn decode(data: &[u8]) -> Result<(u64, usize), Error> {
    let mut value = 0u64;
    for (i, b) in data.iter().enumerate() {
        if value > (u64::MAX >> 7) {
            return Err(Error::SdnvOverflow);
        }
        value = (value << 7) | (b & 0x7F) as u64;
        if b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::NotEnoughData)
}

/// A cursor over an SDNV based encoding
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    pub fn read(&mut self) -> Result<u64, Error> {
        let (value, len) = decode(self.remaining())?;
        self.offset += len;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let b = *self.data.get(self.offset).ok_or(Error::NotEnoughData)?;
        self.offset += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, len: u64) -> Result<&'a [u8], Error> {
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| self.offset.checked_add(len))
            .ok_or(Error::NotEnoughData)?;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(Error::NotEnoughData)?;
        self.offset = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn rfc_vectors() {
        // RFC 6256 §2.1
        assert_eq!(encode(0xABC), hex!("953C"));
        assert_eq!(encode(0x1234), hex!("A434"));
        assert_eq!(encode(0x4234), hex!("818434"));
        assert_eq!(encode(0x7F), hex!("7F"));
        assert_eq!(encode(0), hex!("00"));

        assert_eq!(decode(&hex!("953C")).unwrap(), (0xABC, 2));
        assert_eq!(decode(&hex!("818434FF")).unwrap(), (0x4234, 3));
    }

    #[test]
    fn round_trip() {
        let mut v = 1u64;
        let mut values = vec![0, 127, 128, 16383, 16384, (1 << 63) - 1];
        while v < (1 << 63) {
            values.push(v);
            values.push(v - 1);
            values.push(v + 1);
            v <<= 3;
        }
        for value in values {
            let encoded = encode(value);
            assert_eq!(encoded.last().unwrap() & 0x80, 0);
            assert!(encoded[..encoded.len() - 1].iter().all(|b| b & 0x80 != 0));
            assert_eq!(decode(&encoded).unwrap(), (value, encoded.len()));
        }
        assert_eq!(decode(&encode(u64::MAX)).unwrap().0, u64::MAX);
    }

    #[test]
    fn errors() {
        assert!(matches!(decode(&hex!("8080")), Err(Error::NotEnoughData)));
        assert!(matches!(decode(&[]), Err(Error::NotEnoughData)));
        assert!(matches!(
            decode(&hex!("82808080808080808000")),
            Err(Error::SdnvOverflow)
        ));
    }

    #[test]
    fn reader() {
        let mut r = Reader::new(&hex!("06 953C 03 616263"));
        assert_eq!(r.read_u8().unwrap(), 6);
        assert_eq!(r.read().unwrap(), 0xABC);
        let len = r.read().unwrap();
        assert_eq!(r.read_bytes(len).unwrap(), b"abc");
        assert!(r.remaining().is_empty());
        assert!(matches!(r.read_bytes(1), Err(Error::NotEnoughData)));
    }
}
