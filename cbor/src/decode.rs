use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Not enough data for encoded value")]
    NotEnoughData,

    #[error("Invalid minor-type value {0}")]
    InvalidMinorValue(u8),

    #[error("Incorrect type")]
    IncorrectType,

    #[error("Unsupported major type {0}")]
    Unsupported(u8),

    #[error("Array has additional items")]
    AdditionalItems,

    #[error("Array has no more items")]
    NotEnoughItems,

    #[error("Integer value {0} out of range")]
    OutOfRange(u64),

    #[error(transparent)]
    InvalidUtf8(#[from] core::str::Utf8Error),
}

pub trait FromCbor: Sized {
    /// Parse a value from the start of `data`, returning the value and the number of bytes consumed
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum Value<'a> {
    UnsignedInteger(u64),
    NegativeInteger(u64),
    Bytes(&'a [u8]),
    Text(&'a str),
    False,
    True,
    Null,
    Undefined,
    Simple(u8),
}

pub struct Array<'a> {
    data: &'a [u8],
    count: Option<usize>,
    offset: usize,
    idx: usize,
}

impl<'a> Array<'a> {
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn is_definite(&self) -> bool {
        self.count.is_some()
    }

    /// Offset of the next item, relative to the start of the array
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn at_end(&self) -> Result<bool, Error> {
        match self.count {
            Some(count) => Ok(self.idx >= count),
            None => self
                .data
                .get(self.offset)
                .map(|b| *b == 0xFF)
                .ok_or(Error::NotEnoughData),
        }
    }

    fn next_item(&self) -> Result<&'a [u8], Error> {
        if self.at_end()? {
            Err(Error::NotEnoughItems)
        } else {
            Ok(&self.data[self.offset..])
        }
    }

    fn advance(&mut self, len: usize) {
        self.offset += len;
        self.idx += 1;
    }

    fn finish(self) -> Result<usize, Error> {
        match self.count {
            Some(count) if self.idx == count => Ok(self.offset),
            Some(_) => Err(Error::AdditionalItems),
            None => match self.data.get(self.offset) {
                Some(0xFF) => Ok(self.offset + 1),
                Some(_) => Err(Error::AdditionalItems),
                None => Err(Error::NotEnoughData),
            },
        }
    }

    pub fn parse<T>(&mut self) -> Result<T, Error>
    where
        T: FromCbor,
    {
        let (value, len) = T::from_cbor(self.next_item()?)?;
        self.advance(len);
        Ok(value)
    }

    pub fn try_parse<T>(&mut self) -> Result<Option<T>, Error>
    where
        T: FromCbor,
    {
        if self.at_end()? {
            Ok(None)
        } else {
            self.parse().map(Some)
        }
    }

    pub fn parse_value<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(Value<'a>) -> Result<T, E>,
        E: From<Error>,
    {
        let (value, len) = parse_value(self.next_item()?, f)?;
        self.advance(len);
        Ok(value)
    }

    pub fn parse_array<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Array<'a>) -> Result<T, E>,
        E: From<Error>,
    {
        let (value, len) = parse_array(self.next_item()?, f)?;
        self.advance(len);
        Ok(value)
    }

    /// Skip over the next item, returning its encoded bytes
    pub fn skip_value(&mut self) -> Result<&'a [u8], Error> {
        let data = self.next_item()?;
        let len = item_len(data)?;
        self.advance(len);
        Ok(&data[..len])
    }
}

fn parse_uint_minor(minor: u8, data: &[u8]) -> Result<(u64, usize), Error> {
    match minor {
        24 => data
            .first()
            .map(|v| (*v as u64, 1))
            .ok_or(Error::NotEnoughData),
        25 => data
            .get(..2)
            .map(|v| (u16::from_be_bytes([v[0], v[1]]) as u64, 2))
            .ok_or(Error::NotEnoughData),
        26 => data
            .get(..4)
            .map(|v| (u32::from_be_bytes([v[0], v[1], v[2], v[3]]) as u64, 4))
            .ok_or(Error::NotEnoughData),
        27 => data
            .get(..8)
            .map(|v| {
                let mut b = [0u8; 8];
                b.copy_from_slice(v);
                (u64::from_be_bytes(b), 8)
            })
            .ok_or(Error::NotEnoughData),
        val if val < 24 => Ok((val as u64, 0)),
        _ => Err(Error::InvalidMinorValue(minor)),
    }
}

fn parse_data_minor(minor: u8, data: &[u8]) -> Result<(&[u8], usize), Error> {
    let (data_len, len) = parse_uint_minor(minor, data)?;
    let end = usize::try_from(data_len)
        .ok()
        .and_then(|l| l.checked_add(len))
        .ok_or(Error::NotEnoughData)?;
    data.get(len..end)
        .map(|d| (d, end))
        .ok_or(Error::NotEnoughData)
}

/// Total encoded length of the item at the start of `data`
fn item_len(data: &[u8]) -> Result<usize, Error> {
    let b = *data.first().ok_or(Error::NotEnoughData)?;
    match (b >> 5, b & 0x1F) {
        (0 | 1 | 7, minor) => parse_uint_minor(minor, &data[1..]).map(|(_, len)| len + 1),
        (2 | 3, minor) => parse_data_minor(minor, &data[1..]).map(|(_, len)| len + 1),
        (4, _) => parse_array(data, |a| {
            while !a.at_end()? {
                a.skip_value()?;
            }
            Ok::<_, Error>(())
        })
        .map(|(_, len)| len),
        (major, _) => Err(Error::Unsupported(major)),
    }
}

/// Parse the array header at the start of `data`, returning the item count (`None` if indefinite) and header length
pub fn parse_array_header(data: &[u8]) -> Result<(Option<usize>, usize), Error> {
    match data.first().map(|b| (b >> 5, b & 0x1F)) {
        None => Err(Error::NotEnoughData),
        Some((4, 31)) => Ok((None, 1)),
        Some((4, minor)) => {
            let (count, len) = parse_uint_minor(minor, &data[1..])?;
            Ok((
                Some(usize::try_from(count).map_err(|_| Error::OutOfRange(count))?),
                len + 1,
            ))
        }
        Some(_) => Err(Error::IncorrectType),
    }
}

pub fn parse_value<'a, T, E, F>(data: &'a [u8], f: F) -> Result<(T, usize), E>
where
    F: FnOnce(Value<'a>) -> Result<T, E>,
    E: From<Error>,
{
    let b = *data.first().ok_or(Error::NotEnoughData)?;
    let (value, len) = match (b >> 5, b & 0x1F) {
        (0, minor) => {
            let (v, len) = parse_uint_minor(minor, &data[1..])?;
            (Value::UnsignedInteger(v), len + 1)
        }
        (1, minor) => {
            let (v, len) = parse_uint_minor(minor, &data[1..])?;
            (Value::NegativeInteger(v), len + 1)
        }
        (2, 31) | (3, 31) => return Err(Error::Unsupported(b >> 5).into()),
        (2, minor) => {
            let (t, len) = parse_data_minor(minor, &data[1..])?;
            (Value::Bytes(t), len + 1)
        }
        (3, minor) => {
            let (t, len) = parse_data_minor(minor, &data[1..])?;
            (
                Value::Text(core::str::from_utf8(t).map_err(Error::from)?),
                len + 1,
            )
        }
        (4, _) => return Err(Error::IncorrectType.into()),
        (7, 20) => (Value::False, 1),
        (7, 21) => (Value::True, 1),
        (7, 22) => (Value::Null, 1),
        (7, 23) => (Value::Undefined, 1),
        (7, minor @ 0..=19) => (Value::Simple(minor), 1),
        (7, 24) => {
            let v = *data.get(1).ok_or(Error::NotEnoughData)?;
            if v < 32 {
                return Err(Error::InvalidMinorValue(v).into());
            }
            (Value::Simple(v), 2)
        }
        (major, _) => return Err(Error::Unsupported(major).into()),
    };
    f(value).map(|v| (v, len))
}

pub fn parse_array<'a, T, E, F>(data: &'a [u8], f: F) -> Result<(T, usize), E>
where
    F: FnOnce(&mut Array<'a>) -> Result<T, E>,
    E: From<Error>,
{
    let (count, offset) = parse_array_header(data)?;
    let mut array = Array {
        data,
        count,
        offset,
        idx: 0,
    };
    let value = f(&mut array)?;
    Ok((value, array.finish()?))
}

pub fn parse<T>(data: &[u8]) -> Result<T, Error>
where
    T: FromCbor,
{
    T::from_cbor(data).map(|(v, _)| v)
}

impl FromCbor for u64 {
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error> {
        parse_value(data, |value| match value {
            Value::UnsignedInteger(v) => Ok(v),
            _ => Err(Error::IncorrectType),
        })
    }
}

macro_rules! impl_uint_from_cbor {
    ($($ty:ty),*) => {
        $(
            impl FromCbor for $ty {
                fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error> {
                    let (v, len) = u64::from_cbor(data)?;
                    Ok((<$ty>::try_from(v).map_err(|_| Error::OutOfRange(v))?, len))
                }
            }
        )*
    };
}

impl_uint_from_cbor!(u8, u16, u32, usize);

impl FromCbor for i64 {
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error> {
        parse_value(data, |value| match value {
            Value::UnsignedInteger(v) => i64::try_from(v).map_err(|_| Error::OutOfRange(v)),
            Value::NegativeInteger(v) => i64::try_from(v)
                .map(|v| -1 - v)
                .map_err(|_| Error::OutOfRange(v)),
            _ => Err(Error::IncorrectType),
        })
    }
}

impl FromCbor for bool {
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error> {
        parse_value(data, |value| match value {
            Value::False => Ok(false),
            Value::True => Ok(true),
            _ => Err(Error::IncorrectType),
        })
    }
}

impl FromCbor for String {
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error> {
        parse_value(data, |value| match value {
            Value::Text(s) => Ok(s.to_string()),
            _ => Err(Error::IncorrectType),
        })
    }
}

impl FromCbor for Vec<u8> {
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Error> {
        parse_value(data, |value| match value {
            Value::Bytes(b) => Ok(b.to_vec()),
            _ => Err(Error::IncorrectType),
        })
    }
}
