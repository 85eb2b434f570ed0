use core::ops::Range;

pub trait ToCbor {
    fn to_cbor(&self, encoder: &mut Encoder);
}

pub struct Encoder {
    data: Vec<u8>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn offset(&self) -> usize {
        self.data.len()
    }

    fn emit_extend(&mut self, b: &[u8]) -> Range<usize> {
        let start = self.data.len();
        self.data.extend_from_slice(b);
        start..self.data.len()
    }

    fn emit_uint_minor(&mut self, major: u8, val: u64) {
        if val < 24 {
            self.data.push((major << 5) | (val as u8))
        } else if val <= u8::MAX as u64 {
            self.data.push((major << 5) | 24u8);
            self.data.push(val as u8)
        } else if val <= u16::MAX as u64 {
            self.data.push((major << 5) | 25u8);
            self.data.extend((val as u16).to_be_bytes())
        } else if val <= u32::MAX as u64 {
            self.data.push((major << 5) | 26u8);
            self.data.extend((val as u32).to_be_bytes())
        } else {
            self.data.push((major << 5) | 27u8);
            self.data.extend(val.to_be_bytes())
        }
    }

    pub fn emit_raw_slice(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data)
    }

    pub fn emit<T>(&mut self, value: &T)
    where
        T: ToCbor + ?Sized,
    {
        value.to_cbor(self)
    }

    /// Emit a byte string, returning the range of the string content
    pub fn emit_bytes(&mut self, value: &[u8]) -> Range<usize> {
        self.emit_uint_minor(2, value.len() as u64);
        self.emit_extend(value)
    }

    /// Emit an array, `count` of `None` produces indefinite length framing
    pub fn emit_array<F>(&mut self, count: Option<usize>, f: F)
    where
        F: FnOnce(&mut Array),
    {
        let mut a = Array::new(self, count);
        f(&mut a);
        a.end()
    }

    pub fn emit_slice<T>(&mut self, values: &[T])
    where
        T: ToCbor,
    {
        self.emit_array(Some(values.len()), |a| {
            for value in values {
                a.emit(value);
            }
        })
    }
}

pub struct Array<'a> {
    encoder: &'a mut Encoder,
    start: usize,
    count: Option<usize>,
    idx: usize,
}

impl<'a> Array<'a> {
    fn new(encoder: &'a mut Encoder, count: Option<usize>) -> Self {
        let start = encoder.offset();
        if let Some(count) = count {
            encoder.emit_uint_minor(4, count as u64);
        } else {
            encoder.data.push((4 << 5) | 31);
        }
        Self {
            start,
            encoder,
            count,
            idx: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.encoder.offset() - self.start
    }

    fn next_field(&mut self) -> &mut Encoder {
        self.idx += 1;
        match self.count {
            Some(count) if self.idx > count => {
                panic!("Too many items added to definite length array")
            }
            _ => {}
        };
        self.encoder
    }

    fn end(self) {
        let Some(count) = self.count else {
            return self.encoder.data.push(0xFF);
        };
        if self.idx != count {
            panic!(
                "Definite length array is short of items: {}, expected {}",
                self.idx, count
            );
        }
    }

    /// Emit a pre-encoded CBOR item as the next element
    pub fn emit_raw_slice(&mut self, data: &[u8]) {
        self.next_field().emit_raw_slice(data)
    }

    pub fn emit<T>(&mut self, value: &T)
    where
        T: ToCbor + ?Sized,
    {
        self.next_field().emit(value)
    }

    pub fn emit_bytes(&mut self, value: &[u8]) -> Range<usize> {
        self.next_field().emit_bytes(value)
    }

    pub fn emit_array<F>(&mut self, count: Option<usize>, f: F)
    where
        F: FnOnce(&mut Array),
    {
        self.next_field().emit_array(count, f)
    }
}

macro_rules! impl_uint_to_cbor {
    ($($ty:ty),*) => {
        $(
            impl ToCbor for $ty {
                fn to_cbor(&self, encoder: &mut Encoder) {
                    encoder.emit_uint_minor(0, *self as u64);
                }
            }
        )*
    };
}

impl_uint_to_cbor!(u8, u16, u32, u64, usize);

fn emit_i64(encoder: &mut Encoder, val: i64) {
    if val >= 0 {
        encoder.emit_uint_minor(0, val as u64);
    } else {
        encoder.emit_uint_minor(1, (-1 - val) as u64);
    }
}

macro_rules! impl_int_to_cbor {
    ($($ty:ty),*) => {
        $(
            impl ToCbor for $ty {
                fn to_cbor(&self, encoder: &mut Encoder) {
                    emit_i64(encoder, *self as i64)
                }
            }
        )*
    };
}

impl_int_to_cbor!(i8, i16, i32, i64, isize);

impl ToCbor for bool {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.data.push((7 << 5) | if *self { 21 } else { 20 })
    }
}

impl ToCbor for str {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_uint_minor(3, self.len() as u64);
        encoder.emit_extend(self.as_bytes());
    }
}

impl ToCbor for String {
    fn to_cbor(&self, encoder: &mut Encoder) {
        self.as_str().to_cbor(encoder)
    }
}

impl ToCbor for [u8] {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_bytes(self);
    }
}

impl ToCbor for Vec<u8> {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_bytes(self);
    }
}

impl<const N: usize> ToCbor for [u8; N] {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_bytes(self);
    }
}

impl<T> ToCbor for Option<T>
where
    T: ToCbor,
{
    fn to_cbor(&self, encoder: &mut Encoder) {
        match self {
            Some(value) => encoder.emit(value),
            None => encoder.data.push((7 << 5) | 23),
        }
    }
}

pub fn emit<T>(value: &T) -> Vec<u8>
where
    T: ToCbor + ?Sized,
{
    let mut e = Encoder::new();
    e.emit(value);
    e.build()
}

pub fn emit_array<F>(count: Option<usize>, f: F) -> Vec<u8>
where
    F: FnOnce(&mut Array),
{
    let mut e = Encoder::new();
    e.emit_array(count, f);
    e.build()
}
