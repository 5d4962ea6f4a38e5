//! Low-level wire codec.
//!
//! Every on-chain structure is written big-endian with fixed field order.
//! Variable-length content carries an explicit length prefix whose width is
//! declared at the use site ([`PrefixWidth`]), together with a maximum
//! content length that is enforced when a value is constructed and again
//! when it is decoded.

use crate::error::CodecError;

/// Width of the fixed memo field carried by token transfers.
pub const MEMO_LEN: usize = 34;

/// Types that can be written to the wire.
pub trait WireEncode {
    /// Append the wire encoding to `buf`.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Encode into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Types that can be read back from the wire.
pub trait WireDecode: Sized {
    /// Decode one value, advancing the reader past it.
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError>;

    /// Decode a value that must span the whole of `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let value = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// A forward-only cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, CodecError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(CodecError::MalformedLength {
                needed: 1,
                remaining: 0,
            })
    }

    /// Consume exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::MalformedLength {
                needed: len,
                remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_u128(&mut self) -> Result<u128, CodecError> {
        Ok(u128::from_be_bytes(self.read_array()?))
    }

    /// Fail if any bytes are left unread.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// Width of a length or count prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixWidth {
    U8,
    U32,
}

impl PrefixWidth {
    /// Largest length the prefix can express.
    pub const fn capacity(self) -> usize {
        match self {
            PrefixWidth::U8 => u8::MAX as usize,
            PrefixWidth::U32 => u32::MAX as usize,
        }
    }

    /// Write `len` using this width. Callers validate `len` beforehand.
    pub fn write(self, buf: &mut Vec<u8>, len: usize) {
        match self {
            PrefixWidth::U8 => buf.push(len as u8),
            PrefixWidth::U32 => buf.extend_from_slice(&(len as u32).to_be_bytes()),
        }
    }

    pub fn read(self, reader: &mut ByteReader<'_>) -> Result<usize, CodecError> {
        match self {
            PrefixWidth::U8 => Ok(reader.read_u8()? as usize),
            PrefixWidth::U32 => Ok(reader.read_u32()? as usize),
        }
    }
}

/// Reject content longer than `max` or than the prefix can describe.
pub fn check_length(len: usize, prefix: PrefixWidth, max: usize) -> Result<(), CodecError> {
    let max = max.min(prefix.capacity());
    if len > max {
        return Err(CodecError::ValueTooLong { len, max });
    }
    Ok(())
}

/// Write `bytes` behind a length prefix. The length must already be validated.
pub fn encode_prefixed_bytes(buf: &mut Vec<u8>, prefix: PrefixWidth, bytes: &[u8]) {
    prefix.write(buf, bytes.len());
    buf.extend_from_slice(bytes);
}

/// Read a length prefix and that many bytes, enforcing `max`.
pub fn decode_prefixed_bytes<'a>(
    reader: &mut ByteReader<'a>,
    prefix: PrefixWidth,
    max: usize,
) -> Result<&'a [u8], CodecError> {
    let len = prefix.read(reader)?;
    check_length(len, prefix, max)?;
    reader.read_bytes(len)
}

/// A UTF-8 string carried behind a length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LengthPrefixedString {
    content: String,
    prefix: PrefixWidth,
}

impl LengthPrefixedString {
    /// Validate `content` against the declared prefix width and maximum.
    pub fn new(content: impl Into<String>, prefix: PrefixWidth, max: usize) -> Result<Self, CodecError> {
        let content = content.into();
        check_length(content.len(), prefix, max)?;
        Ok(Self { content, prefix })
    }

    pub fn decode_with(
        reader: &mut ByteReader<'_>,
        prefix: PrefixWidth,
        max: usize,
    ) -> Result<Self, CodecError> {
        let bytes = decode_prefixed_bytes(reader, prefix, max)?;
        let content = std::str::from_utf8(bytes)
            .map_err(|_| CodecError::InvalidUtf8)?
            .to_string();
        Ok(Self { content, prefix })
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn prefix(&self) -> PrefixWidth {
        self.prefix
    }
}

impl WireEncode for LengthPrefixedString {
    fn encode(&self, buf: &mut Vec<u8>) {
        encode_prefixed_bytes(buf, self.prefix, self.content.as_bytes());
    }
}

/// The fixed-width, zero-padded memo field.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoString([u8; MEMO_LEN]);

impl MemoString {
    pub fn new(memo: &str) -> Result<Self, CodecError> {
        Self::from_slice(memo.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() > MEMO_LEN {
            return Err(CodecError::ValueTooLong {
                len: bytes.len(),
                max: MEMO_LEN,
            });
        }
        let mut memo = [0u8; MEMO_LEN];
        memo[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(memo))
    }

    pub const fn empty() -> Self {
        Self([0u8; MEMO_LEN])
    }

    pub const fn as_bytes(&self) -> &[u8; MEMO_LEN] {
        &self.0
    }

    /// The memo text with trailing zero padding removed, if it is valid UTF-8.
    pub fn to_text(&self) -> Option<&str> {
        let end = self.0.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        std::str::from_utf8(&self.0[..end]).ok()
    }
}

impl Default for MemoString {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for MemoString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "Memo({:?})", text),
            None => write!(f, "Memo(0x{})", hex::encode(self.0)),
        }
    }
}

impl WireEncode for MemoString {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl WireDecode for MemoString {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self(reader.read_array()?))
    }
}

/// Write a count prefix followed by each item.
pub fn encode_list<T: WireEncode>(buf: &mut Vec<u8>, prefix: PrefixWidth, items: &[T]) {
    prefix.write(buf, items.len());
    for item in items {
        item.encode(buf);
    }
}

/// Read a count prefix followed by that many items.
pub fn decode_list<T: WireDecode>(
    reader: &mut ByteReader<'_>,
    prefix: PrefixWidth,
) -> Result<Vec<T>, CodecError> {
    let count = prefix.read(reader)?;
    // Every item occupies at least one byte.
    if count > reader.remaining() {
        return Err(CodecError::MalformedLength {
            needed: count,
            remaining: reader.remaining(),
        });
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::decode(reader)?);
    }
    Ok(items)
}

impl WireEncode for u8 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(*self);
    }
}

impl WireDecode for u8 {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        reader.read_u8()
    }
}

impl WireEncode for u16 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_be_bytes());
    }
}

impl WireDecode for u16 {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        reader.read_u16()
    }
}

impl WireEncode for u32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_be_bytes());
    }
}

impl WireDecode for u32 {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        reader.read_u32()
    }
}

impl WireEncode for u64 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_be_bytes());
    }
}

impl WireDecode for u64 {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        reader.read_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reports_short_buffer() {
        let mut reader = ByteReader::new(&[0x00, 0x01]);
        let err = reader.read_u32().unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedLength {
                needed: 4,
                remaining: 2
            }
        );
        // A failed read leaves the cursor untouched.
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_string_too_long_rejected_at_construction() {
        let err = LengthPrefixedString::new("abcdef", PrefixWidth::U8, 5).unwrap_err();
        assert_eq!(err, CodecError::ValueTooLong { len: 6, max: 5 });

        let long = "x".repeat(300);
        let err = LengthPrefixedString::new(long, PrefixWidth::U8, 1000).unwrap_err();
        assert_eq!(err, CodecError::ValueTooLong { len: 300, max: 255 });
    }

    #[test]
    fn test_string_layout() {
        let s = LengthPrefixedString::new("hi", PrefixWidth::U8, 128).unwrap();
        assert_eq!(s.to_bytes(), vec![0x02, b'h', b'i']);

        let s = LengthPrefixedString::new("hi", PrefixWidth::U32, 128).unwrap();
        assert_eq!(s.to_bytes(), vec![0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn test_string_declared_length_beyond_buffer() {
        let bytes = [0x00, 0x00, 0x00, 0x09, b'a', b'b'];
        let mut reader = ByteReader::new(&bytes);
        let err = LengthPrefixedString::decode_with(&mut reader, PrefixWidth::U32, 100).unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedLength {
                needed: 9,
                remaining: 2
            }
        );
    }

    #[test]
    fn test_string_decode_enforces_max() {
        let bytes = [0x03, b'a', b'b', b'c'];
        let mut reader = ByteReader::new(&bytes);
        let err = LengthPrefixedString::decode_with(&mut reader, PrefixWidth::U8, 2).unwrap_err();
        assert_eq!(err, CodecError::ValueTooLong { len: 3, max: 2 });
    }

    #[test]
    fn test_string_roundtrip() {
        let s = LengthPrefixedString::new("héllo", PrefixWidth::U32, 64).unwrap();
        let bytes = s.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let decoded = LengthPrefixedString::decode_with(&mut reader, PrefixWidth::U32, 64).unwrap();
        assert_eq!(decoded, s);
        reader.finish().unwrap();
    }

    #[test]
    fn test_memo_padding() {
        let memo = MemoString::new("hello").unwrap();
        let bytes = memo.to_bytes();
        assert_eq!(bytes.len(), MEMO_LEN);
        assert_eq!(&bytes[..5], b"hello");
        assert!(bytes[5..].iter().all(|b| *b == 0));
        assert_eq!(memo.to_text(), Some("hello"));
        assert_eq!(MemoString::from_bytes(&bytes).unwrap(), memo);
    }

    #[test]
    fn test_memo_too_long() {
        let err = MemoString::new(&"m".repeat(35)).unwrap_err();
        assert_eq!(err, CodecError::ValueTooLong { len: 35, max: 34 });
        assert!(MemoString::new(&"m".repeat(34)).is_ok());
    }

    #[test]
    fn test_list_roundtrip_and_prefix() {
        let items: Vec<u16> = vec![1, 2, 0xffff];
        let mut buf = Vec::new();
        encode_list(&mut buf, PrefixWidth::U8, &items);
        assert_eq!(buf, vec![3, 0, 1, 0, 2, 0xff, 0xff]);

        let mut reader = ByteReader::new(&buf);
        let decoded: Vec<u16> = decode_list(&mut reader, PrefixWidth::U8).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_list_count_beyond_buffer() {
        let buf = [0x00, 0x00, 0x10, 0x00, 0x01];
        let mut reader = ByteReader::new(&buf);
        let err = decode_list::<u8>(&mut reader, PrefixWidth::U32).unwrap_err();
        assert!(matches!(err, CodecError::MalformedLength { .. }));
    }

    #[test]
    fn test_from_bytes_rejects_trailing() {
        let err = u16::from_bytes(&[0, 1, 2]).unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes(1));
    }
}
