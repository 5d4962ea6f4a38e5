//! Clarity value codec.
//!
//! A [`ClarityValue`] is a typed contract-call argument. Each value is
//! written as a one-byte type tag followed by its body:
//!
//! | tag  | variant            | body                                   |
//! |------|--------------------|----------------------------------------|
//! | 0x00 | int                | 16-byte two's complement               |
//! | 0x01 | uint               | 16-byte unsigned                       |
//! | 0x02 | buffer             | u32 length, bytes                      |
//! | 0x03 | true               |                                        |
//! | 0x04 | false              |                                        |
//! | 0x05 | standard principal | address                                |
//! | 0x06 | contract principal | address, contract name                 |
//! | 0x07 | (ok v)             | value                                  |
//! | 0x08 | (err v)            | value                                  |
//! | 0x09 | none               |                                        |
//! | 0x0a | (some v)           | value                                  |
//! | 0x0b | list               | u32 count, values                      |
//! | 0x0c | tuple              | u32 count, (name, value) pairs         |
//! | 0x0d | string-ascii       | u32 length, bytes                      |
//! | 0x0e | string-utf8        | u32 length, bytes                      |
//!
//! Tuple entries keep their insertion order. Nested values, lists and ASCII
//! strings are checked when they are built, so anything that encodes also
//! decodes.

use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::CodecError;
use crate::names::{ClarityName, ContractName};
use crate::wire::{
    check_length, decode_prefixed_bytes, encode_prefixed_bytes, ByteReader, PrefixWidth,
    WireDecode, WireEncode,
};

/// Deepest nesting of optionals, responses, lists and tuples a value may
/// have. Enforced when values are built and when they are decoded.
pub const MAX_VALUE_DEPTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClarityType {
    Int = 0x00,
    UInt = 0x01,
    Buffer = 0x02,
    BoolTrue = 0x03,
    BoolFalse = 0x04,
    PrincipalStandard = 0x05,
    PrincipalContract = 0x06,
    ResponseOk = 0x07,
    ResponseErr = 0x08,
    OptionalNone = 0x09,
    OptionalSome = 0x0a,
    List = 0x0b,
    Tuple = 0x0c,
    StringAscii = 0x0d,
    StringUtf8 = 0x0e,
}

impl ClarityType {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x00 => Self::Int,
            0x01 => Self::UInt,
            0x02 => Self::Buffer,
            0x03 => Self::BoolTrue,
            0x04 => Self::BoolFalse,
            0x05 => Self::PrincipalStandard,
            0x06 => Self::PrincipalContract,
            0x07 => Self::ResponseOk,
            0x08 => Self::ResponseErr,
            0x09 => Self::OptionalNone,
            0x0a => Self::OptionalSome,
            0x0b => Self::List,
            0x0c => Self::Tuple,
            0x0d => Self::StringAscii,
            0x0e => Self::StringUtf8,
            _ => return None,
        })
    }
}

/// A standard or contract principal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PrincipalData {
    Standard(Address),
    Contract(Address, ContractName),
}

impl PrincipalData {
    pub fn address(&self) -> &Address {
        match self {
            PrincipalData::Standard(address) | PrincipalData::Contract(address, _) => address,
        }
    }

    pub fn contract(address: Address, name: &str) -> Result<Self, CodecError> {
        Ok(PrincipalData::Contract(address, ContractName::new(name)?))
    }
}

impl fmt::Display for PrincipalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalData::Standard(address) => write!(f, "{}", address),
            PrincipalData::Contract(address, name) => write!(f, "{}.{}", address, name),
        }
    }
}

impl fmt::Debug for PrincipalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self)
    }
}

impl FromStr for PrincipalData {
    type Err = CodecError;

    /// `SP…` for a standard principal, `SP….name` for a contract.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((address, name)) => Self::contract(address.parse()?, name),
            None => Ok(PrincipalData::Standard(s.parse()?)),
        }
    }
}

impl From<Address> for PrincipalData {
    fn from(address: Address) -> Self {
        PrincipalData::Standard(address)
    }
}

impl WireEncode for PrincipalData {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            PrincipalData::Standard(address) => {
                buf.push(ClarityType::PrincipalStandard.to_u8());
                address.encode(buf);
            }
            PrincipalData::Contract(address, name) => {
                buf.push(ClarityType::PrincipalContract.to_u8());
                address.encode(buf);
                name.encode(buf);
            }
        }
    }
}

impl WireDecode for PrincipalData {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = reader.read_u8()?;
        match ClarityType::from_u8(tag) {
            Some(ClarityType::PrincipalStandard) => Ok(PrincipalData::Standard(Address::decode(reader)?)),
            Some(ClarityType::PrincipalContract) => {
                let address = Address::decode(reader)?;
                let name = ContractName::decode(reader)?;
                Ok(PrincipalData::Contract(address, name))
            }
            _ => Err(CodecError::UnknownTag {
                kind: "principal",
                tag,
            }),
        }
    }
}

/// Named fields of a tuple, in insertion order, with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TupleData {
    entries: Vec<(ClarityName, ClarityValue)>,
    depth: usize,
}

impl TupleData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<(ClarityName, ClarityValue)>) -> Result<Self, CodecError> {
        let mut tuple = Self::new();
        for (name, value) in entries {
            tuple.insert(name, value)?;
        }
        Ok(tuple)
    }

    /// Append a field; a repeated name or an over-deep value is rejected.
    pub fn insert(&mut self, name: ClarityName, value: ClarityValue) -> Result<(), CodecError> {
        if self.get(name.as_str()).is_some() {
            return Err(CodecError::DuplicateTupleKey(name.to_string()));
        }
        let depth = wrapped_depth(&value)?;
        self.depth = self.depth.max(depth);
        self.entries.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClarityValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClarityName, &ClarityValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }
}

/// Depth of a container holding `value`.
fn wrapped_depth(value: &ClarityValue) -> Result<usize, CodecError> {
    let depth = value.depth() + 1;
    if depth > MAX_VALUE_DEPTH {
        return Err(CodecError::DepthExceeded(MAX_VALUE_DEPTH));
    }
    Ok(depth)
}

/// The single value inside an optional or a response.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Nested {
    value: Box<ClarityValue>,
    depth: usize,
}

impl Nested {
    pub fn new(value: ClarityValue) -> Result<Self, CodecError> {
        let depth = wrapped_depth(&value)?;
        Ok(Self {
            value: Box::new(value),
            depth,
        })
    }

    pub fn value(&self) -> &ClarityValue {
        &self.value
    }

    pub fn into_inner(self) -> ClarityValue {
        *self.value
    }
}

impl fmt::Debug for Nested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Elements of a list value.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ListData {
    items: Vec<ClarityValue>,
    depth: usize,
}

impl ListData {
    pub fn new(items: Vec<ClarityValue>) -> Result<Self, CodecError> {
        check_length(items.len(), PrefixWidth::U32, usize::MAX)?;
        let mut depth = 0;
        for item in &items {
            depth = depth.max(wrapped_depth(item)?);
        }
        Ok(Self { items, depth })
    }

    pub fn items(&self) -> &[ClarityValue] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClarityValue> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<ClarityValue> {
        self.items
    }
}

impl fmt::Debug for ListData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

/// Text restricted to printable ASCII plus tab, newline and carriage return.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct AsciiString(String);

impl AsciiString {
    pub fn new(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(s.as_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if !bytes.iter().copied().all(is_clarity_ascii) {
            return Err(CodecError::InvalidAscii);
        }
        check_length(bytes.len(), PrefixWidth::U32, usize::MAX)?;
        // Every byte is ASCII.
        Ok(Self(bytes.iter().map(|b| *b as char).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AsciiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A typed Clarity value.
///
/// Nested values, lists, tuples and ASCII strings only come from their
/// checking constructors; [`ClarityValue::depth`] never exceeds
/// [`MAX_VALUE_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Bool(bool),
    Buffer(Vec<u8>),
    Principal(PrincipalData),
    OptionalNone,
    OptionalSome(Nested),
    ResponseOk(Nested),
    ResponseErr(Nested),
    List(ListData),
    Tuple(TupleData),
    StringAscii(AsciiString),
    StringUtf8(String),
}

impl ClarityValue {
    /// A buffer; only the 4-byte length prefix bounds its size.
    pub fn buffer(bytes: impl Into<Vec<u8>>) -> Result<Self, CodecError> {
        let bytes = bytes.into();
        check_length(bytes.len(), PrefixWidth::U32, usize::MAX)?;
        Ok(ClarityValue::Buffer(bytes))
    }

    pub fn some(value: ClarityValue) -> Result<Self, CodecError> {
        Ok(ClarityValue::OptionalSome(Nested::new(value)?))
    }

    pub fn ok(value: ClarityValue) -> Result<Self, CodecError> {
        Ok(ClarityValue::ResponseOk(Nested::new(value)?))
    }

    pub fn err(value: ClarityValue) -> Result<Self, CodecError> {
        Ok(ClarityValue::ResponseErr(Nested::new(value)?))
    }

    pub fn list(items: Vec<ClarityValue>) -> Result<Self, CodecError> {
        Ok(ClarityValue::List(ListData::new(items)?))
    }

    pub fn string_ascii(s: &str) -> Result<Self, CodecError> {
        Ok(ClarityValue::StringAscii(AsciiString::new(s)?))
    }

    pub fn string_utf8(s: &str) -> Result<Self, CodecError> {
        check_length(s.len(), PrefixWidth::U32, usize::MAX)?;
        Ok(ClarityValue::StringUtf8(s.to_string()))
    }

    /// Parse a principal from `SP…` or `SP….contract-name`.
    pub fn principal(s: &str) -> Result<Self, CodecError> {
        Ok(ClarityValue::Principal(s.parse()?))
    }

    pub fn tuple<'a>(fields: impl IntoIterator<Item = (&'a str, ClarityValue)>) -> Result<Self, CodecError> {
        let mut tuple = TupleData::new();
        for (name, value) in fields {
            tuple.insert(ClarityName::new(name)?, value)?;
        }
        Ok(ClarityValue::Tuple(tuple))
    }

    pub fn type_tag(&self) -> ClarityType {
        match self {
            ClarityValue::Int(_) => ClarityType::Int,
            ClarityValue::UInt(_) => ClarityType::UInt,
            ClarityValue::Bool(true) => ClarityType::BoolTrue,
            ClarityValue::Bool(false) => ClarityType::BoolFalse,
            ClarityValue::Buffer(_) => ClarityType::Buffer,
            ClarityValue::Principal(PrincipalData::Standard(_)) => ClarityType::PrincipalStandard,
            ClarityValue::Principal(PrincipalData::Contract(..)) => ClarityType::PrincipalContract,
            ClarityValue::OptionalNone => ClarityType::OptionalNone,
            ClarityValue::OptionalSome(_) => ClarityType::OptionalSome,
            ClarityValue::ResponseOk(_) => ClarityType::ResponseOk,
            ClarityValue::ResponseErr(_) => ClarityType::ResponseErr,
            ClarityValue::List(_) => ClarityType::List,
            ClarityValue::Tuple(_) => ClarityType::Tuple,
            ClarityValue::StringAscii(_) => ClarityType::StringAscii,
            ClarityValue::StringUtf8(_) => ClarityType::StringUtf8,
        }
    }

    /// Levels of optional, response, list or tuple nesting. Leaves and
    /// empty containers have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            ClarityValue::OptionalSome(n) | ClarityValue::ResponseOk(n) | ClarityValue::ResponseErr(n) => n.depth,
            ClarityValue::List(list) => list.depth,
            ClarityValue::Tuple(tuple) => tuple.depth,
            _ => 0,
        }
    }

    /// Hex of the serialized value, as used by RPC endpoints.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CodecError::Malformed(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    fn decode_at_depth(reader: &mut ByteReader<'_>, depth: usize) -> Result<Self, CodecError> {
        if depth > MAX_VALUE_DEPTH {
            return Err(CodecError::DepthExceeded(MAX_VALUE_DEPTH));
        }
        let tag = reader.read_u8()?;
        let kind = ClarityType::from_u8(tag).ok_or(CodecError::UnknownClarityType(tag))?;

        let value = match kind {
            ClarityType::Int => ClarityValue::Int(reader.read_u128()? as i128),
            ClarityType::UInt => ClarityValue::UInt(reader.read_u128()?),
            ClarityType::Buffer => {
                let bytes = decode_prefixed_bytes(reader, PrefixWidth::U32, usize::MAX)?;
                ClarityValue::Buffer(bytes.to_vec())
            }
            ClarityType::BoolTrue => ClarityValue::Bool(true),
            ClarityType::BoolFalse => ClarityValue::Bool(false),
            ClarityType::PrincipalStandard => {
                ClarityValue::Principal(PrincipalData::Standard(Address::decode(reader)?))
            }
            ClarityType::PrincipalContract => {
                let address = Address::decode(reader)?;
                let name = ContractName::decode(reader)?;
                ClarityValue::Principal(PrincipalData::Contract(address, name))
            }
            ClarityType::ResponseOk => ClarityValue::ok(Self::decode_at_depth(reader, depth + 1)?)?,
            ClarityType::ResponseErr => ClarityValue::err(Self::decode_at_depth(reader, depth + 1)?)?,
            ClarityType::OptionalNone => ClarityValue::OptionalNone,
            ClarityType::OptionalSome => ClarityValue::some(Self::decode_at_depth(reader, depth + 1)?)?,
            ClarityType::List => {
                let count = reader.read_u32()? as usize;
                if count > reader.remaining() {
                    return Err(CodecError::MalformedLength {
                        needed: count,
                        remaining: reader.remaining(),
                    });
                }
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(Self::decode_at_depth(reader, depth + 1)?);
                }
                ClarityValue::list(items)?
            }
            ClarityType::Tuple => {
                let count = reader.read_u32()? as usize;
                if count > reader.remaining() {
                    return Err(CodecError::MalformedLength {
                        needed: count,
                        remaining: reader.remaining(),
                    });
                }
                let mut tuple = TupleData::new();
                for _ in 0..count {
                    let name = ClarityName::decode(reader)?;
                    let value = Self::decode_at_depth(reader, depth + 1)?;
                    tuple.insert(name, value)?;
                }
                ClarityValue::Tuple(tuple)
            }
            ClarityType::StringAscii => {
                let bytes = decode_prefixed_bytes(reader, PrefixWidth::U32, usize::MAX)?;
                ClarityValue::StringAscii(AsciiString::from_bytes(bytes)?)
            }
            ClarityType::StringUtf8 => {
                let bytes = decode_prefixed_bytes(reader, PrefixWidth::U32, usize::MAX)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                ClarityValue::StringUtf8(s.to_string())
            }
        };
        Ok(value)
    }
}

fn is_clarity_ascii(b: u8) -> bool {
    b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

impl WireEncode for ClarityValue {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.type_tag().to_u8());
        match self {
            ClarityValue::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ClarityValue::UInt(v) => buf.extend_from_slice(&v.to_be_bytes()),
            ClarityValue::Bool(_) | ClarityValue::OptionalNone => {}
            ClarityValue::Buffer(bytes) => encode_prefixed_bytes(buf, PrefixWidth::U32, bytes),
            ClarityValue::Principal(PrincipalData::Standard(address)) => address.encode(buf),
            ClarityValue::Principal(PrincipalData::Contract(address, name)) => {
                address.encode(buf);
                name.encode(buf);
            }
            ClarityValue::OptionalSome(inner)
            | ClarityValue::ResponseOk(inner)
            | ClarityValue::ResponseErr(inner) => inner.value().encode(buf),
            ClarityValue::List(items) => {
                buf.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for item in items.iter() {
                    item.encode(buf);
                }
            }
            ClarityValue::Tuple(tuple) => {
                buf.extend_from_slice(&(tuple.len() as u32).to_be_bytes());
                for (name, value) in tuple.iter() {
                    name.encode(buf);
                    value.encode(buf);
                }
            }
            ClarityValue::StringAscii(s) => encode_prefixed_bytes(buf, PrefixWidth::U32, s.as_str().as_bytes()),
            ClarityValue::StringUtf8(s) => encode_prefixed_bytes(buf, PrefixWidth::U32, s.as_bytes()),
        }
    }
}

impl WireDecode for ClarityValue {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Self::decode_at_depth(reader, 0)
    }
}

impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClarityValue::Int(v) => write!(f, "{}", v),
            ClarityValue::UInt(v) => write!(f, "u{}", v),
            ClarityValue::Bool(v) => write!(f, "{}", v),
            ClarityValue::Buffer(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            ClarityValue::Principal(p) => write!(f, "'{}", p),
            ClarityValue::OptionalNone => f.write_str("none"),
            ClarityValue::OptionalSome(v) => write!(f, "(some {})", v.value()),
            ClarityValue::ResponseOk(v) => write!(f, "(ok {})", v.value()),
            ClarityValue::ResponseErr(v) => write!(f, "(err {})", v.value()),
            ClarityValue::List(items) => {
                f.write_str("(list")?;
                for item in items.iter() {
                    write!(f, " {}", item)?;
                }
                f.write_str(")")
            }
            ClarityValue::Tuple(tuple) => {
                f.write_str("(tuple")?;
                for (name, value) in tuple.iter() {
                    write!(f, " ({} {})", name, value)?;
                }
                f.write_str(")")
            }
            ClarityValue::StringAscii(s) => write!(f, "{:?}", s.as_str()),
            ClarityValue::StringUtf8(s) => write!(f, "u{:?}", s),
        }
    }
}

impl From<u128> for ClarityValue {
    fn from(v: u128) -> Self {
        ClarityValue::UInt(v)
    }
}

impl From<i128> for ClarityValue {
    fn from(v: i128) -> Self {
        ClarityValue::Int(v)
    }
}

impl From<bool> for ClarityValue {
    fn from(v: bool) -> Self {
        ClarityValue::Bool(v)
    }
}

impl From<PrincipalData> for ClarityValue {
    fn from(p: PrincipalData) -> Self {
        ClarityValue::Principal(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";

    fn roundtrip(value: &ClarityValue) {
        let bytes = value.to_bytes();
        let decoded = ClarityValue::from_bytes(&bytes).unwrap();
        assert_eq!(&decoded, value);
    }

    #[test]
    fn test_integer_layout() {
        assert_eq!(
            ClarityValue::UInt(42).to_hex(),
            "010000000000000000000000000000002a"
        );
        assert_eq!(
            ClarityValue::Int(-7).to_hex(),
            "00fffffffffffffffffffffffffffffff9"
        );
        roundtrip(&ClarityValue::Int(i128::MIN));
        roundtrip(&ClarityValue::UInt(u128::MAX));
    }

    #[test]
    fn test_principal_layout() {
        let value = ClarityValue::principal(RECIPIENT).unwrap();
        assert_eq!(
            value.to_hex(),
            "0516df0ba3e79792be7be5e50a370289accfc8c9e032"
        );
        let contract = ClarityValue::principal(&format!("{}.hello-world", RECIPIENT)).unwrap();
        let bytes = contract.to_bytes();
        assert_eq!(bytes[0], 0x06);
        assert_eq!(bytes[22], 11);
        roundtrip(&contract);
        assert_eq!(contract.to_string(), format!("'{}.hello-world", RECIPIENT));
    }

    #[test]
    fn test_tuple_preserves_insertion_order() {
        let value = ClarityValue::tuple([
            ("name", ClarityValue::string_ascii("bob").unwrap()),
            ("id", ClarityValue::UInt(1)),
        ])
        .unwrap();
        let bytes = value.to_bytes();
        // tag, count, then the first key as inserted
        assert_eq!(&bytes[..5], &[0x0c, 0, 0, 0, 2]);
        assert_eq!(&bytes[5..10], &[4, b'n', b'a', b'm', b'e']);
        roundtrip(&value);
    }

    #[test]
    fn test_tuple_rejects_duplicate_keys() {
        let err = ClarityValue::tuple([("a", ClarityValue::UInt(1)), ("a", ClarityValue::UInt(2))])
            .unwrap_err();
        assert_eq!(err, CodecError::DuplicateTupleKey("a".into()));

        // The same check applies to decoded input.
        let mut bytes = vec![0x0c, 0, 0, 0, 2];
        for _ in 0..2 {
            bytes.extend_from_slice(&[1, b'a', 0x03]);
        }
        assert!(matches!(
            ClarityValue::from_bytes(&bytes),
            Err(CodecError::DuplicateTupleKey(_))
        ));
    }

    #[test]
    fn test_nested_roundtrip() {
        let value = ClarityValue::list(vec![
            ClarityValue::some(ClarityValue::ok(ClarityValue::buffer(vec![0xde, 0xad]).unwrap()).unwrap()).unwrap(),
            ClarityValue::err(ClarityValue::OptionalNone).unwrap(),
            ClarityValue::tuple([
                ("flag", ClarityValue::Bool(false)),
                ("items", ClarityValue::list(vec![ClarityValue::Int(-1), ClarityValue::Int(1)]).unwrap()),
                ("memo", ClarityValue::string_utf8("héllo ✓").unwrap()),
            ])
            .unwrap(),
            ClarityValue::list(vec![]).unwrap(),
        ])
        .unwrap();
        assert_eq!(value.depth(), 3);
        roundtrip(&value);
    }

    fn nest_some(levels: usize) -> Result<ClarityValue, CodecError> {
        let mut value = ClarityValue::OptionalNone;
        for _ in 0..levels {
            value = ClarityValue::some(value)?;
        }
        Ok(value)
    }

    #[test]
    fn test_deepest_value_roundtrips() {
        let value = nest_some(MAX_VALUE_DEPTH).unwrap();
        assert_eq!(value.depth(), MAX_VALUE_DEPTH);
        roundtrip(&value);

        let mut list = ClarityValue::UInt(1);
        for _ in 0..MAX_VALUE_DEPTH {
            list = ClarityValue::list(vec![list]).unwrap();
        }
        roundtrip(&list);
    }

    #[test]
    fn test_too_deep_value_is_rejected_on_construction() {
        assert_eq!(
            nest_some(MAX_VALUE_DEPTH + 1).unwrap_err(),
            CodecError::DepthExceeded(MAX_VALUE_DEPTH)
        );

        let deepest = nest_some(MAX_VALUE_DEPTH).unwrap();
        assert!(ClarityValue::ok(deepest.clone()).is_err());
        assert!(ClarityValue::list(vec![ClarityValue::UInt(0), deepest.clone()]).is_err());
        assert!(ClarityValue::tuple([("x", deepest)]).is_err());

        // An empty container at the limit still fits.
        let mut value = ClarityValue::list(vec![]).unwrap();
        for _ in 0..MAX_VALUE_DEPTH {
            value = ClarityValue::some(value).unwrap();
        }
        roundtrip(&value);
    }

    #[test]
    fn test_large_bodies_roundtrip() {
        let buffer = ClarityValue::buffer(vec![0xab; 1024 * 1024 + 1]).unwrap();
        roundtrip(&buffer);

        let ascii = ClarityValue::string_ascii(&"a".repeat(1024 * 1024 + 1)).unwrap();
        roundtrip(&ascii);
    }

    #[test]
    fn test_ascii_whitespace_roundtrips() {
        let value = ClarityValue::string_ascii("tab\there\nline\r\n ~").unwrap();
        roundtrip(&value);
        assert!(value.to_hex().starts_with("0d00000011"));
    }

    #[test]
    fn test_unknown_type_tag() {
        assert_eq!(
            ClarityValue::from_bytes(&[0x0f]).unwrap_err(),
            CodecError::UnknownClarityType(0x0f)
        );
        assert_eq!(
            ClarityValue::from_bytes(&[0x0a, 0x42]).unwrap_err(),
            CodecError::UnknownClarityType(0x42)
        );
    }

    #[test]
    fn test_truncated_buffer() {
        let bytes = [0x02, 0, 0, 0, 8, 1, 2, 3];
        assert_eq!(
            ClarityValue::from_bytes(&bytes).unwrap_err(),
            CodecError::MalformedLength {
                needed: 8,
                remaining: 3
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut bytes = vec![0x0a; MAX_VALUE_DEPTH + 1];
        bytes.push(0x09);
        assert_eq!(
            ClarityValue::from_bytes(&bytes).unwrap_err(),
            CodecError::DepthExceeded(MAX_VALUE_DEPTH)
        );

        let mut ok = vec![0x0a; MAX_VALUE_DEPTH];
        ok.push(0x09);
        assert!(ClarityValue::from_bytes(&ok).is_ok());
    }

    #[test]
    fn test_ascii_validation() {
        assert_eq!(
            ClarityValue::string_ascii("héllo").unwrap_err(),
            CodecError::InvalidAscii
        );
        assert_eq!(
            ClarityValue::string_ascii("bell\x07").unwrap_err(),
            CodecError::InvalidAscii
        );
        assert_eq!(AsciiString::new("caf\u{e9}").unwrap_err(), CodecError::InvalidAscii);
        let bytes = [0x0d, 0, 0, 0, 1, 0x07];
        assert_eq!(
            ClarityValue::from_bytes(&bytes).unwrap_err(),
            CodecError::InvalidAscii
        );
    }

    #[test]
    fn test_display() {
        let value = ClarityValue::list(vec![
            ClarityValue::UInt(42),
            ClarityValue::Int(-7),
            ClarityValue::buffer(vec![0xde, 0xad, 0xbe, 0xef]).unwrap(),
            ClarityValue::some(ClarityValue::Bool(true)).unwrap(),
            ClarityValue::tuple([("name", ClarityValue::string_ascii("bob").unwrap())]).unwrap(),
            ClarityValue::string_utf8("hi").unwrap(),
        ])
        .unwrap();
        assert_eq!(
            value.to_string(),
            "(list u42 -7 0xdeadbeef (some true) (tuple (name \"bob\")) u\"hi\")"
        );
    }

    #[test]
    fn test_hex_helpers() {
        let value = ClarityValue::ok(ClarityValue::UInt(1)).unwrap();
        let hex = value.to_hex();
        assert_eq!(ClarityValue::from_hex(&format!("0x{}", hex)).unwrap(), value);
    }
}
