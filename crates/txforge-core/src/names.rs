//! Contract and Clarity identifiers.
//!
//! Both are written as a 1-byte length prefix followed by ASCII bytes and
//! are validated on construction and on decode.

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;
use crate::wire::{decode_prefixed_bytes, encode_prefixed_bytes, ByteReader, PrefixWidth, WireDecode, WireEncode};

/// Longest identifier accepted on the wire.
pub const MAX_IDENTIFIER_LEN: usize = 128;

fn is_clarity_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes {
        [] => false,
        [b'-' | b'+' | b'=' | b'/' | b'*'] => true,
        [b'<' | b'>'] | [b'<' | b'>', b'='] => true,
        [first, rest @ ..] => {
            first.is_ascii_alphabetic()
                && rest.iter().all(|c| {
                    c.is_ascii_alphanumeric()
                        || matches!(c, b'-' | b'_' | b'!' | b'?' | b'+' | b'<' | b'>' | b'=' | b'/' | b'*')
                })
        }
    }
}

fn is_contract_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes {
        [first, rest @ ..] => {
            first.is_ascii_alphabetic()
                && rest
                    .iter()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_'))
        }
        [] => false,
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $check:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: &str) -> Result<Self, CodecError> {
                if s.len() > MAX_IDENTIFIER_LEN {
                    return Err(CodecError::ValueTooLong {
                        len: s.len(),
                        max: MAX_IDENTIFIER_LEN,
                    });
                }
                if !$check(s) {
                    return Err(CodecError::InvalidIdentifier(s.to_string()));
                }
                Ok(Self(s.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl FromStr for $name {
            type Err = CodecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl WireEncode for $name {
            fn encode(&self, buf: &mut Vec<u8>) {
                encode_prefixed_bytes(buf, PrefixWidth::U8, self.0.as_bytes());
            }
        }

        impl WireDecode for $name {
            fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
                let bytes = decode_prefixed_bytes(reader, PrefixWidth::U8, MAX_IDENTIFIER_LEN)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Self::new(s)
            }
        }
    };
}

identifier!(
    /// A contract name: a letter followed by letters, digits, `-` or `_`.
    ContractName,
    is_contract_name
);

identifier!(
    /// A Clarity identifier: function names, tuple keys and asset names.
    ClarityName,
    is_clarity_name
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["hello-world", "a", "set-value", "is-ok?", "transfer!", "+", "<=", ">", "map_get"] {
            assert!(ClarityName::new(name).is_ok(), "{}", name);
        }
        for name in ["hello-world", "token_v2", "A1"] {
            assert!(ContractName::new(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1abc", "-x", "has space", "<<", "é"] {
            assert!(
                matches!(ClarityName::new(name), Err(CodecError::InvalidIdentifier(_))),
                "{}",
                name
            );
        }
        for name in ["", "hello?", "9lives", "dot.name"] {
            assert!(
                matches!(ContractName::new(name), Err(CodecError::InvalidIdentifier(_))),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_name_length_limit() {
        let ok = "a".repeat(MAX_IDENTIFIER_LEN);
        assert!(ContractName::new(&ok).is_ok());
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert_eq!(
            ClarityName::new(&long).unwrap_err(),
            CodecError::ValueTooLong { len: 129, max: 128 }
        );
    }

    #[test]
    fn test_name_wire_form() {
        let name = ContractName::new("hello-world").unwrap();
        let bytes = name.to_bytes();
        assert_eq!(bytes[0], 11);
        assert_eq!(&bytes[1..], b"hello-world");
        assert_eq!(ContractName::from_bytes(&bytes).unwrap(), name);
    }

    #[test]
    fn test_decode_rejects_invalid_identifier() {
        let bytes = [3, b'1', b'a', b'b'];
        assert!(matches!(
            ClarityName::from_bytes(&bytes),
            Err(CodecError::InvalidIdentifier(_))
        ));
    }
}
