//! Error types for txforge core.

use thiserror::Error;

/// Errors raised while constructing or decoding wire structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed length: needed {needed} bytes, {remaining} remaining")]
    MalformedLength { needed: usize, remaining: usize },

    #[error("unknown clarity type tag: 0x{0:02x}")]
    UnknownClarityType(u8),

    #[error("value too long: {len} bytes exceeds maximum of {max}")]
    ValueTooLong { len: usize, max: usize },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("unknown {kind} tag: 0x{tag:02x}")]
    UnknownTag { kind: &'static str, tag: u8 },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid utf-8 string")]
    InvalidUtf8,

    #[error("invalid ascii string")]
    InvalidAscii,

    #[error("duplicate tuple key: {0}")]
    DuplicateTupleKey(String),

    #[error("clarity value nested deeper than {0}")]
    DepthExceeded(usize),

    #[error("{0} trailing bytes after end of structure")]
    TrailingBytes(usize),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("malformed: {0}")]
    Malformed(String),
}

/// Errors raised by authorization, signing and verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("multi-sig is not supported for {0} transactions")]
    UnsupportedMultiSig(String),

    #[error("public keys do not reproduce the multi-sig address in any supported order")]
    AddressKeyMismatch,

    #[error("hash mode does not match the spending condition kind")]
    HashModeMismatch,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid multi-sig configuration: {0}")]
    InvalidMultiSig(String),

    #[error("transaction is not sponsored")]
    NotSponsored,

    #[error("origin must be fully signed before the sponsor signs")]
    OriginNotSigned,

    #[error("spending condition already carries its {required} required signatures")]
    TooManySignatures { required: usize },

    #[error("key has already signed this spending condition")]
    DuplicateSigner,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("verification failed: {0}")]
    Verification(String),
}
