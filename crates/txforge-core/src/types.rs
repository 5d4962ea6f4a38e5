//! Strong type definitions shared across the transaction model.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Sha512Trunc256Sum;

/// A transaction identifier: SHA-512/256 over the serialized transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Txid(pub [u8; 32]);

impl Txid {
    /// Hash a serialized transaction.
    pub fn from_transaction_bytes(bytes: &[u8]) -> Self {
        Self(Sha512Trunc256Sum::from_data(bytes).0)
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Txid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Sha512Trunc256Sum> for Txid {
    fn from(hash: Sha512Trunc256Sum) -> Self {
        Self(hash.0)
    }
}

impl TryFrom<&[u8]> for Txid {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// Transaction version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TransactionVersion {
    Mainnet = 0x00,
    Testnet = 0x80,
}

impl TransactionVersion {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(TransactionVersion::Mainnet),
            0x80 => Some(TransactionVersion::Testnet),
            _ => None,
        }
    }
}

/// Where a transaction may be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AnchorMode {
    OnChainOnly = 1,
    OffChainOnly = 2,
    #[default]
    Any = 3,
}

impl AnchorMode {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AnchorMode::OnChainOnly),
            2 => Some(AnchorMode::OffChainOnly),
            3 => Some(AnchorMode::Any),
            _ => None,
        }
    }
}

/// Whether asset movements not covered by post-conditions are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PostConditionMode {
    Allow = 1,
    #[default]
    Deny = 2,
}

impl PostConditionMode {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(PostConditionMode::Allow),
            2 => Some(PostConditionMode::Deny),
            _ => None,
        }
    }
}
