//! Post-conditions: asset-movement guarantees attached to a transaction.

use crate::address::Address;
use crate::clarity::ClarityValue;
use crate::error::CodecError;
use crate::names::{ClarityName, ContractName};
use crate::wire::{ByteReader, WireDecode, WireEncode};

/// The principal whose assets a post-condition constrains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostConditionPrincipal {
    /// Whoever ends up as the transaction origin.
    Origin,
    Standard(Address),
    Contract(Address, ContractName),
}

impl WireEncode for PostConditionPrincipal {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            PostConditionPrincipal::Origin => buf.push(0x01),
            PostConditionPrincipal::Standard(address) => {
                buf.push(0x02);
                address.encode(buf);
            }
            PostConditionPrincipal::Contract(address, name) => {
                buf.push(0x03);
                address.encode(buf);
                name.encode(buf);
            }
        }
    }
}

impl WireDecode for PostConditionPrincipal {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0x01 => Ok(PostConditionPrincipal::Origin),
            0x02 => Ok(PostConditionPrincipal::Standard(Address::decode(reader)?)),
            0x03 => {
                let address = Address::decode(reader)?;
                let name = ContractName::decode(reader)?;
                Ok(PostConditionPrincipal::Contract(address, name))
            }
            tag => Err(CodecError::UnknownTag {
                kind: "post-condition principal",
                tag,
            }),
        }
    }
}

/// Identifies a fungible or non-fungible asset: `contract::asset-name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub contract_address: Address,
    pub contract_name: ContractName,
    pub asset_name: ClarityName,
}

impl AssetInfo {
    pub fn new(contract_address: Address, contract_name: &str, asset_name: &str) -> Result<Self, CodecError> {
        Ok(Self {
            contract_address,
            contract_name: ContractName::new(contract_name)?,
            asset_name: ClarityName::new(asset_name)?,
        })
    }
}

impl WireEncode for AssetInfo {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.contract_address.encode(buf);
        self.contract_name.encode(buf);
        self.asset_name.encode(buf);
    }
}

impl WireDecode for AssetInfo {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            contract_address: Address::decode(reader)?,
            contract_name: ContractName::decode(reader)?,
            asset_name: ClarityName::decode(reader)?,
        })
    }
}

/// Comparison applied to STX and fungible-token amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FungibleConditionCode {
    SentEq = 0x01,
    SentGt = 0x02,
    SentGe = 0x03,
    SentLt = 0x04,
    SentLe = 0x05,
}

impl FungibleConditionCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::SentEq),
            0x02 => Some(Self::SentGt),
            0x03 => Some(Self::SentGe),
            0x04 => Some(Self::SentLt),
            0x05 => Some(Self::SentLe),
            _ => None,
        }
    }

    /// Whether sending `sent` satisfies the condition against `amount`.
    pub fn check(self, amount: u64, sent: u64) -> bool {
        match self {
            Self::SentEq => sent == amount,
            Self::SentGt => sent > amount,
            Self::SentGe => sent >= amount,
            Self::SentLt => sent < amount,
            Self::SentLe => sent <= amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NonfungibleConditionCode {
    Sent = 0x10,
    NotSent = 0x11,
}

impl NonfungibleConditionCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x10 => Some(Self::Sent),
            0x11 => Some(Self::NotSent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCondition {
    Stx {
        principal: PostConditionPrincipal,
        code: FungibleConditionCode,
        amount: u64,
    },
    Fungible {
        principal: PostConditionPrincipal,
        asset: AssetInfo,
        code: FungibleConditionCode,
        amount: u64,
    },
    Nonfungible {
        principal: PostConditionPrincipal,
        asset: AssetInfo,
        asset_value: ClarityValue,
        code: NonfungibleConditionCode,
    },
}

impl PostCondition {
    pub fn stx(principal: PostConditionPrincipal, code: FungibleConditionCode, amount: u64) -> Self {
        PostCondition::Stx { principal, code, amount }
    }

    pub fn fungible(
        principal: PostConditionPrincipal,
        asset: AssetInfo,
        code: FungibleConditionCode,
        amount: u64,
    ) -> Self {
        PostCondition::Fungible {
            principal,
            asset,
            code,
            amount,
        }
    }

    pub fn nonfungible(
        principal: PostConditionPrincipal,
        asset: AssetInfo,
        asset_value: ClarityValue,
        code: NonfungibleConditionCode,
    ) -> Self {
        PostCondition::Nonfungible {
            principal,
            asset,
            asset_value,
            code,
        }
    }

    pub fn principal(&self) -> &PostConditionPrincipal {
        match self {
            PostCondition::Stx { principal, .. }
            | PostCondition::Fungible { principal, .. }
            | PostCondition::Nonfungible { principal, .. } => principal,
        }
    }
}

impl WireEncode for PostCondition {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            PostCondition::Stx { principal, code, amount } => {
                buf.push(0x00);
                principal.encode(buf);
                buf.push(*code as u8);
                buf.extend_from_slice(&amount.to_be_bytes());
            }
            PostCondition::Fungible {
                principal,
                asset,
                code,
                amount,
            } => {
                buf.push(0x01);
                principal.encode(buf);
                asset.encode(buf);
                buf.push(*code as u8);
                buf.extend_from_slice(&amount.to_be_bytes());
            }
            PostCondition::Nonfungible {
                principal,
                asset,
                asset_value,
                code,
            } => {
                buf.push(0x02);
                principal.encode(buf);
                asset.encode(buf);
                asset_value.encode(buf);
                buf.push(*code as u8);
            }
        }
    }
}

fn fungible_code(reader: &mut ByteReader<'_>) -> Result<FungibleConditionCode, CodecError> {
    let tag = reader.read_u8()?;
    FungibleConditionCode::from_u8(tag).ok_or(CodecError::UnknownTag {
        kind: "fungible condition code",
        tag,
    })
}

impl WireDecode for PostCondition {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0x00 => Ok(PostCondition::Stx {
                principal: PostConditionPrincipal::decode(reader)?,
                code: fungible_code(reader)?,
                amount: reader.read_u64()?,
            }),
            0x01 => Ok(PostCondition::Fungible {
                principal: PostConditionPrincipal::decode(reader)?,
                asset: AssetInfo::decode(reader)?,
                code: fungible_code(reader)?,
                amount: reader.read_u64()?,
            }),
            0x02 => {
                let principal = PostConditionPrincipal::decode(reader)?;
                let asset = AssetInfo::decode(reader)?;
                let asset_value = ClarityValue::decode(reader)?;
                let tag = reader.read_u8()?;
                let code = NonfungibleConditionCode::from_u8(tag).ok_or(CodecError::UnknownTag {
                    kind: "non-fungible condition code",
                    tag,
                })?;
                Ok(PostCondition::Nonfungible {
                    principal,
                    asset,
                    asset_value,
                    code,
                })
            }
            tag => Err(CodecError::UnknownTag {
                kind: "asset info id",
                tag,
            }),
        }
    }
}
