//! Transaction payloads.
//!
//! Each variant is built through a validating constructor and written as a
//! one-byte payload tag followed by its fields in declared order.

use std::fmt;

use crate::address::Address;
use crate::clarity::{ClarityType, ClarityValue, PrincipalData};
use crate::crypto::{Hash160, MessageSignature};
use crate::error::CodecError;
use crate::names::{ClarityName, ContractName, MAX_IDENTIFIER_LEN};
use crate::wire::{
    decode_list, encode_list, ByteReader, LengthPrefixedString, MemoString, PrefixWidth,
    WireDecode, WireEncode,
};

/// Largest contract body, model parameter blob or inference string.
pub const MAX_STRING_BODY_LEN: usize = 2 * 1024 * 1024;

/// Length of a VRF proof carried by a Nakamoto coinbase.
pub const VRF_PROOF_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadType {
    TokenTransfer = 0x00,
    SmartContract = 0x01,
    ContractCall = 0x02,
    PoisonMicroblock = 0x03,
    Coinbase = 0x04,
    CoinbaseToAltRecipient = 0x05,
    VersionedSmartContract = 0x06,
    TenureChange = 0x07,
    NakamotoCoinbase = 0x08,
    InferTask = 0x09,
    RegisterModel = 0x0a,
}

impl PayloadType {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x00 => Self::TokenTransfer,
            0x01 => Self::SmartContract,
            0x02 => Self::ContractCall,
            0x03 => Self::PoisonMicroblock,
            0x04 => Self::Coinbase,
            0x05 => Self::CoinbaseToAltRecipient,
            0x06 => Self::VersionedSmartContract,
            0x07 => Self::TenureChange,
            0x08 => Self::NakamotoCoinbase,
            0x09 => Self::InferTask,
            0x0a => Self::RegisterModel,
            _ => return None,
        })
    }

    /// Whether transactions carrying this payload can be multi-sig.
    pub fn supports_multi_sig(self) -> bool {
        !matches!(self, Self::InferTask | Self::RegisterModel)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TokenTransfer => "token-transfer",
            Self::SmartContract => "smart-contract",
            Self::ContractCall => "contract-call",
            Self::PoisonMicroblock => "poison-microblock",
            Self::Coinbase => "coinbase",
            Self::CoinbaseToAltRecipient => "coinbase-to-alt-recipient",
            Self::VersionedSmartContract => "versioned-smart-contract",
            Self::TenureChange => "tenure-change",
            Self::NakamotoCoinbase => "nakamoto-coinbase",
            Self::InferTask => "infer-task",
            Self::RegisterModel => "register-model",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClarityVersion {
    Clarity1 = 1,
    Clarity2 = 2,
    Clarity3 = 3,
}

impl ClarityVersion {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Clarity1),
            2 => Some(Self::Clarity2),
            3 => Some(Self::Clarity3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferPayload {
    pub recipient: PrincipalData,
    pub amount: u64,
    pub memo: MemoString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallPayload {
    pub contract_address: Address,
    pub contract_name: ContractName,
    pub function_name: ClarityName,
    pub function_args: Vec<ClarityValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartContractPayload {
    pub name: ContractName,
    pub code_body: LengthPrefixedString,
}

/// A microblock header, as carried by poison-microblock evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicroblockHeader {
    pub version: u8,
    pub sequence: u16,
    pub prev_block: [u8; 32],
    pub tx_merkle_root: [u8; 32],
    pub signature: MessageSignature,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoinbasePayload(pub [u8; 32]);

impl fmt::Debug for CoinbasePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coinbase({})", &hex::encode(self.0)[..16])
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct VrfProof(pub [u8; VRF_PROOF_LEN]);

impl fmt::Debug for VrfProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VrfProof({}...)", &hex::encode(self.0)[..16])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TenureChangeCause {
    BlockFound = 0,
    Extended = 1,
}

impl TenureChangeCause {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::BlockFound),
            1 => Some(Self::Extended),
            _ => None,
        }
    }

    fn try_from_u8(tag: u8) -> Result<Self, CodecError> {
        Self::from_u8(tag).ok_or(CodecError::UnknownTag {
            kind: "tenure change cause",
            tag,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenureChangePayload {
    pub tenure_consensus_hash: [u8; 20],
    pub prev_tenure_consensus_hash: [u8; 20],
    pub burn_view_consensus_hash: [u8; 20],
    pub previous_tenure_end: [u8; 32],
    pub previous_tenure_blocks: u32,
    pub cause: TenureChangeCause,
    pub pubkey_hash: Hash160,
}

/// A request for a registered node to run inference on a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferTaskPayload {
    pub user: PrincipalData,
    pub amount: u64,
    pub input: LengthPrefixedString,
    pub context: LengthPrefixedString,
    pub node: PrincipalData,
    pub model_name: LengthPrefixedString,
}

/// Registration of a model and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterModelPayload {
    pub model_name: LengthPrefixedString,
    pub model_params: LengthPrefixedString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    TokenTransfer(TokenTransferPayload),
    ContractCall(ContractCallPayload),
    SmartContract(SmartContractPayload, Option<ClarityVersion>),
    PoisonMicroblock(MicroblockHeader, MicroblockHeader),
    Coinbase(CoinbasePayload),
    CoinbaseToAltRecipient(CoinbasePayload, PrincipalData),
    NakamotoCoinbase(CoinbasePayload, Option<PrincipalData>, VrfProof),
    TenureChange(TenureChangePayload),
    InferTask(InferTaskPayload),
    RegisterModel(RegisterModelPayload),
}

fn model_name(name: &str) -> Result<LengthPrefixedString, CodecError> {
    LengthPrefixedString::new(name, PrefixWidth::U8, MAX_IDENTIFIER_LEN)
}

fn long_string(s: &str) -> Result<LengthPrefixedString, CodecError> {
    LengthPrefixedString::new(s, PrefixWidth::U32, MAX_STRING_BODY_LEN)
}

impl Payload {
    pub fn token_transfer(recipient: PrincipalData, amount: u64, memo: &str) -> Result<Self, CodecError> {
        Ok(Payload::TokenTransfer(TokenTransferPayload {
            recipient,
            amount,
            memo: MemoString::new(memo)?,
        }))
    }

    pub fn contract_call(
        contract_address: Address,
        contract_name: &str,
        function_name: &str,
        function_args: Vec<ClarityValue>,
    ) -> Result<Self, CodecError> {
        Ok(Payload::ContractCall(ContractCallPayload {
            contract_address,
            contract_name: ContractName::new(contract_name)?,
            function_name: ClarityName::new(function_name)?,
            function_args,
        }))
    }

    /// A contract deploy; `Some(version)` selects the versioned encoding.
    pub fn smart_contract(
        name: &str,
        code_body: &str,
        clarity_version: Option<ClarityVersion>,
    ) -> Result<Self, CodecError> {
        Ok(Payload::SmartContract(
            SmartContractPayload {
                name: ContractName::new(name)?,
                code_body: long_string(code_body)?,
            },
            clarity_version,
        ))
    }

    pub fn infer_task(
        user: PrincipalData,
        amount: u64,
        input: &str,
        context: &str,
        node: PrincipalData,
        model: &str,
    ) -> Result<Self, CodecError> {
        Ok(Payload::InferTask(InferTaskPayload {
            user,
            amount,
            input: long_string(input)?,
            context: long_string(context)?,
            node,
            model_name: model_name(model)?,
        }))
    }

    pub fn register_model(name: &str, params: &str) -> Result<Self, CodecError> {
        Ok(Payload::RegisterModel(RegisterModelPayload {
            model_name: model_name(name)?,
            model_params: long_string(params)?,
        }))
    }

    pub fn coinbase(buffer: [u8; 32]) -> Self {
        Payload::Coinbase(CoinbasePayload(buffer))
    }

    /// Evidence that two microblocks were signed at the same sequence.
    pub fn poison_microblock(first: MicroblockHeader, second: MicroblockHeader) -> Self {
        Payload::PoisonMicroblock(first, second)
    }

    pub fn coinbase_to_alt_recipient(buffer: [u8; 32], recipient: PrincipalData) -> Self {
        Payload::CoinbaseToAltRecipient(CoinbasePayload(buffer), recipient)
    }

    pub fn nakamoto_coinbase(buffer: [u8; 32], recipient: Option<PrincipalData>, proof: [u8; VRF_PROOF_LEN]) -> Self {
        Payload::NakamotoCoinbase(CoinbasePayload(buffer), recipient, VrfProof(proof))
    }

    /// A tenure change; `cause` must be 0 (block found) or 1 (extended).
    pub fn tenure_change(
        tenure_consensus_hash: [u8; 20],
        prev_tenure_consensus_hash: [u8; 20],
        burn_view_consensus_hash: [u8; 20],
        previous_tenure_end: [u8; 32],
        previous_tenure_blocks: u32,
        cause: u8,
        pubkey_hash: Hash160,
    ) -> Result<Self, CodecError> {
        Ok(Payload::TenureChange(TenureChangePayload {
            tenure_consensus_hash,
            prev_tenure_consensus_hash,
            burn_view_consensus_hash,
            previous_tenure_end,
            previous_tenure_blocks,
            cause: TenureChangeCause::try_from_u8(cause)?,
            pubkey_hash,
        }))
    }

    pub fn payload_type(&self) -> PayloadType {
        match self {
            Payload::TokenTransfer(_) => PayloadType::TokenTransfer,
            Payload::ContractCall(_) => PayloadType::ContractCall,
            Payload::SmartContract(_, None) => PayloadType::SmartContract,
            Payload::SmartContract(_, Some(_)) => PayloadType::VersionedSmartContract,
            Payload::PoisonMicroblock(..) => PayloadType::PoisonMicroblock,
            Payload::Coinbase(_) => PayloadType::Coinbase,
            Payload::CoinbaseToAltRecipient(..) => PayloadType::CoinbaseToAltRecipient,
            Payload::NakamotoCoinbase(..) => PayloadType::NakamotoCoinbase,
            Payload::TenureChange(_) => PayloadType::TenureChange,
            Payload::InferTask(_) => PayloadType::InferTask,
            Payload::RegisterModel(_) => PayloadType::RegisterModel,
        }
    }
}

impl WireEncode for MicroblockHeader {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.version);
        buf.extend_from_slice(&self.sequence.to_be_bytes());
        buf.extend_from_slice(&self.prev_block);
        buf.extend_from_slice(&self.tx_merkle_root);
        self.signature.encode(buf);
    }
}

impl WireDecode for MicroblockHeader {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            version: reader.read_u8()?,
            sequence: reader.read_u16()?,
            prev_block: reader.read_array()?,
            tx_merkle_root: reader.read_array()?,
            signature: MessageSignature::decode(reader)?,
        })
    }
}

impl WireEncode for TenureChangePayload {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.tenure_consensus_hash);
        buf.extend_from_slice(&self.prev_tenure_consensus_hash);
        buf.extend_from_slice(&self.burn_view_consensus_hash);
        buf.extend_from_slice(&self.previous_tenure_end);
        buf.extend_from_slice(&self.previous_tenure_blocks.to_be_bytes());
        buf.push(self.cause as u8);
        self.pubkey_hash.encode(buf);
    }
}

impl WireDecode for TenureChangePayload {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tenure_consensus_hash = reader.read_array()?;
        let prev_tenure_consensus_hash = reader.read_array()?;
        let burn_view_consensus_hash = reader.read_array()?;
        let previous_tenure_end = reader.read_array()?;
        let previous_tenure_blocks = reader.read_u32()?;
        let cause = TenureChangeCause::try_from_u8(reader.read_u8()?)?;
        Ok(Self {
            tenure_consensus_hash,
            prev_tenure_consensus_hash,
            burn_view_consensus_hash,
            previous_tenure_end,
            previous_tenure_blocks,
            cause,
            pubkey_hash: Hash160::decode(reader)?,
        })
    }
}

impl WireEncode for Payload {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.payload_type().to_u8());
        match self {
            Payload::TokenTransfer(transfer) => {
                transfer.recipient.encode(buf);
                buf.extend_from_slice(&transfer.amount.to_be_bytes());
                transfer.memo.encode(buf);
            }
            Payload::ContractCall(call) => {
                call.contract_address.encode(buf);
                call.contract_name.encode(buf);
                call.function_name.encode(buf);
                encode_list(buf, PrefixWidth::U32, &call.function_args);
            }
            Payload::SmartContract(contract, version) => {
                if let Some(version) = version {
                    buf.push(*version as u8);
                }
                contract.name.encode(buf);
                contract.code_body.encode(buf);
            }
            Payload::PoisonMicroblock(first, second) => {
                first.encode(buf);
                second.encode(buf);
            }
            Payload::Coinbase(coinbase) => buf.extend_from_slice(&coinbase.0),
            Payload::CoinbaseToAltRecipient(coinbase, recipient) => {
                buf.extend_from_slice(&coinbase.0);
                recipient.encode(buf);
            }
            Payload::NakamotoCoinbase(coinbase, recipient, proof) => {
                buf.extend_from_slice(&coinbase.0);
                match recipient {
                    Some(recipient) => {
                        buf.push(ClarityType::OptionalSome.to_u8());
                        ClarityValue::Principal(recipient.clone()).encode(buf);
                    }
                    None => ClarityValue::OptionalNone.encode(buf),
                }
                buf.extend_from_slice(&proof.0);
            }
            Payload::TenureChange(tenure) => tenure.encode(buf),
            Payload::InferTask(task) => {
                task.user.encode(buf);
                buf.extend_from_slice(&task.amount.to_be_bytes());
                task.input.encode(buf);
                task.context.encode(buf);
                task.node.encode(buf);
                task.model_name.encode(buf);
            }
            Payload::RegisterModel(model) => {
                model.model_name.encode(buf);
                model.model_params.encode(buf);
            }
        }
    }
}

impl WireDecode for Payload {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = reader.read_u8()?;
        let kind = PayloadType::from_u8(tag).ok_or(CodecError::UnknownTag { kind: "payload", tag })?;

        let payload = match kind {
            PayloadType::TokenTransfer => Payload::TokenTransfer(TokenTransferPayload {
                recipient: PrincipalData::decode(reader)?,
                amount: reader.read_u64()?,
                memo: MemoString::decode(reader)?,
            }),
            PayloadType::ContractCall => Payload::ContractCall(ContractCallPayload {
                contract_address: Address::decode(reader)?,
                contract_name: ContractName::decode(reader)?,
                function_name: ClarityName::decode(reader)?,
                function_args: decode_list(reader, PrefixWidth::U32)?,
            }),
            PayloadType::SmartContract | PayloadType::VersionedSmartContract => {
                let version = if kind == PayloadType::VersionedSmartContract {
                    let tag = reader.read_u8()?;
                    Some(ClarityVersion::from_u8(tag).ok_or(CodecError::UnknownTag {
                        kind: "clarity version",
                        tag,
                    })?)
                } else {
                    None
                };
                let contract = SmartContractPayload {
                    name: ContractName::decode(reader)?,
                    code_body: LengthPrefixedString::decode_with(reader, PrefixWidth::U32, MAX_STRING_BODY_LEN)?,
                };
                Payload::SmartContract(contract, version)
            }
            PayloadType::PoisonMicroblock => {
                Payload::PoisonMicroblock(MicroblockHeader::decode(reader)?, MicroblockHeader::decode(reader)?)
            }
            PayloadType::Coinbase => Payload::Coinbase(CoinbasePayload(reader.read_array()?)),
            PayloadType::CoinbaseToAltRecipient => Payload::CoinbaseToAltRecipient(
                CoinbasePayload(reader.read_array()?),
                PrincipalData::decode(reader)?,
            ),
            PayloadType::NakamotoCoinbase => {
                let coinbase = CoinbasePayload(reader.read_array()?);
                let recipient = match ClarityValue::decode(reader)? {
                    ClarityValue::OptionalNone => None,
                    ClarityValue::OptionalSome(inner) => match inner.into_inner() {
                        ClarityValue::Principal(p) => Some(p),
                        other => {
                            return Err(CodecError::Malformed(format!(
                                "coinbase recipient is not a principal: {}",
                                other
                            )))
                        }
                    },
                    other => {
                        return Err(CodecError::Malformed(format!(
                            "coinbase recipient is not optional: {}",
                            other
                        )))
                    }
                };
                let proof = VrfProof(reader.read_array()?);
                Payload::NakamotoCoinbase(coinbase, recipient, proof)
            }
            PayloadType::TenureChange => Payload::TenureChange(TenureChangePayload::decode(reader)?),
            PayloadType::InferTask => Payload::InferTask(InferTaskPayload {
                user: PrincipalData::decode(reader)?,
                amount: reader.read_u64()?,
                input: LengthPrefixedString::decode_with(reader, PrefixWidth::U32, MAX_STRING_BODY_LEN)?,
                context: LengthPrefixedString::decode_with(reader, PrefixWidth::U32, MAX_STRING_BODY_LEN)?,
                node: PrincipalData::decode(reader)?,
                model_name: LengthPrefixedString::decode_with(reader, PrefixWidth::U8, MAX_IDENTIFIER_LEN)?,
            }),
            PayloadType::RegisterModel => Payload::RegisterModel(RegisterModelPayload {
                model_name: LengthPrefixedString::decode_with(reader, PrefixWidth::U8, MAX_IDENTIFIER_LEN)?,
                model_params: LengthPrefixedString::decode_with(reader, PrefixWidth::U32, MAX_STRING_BODY_LEN)?,
            }),
        };
        Ok(payload)
    }
}
