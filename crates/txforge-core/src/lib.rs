//! # txforge core
//!
//! Pure primitives for building Stacks-style transactions: the wire codec,
//! Clarity values, payloads, post-conditions, spending conditions and the
//! chained-sighash signer.
//!
//! This crate contains no I/O and no networking. Fee estimation and nonce
//! lookup live one layer up, in `txforge`.
//!
//! ## Key Types
//!
//! - [`Transaction`] - The envelope that is serialized, hashed and signed
//! - [`ClarityValue`] - Typed contract-call arguments
//! - [`Payload`] - What the transaction does
//! - [`SpendingCondition`] / [`TransactionAuth`] - Who may spend, and how
//! - [`TransactionSigner`] - Appends signatures over the running sighash
//!
//! ## Wire Format
//!
//! Every structure implements [`WireEncode`] and [`WireDecode`]; integers are
//! big-endian and layouts are bit-exact with the chain. See [`wire`].

pub mod address;
pub mod auth;
pub mod c32;
pub mod clarity;
pub mod crypto;
pub mod error;
pub mod multisig;
pub mod names;
pub mod network;
pub mod payload;
pub mod post_condition;
pub mod signer;
pub mod transaction;
pub mod types;
pub mod wire;

pub use address::{public_keys_to_address_hash, Address, AddressHashMode};
pub use auth::{
    create_multi_sig_condition, create_single_sig_condition, is_single_sig, AuthFlag,
    MultiSigSpendingCondition, SingleSigSpendingCondition, SpendingCondition, TransactionAuth,
    TransactionAuthField,
};
pub use clarity::{AsciiString, ClarityType, ClarityValue, ListData, Nested, PrincipalData, TupleData};
pub use crypto::{Hash160, KeyEncoding, MessageSignature, PrivateKey, PublicKey, Sha512Trunc256Sum};
pub use error::{CodecError, TxError};
pub use multisig::{resolve_key_order, sign_in_key_order, KeyOrder};
pub use names::{ClarityName, ContractName};
pub use network::{Network, NetworkKind};
pub use payload::{ClarityVersion, MicroblockHeader, Payload, PayloadType, TenureChangeCause};
pub use post_condition::{
    AssetInfo, FungibleConditionCode, NonfungibleConditionCode, PostCondition, PostConditionPrincipal,
};
pub use signer::{SigningState, TransactionSigner};
pub use transaction::Transaction;
pub use types::{AnchorMode, PostConditionMode, TransactionVersion, Txid};
pub use wire::{ByteReader, MemoString, WireDecode, WireEncode};
