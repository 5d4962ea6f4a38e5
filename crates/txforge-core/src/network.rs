//! Network parameter sets.
//!
//! A [`Network`] is an explicit value passed to whatever needs chain
//! parameters; there is no process-wide default.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::{
    AddressHashMode, C32_ADDRESS_VERSION_MAINNET_MULTISIG, C32_ADDRESS_VERSION_MAINNET_SINGLESIG,
    C32_ADDRESS_VERSION_TESTNET_MULTISIG, C32_ADDRESS_VERSION_TESTNET_SINGLESIG,
};
use crate::types::TransactionVersion;

pub const CHAIN_ID_MAINNET: u32 = 0x0000_0001;
pub const CHAIN_ID_TESTNET: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Mainnet,
    Testnet,
    Devnet,
}

/// Chain parameters used when building and addressing transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub kind: NetworkKind,
    pub transaction_version: TransactionVersion,
    pub chain_id: u32,
    /// c32 version for single-sig addresses.
    pub single_sig_version: u8,
    /// c32 version for multi-sig addresses.
    pub multi_sig_version: u8,
}

impl Network {
    pub fn mainnet() -> Self {
        Self {
            kind: NetworkKind::Mainnet,
            transaction_version: TransactionVersion::Mainnet,
            chain_id: CHAIN_ID_MAINNET,
            single_sig_version: C32_ADDRESS_VERSION_MAINNET_SINGLESIG,
            multi_sig_version: C32_ADDRESS_VERSION_MAINNET_MULTISIG,
        }
    }

    pub fn testnet() -> Self {
        Self {
            kind: NetworkKind::Testnet,
            transaction_version: TransactionVersion::Testnet,
            chain_id: CHAIN_ID_TESTNET,
            single_sig_version: C32_ADDRESS_VERSION_TESTNET_SINGLESIG,
            multi_sig_version: C32_ADDRESS_VERSION_TESTNET_MULTISIG,
        }
    }

    /// A local development chain; shares the testnet parameters.
    pub fn devnet() -> Self {
        Self {
            kind: NetworkKind::Devnet,
            ..Self::testnet()
        }
    }

    pub fn from_kind(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::Mainnet => Self::mainnet(),
            NetworkKind::Testnet => Self::testnet(),
            NetworkKind::Devnet => Self::devnet(),
        }
    }

    /// The address version byte for a spending condition's hash mode.
    pub fn address_version(&self, hash_mode: AddressHashMode) -> u8 {
        if hash_mode.is_single_sig() {
            self.single_sig_version
        } else {
            self.multi_sig_version
        }
    }

    /// Map a transaction version to the matching public network.
    pub fn for_transaction_version(version: TransactionVersion) -> Self {
        match version {
            TransactionVersion::Mainnet => Self::mainnet(),
            TransactionVersion::Testnet => Self::testnet(),
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkKind::Mainnet => "mainnet",
            NetworkKind::Testnet => "testnet",
            NetworkKind::Devnet => "devnet",
        };
        f.write_str(name)
    }
}
