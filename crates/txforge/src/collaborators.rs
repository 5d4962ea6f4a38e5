//! External collaborators: fee estimation and nonce lookup.
//!
//! Both are async request/response calls owned by the caller. The builder
//! only consults them when the caller leaves the fee or nonce unset, and it
//! never retries; failures propagate unchanged.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use txforge_core::{Address, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("fee estimation failed: {0}")]
    Fee(String),

    #[error("nonce lookup failed: {0}")]
    Nonce(String),
}

/// Estimates the fee for a transaction in the chain's base unit.
#[async_trait]
pub trait FeeEstimator: Send + Sync {
    /// `estimated_len` is the serialized length including signatures still
    /// to be appended.
    async fn estimate_fee(&self, tx: &Transaction, estimated_len: usize) -> Result<u64, CollaboratorError>;
}

/// Looks up the next unused nonce for an account.
#[async_trait]
pub trait NonceProvider: Send + Sync {
    async fn next_nonce(&self, address: &Address) -> Result<u64, CollaboratorError>;
}

/// Always returns the same fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedFee(pub u64);

#[async_trait]
impl FeeEstimator for FixedFee {
    async fn estimate_fee(&self, _tx: &Transaction, _estimated_len: usize) -> Result<u64, CollaboratorError> {
        Ok(self.0)
    }
}

/// Charges `rate` per byte, never less than `minimum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRateEstimator {
    pub rate: u64,
    pub minimum: u64,
}

impl FeeRateEstimator {
    pub fn new(rate: u64, minimum: u64) -> Self {
        Self { rate, minimum }
    }
}

#[async_trait]
impl FeeEstimator for FeeRateEstimator {
    async fn estimate_fee(&self, _tx: &Transaction, estimated_len: usize) -> Result<u64, CollaboratorError> {
        let len = u64::try_from(estimated_len).map_err(|e| CollaboratorError::Fee(e.to_string()))?;
        Ok(self.rate.saturating_mul(len).max(self.minimum))
    }
}

/// In-memory nonce table. Unknown accounts start at nonce 0.
///
/// Thread-safe via an async RwLock.
#[derive(Debug, Default)]
pub struct MemoryNonces {
    nonces: RwLock<HashMap<Address, u64>>,
}

impl MemoryNonces {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, address: Address, nonce: u64) {
        self.nonces.write().await.insert(address, nonce);
    }

    /// Record that `address` used its current nonce.
    pub async fn increment(&self, address: &Address) -> u64 {
        let mut nonces = self.nonces.write().await;
        let next = nonces.entry(*address).or_insert(0);
        *next += 1;
        *next
    }
}

#[async_trait]
impl NonceProvider for MemoryNonces {
    async fn next_nonce(&self, address: &Address) -> Result<u64, CollaboratorError> {
        Ok(self.nonces.read().await.get(address).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txforge_core::{
        create_single_sig_condition, AddressHashMode, Network, Payload, PrincipalData, PrivateKey,
        TransactionAuth,
    };

    fn tx() -> Transaction {
        let key = PrivateKey::from_hex("edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01").unwrap();
        let origin =
            create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key.public_key(), 0, 0).unwrap();
        let recipient = PrincipalData::Standard("SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159".parse().unwrap());
        Transaction::new(
            &Network::mainnet(),
            TransactionAuth::standard(origin),
            Payload::token_transfer(recipient, 1, "").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_fixed_fee() {
        assert_eq!(FixedFee(180).estimate_fee(&tx(), 500).await.unwrap(), 180);
    }

    #[tokio::test]
    async fn test_fee_rate_with_floor() {
        let estimator = FeeRateEstimator::new(2, 300);
        assert_eq!(estimator.estimate_fee(&tx(), 100).await.unwrap(), 300);
        assert_eq!(estimator.estimate_fee(&tx(), 180).await.unwrap(), 360);
    }

    #[tokio::test]
    async fn test_memory_nonces() {
        let nonces = MemoryNonces::new();
        let address: Address = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159".parse().unwrap();
        assert_eq!(nonces.next_nonce(&address).await.unwrap(), 0);

        nonces.set(address, 7).await;
        assert_eq!(nonces.next_nonce(&address).await.unwrap(), 7);
        assert_eq!(nonces.increment(&address).await, 8);
        assert_eq!(nonces.next_nonce(&address).await.unwrap(), 8);
    }
}
