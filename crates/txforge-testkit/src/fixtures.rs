//! Test fixtures and helpers.
//!
//! Deterministic keys and accounts for integration tests.

use txforge_core::crypto::sha256;
use txforge_core::{
    create_multi_sig_condition, create_single_sig_condition, Address, AddressHashMode, Network,
    Payload, PrincipalData, PrivateKey, PublicKey, Transaction, TransactionAuth,
};

/// Single-sig test key (compressed public key).
pub const SINGLE_SIG_KEY: &str = "edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01";
/// First multi-sig member key (compressed).
pub const MEMBER_KEY_A: &str = "7b9ad41196c280a34f8fca6a5759ab9e85f72f234cbe3ef6ab0418417417a9fe01";
/// Second multi-sig member key (compressed).
pub const MEMBER_KEY_B: &str = "0a1fe25da691ca39ce7e5e9d7dba08887f8b670e607198ec93a06aa3527849fb01";
/// Mainnet recipient used across the vectors.
pub const RECIPIENT: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";

/// Parse a known-good hex key.
///
/// Panics on malformed input; only for test constants.
pub fn private_key(hex: &str) -> PrivateKey {
    PrivateKey::from_hex(hex).expect("fixture key")
}

/// `count` deterministic member keys derived from `label`.
pub fn member_keys(label: &str, count: usize) -> Vec<PrivateKey> {
    (0..count)
        .map(|i| {
            let mut secret = sha256(format!("{}/{}", label, i).as_bytes()).to_vec();
            secret.push(0x01);
            PrivateKey::from_slice(&secret).expect("derived key in range")
        })
        .collect()
}

pub fn recipient() -> PrincipalData {
    PrincipalData::Standard(RECIPIENT.parse().expect("fixture address"))
}

/// A single-sig account plus a set of multi-sig members on one network.
pub struct TestFixture {
    pub network: Network,
    pub origin: PrivateKey,
    pub members: Vec<PrivateKey>,
}

impl TestFixture {
    /// Mainnet fixture with the fixed single-sig key and the two member keys.
    pub fn new() -> Self {
        Self::with_network(Network::mainnet())
    }

    pub fn with_network(network: Network) -> Self {
        Self {
            network,
            origin: private_key(SINGLE_SIG_KEY),
            members: vec![private_key(MEMBER_KEY_A), private_key(MEMBER_KEY_B)],
        }
    }

    /// Replace the members with `count` derived keys.
    pub fn with_members(mut self, count: usize) -> Self {
        self.members = member_keys("txforge-member", count);
        self
    }

    pub fn origin_public_key(&self) -> PublicKey {
        self.origin.public_key()
    }

    pub fn member_public_keys(&self) -> Vec<PublicKey> {
        self.members.iter().map(PrivateKey::public_key).collect()
    }

    pub fn origin_address(&self) -> Address {
        Address::from_public_keys(
            self.network.single_sig_version,
            AddressHashMode::SerializeP2PKH,
            1,
            &[self.origin_public_key()],
        )
        .expect("single-sig address")
    }

    /// Multi-sig address over the members in their listed order.
    pub fn multi_sig_address(&self, required: usize) -> Address {
        Address::from_public_keys(
            self.network.multi_sig_version,
            AddressHashMode::SerializeP2SH,
            required,
            &self.member_public_keys(),
        )
        .expect("multi-sig address")
    }

    /// Unsigned single-sig token transfer to [`RECIPIENT`].
    pub fn transfer(&self, amount: u64, fee: u64, nonce: u64) -> Transaction {
        let origin =
            create_single_sig_condition(AddressHashMode::SerializeP2PKH, &self.origin_public_key(), nonce, fee)
                .expect("single-sig condition");
        Transaction::new(
            &self.network,
            TransactionAuth::standard(origin),
            Payload::token_transfer(recipient(), amount, "").expect("transfer payload"),
        )
    }

    /// Unsigned multi-sig token transfer over the members in listed order.
    pub fn multi_sig_transfer(&self, required: u16, amount: u64, fee: u64, nonce: u64) -> Transaction {
        let origin = create_multi_sig_condition(
            AddressHashMode::SerializeP2SH,
            required,
            &self.member_public_keys(),
            nonce,
            fee,
        )
        .expect("multi-sig condition");
        Transaction::new(
            &self.network,
            TransactionAuth::standard(origin),
            Payload::token_transfer(recipient(), amount, "").expect("transfer payload"),
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_addresses() {
        let fixture = TestFixture::new();
        assert_eq!(
            fixture.origin_address().to_string(),
            "SPAW66WC3G8WA5F28JVNG1NTRJ6H76E7EN5H6QQD"
        );
        assert_eq!(
            fixture.multi_sig_address(2).to_string(),
            "SM346QDJ531RXRBRG3H7FJXR8YV9ZW10E339Z4T0V"
        );
    }

    #[test]
    fn test_member_keys_are_deterministic() {
        let a = member_keys("x", 3);
        let b = member_keys("x", 3);
        assert_eq!(a.len(), 3);
        for (ka, kb) in a.iter().zip(&b) {
            assert_eq!(ka.public_key(), kb.public_key());
            assert!(ka.public_key().is_compressed());
        }
        assert_ne!(a[0].public_key(), member_keys("y", 1)[0].public_key());
    }
}
