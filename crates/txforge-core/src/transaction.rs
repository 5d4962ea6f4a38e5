//! The transaction envelope and its wire form.

use crate::address::Address;
use crate::auth::{SpendingCondition, TransactionAuth};
use crate::crypto::Sha512Trunc256Sum;
use crate::error::{CodecError, TxError};
use crate::network::Network;
use crate::payload::Payload;
use crate::post_condition::PostCondition;
use crate::types::{AnchorMode, PostConditionMode, TransactionVersion, Txid};
use crate::wire::{decode_list, encode_list, ByteReader, PrefixWidth, WireDecode, WireEncode};

/// A complete transaction.
///
/// The authorization is mutated in place while signing; everything else is
/// fixed once the transaction has been assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: TransactionVersion,
    pub chain_id: u32,
    pub auth: TransactionAuth,
    pub anchor_mode: AnchorMode,
    pub post_condition_mode: PostConditionMode,
    pub post_conditions: Vec<PostCondition>,
    pub payload: Payload,
}

impl Transaction {
    /// A transaction for `network` with default anchor and post-condition modes.
    pub fn new(network: &Network, auth: TransactionAuth, payload: Payload) -> Self {
        Self {
            version: network.transaction_version,
            chain_id: network.chain_id,
            auth,
            anchor_mode: AnchorMode::default(),
            post_condition_mode: PostConditionMode::default(),
            post_conditions: Vec::new(),
            payload,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.to_bytes()
    }

    pub fn serialize_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode a full transaction; trailing bytes are an error.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_bytes(bytes)
    }

    pub fn deserialize_hex(s: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| CodecError::Malformed(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    pub fn txid(&self) -> Txid {
        Txid::from_transaction_bytes(&self.to_bytes())
    }

    /// The network this transaction's version byte belongs to.
    pub fn network(&self) -> Network {
        Network::for_transaction_version(self.version)
    }

    /// The sighash every signature chain starts from: the hash of this
    /// transaction with its authorization cleared.
    pub fn sign_begin(&self) -> Sha512Trunc256Sum {
        let mut cleared = self.clone();
        cleared.auth = self.auth.to_initial_sighash_auth();
        Sha512Trunc256Sum::from_data(&cleared.to_bytes())
    }

    /// Check every signature in the authorization.
    pub fn verify(&self) -> Result<(), TxError> {
        self.auth.verify(&self.sign_begin())
    }

    pub fn origin_address(&self) -> Result<Address, CodecError> {
        self.auth.origin().address(&self.network())
    }

    pub fn sponsor_address(&self) -> Result<Option<Address>, CodecError> {
        let network = self.network();
        self.auth.sponsor().map(|s| s.address(&network)).transpose()
    }

    /// The fee actually paid: the sponsor's when sponsored.
    pub fn fee(&self) -> u64 {
        match &self.auth {
            TransactionAuth::Standard(origin) => origin.fee(),
            TransactionAuth::Sponsored(_, sponsor) => sponsor.fee(),
        }
    }

    /// Set the paying party's fee: the sponsor when sponsored, else the origin.
    pub fn set_fee(&mut self, fee: u64) {
        match &mut self.auth {
            TransactionAuth::Standard(origin) => origin.set_fee(fee),
            TransactionAuth::Sponsored(_, sponsor) => sponsor.set_fee(fee),
        }
    }

    pub fn nonce(&self) -> u64 {
        self.auth.origin().nonce()
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.auth.origin_mut().set_nonce(nonce);
    }

    pub fn set_sponsor(&mut self, sponsor: SpendingCondition) -> Result<(), TxError> {
        self.auth.set_sponsor(sponsor)
    }
}

impl WireEncode for Transaction {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.version.to_u8());
        buf.extend_from_slice(&self.chain_id.to_be_bytes());
        self.auth.encode(buf);
        buf.push(self.anchor_mode.to_u8());
        buf.push(self.post_condition_mode.to_u8());
        encode_list(buf, PrefixWidth::U32, &self.post_conditions);
        self.payload.encode(buf);
    }
}

impl WireDecode for Transaction {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = reader.read_u8()?;
        let version = TransactionVersion::from_u8(tag).ok_or(CodecError::UnknownTag {
            kind: "transaction version",
            tag,
        })?;
        let chain_id = reader.read_u32()?;
        let auth = TransactionAuth::decode(reader)?;
        let tag = reader.read_u8()?;
        let anchor_mode = AnchorMode::from_u8(tag).ok_or(CodecError::UnknownTag {
            kind: "anchor mode",
            tag,
        })?;
        let tag = reader.read_u8()?;
        let post_condition_mode = PostConditionMode::from_u8(tag).ok_or(CodecError::UnknownTag {
            kind: "post-condition mode",
            tag,
        })?;
        let post_conditions = decode_list(reader, PrefixWidth::U32)?;
        let payload = Payload::decode(reader)?;
        Ok(Self {
            version,
            chain_id,
            auth,
            anchor_mode,
            post_condition_mode,
            post_conditions,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressHashMode;
    use crate::auth::create_single_sig_condition;
    use crate::clarity::PrincipalData;
    use crate::crypto::PrivateKey;

    const KEY_HEX: &str = "edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01";
    const RECIPIENT: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";
    const UNSIGNED_TRANSFER: &str = "0000000001040015c31b8c1c11c515e244b75806bac48d1399c7750000000000000000000000000000000a000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000030200000000000516df0ba3e79792be7be5e50a370289accfc8c9e032000000000000006400000000000000000000000000000000000000000000000000000000000000000000";

    fn transfer() -> Transaction {
        let pk = PrivateKey::from_hex(KEY_HEX).unwrap().public_key();
        let origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &pk, 0, 10).unwrap();
        let recipient = PrincipalData::Standard(RECIPIENT.parse().unwrap());
        Transaction::new(
            &Network::mainnet(),
            TransactionAuth::standard(origin),
            Payload::token_transfer(recipient, 100, "").unwrap(),
        )
    }

    #[test]
    fn test_unsigned_transfer_bytes() {
        let tx = transfer();
        assert_eq!(tx.serialize_hex(), UNSIGNED_TRANSFER);
        assert_eq!(Transaction::deserialize_hex(UNSIGNED_TRANSFER).unwrap(), tx);
    }

    #[test]
    fn test_initial_sighash_ignores_fee_and_nonce() {
        let tx = transfer();
        assert_eq!(
            tx.sign_begin().to_hex(),
            "43f76c9238800832e973f43cbbf1d8383b37ccdc0abb1010d8c285a012729af5"
        );
        let mut other = tx.clone();
        other.set_fee(999);
        other.set_nonce(7);
        assert_eq!(other.sign_begin(), tx.sign_begin());
        assert_ne!(other.txid(), tx.txid());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = transfer().serialize();
        bytes.push(0x00);
        assert_eq!(
            Transaction::deserialize(&bytes).unwrap_err(),
            CodecError::TrailingBytes(1)
        );
    }

    #[test]
    fn test_truncated_transaction_rejected() {
        let bytes = transfer().serialize();
        assert!(matches!(
            Transaction::deserialize(&bytes[..bytes.len() - 5]),
            Err(CodecError::MalformedLength { .. })
        ));
    }

    #[test]
    fn test_unsigned_transaction_fails_verification() {
        assert!(matches!(transfer().verify(), Err(TxError::Verification(_))));
    }

    #[test]
    fn test_origin_address() {
        assert_eq!(
            transfer().origin_address().unwrap().to_string(),
            "SPAW66WC3G8WA5F28JVNG1NTRJ6H76E7EN5H6QQD"
        );
        assert_eq!(transfer().sponsor_address().unwrap(), None);
    }

    #[test]
    fn test_sponsored_fee_lands_on_sponsor() {
        let mut tx = transfer();
        let origin = tx.auth.origin().clone();
        tx.auth = TransactionAuth::sponsored(origin);
        tx.set_fee(500);
        assert_eq!(tx.fee(), 500);
        assert_eq!(tx.auth.origin().fee(), 10);
        assert_eq!(tx.auth.sponsor().unwrap().fee(), 500);
    }
}
