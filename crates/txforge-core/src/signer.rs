//! The chained-sighash signer.
//!
//! A [`TransactionSigner`] walks the origin condition first, then (for
//! sponsored transactions) the sponsor condition, appending one
//! authorization field at a time and carrying the running sighash forward.
//! Constructing a signer over a partially signed transaction replays what is
//! already there, so signing can be split across parties.

use crate::auth::{next_signature, AuthFlag, SpendingCondition, TransactionAuthField};
use crate::crypto::{PrivateKey, PublicKey, Sha512Trunc256Sum};
use crate::error::TxError;
use crate::transaction::Transaction;

/// Progress of the condition currently being signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningState {
    Unsigned,
    PartiallySigned { appended: usize, required: usize },
    FullySigned,
}

impl SigningState {
    fn of(condition: &SpendingCondition) -> Self {
        let appended = condition.signature_count();
        let required = condition.signatures_required();
        if appended == 0 {
            SigningState::Unsigned
        } else if appended >= required {
            SigningState::FullySigned
        } else {
            SigningState::PartiallySigned { appended, required }
        }
    }
}

/// Which condition is open for signing, and where its chain stands.
#[derive(Debug, Clone)]
struct Phase {
    flag: AuthFlag,
    /// Sighash the condition's chain starts from.
    base: Sha512Trunc256Sum,
    /// Sighash after the last appended field.
    sighash: Sha512Trunc256Sum,
    signers: Vec<PublicKey>,
}

pub struct TransactionSigner<'a> {
    tx: &'a mut Transaction,
    phase: Phase,
}

impl<'a> TransactionSigner<'a> {
    /// Open the origin condition, replaying any fields already appended.
    pub fn new(tx: &'a mut Transaction) -> Result<Self, TxError> {
        let initial = tx.sign_begin();
        let replay = tx.auth.origin().replay(&initial, AuthFlag::Standard)?;
        Ok(Self {
            tx,
            phase: Phase {
                flag: AuthFlag::Standard,
                base: initial,
                sighash: replay.sighash,
                signers: replay.signers,
            },
        })
    }

    pub fn transaction(&self) -> &Transaction {
        &*self.tx
    }

    /// The running sighash of the open condition.
    pub fn sighash(&self) -> &Sha512Trunc256Sum {
        &self.phase.sighash
    }

    /// Which party is currently signing.
    pub fn flag(&self) -> AuthFlag {
        self.phase.flag
    }

    pub fn state(&self) -> SigningState {
        SigningState::of(self.condition())
    }

    pub fn origin_state(&self) -> SigningState {
        SigningState::of(self.tx.auth.origin())
    }

    /// Progress of the named party's condition; `None` for a missing sponsor.
    pub fn party_state(&self, flag: AuthFlag) -> Option<SigningState> {
        match flag {
            AuthFlag::Standard => Some(self.origin_state()),
            AuthFlag::Sponsored => self.tx.auth.sponsor().map(SigningState::of),
        }
    }

    pub fn sign_origin(&mut self, private_key: &PrivateKey) -> Result<(), TxError> {
        self.require_phase(AuthFlag::Standard)?;
        self.sign(private_key)
    }

    /// Append a non-signing member of a multi-sig origin.
    pub fn append_origin(&mut self, public_key: &PublicKey) -> Result<(), TxError> {
        self.require_phase(AuthFlag::Standard)?;
        self.append_public_key(public_key)
    }

    /// Sign for the sponsor. The origin must already be fully signed.
    pub fn sign_sponsor(&mut self, private_key: &PrivateKey) -> Result<(), TxError> {
        self.enter_sponsor()?;
        self.sign(private_key)
    }

    pub fn append_sponsor(&mut self, public_key: &PublicKey) -> Result<(), TxError> {
        self.enter_sponsor()?;
        self.append_public_key(public_key)
    }

    /// Sign or append for whichever party `flag` names.
    pub fn sign_as(&mut self, flag: AuthFlag, private_key: &PrivateKey) -> Result<(), TxError> {
        match flag {
            AuthFlag::Standard => self.sign_origin(private_key),
            AuthFlag::Sponsored => self.sign_sponsor(private_key),
        }
    }

    pub fn append_as(&mut self, flag: AuthFlag, public_key: &PublicKey) -> Result<(), TxError> {
        match flag {
            AuthFlag::Standard => self.append_origin(public_key),
            AuthFlag::Sponsored => self.append_sponsor(public_key),
        }
    }

    fn require_phase(&self, flag: AuthFlag) -> Result<(), TxError> {
        if self.phase.flag != flag {
            return Err(TxError::Signing("origin authorization is closed".into()));
        }
        Ok(())
    }

    fn enter_sponsor(&mut self) -> Result<(), TxError> {
        if self.phase.flag == AuthFlag::Sponsored {
            return Ok(());
        }
        let sponsor = self.tx.auth.sponsor().ok_or(TxError::NotSponsored)?;
        if !self.tx.auth.origin().is_fully_signed() {
            return Err(TxError::OriginNotSigned);
        }

        let base = self.phase.sighash;
        let replay = sponsor.replay(&base, AuthFlag::Sponsored)?;
        self.phase = Phase {
            flag: AuthFlag::Sponsored,
            base,
            sighash: replay.sighash,
            signers: replay.signers,
        };
        Ok(())
    }

    fn condition(&self) -> &SpendingCondition {
        match self.phase.flag {
            AuthFlag::Standard => self.tx.auth.origin(),
            AuthFlag::Sponsored => match self.tx.auth.sponsor() {
                Some(sponsor) => sponsor,
                None => self.tx.auth.origin(),
            },
        }
    }

    fn condition_mut(&mut self) -> Result<&mut SpendingCondition, TxError> {
        match self.phase.flag {
            AuthFlag::Standard => Ok(self.tx.auth.origin_mut()),
            AuthFlag::Sponsored => self.tx.auth.sponsor_mut().ok_or(TxError::NotSponsored),
        }
    }

    fn sign(&mut self, private_key: &PrivateKey) -> Result<(), TxError> {
        let condition = self.condition();
        let required = condition.signatures_required();
        if condition.signature_count() >= required {
            return Err(TxError::TooManySignatures { required });
        }

        let public_key = private_key.public_key();
        let point = public_key.to_compressed_bytes();
        if self.phase.signers.iter().any(|k| k.to_compressed_bytes() == point) {
            return Err(TxError::DuplicateSigner);
        }

        let sequential = condition.hash_mode().is_sequential();
        let (fee, nonce) = (condition.fee(), condition.nonce());
        let from = if sequential { self.phase.sighash } else { self.phase.base };
        let (signature, next) = next_signature(&from, self.phase.flag, fee, nonce, private_key)?;

        let key_encoding = public_key.key_encoding();
        match self.condition_mut()? {
            SpendingCondition::SingleSig(c) => {
                c.key_encoding = key_encoding;
                c.signature = signature;
            }
            SpendingCondition::MultiSig(c) => {
                c.fields.push(TransactionAuthField::Signature(key_encoding, signature));
            }
        }
        if sequential {
            self.phase.sighash = next;
        }
        self.phase.signers.push(public_key);

        tracing::trace!(
            flag = ?self.phase.flag,
            appended = self.phase.signers.len(),
            required,
            "signature appended"
        );
        Ok(())
    }

    fn append_public_key(&mut self, public_key: &PublicKey) -> Result<(), TxError> {
        let flag = self.phase.flag;
        match self.condition_mut()? {
            SpendingCondition::SingleSig(_) => Err(TxError::HashModeMismatch),
            SpendingCondition::MultiSig(c) => {
                c.fields.push(TransactionAuthField::PublicKey(*public_key));
                tracing::trace!(flag = ?flag, fields = c.fields.len(), "public key appended");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressHashMode;
    use crate::auth::{create_multi_sig_condition, create_single_sig_condition, TransactionAuth};
    use crate::clarity::PrincipalData;
    use crate::network::Network;
    use crate::payload::Payload;

    const KEY_HEX: &str = "edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01";
    const KEY_A: &str = "7b9ad41196c280a34f8fca6a5759ab9e85f72f234cbe3ef6ab0418417417a9fe01";
    const KEY_B: &str = "0a1fe25da691ca39ce7e5e9d7dba08887f8b670e607198ec93a06aa3527849fb01";
    const RECIPIENT: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";
    const SIGNED_TRANSFER: &str = "0000000001040015c31b8c1c11c515e244b75806bac48d1399c7750000000000000000000000000000000a00012a60d407bebe3e975a57f30755a2cc0e026c89a7e5fc543c4dd28a30756fe35c6c57a16657820660bf80dc446e25910f512fe102104bf4937be697e867eec6e5030200000000000516df0ba3e79792be7be5e50a370289accfc8c9e032000000000000006400000000000000000000000000000000000000000000000000000000000000000000";

    fn private(hex: &str) -> PrivateKey {
        PrivateKey::from_hex(hex).unwrap()
    }

    fn payload() -> Payload {
        Payload::token_transfer(PrincipalData::Standard(RECIPIENT.parse().unwrap()), 100, "").unwrap()
    }

    fn single_sig_tx() -> Transaction {
        let pk = private(KEY_HEX).public_key();
        let origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &pk, 0, 10).unwrap();
        Transaction::new(&Network::mainnet(), TransactionAuth::standard(origin), payload())
    }

    fn multi_sig_tx(hash_mode: AddressHashMode) -> Transaction {
        let keys = [private(KEY_A).public_key(), private(KEY_B).public_key()];
        let origin = create_multi_sig_condition(hash_mode, 2, &keys, 3, 200).unwrap();
        Transaction::new(&Network::testnet(), TransactionAuth::standard(origin), payload())
    }

    #[test]
    fn test_single_sig_matches_known_bytes() {
        let mut tx = single_sig_tx();
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        assert_eq!(signer.state(), SigningState::Unsigned);
        signer.sign_origin(&private(KEY_HEX)).unwrap();
        assert_eq!(signer.state(), SigningState::FullySigned);

        assert_eq!(tx.serialize_hex(), SIGNED_TRANSFER);
        assert_eq!(
            tx.txid().to_hex(),
            "f152d523ee21a9de9608794361fce9b14cb9202cfd8e60afcafba953551c97f2"
        );
        tx.verify().unwrap();
    }

    #[test]
    fn test_signing_is_deterministic() {
        let mut a = single_sig_tx();
        let mut b = single_sig_tx();
        TransactionSigner::new(&mut a).unwrap().sign_origin(&private(KEY_HEX)).unwrap();
        TransactionSigner::new(&mut b).unwrap().sign_origin(&private(KEY_HEX)).unwrap();
        assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn test_single_sig_oversign_rejected() {
        let mut tx = single_sig_tx();
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_HEX)).unwrap();
        assert_eq!(
            signer.sign_origin(&private(KEY_HEX)).unwrap_err(),
            TxError::TooManySignatures { required: 1 }
        );
    }

    #[test]
    fn test_multi_sig_partial_then_full() {
        let mut tx = multi_sig_tx(AddressHashMode::SerializeP2SH);
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_A)).unwrap();
        assert_eq!(
            signer.state(),
            SigningState::PartiallySigned {
                appended: 1,
                required: 2
            }
        );
        assert_eq!(signer.sign_origin(&private(KEY_A)).unwrap_err(), TxError::DuplicateSigner);
        signer.sign_origin(&private(KEY_B)).unwrap();
        assert_eq!(signer.state(), SigningState::FullySigned);
        tx.verify().unwrap();
    }

    #[test]
    fn test_resume_from_partially_signed() {
        let mut whole = multi_sig_tx(AddressHashMode::SerializeP2SH);
        {
            let mut signer = TransactionSigner::new(&mut whole).unwrap();
            signer.sign_origin(&private(KEY_A)).unwrap();
            signer.sign_origin(&private(KEY_B)).unwrap();
        }

        let mut split = multi_sig_tx(AddressHashMode::SerializeP2SH);
        TransactionSigner::new(&mut split).unwrap().sign_origin(&private(KEY_A)).unwrap();
        let mut wire = Transaction::deserialize(&split.serialize()).unwrap();
        let mut resumed = TransactionSigner::new(&mut wire).unwrap();
        assert_eq!(resumed.origin_state(), SigningState::PartiallySigned { appended: 1, required: 2 });
        assert_eq!(resumed.sign_origin(&private(KEY_A)).unwrap_err(), TxError::DuplicateSigner);
        resumed.sign_origin(&private(KEY_B)).unwrap();

        assert_eq!(wire, whole);
    }

    #[test]
    fn test_public_key_field_keeps_position() {
        // 1-of-2: A signs, B is appended as a raw key.
        let keys = [private(KEY_A).public_key(), private(KEY_B).public_key()];
        let origin = create_multi_sig_condition(AddressHashMode::SerializeP2SH, 1, &keys, 0, 0).unwrap();
        let mut tx = Transaction::new(&Network::testnet(), TransactionAuth::standard(origin), payload());
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_A)).unwrap();
        signer.append_origin(&keys[1]).unwrap();
        tx.verify().unwrap();

        // Swapping the order breaks the signer hash.
        if let SpendingCondition::MultiSig(c) = tx.auth.origin_mut() {
            c.fields.swap(0, 1);
        }
        assert!(tx.verify().is_err());
    }

    #[test]
    fn test_append_to_single_sig_rejected() {
        let mut tx = single_sig_tx();
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        let pk = private(KEY_A).public_key();
        assert_eq!(signer.append_origin(&pk).unwrap_err(), TxError::HashModeMismatch);
    }

    #[test]
    fn test_non_sequential_signing_verifies() {
        let mut tx = multi_sig_tx(AddressHashMode::SerializeP2SHNonSequential);
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_B)).unwrap();
        signer.sign_origin(&private(KEY_A)).unwrap();
        // Signatures appear in signing order, so the key order is [B, A].
        assert!(tx.verify().is_err());

        let mut tx = multi_sig_tx(AddressHashMode::SerializeP2SHNonSequential);
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_A)).unwrap();
        signer.sign_origin(&private(KEY_B)).unwrap();
        tx.verify().unwrap();
    }

    #[test]
    fn test_tampered_field_fails_verification() {
        let mut tx = multi_sig_tx(AddressHashMode::SerializeP2SH);
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_A)).unwrap();
        signer.sign_origin(&private(KEY_B)).unwrap();

        if let SpendingCondition::MultiSig(c) = tx.auth.origin_mut() {
            if let TransactionAuthField::Signature(_, sig) = &mut c.fields[0] {
                sig.0[10] ^= 0x01;
            }
        }
        assert!(tx.verify().is_err());
    }

    #[test]
    fn test_sponsor_requires_signed_origin() {
        let pk = private(KEY_HEX).public_key();
        let origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &pk, 0, 0).unwrap();
        let mut tx = Transaction::new(&Network::mainnet(), TransactionAuth::sponsored(origin), payload());
        let sponsor_key = private(KEY_A);
        let sponsor =
            create_single_sig_condition(AddressHashMode::SerializeP2PKH, &sponsor_key.public_key(), 1, 500)
                .unwrap();
        tx.set_sponsor(sponsor).unwrap();

        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        assert_eq!(signer.sign_sponsor(&sponsor_key).unwrap_err(), TxError::OriginNotSigned);
        signer.sign_origin(&private(KEY_HEX)).unwrap();
        signer.sign_sponsor(&sponsor_key).unwrap();
        assert_eq!(signer.flag(), AuthFlag::Sponsored);
        assert!(signer.sign_origin(&private(KEY_HEX)).is_err());
        tx.verify().unwrap();
    }

    #[test]
    fn test_sponsor_on_standard_rejected() {
        let mut tx = single_sig_tx();
        let mut signer = TransactionSigner::new(&mut tx).unwrap();
        signer.sign_origin(&private(KEY_HEX)).unwrap();
        assert_eq!(signer.sign_sponsor(&private(KEY_A)).unwrap_err(), TxError::NotSponsored);
    }
}
