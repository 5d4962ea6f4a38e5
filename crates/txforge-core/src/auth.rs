//! Spending conditions and transaction authorization.
//!
//! A spending condition proves the right to spend from one account. It is
//! either single-sig (one signature over the sighash) or multi-sig (an
//! ordered list of signatures and public keys whose keys, hashed in order,
//! reproduce the signer hash).
//!
//! Signatures are computed over a running sighash:
//!
//! ```text
//! presign  = H(cur | auth_flag | fee | nonce)      <- signed
//! postsign = H(presign | key_encoding | signature) <- next cur
//! ```
//!
//! where `H` is SHA-512/256 and the first `cur` is the txid of the
//! transaction with its authorization cleared.

use crate::address::{public_keys_to_address_hash, Address, AddressHashMode};
use crate::crypto::{Hash160, KeyEncoding, MessageSignature, PrivateKey, PublicKey, Sha512Trunc256Sum};
use crate::error::{CodecError, TxError};
use crate::network::Network;
use crate::wire::{decode_list, encode_list, ByteReader, PrefixWidth, WireDecode, WireEncode};

/// Which party a signature authorizes; hashed into every presign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AuthFlag {
    Standard = 0x04,
    Sponsored = 0x05,
}

impl AuthFlag {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x04 => Some(AuthFlag::Standard),
            0x05 => Some(AuthFlag::Sponsored),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sighash chaining
// ─────────────────────────────────────────────────────────────────────────────

pub fn make_sighash_presign(
    cur: &Sha512Trunc256Sum,
    flag: AuthFlag,
    fee: u64,
    nonce: u64,
) -> Sha512Trunc256Sum {
    let mut data = Vec::with_capacity(32 + 1 + 8 + 8);
    data.extend_from_slice(cur.as_bytes());
    data.push(flag.to_u8());
    data.extend_from_slice(&fee.to_be_bytes());
    data.extend_from_slice(&nonce.to_be_bytes());
    Sha512Trunc256Sum::from_data(&data)
}

pub fn make_sighash_postsign(
    presign: &Sha512Trunc256Sum,
    key_encoding: KeyEncoding,
    signature: &MessageSignature,
) -> Sha512Trunc256Sum {
    let mut data = Vec::with_capacity(32 + 1 + 65);
    data.extend_from_slice(presign.as_bytes());
    data.push(key_encoding.to_u8());
    data.extend_from_slice(signature.as_bytes());
    Sha512Trunc256Sum::from_data(&data)
}

/// Sign the next presign; returns the signature and the following sighash.
pub fn next_signature(
    cur: &Sha512Trunc256Sum,
    flag: AuthFlag,
    fee: u64,
    nonce: u64,
    private_key: &PrivateKey,
) -> Result<(MessageSignature, Sha512Trunc256Sum), TxError> {
    let presign = make_sighash_presign(cur, flag, fee, nonce);
    let signature = private_key.sign_digest(presign.as_bytes())?;
    let key_encoding = private_key.public_key().key_encoding();
    let next = make_sighash_postsign(&presign, key_encoding, &signature);
    Ok((signature, next))
}

/// Recover the key behind the next signature; returns it and the following sighash.
pub fn next_verification(
    cur: &Sha512Trunc256Sum,
    flag: AuthFlag,
    fee: u64,
    nonce: u64,
    key_encoding: KeyEncoding,
    signature: &MessageSignature,
) -> Result<(PublicKey, Sha512Trunc256Sum), TxError> {
    let presign = make_sighash_presign(cur, flag, fee, nonce);
    let key = signature.recover(presign.as_bytes())?;
    let public_key = PublicKey::from_verifying_key(&key, key_encoding == KeyEncoding::Compressed);
    let next = make_sighash_postsign(&presign, key_encoding, signature);
    Ok((public_key, next))
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization fields
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of a multi-sig condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAuthField {
    /// A member that did not sign in-band.
    PublicKey(PublicKey),
    Signature(KeyEncoding, MessageSignature),
}

impl TransactionAuthField {
    pub fn is_signature(&self) -> bool {
        matches!(self, TransactionAuthField::Signature(..))
    }
}

impl WireEncode for TransactionAuthField {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            TransactionAuthField::PublicKey(key) => {
                buf.push(if key.is_compressed() { 0x00 } else { 0x01 });
                // Always the compressed point; the tag carries the encoding.
                buf.extend_from_slice(&key.to_compressed_bytes());
            }
            TransactionAuthField::Signature(encoding, signature) => {
                buf.push(match encoding {
                    KeyEncoding::Compressed => 0x02,
                    KeyEncoding::Uncompressed => 0x03,
                });
                signature.encode(buf);
            }
        }
    }
}

impl WireDecode for TransactionAuthField {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = reader.read_u8()?;
        match tag {
            0x00 | 0x01 => {
                let key = PublicKey::from_slice(reader.read_bytes(33)?)?;
                Ok(TransactionAuthField::PublicKey(key.with_compression(tag == 0x00)))
            }
            0x02 => Ok(TransactionAuthField::Signature(
                KeyEncoding::Compressed,
                MessageSignature::decode(reader)?,
            )),
            0x03 => Ok(TransactionAuthField::Signature(
                KeyEncoding::Uncompressed,
                MessageSignature::decode(reader)?,
            )),
            tag => Err(CodecError::UnknownTag {
                kind: "auth field",
                tag,
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Spending conditions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSigSpendingCondition {
    pub hash_mode: AddressHashMode,
    pub signer: Hash160,
    pub nonce: u64,
    pub fee: u64,
    pub key_encoding: KeyEncoding,
    pub signature: MessageSignature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigSpendingCondition {
    pub hash_mode: AddressHashMode,
    pub signer: Hash160,
    pub nonce: u64,
    pub fee: u64,
    pub fields: Vec<TransactionAuthField>,
    pub signatures_required: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendingCondition {
    SingleSig(SingleSigSpendingCondition),
    MultiSig(MultiSigSpendingCondition),
}

/// State recovered by replaying a condition's appended fields.
#[derive(Debug, Clone)]
pub struct ConditionReplay {
    /// The running sighash after the last appended field.
    pub sighash: Sha512Trunc256Sum,
    /// Every key in field order, recovered or raw.
    pub keys: Vec<PublicKey>,
    /// Keys recovered from signatures.
    pub signers: Vec<PublicKey>,
}

/// Build a single-sig condition with an empty signature.
pub fn create_single_sig_condition(
    hash_mode: AddressHashMode,
    public_key: &PublicKey,
    nonce: u64,
    fee: u64,
) -> Result<SpendingCondition, TxError> {
    if !hash_mode.is_single_sig() {
        return Err(TxError::HashModeMismatch);
    }
    let signer = public_keys_to_address_hash(hash_mode, 1, std::slice::from_ref(public_key))?;
    Ok(SpendingCondition::SingleSig(SingleSigSpendingCondition {
        hash_mode,
        signer,
        nonce,
        fee,
        key_encoding: public_key.key_encoding(),
        signature: MessageSignature::EMPTY,
    }))
}

/// Build a multi-sig condition with no fields; the signer hash follows
/// `public_keys` in the order given.
pub fn create_multi_sig_condition(
    hash_mode: AddressHashMode,
    signatures_required: u16,
    public_keys: &[PublicKey],
    nonce: u64,
    fee: u64,
) -> Result<SpendingCondition, TxError> {
    if !hash_mode.is_multi_sig() {
        return Err(TxError::HashModeMismatch);
    }
    let signer = public_keys_to_address_hash(hash_mode, signatures_required as usize, public_keys)?;
    Ok(SpendingCondition::MultiSig(MultiSigSpendingCondition {
        hash_mode,
        signer,
        nonce,
        fee,
        fields: Vec::new(),
        signatures_required,
    }))
}

pub fn is_single_sig(condition: &SpendingCondition) -> bool {
    condition.hash_mode().is_single_sig()
}

impl SpendingCondition {
    /// The placeholder sponsor used until the real sponsor is attached.
    pub fn sponsor_sentinel() -> Self {
        SpendingCondition::SingleSig(SingleSigSpendingCondition {
            hash_mode: AddressHashMode::SerializeP2PKH,
            signer: Hash160::ZERO,
            nonce: 0,
            fee: 0,
            key_encoding: KeyEncoding::Compressed,
            signature: MessageSignature::EMPTY,
        })
    }

    pub fn hash_mode(&self) -> AddressHashMode {
        match self {
            SpendingCondition::SingleSig(c) => c.hash_mode,
            SpendingCondition::MultiSig(c) => c.hash_mode,
        }
    }

    pub fn is_single_sig(&self) -> bool {
        is_single_sig(self)
    }

    pub fn signer(&self) -> &Hash160 {
        match self {
            SpendingCondition::SingleSig(c) => &c.signer,
            SpendingCondition::MultiSig(c) => &c.signer,
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            SpendingCondition::SingleSig(c) => c.nonce,
            SpendingCondition::MultiSig(c) => c.nonce,
        }
    }

    pub fn fee(&self) -> u64 {
        match self {
            SpendingCondition::SingleSig(c) => c.fee,
            SpendingCondition::MultiSig(c) => c.fee,
        }
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        match self {
            SpendingCondition::SingleSig(c) => c.nonce = nonce,
            SpendingCondition::MultiSig(c) => c.nonce = nonce,
        }
    }

    pub fn set_fee(&mut self, fee: u64) {
        match self {
            SpendingCondition::SingleSig(c) => c.fee = fee,
            SpendingCondition::MultiSig(c) => c.fee = fee,
        }
    }

    pub fn signatures_required(&self) -> usize {
        match self {
            SpendingCondition::SingleSig(_) => 1,
            SpendingCondition::MultiSig(c) => c.signatures_required as usize,
        }
    }

    /// Number of signatures appended so far.
    pub fn signature_count(&self) -> usize {
        match self {
            SpendingCondition::SingleSig(c) => usize::from(!c.signature.is_empty()),
            SpendingCondition::MultiSig(c) => c.fields.iter().filter(|f| f.is_signature()).count(),
        }
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signature_count() >= self.signatures_required()
    }

    pub fn address(&self, network: &Network) -> Result<Address, CodecError> {
        Address::new(network.address_version(self.hash_mode()), *self.signer())
    }

    /// A copy with fee, nonce and signature material cleared, as hashed
    /// into the initial sighash.
    pub fn to_initial_sighash_condition(&self) -> Self {
        let mut cleared = self.clone();
        match &mut cleared {
            SpendingCondition::SingleSig(c) => {
                c.nonce = 0;
                c.fee = 0;
                c.signature = MessageSignature::EMPTY;
            }
            SpendingCondition::MultiSig(c) => {
                c.nonce = 0;
                c.fee = 0;
                c.fields.clear();
            }
        }
        cleared
    }

    /// Recompute the running sighash over whatever has been appended.
    ///
    /// Raw public-key fields do not advance the hash. Non-sequential modes
    /// verify every signature against the initial sighash.
    pub fn replay(&self, initial: &Sha512Trunc256Sum, flag: AuthFlag) -> Result<ConditionReplay, TxError> {
        let mut replay = ConditionReplay {
            sighash: *initial,
            keys: Vec::new(),
            signers: Vec::new(),
        };
        match self {
            SpendingCondition::SingleSig(c) => {
                if !c.signature.is_empty() {
                    let (key, next) =
                        next_verification(initial, flag, c.fee, c.nonce, c.key_encoding, &c.signature)?;
                    replay.sighash = next;
                    replay.keys.push(key);
                    replay.signers.push(key);
                }
            }
            SpendingCondition::MultiSig(c) => {
                let sequential = c.hash_mode.is_sequential();
                for field in &c.fields {
                    match field {
                        TransactionAuthField::PublicKey(key) => replay.keys.push(*key),
                        TransactionAuthField::Signature(encoding, signature) => {
                            let base = if sequential { replay.sighash } else { *initial };
                            let (key, next) =
                                next_verification(&base, flag, c.fee, c.nonce, *encoding, signature)?;
                            if sequential {
                                replay.sighash = next;
                            }
                            replay.keys.push(key);
                            replay.signers.push(key);
                        }
                    }
                }
            }
        }
        Ok(replay)
    }

    /// Check every signature and the signer hash; returns the final sighash.
    pub fn verify(&self, initial: &Sha512Trunc256Sum, flag: AuthFlag) -> Result<Sha512Trunc256Sum, TxError> {
        let replay = self.replay(initial, flag)?;
        let required = self.signatures_required();
        if replay.signers.len() != required {
            return Err(TxError::Verification(format!(
                "expected {} signatures, found {}",
                required,
                replay.signers.len()
            )));
        }

        let mode = self.hash_mode();
        if mode.requires_compressed_keys() && replay.keys.iter().any(|k| !k.is_compressed()) {
            return Err(TxError::Verification("uncompressed key in segwit hash mode".into()));
        }
        let hash = public_keys_to_address_hash(mode, required, &replay.keys)?;
        if &hash != self.signer() {
            return Err(TxError::Verification(format!(
                "signer hash mismatch: expected {}, derived {}",
                self.signer(),
                hash
            )));
        }
        Ok(replay.sighash)
    }
}

impl WireEncode for SpendingCondition {
    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            SpendingCondition::SingleSig(c) => {
                c.hash_mode.encode(buf);
                c.signer.encode(buf);
                buf.extend_from_slice(&c.nonce.to_be_bytes());
                buf.extend_from_slice(&c.fee.to_be_bytes());
                buf.push(c.key_encoding.to_u8());
                c.signature.encode(buf);
            }
            SpendingCondition::MultiSig(c) => {
                c.hash_mode.encode(buf);
                c.signer.encode(buf);
                buf.extend_from_slice(&c.nonce.to_be_bytes());
                buf.extend_from_slice(&c.fee.to_be_bytes());
                encode_list(buf, PrefixWidth::U32, &c.fields);
                buf.extend_from_slice(&c.signatures_required.to_be_bytes());
            }
        }
    }
}

impl WireDecode for SpendingCondition {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let hash_mode = AddressHashMode::decode(reader)?;
        let signer = Hash160::decode(reader)?;
        let nonce = reader.read_u64()?;
        let fee = reader.read_u64()?;

        if hash_mode.is_single_sig() {
            let tag = reader.read_u8()?;
            let key_encoding = KeyEncoding::from_u8(tag).ok_or(CodecError::UnknownTag {
                kind: "key encoding",
                tag,
            })?;
            let signature = MessageSignature::decode(reader)?;
            return Ok(SpendingCondition::SingleSig(SingleSigSpendingCondition {
                hash_mode,
                signer,
                nonce,
                fee,
                key_encoding,
                signature,
            }));
        }

        let fields = decode_list(reader, PrefixWidth::U32)?;
        let signatures_required = reader.read_u16()?;
        Ok(SpendingCondition::MultiSig(MultiSigSpendingCondition {
            hash_mode,
            signer,
            nonce,
            fee,
            fields,
            signatures_required,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionAuth {
    Standard(SpendingCondition),
    /// Origin, then the sponsor that pays the fee.
    Sponsored(SpendingCondition, SpendingCondition),
}

impl TransactionAuth {
    pub fn standard(origin: SpendingCondition) -> Self {
        TransactionAuth::Standard(origin)
    }

    /// A sponsored authorization whose sponsor is still the sentinel.
    pub fn sponsored(origin: SpendingCondition) -> Self {
        TransactionAuth::Sponsored(origin, SpendingCondition::sponsor_sentinel())
    }

    pub fn flag(&self) -> AuthFlag {
        match self {
            TransactionAuth::Standard(_) => AuthFlag::Standard,
            TransactionAuth::Sponsored(..) => AuthFlag::Sponsored,
        }
    }

    pub fn is_sponsored(&self) -> bool {
        matches!(self, TransactionAuth::Sponsored(..))
    }

    pub fn origin(&self) -> &SpendingCondition {
        match self {
            TransactionAuth::Standard(origin) | TransactionAuth::Sponsored(origin, _) => origin,
        }
    }

    pub fn origin_mut(&mut self) -> &mut SpendingCondition {
        match self {
            TransactionAuth::Standard(origin) | TransactionAuth::Sponsored(origin, _) => origin,
        }
    }

    pub fn sponsor(&self) -> Option<&SpendingCondition> {
        match self {
            TransactionAuth::Standard(_) => None,
            TransactionAuth::Sponsored(_, sponsor) => Some(sponsor),
        }
    }

    pub fn sponsor_mut(&mut self) -> Option<&mut SpendingCondition> {
        match self {
            TransactionAuth::Standard(_) => None,
            TransactionAuth::Sponsored(_, sponsor) => Some(sponsor),
        }
    }

    /// Replace the sponsor condition of a sponsored authorization.
    pub fn set_sponsor(&mut self, sponsor: SpendingCondition) -> Result<(), TxError> {
        match self {
            TransactionAuth::Standard(_) => Err(TxError::NotSponsored),
            TransactionAuth::Sponsored(_, current) => {
                *current = sponsor;
                Ok(())
            }
        }
    }

    /// Total signatures needed across origin and sponsor.
    pub fn signatures_required(&self) -> usize {
        self.origin().signatures_required() + self.sponsor().map_or(0, |s| s.signatures_required())
    }

    /// The authorization as hashed into the initial sighash: the origin is
    /// cleared and any sponsor is replaced by the sentinel.
    pub fn to_initial_sighash_auth(&self) -> Self {
        match self {
            TransactionAuth::Standard(origin) => {
                TransactionAuth::Standard(origin.to_initial_sighash_condition())
            }
            TransactionAuth::Sponsored(origin, _) => TransactionAuth::Sponsored(
                origin.to_initial_sighash_condition(),
                SpendingCondition::sponsor_sentinel(),
            ),
        }
    }

    /// Verify the origin, then the sponsor chained from the origin's final sighash.
    pub fn verify(&self, initial: &Sha512Trunc256Sum) -> Result<(), TxError> {
        let origin_final = self.origin().verify(initial, AuthFlag::Standard)?;
        if let Some(sponsor) = self.sponsor() {
            sponsor.verify(&origin_final, AuthFlag::Sponsored)?;
        }
        Ok(())
    }
}

impl WireEncode for TransactionAuth {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.flag().to_u8());
        match self {
            TransactionAuth::Standard(origin) => origin.encode(buf),
            TransactionAuth::Sponsored(origin, sponsor) => {
                origin.encode(buf);
                sponsor.encode(buf);
            }
        }
    }
}

impl WireDecode for TransactionAuth {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = reader.read_u8()?;
        match AuthFlag::from_u8(tag) {
            Some(AuthFlag::Standard) => Ok(TransactionAuth::Standard(SpendingCondition::decode(reader)?)),
            Some(AuthFlag::Sponsored) => {
                let origin = SpendingCondition::decode(reader)?;
                let sponsor = SpendingCondition::decode(reader)?;
                Ok(TransactionAuth::Sponsored(origin, sponsor))
            }
            None => Err(CodecError::UnknownTag {
                kind: "authorization",
                tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01";
    const PA: &str = "02c701b9b5987ce1d4d40a5dcaf73e7b084bfd7b1dffb8d43ac46227187ec17469";
    const PB: &str = "0269d85a0bb7997f696ae5fd86aaa60776e053315c34215debd2233215d0072c1c";

    fn key(hex: &str) -> PublicKey {
        PublicKey::from_hex(hex).unwrap()
    }

    #[test]
    fn test_single_sig_condition_layout() {
        let pk = PrivateKey::from_hex(KEY_HEX).unwrap().public_key();
        let cond = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &pk, 0, 10).unwrap();
        assert!(is_single_sig(&cond));
        let bytes = cond.to_bytes();
        assert_eq!(bytes.len(), 1 + 20 + 8 + 8 + 1 + 65);
        assert_eq!(hex::encode(&bytes[1..21]), "15c31b8c1c11c515e244b75806bac48d1399c775");
        assert_eq!(&bytes[29..37], &10u64.to_be_bytes());
        assert_eq!(SpendingCondition::from_bytes(&bytes).unwrap(), cond);
    }

    #[test]
    fn test_condition_kind_must_match_hash_mode() {
        let pk = key(PA);
        assert_eq!(
            create_single_sig_condition(AddressHashMode::SerializeP2SH, &pk, 0, 0).unwrap_err(),
            TxError::HashModeMismatch
        );
        assert_eq!(
            create_multi_sig_condition(AddressHashMode::SerializeP2PKH, 1, &[pk], 0, 0).unwrap_err(),
            TxError::HashModeMismatch
        );
    }

    #[test]
    fn test_multi_sig_condition() {
        let cond = create_multi_sig_condition(AddressHashMode::SerializeP2SH, 2, &[key(PA), key(PB)], 3, 200)
            .unwrap();
        assert!(!cond.is_single_sig());
        assert_eq!(cond.signer().to_hex(), "c86bb6451871dc2f101c4ef97708f6d3fe040e18");
        assert_eq!(cond.signatures_required(), 2);
        assert_eq!(cond.signature_count(), 0);
        assert_eq!(
            cond.address(&Network::testnet()).unwrap().to_string(),
            "SN346QDJ531RXRBRG3H7FJXR8YV9ZW10E32HA84HT"
        );
        let bytes = cond.to_bytes();
        // hash mode, signer, nonce, fee, empty field list, required
        assert_eq!(bytes.len(), 1 + 20 + 8 + 8 + 4 + 2);
        assert_eq!(SpendingCondition::from_bytes(&bytes).unwrap(), cond);
    }

    #[test]
    fn test_auth_field_wire() {
        let compressed = TransactionAuthField::PublicKey(key(PA));
        let bytes = compressed.to_bytes();
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes.len(), 34);
        assert_eq!(TransactionAuthField::from_bytes(&bytes).unwrap(), compressed);

        // Uncompressed keys are still written as 33 bytes.
        let uncompressed = TransactionAuthField::PublicKey(key(PA).with_compression(false));
        let bytes = uncompressed.to_bytes();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes.len(), 34);
        assert_eq!(TransactionAuthField::from_bytes(&bytes).unwrap(), uncompressed);

        let sig = TransactionAuthField::Signature(KeyEncoding::Uncompressed, MessageSignature([1u8; 65]));
        let bytes = sig.to_bytes();
        assert_eq!(bytes[0], 0x03);
        assert_eq!(TransactionAuthField::from_bytes(&bytes).unwrap(), sig);
    }

    #[test]
    fn test_presign_postsign_chain() {
        let privk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let initial = Sha512Trunc256Sum::from_data(b"initial");
        let (sig, next) = next_signature(&initial, AuthFlag::Standard, 10, 0, &privk).unwrap();
        let (recovered, next_v) =
            next_verification(&initial, AuthFlag::Standard, 10, 0, KeyEncoding::Compressed, &sig).unwrap();
        assert_eq!(recovered, privk.public_key());
        assert_eq!(next, next_v);

        // A different flag changes the presign and therefore the recovered key.
        let (other, _) =
            next_verification(&initial, AuthFlag::Sponsored, 10, 0, KeyEncoding::Compressed, &sig).unwrap();
        assert_ne!(other, privk.public_key());
    }

    #[test]
    fn test_initial_sighash_auth_clears_origin_and_sponsor() {
        let pk = key(PA);
        let mut origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &pk, 4, 50).unwrap();
        if let SpendingCondition::SingleSig(c) = &mut origin {
            c.signature = MessageSignature([9u8; 65]);
        }
        let sponsor = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key(PB), 1, 500).unwrap();
        let auth = TransactionAuth::Sponsored(origin, sponsor);

        let cleared = auth.to_initial_sighash_auth();
        assert_eq!(cleared.origin().fee(), 0);
        assert_eq!(cleared.origin().nonce(), 0);
        assert_eq!(cleared.origin().signature_count(), 0);
        assert_eq!(cleared.sponsor(), Some(&SpendingCondition::sponsor_sentinel()));
        assert_eq!(cleared.origin().signer(), auth.origin().signer());
    }

    #[test]
    fn test_set_sponsor_requires_sponsored_auth() {
        let origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key(PA), 0, 0).unwrap();
        let mut standard = TransactionAuth::standard(origin.clone());
        assert_eq!(
            standard.set_sponsor(SpendingCondition::sponsor_sentinel()).unwrap_err(),
            TxError::NotSponsored
        );

        let mut sponsored = TransactionAuth::sponsored(origin);
        let sponsor = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key(PB), 1, 0).unwrap();
        sponsored.set_sponsor(sponsor.clone()).unwrap();
        assert_eq!(sponsored.sponsor(), Some(&sponsor));
        assert_eq!(sponsored.signatures_required(), 2);
        assert_eq!(sponsored.flag(), AuthFlag::Sponsored);
    }

    #[test]
    fn test_verify_rejects_missing_signature() {
        let cond = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key(PA), 0, 0).unwrap();
        let initial = Sha512Trunc256Sum::from_data(b"x");
        assert!(matches!(
            cond.verify(&initial, AuthFlag::Standard),
            Err(TxError::Verification(_))
        ));
    }

    #[test]
    fn test_non_sequential_signatures_share_initial_sighash() {
        let a = PrivateKey::from_hex(&format!("{}01", "7b9ad41196c280a34f8fca6a5759ab9e85f72f234cbe3ef6ab0418417417a9fe")).unwrap();
        let b = PrivateKey::from_hex(&format!("{}01", "0a1fe25da691ca39ce7e5e9d7dba08887f8b670e607198ec93a06aa3527849fb")).unwrap();
        let keys = [a.public_key(), b.public_key()];
        let mut cond =
            create_multi_sig_condition(AddressHashMode::SerializeP2SHNonSequential, 2, &keys, 0, 0).unwrap();
        let initial = Sha512Trunc256Sum::from_data(b"tx");
        let (sig_a, _) = next_signature(&initial, AuthFlag::Standard, 0, 0, &a).unwrap();
        let (sig_b, _) = next_signature(&initial, AuthFlag::Standard, 0, 0, &b).unwrap();
        if let SpendingCondition::MultiSig(c) = &mut cond {
            c.fields.push(TransactionAuthField::Signature(KeyEncoding::Compressed, sig_a));
            c.fields.push(TransactionAuthField::Signature(KeyEncoding::Compressed, sig_b));
        }
        assert_eq!(cond.verify(&initial, AuthFlag::Standard).unwrap(), initial);
    }
}
