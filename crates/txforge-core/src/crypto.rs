//! Cryptographic primitives.
//!
//! Wraps secp256k1 recoverable ECDSA (`k256`), SHA-256 / SHA-512/256 (`sha2`)
//! and RIPEMD-160 (`ripemd`) behind strong types.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512_256};
use std::fmt;

use crate::error::{CodecError, TxError};
use crate::wire::{ByteReader, WireDecode, WireEncode};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Double SHA-256, used for c32check checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(Sha256::digest(data)));
    out
}

/// A 20-byte RIPEMD-160(SHA-256(x)) digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash160(pub [u8; 20]);

impl Hash160 {
    /// Hash arbitrary data.
    pub fn from_data(data: &[u8]) -> Self {
        let mut out = [0u8; 20];
        out.copy_from_slice(&Ripemd160::digest(Sha256::digest(data)));
        Self(out)
    }

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// All-zero hash, used by the sponsor sentinel condition.
    pub const ZERO: Self = Self([0u8; 20]);
}

impl fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash160({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Hash160 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Hash160 {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl WireEncode for Hash160 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl WireDecode for Hash160 {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self(reader.read_array()?))
    }
}

/// A 32-byte SHA-512/256 digest. Txids and sighashes use this hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha512Trunc256Sum(pub [u8; 32]);

impl Sha512Trunc256Sum {
    pub fn from_data(data: &[u8]) -> Self {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha512_256::digest(data));
        Self(out)
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
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha512Trunc256Sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha512Trunc256({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Sha512Trunc256Sum {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha512Trunc256Sum {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// How a public key is serialized when hashed into an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyEncoding {
    Compressed = 0x00,
    Uncompressed = 0x01,
}

impl KeyEncoding {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(KeyEncoding::Compressed),
            0x01 => Some(KeyEncoding::Uncompressed),
            _ => None,
        }
    }
}

/// A secp256k1 public key together with its serialization preference.
///
/// Both SEC1 forms are derived from a validated point when the key is built.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    point: [u8; 33],
    uncompressed: [u8; 65],
    compressed: bool,
}

impl PublicKey {
    /// Parse a 33-byte compressed or 65-byte uncompressed SEC1 key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let compressed = match bytes.len() {
            33 => true,
            65 => false,
            n => {
                return Err(CodecError::InvalidPublicKey(format!(
                    "expected 33 or 65 bytes, got {}",
                    n
                )))
            }
        };
        let key = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| CodecError::InvalidPublicKey("not a curve point".into()))?;
        Ok(Self::from_verifying_key(&key, compressed))
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let bytes =
            hex::decode(s).map_err(|e| CodecError::InvalidPublicKey(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn from_verifying_key(key: &VerifyingKey, compressed: bool) -> Self {
        let mut point = [0u8; 33];
        point.copy_from_slice(key.as_affine().to_encoded_point(true).as_bytes());
        let mut uncompressed = [0u8; 65];
        uncompressed.copy_from_slice(key.as_affine().to_encoded_point(false).as_bytes());
        Self {
            point,
            uncompressed,
            compressed,
        }
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey, CodecError> {
        VerifyingKey::from_sec1_bytes(&self.point)
            .map_err(|_| CodecError::InvalidPublicKey("not a curve point".into()))
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn key_encoding(&self) -> KeyEncoding {
        if self.compressed {
            KeyEncoding::Compressed
        } else {
            KeyEncoding::Uncompressed
        }
    }

    /// The same point with a different serialization preference.
    pub fn with_compression(self, compressed: bool) -> Self {
        Self { compressed, ..self }
    }

    /// The 33-byte compressed SEC1 form, regardless of preference.
    pub fn to_compressed_bytes(&self) -> [u8; 33] {
        self.point
    }

    /// SEC1 bytes in the preferred form (33 or 65 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_sec1().to_vec()
    }

    /// Borrowed form of [`PublicKey::to_bytes`].
    pub fn as_sec1(&self) -> &[u8] {
        if self.compressed {
            &self.point
        } else {
            &self.uncompressed
        }
    }

    /// The 65-byte uncompressed SEC1 form, regardless of preference.
    pub fn to_uncompressed_bytes(&self) -> [u8; 65] {
        self.uncompressed
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Hash160 of the preferred serialization.
    pub fn hash160(&self) -> Hash160 {
        Hash160::from_data(&self.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}", &hex::encode(self.point)[..16])?;
        if !self.compressed {
            f.write_str(", uncompressed")?;
        }
        f.write_str(")")
    }
}

impl WireEncode for PublicKey {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_bytes());
    }
}

impl WireDecode for PublicKey {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let len = match reader.peek_u8()? {
            0x02 | 0x03 => 33,
            0x04 => 65,
            tag => return Err(CodecError::UnknownTag { kind: "public key", tag }),
        };
        Self::from_slice(reader.read_bytes(len)?)
    }
}

/// A 65-byte recoverable signature: `recovery_id | r | s`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageSignature(pub [u8; 65]);

impl MessageSignature {
    /// The all-zero placeholder written before a condition is signed.
    pub const EMPTY: Self = Self([0u8; 65]);

    pub const fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(s).map_err(|e| CodecError::Malformed(e.to_string()))?;
        let arr: [u8; 65] = bytes.try_into().map_err(|v: Vec<u8>| CodecError::MalformedLength {
            needed: 65,
            remaining: v.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn from_recoverable(signature: &Signature, recovery_id: RecoveryId) -> Self {
        let mut bytes = [0u8; 65];
        bytes[0] = recovery_id.to_byte();
        bytes[1..].copy_from_slice(&signature.to_bytes());
        Self(bytes)
    }

    /// Recover the signing key from a 32-byte digest.
    pub fn recover(&self, digest: &[u8; 32]) -> Result<VerifyingKey, TxError> {
        let recovery_id = RecoveryId::from_byte(self.0[0])
            .ok_or_else(|| TxError::Verification(format!("bad recovery id {}", self.0[0])))?;
        let signature = Signature::from_slice(&self.0[1..])
            .map_err(|e| TxError::Verification(e.to_string()))?;
        // Reject high-S signatures; the signer only produces low-S ones.
        if signature.normalize_s().is_some() {
            return Err(TxError::Verification("high-S signature".into()));
        }
        VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
            .map_err(|e| TxError::Verification(e.to_string()))
    }
}

impl fmt::Debug for MessageSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageSignature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for MessageSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl WireEncode for MessageSignature {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl WireDecode for MessageSignature {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self(reader.read_array()?))
    }
}

/// A secp256k1 signing key.
///
/// The `compress_public` flag decides which public-key form (and therefore
/// which address) the key signs for.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: SigningKey,
    compress_public: bool,
}

impl PrivateKey {
    pub fn new(signing_key: SigningKey, compress_public: bool) -> Self {
        Self {
            signing_key,
            compress_public,
        }
    }

    /// Parse 32 raw bytes, or 33 bytes whose trailing `0x01` selects the
    /// compressed public key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TxError> {
        let (secret, compress_public) = match bytes.len() {
            32 => (bytes, false),
            33 if bytes[32] == 0x01 => (&bytes[..32], true),
            _ => return Err(TxError::InvalidPrivateKey),
        };
        let signing_key = SigningKey::from_slice(secret).map_err(|_| TxError::InvalidPrivateKey)?;
        Ok(Self::new(signing_key, compress_public))
    }

    pub fn from_hex(s: &str) -> Result<Self, TxError> {
        let bytes = hex::decode(s).map_err(|_| TxError::InvalidPrivateKey)?;
        Self::from_slice(&bytes)
    }

    /// Hex form, with the `01` suffix when the public key is compressed.
    pub fn to_hex(&self) -> String {
        let mut out = hex::encode(self.signing_key.to_bytes());
        if self.compress_public {
            out.push_str("01");
        }
        out
    }

    pub fn compress_public(&self) -> bool {
        self.compress_public
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.signing_key.verifying_key(), self.compress_public)
    }

    /// The same secret, signing for the other public-key form if asked.
    pub fn with_compression(&self, compress_public: bool) -> Self {
        Self::new(self.signing_key.clone(), compress_public)
    }

    /// Deterministic (RFC 6979) low-S recoverable signature over a digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<MessageSignature, TxError> {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| TxError::Signing(e.to_string()))?;
        Ok(MessageSignature::from_recoverable(&signature, recovery_id))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01";

    #[test]
    fn test_hash160_of_public_key() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let public_key = key.public_key();
        assert_eq!(
            public_key.to_hex(),
            "03ef788b3830c00abe8f64f62dc32fc863bc0b2cafeb073b6c8e1c7657d9c2c3ab"
        );
        assert_eq!(
            public_key.hash160().to_hex(),
            "15c31b8c1c11c515e244b75806bac48d1399c775"
        );
    }

    #[test]
    fn test_private_key_suffix_selects_compression() {
        let compressed = PrivateKey::from_hex(KEY_HEX).unwrap();
        assert!(compressed.compress_public());
        assert_eq!(compressed.to_hex(), KEY_HEX);

        let uncompressed = PrivateKey::from_hex(&KEY_HEX[..64]).unwrap();
        assert!(!uncompressed.compress_public());
        assert_eq!(uncompressed.public_key().to_bytes().len(), 65);
        assert_eq!(
            uncompressed.public_key().to_compressed_bytes(),
            compressed.public_key().to_compressed_bytes()
        );
    }

    #[test]
    fn test_private_key_rejects_bad_input() {
        assert_eq!(
            PrivateKey::from_hex("00").unwrap_err(),
            TxError::InvalidPrivateKey
        );
        let bad_suffix = format!("{}02", &KEY_HEX[..64]);
        assert_eq!(
            PrivateKey::from_hex(&bad_suffix).unwrap_err(),
            TxError::InvalidPrivateKey
        );
        assert!(PrivateKey::from_slice(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_sign_and_recover() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let digest = Sha512Trunc256Sum::from_data(b"txforge").0;
        let sig = key.sign_digest(&digest).unwrap();
        let recovered = sig.recover(&digest).unwrap();
        assert_eq!(
            PublicKey::from_verifying_key(&recovered, true),
            key.public_key()
        );

        // Deterministic nonces give identical signatures.
        assert_eq!(sig, key.sign_digest(&digest).unwrap());

        let other = Sha512Trunc256Sum::from_data(b"txforgE").0;
        let recovered_other = sig.recover(&other).unwrap();
        assert_ne!(
            PublicKey::from_verifying_key(&recovered_other, true),
            key.public_key()
        );
    }

    #[test]
    fn test_known_signature() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let digest = Sha512Trunc256Sum::from_hex(
            "43f76c9238800832e973f43cbbf1d8383b37ccdc0abb1010d8c285a012729af5",
        )
        .unwrap();
        // presign(initial, 0x04, fee 10, nonce 0)
        let mut data = digest.0.to_vec();
        data.push(0x04);
        data.extend_from_slice(&10u64.to_be_bytes());
        data.extend_from_slice(&0u64.to_be_bytes());
        let presign = Sha512Trunc256Sum::from_data(&data);
        let sig = key.sign_digest(&presign.0).unwrap();
        assert_eq!(
            sig.to_hex(),
            "012a60d407bebe3e975a57f30755a2cc0e026c89a7e5fc543c4dd28a30756fe35c6c57a16657820660bf80dc446e25910f512fe102104bf4937be697e867eec6e5"
        );
    }

    #[test]
    fn test_public_key_wire_forms() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap().public_key();
        assert_eq!(PublicKey::from_bytes(&key.to_bytes()).unwrap(), key);

        let long = key.with_compression(false);
        let bytes = long.to_bytes();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(PublicKey::from_bytes(&bytes).unwrap(), long);
        assert_eq!(long.key_encoding(), KeyEncoding::Uncompressed);
    }

    #[test]
    fn test_public_key_forms_agree() {
        let private = PrivateKey::from_hex(KEY_HEX).unwrap();
        let short = private.public_key();
        let long = private.with_compression(false).public_key();
        assert_eq!(long, short.with_compression(false));
        assert_eq!(long.to_compressed_bytes(), short.to_compressed_bytes());
        assert_eq!(long.to_bytes(), short.to_uncompressed_bytes().to_vec());
        assert_eq!(long.as_sec1().len(), 65);
        assert_eq!(short.as_sec1().len(), 33);

        let verifying = long.verifying_key().unwrap();
        let parsed = PublicKey::from_slice(&verifying.as_affine().to_encoded_point(false).as_bytes()[..]).unwrap();
        assert_eq!(parsed, long);
        assert_eq!(parsed.hash160(), Hash160::from_data(&long.to_uncompressed_bytes()));
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        assert!(matches!(
            PublicKey::from_slice(&[0x02; 10]),
            Err(CodecError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            PublicKey::from_bytes(&[0x07; 33]),
            Err(CodecError::UnknownTag { .. })
        ));
    }

    #[test]
    fn test_empty_signature() {
        assert!(MessageSignature::EMPTY.is_empty());
        let sig = MessageSignature::from_hex(&"01".repeat(65)).unwrap();
        assert!(!sig.is_empty());
        assert!(MessageSignature::from_hex("0102").is_err());
    }
}
