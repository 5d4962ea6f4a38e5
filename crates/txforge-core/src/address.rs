//! Addresses and address hash modes.

use std::fmt;
use std::str::FromStr;

use crate::c32::{c32_address, c32_address_decode};
use crate::crypto::{sha256, Hash160, PublicKey};
use crate::error::{CodecError, TxError};
use crate::wire::{ByteReader, WireDecode, WireEncode};

pub const C32_ADDRESS_VERSION_MAINNET_SINGLESIG: u8 = 22;
pub const C32_ADDRESS_VERSION_MAINNET_MULTISIG: u8 = 20;
pub const C32_ADDRESS_VERSION_TESTNET_SINGLESIG: u8 = 26;
pub const C32_ADDRESS_VERSION_TESTNET_MULTISIG: u8 = 21;

/// Upper bound on keys in a multi-sig script (`OP_16`).
pub const MAX_MULTISIG_KEYS: usize = 16;

const OP_CHECKMULTISIG: u8 = 0xae;

/// How a spending condition's signer hash is derived from its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddressHashMode {
    /// Hash160(public key).
    SerializeP2PKH = 0x00,
    /// Hash160(multi-sig redeem script).
    SerializeP2SH = 0x01,
    /// Hash160(segwit v0 key-hash program).
    SerializeP2WPKH = 0x02,
    /// Hash160(segwit v0 script-hash program).
    SerializeP2WSH = 0x03,
    SerializeP2SHNonSequential = 0x05,
    SerializeP2WSHNonSequential = 0x07,
}

impl AddressHashMode {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::SerializeP2PKH),
            0x01 => Some(Self::SerializeP2SH),
            0x02 => Some(Self::SerializeP2WPKH),
            0x03 => Some(Self::SerializeP2WSH),
            0x05 => Some(Self::SerializeP2SHNonSequential),
            0x07 => Some(Self::SerializeP2WSHNonSequential),
            _ => None,
        }
    }

    pub fn is_single_sig(self) -> bool {
        matches!(self, Self::SerializeP2PKH | Self::SerializeP2WPKH)
    }

    pub fn is_multi_sig(self) -> bool {
        !self.is_single_sig()
    }

    /// Whether signatures chain through the running sighash.
    pub fn is_sequential(self) -> bool {
        !matches!(
            self,
            Self::SerializeP2SHNonSequential | Self::SerializeP2WSHNonSequential
        )
    }

    /// Segwit-style modes accept only compressed keys.
    pub fn requires_compressed_keys(self) -> bool {
        matches!(
            self,
            Self::SerializeP2WPKH | Self::SerializeP2WSH | Self::SerializeP2WSHNonSequential
        )
    }
}

impl WireEncode for AddressHashMode {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.to_u8());
    }
}

impl WireDecode for AddressHashMode {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = reader.read_u8()?;
        Self::from_u8(tag).ok_or(CodecError::UnknownTag {
            kind: "hash mode",
            tag,
        })
    }
}

/// `OP_m <key>... OP_n OP_CHECKMULTISIG`
fn multisig_script(num_sigs: usize, keys: &[PublicKey]) -> Vec<u8> {
    let mut script = Vec::with_capacity(3 + keys.len() * 34);
    script.push(0x50 + num_sigs as u8);
    for key in keys {
        let bytes = key.to_bytes();
        script.push(bytes.len() as u8);
        script.extend_from_slice(&bytes);
    }
    script.push(0x50 + keys.len() as u8);
    script.push(OP_CHECKMULTISIG);
    script
}

/// Derive the signer hash for `keys` under `hash_mode`, keeping key order.
pub fn public_keys_to_address_hash(
    hash_mode: AddressHashMode,
    num_sigs: usize,
    keys: &[PublicKey],
) -> Result<Hash160, TxError> {
    if hash_mode.requires_compressed_keys() && keys.iter().any(|k| !k.is_compressed()) {
        return Err(CodecError::InvalidPublicKey("segwit hash modes need compressed keys".into()).into());
    }

    if hash_mode.is_single_sig() {
        let [key] = keys else {
            return Err(TxError::HashModeMismatch);
        };
        return Ok(match hash_mode {
            AddressHashMode::SerializeP2WPKH => {
                let mut program = vec![0x00, 0x14];
                program.extend_from_slice(key.hash160().as_bytes());
                Hash160::from_data(&program)
            }
            _ => key.hash160(),
        });
    }

    if keys.is_empty() || keys.len() > MAX_MULTISIG_KEYS {
        return Err(TxError::InvalidMultiSig(format!(
            "{} keys, expected 1 to {}",
            keys.len(),
            MAX_MULTISIG_KEYS
        )));
    }
    if num_sigs == 0 || num_sigs > keys.len() {
        return Err(TxError::InvalidMultiSig(format!(
            "{} required signatures for {} keys",
            num_sigs,
            keys.len()
        )));
    }

    let script = multisig_script(num_sigs, keys);
    Ok(match hash_mode {
        AddressHashMode::SerializeP2WSH | AddressHashMode::SerializeP2WSHNonSequential => {
            let mut program = vec![0x00, 0x20];
            program.extend_from_slice(&sha256(&script));
            Hash160::from_data(&program)
        }
        _ => Hash160::from_data(&script),
    })
}

/// A versioned account address (`version | hash160`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    version: u8,
    hash160: Hash160,
}

impl Address {
    /// Versions are c32 digits, so they must be below 32.
    pub fn new(version: u8, hash160: Hash160) -> Result<Self, CodecError> {
        if version >= 32 {
            return Err(CodecError::InvalidAddress(format!(
                "version {} out of range",
                version
            )));
        }
        Ok(Self { version, hash160 })
    }

    pub fn from_public_keys(
        version: u8,
        hash_mode: AddressHashMode,
        num_sigs: usize,
        keys: &[PublicKey],
    ) -> Result<Self, TxError> {
        let hash = public_keys_to_address_hash(hash_mode, num_sigs, keys)?;
        Ok(Self::new(version, hash)?)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash160(&self) -> &Hash160 {
        &self.hash160
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(
            self.version,
            C32_ADDRESS_VERSION_MAINNET_SINGLESIG | C32_ADDRESS_VERSION_MAINNET_MULTISIG
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = c32_address(self.version, self.hash160.as_bytes()).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, hash) = c32_address_decode(s)?;
        Self::new(version, Hash160(hash))
    }
}

impl WireEncode for Address {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.version);
        self.hash160.encode(buf);
    }
}

impl WireDecode for Address {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_u8()?;
        let hash160 = Hash160::decode(reader)?;
        Self::new(version, hash160)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(hex: &str) -> PublicKey {
        PublicKey::from_hex(hex).unwrap()
    }

    const PA: &str = "02c701b9b5987ce1d4d40a5dcaf73e7b084bfd7b1dffb8d43ac46227187ec17469";
    const PB: &str = "0269d85a0bb7997f696ae5fd86aaa60776e053315c34215debd2233215d0072c1c";

    #[test]
    fn test_single_sig_address() {
        let pk = key("03ef788b3830c00abe8f64f62dc32fc863bc0b2cafeb073b6c8e1c7657d9c2c3ab");
        let addr = Address::from_public_keys(
            C32_ADDRESS_VERSION_MAINNET_SINGLESIG,
            AddressHashMode::SerializeP2PKH,
            1,
            &[pk],
        )
        .unwrap();
        assert_eq!(addr.to_string(), "SPAW66WC3G8WA5F28JVNG1NTRJ6H76E7EN5H6QQD");
        assert!(addr.is_mainnet());
    }

    #[test]
    fn test_multisig_address_depends_on_key_order() {
        let keys = [key(PA), key(PB)];
        let addr = Address::from_public_keys(
            C32_ADDRESS_VERSION_TESTNET_MULTISIG,
            AddressHashMode::SerializeP2SH,
            2,
            &keys,
        )
        .unwrap();
        assert_eq!(addr.hash160().to_hex(), "c86bb6451871dc2f101c4ef97708f6d3fe040e18");
        assert_eq!(addr.to_string(), "SN346QDJ531RXRBRG3H7FJXR8YV9ZW10E32HA84HT");

        let reversed = public_keys_to_address_hash(
            AddressHashMode::SerializeP2SH,
            2,
            &[key(PB), key(PA)],
        )
        .unwrap();
        assert_eq!(reversed.to_hex(), "3260c954e1b684d1ea3b23a4a65533221397679b");
    }

    #[test]
    fn test_multisig_bounds() {
        let keys = [key(PA), key(PB)];
        assert!(matches!(
            public_keys_to_address_hash(AddressHashMode::SerializeP2SH, 3, &keys),
            Err(TxError::InvalidMultiSig(_))
        ));
        assert!(matches!(
            public_keys_to_address_hash(AddressHashMode::SerializeP2SH, 0, &keys),
            Err(TxError::InvalidMultiSig(_))
        ));
        assert_eq!(
            public_keys_to_address_hash(AddressHashMode::SerializeP2PKH, 1, &keys).unwrap_err(),
            TxError::HashModeMismatch
        );
    }

    #[test]
    fn test_segwit_rejects_uncompressed() {
        let uncompressed = key(PA).with_compression(false);
        assert!(public_keys_to_address_hash(AddressHashMode::SerializeP2WPKH, 1, &[uncompressed]).is_err());
        assert!(public_keys_to_address_hash(AddressHashMode::SerializeP2PKH, 1, &[uncompressed]).is_ok());
    }

    #[test]
    fn test_address_parse_and_wire() {
        let addr: Address = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159".parse().unwrap();
        let bytes = addr.to_bytes();
        assert_eq!(bytes.len(), 21);
        assert_eq!(bytes[0], 22);
        assert_eq!(Address::from_bytes(&bytes).unwrap(), addr);
        assert!(Address::from_bytes(&[40u8; 21]).is_err());
    }

    #[test]
    fn test_hash_mode_flags() {
        assert!(AddressHashMode::SerializeP2PKH.is_single_sig());
        assert!(AddressHashMode::SerializeP2SH.is_sequential());
        assert!(!AddressHashMode::SerializeP2SHNonSequential.is_sequential());
        assert_eq!(AddressHashMode::from_u8(0x04), None);
    }
}
