//! Multi-sig key ordering.
//!
//! A multi-sig address commits to its member keys in a particular order.
//! Wallets derive it either from the keys as listed or from the keys sorted
//! by their serialized bytes, so the order has to be recovered from the
//! address before fields can be appended.

use crate::address::{public_keys_to_address_hash, AddressHashMode};
use crate::auth::AuthFlag;
use crate::crypto::{Hash160, PrivateKey, PublicKey};
use crate::error::TxError;
use crate::signer::{SigningState, TransactionSigner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    AsGiven,
    Sorted,
}

/// Find the key order whose signer hash equals `target`.
///
/// Returns the order and the keys arranged in it.
pub fn resolve_key_order(
    hash_mode: AddressHashMode,
    signatures_required: usize,
    keys: &[PublicKey],
    target: &Hash160,
) -> Result<(KeyOrder, Vec<PublicKey>), TxError> {
    if &public_keys_to_address_hash(hash_mode, signatures_required, keys)? == target {
        return Ok((KeyOrder::AsGiven, keys.to_vec()));
    }

    let mut sorted = keys.to_vec();
    sorted.sort_by_key(|k| k.to_bytes());
    if &public_keys_to_address_hash(hash_mode, signatures_required, &sorted)? == target {
        return Ok((KeyOrder::Sorted, sorted));
    }

    Err(TxError::AddressKeyMismatch)
}

/// Walk `ordered_keys`, signing with the matching private key while the
/// party still needs signatures and appending the raw public key otherwise.
///
/// Keys match by curve point. A signature carries the member key's
/// encoding, not the holder's, since the address hashes the member form.
///
/// Returns the number of signatures appended.
pub fn sign_in_key_order(
    signer: &mut TransactionSigner<'_>,
    flag: AuthFlag,
    ordered_keys: &[PublicKey],
    private_keys: &[PrivateKey],
) -> Result<usize, TxError> {
    let mut signed = 0;
    for key in ordered_keys {
        let point = key.to_compressed_bytes();
        let private_key = private_keys
            .iter()
            .find(|k| k.public_key().to_compressed_bytes() == point);
        let open = !matches!(signer.party_state(flag), Some(SigningState::FullySigned));

        match private_key {
            Some(private_key) if open => {
                signer.sign_as(flag, &private_key.with_compression(key.is_compressed()))?;
                signed += 1;
            }
            _ => signer.append_as(flag, key)?,
        }
    }
    Ok(signed)
}
