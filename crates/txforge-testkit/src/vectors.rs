//! Golden test vectors for deterministic verification.
//!
//! Each vector fixes the exact bytes of a transaction before and after its
//! final signature. The expected hex was produced by an independent
//! implementation of RFC 6979 secp256k1 signing and SHA-512/256, so a match
//! pins the wire layout, the sighash chain and the signature together.

use txforge_core::{
    create_multi_sig_condition, create_single_sig_condition, AddressHashMode, ClarityValue, Network,
    Payload, PrincipalData, Transaction, TransactionAuth, TransactionSigner, TxError,
};

use crate::fixtures::{private_key, recipient, MEMBER_KEY_A, MEMBER_KEY_B, RECIPIENT, SINGLE_SIG_KEY};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub description: &'static str,
    /// The transaction before its final signer; origin-signed for sponsored vectors.
    pub unsigned_hex: &'static str,
    pub signed_hex: &'static str,
    pub txid: &'static str,
    /// Rebuild the transaction behind `unsigned_hex`.
    pub build: fn() -> Result<Transaction, TxError>,
    /// Apply the final signatures.
    pub sign: fn(&mut Transaction) -> Result<(), TxError>,
}

pub const SINGLE_SIG_TRANSFER: GoldenVector = GoldenVector {
    name: "single-sig token transfer",
    description: "mainnet P2PKH transfer of 100 to SP3FGQ…, fee 10, nonce 0, empty memo",
    unsigned_hex: "0000000001040015c31b8c1c11c515e244b75806bac48d1399c7750000000000000000000000000000000a000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000030200000000000516df0ba3e79792be7be5e50a370289accfc8c9e032000000000000006400000000000000000000000000000000000000000000000000000000000000000000",
    signed_hex: "0000000001040015c31b8c1c11c515e244b75806bac48d1399c7750000000000000000000000000000000a00012a60d407bebe3e975a57f30755a2cc0e026c89a7e5fc543c4dd28a30756fe35c6c57a16657820660bf80dc446e25910f512fe102104bf4937be697e867eec6e5030200000000000516df0ba3e79792be7be5e50a370289accfc8c9e032000000000000006400000000000000000000000000000000000000000000000000000000000000000000",
    txid: "f152d523ee21a9de9608794361fce9b14cb9202cfd8e60afcafba953551c97f2",
    build: build_single_sig_transfer,
    sign: sign_single_sig_transfer,
};

pub const MULTI_SIG_CONTRACT_CALL: GoldenVector = GoldenVector {
    name: "2-of-2 multi-sig contract call",
    description: "testnet P2SH call of hello-world::set-value with five arguments, fee 200, nonce 3",
    unsigned_hex: "80800000000401c86bb6451871dc2f101c4ef97708f6d3fe040e18000000000000000300000000000000c80000000000020302000000000216df0ba3e79792be7be5e50a370289accfc8c9e0320b68656c6c6f2d776f726c64097365742d76616c756500000005010000000000000000000000000000002a00fffffffffffffffffffffffffffffff90200000004deadbeef0a0516df0ba3e79792be7be5e50a370289accfc8c9e0320c000000020269640100000000000000000000000000000001046e616d650d00000003626f62",
    signed_hex: "80800000000401c86bb6451871dc2f101c4ef97708f6d3fe040e18000000000000000300000000000000c8000000020201120dc0c242605a3e514c25aa450431090a686ba796b7492683d333b6944ebaeb2d04ee347cc783e85128770fe5f73aa437b4ddc9fcfc4e6f11444cb7ace4a8650201355e7a9e25d2773c2f8971221078c0ff9d460eac302a6430c5eeaf26029d93d43108590e042117ba86a979a6b40968ff4b8a56a2ce55caa4931b05f6b0d7749d00020302000000000216df0ba3e79792be7be5e50a370289accfc8c9e0320b68656c6c6f2d776f726c64097365742d76616c756500000005010000000000000000000000000000002a00fffffffffffffffffffffffffffffff90200000004deadbeef0a0516df0ba3e79792be7be5e50a370289accfc8c9e0320c000000020269640100000000000000000000000000000001046e616d650d00000003626f62",
    txid: "b81a2a0a2e4338e473c2d0fa2c0f365d3544f65e05de25271fd9dbcbf878ffdd",
    build: build_multi_sig_contract_call,
    sign: sign_multi_sig_contract_call,
};

pub const SPONSORED_TRANSFER: GoldenVector = GoldenVector {
    name: "sponsored token transfer",
    description: "mainnet transfer of 1000 with memo \"sponsored\"; origin fee 0 nonce 0, sponsor fee 500 nonce 1",
    unsigned_hex: "0000000001050015c31b8c1c11c515e244b75806bac48d1399c7750000000000000000000000000000000000003f201544c7928d1c002164c335e7e766397c1400b9a47ef034faee6a385b8a8014584ed9f3b6721521488fa13dde6f516618f86bb30965ce9b9445e420bdf06500000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000030200000000000516df0ba3e79792be7be5e50a370289accfc8c9e03200000000000003e873706f6e736f72656400000000000000000000000000000000000000000000000000",
    signed_hex: "0000000001050015c31b8c1c11c515e244b75806bac48d1399c7750000000000000000000000000000000000003f201544c7928d1c002164c335e7e766397c1400b9a47ef034faee6a385b8a8014584ed9f3b6721521488fa13dde6f516618f86bb30965ce9b9445e420bdf06500edad3483cb7d15e24620edd8d5a545300c6e2ed6000000000000000100000000000001f400004ddfeb375976575c38ea71860618cbf9e64a0977f17e5005fee030f7207481204d70b4c46da7534b6e636e78344d08d3309b16764714befa687b2d560055377a030200000000000516df0ba3e79792be7be5e50a370289accfc8c9e03200000000000003e873706f6e736f72656400000000000000000000000000000000000000000000000000",
    txid: "f0a151801330261653d874b62568c40b41a0ffa4e3fcbab97cf54fc6de8b6cce",
    build: build_sponsored_transfer,
    sign: sign_sponsored_transfer,
};

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![SINGLE_SIG_TRANSFER, MULTI_SIG_CONTRACT_CALL, SPONSORED_TRANSFER]
}

/// The arguments of the multi-sig contract-call vector.
pub fn contract_call_args() -> Result<Vec<ClarityValue>, TxError> {
    let principal = PrincipalData::Standard(RECIPIENT.parse()?);
    Ok(vec![
        ClarityValue::UInt(42),
        ClarityValue::Int(-7),
        ClarityValue::Buffer(vec![0xde, 0xad, 0xbe, 0xef]),
        ClarityValue::some(ClarityValue::Principal(principal))?,
        ClarityValue::tuple([
            ("id", ClarityValue::UInt(1)),
            ("name", ClarityValue::string_ascii("bob")?),
        ])?,
    ])
}

fn build_single_sig_transfer() -> Result<Transaction, TxError> {
    let key = private_key(SINGLE_SIG_KEY);
    let origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key.public_key(), 0, 10)?;
    Ok(Transaction::new(
        &Network::mainnet(),
        TransactionAuth::standard(origin),
        Payload::token_transfer(recipient(), 100, "")?,
    ))
}

fn sign_single_sig_transfer(tx: &mut Transaction) -> Result<(), TxError> {
    TransactionSigner::new(tx)?.sign_origin(&private_key(SINGLE_SIG_KEY))
}

fn build_multi_sig_contract_call() -> Result<Transaction, TxError> {
    let keys = [
        private_key(MEMBER_KEY_A).public_key(),
        private_key(MEMBER_KEY_B).public_key(),
    ];
    let origin = create_multi_sig_condition(AddressHashMode::SerializeP2SH, 2, &keys, 3, 200)?;
    let payload = Payload::contract_call(RECIPIENT.parse()?, "hello-world", "set-value", contract_call_args()?)?;
    Ok(Transaction::new(&Network::testnet(), TransactionAuth::standard(origin), payload))
}

fn sign_multi_sig_contract_call(tx: &mut Transaction) -> Result<(), TxError> {
    let mut signer = TransactionSigner::new(tx)?;
    signer.sign_origin(&private_key(MEMBER_KEY_A))?;
    signer.sign_origin(&private_key(MEMBER_KEY_B))
}

fn build_sponsored_transfer() -> Result<Transaction, TxError> {
    let key = private_key(SINGLE_SIG_KEY);
    let origin = create_single_sig_condition(AddressHashMode::SerializeP2PKH, &key.public_key(), 0, 0)?;
    let mut tx = Transaction::new(
        &Network::mainnet(),
        TransactionAuth::sponsored(origin),
        Payload::token_transfer(recipient(), 1000, "sponsored")?,
    );
    TransactionSigner::new(&mut tx)?.sign_origin(&key)?;
    Ok(tx)
}

fn sign_sponsored_transfer(tx: &mut Transaction) -> Result<(), TxError> {
    let sponsor_key = private_key(MEMBER_KEY_A);
    let sponsor =
        create_single_sig_condition(AddressHashMode::SerializeP2PKH, &sponsor_key.public_key(), 1, 500)?;
    tx.set_sponsor(sponsor)?;
    TransactionSigner::new(tx)?.sign_sponsor(&sponsor_key)
}

/// Rebuild, sign and compare every vector; returns the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let mut tx = (vector.build)().map_err(|e| format!("{}: build failed: {}", vector.name, e))?;
        let unsigned = tx.serialize_hex();
        if unsigned != vector.unsigned_hex {
            return Err(format!("{}: unsigned bytes differ", vector.name));
        }
        (vector.sign)(&mut tx).map_err(|e| format!("{}: signing failed: {}", vector.name, e))?;
        if tx.serialize_hex() != vector.signed_hex {
            return Err(format!("{}: signed bytes differ", vector.name));
        }
        if tx.txid().to_hex() != vector.txid {
            return Err(format!("{}: txid differs", vector.name));
        }
        tx.verify()
            .map_err(|e| format!("{}: verification failed: {}", vector.name, e))?;
    }
    Ok(())
}
