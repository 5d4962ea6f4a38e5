//! Property tests over generated values and transactions.

use proptest::prelude::*;
use txforge_core::{ClarityValue, Payload, PostCondition, Transaction, TransactionSigner, WireDecode, WireEncode};
use txforge_testkit::generators::{
    clarity_value, deep_clarity_value, payload, post_condition, private_key, transaction_from_params, transaction_params,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn clarity_value_roundtrips(value in clarity_value()) {
        let bytes = value.to_bytes();
        prop_assert_eq!(ClarityValue::from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn deep_clarity_value_roundtrips(value in deep_clarity_value()) {
        prop_assert!(value.depth() <= txforge_core::clarity::MAX_VALUE_DEPTH);
        let bytes = value.to_bytes();
        prop_assert_eq!(ClarityValue::from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn payload_roundtrips(p in payload()) {
        let bytes = p.to_bytes();
        prop_assert_eq!(Payload::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn post_condition_roundtrips(pc in post_condition()) {
        let bytes = pc.to_bytes();
        prop_assert_eq!(PostCondition::from_bytes(&bytes).unwrap(), pc);
    }

    #[test]
    fn truncated_clarity_value_is_rejected(value in clarity_value()) {
        let bytes = value.to_bytes();
        prop_assert!(ClarityValue::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn unsigned_transaction_roundtrips(params in transaction_params()) {
        let tx = transaction_from_params(&params);
        let decoded = Transaction::deserialize(&tx.serialize()).unwrap();
        prop_assert_eq!(decoded.txid(), tx.txid());
        prop_assert_eq!(decoded, tx);
    }

    #[test]
    fn signing_is_deterministic(params in transaction_params()) {
        let mut a = transaction_from_params(&params);
        let mut b = transaction_from_params(&params);
        TransactionSigner::new(&mut a).unwrap().sign_origin(&params.key).unwrap();
        TransactionSigner::new(&mut b).unwrap().sign_origin(&params.key).unwrap();
        prop_assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn signed_transaction_verifies(params in transaction_params()) {
        let mut tx = transaction_from_params(&params);
        TransactionSigner::new(&mut tx).unwrap().sign_origin(&params.key).unwrap();
        tx.verify().unwrap();

        let decoded = Transaction::deserialize(&tx.serialize()).unwrap();
        decoded.verify().unwrap();
        prop_assert_eq!(decoded.txid(), tx.txid());
    }

    #[test]
    fn changed_fee_breaks_signature(params in transaction_params()) {
        let mut tx = transaction_from_params(&params);
        TransactionSigner::new(&mut tx).unwrap().sign_origin(&params.key).unwrap();
        tx.set_fee(params.fee.wrapping_add(1));
        prop_assert!(tx.verify().is_err());
    }

    #[test]
    fn foreign_key_cannot_sign(params in transaction_params(), other in private_key()) {
        prop_assume!(other.public_key().to_compressed_bytes() != params.key.public_key().to_compressed_bytes());
        let mut tx = transaction_from_params(&params);
        TransactionSigner::new(&mut tx).unwrap().sign_origin(&other).unwrap();
        prop_assert!(tx.verify().is_err());
    }
}
