//! Proptest generators for property-based testing.

use proptest::prelude::*;

use txforge_core::clarity::MAX_VALUE_DEPTH;
use txforge_core::{
    Address, AddressHashMode, AssetInfo, ClarityName, ClarityValue, ContractName, FungibleConditionCode,
    Hash160, MessageSignature, MicroblockHeader, Network, NonfungibleConditionCode, Payload, PostCondition,
    PostConditionPrincipal, PrincipalData, PrivateKey, Transaction, TransactionAuth, TupleData,
};
use txforge_core::{create_single_sig_condition, ClarityVersion};

/// Generate a valid secp256k1 private key, compressed or not.
pub fn private_key() -> impl Strategy<Value = PrivateKey> {
    (any::<[u8; 32]>(), any::<bool>()).prop_filter_map("scalar out of range", |(secret, compressed)| {
        let mut bytes = secret.to_vec();
        if compressed {
            bytes.push(0x01);
        }
        PrivateKey::from_slice(&bytes).ok()
    })
}

/// Generate a random Hash160.
pub fn hash160() -> impl Strategy<Value = Hash160> {
    any::<[u8; 20]>().prop_map(Hash160)
}

/// Generate an address with any valid c32 version.
pub fn address() -> impl Strategy<Value = Address> {
    (0u8..32, hash160()).prop_filter_map("version in range", |(version, hash)| Address::new(version, hash).ok())
}

pub fn contract_name() -> impl Strategy<Value = ContractName> {
    "[a-z][a-z0-9_-]{0,39}".prop_filter_map("valid contract name", |s| ContractName::new(&s).ok())
}

pub fn clarity_name() -> impl Strategy<Value = ClarityName> {
    "[a-z][a-z0-9?!-]{0,31}".prop_filter_map("valid clarity name", |s| ClarityName::new(&s).ok())
}

pub fn principal() -> impl Strategy<Value = PrincipalData> {
    prop_oneof![
        address().prop_map(PrincipalData::Standard),
        (address(), contract_name()).prop_map(|(a, n)| PrincipalData::Contract(a, n)),
    ]
}

fn clarity_leaf() -> impl Strategy<Value = ClarityValue> {
    prop_oneof![
        any::<i128>().prop_map(ClarityValue::Int),
        any::<u128>().prop_map(ClarityValue::UInt),
        any::<bool>().prop_map(ClarityValue::Bool),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(ClarityValue::Buffer),
        prop::collection::vec(any::<u8>(), 1024..4096).prop_map(ClarityValue::Buffer),
        principal().prop_map(ClarityValue::Principal),
        Just(ClarityValue::OptionalNone),
        "[ -~\t\n\r]{0,32}".prop_filter_map("clarity ascii", |s| ClarityValue::string_ascii(&s).ok()),
        ".{0,16}".prop_map(ClarityValue::StringUtf8),
    ]
}

/// Generate a Clarity value, nesting optionals, responses, lists and tuples.
///
/// Recursion stays shallow; [`deep_clarity_value`] covers the depth limit.
pub fn clarity_value() -> impl Strategy<Value = ClarityValue> {
    clarity_leaf().prop_recursive(8, 64, 6, |inner| {
        prop_oneof![
            inner.clone().prop_filter_map("depth", |v| ClarityValue::some(v).ok()),
            inner.clone().prop_filter_map("depth", |v| ClarityValue::ok(v).ok()),
            inner.clone().prop_filter_map("depth", |v| ClarityValue::err(v).ok()),
            prop::collection::vec(inner.clone(), 0..6).prop_filter_map("depth", |items| ClarityValue::list(items).ok()),
            prop::collection::btree_map("[a-z][a-z0-9-]{0,15}", inner, 0..5).prop_filter_map(
                "valid tuple",
                |fields| {
                    let entries = fields
                        .into_iter()
                        .map(|(k, v)| ClarityName::new(&k).map(|name| (name, v)))
                        .collect::<Result<Vec<_>, _>>()
                        .ok()?;
                    TupleData::from_entries(entries).ok().map(ClarityValue::Tuple)
                }
            ),
        ]
    })
}

/// Wrap a leaf in a chain of optionals and responses close to the depth limit.
pub fn deep_clarity_value() -> impl Strategy<Value = ClarityValue> {
    (clarity_leaf(), prop::collection::vec(0u8..4, MAX_VALUE_DEPTH - 8..=MAX_VALUE_DEPTH)).prop_filter_map(
        "depth",
        |(leaf, wrappers)| {
            wrappers.into_iter().try_fold(leaf, |value, wrapper| match wrapper {
                0 => ClarityValue::some(value).ok(),
                1 => ClarityValue::ok(value).ok(),
                2 => ClarityValue::err(value).ok(),
                _ => ClarityValue::list(vec![value]).ok(),
            })
        },
    )
}

fn clarity_version() -> impl Strategy<Value = Option<ClarityVersion>> {
    prop_oneof![
        Just(None),
        Just(Some(ClarityVersion::Clarity1)),
        Just(Some(ClarityVersion::Clarity2)),
        Just(Some(ClarityVersion::Clarity3)),
    ]
}

/// Generate a payload of one of the user-facing kinds.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop_oneof![
        (principal(), any::<u64>(), "[ -~]{0,34}")
            .prop_filter_map("memo fits", |(p, amount, memo)| Payload::token_transfer(p, amount, &memo).ok()),
        (address(), contract_name(), clarity_name(), prop::collection::vec(clarity_value(), 0..4))
            .prop_filter_map("valid call", |(a, c, f, args)| {
                Payload::contract_call(a, c.as_str(), f.as_str(), args).ok()
            }),
        (contract_name(), ".{0,64}", clarity_version()).prop_filter_map("valid deploy", |(n, code, v)| {
            Payload::smart_contract(n.as_str(), &code, v).ok()
        }),
        (principal(), any::<u64>(), ".{0,32}", ".{0,32}", principal(), "[a-z][a-z0-9-]{0,20}")
            .prop_filter_map("valid infer task", |(user, amount, input, context, node, model)| {
                Payload::infer_task(user, amount, &input, &context, node, &model).ok()
            }),
        ("[a-z][a-z0-9-]{0,20}", ".{0,64}")
            .prop_filter_map("valid model", |(name, params)| Payload::register_model(&name, &params).ok()),
        any::<[u8; 32]>().prop_map(Payload::coinbase),
        chain_payload(),
    ]
}

fn microblock_header() -> impl Strategy<Value = MicroblockHeader> {
    (any::<u8>(), any::<u16>(), any::<[u8; 32]>(), any::<[u8; 32]>(), any::<u8>()).prop_map(
        |(version, sequence, prev_block, tx_merkle_root, fill)| MicroblockHeader {
            version,
            sequence,
            prev_block,
            tx_merkle_root,
            signature: MessageSignature([fill; 65]),
        },
    )
}

/// Generate one of the payloads produced by block producers.
pub fn chain_payload() -> impl Strategy<Value = Payload> {
    prop_oneof![
        (microblock_header(), microblock_header()).prop_map(|(a, b)| Payload::poison_microblock(a, b)),
        (any::<[u8; 32]>(), principal()).prop_map(|(buffer, p)| Payload::coinbase_to_alt_recipient(buffer, p)),
        (any::<[u8; 32]>(), proptest::option::of(principal()), any::<u8>())
            .prop_map(|(buffer, p, fill)| Payload::nakamoto_coinbase(buffer, p, [fill; 80])),
        (
            any::<[u8; 20]>(),
            any::<[u8; 20]>(),
            any::<[u8; 32]>(),
            any::<u32>(),
            0u8..2,
            hash160()
        )
            .prop_filter_map("valid tenure change", |(consensus, burn_view, end, blocks, cause, pubkey_hash)| {
                Payload::tenure_change(consensus, consensus, burn_view, end, blocks, cause, pubkey_hash).ok()
            }),
    ]
}

fn fungible_code() -> impl Strategy<Value = FungibleConditionCode> {
    (1u8..=5).prop_filter_map("known code", FungibleConditionCode::from_u8)
}

fn post_condition_principal() -> impl Strategy<Value = PostConditionPrincipal> {
    prop_oneof![
        Just(PostConditionPrincipal::Origin),
        address().prop_map(PostConditionPrincipal::Standard),
        (address(), contract_name()).prop_map(|(a, n)| PostConditionPrincipal::Contract(a, n)),
    ]
}

fn asset_info() -> impl Strategy<Value = AssetInfo> {
    (address(), contract_name(), clarity_name()).prop_map(|(contract_address, contract_name, asset_name)| {
        AssetInfo {
            contract_address,
            contract_name,
            asset_name,
        }
    })
}

pub fn post_condition() -> impl Strategy<Value = PostCondition> {
    prop_oneof![
        (post_condition_principal(), fungible_code(), any::<u64>())
            .prop_map(|(p, code, amount)| PostCondition::stx(p, code, amount)),
        (post_condition_principal(), asset_info(), fungible_code(), any::<u64>())
            .prop_map(|(p, asset, code, amount)| PostCondition::fungible(p, asset, code, amount)),
        (post_condition_principal(), asset_info(), clarity_leaf(), any::<bool>()).prop_map(
            |(p, asset, value, sent)| {
                let code = if sent {
                    NonfungibleConditionCode::Sent
                } else {
                    NonfungibleConditionCode::NotSent
                };
                PostCondition::nonfungible(p, asset, value, code)
            }
        ),
    ]
}

/// Parameters for a single-sig transaction.
#[derive(Debug, Clone)]
pub struct TransactionParams {
    pub key: PrivateKey,
    pub mainnet: bool,
    pub fee: u64,
    pub nonce: u64,
    pub payload: Payload,
    pub post_conditions: Vec<PostCondition>,
}

pub fn transaction_params() -> impl Strategy<Value = TransactionParams> {
    (
        private_key(),
        any::<bool>(),
        any::<u64>(),
        any::<u64>(),
        payload(),
        prop::collection::vec(post_condition(), 0..3),
    )
        .prop_map(|(key, mainnet, fee, nonce, payload, post_conditions)| TransactionParams {
            key,
            mainnet,
            fee,
            nonce,
            payload,
            post_conditions,
        })
}

/// Build the unsigned single-sig transaction described by `params`.
pub fn transaction_from_params(params: &TransactionParams) -> Transaction {
    let network = if params.mainnet {
        Network::mainnet()
    } else {
        Network::testnet()
    };
    let origin = create_single_sig_condition(
        AddressHashMode::SerializeP2PKH,
        &params.key.public_key(),
        params.nonce,
        params.fee,
    )
    .expect("P2PKH accepts any key");
    let mut tx = Transaction::new(&network, TransactionAuth::standard(origin), params.payload.clone());
    tx.post_conditions = params.post_conditions.clone();
    tx
}
