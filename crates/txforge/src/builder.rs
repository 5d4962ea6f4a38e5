//! The transaction builder: assembles, prices, and signs transactions.

use std::sync::Arc;

use txforge_core::{
    create_multi_sig_condition, create_single_sig_condition, resolve_key_order, sign_in_key_order,
    Address, AddressHashMode, AnchorMode, AuthFlag, ClarityValue, ClarityVersion, KeyOrder, Payload,
    PostCondition, PostConditionMode, PrincipalData, PrivateKey, PublicKey, SpendingCondition,
    Transaction, TransactionAuth, TransactionSigner, TxError,
};

use crate::collaborators::{FeeEstimator, NonceProvider};
use crate::config::BuilderConfig;
use crate::error::{BuilderError, Result};

/// Serialized size of a signature field (`tag | signature`).
const SIGNATURE_FIELD_LEN: usize = 1 + 65;
/// Serialized size of a raw public-key field (`tag | compressed key`).
const PUBLIC_KEY_FIELD_LEN: usize = 1 + 33;

/// Members of a multi-sig account.
#[derive(Debug, Clone)]
pub struct MultiSigCredentials {
    pub public_keys: Vec<PublicKey>,
    pub signatures_required: u16,
    /// Private keys available to sign now; members without one are
    /// appended as raw public keys.
    pub signers: Vec<PrivateKey>,
    /// When set, the key order is resolved against this address.
    pub address: Option<Address>,
    pub hash_mode: AddressHashMode,
}

impl MultiSigCredentials {
    pub fn new(public_keys: Vec<PublicKey>, signatures_required: u16) -> Self {
        Self {
            public_keys,
            signatures_required,
            signers: Vec::new(),
            address: None,
            hash_mode: AddressHashMode::SerializeP2SH,
        }
    }

    pub fn signers(mut self, signers: Vec<PrivateKey>) -> Self {
        self.signers = signers;
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn hash_mode(mut self, hash_mode: AddressHashMode) -> Self {
        self.hash_mode = hash_mode;
        self
    }
}

/// A single-sig account under an explicit hash mode.
#[derive(Debug, Clone)]
pub struct SingleSigCredentials {
    public_key: PublicKey,
    signer: Option<PrivateKey>,
    hash_mode: AddressHashMode,
}

impl SingleSigCredentials {
    /// Left unsigned.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            signer: None,
            hash_mode: AddressHashMode::SerializeP2PKH,
        }
    }

    /// Signed during assembly.
    pub fn signed(private_key: PrivateKey) -> Self {
        Self {
            public_key: private_key.public_key(),
            signer: Some(private_key),
            hash_mode: AddressHashMode::SerializeP2PKH,
        }
    }

    /// `SerializeP2PKH` (the default) or `SerializeP2WPKH`.
    pub fn hash_mode(mut self, hash_mode: AddressHashMode) -> Self {
        self.hash_mode = hash_mode;
        self
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// Who authorizes a transaction, and whether they sign now.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Single-sig P2PKH, left unsigned.
    PublicKey(PublicKey),
    /// Single-sig P2PKH, signed during assembly.
    PrivateKey(PrivateKey),
    SingleSig(SingleSigCredentials),
    MultiSig(MultiSigCredentials),
}

impl Credentials {
    fn is_multi_sig(&self) -> bool {
        matches!(self, Credentials::MultiSig(_))
    }

    /// Multi-sig signers, when supplied, must all be members and must be
    /// able to reach the threshold.
    fn check_signers(&self) -> Result<()> {
        let Credentials::MultiSig(multi) = self else {
            return Ok(());
        };
        if multi.signers.is_empty() {
            return Ok(());
        }
        for signer in &multi.signers {
            let point = signer.public_key().to_compressed_bytes();
            if !multi.public_keys.iter().any(|m| m.to_compressed_bytes() == point) {
                tracing::debug!(signer = ?signer.public_key(), "signing key is not a multi-sig member");
                return Err(TxError::AddressKeyMismatch.into());
            }
        }
        let members = multi.signers.len();
        if members < multi.signatures_required as usize {
            return Err(BuilderError::InvalidOptions(format!(
                "{} signatures required, {} member keys supplied",
                multi.signatures_required, members
            )));
        }
        Ok(())
    }
}

/// Per-transaction options. `None` fee or nonce asks the collaborators;
/// `Some(0)` is taken literally.
#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    pub fee: Option<u64>,
    pub nonce: Option<u64>,
    /// Build a sponsored transaction; the fee is set at sponsor time.
    pub sponsored: bool,
    pub anchor_mode: Option<AnchorMode>,
    pub post_condition_mode: Option<PostConditionMode>,
    pub post_conditions: Vec<PostCondition>,
}

impl TxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn sponsored(mut self) -> Self {
        self.sponsored = true;
        self
    }

    pub fn anchor_mode(mut self, mode: AnchorMode) -> Self {
        self.anchor_mode = Some(mode);
        self
    }

    pub fn post_condition_mode(mut self, mode: PostConditionMode) -> Self {
        self.post_condition_mode = Some(mode);
        self
    }

    pub fn post_condition(mut self, condition: PostCondition) -> Self {
        self.post_conditions.push(condition);
        self
    }
}

/// Fee and nonce for the sponsor; `None` asks the collaborators.
#[derive(Debug, Clone, Copy, Default)]
pub struct SponsorOptions {
    pub fee: Option<u64>,
    pub nonce: Option<u64>,
}

/// Arguments of an inference task.
#[derive(Debug, Clone)]
pub struct InferTaskArgs {
    pub user: PrincipalData,
    pub amount: u64,
    pub input: String,
    pub context: String,
    pub node: PrincipalData,
    pub model: String,
}

/// A condition ready to be attached, plus how to sign it.
struct PreparedCondition {
    condition: SpendingCondition,
    /// Multi-sig keys in address order.
    ordered_keys: Vec<PublicKey>,
    /// Bytes the still-missing authorization fields will add.
    pending_len: usize,
}

/// Assembles transactions against a fee estimator and a nonce provider.
pub struct TransactionBuilder<F, N> {
    config: BuilderConfig,
    fees: Arc<F>,
    nonces: Arc<N>,
}

impl<F: FeeEstimator, N: NonceProvider> TransactionBuilder<F, N> {
    pub fn new(config: BuilderConfig, fees: F, nonces: N) -> Self {
        Self::with_shared(config, Arc::new(fees), Arc::new(nonces))
    }

    /// Share collaborators with other builders.
    pub fn with_shared(config: BuilderConfig, fees: Arc<F>, nonces: Arc<N>) -> Self {
        Self { config, fees, nonces }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn fees(&self) -> &F {
        &self.fees
    }

    pub fn nonces(&self) -> &N {
        &self.nonces
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payload flows
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn make_token_transfer(
        &self,
        recipient: PrincipalData,
        amount: u64,
        memo: &str,
        credentials: &Credentials,
        options: TxOptions,
    ) -> Result<Transaction> {
        let payload = Payload::token_transfer(recipient, amount, memo)?;
        self.build(payload, credentials, options).await
    }

    pub async fn make_contract_call(
        &self,
        contract_address: Address,
        contract_name: &str,
        function_name: &str,
        function_args: Vec<ClarityValue>,
        credentials: &Credentials,
        options: TxOptions,
    ) -> Result<Transaction> {
        let payload = Payload::contract_call(contract_address, contract_name, function_name, function_args)?;
        self.build(payload, credentials, options).await
    }

    pub async fn make_contract_deploy(
        &self,
        contract_name: &str,
        code_body: &str,
        clarity_version: Option<ClarityVersion>,
        credentials: &Credentials,
        options: TxOptions,
    ) -> Result<Transaction> {
        let payload = Payload::smart_contract(contract_name, code_body, clarity_version)?;
        self.build(payload, credentials, options).await
    }

    pub async fn make_infer_task(
        &self,
        args: InferTaskArgs,
        credentials: &Credentials,
        options: TxOptions,
    ) -> Result<Transaction> {
        let payload = Payload::infer_task(
            args.user,
            args.amount,
            &args.input,
            &args.context,
            args.node,
            &args.model,
        )?;
        self.build(payload, credentials, options).await
    }

    pub async fn make_register_model(
        &self,
        model_name: &str,
        model_params: &str,
        credentials: &Credentials,
        options: TxOptions,
    ) -> Result<Transaction> {
        let payload = Payload::register_model(model_name, model_params)?;
        self.build(payload, credentials, options).await
    }

    /// Assemble, price, and (when keys are supplied) sign a transaction for
    /// any payload.
    pub async fn build(&self, payload: Payload, credentials: &Credentials, options: TxOptions) -> Result<Transaction> {
        let payload_type = payload.payload_type();
        if credentials.is_multi_sig() && !payload_type.supports_multi_sig() {
            return Err(TxError::UnsupportedMultiSig(payload_type.to_string()).into());
        }
        if options.sponsored && options.fee.is_some_and(|fee| fee != 0) {
            return Err(BuilderError::InvalidOptions(
                "a sponsored origin pays no fee; set the fee when sponsoring".into(),
            ));
        }

        credentials.check_signers()?;
        let prepared = prepare_condition(credentials)?;
        let auth = if options.sponsored {
            TransactionAuth::sponsored(prepared.condition)
        } else {
            TransactionAuth::standard(prepared.condition)
        };

        let mut tx = Transaction::new(&self.config.network, auth, payload);
        tx.anchor_mode = options.anchor_mode.unwrap_or(self.config.anchor_mode);
        tx.post_condition_mode = options.post_condition_mode.unwrap_or(self.config.post_condition_mode);
        tx.post_conditions = options.post_conditions;

        if !options.sponsored {
            let fee = match options.fee {
                Some(fee) => fee,
                None => self.estimate_fee(&tx, prepared.pending_len).await?,
            };
            tx.set_fee(fee);
        }

        let nonce = match options.nonce {
            Some(nonce) => nonce,
            None => {
                let address = tx.origin_address()?;
                let nonce = self.nonces.next_nonce(&address).await?;
                tracing::debug!(address = %address, nonce, "origin nonce looked up");
                nonce
            }
        };
        tx.set_nonce(nonce);

        sign_condition(&mut tx, AuthFlag::Standard, credentials, &prepared.ordered_keys)?;

        tracing::debug!(
            payload = %payload_type,
            fee = tx.fee(),
            nonce = tx.nonce(),
            sponsored = tx.auth.is_sponsored(),
            "transaction assembled"
        );
        Ok(tx)
    }

    /// Attach and sign the sponsor of an origin-signed sponsored transaction.
    pub async fn sponsor_transaction(
        &self,
        mut tx: Transaction,
        sponsor: &Credentials,
        options: SponsorOptions,
    ) -> Result<Transaction> {
        if !tx.auth.is_sponsored() {
            return Err(TxError::NotSponsored.into());
        }
        let payload_type = tx.payload.payload_type();
        if sponsor.is_multi_sig() && !payload_type.supports_multi_sig() {
            return Err(TxError::UnsupportedMultiSig(payload_type.to_string()).into());
        }
        if !tx.auth.origin().is_fully_signed() {
            return Err(TxError::OriginNotSigned.into());
        }

        sponsor.check_signers()?;
        let prepared = prepare_condition(sponsor)?;
        tx.set_sponsor(prepared.condition)?;

        let fee = match options.fee {
            Some(fee) => fee,
            None => self.estimate_fee(&tx, prepared.pending_len).await?,
        };
        tx.set_fee(fee);

        let nonce = match options.nonce {
            Some(nonce) => nonce,
            None => match tx.sponsor_address()? {
                Some(address) => self.nonces.next_nonce(&address).await?,
                None => return Err(TxError::NotSponsored.into()),
            },
        };
        if let Some(condition) = tx.auth.sponsor_mut() {
            condition.set_nonce(nonce);
        }

        sign_condition(&mut tx, AuthFlag::Sponsored, sponsor, &prepared.ordered_keys)?;

        tracing::debug!(fee, nonce, txid = %tx.txid(), "sponsor attached");
        Ok(tx)
    }

    async fn estimate_fee(&self, tx: &Transaction, pending_len: usize) -> Result<u64> {
        let estimated_len = tx.serialize().len() + pending_len;
        let fee = self.fees.estimate_fee(tx, estimated_len).await?;
        tracing::debug!(fee, estimated_len, "fee estimated");
        Ok(fee)
    }
}

/// Build the unsigned condition for `credentials` with zero fee and nonce.
fn prepare_condition(credentials: &Credentials) -> Result<PreparedCondition> {
    match credentials {
        Credentials::PublicKey(public_key) => single_sig(AddressHashMode::SerializeP2PKH, public_key),
        Credentials::PrivateKey(private_key) => single_sig(AddressHashMode::SerializeP2PKH, &private_key.public_key()),
        Credentials::SingleSig(single) => single_sig(single.hash_mode, &single.public_key),
        Credentials::MultiSig(multi) => {
            let required = multi.signatures_required as usize;
            let ordered_keys = match &multi.address {
                Some(address) => {
                    let (order, keys) =
                        resolve_key_order(multi.hash_mode, required, &multi.public_keys, address.hash160())?;
                    if order == KeyOrder::Sorted {
                        tracing::debug!(address = %address, "multi-sig keys resolved in sorted order");
                    }
                    keys
                }
                None => multi.public_keys.clone(),
            };
            let condition =
                create_multi_sig_condition(multi.hash_mode, multi.signatures_required, &ordered_keys, 0, 0)?;
            let unsigned = ordered_keys.len().saturating_sub(required);
            Ok(PreparedCondition {
                condition,
                pending_len: required * SIGNATURE_FIELD_LEN + unsigned * PUBLIC_KEY_FIELD_LEN,
                ordered_keys,
            })
        }
    }
}

fn single_sig(hash_mode: AddressHashMode, public_key: &PublicKey) -> Result<PreparedCondition> {
    Ok(PreparedCondition {
        condition: create_single_sig_condition(hash_mode, public_key, 0, 0)?,
        ordered_keys: Vec::new(),
        // The signature slot is already part of the encoding.
        pending_len: 0,
    })
}

/// Append whatever signatures `credentials` can provide for `flag`'s condition.
fn sign_condition(
    tx: &mut Transaction,
    flag: AuthFlag,
    credentials: &Credentials,
    ordered_keys: &[PublicKey],
) -> Result<()> {
    match credentials {
        Credentials::PublicKey(_) => Ok(()),
        Credentials::SingleSig(SingleSigCredentials { signer: None, .. }) => Ok(()),
        Credentials::PrivateKey(private_key)
        | Credentials::SingleSig(SingleSigCredentials {
            signer: Some(private_key),
            ..
        }) => {
            let mut signer = TransactionSigner::new(tx)?;
            signer.sign_as(flag, private_key)?;
            Ok(())
        }
        Credentials::MultiSig(multi) if multi.signers.is_empty() => Ok(()),
        Credentials::MultiSig(multi) => {
            let mut signer = TransactionSigner::new(tx)?;
            let signed = sign_in_key_order(&mut signer, flag, ordered_keys, &multi.signers)?;
            tracing::debug!(signed, flag = ?flag, "multi-sig members signed in key order");
            Ok(())
        }
    }
}
