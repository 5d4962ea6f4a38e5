//! # txforge
//!
//! Transaction assembly on top of [`txforge_core`]: builds token transfers,
//! contract calls, contract deploys, inference tasks and model registrations,
//! fills in fees and nonces from external collaborators, and signs.
//!
//! ## Overview
//!
//! - **Builder**: [`TransactionBuilder`] assembles and signs one transaction per call
//! - **Collaborators**: [`FeeEstimator`] and [`NonceProvider`] are consulted
//!   only when the caller leaves a fee or nonce unset
//! - **Sponsorship**: [`TransactionBuilder::sponsor_transaction`] attaches and
//!   signs the paying party of an origin-signed transaction
//!
//! ## Usage
//!
//! ```rust,no_run
//! use txforge::{BuilderConfig, Credentials, FixedFee, MemoryNonces, TransactionBuilder, TxOptions};
//! use txforge::core::{PrincipalData, PrivateKey};
//!
//! async fn example() -> txforge::Result<()> {
//!     let builder = TransactionBuilder::new(BuilderConfig::testnet(), FixedFee(180), MemoryNonces::new());
//!     let key = PrivateKey::from_hex("edf9aee84d9b7abc145504dde6726c64f369d37ee34ded868fabd876c26570bc01")?;
//!     let recipient: PrincipalData = "STAW66WC3G8WA5F28JVNG1NTRJ6H76E7EMHDBMBN".parse()?;
//!
//!     let tx = builder
//!         .make_token_transfer(recipient, 100, "", &Credentials::PrivateKey(key), TxOptions::new())
//!         .await?;
//!     println!("{}", tx.serialize_hex());
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod collaborators;
pub mod config;
pub mod error;

pub use txforge_core as core;

pub use builder::{
    Credentials, InferTaskArgs, MultiSigCredentials, SingleSigCredentials, SponsorOptions, TransactionBuilder,
    TxOptions,
};
pub use collaborators::{
    CollaboratorError, FeeEstimator, FeeRateEstimator, FixedFee, MemoryNonces, NonceProvider,
};
pub use config::BuilderConfig;
pub use error::{BuilderError, Result};

pub use txforge_core::{Transaction, Txid};
