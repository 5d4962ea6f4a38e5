//! # txforge testkit
//!
//! Testing utilities for txforge.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Transactions with pinned unsigned bytes, signed bytes and txids
//! - **Generators**: Proptest strategies for Clarity values, payloads and transactions
//! - **Fixtures**: Deterministic keys and accounts
//!
//! ## Golden Vectors
//!
//! ```rust
//! use txforge_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! verify_all_vectors().unwrap();
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.txid);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use txforge_testkit::generators::{transaction_from_params, transaction_params};
//!
//! proptest! {
//!     #[test]
//!     fn txid_is_deterministic(params in transaction_params()) {
//!         let a = transaction_from_params(&params);
//!         let b = transaction_from_params(&params);
//!         prop_assert_eq!(a.txid(), b.txid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use txforge_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let tx = fixture.transfer(100, 10, 0);
//! assert_eq!(tx.fee(), 10);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{member_keys, private_key, recipient, TestFixture};
pub use generators::{transaction_from_params, TransactionParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
