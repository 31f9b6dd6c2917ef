//! # Space Kernel Testkit
//!
//! Testing utilities for the Space Kernel.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Canonical JSON and signing bytes every implementation must reproduce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic accounts and identity directories
//!
//! ## Golden Vectors
//!
//! ```rust
//! use space_kernel_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().expect("canonicalization matches");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use space_kernel_testkit::generators::space_transaction;
//!
//! proptest! {
//!     #[test]
//!     fn signing_bytes_are_deterministic(tx in space_transaction()) {
//!         prop_assert_eq!(tx.signing_bytes().unwrap(), tx.signing_bytes().unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use space_kernel_testkit::fixtures::{directory_for, multi_party_accounts};
//!
//! let accounts = multi_party_accounts(3);
//! let directory = directory_for(&accounts);
//! assert_eq!(directory.len(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{directory_for, multi_party_accounts, TestAccount};
pub use generators::{account_address, event_hash, signing_keypair, space_transaction};
pub use vectors::{all_vectors, transaction_vectors, verify_all_vectors, GoldenVector, TransactionVector};
