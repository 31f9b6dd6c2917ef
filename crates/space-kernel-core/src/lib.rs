//! # Space Kernel Core
//!
//! Pure primitives for the Space Kernel: canonical JSON, hashing and
//! recoverable signatures.
//!
//! This crate contains no I/O, no storage, no networking. Everything here
//! is deterministic computation that every peer in a space must agree on
//! byte for byte.
//!
//! ## Key Types
//!
//! - [`AccountAddress`] - The identity that authors events
//! - [`EventHash`] - Content hash of an event (SHA-256, lowercase hex)
//! - [`SigningKeypair`] - secp256k1 key that signs transactions
//! - [`RecoverableSignature`] - Compact signature plus recovery bit
//!
//! ## Canonicalization
//!
//! Every hash and signature input is canonical JSON (RFC 8785). See the
//! [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod types;
pub mod wire;

pub use canonical::{canonical_bytes, canonicalize};
pub use crypto::{
    keccak256, personal_message_hash, RecoverableSignature, Sha256Hash, SignaturePublicKey,
    SigningKeypair, WalletSignature,
};
pub use error::{CanonicalError, CryptoError, ErrorPayload};
pub use types::{AccountAddress, EventHash};
