//! # Space Kernel
//!
//! The unified API for space membership: who is in a space, what role each
//! member holds, and how the space's secret key reaches new members.
//!
//! ## Overview
//!
//! The Space Kernel is a pure, deterministic protocol library:
//!
//! - **Events**: Signed transactions forming a hash-chained log per space
//! - **State**: Membership folded from the log by a single reducer
//! - **Key boxes**: Secrets sealed for exactly one recipient
//! - **Inboxes**: Published keys that accept sealed messages
//!
//! It does no I/O. Transport, persistence and retries belong to the caller.
//!
//! ## Key Concepts
//!
//! - **Chain tip**: Every event names the hash of its predecessor. Two events
//!   built on the same tip cannot both enter one history.
//! - **Identity resolver**: Injected lookup binding account addresses to keys.
//! - **Snapshots**: Applying an event yields a new state; old ones stay valid.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use space_kernel::{Role, SpaceLog, SpaceLogConfig};
//! use space_kernel::events::{EventAuthor, IdentityDirectory};
//!
//! fn example(directory: IdentityDirectory, alice: EventAuthor, bob: EventAuthor) {
//!     let mut log = SpaceLog::new(directory, SpaceLogConfig::default());
//!
//!     log.create_space(&alice, None).unwrap();
//!     log.invite(&alice, bob.account_address.clone()).unwrap();
//!     log.accept_invitation(&bob).unwrap();
//!
//!     let state = log.state().unwrap();
//!     assert_eq!(state.role_of(&bob.account_address), Some(Role::Member));
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `space_kernel::core` - Canonical JSON, hashing, signatures
//! - `space_kernel::keys` - Key boxes, space keys, inboxes, identity encryption
//! - `space_kernel::events` - Events, constructors, reducer

pub mod config;
pub mod error;
pub mod space_log;
pub mod updates;

// Re-export component crates
pub use space_kernel_core as core;
pub use space_kernel_events as events;
pub use space_kernel_keys as keys;

// Re-export main types for convenience
pub use config::SpaceLogConfig;
pub use error::{KernelError, Result};
pub use space_log::{ForkEvidence, IngestResult, SpaceLog};
pub use updates::{check_update_clock, UpdateClock, Updates, UpdatesError};

// Re-export commonly used types
pub use space_kernel_core::{canonicalize, AccountAddress, EventHash, SigningKeypair};
pub use space_kernel_events::{
    apply_event, hash_event, ApplyError, EventAuthor, IdentityDirectory, IdentityResolver,
    PublicIdentity, Role, SpaceEvent, SpaceState, SpaceTransaction,
};
pub use space_kernel_keys::{
    decrypt_key_box, encrypt_key_box, EncryptionKeypair, EncryptionPublicKey, KeyBox, SpaceKey,
};
