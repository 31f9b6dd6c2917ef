//! # Space Kernel Events
//!
//! The hash-chained membership log of a space and the state machine that
//! folds it.
//!
//! ## Key Types
//!
//! - [`SpaceEvent`] - A signed transaction plus its author
//! - [`SpaceTransaction`] - create-space, create-invitation, accept-invitation, delete-space
//! - [`SpaceState`] - Members, removed members, open invitations and the chain tip
//! - [`IdentityResolver`] - Injected lookup of verified identities
//!
//! ## Applying Events
//!
//! ```rust,no_run
//! use space_kernel_events::{apply_event, create_space, EventAuthor, IdentityDirectory};
//! use space_kernel_core::SigningKeypair;
//!
//! fn genesis(directory: &IdentityDirectory) {
//!     let author = EventAuthor::from_signing_key(SigningKeypair::generate()).unwrap();
//!     let event = create_space(&author, None).unwrap();
//!     let state = apply_event(None, &event, directory).unwrap();
//!     assert!(state.is_member(&author.account_address));
//! }
//! ```

pub mod constructors;
pub mod error;
pub mod event;
pub mod identity;
pub mod reducer;
pub mod state;

pub use constructors::{accept_invitation, create_invitation, create_space, delete_space, EventAuthor};
pub use error::{
    ApplyError, InvalidEventError, InvalidIdentityError, ParseError, SignError, VerifySignatureError,
};
pub use event::{
    hash_event, parse_event, AcceptInvitationTransaction, Author, CreateInvitationTransaction,
    CreateSpaceTransaction, DeleteSpaceTransaction, SpaceEvent, SpaceTransaction,
};
pub use identity::{IdentityDirectory, IdentityResolver, PublicIdentity};
pub use reducer::{apply_event, apply_raw_event};
pub use state::{Invitation, Member, Role, SpaceState};
