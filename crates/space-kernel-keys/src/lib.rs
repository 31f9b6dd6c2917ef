//! # Space Kernel Keys
//!
//! Secret distribution for spaces: key boxes, space keys, inboxes and
//! wallet-keyed identity encryption.
//!
//! ## Overview
//!
//! Membership is proven by the event log; secrets travel beside it. A
//! space's symmetric key is sealed in a [`KeyBox`] for each member that
//! needs it, and only that member's encryption secret key opens the box.
//!
//! ## Key Concepts
//!
//! - **KeyBox**: A secret sealed from one curve25519 key to another
//! - **SpaceKey**: The symmetric key protecting a space's content
//! - **Inbox**: A published keypair that accepts sealed messages
//! - **EncryptedIdentity**: An account's private keys under a wallet-derived key
//!
//! ## Encryption Model
//!
//! 1. **Key box**: NaCl `crypto_box` (X25519, XSalsa20-Poly1305)
//! 2. **Space key**: self-boxed by the creator, re-boxed by an admin per invitee
//! 3. **Inbox secret**: sealed with the space key, or boxed to the owning account
//! 4. **Symmetric sealing**: XChaCha20-Poly1305 under a space key or a
//!    BLAKE3-derived wallet key
//!
//! Failures to open a box are always errors. Callers must never treat
//! "cannot decrypt" as "no secret".

pub mod crypto;
pub mod distribution;
pub mod error;
pub mod identity_encryption;
pub mod inbox;
pub mod keybox;

pub use crypto::{
    BoxNonce, EncryptionKeypair, EncryptionPublicKey, EncryptionSecretKey, SymmetricKey,
    NONCE_LENGTH, TAG_LENGTH,
};
pub use distribution::{
    generate_space_key, open_space_key, seal_space_key_for_creator, seal_space_key_for_invitee,
    SpaceKey, SpaceKeyBox,
};
pub use error::{IdentityEncryptionError, KeyBoxError, KeysError, Result};
pub use identity_encryption::{
    decrypt_identity, encrypt_identity, identity_sign_in_message, EncryptedIdentity, IdentityKeys,
    WalletSigner,
};
pub use inbox::{
    check_auth_policy, create_account_inbox, create_space_inbox, open_account_inbox_secret,
    open_inbox_message, open_space_inbox_secret, seal_inbox_message, Inbox, InboxAuthPolicy,
    InboxMessage, InboxMessageAuthor,
};
pub use keybox::{decrypt_key_box, encrypt_key_box, DecryptKeyBoxParams, EncryptKeyBoxParams, KeyBox};
