//! Identity verification capability.
//!
//! The reducer never looks identities up itself. Callers inject an
//! [`IdentityResolver`], which may be backed by a local cache, a directory
//! service or on-chain state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use space_kernel_core::{AccountAddress, SignaturePublicKey};
use space_kernel_keys::EncryptionPublicKey;

use crate::error::InvalidIdentityError;

/// The public half of an account's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentity {
    pub account_address: AccountAddress,
    pub signature_public_key: SignaturePublicKey,
    pub encryption_public_key: EncryptionPublicKey,
}

/// Resolves an account address to a verified public identity.
pub trait IdentityResolver {
    /// Look up the verified identity of `account_address`.
    ///
    /// `signature_public_key` is the key recovered from the event being
    /// checked, for resolvers that index identities by key.
    fn get_verified_identity(
        &self,
        account_address: &AccountAddress,
        signature_public_key: Option<&SignaturePublicKey>,
    ) -> Result<PublicIdentity, InvalidIdentityError>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&AccountAddress, Option<&SignaturePublicKey>) -> Result<PublicIdentity, InvalidIdentityError>,
{
    fn get_verified_identity(
        &self,
        account_address: &AccountAddress,
        signature_public_key: Option<&SignaturePublicKey>,
    ) -> Result<PublicIdentity, InvalidIdentityError> {
        self(account_address, signature_public_key)
    }
}

/// An in-memory directory of known identities.
#[derive(Debug, Clone, Default)]
pub struct IdentityDirectory {
    identities: BTreeMap<AccountAddress, PublicIdentity>,
}

impl IdentityDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an identity.
    pub fn insert(&mut self, identity: PublicIdentity) -> Option<PublicIdentity> {
        self.identities.insert(identity.account_address.clone(), identity)
    }

    /// Remove an identity.
    pub fn remove(&mut self, account_address: &AccountAddress) -> Option<PublicIdentity> {
        self.identities.remove(account_address)
    }

    /// Get an identity without verification semantics.
    pub fn get(&self, account_address: &AccountAddress) -> Option<&PublicIdentity> {
        self.identities.get(account_address)
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl FromIterator<PublicIdentity> for IdentityDirectory {
    fn from_iter<I: IntoIterator<Item = PublicIdentity>>(iter: I) -> Self {
        let mut directory = Self::new();
        for identity in iter {
            directory.insert(identity);
        }
        directory
    }
}

impl IdentityResolver for IdentityDirectory {
    // One identity per account, so the key hint is not needed for lookup.
    // The caller compares the returned key with the one it recovered.
    fn get_verified_identity(
        &self,
        account_address: &AccountAddress,
        _signature_public_key: Option<&SignaturePublicKey>,
    ) -> Result<PublicIdentity, InvalidIdentityError> {
        self.identities
            .get(account_address)
            .cloned()
            .ok_or_else(|| InvalidIdentityError::new(format!("unknown account {account_address}")))
    }
}
