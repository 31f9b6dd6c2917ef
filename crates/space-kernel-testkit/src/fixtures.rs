//! Test fixtures and helpers.
//!
//! Accounts with both identity keypairs and a ready-made directory.

use space_kernel_core::{AccountAddress, SigningKeypair};
use space_kernel_events::{EventAuthor, IdentityDirectory, PublicIdentity};
use space_kernel_keys::{EncryptionKeypair, EncryptionSecretKey};

/// A test account: a signing identity plus an encryption keypair.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub author: EventAuthor,
    pub encryption: EncryptionKeypair,
}

impl TestAccount {
    /// Create an account with random keys.
    pub fn new() -> Self {
        let author = EventAuthor::from_signing_key(SigningKeypair::generate())
            .expect("generated key has an address");
        Self {
            author,
            encryption: EncryptionKeypair::generate(),
        }
    }

    /// Create an account with deterministic keys from a seed.
    ///
    /// Panics if the seed is not a valid secp256k1 scalar.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKeypair::from_seed(&seed).expect("seed is a valid secp256k1 key");
        let author = EventAuthor::from_signing_key(signing_key).expect("valid key has an address");
        Self {
            author,
            encryption: EncryptionKeypair::from_secret(EncryptionSecretKey::from_bytes(seed)),
        }
    }

    /// The account address.
    pub fn address(&self) -> &AccountAddress {
        &self.author.account_address
    }

    /// The account's public identity.
    pub fn identity(&self) -> PublicIdentity {
        PublicIdentity {
            account_address: self.author.account_address.clone(),
            signature_public_key: self.author.signing_key.public_key(),
            encryption_public_key: self.encryption.public,
        }
    }
}

impl Default for TestAccount {
    fn default() -> Self {
        Self::new()
    }
}

/// Create deterministic accounts for multi-party tests.
pub fn multi_party_accounts(count: usize) -> Vec<TestAccount> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8 + 1;
            TestAccount::with_seed(seed)
        })
        .collect()
}

/// A directory holding the identities of `accounts`.
pub fn directory_for(accounts: &[TestAccount]) -> IdentityDirectory {
    accounts.iter().map(TestAccount::identity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_kernel_events::IdentityResolver;

    #[test]
    fn test_seeded_accounts_are_stable() {
        let a = TestAccount::with_seed([7; 32]);
        let b = TestAccount::with_seed([7; 32]);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_multi_party_accounts_distinct() {
        let accounts = multi_party_accounts(3);
        assert_ne!(accounts[0].address(), accounts[1].address());
        assert_ne!(accounts[1].address(), accounts[2].address());
    }

    #[test]
    fn test_directory_resolves_every_account() {
        let accounts = multi_party_accounts(4);
        let directory = directory_for(&accounts);
        for account in &accounts {
            let identity = directory.get_verified_identity(account.address(), None).unwrap();
            assert_eq!(identity, account.identity());
        }
    }
}
