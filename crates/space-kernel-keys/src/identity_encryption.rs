//! Wallet-keyed encryption of an account's identity keys at rest.
//!
//! The wallet signs a nonce-bound sign-in message. The signature is first
//! checked to recover the claimed account, then hashed into a symmetric
//! key that protects the account's signing and encryption secrets.
//!
//! Wallets disagree on the encoding of the recovery byte (27/28 or 0/1),
//! which changes the derived key. Decryption retries with the alternate
//! encoding before giving up.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use space_kernel_core::wire::{decode_hex_array, hex_bytes, to_prefixed_hex};
use space_kernel_core::{canonical_bytes, AccountAddress, SigningKeypair, WalletSignature};

use crate::crypto::{EncryptionSecretKey, SymmetricKey};
use crate::error::{IdentityEncryptionError, KeyBoxError};

const IDENTITY_KEY_CONTEXT: &str = "space-kernel v1 identity-encryption";

/// Something that can produce EIP-191 personal signatures for an account.
pub trait WalletSigner {
    /// The account the wallet signs for.
    fn account_address(&self) -> Result<AccountAddress, IdentityEncryptionError>;

    /// Sign a personal message.
    fn sign_message(&self, message: &str) -> Result<WalletSignature, IdentityEncryptionError>;
}

impl WalletSigner for SigningKeypair {
    fn account_address(&self) -> Result<AccountAddress, IdentityEncryptionError> {
        Ok(SigningKeypair::account_address(self)?)
    }

    fn sign_message(&self, message: &str) -> Result<WalletSignature, IdentityEncryptionError> {
        Ok(self.sign_personal_message(message)?)
    }
}

/// The message a wallet signs to unlock an identity.
pub fn identity_sign_in_message(account_address: &AccountAddress, nonce: &str) -> String {
    format!(
        "Sign this message to unlock your space identity.\n\nAccount: {account_address}\nNonce: {nonce}"
    )
}

/// An account's private identity keys.
#[derive(Debug, Clone)]
pub struct IdentityKeys {
    pub signing_key: SigningKeypair,
    pub encryption_key: EncryptionSecretKey,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityKeysWire {
    signature_private_key: String,
    encryption_private_key: String,
}

impl IdentityKeys {
    fn to_plaintext(&self) -> Result<Vec<u8>, IdentityEncryptionError> {
        let wire = IdentityKeysWire {
            signature_private_key: to_prefixed_hex(&self.signing_key.secret_bytes()),
            encryption_private_key: to_prefixed_hex(&self.encryption_key.to_bytes()),
        };
        canonical_bytes(&wire).map_err(|e| IdentityEncryptionError::Serialization(e.to_string()))
    }

    fn from_plaintext(bytes: &[u8]) -> Result<Self, IdentityEncryptionError> {
        let wire: IdentityKeysWire = serde_json::from_slice(bytes)
            .map_err(|e| IdentityEncryptionError::Serialization(e.to_string()))?;
        let encryption_key = decode_hex_array::<32>(&wire.encryption_private_key)
            .map_err(|e| IdentityEncryptionError::Serialization(e.to_string()))?;
        Ok(Self {
            signing_key: SigningKeypair::from_hex(&wire.signature_private_key)?,
            encryption_key: EncryptionSecretKey::from_bytes(encryption_key),
        })
    }
}

/// Identity keys encrypted under a wallet-derived key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedIdentity {
    pub account_address: AccountAddress,
    /// Nonce bound into the sign-in message.
    pub sign_in_nonce: String,
    /// `nonce || ciphertext`.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
}

fn derive_identity_key(signature: &WalletSignature) -> SymmetricKey {
    SymmetricKey::from_bytes(blake3::derive_key(IDENTITY_KEY_CONTEXT, &signature.0))
}

/// Sign the sign-in message and check it recovers the wallet's account.
fn verified_signature(
    signer: &impl WalletSigner,
    account_address: &AccountAddress,
    sign_in_nonce: &str,
) -> Result<WalletSignature, IdentityEncryptionError> {
    let message = identity_sign_in_message(account_address, sign_in_nonce);
    let signature = signer.sign_message(&message)?;
    let recovered = signature.recover_address(&message)?;
    if !recovered.as_str().eq_ignore_ascii_case(account_address.as_str()) {
        return Err(IdentityEncryptionError::SignerMismatch {
            expected: account_address.clone(),
            recovered,
        });
    }
    Ok(signature)
}

/// Encrypt identity keys with a key derived from the wallet's signature.
pub fn encrypt_identity(
    signer: &impl WalletSigner,
    keys: &IdentityKeys,
) -> Result<EncryptedIdentity, IdentityEncryptionError> {
    let account_address = signer.account_address()?;

    let mut nonce = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut nonce);
    let sign_in_nonce = to_prefixed_hex(&nonce);

    let signature = verified_signature(signer, &account_address, &sign_in_nonce)?;
    let ciphertext = derive_identity_key(&signature).seal(&keys.to_plaintext()?)?;

    Ok(EncryptedIdentity {
        account_address,
        sign_in_nonce,
        ciphertext,
    })
}

/// Decrypt identity keys, retrying with the alternate recovery encoding.
pub fn decrypt_identity(
    signer: &impl WalletSigner,
    encrypted: &EncryptedIdentity,
) -> Result<IdentityKeys, IdentityEncryptionError> {
    let signature = verified_signature(signer, &encrypted.account_address, &encrypted.sign_in_nonce)?;

    let plaintext = match derive_identity_key(&signature).open(&encrypted.ciphertext) {
        Ok(plaintext) => plaintext,
        Err(KeyBoxError::DecryptionFailed) => {
            tracing::debug!(
                account = %encrypted.account_address,
                "identity decryption failed, retrying with alternate recovery byte"
            );
            let alternate = signature.with_alternate_recovery_encoding();
            derive_identity_key(&alternate)
                .open(&encrypted.ciphertext)
                .map_err(|_| IdentityEncryptionError::DecryptionFailed)?
        }
        Err(e) => return Err(e.into()),
    };

    IdentityKeys::from_plaintext(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A wallet that reports the recovery byte as 0/1.
    struct LegacyWallet(SigningKeypair);

    impl WalletSigner for LegacyWallet {
        fn account_address(&self) -> Result<AccountAddress, IdentityEncryptionError> {
            WalletSigner::account_address(&self.0)
        }

        fn sign_message(&self, message: &str) -> Result<WalletSignature, IdentityEncryptionError> {
            Ok(self.0.sign_message(message)?.with_alternate_recovery_encoding())
        }
    }

    /// A wallet claiming an account it cannot sign for.
    struct ImpostorWallet(SigningKeypair);

    impl WalletSigner for ImpostorWallet {
        fn account_address(&self) -> Result<AccountAddress, IdentityEncryptionError> {
            Ok(AccountAddress::new("0x0000000000000000000000000000000000000bad"))
        }

        fn sign_message(&self, message: &str) -> Result<WalletSignature, IdentityEncryptionError> {
            self.0.sign_message(message)
        }
    }

    fn identity_keys() -> IdentityKeys {
        IdentityKeys {
            signing_key: SigningKeypair::from_seed(&[0x33; 32]).unwrap(),
            encryption_key: EncryptionSecretKey::from_bytes([0x44; 32]),
        }
    }

    #[test]
    fn test_identity_roundtrip() {
        let wallet = SigningKeypair::from_seed(&[0x55; 32]).unwrap();
        let keys = identity_keys();

        let encrypted = encrypt_identity(&wallet, &keys).unwrap();
        assert_eq!(encrypted.account_address, wallet.account_address().unwrap());

        let decrypted = decrypt_identity(&wallet, &encrypted).unwrap();
        assert_eq!(decrypted.signing_key.secret_bytes(), keys.signing_key.secret_bytes());
        assert_eq!(decrypted.encryption_key.to_bytes(), keys.encryption_key.to_bytes());
    }

    #[test]
    fn test_legacy_recovery_byte_fallback() {
        let keypair = SigningKeypair::from_seed(&[0x66; 32]).unwrap();
        let keys = identity_keys();

        // Encrypted by a wallet using 0/1, decrypted by one using 27/28
        let encrypted = encrypt_identity(&LegacyWallet(keypair.clone()), &keys).unwrap();
        let decrypted = decrypt_identity(&keypair, &encrypted).unwrap();
        assert_eq!(decrypted.signing_key.secret_bytes(), keys.signing_key.secret_bytes());

        // And the other way round
        let encrypted = encrypt_identity(&keypair, &keys).unwrap();
        let decrypted = decrypt_identity(&LegacyWallet(keypair), &encrypted).unwrap();
        assert_eq!(decrypted.encryption_key.to_bytes(), keys.encryption_key.to_bytes());
    }

    #[test]
    fn test_wrong_wallet_cannot_decrypt() {
        let owner = SigningKeypair::from_seed(&[0x77; 32]).unwrap();
        let other = SigningKeypair::from_seed(&[0x78; 32]).unwrap();

        let mut encrypted = encrypt_identity(&owner, &identity_keys()).unwrap();
        // Pretend the other wallet owns the record: signature verifies, key differs
        encrypted.account_address = other.account_address().unwrap();

        assert!(matches!(
            decrypt_identity(&other, &encrypted),
            Err(IdentityEncryptionError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_signer_must_match_account() {
        let wallet = ImpostorWallet(SigningKeypair::generate());
        assert!(matches!(
            encrypt_identity(&wallet, &identity_keys()),
            Err(IdentityEncryptionError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn test_sign_in_message_binds_nonce() {
        let address = AccountAddress::new("0xabc");
        let a = identity_sign_in_message(&address, "0x01");
        let b = identity_sign_in_message(&address, "0x02");
        assert_ne!(a, b);
        assert!(a.contains("0xabc"));
    }
}
