//! Authenticated public-key encryption of secrets.
//!
//! A key box seals a secret (a space key or an inbox secret key) so that
//! only the holder of the recipient's encryption secret key can open it.
//!
//! The construction is NaCl `crypto_box`: X25519, HSalsa20, then
//! XSalsa20-Poly1305 under the caller's 24-byte nonce. Output is laid out
//! like `crypto_box_easy` (tag then ciphertext), so boxes cross freely
//! between NaCl and libsodium clients. Either side of the key agreement can
//! open the box, so a self-box (author == recipient) works with a single
//! keypair.
//!
//! There is no internal randomness: the same message, nonce and keys
//! always give the same ciphertext. Nonce freshness is the caller's job.

use crypto_box::aead::{generic_array::GenericArray, Aead};
use crypto_box::SalsaBox;
use serde::{Deserialize, Serialize};

use space_kernel_core::wire::hex_bytes;
use space_kernel_core::AccountAddress;

use crate::crypto::{BoxNonce, EncryptionPublicKey, EncryptionSecretKey, NONCE_LENGTH, TAG_LENGTH};
use crate::error::KeyBoxError;

/// Inputs to [`encrypt_key_box`].
#[derive(Debug, Clone, Copy)]
pub struct EncryptKeyBoxParams<'a> {
    pub message: &'a [u8],
    pub nonce: &'a [u8],
    /// The recipient's encryption public key.
    pub public_key: &'a EncryptionPublicKey,
    /// The author's encryption secret key.
    pub secret_key: &'a EncryptionSecretKey,
}

/// Inputs to [`decrypt_key_box`].
#[derive(Debug, Clone, Copy)]
pub struct DecryptKeyBoxParams<'a> {
    pub ciphertext: &'a [u8],
    pub nonce: &'a [u8],
    /// The author's encryption public key.
    pub public_key: &'a EncryptionPublicKey,
    /// The recipient's encryption secret key.
    pub secret_key: &'a EncryptionSecretKey,
}

fn salsa_box(
    secret_key: &EncryptionSecretKey,
    public_key: &EncryptionPublicKey,
) -> Result<SalsaBox, KeyBoxError> {
    // Low-order peer keys give an all-zero shared secret
    secret_key.diffie_hellman(public_key)?;
    Ok(SalsaBox::new(
        &crypto_box::PublicKey::from(*public_key.as_bytes()),
        &crypto_box::SecretKey::from(secret_key.to_bytes()),
    ))
}

/// Seal a message for the holder of `public_key`.
pub fn encrypt_key_box(params: EncryptKeyBoxParams<'_>) -> Result<Vec<u8>, KeyBoxError> {
    let nonce = BoxNonce::from_slice(params.nonce)?;
    salsa_box(params.secret_key, params.public_key)?
        .encrypt(GenericArray::from_slice(nonce.as_bytes()), params.message)
        .map_err(|_| KeyBoxError::EncryptionFailed)
}

/// Open a message sealed by the holder of `public_key`.
pub fn decrypt_key_box(params: DecryptKeyBoxParams<'_>) -> Result<Vec<u8>, KeyBoxError> {
    let nonce = BoxNonce::from_slice(params.nonce)?;
    if params.ciphertext.len() < TAG_LENGTH {
        return Err(KeyBoxError::CiphertextTooShort {
            minimum: TAG_LENGTH,
            actual: params.ciphertext.len(),
        });
    }
    salsa_box(params.secret_key, params.public_key)?
        .decrypt(GenericArray::from_slice(nonce.as_bytes()), params.ciphertext)
        .map_err(|_| KeyBoxError::DecryptionFailed)
}

/// A sealed secret addressed to one account.
///
/// Issued once per (secret, recipient) pair and never mutated. Rotating the
/// secret means issuing new boxes, not updating old ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBox {
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
    pub nonce: BoxNonce,
    /// Encryption public key of the account that sealed the box.
    pub author_public_key: EncryptionPublicKey,
    /// The account the box is addressed to.
    pub recipient_account_address: AccountAddress,
}

impl KeyBox {
    /// Seal `secret` from `author` to `recipient_public` under a fresh nonce.
    pub fn seal(
        secret: &[u8],
        author: &EncryptionSecretKey,
        recipient_public: &EncryptionPublicKey,
        recipient: AccountAddress,
    ) -> Result<Self, KeyBoxError> {
        let nonce = BoxNonce::generate();
        let ciphertext = encrypt_key_box(EncryptKeyBoxParams {
            message: secret,
            nonce: nonce.as_bytes(),
            public_key: recipient_public,
            secret_key: author,
        })?;

        Ok(Self {
            ciphertext,
            nonce,
            author_public_key: author.public_key(),
            recipient_account_address: recipient,
        })
    }

    /// Open the box with the recipient's secret key.
    pub fn open(&self, recipient_secret: &EncryptionSecretKey) -> Result<Vec<u8>, KeyBoxError> {
        decrypt_key_box(DecryptKeyBoxParams {
            ciphertext: &self.ciphertext,
            nonce: self.nonce.as_bytes(),
            public_key: &self.author_public_key,
            secret_key: recipient_secret,
        })
    }
}

/// Seal to a public key, prefixing the nonce: `nonce || ciphertext`.
pub(crate) fn seal_with_nonce(
    message: &[u8],
    author: &EncryptionSecretKey,
    recipient_public: &EncryptionPublicKey,
) -> Result<Vec<u8>, KeyBoxError> {
    let nonce = BoxNonce::generate();
    let ciphertext = encrypt_key_box(EncryptKeyBoxParams {
        message,
        nonce: nonce.as_bytes(),
        public_key: recipient_public,
        secret_key: author,
    })?;
    let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    sealed.extend_from_slice(nonce.as_bytes());
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open the output of [`seal_with_nonce`].
pub(crate) fn open_with_nonce(
    sealed: &[u8],
    author_public: &EncryptionPublicKey,
    recipient: &EncryptionSecretKey,
) -> Result<Vec<u8>, KeyBoxError> {
    if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(KeyBoxError::CiphertextTooShort {
            minimum: NONCE_LENGTH + TAG_LENGTH,
            actual: sealed.len(),
        });
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);
    decrypt_key_box(DecryptKeyBoxParams {
        ciphertext,
        nonce,
        public_key: author_public,
        secret_key: recipient,
    })
}
