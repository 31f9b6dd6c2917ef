//! Cryptographic utilities for keys and symmetric sealing.
//!
//! Provides curve25519 encryption keys and XChaCha20-Poly1305 authenticated
//! encryption under symmetric keys. All keys and nonces travel as `0x`-prefixed hex.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use x25519_dalek::{PublicKey, StaticSecret};

use space_kernel_core::wire::{decode_hex_array, to_prefixed_hex};

use crate::error::KeyBoxError;

/// Nonce length for XChaCha20-Poly1305.
pub const NONCE_LENGTH: usize = 24;

/// Poly1305 authentication tag length.
pub const TAG_LENGTH: usize = 16;

/// Width of every secret key handled here.
pub const KEY_LENGTH: usize = 32;

/// A curve25519 encryption public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncryptionPublicKey(pub [u8; 32]);

impl EncryptionPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }

    /// Parse from hex (prefix optional).
    pub fn from_hex(s: &str) -> Result<Self, KeyBoxError> {
        Ok(Self(decode_hex_array::<32>(s)?))
    }

    fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl fmt::Debug for EncryptionPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionPublicKey({})", &self.to_hex()[..18])
    }
}

impl Serialize for EncryptionPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EncryptionPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A curve25519 encryption secret key.
///
/// Never serialized or logged by this crate; `Debug` shows the public half.
#[derive(Clone)]
pub struct EncryptionSecretKey(StaticSecret);

impl EncryptionSecretKey {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        Self(StaticSecret::random_from_rng(rand::thread_rng()))
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Export the raw secret bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Derive the public key.
    pub fn public_key(&self) -> EncryptionPublicKey {
        EncryptionPublicKey(*PublicKey::from(&self.0).as_bytes())
    }

    /// Perform raw X25519 key agreement with a peer's public key.
    ///
    /// Rejects low-order peer keys that force an all-zero shared secret.
    pub fn diffie_hellman(&self, peer_public: &EncryptionPublicKey) -> Result<[u8; 32], KeyBoxError> {
        let shared = self.0.diffie_hellman(&peer_public.to_dalek());
        if !shared.was_contributory() {
            return Err(KeyBoxError::InvalidPublicKey);
        }
        Ok(*shared.as_bytes())
    }
}

impl fmt::Debug for EncryptionSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionSecretKey({:?})", self.public_key())
    }
}

/// An account's encryption keypair.
#[derive(Debug, Clone)]
pub struct EncryptionKeypair {
    pub secret: EncryptionSecretKey,
    pub public: EncryptionPublicKey,
}

impl EncryptionKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self::from_secret(EncryptionSecretKey::generate())
    }

    /// Build the keypair for an existing secret.
    pub fn from_secret(secret: EncryptionSecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }
}

/// A 24-byte XChaCha20-Poly1305 nonce.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxNonce(pub [u8; NONCE_LENGTH]);

impl BoxNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyBoxError> {
        let arr: [u8; NONCE_LENGTH] = bytes.try_into().map_err(|_| KeyBoxError::InvalidNonceLength {
            expected: NONCE_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }
}

impl fmt::Debug for BoxNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxNonce({})", self.to_hex())
    }
}

impl Serialize for BoxNonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BoxNonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = space_kernel_core::wire::decode_hex(&s).map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

/// A 256-bit symmetric key for XChaCha20-Poly1305.
///
/// Space secret keys and keys derived from key agreement or wallet
/// signatures are all this type.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; KEY_LENGTH]);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    fn cipher(&self) -> Result<XChaCha20Poly1305, KeyBoxError> {
        XChaCha20Poly1305::new_from_slice(&self.0).map_err(|_| KeyBoxError::EncryptionFailed)
    }

    /// Encrypt with an explicit nonce. Output is ciphertext plus tag.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &BoxNonce) -> Result<Vec<u8>, KeyBoxError> {
        self.cipher()?
            .encrypt(XNonce::from_slice(&nonce.0), plaintext)
            .map_err(|_| KeyBoxError::EncryptionFailed)
    }

    /// Decrypt ciphertext plus tag.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &BoxNonce) -> Result<Vec<u8>, KeyBoxError> {
        if ciphertext.len() < TAG_LENGTH {
            return Err(KeyBoxError::CiphertextTooShort {
                minimum: TAG_LENGTH,
                actual: ciphertext.len(),
            });
        }
        self.cipher()?
            .decrypt(XNonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| KeyBoxError::DecryptionFailed)
    }

    /// Encrypt under a fresh random nonce, returning `nonce || ciphertext`.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, KeyBoxError> {
        let nonce = BoxNonce::generate();
        let ciphertext = self.encrypt(plaintext, &nonce)?;
        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce.0);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open the output of [`SymmetricKey::seal`].
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, KeyBoxError> {
        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(KeyBoxError::CiphertextTooShort {
                minimum: NONCE_LENGTH + TAG_LENGTH,
                actual: sealed.len(),
            });
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);
        self.decrypt(ciphertext, &BoxNonce::from_slice(nonce)?)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}
