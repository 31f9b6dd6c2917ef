//! Cryptographic primitives for the Space Kernel.
//!
//! Wraps secp256k1 recoverable ECDSA, SHA-256 and Keccak-256 with strong
//! types. Transaction signatures are made over `sha256(message)`; wallet
//! signatures follow the EIP-191 personal-message convention.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use std::fmt;

use crate::error::{CryptoError, Result};
use crate::types::AccountAddress;
use crate::wire::{decode_hex_array, to_prefixed_hex};

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

/// Keccak-256, as used for account addresses and personal-message digests.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Digest of an EIP-191 personal message:
/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message.as_bytes());
    keccak256(&data)
}

/// A compressed (33-byte SEC1) secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignaturePublicKey([u8; 33]);

impl SignaturePublicKey {
    /// Parse and validate a compressed SEC1 point.
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get the raw compressed bytes.
    pub const fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }

    /// Parse from hex (prefix optional).
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(decode_hex_array::<33>(s)?)
    }

    fn from_verifying_key(key: &VerifyingKey) -> Result<Self> {
        let point = key.to_encoded_point(true);
        let bytes: [u8; 33] = point
            .as_bytes()
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Derive the externally-owned account address for this key:
    /// the last 20 bytes of `keccak256(uncompressed_point[1..])`.
    pub fn to_account_address(&self) -> Result<AccountAddress> {
        let key = VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let uncompressed = key.to_encoded_point(false);
        let digest = keccak256(&uncompressed.as_bytes()[1..]);
        Ok(AccountAddress::new(to_prefixed_hex(&digest[12..])))
    }
}

impl fmt::Debug for SignaturePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignaturePublicKey({})", &self.to_hex()[..18])
    }
}

impl Serialize for SignaturePublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SignaturePublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl AccountAddress {
    /// The account address controlled by a signing key.
    pub fn from_public_key(key: &SignaturePublicKey) -> Result<Self> {
        key.to_account_address()
    }
}

/// A recoverable ECDSA signature: compact `r || s` plus the recovery bit.
///
/// On the wire: `{ "hex": "0x<64 bytes>", "recovery": 0 | 1 }`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SignatureWire", into = "SignatureWire")]
pub struct RecoverableSignature {
    /// Compact signature bytes (`r || s`).
    pub bytes: [u8; 64],
    /// Recovery bit, 0 or 1.
    pub recovery: u8,
}

#[derive(Serialize, Deserialize)]
struct SignatureWire {
    hex: String,
    recovery: u8,
}

impl TryFrom<SignatureWire> for RecoverableSignature {
    type Error = CryptoError;

    fn try_from(wire: SignatureWire) -> Result<Self> {
        if wire.recovery > 1 {
            return Err(CryptoError::InvalidRecoveryId(wire.recovery));
        }
        Ok(Self {
            bytes: decode_hex_array::<64>(&wire.hex)?,
            recovery: wire.recovery,
        })
    }
}

impl From<RecoverableSignature> for SignatureWire {
    fn from(sig: RecoverableSignature) -> Self {
        Self {
            hex: to_prefixed_hex(&sig.bytes),
            recovery: sig.recovery,
        }
    }
}

impl RecoverableSignature {
    /// Recover the signer's public key from a signature over `message`.
    ///
    /// The signed digest is `sha256(message)`.
    pub fn recover(&self, message: &[u8]) -> Result<SignaturePublicKey> {
        let digest = Sha256Hash::hash(message);
        let key = recover_from_prehash(digest.as_bytes(), &self.bytes, self.recovery)?;
        SignaturePublicKey::from_verifying_key(&key)
    }

    /// Convert to `0x`-prefixed hex of the compact bytes.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.bytes)
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({}..., {})", &self.to_hex()[..18], self.recovery)
    }
}

fn recover_from_prehash(digest: &[u8; 32], bytes: &[u8; 64], recovery: u8) -> Result<VerifyingKey> {
    let signature = Signature::from_slice(bytes).map_err(|_| CryptoError::InvalidSignature)?;
    let recovery_id =
        RecoveryId::from_byte(recovery).ok_or(CryptoError::InvalidRecoveryId(recovery))?;
    VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// A 65-byte wallet signature (`r || s || v`) over an EIP-191 personal message.
///
/// Modern wallets encode `v` as 27/28, legacy ones as 0/1.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WalletSignature(pub [u8; 65]);

impl WalletSignature {
    /// The trailing recovery byte as produced by the wallet.
    pub fn recovery_byte(&self) -> u8 {
        self.0[64]
    }

    /// The same signature with `v` switched between the 27/28 and 0/1 encodings.
    pub fn with_alternate_recovery_encoding(&self) -> Self {
        let mut bytes = self.0;
        bytes[64] = match bytes[64] {
            v @ 27..=28 => v - 27,
            v @ 0..=1 => v + 27,
            v => v,
        };
        Self(bytes)
    }

    /// Recover the signing account address for `message`.
    pub fn recover_address(&self, message: &str) -> Result<AccountAddress> {
        let v = self.recovery_byte();
        let recovery = if v >= 27 { v - 27 } else { v };
        let mut compact = [0u8; 64];
        compact.copy_from_slice(&self.0[..64]);
        let key = recover_from_prehash(&personal_message_hash(message), &compact, recovery)?;
        SignaturePublicKey::from_verifying_key(&key)?.to_account_address()
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }

    /// Parse from hex (prefix optional).
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(decode_hex_array::<65>(s)?))
    }
}

impl fmt::Debug for WalletSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletSignature({}...)", &self.to_hex()[..18])
    }
}

/// A secp256k1 keypair used to author events.
#[derive(Clone)]
pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::random(&mut rng),
        }
    }

    /// Create from 32 secret bytes.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(seed).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Parse a `0x`-prefixed private key.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_seed(&decode_hex_array::<32>(s)?)
    }

    /// Get the compressed public key.
    pub fn public_key(&self) -> SignaturePublicKey {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        SignaturePublicKey(bytes)
    }

    /// The externally-owned account address of this key.
    pub fn account_address(&self) -> Result<AccountAddress> {
        self.public_key().to_account_address()
    }

    /// Sign `sha256(message)` with a recoverable signature.
    pub fn sign(&self, message: &[u8]) -> Result<RecoverableSignature> {
        let digest = Sha256Hash::hash(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&signature.to_bytes());
        Ok(RecoverableSignature {
            bytes,
            recovery: recovery_id.to_byte(),
        })
    }

    /// Sign an EIP-191 personal message, `v` encoded as 27/28.
    pub fn sign_personal_message(&self, message: &str) -> Result<WalletSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&personal_message_hash(message))
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(WalletSignature(bytes))
    }

    /// Get the raw secret bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.signing_key.to_bytes());
        bytes
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKeypair({:?})", self.public_key())
    }
}
