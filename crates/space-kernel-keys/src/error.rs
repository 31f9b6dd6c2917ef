//! Error types for key boxes, key distribution and identity encryption.

use thiserror::Error;

use space_kernel_core::{AccountAddress, CanonicalError, CryptoError, ErrorPayload};

/// Errors from sealing or opening a key box.
///
/// A failure here is fatal for that box. It never means "no secret".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyBoxError {
    #[error("nonce must be {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("ciphertext must be at least {minimum} bytes, got {actual}")]
    CiphertextTooShort { minimum: usize, actual: usize },

    /// Authentication tag mismatch: wrong keys or tampered ciphertext.
    #[error("decryption failed")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    /// The peer key produced an all-zero shared secret.
    #[error("invalid encryption public key")]
    InvalidPublicKey,

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl KeyBoxError {
    /// Wire discriminant for this error.
    pub fn tag(&self) -> &'static str {
        match self {
            KeyBoxError::InvalidNonceLength { .. } => "InvalidNonceLength",
            KeyBoxError::CiphertextTooShort { .. } => "CiphertextTooShort",
            KeyBoxError::DecryptionFailed => "DecryptionError",
            KeyBoxError::EncryptionFailed => "EncryptionError",
            KeyBoxError::InvalidPublicKey => "InvalidPublicKey",
            KeyBoxError::InvalidHex(_) => "InvalidHex",
        }
    }

    /// Render as a wire error payload.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.tag(), self)
    }
}

impl From<hex::FromHexError> for KeyBoxError {
    fn from(e: hex::FromHexError) -> Self {
        KeyBoxError::InvalidHex(e.to_string())
    }
}

/// Errors from space key distribution and inboxes.
#[derive(Debug, Error)]
pub enum KeysError {
    #[error(transparent)]
    KeyBox(#[from] KeyBoxError),

    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A decrypted secret had the wrong width.
    #[error("secret must be {expected} bytes, got {actual}")]
    InvalidSecretLength { expected: usize, actual: usize },

    /// The opened inbox secret does not match the inbox public key.
    #[error("inbox secret key does not match inbox {0}")]
    InboxKeyMismatch(String),

    #[error("inbox requires an authenticated sender")]
    AuthRequired,

    #[error("inbox accepts anonymous messages only")]
    UnexpectedAuth,

    #[error("inbox message signature does not match {0}")]
    InvalidMessageSignature(AccountAddress),
}

/// Result type for key distribution and inbox operations.
pub type Result<T> = std::result::Result<T, KeysError>;

/// Errors from wallet-keyed identity encryption.
#[derive(Debug, Error)]
pub enum IdentityEncryptionError {
    /// The wallet signature does not recover the claimed account.
    #[error("wallet signature recovers {recovered}, expected {expected}")]
    SignerMismatch {
        expected: AccountAddress,
        recovered: AccountAddress,
    },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    KeyBox(#[from] KeyBoxError),

    #[error("identity keys could not be decrypted with either recovery encoding")]
    DecryptionFailed,

    #[error("serialization error: {0}")]
    Serialization(String),
}
