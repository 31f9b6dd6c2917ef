//! Error types for the Space Kernel Core.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tagged error as it crosses the wire: a stable discriminant and a
/// human-readable message, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "_tag")]
    pub tag: String,
    pub message: String,
}

impl ErrorPayload {
    /// Build a payload from a tag and any displayable error.
    pub fn new(tag: &str, error: &impl fmt::Display) -> Self {
        Self {
            tag: tag.to_string(),
            message: error.to_string(),
        }
    }
}

/// Errors raised while producing canonical JSON.
///
/// These are always caller bugs: a value that cannot be canonicalized can
/// never be hashed or signed, so nothing here is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("NaN is not allowed in canonical JSON")]
    NaNNotAllowed,

    #[error("Infinity is not allowed in canonical JSON")]
    InfinityNotAllowed,

    #[error("map keys must serialize to strings")]
    KeyMustBeString,

    #[error("value serializes to nothing")]
    Undefined,

    #[error("serialization error: {0}")]
    Custom(String),
}

impl CanonicalError {
    /// Wire discriminant for this error.
    pub fn tag(&self) -> &'static str {
        match self {
            CanonicalError::NaNNotAllowed => "NaNNotAllowedError",
            CanonicalError::InfinityNotAllowed => "InfinityNotAllowedError",
            CanonicalError::KeyMustBeString
            | CanonicalError::Undefined
            | CanonicalError::Custom(_) => "CanonicalizationError",
        }
    }

    /// Render as a wire error payload.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.tag(), self)
    }
}

impl serde::ser::Error for CanonicalError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CanonicalError::Custom(msg.to_string())
    }
}

/// Errors from signing, recovery and key parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::InvalidHex(e.to_string())
    }
}

/// Result type for core crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_underscore_tag() {
        let payload = CanonicalError::InfinityNotAllowed.to_payload();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["_tag"], "InfinityNotAllowedError");
        assert_eq!(json["message"], "Infinity is not allowed in canonical JSON");
    }
}
