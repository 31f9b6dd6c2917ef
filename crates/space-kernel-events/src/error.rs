//! Error types for space events and the state reducer.
//!
//! The reducer fails with exactly one of four tagged errors. Each is a
//! plain value: applying an event never panics on bad input and never
//! touches the prior state.

use thiserror::Error;

use space_kernel_core::{CanonicalError, CryptoError, ErrorPayload};

/// The raw event does not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

/// The signature does not authenticate the claimed author.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("signature verification failed: {message}")]
pub struct VerifySignatureError {
    pub message: String,
}

/// The event is well-formed and signed but not allowed here.
///
/// Stale chain tips, non-admin authors, duplicate invitations and the
/// like. Recoverable by re-syncing and rebuilding the event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid event: {message}")]
pub struct InvalidEventError {
    pub message: String,
}

/// The identity resolver could not produce a verified identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identity: {message}")]
pub struct InvalidIdentityError {
    pub message: String,
}

macro_rules! message_error {
    ($($name:ident),*) => {
        $(
            impl $name {
                pub fn new(message: impl Into<String>) -> Self {
                    Self { message: message.into() }
                }
            }
        )*
    };
}

message_error!(ParseError, VerifySignatureError, InvalidEventError, InvalidIdentityError);

/// Any failure of [`apply_event`](crate::reducer::apply_event).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    VerifySignature(#[from] VerifySignatureError),

    #[error(transparent)]
    InvalidEvent(#[from] InvalidEventError),

    #[error(transparent)]
    InvalidIdentity(#[from] InvalidIdentityError),
}

impl ApplyError {
    /// Wire discriminant for this error.
    pub fn tag(&self) -> &'static str {
        match self {
            ApplyError::Parse(_) => "ParseError",
            ApplyError::VerifySignature(_) => "VerifySignatureError",
            ApplyError::InvalidEvent(_) => "InvalidEventError",
            ApplyError::InvalidIdentity(_) => "InvalidIdentityError",
        }
    }

    /// Render as a wire error payload.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.tag(), self)
    }
}

/// Failure to build a signed event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
