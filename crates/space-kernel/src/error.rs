//! Error types for the Space Kernel.

use space_kernel_core::{CanonicalError, ErrorPayload};
use space_kernel_events::{ApplyError, SignError};
use space_kernel_keys::{KeyBoxError, KeysError};
use thiserror::Error;

use crate::updates::UpdatesError;

/// Errors that can occur during Space Kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The reducer rejected an event.
    #[error("{0}")]
    Apply(#[from] ApplyError),

    /// Building a signed event failed.
    #[error("signing error: {0}")]
    Sign(#[from] SignError),

    /// An event could not be canonicalized.
    #[error("canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),

    /// Key box failure.
    #[error("key box error: {0}")]
    KeyBox(#[from] KeyBoxError),

    /// Key distribution or inbox failure.
    #[error("keys error: {0}")]
    Keys(#[from] KeysError),

    /// Update batch does not follow the current clock.
    #[error("updates error: {0}")]
    Updates(#[from] UpdatesError),

    /// The operation needs a space but the log is empty.
    #[error("no space has been created in this log")]
    NoSpace,
}

impl KernelError {
    /// Wire discriminant for this error.
    pub fn tag(&self) -> &'static str {
        match self {
            KernelError::Apply(e) => e.tag(),
            KernelError::Canonical(e) => e.tag(),
            KernelError::KeyBox(e) => e.tag(),
            KernelError::Keys(KeysError::KeyBox(e)) => e.tag(),
            KernelError::Sign(SignError::Canonical(e)) => e.tag(),
            KernelError::Sign(SignError::Crypto(_)) => "SignError",
            KernelError::Keys(_) => "KeysError",
            KernelError::Updates(_) => "UpdatesError",
            KernelError::NoSpace => "InvalidEventError",
        }
    }

    /// Render as a wire error payload.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.tag(), self)
    }
}

/// Result type for Space Kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
