//! Clock contiguity for update batches.
//!
//! Content updates for a space arrive in batches stamped with the clock
//! range they cover. A batch is accepted only if it starts right after the
//! current clock, the same compare-and-set pattern as `previousEventHash`.
//! Anything else means the caller must fetch a missing range first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use space_kernel_core::wire::hex_bytes;

/// A batch of opaque content updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Updates {
    pub first_update_clock: u64,
    pub last_update_clock: u64,
    #[serde(with = "hex_bytes")]
    pub content: Vec<u8>,
}

/// Why an update batch cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdatesError {
    /// Updates `from..=to` must be fetched before this batch.
    #[error("missing updates {from}..={to}")]
    MissingRange { from: u64, to: u64 },

    /// The batch starts at or before the current clock.
    #[error("batch starting at {first} is already covered by clock {current}")]
    AlreadyApplied { first: u64, current: u64 },

    /// The batch ends before it starts.
    #[error("invalid update range {first}..={last}")]
    InvalidRange { first: u64, last: u64 },
}

/// Check that `updates` directly follows `current`.
pub fn check_update_clock(current: u64, updates: &Updates) -> Result<(), UpdatesError> {
    let first = updates.first_update_clock;
    let last = updates.last_update_clock;

    if last < first {
        return Err(UpdatesError::InvalidRange { first, last });
    }
    if first <= current {
        return Err(UpdatesError::AlreadyApplied { first, current });
    }
    if first != current + 1 {
        return Err(UpdatesError::MissingRange {
            from: current + 1,
            to: first - 1,
        });
    }
    Ok(())
}

/// The last update clock applied to a space's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateClock(u64);

impl UpdateClock {
    /// Start from a known clock.
    pub const fn new(current: u64) -> Self {
        Self(current)
    }

    /// The current clock.
    pub const fn current(&self) -> u64 {
        self.0
    }

    /// Accept a batch and move to its last clock.
    pub fn advance(&mut self, updates: &Updates) -> Result<(), UpdatesError> {
        check_update_clock(self.0, updates)?;
        self.0 = updates.last_update_clock;
        Ok(())
    }
}
