//! Configuration for the space log.

/// Configuration for a [`SpaceLog`](crate::SpaceLog).
#[derive(Debug, Clone)]
pub struct SpaceLogConfig {
    /// Keep the state after every accepted event, not just the latest.
    pub retain_history: bool,
    /// Report already-accepted events as duplicates instead of rejecting
    /// them as stale.
    pub report_duplicates: bool,
}

impl Default for SpaceLogConfig {
    fn default() -> Self {
        Self {
            retain_history: true,
            report_duplicates: true,
        }
    }
}

impl SpaceLogConfig {
    /// Keep only the latest state.
    pub fn without_history(mut self) -> Self {
        self.retain_history = false;
        self
    }

    /// Hand re-delivered events to the reducer like any other.
    pub fn strict_duplicates(mut self) -> Self {
        self.report_duplicates = false;
        self
    }
}
