//! Injected time source.

use std::{
    fmt::Debug,
    time::{SystemTime, UNIX_EPOCH},
};

/// Source of the current time, injected so that transitions stamping
/// `finished_at` are deterministic under test.
pub trait Clock: Debug + Send + Sync {
    /// Current unix timestamp, in seconds.
    fn now(&self) -> u64;
}

/// [`Clock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }
}
