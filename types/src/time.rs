//! Timestamp type used throughout the protocol.
//!
//! Timestamps are Unix epoch seconds (UTC) taken from the block header of the
//! enclosing state machine, never from the local clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// This timestamp moved forward by `secs`, saturating at the far future.
    pub fn saturating_add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// This timestamp moved forward by `secs`, or `None` on overflow.
    pub fn checked_add_secs(self, secs: u64) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_since_saturates_for_past_now() {
        let t = Timestamp::new(100);
        assert_eq!(t.elapsed_since(Timestamp::new(160)), 60);
        assert_eq!(t.elapsed_since(Timestamp::new(40)), 0);
    }

    #[test]
    fn add_secs_variants() {
        let t = Timestamp::new(u64::MAX - 1);
        assert_eq!(t.saturating_add_secs(5), Timestamp::new(u64::MAX));
        assert_eq!(t.checked_add_secs(5), None);
        assert_eq!(Timestamp::new(10).checked_add_secs(5), Some(Timestamp::new(15)));
    }
}
