//! Nullable clock: block time that only moves when told to.

use plexus_types::Timestamp;
use std::cell::Cell;

/// A deterministic block clock for testing.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Current block time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Move forward by `secs` and return the new time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        self.current.set(self.current.get().saturating_add(secs));
        self.now()
    }

    /// Jump to an absolute time. Moving backwards is allowed; the reward
    /// scheduler treats it as no elapsed time.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let clock = NullClock::new(100);
        assert_eq!(clock.advance(60), Timestamp::new(160));
        clock.advance(60);
        assert_eq!(clock.now(), Timestamp::new(220));
        clock.set(5);
        assert_eq!(clock.now(), Timestamp::new(5));
    }
}
