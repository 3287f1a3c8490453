//! Nullable infrastructure for deterministic testing.
//!
//! The reward core talks to its collaborators (token ledger, validator power
//! registry) only through the `plexus-store` traits. This crate provides
//! in-memory implementations that:
//! - Behave deterministically
//! - Can be seeded and inspected programmatically
//! - Never touch the filesystem or network
//!
//! Usage: hand them to `RewardEngine::new` in tests and in the simulator.

pub mod clock;
pub mod ledger;
pub mod power;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use power::NullPowerStore;
