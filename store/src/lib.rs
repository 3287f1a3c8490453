//! Abstract collaborator traits for plexus.
//!
//! The reward core never owns token balances or validator voting power. The
//! surrounding application wires these traits to its own bank and staking
//! state; tests and the simulator use the in-memory versions from
//! `plexus-nullables`. The rest of the workspace depends only on the traits.

pub mod error;
pub mod ledger;
pub mod power;

pub use error::StoreError;
pub use ledger::LedgerStore;
pub use power::PowerStore;
