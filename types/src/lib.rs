//! Fundamental types for plexus.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! fixed-point decimals, coins, account and validator identifiers, timestamps,
//! reward parameters, and the shared error type.

pub mod address;
pub mod coin;
pub mod decimal;
pub mod error;
pub mod params;
pub mod time;

pub use address::{AccountAddress, ValidatorId};
pub use coin::{validate_denom, Coin, Coins};
pub use decimal::Dec;
pub use primitive_types::U256;
pub use error::PlexusError;
pub use params::RewardParams;
pub use time::Timestamp;
