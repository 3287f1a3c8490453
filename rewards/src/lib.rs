//! Multi-asset reward accounting for delegated proof-of-stake.
//!
//! Delegators bond tokens of several asset denoms to validators; each asset
//! converts tokens to bonded power through a reward weight. Rewards funded to a
//! validator are split pro rata to power without touching individual
//! delegations:
//! - a per-validator global reward index per reward denom, raised on funding
//! - a per-delegation local copy, settled lazily on claim
//! - weight-change snapshots, so growth is paid at the weight then in force
//! - a scheduler applying reward start and geometric weight decay
//!
//! All arithmetic is 18-digit fixed point, truncating toward zero.

pub mod accounting;
pub mod asset;
pub mod decay;
pub mod delegation;
pub mod engine;
pub mod error;
pub mod history;
pub mod rebalance;
pub mod snapshot;
pub mod validator;

pub use asset::{Asset, AssetParams, AssetRegistry};
pub use decay::WeightChange;
pub use delegation::{Delegation, DelegationKey};
pub use engine::RewardEngine;
pub use error::RewardError;
pub use history::{RewardAccrual, RewardHistory};
pub use rebalance::{PendingChanges, RebalancePlan};
pub use snapshot::{SnapshotLog, WeightChangeSnapshot};
pub use validator::ValidatorRecord;
