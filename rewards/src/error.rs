//! Reward-accounting errors.

use plexus_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("asset {0} not found")]
    AssetNotFound(String),

    #[error("asset {0} is already registered")]
    DuplicateAsset(String),

    #[error("validator {0} not found")]
    ValidatorNotFound(String),

    #[error("no delegation from {delegator} to {validator} in {denom}")]
    DelegationNotFound {
        delegator: String,
        validator: String,
        denom: String,
    },

    #[error("validator {0} has zero bonded power, nothing to attribute rewards to")]
    ZeroBondedPower(String),

    #[error("reward pool short of {denom}: need {needed}, have {available}")]
    InsufficientRewardPool {
        denom: String,
        needed: u128,
        available: u128,
    },

    #[error("unsupported denom: {0}")]
    InvalidDenom(String),

    #[error("{0} is not the governance authority")]
    Unauthorized(String),

    #[error("invalid asset parameters: {0}")]
    InvalidAsset(String),

    #[error("insufficient delegation: have {have}, need {need}")]
    InsufficientDelegation { have: u128, need: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in reward computation")]
    Overflow,

    #[error("state encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
