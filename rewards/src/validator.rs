//! Per-validator reward state.

use crate::history::RewardHistory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reward-side view of a validator.
///
/// Bonded power itself lives in the power registry; this record keeps what is
/// needed to recompute it and to attribute funding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// One cumulative index per reward denom ever funded to this validator.
    pub global_reward_history: RewardHistory,
    /// Delegated tokens per asset denom. A zero entry survives until the
    /// rebalance that pushes the reduced power.
    pub tokens: BTreeMap<String, u128>,
}

impl ValidatorRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens_of(&self, denom: &str) -> u128 {
        self.tokens.get(denom).copied().unwrap_or(0)
    }

    /// Whether any delegation in `denom` is (or was, pending rebalance) held here.
    pub fn tracks(&self, denom: &str) -> bool {
        self.tokens.contains_key(denom)
    }

    pub(crate) fn prune_empty(&mut self) {
        self.tokens.retain(|_, amount| *amount > 0);
    }
}
