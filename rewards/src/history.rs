//! Denom-keyed cumulative reward indices.
//!
//! The same type holds a validator's global indices and a delegation's
//! last-synced local copy. A reward owed between two histories is
//! `(later[d] - earlier[d]) * tokens * weight` for each denom `d`.

use crate::error::RewardError;
use plexus_types::{Coins, Dec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A denom-unique, denom-sorted set of reward indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardHistory {
    indices: BTreeMap<String, Dec>,
}

impl RewardHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `denom`; a denom never funded reads as zero.
    pub fn index(&self, denom: &str) -> Dec {
        self.indices.get(denom).copied().unwrap_or(Dec::ZERO)
    }

    /// Raise the index for `denom` by `delta`.
    pub fn increase(&mut self, denom: &str, delta: Dec) -> Result<(), RewardError> {
        let current = self.index(denom);
        let next = current.checked_add(delta).ok_or(RewardError::Overflow)?;
        self.indices.insert(denom.to_string(), next);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Dec)> + '_ {
        self.indices.iter().map(|(d, i)| (d.as_str(), *i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Denoms present in either history, ascending.
    pub fn union_denoms<'a>(&'a self, other: &'a RewardHistory) -> BTreeSet<&'a str> {
        self.indices
            .keys()
            .chain(other.indices.keys())
            .map(String::as_str)
            .collect()
    }

    /// Accumulate into `owed` what `tokens` units at `weight` earned while the
    /// index moved from `earlier` to `self`.
    ///
    /// An index that went backwards contributes nothing.
    pub fn accrue_since(
        &self,
        earlier: &RewardHistory,
        tokens: u128,
        weight: Dec,
        owed: &mut RewardAccrual,
    ) -> Result<(), RewardError> {
        if tokens == 0 || weight.is_zero() {
            return Ok(());
        }
        for denom in self.union_denoms(earlier) {
            let delta = self.index(denom).saturating_sub(earlier.index(denom));
            if delta.is_zero() {
                continue;
            }
            let amount = delta
                .checked_mul_int(tokens)
                .and_then(|d| d.checked_mul(weight))
                .ok_or(RewardError::Overflow)?;
            owed.add(denom, amount)?;
        }
        Ok(())
    }
}

/// Fractional rewards collected across the segments of one claim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardAccrual {
    owed: BTreeMap<String, Dec>,
}

impl RewardAccrual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, denom: &str, amount: Dec) -> Result<(), RewardError> {
        let entry = self.owed.entry(denom.to_string()).or_insert(Dec::ZERO);
        *entry = entry.checked_add(amount).ok_or(RewardError::Overflow)?;
        Ok(())
    }

    /// Fractional amount owed in `denom`.
    pub fn owed(&self, denom: &str) -> Dec {
        self.owed.get(denom).copied().unwrap_or(Dec::ZERO)
    }

    /// Whole token units payable; denoms that truncate to zero are dropped.
    /// An amount beyond `u128` is an overflow, not a silent cap.
    pub fn into_coins(self) -> Result<Coins, RewardError> {
        let mut whole = BTreeMap::new();
        for (denom, amount) in self.owed {
            whole.insert(denom, amount.truncate().ok_or(RewardError::Overflow)?);
        }
        Ok(Coins::from(whole))
    }
}
