//! Asset registry: per-denom reward weight, take rate, decay schedule and totals.

use crate::error::RewardError;
use plexus_types::{validate_denom, Dec, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Governance-supplied configuration for an asset.
///
/// Used both to register a new asset and to replace the parameters of an
/// existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    pub denom: String,
    /// Power per token.
    pub reward_weight: Dec,
    /// Fraction of rewards withheld, in [0, 1]. Stored only.
    #[serde(default)]
    pub take_rate: Dec,
    /// Multiplier applied to the weight once per elapsed interval.
    #[serde(default = "default_change_rate")]
    pub reward_change_rate: Dec,
    /// Decay interval in seconds; zero disables decay.
    #[serde(default)]
    pub reward_change_interval_secs: u64,
}

fn default_change_rate() -> Dec {
    Dec::ONE
}

impl AssetParams {
    /// An asset that never decays.
    pub fn new(denom: impl Into<String>, reward_weight: Dec, take_rate: Dec) -> Self {
        Self {
            denom: denom.into(),
            reward_weight,
            take_rate,
            reward_change_rate: Dec::ONE,
            reward_change_interval_secs: 0,
        }
    }

    /// Attach a geometric decay schedule.
    pub fn with_decay(mut self, rate: Dec, interval_secs: u64) -> Self {
        self.reward_change_rate = rate;
        self.reward_change_interval_secs = interval_secs;
        self
    }

    pub fn validate(&self) -> Result<(), RewardError> {
        validate_denom(&self.denom).map_err(|_| RewardError::InvalidDenom(self.denom.clone()))?;
        if self.take_rate > Dec::ONE {
            return Err(RewardError::InvalidAsset(format!(
                "take rate {} of {} exceeds 1",
                self.take_rate, self.denom
            )));
        }
        Ok(())
    }
}

/// Registered state of one asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub denom: String,
    pub reward_weight: Dec,
    pub take_rate: Dec,
    /// Sum of delegated tokens across all validators, as of the last rebalance.
    pub total_tokens: u128,
    pub reward_change_rate: Dec,
    pub reward_change_interval_secs: u64,
    /// Phase anchor of the decay schedule; advances by whole intervals.
    pub last_reward_change_time: Timestamp,
    /// Registration time plus the reward start delay.
    pub reward_start_time: Timestamp,
    /// Set by the scheduler once `reward_start_time` has been observed.
    pub rewards_started: bool,
}

impl Asset {
    /// Register `params` at `now`, with rewards starting `start_delay_secs` later.
    pub fn from_params(params: AssetParams, now: Timestamp, start_delay_secs: u64) -> Self {
        let reward_start_time = now.saturating_add_secs(start_delay_secs);
        Self {
            denom: params.denom,
            reward_weight: params.reward_weight,
            take_rate: params.take_rate,
            total_tokens: 0,
            reward_change_rate: params.reward_change_rate,
            reward_change_interval_secs: params.reward_change_interval_secs,
            last_reward_change_time: reward_start_time,
            reward_start_time,
            rewards_started: start_delay_secs == 0,
        }
    }

    /// The weight the accounting uses right now: zero until rewards start.
    pub fn effective_weight(&self) -> Dec {
        if self.rewards_started {
            self.reward_weight
        } else {
            Dec::ZERO
        }
    }

    /// Whether the scheduler has anything to do for this asset over time.
    pub fn decays(&self) -> bool {
        self.reward_change_interval_secs > 0 && self.reward_change_rate != Dec::ONE
    }

    /// Replace the governance-controlled fields, keeping totals and schedule phase.
    pub fn apply_params(&mut self, params: &AssetParams) {
        self.reward_weight = params.reward_weight;
        self.take_rate = params.take_rate;
        self.reward_change_rate = params.reward_change_rate;
        self.reward_change_interval_secs = params.reward_change_interval_secs;
    }
}

/// All registered assets, keyed and iterated by denom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistry {
    assets: BTreeMap<String, Asset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, asset: Asset) -> Result<(), RewardError> {
        if self.assets.contains_key(&asset.denom) {
            return Err(RewardError::DuplicateAsset(asset.denom));
        }
        self.assets.insert(asset.denom.clone(), asset);
        Ok(())
    }

    pub fn get(&self, denom: &str) -> Result<&Asset, RewardError> {
        self.assets
            .get(denom)
            .ok_or_else(|| RewardError::AssetNotFound(denom.to_string()))
    }

    pub(crate) fn get_mut(&mut self, denom: &str) -> Result<&mut Asset, RewardError> {
        self.assets
            .get_mut(denom)
            .ok_or_else(|| RewardError::AssetNotFound(denom.to_string()))
    }

    pub fn contains(&self, denom: &str) -> bool {
        self.assets.contains_key(denom)
    }

    /// Every asset in denom order. Borrowing the registry again restarts the sweep.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> + '_ {
        self.assets.values()
    }

    pub fn denoms(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Dec {
        s.parse().unwrap()
    }

    #[test]
    fn register_rejects_duplicate() {
        let mut registry = AssetRegistry::new();
        let params = AssetParams::new("ualpha", dec("2"), Dec::ZERO);
        registry
            .register(Asset::from_params(params.clone(), Timestamp::new(0), 0))
            .unwrap();
        let err = registry
            .register(Asset::from_params(params, Timestamp::new(5), 0))
            .unwrap_err();
        assert_eq!(err, RewardError::DuplicateAsset("ualpha".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let registry = AssetRegistry::new();
        assert_eq!(
            registry.get("ughost").unwrap_err(),
            RewardError::AssetNotFound("ughost".into())
        );
    }

    #[test]
    fn start_delay_defers_rewards() {
        let params = AssetParams::new("ualpha", dec("2"), Dec::ZERO);
        let delayed = Asset::from_params(params.clone(), Timestamp::new(1_000), 600);
        assert!(!delayed.rewards_started);
        assert_eq!(delayed.effective_weight(), Dec::ZERO);
        assert_eq!(delayed.reward_start_time, Timestamp::new(1_600));
        assert_eq!(delayed.last_reward_change_time, Timestamp::new(1_600));

        let immediate = Asset::from_params(params, Timestamp::new(1_000), 0);
        assert!(immediate.rewards_started);
        assert_eq!(immediate.effective_weight(), dec("2"));
    }

    #[test]
    fn unit_rate_does_not_decay() {
        let params = AssetParams::new("ualpha", dec("2"), Dec::ZERO).with_decay(Dec::ONE, 60);
        assert!(!Asset::from_params(params, Timestamp::new(0), 0).decays());
        let params = AssetParams::new("ualpha", dec("2"), Dec::ZERO).with_decay(dec("0.5"), 0);
        assert!(!Asset::from_params(params, Timestamp::new(0), 0).decays());
    }

    #[test]
    fn validate_bounds_take_rate() {
        assert!(AssetParams::new("ualpha", dec("1"), dec("1")).validate().is_ok());
        assert!(matches!(
            AssetParams::new("ualpha", dec("1"), dec("1.01")).validate(),
            Err(RewardError::InvalidAsset(_))
        ));
        assert!(matches!(
            AssetParams::new("!!", dec("1"), Dec::ZERO).validate(),
            Err(RewardError::InvalidDenom(_))
        ));
    }

    #[test]
    fn iteration_is_restartable() {
        let mut registry = AssetRegistry::new();
        for denom in ["uzeta", "ualpha"] {
            let params = AssetParams::new(denom, Dec::ONE, Dec::ZERO);
            registry
                .register(Asset::from_params(params, Timestamp::new(0), 0))
                .unwrap();
        }
        let first: Vec<&str> = registry.iter().map(|a| a.denom.as_str()).collect();
        let second: Vec<&str> = registry.iter().map(|a| a.denom.as_str()).collect();
        assert_eq!(first, vec!["ualpha", "uzeta"]);
        assert_eq!(first, second);
    }
}
