//! Bonded power recomputation.
//!
//! A validator's power is `Σ tokens(v, d) * weight(d)` over every asset it
//! holds, rounded up to a whole unit. Planning reads state plus the caller's pending overrides and never
//! mutates, so an operation can validate the whole transition before
//! committing any of it.

use crate::engine::RewardEngine;
use crate::error::RewardError;
use plexus_store::{LedgerStore, PowerStore};
use plexus_types::{Dec, ValidatorId};
use std::collections::BTreeMap;
use tracing::debug;

/// Not-yet-committed values that a plan should use instead of current state.
#[derive(Clone, Debug, Default)]
pub struct PendingChanges {
    /// Effective weight per asset denom.
    pub weights: BTreeMap<String, Dec>,
    /// Token amount per (validator, asset denom).
    pub tokens: BTreeMap<(ValidatorId, String), u128>,
}

/// Outcome of a rebalance, ready to be pushed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebalancePlan {
    /// New bonded power for every affected validator.
    pub powers: BTreeMap<ValidatorId, u128>,
    /// New total tokens for every rebalanced asset.
    pub totals: BTreeMap<String, u128>,
    /// Token amounts to write back into validator records.
    pub tokens: BTreeMap<(ValidatorId, String), u128>,
}

impl<L: LedgerStore, P: PowerStore> RewardEngine<L, P> {
    /// Recompute bonded power for every validator holding any of `denoms`,
    /// and the total tokens of those assets.
    pub fn rebalance(&mut self, denoms: &[String]) -> Result<(), RewardError> {
        let plan = self.plan_rebalance(denoms, &PendingChanges::default())?;
        self.apply_rebalance(plan)
    }

    /// Rebalance across the whole registry.
    pub fn rebalance_all(&mut self) -> Result<(), RewardError> {
        let denoms = self.assets.denoms();
        self.rebalance(&denoms)
    }

    pub(crate) fn plan_rebalance(
        &self,
        denoms: &[String],
        pending: &PendingChanges,
    ) -> Result<RebalancePlan, RewardError> {
        let holdings = self.holdings_with(pending);
        let mut plan = RebalancePlan {
            tokens: pending.tokens.clone(),
            ..RebalancePlan::default()
        };

        for denom in denoms {
            self.assets.get(denom)?;
            let mut total: u128 = 0;
            for tokens in holdings.values() {
                let held = tokens.get(denom).copied().unwrap_or(0);
                total = total.checked_add(held).ok_or(RewardError::Overflow)?;
            }
            plan.totals.insert(denom.clone(), total);
        }

        for (validator, tokens) in &holdings {
            if !denoms.iter().any(|d| tokens.contains_key(d)) {
                continue;
            }
            if !self.power.validator_exists(validator) {
                return Err(RewardError::ValidatorNotFound(validator.to_string()));
            }
            let mut power = Dec::ZERO;
            for (denom, amount) in tokens {
                let weight = match pending.weights.get(denom) {
                    Some(w) => *w,
                    None => self.assets.get(denom)?.effective_weight(),
                };
                let contribution = weight.checked_mul_int(*amount).ok_or(RewardError::Overflow)?;
                power = power.checked_add(contribution).ok_or(RewardError::Overflow)?;
            }
            // Rounded up so a funding never promises more than it brings.
            let power = power.ceil().ok_or(RewardError::Overflow)?;
            plan.powers.insert(validator.clone(), power);
        }
        Ok(plan)
    }

    /// Push a plan to the power registry and commit it to core state.
    pub(crate) fn apply_rebalance(&mut self, plan: RebalancePlan) -> Result<(), RewardError> {
        for (validator, power) in &plan.powers {
            if self.power.bonded_power(validator)? != *power {
                self.power.set_bonded_power(validator, *power)?;
                debug!(validator = %validator, power = *power, "bonded power set");
            }
        }
        for ((validator, denom), amount) in plan.tokens {
            self.validators
                .entry(validator)
                .or_default()
                .tokens
                .insert(denom, amount);
        }
        for validator in plan.powers.keys() {
            if let Some(record) = self.validators.get_mut(validator) {
                record.prune_empty();
            }
        }
        for (denom, total) in plan.totals {
            self.assets.get_mut(&denom)?.total_tokens = total;
        }
        Ok(())
    }

    /// Validator token holdings with `pending` overrides applied.
    fn holdings_with(&self, pending: &PendingChanges) -> BTreeMap<ValidatorId, BTreeMap<String, u128>> {
        let mut holdings: BTreeMap<ValidatorId, BTreeMap<String, u128>> = self
            .validators
            .iter()
            .map(|(v, record)| (v.clone(), record.tokens.clone()))
            .collect();
        for ((validator, denom), amount) in &pending.tokens {
            holdings
                .entry(validator.clone())
                .or_default()
                .insert(denom.clone(), *amount);
        }
        holdings
    }
}
