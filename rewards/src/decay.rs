//! Scheduled weight changes: reward start and geometric decay.
//!
//! The scheduler need not run every block. One evaluation applies every
//! interval that elapsed since the last one (`weight * rate^n`) and advances
//! the schedule anchor by whole intervals, so re-running at the same time is
//! a no-op.

use crate::engine::RewardEngine;
use crate::error::RewardError;
use crate::rebalance::PendingChanges;
use plexus_store::{LedgerStore, PowerStore};
use plexus_types::{Dec, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// An effective-weight change applied by the scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightChange {
    pub denom: String,
    pub prev_weight: Dec,
    pub new_weight: Dec,
    /// Whole decay intervals applied; zero when only the reward start fired.
    pub intervals: u64,
}

impl<L: LedgerStore, P: PowerStore> RewardEngine<L, P> {
    /// Run the scheduler over every registered asset.
    pub fn tick(&mut self, now: Timestamp) -> Result<Vec<WeightChange>, RewardError> {
        let denoms = self.assets.denoms();
        self.tick_assets(&denoms, now)
    }

    /// Run the scheduler over `denoms`.
    ///
    /// Assets whose reward start time has passed begin carrying weight, then
    /// every elapsed decay interval is applied. Each effective-weight change
    /// snapshots the holding validators at the old weight before bonded power
    /// is recomputed.
    pub fn tick_assets(&mut self, denoms: &[String], now: Timestamp) -> Result<Vec<WeightChange>, RewardError> {
        let mut staged = Vec::new();
        let mut changes = Vec::new();
        let mut pending = PendingChanges::default();

        for denom in denoms {
            let current = self.assets.get(denom)?;
            let mut next = current.clone();
            if !next.rewards_started && now >= next.reward_start_time {
                next.rewards_started = true;
            }

            let mut intervals = 0;
            if next.rewards_started && next.reward_change_interval_secs > 0 {
                let interval = next.reward_change_interval_secs;
                intervals = next.last_reward_change_time.elapsed_since(now) / interval;
                if intervals > 0 {
                    if next.reward_change_rate != Dec::ONE {
                        let factor = next
                            .reward_change_rate
                            .checked_pow(intervals)
                            .ok_or(RewardError::Overflow)?;
                        next.reward_weight = next
                            .reward_weight
                            .checked_mul(factor)
                            .ok_or(RewardError::Overflow)?;
                    }
                    let advance = intervals.checked_mul(interval).ok_or(RewardError::Overflow)?;
                    next.last_reward_change_time = next
                        .last_reward_change_time
                        .checked_add_secs(advance)
                        .ok_or(RewardError::Overflow)?;
                }
            }

            if next == *current {
                continue;
            }
            let prev_weight = current.effective_weight();
            let new_weight = next.effective_weight();
            if new_weight != prev_weight {
                pending.weights.insert(denom.clone(), new_weight);
                changes.push(WeightChange {
                    denom: denom.clone(),
                    prev_weight,
                    new_weight,
                    intervals,
                });
            }
            staged.push(next);
        }

        let changed: Vec<String> = changes.iter().map(|c| c.denom.clone()).collect();
        let plan = self.plan_rebalance(&changed, &pending)?;

        for change in &changes {
            self.snapshot_holders(&change.denom, change.prev_weight);
            info!(
                denom = %change.denom,
                from = %change.prev_weight,
                to = %change.new_weight,
                intervals = change.intervals,
                "reward weight changed"
            );
        }
        for asset in staged {
            let denom = asset.denom.clone();
            *self.assets.get_mut(&denom)? = asset;
        }
        self.apply_rebalance(plan)?;
        Ok(changes)
    }

    /// Append a snapshot at `prev_weight` for every validator currently
    /// holding `denom`.
    pub(crate) fn snapshot_holders(&mut self, denom: &str, prev_weight: Dec) {
        for (validator, record) in &self.validators {
            if record.tokens_of(denom) == 0 {
                continue;
            }
            let sequence = self.snapshots.append(
                denom,
                validator,
                prev_weight,
                record.global_reward_history.clone(),
            );
            debug!(denom, validator = %validator, sequence, prev_weight = %prev_weight, "weight-change snapshot");
        }
    }
}
