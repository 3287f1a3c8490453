//! Append-only log of reward-weight changes per (asset, validator).
//!
//! A snapshot freezes the validator's global reward history and the weight in
//! force just before an asset's weight changed. Claims walk the snapshots a
//! delegation has not absorbed yet, so each stretch of index growth is paid at
//! the weight that actually produced it.

use crate::history::RewardHistory;
use plexus_types::{Dec, ValidatorId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time record taken immediately before a weight change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightChangeSnapshot {
    /// Position in the (asset, validator) log, starting at 0.
    pub sequence: u64,
    /// Weight in effect up to the change.
    pub prev_reward_weight: Dec,
    /// The validator's global reward history at the change.
    pub reward_histories: RewardHistory,
}

/// The snapshot store. Records are never mutated or removed once appended.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLog {
    logs: BTreeMap<(String, ValidatorId), Vec<WeightChangeSnapshot>>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and return its sequence number.
    pub fn append(
        &mut self,
        denom: &str,
        validator: &ValidatorId,
        prev_reward_weight: Dec,
        reward_histories: RewardHistory,
    ) -> u64 {
        let log = self
            .logs
            .entry((denom.to_string(), validator.clone()))
            .or_default();
        let sequence = log.len() as u64;
        log.push(WeightChangeSnapshot {
            sequence,
            prev_reward_weight,
            reward_histories,
        });
        sequence
    }

    /// Sequence number the next snapshot for this key will get.
    pub fn next_sequence(&self, denom: &str, validator: &ValidatorId) -> u64 {
        self.get(denom, validator).len() as u64
    }

    /// Every snapshot for the key, oldest first.
    pub fn get(&self, denom: &str, validator: &ValidatorId) -> &[WeightChangeSnapshot] {
        self.logs
            .get(&(denom.to_string(), validator.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Snapshots with `sequence >= from`, oldest first.
    pub fn since(&self, denom: &str, validator: &ValidatorId, from: u64) -> &[WeightChangeSnapshot] {
        let all = self.get(denom, validator);
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(all.len());
        &all[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn val(name: &str) -> ValidatorId {
        ValidatorId::new(name)
    }

    #[test]
    fn sequences_start_at_zero_without_gaps() {
        let mut log = SnapshotLog::new();
        for expected in 0..4 {
            let seq = log.append("ualpha", &val("v1"), Dec::ONE, RewardHistory::new());
            assert_eq!(seq, expected);
        }
        let seqs: Vec<u64> = log.get("ualpha", &val("v1")).iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
        assert_eq!(log.next_sequence("ualpha", &val("v1")), 4);
    }

    #[test]
    fn keys_are_independent() {
        let mut log = SnapshotLog::new();
        log.append("ualpha", &val("v1"), Dec::ONE, RewardHistory::new());
        log.append("ualpha", &val("v1"), Dec::ONE, RewardHistory::new());
        assert_eq!(log.append("ualpha", &val("v2"), Dec::ONE, RewardHistory::new()), 0);
        assert_eq!(log.append("ubeta", &val("v1"), Dec::ONE, RewardHistory::new()), 0);
        assert_eq!(log.next_sequence("ughost", &val("v1")), 0);
    }

    #[test]
    fn since_skips_absorbed() {
        let mut log = SnapshotLog::new();
        for w in 1..=3 {
            log.append("ualpha", &val("v1"), Dec::from_int(w), RewardHistory::new());
        }
        let pending = log.since("ualpha", &val("v1"), 1);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].sequence, 1);
        assert_eq!(pending[0].prev_reward_weight, Dec::from_int(2));
        assert!(log.since("ualpha", &val("v1"), 3).is_empty());
        assert!(log.since("ualpha", &val("v1"), 99).is_empty());
    }
}
