//! The reward-accounting engine: one instance per chain, owning every piece of
//! core state and the handles to its two collaborators.
//!
//! Operations are spread over several modules by concern (`accounting`,
//! `rebalance`, `decay`, `delegation`); this file holds construction,
//! governance entry points and read-only queries.

use crate::asset::{Asset, AssetParams, AssetRegistry};
use crate::delegation::{Delegation, DelegationKey};
use crate::error::RewardError;
use crate::history::RewardHistory;
use crate::rebalance::PendingChanges;
use crate::snapshot::SnapshotLog;
use crate::validator::ValidatorRecord;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use plexus_store::{LedgerStore, PowerStore};
use plexus_types::{AccountAddress, RewardParams, Timestamp, ValidatorId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

type Blake2b256 = Blake2b<U32>;

/// Multi-asset reward accounting over a token ledger and a power registry.
///
/// Funding a validator is O(number of denoms funded) regardless of how many
/// delegations it has: rewards accumulate in the validator's global index and
/// each delegation settles lazily against it when it claims or changes.
pub struct RewardEngine<L, P> {
    pub(crate) params: RewardParams,
    pub(crate) assets: AssetRegistry,
    pub(crate) validators: BTreeMap<ValidatorId, ValidatorRecord>,
    pub(crate) delegations: BTreeMap<DelegationKey, Delegation>,
    pub(crate) snapshots: SnapshotLog,
    pub(crate) ledger: L,
    pub(crate) power: P,
}

impl<L: LedgerStore, P: PowerStore> RewardEngine<L, P> {
    pub fn new(params: RewardParams, ledger: L, power: P) -> Self {
        Self {
            params,
            assets: AssetRegistry::new(),
            validators: BTreeMap::new(),
            delegations: BTreeMap::new(),
            snapshots: SnapshotLog::new(),
            ledger,
            power,
        }
    }

    // ── Governance ─────────────────────────────────────────────────────

    /// Register the initial asset set. No authority check.
    pub fn init_genesis(&mut self, assets: Vec<AssetParams>, now: Timestamp) -> Result<(), RewardError> {
        let mut seen = BTreeSet::new();
        for params in &assets {
            params.validate()?;
            if self.assets.contains(&params.denom) || !seen.insert(params.denom.clone()) {
                return Err(RewardError::DuplicateAsset(params.denom.clone()));
            }
        }
        let delay = self.params.reward_start_delay_secs;
        for params in assets {
            info!(denom = %params.denom, weight = %params.reward_weight, "genesis asset");
            self.assets.register(Asset::from_params(params, now, delay))?;
        }
        Ok(())
    }

    /// Register a new asset. Its weight takes effect after the configured
    /// start delay, once the scheduler observes the start time.
    pub fn register_asset(
        &mut self,
        caller: &AccountAddress,
        params: AssetParams,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        self.authorize(caller)?;
        params.validate()?;
        if self.assets.contains(&params.denom) {
            return Err(RewardError::DuplicateAsset(params.denom));
        }
        let denom = params.denom.clone();
        let asset = Asset::from_params(params, now, self.params.reward_start_delay_secs);
        info!(
            denom = %denom,
            weight = %asset.reward_weight,
            starts_at = %asset.reward_start_time,
            "asset registered"
        );
        self.assets.register(asset)?;
        self.rebalance(&[denom])
    }

    /// Replace an asset's weight, take rate and decay schedule.
    ///
    /// A change of effective weight snapshots every holding validator at the
    /// old weight before the new one applies, then bonded power is recomputed.
    pub fn update_asset(&mut self, caller: &AccountAddress, params: AssetParams) -> Result<(), RewardError> {
        self.authorize(caller)?;
        params.validate()?;
        let current = self.assets.get(&params.denom)?;
        let prev_weight = current.effective_weight();
        let mut updated = current.clone();
        updated.apply_params(&params);
        let new_weight = updated.effective_weight();

        let mut pending = PendingChanges::default();
        pending.weights.insert(params.denom.clone(), new_weight);
        let plan = self.plan_rebalance(&[params.denom.clone()], &pending)?;

        if new_weight != prev_weight {
            self.snapshot_holders(&params.denom, prev_weight);
            info!(denom = %params.denom, from = %prev_weight, to = %new_weight, "asset weight updated");
        }
        *self.assets.get_mut(&params.denom)? = updated;
        self.apply_rebalance(plan)
    }

    /// Replace the engine parameters. The caller must be the current authority.
    pub fn set_params(&mut self, caller: &AccountAddress, params: RewardParams) -> Result<(), RewardError> {
        self.authorize(caller)?;
        info!(authority = %params.authority, start_delay = params.reward_start_delay_secs, "reward params updated");
        self.params = params;
        Ok(())
    }

    fn authorize(&self, caller: &AccountAddress) -> Result<(), RewardError> {
        if caller != &self.params.authority {
            warn!(caller = %caller, "rejected governance call");
            return Err(RewardError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn params(&self) -> &RewardParams {
        &self.params
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn asset(&self, denom: &str) -> Result<&Asset, RewardError> {
        self.assets.get(denom)
    }

    pub fn validator(&self, validator: &ValidatorId) -> Option<&ValidatorRecord> {
        self.validators.get(validator)
    }

    /// The validator's global reward history; empty if it was never funded.
    pub fn global_history(&self, validator: &ValidatorId) -> RewardHistory {
        self.validators
            .get(validator)
            .map(|r| r.global_reward_history.clone())
            .unwrap_or_default()
    }

    pub fn delegation(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorId,
        denom: &str,
    ) -> Option<&Delegation> {
        self.delegations.get(&DelegationKey::new(delegator, validator, denom))
    }

    pub fn snapshots(&self) -> &SnapshotLog {
        &self.snapshots
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn power_mut(&mut self) -> &mut P {
        &mut self.power
    }

    /// Blake2b-256 digest of the bincode-encoded core state.
    ///
    /// Two engines fed the same operation sequence produce the same digest.
    pub fn state_hash(&self) -> Result<[u8; 32], RewardError> {
        let bytes = bincode::serialize(&(
            &self.assets,
            &self.validators,
            &self.delegations,
            &self.snapshots,
        ))
        .map_err(|e| RewardError::Encoding(e.to_string()))?;
        let mut hasher = Blake2b256::new();
        hasher.update(&bytes);
        let mut output = [0u8; 32];
        output.copy_from_slice(&hasher.finalize());
        Ok(output)
    }
}
