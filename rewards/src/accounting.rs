//! Funding and claiming.
//!
//! Funding raises the validator's global index by `amount / power` per denom.
//! Claiming walks the delegation's pending weight-change snapshots, pays what
//! each stretch of index growth earned at the weight then in force, and
//! resyncs the delegation to the global index.

use crate::delegation::{Delegation, DelegationKey};
use crate::engine::RewardEngine;
use crate::error::RewardError;
use crate::history::RewardAccrual;
use plexus_store::{LedgerStore, PowerStore, StoreError};
use plexus_types::{validate_denom, AccountAddress, Coins, Dec, ValidatorId};
use tracing::{debug, info, warn};

impl<L: LedgerStore, P: PowerStore> RewardEngine<L, P> {
    /// Fund `validator`'s delegators with `coins` taken from `source`.
    ///
    /// Cost is independent of the number of delegations. The remainder of
    /// `amount - Δ * power` stays in the pool unattributed.
    pub fn add_to_reward_pool(
        &mut self,
        source: &AccountAddress,
        validator: &ValidatorId,
        coins: &Coins,
    ) -> Result<(), RewardError> {
        if coins.is_empty() {
            return Err(RewardError::ZeroAmount);
        }
        for (denom, _) in coins.iter() {
            validate_denom(denom).map_err(|_| RewardError::InvalidDenom(denom.to_string()))?;
        }
        if !self.power.validator_exists(validator) {
            return Err(RewardError::ValidatorNotFound(validator.to_string()));
        }
        let bonded = self.power.bonded_power(validator)?;
        if bonded == 0 {
            warn!(validator = %validator, "funding rejected: zero bonded power");
            return Err(RewardError::ZeroBondedPower(validator.to_string()));
        }

        let mut history = self.global_history(validator);
        for (denom, amount) in coins.iter() {
            let delta = Dec::from_ratio(amount, bonded).ok_or(RewardError::Overflow)?;
            history.increase(denom, delta)?;
            debug!(
                validator = %validator,
                denom,
                amount,
                delta = %delta,
                index = %history.index(denom),
                "global reward index raised"
            );
        }

        let pool = self.params.reward_pool_account.clone();
        self.ledger.transfer(source, &pool, coins)?;
        self.validators
            .entry(validator.clone())
            .or_default()
            .global_reward_history = history;
        Ok(())
    }

    /// Pay out everything the delegation has earned and resync it.
    ///
    /// Returns the coins transferred; empty when nothing reached a whole unit.
    pub fn claim(
        &mut self,
        delegator: &AccountAddress,
        validator: &ValidatorId,
        denom: &str,
    ) -> Result<Coins, RewardError> {
        let key = self.existing_key(delegator, validator, denom)?;
        let payout = self.claimable_for(&key)?;
        if payout.is_empty() && !self.params.forgive_truncated_claims {
            debug!(delegator = %delegator, validator = %validator, denom, "claim below one unit, left pending");
            return Ok(payout);
        }
        self.pay_out(delegator, &payout)?;
        let resynced = self.resynced(&key);
        self.delegations.insert(key, resynced);
        info!(
            delegator = %delegator,
            validator = %validator,
            denom,
            payout = %payout,
            "rewards claimed"
        );
        Ok(payout)
    }

    /// What `claim` would pay right now, without paying or mutating anything.
    pub fn claimable_rewards(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorId,
        denom: &str,
    ) -> Result<Coins, RewardError> {
        let key = self.existing_key(delegator, validator, denom)?;
        self.claimable_for(&key)
    }

    fn existing_key(
        &self,
        delegator: &AccountAddress,
        validator: &ValidatorId,
        denom: &str,
    ) -> Result<DelegationKey, RewardError> {
        if !self.assets.contains(denom) {
            return Err(RewardError::InvalidDenom(denom.to_string()));
        }
        let key = DelegationKey::new(delegator, validator, denom);
        if !self.delegations.contains_key(&key) {
            return Err(RewardError::DelegationNotFound {
                delegator: delegator.to_string(),
                validator: validator.to_string(),
                denom: denom.to_string(),
            });
        }
        Ok(key)
    }

    /// Whole units owed to the delegation under `key`; empty if there is none.
    pub(crate) fn claimable_for(&self, key: &DelegationKey) -> Result<Coins, RewardError> {
        match self.delegations.get(key) {
            Some(delegation) => self.accrued(key, delegation)?.into_coins(),
            None => Ok(Coins::new()),
        }
    }

    fn accrued(&self, key: &DelegationKey, delegation: &Delegation) -> Result<RewardAccrual, RewardError> {
        let mut owed = RewardAccrual::new();
        let Some(record) = self.validators.get(&key.validator) else {
            return Ok(owed);
        };
        let tokens = delegation.token_amount;
        let mut local = &delegation.reward_history;
        for snapshot in self
            .snapshots
            .since(&key.denom, &key.validator, delegation.snapshot_cursor)
        {
            snapshot
                .reward_histories
                .accrue_since(local, tokens, snapshot.prev_reward_weight, &mut owed)?;
            local = &snapshot.reward_histories;
        }
        let weight = self.assets.get(&key.denom)?.effective_weight();
        record
            .global_reward_history
            .accrue_since(local, tokens, weight, &mut owed)?;
        Ok(owed)
    }

    /// The delegation under `key` caught up to the global index and the
    /// latest snapshot.
    pub(crate) fn resynced(&self, key: &DelegationKey) -> Delegation {
        let token_amount = self
            .delegations
            .get(key)
            .map(|d| d.token_amount)
            .unwrap_or(0);
        Delegation {
            token_amount,
            reward_history: self.global_history(&key.validator),
            snapshot_cursor: self.snapshots.next_sequence(&key.denom, &key.validator),
        }
    }

    /// Transfer `payout` from the reward pool to `delegator`.
    pub(crate) fn pay_out(&mut self, delegator: &AccountAddress, payout: &Coins) -> Result<(), RewardError> {
        if payout.is_empty() {
            return Ok(());
        }
        let pool = self.params.reward_pool_account.clone();
        self.ledger
            .transfer(&pool, delegator, payout)
            .map_err(|e| match e {
                StoreError::InsufficientFunds {
                    denom,
                    needed,
                    available,
                    ..
                } => RewardError::InsufficientRewardPool {
                    denom,
                    needed,
                    available,
                },
                other => RewardError::Store(other),
            })
    }
}
