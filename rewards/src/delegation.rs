//! Delegation records and the position bookkeeping around them.
//!
//! Changing a position's token amount settles what it has earned so far,
//! resyncs its local indices, and recomputes the validator's bonded power.

use crate::engine::RewardEngine;
use crate::error::RewardError;
use crate::history::RewardHistory;
use crate::rebalance::PendingChanges;
use plexus_store::{LedgerStore, PowerStore};
use plexus_types::{validate_denom, AccountAddress, Coin, Coins, ValidatorId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Key of a delegation: one position per (delegator, validator, asset denom).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DelegationKey {
    pub delegator: AccountAddress,
    pub validator: ValidatorId,
    pub denom: String,
}

impl DelegationKey {
    pub fn new(
        delegator: &AccountAddress,
        validator: &ValidatorId,
        denom: impl Into<String>,
    ) -> Self {
        Self {
            delegator: delegator.clone(),
            validator: validator.clone(),
            denom: denom.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// Stake in units of the asset denom.
    pub token_amount: u128,
    /// Local reward indices as of the last settlement.
    pub reward_history: RewardHistory,
    /// Sequence of the first weight-change snapshot not yet absorbed.
    pub snapshot_cursor: u64,
}

impl Delegation {
    /// Whether weight changes happened since this position last settled.
    pub fn is_behind(&self, next_sequence: u64) -> bool {
        self.snapshot_cursor < next_sequence
    }
}

impl<L: LedgerStore, P: PowerStore> RewardEngine<L, P> {
    /// Bond `coin` from `delegator` to `validator`.
    ///
    /// Pending rewards on an existing position are paid out first. Returns
    /// that payout.
    pub fn delegate(
        &mut self,
        delegator: &AccountAddress,
        validator: &ValidatorId,
        coin: Coin,
    ) -> Result<Coins, RewardError> {
        self.check_position_change(validator, &coin)?;
        let key = DelegationKey::new(delegator, validator, coin.denom.clone());
        let held = self.delegations.get(&key).map_or(0, |d| d.token_amount);
        let new_amount = held.checked_add(coin.amount).ok_or(RewardError::Overflow)?;
        let at_validator = self
            .validator_tokens(validator, &coin.denom)
            .checked_add(coin.amount)
            .ok_or(RewardError::Overflow)?;

        let payout = self.claimable_for(&key)?;
        let mut pending = PendingChanges::default();
        pending
            .tokens
            .insert((validator.clone(), coin.denom.clone()), at_validator);
        let plan = self.plan_rebalance(&[coin.denom.clone()], &pending)?;

        let stake_pool = self.params.stake_pool_account.clone();
        self.ledger.transfer(delegator, &stake_pool, &Coins::from(coin.clone()))?;
        self.pay_out(delegator, &payout)?;

        let mut record = self.resynced(&key);
        record.token_amount = new_amount;
        self.delegations.insert(key, record);
        self.apply_rebalance(plan)?;
        info!(
            delegator = %delegator,
            validator = %validator,
            amount = %coin,
            total = new_amount,
            "delegated"
        );
        Ok(payout)
    }

    /// Unbond `coin` back to `delegator`, paying pending rewards first.
    ///
    /// The record is removed once its amount reaches zero.
    pub fn undelegate(
        &mut self,
        delegator: &AccountAddress,
        validator: &ValidatorId,
        coin: Coin,
    ) -> Result<Coins, RewardError> {
        self.check_position_change(validator, &coin)?;
        let key = DelegationKey::new(delegator, validator, coin.denom.clone());
        let held = match self.delegations.get(&key) {
            Some(d) => d.token_amount,
            None => {
                return Err(RewardError::DelegationNotFound {
                    delegator: delegator.to_string(),
                    validator: validator.to_string(),
                    denom: coin.denom,
                })
            }
        };
        if held < coin.amount {
            return Err(RewardError::InsufficientDelegation {
                have: held,
                need: coin.amount,
            });
        }
        let remaining = held - coin.amount;
        let at_validator = self
            .validator_tokens(validator, &coin.denom)
            .saturating_sub(coin.amount);

        let payout = self.claimable_for(&key)?;
        let mut pending = PendingChanges::default();
        pending
            .tokens
            .insert((validator.clone(), coin.denom.clone()), at_validator);
        let plan = self.plan_rebalance(&[coin.denom.clone()], &pending)?;

        let stake_pool = self.params.stake_pool_account.clone();
        self.ledger.transfer(&stake_pool, delegator, &Coins::from(coin.clone()))?;
        self.pay_out(delegator, &payout)?;

        if remaining == 0 {
            self.delegations.remove(&key);
        } else {
            let mut record = self.resynced(&key);
            record.token_amount = remaining;
            self.delegations.insert(key, record);
        }
        self.apply_rebalance(plan)?;
        info!(
            delegator = %delegator,
            validator = %validator,
            amount = %coin,
            remaining,
            "undelegated"
        );
        Ok(payout)
    }

    fn check_position_change(&self, validator: &ValidatorId, coin: &Coin) -> Result<(), RewardError> {
        validate_denom(&coin.denom).map_err(|_| RewardError::InvalidDenom(coin.denom.clone()))?;
        if !self.assets.contains(&coin.denom) {
            return Err(RewardError::InvalidDenom(coin.denom.clone()));
        }
        if coin.is_zero() {
            return Err(RewardError::ZeroAmount);
        }
        if !self.power.validator_exists(validator) {
            return Err(RewardError::ValidatorNotFound(validator.to_string()));
        }
        Ok(())
    }

    fn validator_tokens(&self, validator: &ValidatorId, denom: &str) -> u128 {
        self.validators
            .get(validator)
            .map_or(0, |record| record.tokens_of(denom))
    }
}
