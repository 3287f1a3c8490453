//! Nullable token ledger.

use plexus_store::{LedgerStore, StoreError};
use plexus_types::{AccountAddress, Coin, Coins};
use std::collections::BTreeMap;

/// In-memory balances keyed by (account, denom).
///
/// Transfers are all-or-nothing: a multi-denom transfer that is short in any
/// denom moves nothing.
#[derive(Clone, Debug, Default)]
pub struct NullLedger {
    balances: BTreeMap<(AccountAddress, String), u128>,
    transfers: u64,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `coin` to `account` out of thin air.
    pub fn mint(&mut self, account: &AccountAddress, coin: Coin) {
        let entry = self
            .balances
            .entry((account.clone(), coin.denom))
            .or_insert(0);
        *entry = entry.saturating_add(coin.amount);
    }

    /// Every non-zero balance of `account`.
    pub fn balances_of(&self, account: &AccountAddress) -> Coins {
        let held: BTreeMap<String, u128> = self
            .balances
            .iter()
            .filter(|((holder, _), _)| holder == account)
            .map(|((_, denom), amount)| (denom.clone(), *amount))
            .collect();
        Coins::from(held)
    }

    /// Number of successful transfers so far.
    pub fn transfer_count(&self) -> u64 {
        self.transfers
    }
}

impl LedgerStore for NullLedger {
    fn transfer(
        &mut self,
        from: &AccountAddress,
        to: &AccountAddress,
        coins: &Coins,
    ) -> Result<(), StoreError> {
        for (denom, amount) in coins.iter() {
            let available = self.balance(from, denom);
            if available < amount {
                return Err(StoreError::InsufficientFunds {
                    account: from.to_string(),
                    denom: denom.to_string(),
                    needed: amount,
                    available,
                });
            }
        }
        for (denom, amount) in coins.iter() {
            if let Some(balance) = self.balances.get_mut(&(from.clone(), denom.to_string())) {
                *balance -= amount;
            }
            let credit = self
                .balances
                .entry((to.clone(), denom.to_string()))
                .or_insert(0);
            *credit = credit.saturating_add(amount);
        }
        self.transfers += 1;
        Ok(())
    }

    fn balance(&self, account: &AccountAddress, denom: &str) -> u128 {
        self.balances
            .get(&(account.clone(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }
}
