use crate::StoreError;
use plexus_types::{AccountAddress, Coins};

/// The token-transfer ledger.
///
/// `transfer` must be all-or-nothing across every coin in the set: either all
/// denoms move or none do.
pub trait LedgerStore {
    fn transfer(
        &mut self,
        from: &AccountAddress,
        to: &AccountAddress,
        coins: &Coins,
    ) -> Result<(), StoreError>;

    fn balance(&self, account: &AccountAddress, denom: &str) -> u128;
}
