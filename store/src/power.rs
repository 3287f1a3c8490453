use crate::StoreError;
use plexus_types::ValidatorId;

/// The authoritative record of each validator's bonded voting power.
pub trait PowerStore {
    fn validator_exists(&self, validator: &ValidatorId) -> bool;

    /// Current bonded power. `StoreError::NotFound` for an unknown validator.
    fn bonded_power(&self, validator: &ValidatorId) -> Result<u128, StoreError>;

    /// Overwrite the bonded power. `StoreError::NotFound` for an unknown validator.
    fn set_bonded_power(&mut self, validator: &ValidatorId, power: u128) -> Result<(), StoreError>;
}
