//! Nullable validator power registry.

use plexus_store::{PowerStore, StoreError};
use plexus_types::ValidatorId;
use std::collections::BTreeMap;

/// In-memory bonded power per known validator.
#[derive(Clone, Debug, Default)]
pub struct NullPowerStore {
    powers: BTreeMap<ValidatorId, u128>,
    writes: u64,
}

impl NullPowerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that already knows `validators`, each at zero power.
    pub fn with_validators<'a>(validators: impl IntoIterator<Item = &'a str>) -> Self {
        let mut store = Self::new();
        for v in validators {
            store.register_validator(ValidatorId::new(v));
        }
        store
    }

    /// Make `validator` known at zero power. Existing power is kept.
    pub fn register_validator(&mut self, validator: ValidatorId) {
        self.powers.entry(validator).or_insert(0);
    }

    /// Number of `set_bonded_power` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl PowerStore for NullPowerStore {
    fn validator_exists(&self, validator: &ValidatorId) -> bool {
        self.powers.contains_key(validator)
    }

    fn bonded_power(&self, validator: &ValidatorId) -> Result<u128, StoreError> {
        self.powers
            .get(validator)
            .copied()
            .ok_or_else(|| StoreError::NotFound(validator.to_string()))
    }

    fn set_bonded_power(&mut self, validator: &ValidatorId, power: u128) -> Result<(), StoreError> {
        let slot = self
            .powers
            .get_mut(validator)
            .ok_or_else(|| StoreError::NotFound(validator.to_string()))?;
        *slot = power;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_validator_is_not_found() {
        let mut store = NullPowerStore::new();
        let v = ValidatorId::new("val1");
        assert!(!store.validator_exists(&v));
        assert!(matches!(store.bonded_power(&v), Err(StoreError::NotFound(_))));
        assert!(store.set_bonded_power(&v, 5).is_err());
    }

    #[test]
    fn registered_validator_starts_at_zero() {
        let mut store = NullPowerStore::with_validators(["val1"]);
        let v = ValidatorId::new("val1");
        assert_eq!(store.bonded_power(&v).unwrap(), 0);
        store.set_bonded_power(&v, 12).unwrap();
        store.register_validator(v.clone());
        assert_eq!(store.bonded_power(&v).unwrap(), 12);
        assert_eq!(store.write_count(), 1);
    }
}
