//! Coin and coin-set types.
//!
//! Amounts are raw integer token units (`u128`). A [`Coins`] set is kept
//! sorted by denom with at most one entry per denom and no zero entries, so
//! two sets holding the same balances always compare (and encode) equal.

use crate::error::PlexusError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Check denom syntax: 3..=128 chars, a leading ASCII letter, then ASCII
/// alphanumerics or one of `/ : . _ -`.
pub fn validate_denom(denom: &str) -> Result<(), PlexusError> {
    let mut chars = denom.chars();
    let valid_len = (3..=128).contains(&denom.len());
    let valid_head = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if valid_len && valid_head && valid_tail {
        Ok(())
    } else {
        Err(PlexusError::InvalidDenom(denom.to_string()))
    }
}

/// A single amount of one denom.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parses `"<amount><denom>"`, e.g. `"1000000uatom"`.
impl FromStr for Coin {
    type Err = PlexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, denom) = s.split_at(split);
        if digits.is_empty() {
            return Err(PlexusError::InvalidCoin(s.to_string()));
        }
        let amount = digits
            .parse()
            .map_err(|_| PlexusError::AmountOverflow(s.to_string()))?;
        validate_denom(denom)?;
        Ok(Self::new(denom, amount))
    }
}

/// A normalized multi-denom amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coins(BTreeMap<String, u128>);

impl Coins {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a set from arbitrary coins: validates every denom, merges
    /// duplicates and drops zero amounts.
    pub fn try_from_coins(coins: impl IntoIterator<Item = Coin>) -> Result<Self, PlexusError> {
        let mut set = Self::new();
        for coin in coins {
            validate_denom(&coin.denom)?;
            set.add(coin)?;
        }
        Ok(set)
    }

    /// Add a coin to the set. Zero amounts are ignored.
    ///
    /// The denom is not validated here; use [`Coins::try_from_coins`] for
    /// untrusted input.
    pub fn add(&mut self, coin: Coin) -> Result<(), PlexusError> {
        if coin.amount == 0 {
            return Ok(());
        }
        let entry = self.0.entry(coin.denom.clone()).or_insert(0);
        *entry = entry
            .checked_add(coin.amount)
            .ok_or(PlexusError::AmountOverflow(coin.denom))?;
        Ok(())
    }

    /// Amount held of `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(denom, amount)` in denom order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u128)> + '_ {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    /// Owned coins in denom order.
    pub fn to_vec(&self) -> Vec<Coin> {
        self.iter().map(|(d, a)| Coin::new(d, a)).collect()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(d, a)| format!("{a}{d}")).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        let mut set = Self::new();
        if coin.amount > 0 {
            set.0.insert(coin.denom, coin.amount);
        }
        set
    }
}

/// Build a set from one amount per denom. Zero amounts are dropped.
impl From<BTreeMap<String, u128>> for Coins {
    fn from(amounts: BTreeMap<String, u128>) -> Self {
        Self(amounts.into_iter().filter(|(_, a)| *a > 0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denom_syntax() {
        for ok in ["stake", "uatom", "ibc/27394FB092D2ECCD", "factory/osmo1x/alpha", "a.b-c_d:e"] {
            assert!(validate_denom(ok).is_ok(), "{ok} should be valid");
        }
        for bad in ["", "ab", "1abc", "/abc", "has space", "émoji"] {
            assert!(validate_denom(bad).is_err(), "{bad} should be invalid");
        }
        assert!(validate_denom(&"a".repeat(129)).is_err());
    }

    #[test]
    fn coins_merge_and_drop_zero() {
        let coins = Coins::try_from_coins(vec![
            Coin::new("stake", 5),
            Coin::new("atom", 0),
            Coin::new("stake", 7),
            Coin::new("btc", 1),
        ])
        .unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins.amount_of("stake"), 12);
        assert_eq!(coins.amount_of("atom"), 0);
        assert_eq!(coins.to_string(), "1btc,12stake");
    }

    #[test]
    fn coins_reject_invalid_denom() {
        let err = Coins::try_from_coins(vec![Coin::new("x", 1)]).unwrap_err();
        assert_eq!(err, PlexusError::InvalidDenom("x".into()));
    }

    #[test]
    fn coins_detect_overflow() {
        let mut coins = Coins::from(Coin::new("stake", u128::MAX));
        assert!(coins.add(Coin::new("stake", 1)).is_err());
        assert_eq!(coins.amount_of("stake"), u128::MAX);
    }

    #[test]
    fn from_amount_map_drops_zero() {
        let amounts = BTreeMap::from([
            ("stake".to_string(), u128::MAX),
            ("atom".to_string(), 0),
            ("btc".to_string(), 3),
        ]);
        let coins = Coins::from(amounts);
        assert_eq!(coins.len(), 2);
        assert_eq!(coins.amount_of("stake"), u128::MAX);
        assert_eq!(coins.to_string(), format!("3btc,{}stake", u128::MAX));
    }

    #[test]
    fn coin_parses_amount_then_denom() {
        assert_eq!("1000000uatom".parse::<Coin>().unwrap(), Coin::new("uatom", 1_000_000));
        assert_eq!("5ibc/ABC".parse::<Coin>().unwrap(), Coin::new("ibc/ABC", 5));
        assert!(matches!("uatom".parse::<Coin>(), Err(PlexusError::InvalidCoin(_))));
        assert!(matches!("10".parse::<Coin>(), Err(PlexusError::InvalidDenom(_))));
        assert!(matches!(
            "999999999999999999999999999999999999999999stake".parse::<Coin>(),
            Err(PlexusError::AmountOverflow(_))
        ));
    }

    #[test]
    fn from_zero_coin_is_empty() {
        assert!(Coins::from(Coin::new("stake", 0)).is_empty());
    }
}
