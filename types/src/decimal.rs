//! Fixed-point decimal for reward weights, decay rates and reward indices.
//!
//! A `Dec` counts units of 10^-18 in a 256-bit integer, so any `u128` token
//! amount times any weight or index stays representable. Products are
//! evaluated in a 512-bit intermediate and truncated toward zero, so the same
//! sequence of operations yields bit-identical results on every node. There is
//! no floating point anywhere in the reward path.

use crate::error::PlexusError;
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits carried by [`Dec`].
pub const DECIMAL_PLACES: usize = 18;

const SCALE_U64: u64 = 1_000_000_000_000_000_000;
const SCALE: U256 = U256([SCALE_U64, 0, 0, 0]);

/// Unsigned 18-digit fixed-point decimal.
///
/// Serialized as its plain decimal string (`"0.5"`, `"1.166666666666666666"`)
/// so configuration files and JSON reports stay readable and lossless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dec(U256);

impl Dec {
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));
    pub const ONE: Self = Self(SCALE);
    pub const MAX: Self = Self(U256::MAX);

    /// Wrap a raw count of 10^-18 units.
    pub fn from_raw(raw: impl Into<U256>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The integer `n` as a decimal. Every `u128` fits.
    pub fn from_int(n: u128) -> Self {
        Self(U256::from(n) * SCALE)
    }

    /// `num / den`, truncated toward zero. `None` for a zero denominator.
    pub fn from_ratio(num: u128, den: u128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        Some(Self(U256::from(num) * SCALE / U256::from(den)))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `self * other`, truncated toward zero.
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        let wide: U512 = self.0.full_mul(other.0) / U512::from(SCALE);
        U256::try_from(wide).ok().map(Self)
    }

    /// `self * n` for an integer `n`. Exact.
    pub fn checked_mul_int(self, n: u128) -> Option<Self> {
        self.0.checked_mul(U256::from(n)).map(Self)
    }

    /// `self ^ exp` by square-and-multiply, truncating after every product.
    pub fn checked_pow(self, exp: u64) -> Option<Self> {
        let mut acc = Self::ONE;
        let mut base = self;
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.checked_mul(base)?;
            }
            e >>= 1;
            if e > 0 {
                base = base.checked_mul(base)?;
            }
        }
        Some(acc)
    }

    /// The integer part, or `None` if it does not fit a token amount.
    pub fn truncate(&self) -> Option<u128> {
        narrow(self.0 / SCALE)
    }

    /// The smallest integer not below `self`, or `None` if it does not fit.
    pub fn ceil(&self) -> Option<u128> {
        let whole = self.0 / SCALE;
        if (self.0 % SCALE).is_zero() {
            narrow(whole)
        } else {
            narrow(whole.checked_add(U256::one())?)
        }
    }
}

fn narrow(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.low_u128())
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / SCALE;
        let frac = (self.0 % SCALE).low_u128();
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{frac:0width$}", width = DECIMAL_PLACES);
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Dec {
    type Err = PlexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlexusError::InvalidDecimal(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
            || frac_part.len() > DECIMAL_PLACES
            || (s.contains('.') && frac_part.is_empty())
        {
            return Err(invalid());
        }
        let int = U256::from_dec_str(int_part).map_err(|_| invalid())?;
        let frac: u64 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{frac_part:0<width$}", width = DECIMAL_PLACES);
            padded.parse().map_err(|_| invalid())?
        };
        int.checked_mul(SCALE)
            .and_then(|v| v.checked_add(U256::from(frac)))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Dec {
    type Error = PlexusError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Dec> for String {
    fn from(d: Dec) -> Self {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Dec {
        s.parse().unwrap()
    }

    #[test]
    fn ratio_truncates_toward_zero() {
        assert_eq!(Dec::from_ratio(2_000_000, 12_000_000).unwrap(), dec("0.166666666666666666"));
        assert_eq!(Dec::from_ratio(4_000_000, 12_000_000).unwrap(), dec("0.333333333333333333"));
        assert_eq!(Dec::from_ratio(2, 3).unwrap().raw(), U256::from(666_666_666_666_666_666u128));
    }

    #[test]
    fn ratio_with_zero_denominator_is_none() {
        assert_eq!(Dec::from_ratio(1, 0), None);
    }

    #[test]
    fn any_token_amount_fits() {
        assert_eq!(Dec::from_ratio(u128::MAX, 1).unwrap(), Dec::from_int(u128::MAX));
        assert_eq!(Dec::from_int(u128::MAX).truncate(), Some(u128::MAX));
        let owed = Dec::from_int(u128::MAX).checked_mul(Dec::from_int(1_000_000)).unwrap();
        assert_eq!(owed.truncate(), None);
    }

    #[test]
    fn mul_truncates() {
        let third = Dec::from_ratio(1, 3).unwrap();
        let product = third.checked_mul(Dec::from_int(3)).unwrap();
        assert_eq!(product, dec("0.999999999999999999"));
        assert_eq!(product.truncate(), Some(0));
        assert_eq!(product.ceil(), Some(1));
    }

    #[test]
    fn mul_does_not_overflow_in_intermediate() {
        let big = Dec::from_int(10u128.pow(30));
        let half = dec("0.5");
        assert_eq!(big.checked_mul(half).unwrap(), Dec::from_int(5 * 10u128.pow(29)));
    }

    #[test]
    fn mul_overflow_is_none() {
        assert_eq!(Dec::MAX.checked_mul(Dec::from_int(2)), None);
        assert_eq!(Dec::MAX.checked_mul_int(2), None);
        assert_eq!(Dec::MAX.checked_add(Dec::from_raw(1u8)), None);
    }

    #[test]
    fn pow_of_half() {
        let half = dec("0.5");
        assert_eq!(half.checked_pow(0).unwrap(), Dec::ONE);
        assert_eq!(half.checked_pow(1).unwrap(), half);
        assert_eq!(half.checked_pow(2).unwrap(), dec("0.25"));
        assert_eq!(half.checked_pow(3).unwrap(), dec("0.125"));
        assert_eq!(half.checked_pow(10).unwrap(), dec("0.0009765625"));
    }

    #[test]
    fn pow_of_one_is_one() {
        assert_eq!(Dec::ONE.checked_pow(1_000_000).unwrap(), Dec::ONE);
    }

    #[test]
    fn pow_overflow_is_none() {
        assert_eq!(Dec::from_int(10).checked_pow(60), None);
    }

    #[test]
    fn large_values_display_and_parse() {
        let d = dec("1000000000000000000000000.5");
        assert_eq!(d.to_string(), "1000000000000000000000000.5");
        assert_eq!(Dec::from_int(10u128.pow(24)).to_string(), "1000000000000000000000000");
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Dec::ONE.to_string(), "1");
        assert_eq!(Dec::ZERO.to_string(), "0");
        assert_eq!(dec("0.250").to_string(), "0.25");
        assert_eq!(Dec::from_ratio(7, 6).unwrap().to_string(), "1.166666666666666666");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", ".5", "1.", "-1", "1e5", "0.1234567890123456789", "abc", "1.2.3"] {
            assert!(bad.parse::<Dec>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(format!("1{}", "0".repeat(60)).parse::<Dec>().is_err());
        assert!(format!("1{}", "0".repeat(80)).parse::<Dec>().is_err());
    }

    #[test]
    fn serde_uses_decimal_string() {
        let json = serde_json::to_string(&dec("0.5")).unwrap();
        assert_eq!(json, "\"0.5\"");
        let back: Dec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dec("0.5"));
        assert!(serde_json::from_str::<Dec>("\"nope\"").is_err());
    }

    #[test]
    fn truncate_and_sub() {
        assert_eq!(dec("2333333.333333333332").truncate(), Some(2_333_333));
        assert_eq!(dec("2333333.333333333332").ceil(), Some(2_333_334));
        assert_eq!(dec("7").ceil(), Some(7));
        assert_eq!(dec("1").checked_sub(dec("2")), None);
        assert_eq!(dec("1").saturating_sub(dec("2")), Dec::ZERO);
    }
}
