// mint-engine/src/types.rs

use crate::{MintError, MintResult};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Decimals of the native currency (1 ether = 10^18 wei)
pub const NATIVE_DECIMALS: usize = 18;

/// Currency amount in the smallest unit (wei).
///
/// Serialized as a decimal string so configuration files can hold values
/// larger than a TOML integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    /// Parse a decimal ether string such as `"0.02"` into wei
    pub fn from_ether_str(s: &str) -> MintResult<Self> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(MintError::InvalidAmount(format!("'{}' is empty", s)));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(MintError::InvalidAmount(format!("'{}' is not a decimal number", s)));
        }
        if fraction.len() > NATIVE_DECIMALS {
            return Err(MintError::InvalidAmount(format!(
                "'{}' has more than {} decimals", s, NATIVE_DECIMALS
            )));
        }

        let digits = format!(
            "{}{}{}",
            whole,
            fraction,
            "0".repeat(NATIVE_DECIMALS - fraction.len())
        );
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::zero());
        }

        BigUint::from_str(digits)
            .map(Self)
            .map_err(|e| MintError::InvalidAmount(e.to_string()))
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 + &other.0))
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    /// Unit price times quantity
    pub fn times(&self, quantity: u64) -> Amount {
        Amount(&self.0 * BigUint::from(quantity))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = MintError;

    /// Parse a decimal wei string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s.trim())
            .map(Self)
            .map_err(|e| MintError::InvalidAmount(format!("'{}': {}", s, e)))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::from_u64(100);
        let b = Amount::from_u64(50);

        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum, Amount::from_u64(150));

        let diff = sum.checked_sub(&b).unwrap();
        assert_eq!(diff, Amount::from_u64(100));
        assert_eq!(b.times(3), Amount::from_u64(150));
    }

    #[test]
    fn test_amount_underflow() {
        let a = Amount::from_u64(50);
        let b = Amount::from_u64(100);

        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_from_ether_str() {
        assert_eq!(
            Amount::from_ether_str("0.02").unwrap(),
            Amount::from_u64(20_000_000_000_000_000)
        );
        assert_eq!(
            Amount::from_ether_str("2.5").unwrap(),
            Amount::from_u64(2_500_000_000_000_000_000)
        );
        assert_eq!(
            Amount::from_ether_str("100").unwrap(),
            Amount::from_u128(100_000_000_000_000_000_000)
        );
        assert!(Amount::from_ether_str("0.0").unwrap().is_zero());
        assert!(Amount::from_ether_str(".5").is_ok());
    }

    #[test]
    fn test_from_ether_str_rejects_garbage() {
        assert!(Amount::from_ether_str("").is_err());
        assert!(Amount::from_ether_str("1.2.3").is_err());
        assert!(Amount::from_ether_str("-1").is_err());
        assert!(Amount::from_ether_str("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_amount_serde_as_string() {
        let amount = Amount::from_ether_str("0.01").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"10000000000000000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
