//! Fixed-point money stored in minor currency units.
//!
//! Amounts live in the database as `INTEGER` satang (1/100 baht) so arithmetic
//! is exact and SQLite needs no decimal support. At the JSON boundary they are
//! rendered as [`Decimal`] with two fractional digits (`"84.00"`), and parsed
//! back from either a JSON number or a decimal string.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of minor units in one major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// Errors that can occur when converting a decimal amount into [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// More than two fractional digits were supplied.
    #[error("amount must have at most two decimal places")]
    TooPrecise,
    /// The amount does not fit in 64-bit minor units.
    #[error("amount is out of range")]
    OutOfRange,
}

/// An amount of money in minor units (satang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create an amount from whole major units (baht).
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn from_major(major: i64) -> Option<Self> {
        match major.checked_mul(MINOR_PER_MAJOR) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Convert a decimal amount in major units.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::TooPrecise`] for sub-satang precision and
    /// [`MoneyError::OutOfRange`] when the amount overflows `i64` minor units.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let minor = amount
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .ok_or(MoneyError::OutOfRange)?;

        if !minor.fract().is_zero() {
            return Err(MoneyError::TooPrecise);
        }

        minor.to_i64().map(Self).ok_or(MoneyError::OutOfRange)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// The amount as a decimal in major units with two fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub const fn checked_mul(self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_from_decimal_exact() {
        let money = Money::from_decimal(Decimal::from_str("42.50").unwrap()).unwrap();
        assert_eq!(money.minor_units(), 4250);
        assert_eq!(money.to_string(), "42.50");
    }

    #[test]
    fn test_from_decimal_rejects_sub_satang() {
        let result = Money::from_decimal(Decimal::from_str("1.005").unwrap());
        assert_eq!(result, Err(MoneyError::TooPrecise));
    }

    #[test]
    fn test_total_for_quantity() {
        let price = Money::from_major(42).unwrap();
        assert_eq!(price.checked_mul(2), Money::from_major(84));
        assert_eq!(Money::from_minor(i64::MAX).checked_mul(2), None);
    }

    #[test]
    fn test_serializes_as_two_place_decimal() {
        let json = serde_json::to_string(&Money::from_major(84).unwrap()).unwrap();
        assert_eq!(json, "\"84.00\"");
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_number: Money = serde_json::from_str("42").unwrap();
        let from_string: Money = serde_json::from_str("\"42.00\"").unwrap();
        assert_eq!(from_number, Money::from_minor(4200));
        assert_eq!(from_number, from_string);

        let too_precise: Result<Money, _> = serde_json::from_str("\"0.001\"");
        assert!(too_precise.is_err());
    }
}
