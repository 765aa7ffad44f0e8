//! Fixed-point money and percentage types with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so every amount is
//! an exact count of currency minor units (cents).

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a money or percentage literal cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("'{0}' is not a decimal number")]
    Malformed(String),

    #[error("'{0}' has more than 2 decimal places")]
    TooPrecise(String),

    #[error("'{0}' is outside the supported range")]
    OutOfRange(String),
}

fn parse_scaled(s: &str, scale: u32, limit: Decimal) -> std::result::Result<Decimal, ParseAmountError> {
    let trimmed = s.trim();
    let decimal =
        Decimal::from_str(trimmed).map_err(|_| ParseAmountError::Malformed(trimmed.to_string()))?;
    if decimal.normalize().scale() > scale {
        return Err(ParseAmountError::TooPrecise(trimmed.to_string()));
    }
    if decimal.abs() > limit {
        return Err(ParseAmountError::OutOfRange(trimmed.to_string()));
    }
    Ok(decimal)
}

fn rescaled(value: Decimal, scale: u32) -> Decimal {
    let mut normalized = value;
    normalized.rescale(scale);
    if normalized.is_zero() {
        normalized.set_sign_positive(true);
    }
    normalized
}

/// A signed monetary amount that maintains exactly 2 decimal places.
///
/// Balances are signed; expense, payment and transfer amounts are positive.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use split_ledger::Money;
///
/// let amount = Money::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.50");
/// assert_eq!(amount.minor_units(), 1050);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places of the currency minor unit.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Largest absolute amount accepted, in minor units (999,999,999,999.99).
    pub const MAX_MINOR_UNITS: i128 = 99_999_999_999_999;

    /// Creates a new `Money` from a `Decimal`, normalizing to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        Money(rescaled(value, Self::SCALE))
    }

    /// Creates a `Money` from a count of minor units (cents).
    pub fn from_minor(units: i128) -> Self {
        Money(Decimal::from_i128_with_scale(units, Self::SCALE))
    }

    /// Returns the amount as a count of minor units (cents).
    pub fn minor_units(&self) -> i128 {
        let mut value = self.0;
        value.rescale(Self::SCALE);
        value.mantissa()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money::new(self.0.abs())
    }

    /// Largest absolute amount any expense or payment may carry.
    pub fn max() -> Self {
        Money::from_minor(Self::MAX_MINOR_UNITS)
    }

    /// Whether the amount fits the range parsing accepts.
    pub fn is_within_limit(&self) -> bool {
        self.0.abs() <= Money::max().0
    }

    /// Adds `rhs`, returning `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money::new)
    }

    /// Subtracts `rhs`, returning `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Money::new)
    }
}

impl FromStr for Money {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_scaled(s, Self::SCALE, Money::max().0).map(Money::new)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money::new(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A percentage with 0.01% precision, used by percent splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percent(Decimal);

impl Percent {
    pub const SCALE: u32 = 2;

    pub const ZERO: Self = Percent(Decimal::ZERO);

    /// 100%, the total every percent split must reach.
    pub const ONE_HUNDRED: Self = Percent(Decimal::ONE_HUNDRED);

    pub fn new(value: Decimal) -> Self {
        Percent(rescaled(value, Self::SCALE))
    }

    /// Returns the percentage in hundredths of a percent (basis points).
    pub fn hundredths(&self) -> i128 {
        let mut value = self.0;
        value.rescale(Self::SCALE);
        value.mantissa()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl FromStr for Percent {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
        parse_scaled(number, Self::SCALE, Decimal::ONE_HUNDRED).map(Percent::new)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Percent {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Percent::new(self.0 + rhs.0)
    }
}

impl Sum for Percent {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Percent::ZERO, Add::add)
    }
}
