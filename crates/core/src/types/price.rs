//! Rupee amounts using decimal arithmetic.
//!
//! The storefront only sells in Indian rupees, so a price is a bare
//! [`Decimal`] with rupee formatting attached. Arithmetic stays in decimal
//! to avoid the float drift a `parseFloat`-style cart total accumulates.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rupee amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Currency symbol used when displaying prices.
    pub const SYMBOL: &'static str = "₹";

    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of paise.
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The underlying rupee amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    ///
    /// Negative quantities are treated as zero.
    #[must_use]
    pub fn times(self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity.max(0)))
    }
}

impl fmt::Display for Price {
    /// Formats as `₹1234.50` (two decimals, no grouping).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", Self::SYMBOL, self.0.round_dp(2))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<i64> for Price {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
