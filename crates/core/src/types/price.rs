//! Type-safe price representation using decimal arithmetic.
//!
//! The store trades in a single currency, so a price is a bare decimal
//! amount tagged with the display label in [`Price::CURRENCY`]. Amounts are
//! kept at full precision internally; display rounds to two decimal places.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
///
/// ## Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use velvet_mango_core::Price;
///
/// let unit = Price::new(Decimal::from(500));
/// assert_eq!(unit.times(3), Price::new(Decimal::from(1500)));
/// assert_eq!(unit.to_string(), "PKR 500.00");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Display label for the store currency.
    pub const CURRENCY: &'static str = "PKR";

    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Two-decimal rounding is a display concern only
        write!(f, "{} {:.2}", Self::CURRENCY, self.0)
    }
}
