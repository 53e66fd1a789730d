//! Item price using decimal arithmetic.
//!
//! The document store keeps prices as floating point numbers. They are
//! converted to [`Decimal`] on read so that comparisons and formatting are
//! exact once inside the client.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative item price in pounds sterling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Lowest representable price, used as a sort sentinel.
    pub const MIN: Self = Self(Decimal::MIN);
    /// Highest representable price, used as a sort sentinel.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of pence.
    #[must_use]
    pub fn from_pence(pence: i64) -> Self {
        Self(Decimal::new(pence, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_pence(1999).to_string(), "£19.99");
        assert_eq!(Price::from_pence(500).to_string(), "£5.00");
    }

    #[test]
    fn test_reads_float_from_document() {
        let price: Price = serde_json::from_value(serde_json::json!(12.5)).unwrap();
        assert_eq!(price, Price::from_pence(1250));
    }

    #[test]
    fn test_sentinels_bound_all_prices() {
        let p = Price::from_pence(1);
        assert!(Price::MIN < p);
        assert!(p < Price::MAX);
    }
}
