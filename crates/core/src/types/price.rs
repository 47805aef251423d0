//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::locale::CurrencyCode;

/// A price in major currency units (dollars, not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Convert an integer minor-unit amount into major units.
    ///
    /// Always divides by 100: every currency in [`CurrencyCode`] has two
    /// decimal places.
    #[must_use]
    pub fn from_cents(cent_amount: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(cent_amount, 2),
            currency_code,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_from_cents_divides_by_one_hundred() {
        let price = Price::from_cents(1999, CurrencyCode::USD);
        assert_eq!(price.amount, Decimal::from_str("19.99").unwrap_or_default());
        assert_eq!(price.to_string(), "$19.99");
    }

    #[test]
    fn test_from_cents_edges() {
        assert_eq!(Price::from_cents(0, CurrencyCode::USD).amount, Decimal::ZERO);
        assert_eq!(
            Price::from_cents(5, CurrencyCode::USD).amount,
            Decimal::new(5, 2)
        );
        assert_eq!(
            Price::from_cents(-250, CurrencyCode::EUR).to_string(),
            "€-2.50"
        );
        assert_eq!(
            Price::from_cents(i64::MAX, CurrencyCode::USD).amount,
            Decimal::new(i64::MAX, 2)
        );
    }
}
