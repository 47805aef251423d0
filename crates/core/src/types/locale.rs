//! Currency and country codes.
//!
//! Carts are created with a fixed currency/country pair and the enums name the
//! values the storefront sells in. Anything else the platform returns reads as
//! `Unknown` so foreign carts and addresses still decode.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    /// Any other currency.
    #[serde(other)]
    Unknown,
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::Unknown => "XXX",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// ISO 3166-1 alpha-2 country codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CountryCode {
    #[default]
    US,
    CA,
    GB,
    DE,
    AU,
    /// Any other country.
    #[serde(other)]
    Unknown,
}

impl CountryCode {
    /// The two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::US => "US",
            Self::CA => "CA",
            Self::GB => "GB",
            Self::DE => "DE",
            Self::AU => "AU",
            Self::Unknown => "ZZ",
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Country code outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported country code: {0}")]
pub struct UnknownCountry(pub String);

impl std::str::FromStr for CountryCode {
    type Err = UnknownCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::US),
            "CA" => Ok(Self::CA),
            "GB" => Ok(Self::GB),
            "DE" => Ok(Self::DE),
            "AU" => Ok(Self::AU),
            _ => Err(UnknownCountry(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usd_and_us() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::USD);
        assert_eq!(CountryCode::default(), CountryCode::US);
    }

    #[test]
    fn test_country_from_str() {
        assert_eq!("us".parse::<CountryCode>().unwrap(), CountryCode::US);
        assert_eq!(" GB ".parse::<CountryCode>().unwrap(), CountryCode::GB);
        assert!("XX".parse::<CountryCode>().is_err());
    }

    #[test]
    fn test_unlisted_codes_decode_as_unknown() {
        assert_eq!(
            serde_json::from_str::<CurrencyCode>("\"JPY\"").unwrap(),
            CurrencyCode::Unknown
        );
        assert_eq!(
            serde_json::from_str::<CountryCode>("\"FR\"").unwrap(),
            CountryCode::Unknown
        );
        assert_eq!(CurrencyCode::Unknown.to_string(), "XXX");
        assert!("FR".parse::<CountryCode>().is_err());
    }

    #[test]
    fn test_codes_serialize_as_plain_strings() {
        assert_eq!(
            serde_json::to_string(&CurrencyCode::USD).unwrap(),
            "\"USD\""
        );
        assert_eq!(
            serde_json::to_string(&CountryCode::US).unwrap(),
            "\"US\""
        );
    }
}
