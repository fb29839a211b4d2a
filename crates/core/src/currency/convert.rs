//! Currency conversion between major and minor units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Major-unit amounts are `rust_decimal::Decimal`; minor-unit amounts are
//! integers scaled by the currency's ISO 4217 exponent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during currency conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// The currency code is not recognized.
    #[error("Unknown currency: {0}")]
    Unknown(String),

    /// A negative amount was supplied where only non-negative amounts are valid.
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// The amount does not fit the minor-unit integer range.
    #[error("Amount out of range: {0}")]
    OutOfRange(Decimal),
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Singapore Dollar
    Sgd,
    /// Indonesian Rupiah
    Idr,
    /// Japanese Yen
    Jpy,
    /// Kuwaiti Dinar
    Kwd,
}

impl Currency {
    /// Returns the ISO 4217 exponent (number of minor-unit decimal places).
    #[must_use]
    pub const fn exponent(self) -> u32 {
        match self {
            Self::Usd | Self::Eur | Self::Gbp | Self::Sgd | Self::Idr => 2,
            Self::Jpy => 0,
            Self::Kwd => 3,
        }
    }

    /// Returns the minor-unit scaling factor, `10^exponent`.
    #[must_use]
    pub const fn factor(self) -> i64 {
        10i64.pow(self.exponent())
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
            Self::Sgd => write!(f, "SGD"),
            Self::Idr => write!(f, "IDR"),
            Self::Jpy => write!(f, "JPY"),
            Self::Kwd => write!(f, "KWD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "SGD" => Ok(Self::Sgd),
            "IDR" => Ok(Self::Idr),
            "JPY" => Ok(Self::Jpy),
            "KWD" => Ok(Self::Kwd),
            _ => Err(CurrencyError::Unknown(s.to_string())),
        }
    }
}

/// Returns the minor-unit scaling factor for a currency code.
///
/// # Errors
///
/// Returns `CurrencyError::Unknown` for unrecognized codes.
pub fn minor_unit_factor(code: &str) -> Result<i64, CurrencyError> {
    let currency: Currency = code.parse()?;
    Ok(currency.factor())
}

/// Converts a major-unit amount to integer minor units.
///
/// Rounds half-up to the nearest minor unit (`$1.005` becomes 101 cents).
///
/// # Errors
///
/// Returns `CurrencyError::Unknown` for unrecognized codes,
/// `CurrencyError::NegativeAmount` for negative amounts, and
/// `CurrencyError::OutOfRange` if the scaled amount does not fit `i64`.
pub fn to_minor_units(amount: Decimal, code: &str) -> Result<i64, CurrencyError> {
    let currency: Currency = code.parse()?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CurrencyError::NegativeAmount(amount));
    }

    let scaled = amount * Decimal::from(currency.factor());
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(CurrencyError::OutOfRange(amount))
}

/// Converts integer minor units to a major-unit amount quantized to the
/// currency's precision.
///
/// # Errors
///
/// Returns `CurrencyError::Unknown` for unrecognized codes.
pub fn to_major_units(minor: i64, code: &str) -> Result<Decimal, CurrencyError> {
    let currency: Currency = code.parse()?;
    Ok(Decimal::new(minor, currency.exponent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case("USD", 100)]
    #[case("usd", 100)]
    #[case("EUR", 100)]
    #[case("JPY", 1)]
    #[case("KWD", 1000)]
    fn test_minor_unit_factor(#[case] code: &str, #[case] factor: i64) {
        assert_eq!(minor_unit_factor(code).unwrap(), factor);
    }

    #[test]
    fn test_minor_unit_factor_unknown() {
        assert!(matches!(
            minor_unit_factor("XXX"),
            Err(CurrencyError::Unknown(_))
        ));
        assert!(matches!(minor_unit_factor(""), Err(CurrencyError::Unknown(_))));
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(dec!(1.00), "USD").unwrap(), 100);
        assert_eq!(to_minor_units(dec!(12.34), "USD").unwrap(), 1234);
        assert_eq!(to_minor_units(dec!(0), "USD").unwrap(), 0);
        assert_eq!(to_minor_units(dec!(500), "JPY").unwrap(), 500);
        assert_eq!(to_minor_units(dec!(1.234), "KWD").unwrap(), 1234);
    }

    #[test]
    fn test_to_minor_units_rounds_half_up() {
        // Half-up, not banker's: 0.005 USD is 1 cent, 0.015 USD is 2 cents
        assert_eq!(to_minor_units(dec!(0.005), "USD").unwrap(), 1);
        assert_eq!(to_minor_units(dec!(0.015), "USD").unwrap(), 2);
        assert_eq!(to_minor_units(dec!(0.004), "USD").unwrap(), 0);
        assert_eq!(to_minor_units(dec!(1.5), "JPY").unwrap(), 2);
    }

    #[test]
    fn test_to_minor_units_rejects_negative() {
        assert!(matches!(
            to_minor_units(dec!(-0.01), "USD"),
            Err(CurrencyError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_to_major_units() {
        assert_eq!(to_major_units(100, "USD").unwrap(), dec!(1.00));
        assert_eq!(to_major_units(1234, "USD").unwrap(), dec!(12.34));
        assert_eq!(to_major_units(500, "JPY").unwrap(), dec!(500));
        assert_eq!(to_major_units(1234, "KWD").unwrap(), dec!(1.234));
    }

    #[test]
    fn test_round_trip() {
        // to_major_units(to_minor_units(x)) == x for x representable at the
        // currency's precision
        for amount in [dec!(0), dec!(0.01), dec!(12.34), dec!(99999.99)] {
            let minor = to_minor_units(amount, "USD").unwrap();
            assert_eq!(to_major_units(minor, "USD").unwrap(), amount);
        }

        let minor = to_minor_units(dec!(1.234), "KWD").unwrap();
        assert_eq!(to_major_units(minor, "KWD").unwrap(), dec!(1.234));
    }

    #[test]
    fn test_currency_display_and_from_str() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Kwd.to_string(), "KWD");
        assert_eq!(Currency::from_str("eur").unwrap(), Currency::Eur);
        assert!(Currency::from_str("ZZZ").is_err());
    }
}
