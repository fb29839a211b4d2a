//! Property-based tests for currency conversion.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::convert::{minor_unit_factor, to_major_units, to_minor_units};

/// Strategy to generate supported currency codes.
fn currency_code() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("USD"),
        Just("EUR"),
        Just("GBP"),
        Just("SGD"),
        Just("IDR"),
        Just("JPY"),
        Just("KWD"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* non-negative minor amount and supported currency, converting
    /// to major units and back returns the original minor amount.
    #[test]
    fn prop_round_trip_from_minor(
        minor in 0i64..10_000_000_000i64,
        code in currency_code(),
    ) {
        let major = to_major_units(minor, code).unwrap();
        let back = to_minor_units(major, code).unwrap();
        prop_assert_eq!(back, minor, "round trip should be lossless for {}", code);
    }

    /// *For any* amount representable at the currency's precision, the
    /// round-trip law `to_major_units(to_minor_units(x)) == x` holds.
    #[test]
    fn prop_round_trip_from_major(
        units in 0i64..1_000_000_000i64,
        code in currency_code(),
    ) {
        let factor = minor_unit_factor(code).unwrap();
        let exponent = factor.ilog10();
        let amount = Decimal::new(units, exponent);

        let minor = to_minor_units(amount, code).unwrap();
        let back = to_major_units(minor, code).unwrap();
        prop_assert_eq!(back, amount);
    }

    /// *For any* inputs, conversion is deterministic.
    #[test]
    fn prop_conversion_is_deterministic(
        units in 0i64..1_000_000_000i64,
        code in currency_code(),
    ) {
        let factor = minor_unit_factor(code).unwrap();
        let exponent = factor.ilog10();
        let amount = Decimal::new(units, exponent);

        prop_assert_eq!(
            to_minor_units(amount, code).unwrap(),
            to_minor_units(amount, code).unwrap()
        );
    }

    /// *For any* negative amount, `to_minor_units` fails and never truncates
    /// toward zero silently.
    #[test]
    fn prop_negative_amounts_rejected(
        units in 1i64..1_000_000_000i64,
        code in currency_code(),
    ) {
        let amount = Decimal::new(-units, 2);
        prop_assert!(to_minor_units(amount, code).is_err());
    }
}
