//! Property-based tests for stock state transitions.

use proptest::prelude::*;

use super::error::StockError;
use super::transition::transition;
use super::types::{ShipSource, StockAction, StockLevels};

/// Strategy for well-formed levels (0 <= reserved <= on_hand).
fn valid_levels() -> impl Strategy<Value = StockLevels> {
    (0i64..100_000).prop_flat_map(|on_hand| {
        (Just(on_hand), 0i64..=on_hand).prop_map(|(oh, r)| StockLevels::new(oh, r))
    })
}

fn any_action() -> impl Strategy<Value = StockAction> {
    prop_oneof![
        Just(StockAction::Receive),
        Just(StockAction::Ship),
        Just(StockAction::Adjust),
        Just(StockAction::Reserve),
        Just(StockAction::Unreserve),
        Just(StockAction::TransferOut),
        Just(StockAction::TransferIn),
    ]
}

fn any_source() -> impl Strategy<Value = Option<ShipSource>> {
    prop_oneof![
        Just(None),
        Just(Some(ShipSource::Reserved)),
        Just(Some(ShipSource::Available)),
        Just(Some(ShipSource::Default)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// *For any* well-formed levels and any action, a successful transition
    /// preserves the structural invariant 0 <= reserved <= on_hand, and
    /// available never goes observably negative.
    #[test]
    fn prop_transition_preserves_invariants(
        levels in valid_levels(),
        action in any_action(),
        quantity in -200_000i64..200_000,
        source in any_source(),
    ) {
        if let Ok(next) = transition(levels, action, quantity, source) {
            prop_assert!(next.reserved >= 0, "reserved must stay non-negative");
            prop_assert!(
                next.reserved <= next.on_hand,
                "reserved {} must not exceed on hand {}",
                next.reserved,
                next.on_hand
            );
            prop_assert!(next.on_hand >= 0, "on hand must stay non-negative");
            prop_assert!(next.available() >= 0, "available must stay non-negative");
        }
    }

    /// *For any* shipment that succeeds, on-hand drops by exactly the
    /// magnitude regardless of sourcing.
    #[test]
    fn prop_ship_reduces_on_hand_by_magnitude(
        levels in valid_levels(),
        quantity in 1i64..100_000,
        source in any_source(),
    ) {
        if let Ok(next) = transition(levels, StockAction::Ship, quantity, source) {
            prop_assert_eq!(next.on_hand, levels.on_hand - quantity);
        }
    }

    /// *For any* reserve that succeeds, an unreserve of the same quantity
    /// restores the original levels.
    #[test]
    fn prop_reserve_unreserve_round_trip(
        levels in valid_levels(),
        quantity in 1i64..100_000,
    ) {
        if let Ok(reserved) = transition(levels, StockAction::Reserve, quantity, None) {
            let restored = transition(reserved, StockAction::Unreserve, quantity, None).unwrap();
            prop_assert_eq!(restored, levels);
        }
    }

    /// *For any* default-sourced shipment, reserved stock is consumed before
    /// available stock.
    #[test]
    fn prop_default_ship_is_reserved_first(
        levels in valid_levels(),
        quantity in 1i64..100_000,
    ) {
        if let Ok(next) = transition(levels, StockAction::Ship, quantity, None) {
            let expected_reserved = levels.reserved - levels.reserved.min(quantity);
            prop_assert_eq!(next.reserved, expected_reserved);
        }
    }

    /// *For any* failed transition, the error is a typed domain error and
    /// carries the levels the check ran against.
    #[test]
    fn prop_shortage_reports_inputs(
        levels in valid_levels(),
        quantity in 1i64..100_000,
    ) {
        prop_assume!(quantity > levels.available());
        let result = transition(levels, StockAction::Reserve, quantity, None);
        prop_assert_eq!(
            result,
            Err(StockError::InsufficientStock {
                requested: quantity,
                available: levels.available(),
                on_hand: levels.on_hand,
                reserved: levels.reserved,
            })
        );
    }
}
