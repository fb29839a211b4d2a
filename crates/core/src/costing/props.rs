//! Property-based tests for cost layer planning.

use proptest::prelude::*;
use uuid::Uuid;

use super::layers::{merge_layers, plan_sequential, plan_weighted, LayerView};

/// Strategy for a set of active layers (1..8 layers, realistic sizes).
fn layers_strategy() -> impl Strategy<Value = Vec<LayerView>> {
    prop::collection::vec((1i64..5_000, 1i64..100_000), 1..8).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(qty, cost)| LayerView {
                id: Uuid::new_v4(),
                qty_remaining: qty,
                unit_cost_minor: cost,
            })
            .collect()
    })
}

fn total_remaining(layers: &[LayerView]) -> i64 {
    layers.iter().map(|l| l.qty_remaining).sum()
}

fn total_value(layers: &[LayerView]) -> i128 {
    layers
        .iter()
        .map(|l| i128::from(l.qty_remaining) * i128::from(l.unit_cost_minor))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* layers and any coverable quantity, a sequential plan draws
    /// exactly the requested quantity and each draw stays within its layer.
    #[test]
    fn prop_sequential_plan_is_exact(
        layers in layers_strategy(),
        fraction in 1u32..=100,
    ) {
        let total = total_remaining(&layers);
        let quantity = (total * i64::from(fraction) / 100).max(1);

        let plan = plan_sequential(&layers, quantity).unwrap();

        prop_assert_eq!(plan.draws.iter().map(|d| d.quantity).sum::<i64>(), quantity);
        for (draw, layer) in plan.draws.iter().zip(layers.iter()) {
            prop_assert!(draw.quantity <= layer.qty_remaining);
            prop_assert_eq!(draw.cost_minor, draw.quantity * layer.unit_cost_minor);
        }
        prop_assert_eq!(
            plan.total_cost_minor,
            plan.draws.iter().map(|d| d.cost_minor).sum::<i64>()
        );
    }

    /// *For any* layers and any coverable quantity, the weighted plan also
    /// draws exactly the requested quantity — the rounding remainder is fully
    /// reconciled, never lost or double-counted.
    #[test]
    fn prop_weighted_plan_is_exact(
        layers in layers_strategy(),
        fraction in 1u32..=100,
    ) {
        let total = total_remaining(&layers);
        let quantity = (total * i64::from(fraction) / 100).max(1);

        let plan = plan_weighted(&layers, quantity).unwrap();

        prop_assert_eq!(plan.draws.iter().map(|d| d.quantity).sum::<i64>(), quantity);
        for draw in &plan.draws {
            let layer = layers.iter().find(|l| l.id == draw.layer_id).unwrap();
            prop_assert!(draw.quantity >= 1);
            prop_assert!(draw.quantity <= layer.qty_remaining);
        }
    }

    /// *For any* layers, consuming everything sequentially charges exactly
    /// the total layer value: cost is moved, never created or destroyed.
    #[test]
    fn prop_full_consumption_moves_all_value(layers in layers_strategy()) {
        let total = total_remaining(&layers);
        let plan = plan_sequential(&layers, total).unwrap();

        prop_assert_eq!(i128::from(plan.total_cost_minor), total_value(&layers));
    }

    /// *For any* layers, requesting more than the total remaining fails for
    /// both strategies.
    #[test]
    fn prop_over_consumption_fails(layers in layers_strategy()) {
        let total = total_remaining(&layers);

        prop_assert!(plan_sequential(&layers, total + 1).is_err());
        prop_assert!(plan_weighted(&layers, total + 1).is_err());
    }

    /// *For any* layers, the merged layer preserves quantity and floors the
    /// blended value: merged value never exceeds the original total, and the
    /// rounding loss is bounded by quantity - 1 minor units.
    #[test]
    fn prop_merge_preserves_quantity_and_bounds_value(layers in layers_strategy()) {
        let merged = merge_layers(&layers).unwrap();
        let total = total_remaining(&layers);
        let value = total_value(&layers);

        prop_assert_eq!(merged.quantity, total);

        let merged_value = i128::from(merged.quantity) * i128::from(merged.unit_cost_minor);
        prop_assert!(merged_value <= value);
        prop_assert!(value - merged_value < i128::from(total));
    }
}
