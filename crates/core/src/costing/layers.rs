//! Consumption planning and merging over cost layers.
//!
//! A cost layer is a lot of inventory carrying a specific unit cost in minor
//! currency units. Consumption draws quantity out of layers in valuation
//! order; the weighted-average method instead spreads a draw across all
//! layers proportional to their remaining share, using the Largest Remainder
//! Method so the drawn quantities sum exactly to the request.

use uuid::Uuid;

use super::error::CostingError;

/// In-memory view of one active cost layer.
///
/// Callers supply layers in valuation order: creation ascending for FIFO,
/// descending for LIFO. Layers with zero remaining quantity are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerView {
    /// Row identifier, echoed back in draws so the caller can update rows.
    pub id: Uuid,
    /// Quantity still held by this layer.
    pub qty_remaining: i64,
    /// Cost per unit in minor currency units.
    pub unit_cost_minor: i64,
}

/// One layer's share of a planned consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDraw {
    /// The layer the quantity is drawn from.
    pub layer_id: Uuid,
    /// Quantity drawn (always positive).
    pub quantity: i64,
    /// Cost of the drawn quantity at the layer's unit cost.
    pub cost_minor: i64,
}

/// A fully planned consumption: per-layer draws plus the total cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionPlan {
    /// Draws to apply, in the order the layers were supplied.
    pub draws: Vec<LayerDraw>,
    /// Total cost of the consumed quantity in minor units.
    pub total_cost_minor: i64,
}

/// Result of collapsing all active layers into one blended layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedLayer {
    /// Sum of remaining quantities across the merged layers.
    pub quantity: i64,
    /// Floor of total value over total quantity.
    pub unit_cost_minor: i64,
}

/// Plans a consumption in the supplied layer order (FIFO or LIFO).
///
/// Walks the layers front to back, draining each before moving on.
///
/// # Errors
///
/// Returns `CostingError::InvalidQuantity` for a non-positive quantity and
/// `CostingError::InsufficientLayerQuantity` when the layers are exhausted
/// before the request is covered.
pub fn plan_sequential(layers: &[LayerView], quantity: i64) -> Result<ConsumptionPlan, CostingError> {
    if quantity <= 0 {
        return Err(CostingError::InvalidQuantity(quantity));
    }

    let mut draws = Vec::new();
    let mut left = quantity;

    for layer in layers {
        if left == 0 {
            break;
        }
        if layer.qty_remaining <= 0 {
            continue;
        }
        let drawn = layer.qty_remaining.min(left);
        draws.push(LayerDraw {
            layer_id: layer.id,
            quantity: drawn,
            cost_minor: drawn * layer.unit_cost_minor,
        });
        left -= drawn;
    }

    if left > 0 {
        return Err(CostingError::InsufficientLayerQuantity {
            requested: quantity,
            remaining: total_remaining(layers),
        });
    }

    Ok(finish_plan(draws))
}

/// Plans a weighted-average consumption across all supplied layers.
///
/// Each layer is allocated `quantity * share` using truncated integer
/// division; the rounding remainder is distributed as deterministic unit
/// adjustments, largest-remaining-layer-first (ties broken by supplied
/// order), until the draws sum exactly to the request.
///
/// # Errors
///
/// Returns `CostingError::InvalidQuantity` for a non-positive quantity,
/// `CostingError::InsufficientLayerQuantity` when the request exceeds the
/// total remaining (checked up front), and
/// `CostingError::AllocationMismatch` if the remainder cannot be reconciled
/// (unreachable for well-formed layers).
pub fn plan_weighted(layers: &[LayerView], quantity: i64) -> Result<ConsumptionPlan, CostingError> {
    if quantity <= 0 {
        return Err(CostingError::InvalidQuantity(quantity));
    }

    let total = total_remaining(layers);
    if quantity > total {
        return Err(CostingError::InsufficientLayerQuantity {
            requested: quantity,
            remaining: total,
        });
    }

    let active: Vec<&LayerView> = layers.iter().filter(|l| l.qty_remaining > 0).collect();

    // Truncated proportional allocation; i128 keeps the products exact.
    let mut quantities: Vec<i64> = active
        .iter()
        .map(|layer| {
            let share =
                i128::from(quantity) * i128::from(layer.qty_remaining) / i128::from(total);
            i64::try_from(share).unwrap_or(i64::MAX)
        })
        .collect();

    let mut remainder = quantity - quantities.iter().sum::<i64>();

    // Distribution order: largest remaining layer first, supplied order on ties.
    let mut order: Vec<usize> = (0..active.len()).collect();
    order.sort_by_key(|&i| (std::cmp::Reverse(active[i].qty_remaining), i));

    while remainder != 0 {
        let mut adjusted = false;
        for &i in &order {
            if remainder > 0 && quantities[i] < active[i].qty_remaining {
                quantities[i] += 1;
                remainder -= 1;
                adjusted = true;
            } else if remainder < 0 && quantities[i] > 0 {
                quantities[i] -= 1;
                remainder += 1;
                adjusted = true;
            }
            if remainder == 0 {
                break;
            }
        }
        if !adjusted {
            return Err(CostingError::AllocationMismatch {
                requested: quantity,
                allocated: quantity - remainder,
            });
        }
    }

    let draws = active
        .iter()
        .zip(&quantities)
        .filter(|&(_, &qty)| qty > 0)
        .map(|(layer, &qty)| LayerDraw {
            layer_id: layer.id,
            quantity: qty,
            cost_minor: qty * layer.unit_cost_minor,
        })
        .collect();

    Ok(finish_plan(draws))
}

/// Collapses all active layers into one blended layer.
///
/// Returns `None` when nothing remains to merge. The blended unit cost is
/// the floor of total value over total quantity.
#[must_use]
pub fn merge_layers(layers: &[LayerView]) -> Option<MergedLayer> {
    let quantity = total_remaining(layers);
    if quantity == 0 {
        return None;
    }

    let value: i128 = layers
        .iter()
        .filter(|l| l.qty_remaining > 0)
        .map(|l| i128::from(l.qty_remaining) * i128::from(l.unit_cost_minor))
        .sum();

    let unit_cost_minor = i64::try_from(value / i128::from(quantity)).unwrap_or(i64::MAX);

    Some(MergedLayer {
        quantity,
        unit_cost_minor,
    })
}

/// Current blended average unit cost across active layers, if any remain.
#[must_use]
pub fn blended_unit_cost(layers: &[LayerView]) -> Option<i64> {
    merge_layers(layers).map(|m| m.unit_cost_minor)
}

/// Truncated average unit cost over the first `quantity` units in the
/// supplied order (oldest units for FIFO ordering, newest for LIFO).
///
/// # Errors
///
/// Propagates the planning errors of [`plan_sequential`].
pub fn sequential_unit_cost(layers: &[LayerView], quantity: i64) -> Result<i64, CostingError> {
    let plan = plan_sequential(layers, quantity)?;
    Ok(plan.total_cost_minor / quantity)
}

fn total_remaining(layers: &[LayerView]) -> i64 {
    layers
        .iter()
        .filter(|l| l.qty_remaining > 0)
        .map(|l| l.qty_remaining)
        .sum()
}

fn finish_plan(draws: Vec<LayerDraw>) -> ConsumptionPlan {
    let total_cost_minor = draws.iter().map(|d| d.cost_minor).sum();
    ConsumptionPlan {
        draws,
        total_cost_minor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(qty: i64, cost: i64) -> LayerView {
        LayerView {
            id: Uuid::new_v4(),
            qty_remaining: qty,
            unit_cost_minor: cost,
        }
    }

    // ========================================================================
    // Sequential (FIFO / LIFO) consumption
    // ========================================================================

    #[test]
    fn test_fifo_consumes_oldest_first() {
        // Receive 10 @ $1.00 then 10 @ $2.00; ship 15 in FIFO order
        let layers = vec![layer(10, 100), layer(10, 200)];
        let plan = plan_sequential(&layers, 15).unwrap();

        assert_eq!(plan.total_cost_minor, 2000); // 10 x 100 + 5 x 200
        assert_eq!(plan.draws.len(), 2);
        assert_eq!(plan.draws[0].quantity, 10);
        assert_eq!(plan.draws[0].cost_minor, 1000);
        assert_eq!(plan.draws[1].quantity, 5);
        assert_eq!(plan.draws[1].cost_minor, 1000);
    }

    #[test]
    fn test_lifo_consumes_newest_first() {
        // Same receipts, LIFO order: the caller supplies newest first
        let layers = vec![layer(10, 200), layer(10, 100)];
        let plan = plan_sequential(&layers, 15).unwrap();

        assert_eq!(plan.total_cost_minor, 2500); // 10 x 200 + 5 x 100
        assert_eq!(plan.draws[0].quantity, 10);
        assert_eq!(plan.draws[1].quantity, 5);
    }

    #[test]
    fn test_sequential_skips_drained_layers() {
        let layers = vec![layer(0, 100), layer(10, 200)];
        let plan = plan_sequential(&layers, 4).unwrap();

        assert_eq!(plan.draws.len(), 1);
        assert_eq!(plan.draws[0].layer_id, layers[1].id);
        assert_eq!(plan.total_cost_minor, 800);
    }

    #[test]
    fn test_sequential_exhaustion_fails() {
        let layers = vec![layer(10, 100), layer(5, 200)];
        let result = plan_sequential(&layers, 16);

        assert_eq!(
            result,
            Err(CostingError::InsufficientLayerQuantity {
                requested: 16,
                remaining: 15,
            })
        );
    }

    #[test]
    fn test_sequential_rejects_non_positive() {
        let layers = vec![layer(10, 100)];
        assert!(matches!(
            plan_sequential(&layers, 0),
            Err(CostingError::InvalidQuantity(0))
        ));
        assert!(matches!(
            plan_sequential(&layers, -3),
            Err(CostingError::InvalidQuantity(-3))
        ));
    }

    // ========================================================================
    // Weighted-average consumption
    // ========================================================================

    #[test]
    fn test_weighted_single_merged_layer() {
        // WAC keys normally hold one merged layer; the draw is exact
        let layers = vec![layer(20, 200)];
        let plan = plan_weighted(&layers, 5).unwrap();

        assert_eq!(plan.total_cost_minor, 1000);
        assert_eq!(plan.draws.len(), 1);
        assert_eq!(plan.draws[0].quantity, 5);
    }

    #[test]
    fn test_weighted_proportional_allocation() {
        let layers = vec![layer(10, 100), layer(10, 300)];
        let plan = plan_weighted(&layers, 15).unwrap();

        // 15 * 10/20 = 7.5 truncated to 7 each; the one-unit remainder lands
        // on the first layer (equal remaining, supplied order breaks the tie)
        assert_eq!(plan.draws[0].quantity, 8);
        assert_eq!(plan.draws[1].quantity, 7);
        assert_eq!(plan.total_cost_minor, 8 * 100 + 7 * 300);
    }

    #[test]
    fn test_weighted_remainder_goes_to_largest_layer() {
        let layers = vec![layer(3, 100), layer(30, 200), layer(8, 300)];
        let plan = plan_weighted(&layers, 20).unwrap();

        let total: i64 = plan.draws.iter().map(|d| d.quantity).sum();
        assert_eq!(total, 20);

        // Truncated shares: 3*20/41=1, 30*20/41=14, 8*20/41=3 (sum 18);
        // the two remainder units land largest-layer-first: one on the
        // 30-unit layer, one on the 8-unit layer
        assert_eq!(plan.draws[0].quantity, 1);
        assert_eq!(plan.draws[1].quantity, 15);
        assert_eq!(plan.draws[2].quantity, 4);
    }

    #[test]
    fn test_weighted_insufficient_detected_up_front() {
        let layers = vec![layer(10, 100), layer(5, 200)];
        let result = plan_weighted(&layers, 16);

        assert_eq!(
            result,
            Err(CostingError::InsufficientLayerQuantity {
                requested: 16,
                remaining: 15,
            })
        );
    }

    #[test]
    fn test_weighted_draws_never_exceed_layer_remaining() {
        let layers = vec![layer(1, 100), layer(99, 200)];
        let plan = plan_weighted(&layers, 100).unwrap();

        for (draw, layer) in plan.draws.iter().zip(&layers) {
            assert!(draw.quantity <= layer.qty_remaining);
        }
        assert_eq!(plan.draws.iter().map(|d| d.quantity).sum::<i64>(), 100);
    }

    // ========================================================================
    // Merging
    // ========================================================================

    #[test]
    fn test_merge_blends_cost() {
        // Receive 10 @ $1.00 and 10 @ $3.00: one layer of 20 @ $2.00
        let layers = vec![layer(10, 100), layer(10, 300)];
        let merged = merge_layers(&layers).unwrap();

        assert_eq!(merged.quantity, 20);
        assert_eq!(merged.unit_cost_minor, 200);
    }

    #[test]
    fn test_merge_floors_blended_cost() {
        let layers = vec![layer(3, 100), layer(1, 101)];
        let merged = merge_layers(&layers).unwrap();

        // 401 / 4 = 100.25, floored
        assert_eq!(merged.quantity, 4);
        assert_eq!(merged.unit_cost_minor, 100);
    }

    #[test]
    fn test_merge_ignores_drained_layers() {
        let layers = vec![layer(0, 999), layer(10, 100)];
        let merged = merge_layers(&layers).unwrap();

        assert_eq!(merged.quantity, 10);
        assert_eq!(merged.unit_cost_minor, 100);
    }

    #[test]
    fn test_merge_empty_is_none() {
        assert_eq!(merge_layers(&[]), None);
        assert_eq!(merge_layers(&[layer(0, 100)]), None);
    }

    // ========================================================================
    // Transfer-cost previews
    // ========================================================================

    #[test]
    fn test_blended_unit_cost() {
        let layers = vec![layer(10, 100), layer(10, 300)];
        assert_eq!(blended_unit_cost(&layers), Some(200));
        assert_eq!(blended_unit_cost(&[]), None);
    }

    #[test]
    fn test_sequential_unit_cost_truncated_average() {
        let layers = vec![layer(10, 100), layer(10, 200)];
        // 15 units cost 2000; 2000 / 15 = 133 truncated
        assert_eq!(sequential_unit_cost(&layers, 15).unwrap(), 133);
        // Entirely inside the first layer the average is exact
        assert_eq!(sequential_unit_cost(&layers, 10).unwrap(), 100);
    }
}
