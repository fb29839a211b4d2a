//! Cost layer tracking inside a stock transaction.
//!
//! Layers are loaded in valuation order under the same row locks as the
//! state update, planned in pure code (`stockbook_core::costing`), and the
//! resulting draws or merges are applied as row updates on the caller's
//! database transaction.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use stockbook_core::costing::{
    self, blended_unit_cost, merge_layers, plan_sequential, plan_weighted, CostingError, LayerView,
};
use stockbook_core::stock::StockLevels;

use crate::entities::{cost_layers, sea_orm_active_enums::ValuationMethod};

use super::error::TransactionError;

/// Context for enriching layer shortages into caller-facing errors.
#[derive(Debug, Clone)]
pub(crate) struct ShortageContext {
    pub sku: String,
    pub location: String,
    pub levels: StockLevels,
}

/// Loads the active layers for a key in valuation order, locked for the
/// remainder of the transaction.
pub(crate) async fn load_layers_for_update(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    sku_id: Uuid,
    location_id: Uuid,
    method: ValuationMethod,
) -> Result<Vec<cost_layers::Model>, TransactionError> {
    let query = cost_layers::Entity::find()
        .filter(cost_layers::Column::OrganizationId.eq(organization_id))
        .filter(cost_layers::Column::SkuId.eq(sku_id))
        .filter(cost_layers::Column::LocationId.eq(location_id))
        .filter(cost_layers::Column::QtyRemaining.gt(0));

    let query = match method {
        ValuationMethod::Fifo | ValuationMethod::Wac => query
            .order_by_asc(cost_layers::Column::CreatedAt)
            .order_by_asc(cost_layers::Column::Id),
        ValuationMethod::Lifo => query
            .order_by_desc(cost_layers::Column::CreatedAt)
            .order_by_desc(cost_layers::Column::Id),
    };

    Ok(query.lock_exclusive().all(txn).await?)
}

fn views(layers: &[cost_layers::Model]) -> Vec<LayerView> {
    layers
        .iter()
        .map(|l| LayerView {
            id: l.id,
            qty_remaining: l.qty_remaining,
            unit_cost_minor: l.unit_cost_minor,
        })
        .collect()
}

/// Records the cost basis of an inbound transaction.
///
/// Inserts a layer with `qty_in = qty_remaining = quantity`. For WAC
/// organizations the incoming receipt is immediately merged with every
/// active layer for the key: the absorbed rows are drained to zero and one
/// blended layer (floored unit cost) is inserted in their place, referencing
/// the receiving transaction.
pub(crate) async fn record_cost(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    method: ValuationMethod,
    sku_id: Uuid,
    location_id: Uuid,
    transaction_id: Uuid,
    quantity: i64,
    unit_cost_minor: i64,
) -> Result<(), TransactionError> {
    let now = chrono::Utc::now().into();

    if method == ValuationMethod::Wac {
        let existing =
            load_layers_for_update(txn, organization_id, sku_id, location_id, method).await?;

        let mut incoming = views(&existing);
        incoming.push(LayerView {
            id: Uuid::nil(),
            qty_remaining: quantity,
            unit_cost_minor,
        });

        let merged = merge_layers(&incoming).ok_or_else(|| {
            TransactionError::Invariant(format!(
                "WAC merge produced no layer for quantity {quantity}"
            ))
        })?;

        for layer in existing {
            let mut active: cost_layers::ActiveModel = layer.into();
            active.qty_remaining = Set(0);
            active.update(txn).await?;
        }

        let blended = cost_layers::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            sku_id: Set(sku_id),
            location_id: Set(location_id),
            transaction_id: Set(transaction_id),
            qty_in: Set(merged.quantity),
            qty_remaining: Set(merged.quantity),
            unit_cost_minor: Set(merged.unit_cost_minor),
            created_at: Set(now),
        };
        blended.insert(txn).await?;

        return Ok(());
    }

    let layer = cost_layers::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        sku_id: Set(sku_id),
        location_id: Set(location_id),
        transaction_id: Set(transaction_id),
        qty_in: Set(quantity),
        qty_remaining: Set(quantity),
        unit_cost_minor: Set(unit_cost_minor),
        created_at: Set(now),
    };
    layer.insert(txn).await?;

    Ok(())
}

/// Consumes cost layers for an outbound transaction and returns the total
/// cost of the consumed quantity.
///
/// Returns `Ok(None)` when the key has no active layers at all, i.e. cost
/// tracking is not in use for this stock. Partial coverage is an error: the
/// quantity rule treats layered and un-layered goods as one pool only when
/// no layer exists.
pub(crate) async fn consume_cost(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    method: ValuationMethod,
    sku_id: Uuid,
    location_id: Uuid,
    quantity: i64,
    ctx: &ShortageContext,
) -> Result<Option<i64>, TransactionError> {
    let layers = load_layers_for_update(txn, organization_id, sku_id, location_id, method).await?;
    if layers.is_empty() {
        return Ok(None);
    }

    let layer_views = views(&layers);
    let plan = match method {
        ValuationMethod::Fifo | ValuationMethod::Lifo => plan_sequential(&layer_views, quantity),
        ValuationMethod::Wac => plan_weighted(&layer_views, quantity),
    }
    .map_err(|err| map_costing_error(err, ctx))?;

    for draw in &plan.draws {
        let layer = layers
            .iter()
            .find(|l| l.id == draw.layer_id)
            .ok_or_else(|| {
                TransactionError::Invariant(format!(
                    "consumption plan references unknown layer {}",
                    draw.layer_id
                ))
            })?;

        let mut active: cost_layers::ActiveModel = layer.clone().into();
        active.qty_remaining = Set(layer.qty_remaining - draw.quantity);
        active.update(txn).await?;
    }

    Ok(Some(plan.total_cost_minor))
}

/// Non-mutating per-unit cost preview for a transfer.
///
/// WAC returns the current blended average; FIFO and LIFO the truncated
/// average cost over the oldest or newest `quantity` units. `Ok(None)` when
/// the key carries no cost basis.
pub(crate) async fn preview_unit_cost(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    method: ValuationMethod,
    sku_id: Uuid,
    location_id: Uuid,
    quantity: i64,
    ctx: &ShortageContext,
) -> Result<Option<i64>, TransactionError> {
    let query = cost_layers::Entity::find()
        .filter(cost_layers::Column::OrganizationId.eq(organization_id))
        .filter(cost_layers::Column::SkuId.eq(sku_id))
        .filter(cost_layers::Column::LocationId.eq(location_id))
        .filter(cost_layers::Column::QtyRemaining.gt(0));

    let query = match method {
        ValuationMethod::Fifo | ValuationMethod::Wac => query
            .order_by_asc(cost_layers::Column::CreatedAt)
            .order_by_asc(cost_layers::Column::Id),
        ValuationMethod::Lifo => query
            .order_by_desc(cost_layers::Column::CreatedAt)
            .order_by_desc(cost_layers::Column::Id),
    };

    let layers = query.all(txn).await?;
    if layers.is_empty() {
        return Ok(None);
    }

    let layer_views = views(&layers);
    match method {
        ValuationMethod::Wac => Ok(blended_unit_cost(&layer_views)),
        ValuationMethod::Fifo | ValuationMethod::Lifo => {
            costing::sequential_unit_cost(&layer_views, quantity)
                .map(Some)
                .map_err(|err| map_costing_error(err, ctx))
        }
    }
}

fn map_costing_error(err: CostingError, ctx: &ShortageContext) -> TransactionError {
    match err {
        CostingError::InsufficientLayerQuantity { requested, .. } => {
            TransactionError::InsufficientStock {
                sku: ctx.sku.clone(),
                location: ctx.location.clone(),
                requested,
                available: ctx.levels.available(),
                on_hand: ctx.levels.on_hand,
                reserved: ctx.levels.reserved,
            }
        }
        CostingError::InvalidQuantity(qty) => {
            TransactionError::BadRequest(format!("invalid consumption quantity {qty}"))
        }
        CostingError::AllocationMismatch { .. } => TransactionError::Invariant(err.to_string()),
    }
}
