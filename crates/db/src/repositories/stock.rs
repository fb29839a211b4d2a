//! Stock transaction orchestrator.
//!
//! `StockRepository` is the entry point for applying stock movements. Each
//! movement runs inside one database transaction: catalog provisioning,
//! state-row locking, ledger append, state transition, and cost tracking
//! either all commit or all roll back. Transfers compose two movements
//! inside a single transaction so the cost basis moves atomically.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::currency::to_minor_units;
use stockbook_core::stock::{transition, ShipSource, StockAction, StockError, StockLevels};
use stockbook_shared::Metadata;

use crate::entities::{
    cost_layers, locations, organizations, skus, stock_states, stock_transactions,
};

use super::catalog::{ensure_location, ensure_sku, map_unique_violation};
use super::cost_layer::{self, ShortageContext};
use super::error::TransactionError;

/// Input for applying a single stock movement.
#[derive(Debug, Clone)]
pub struct StockMovementInput {
    /// Tenant the movement belongs to.
    pub organization_id: Uuid,
    /// The stock action to apply.
    pub action: StockAction,
    /// SKU code; auto-provisioned for inbound actions.
    pub sku_code: String,
    /// Display name used when auto-provisioning the SKU.
    pub sku_name: Option<String>,
    /// Location name; upserted within the tenant.
    pub location: String,
    /// Quantity: positive magnitude for every action except `Adjust`,
    /// which is signed.
    pub quantity: i64,
    /// Optional unit cost in major currency units.
    pub unit_cost: Option<Decimal>,
    /// Which pool a shipment draws from; `Default` when omitted.
    pub ship_from: Option<ShipSource>,
    /// Free-form reason; required for adjustments.
    pub reason: Option<String>,
    /// Open metadata map stored on the ledger row.
    pub metadata: Metadata,
    /// Who performed the movement.
    pub actor: String,
}

/// Input for an atomic cross-location transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Tenant the transfer belongs to.
    pub organization_id: Uuid,
    /// SKU code; must already exist.
    pub sku_code: String,
    /// Source location name; must hold inventory.
    pub from_location: String,
    /// Target location name; auto-created when missing.
    pub to_location: String,
    /// Quantity to move (positive).
    pub quantity: i64,
    /// Open metadata map stored on both legs.
    pub metadata: Metadata,
    /// Who performed the transfer.
    pub actor: String,
}

/// Result of a successfully applied movement.
///
/// `available_before` and `available_after` are the side channel a
/// collaborator uses to evaluate reorder-threshold crossings; the engine
/// itself never sends notifications.
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    /// The appended ledger row.
    pub transaction: stock_transactions::Model,
    /// The state row after mutation.
    pub state: stock_states::Model,
    /// Available quantity before the movement.
    pub available_before: i64,
    /// Available quantity after the movement.
    pub available_after: i64,
}

/// Result of a successfully applied transfer.
#[derive(Debug, Clone)]
pub struct AppliedTransfer {
    /// The `transfer_out` leg at the source.
    pub outbound: AppliedTransaction,
    /// The `transfer_in` leg at the target.
    pub inbound: AppliedTransaction,
    /// Unit cost carried from source to target, when a cost basis exists.
    pub unit_cost_minor: Option<i64>,
}

/// Filter options for listing ledger transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by action.
    pub action: Option<StockAction>,
    /// Filter by SKU code.
    pub sku_code: Option<String>,
    /// Filter by location name.
    pub location: Option<String>,
    /// Filter by creation time range start.
    pub from: Option<DateTime<Utc>>,
    /// Filter by creation time range end.
    pub to: Option<DateTime<Utc>>,
}

/// One location's share of a SKU's cost valuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationLine {
    /// Location holding the layers.
    pub location_id: Uuid,
    /// Total remaining quantity across active layers.
    pub qty_remaining: i64,
    /// Total remaining value (quantity times unit cost) in minor units.
    pub value_minor: i64,
}

/// Stock transaction orchestrator.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a single stock movement atomically.
    ///
    /// Sequence: currency conversion, SKU/location provisioning, state-row
    /// lock, ledger append (with the pre-mutation on-hand snapshot), state
    /// transition, cost tracking, state update. Any failure rolls the whole
    /// unit of work back.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` on any domain rule violation; see the
    /// error type for the taxonomy. `ConcurrentModification` is retryable.
    pub async fn apply_transaction(
        &self,
        input: StockMovementInput,
    ) -> Result<AppliedTransaction, TransactionError> {
        if matches!(
            input.action,
            StockAction::TransferOut | StockAction::TransferIn
        ) {
            return Err(TransactionError::InvalidAction(format!(
                "{} is applied via apply_transfer",
                input.action
            )));
        }

        let txn = self.db.begin().await?;
        let applied = Self::apply_in_txn(&txn, input, None).await?;
        txn.commit().await?;

        Ok(applied)
    }

    /// Applies an atomic cross-location transfer.
    ///
    /// The SKU must already exist; the target location may be auto-created.
    /// The outbound leg performs the real cost consumption and the inbound
    /// leg carries the resulting unit cost forward explicitly, so the cost
    /// basis moves with the goods. Both legs share one database transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` if either leg fails; nothing is applied
    /// in that case.
    pub async fn apply_transfer(
        &self,
        input: TransferInput,
    ) -> Result<AppliedTransfer, TransactionError> {
        if input.quantity <= 0 {
            return Err(TransactionError::BadRequest(format!(
                "transfer quantity must be positive, got {}",
                input.quantity
            )));
        }
        if input.from_location == input.to_location {
            return Err(TransactionError::BadRequest(
                "transfer requires two distinct locations".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let org = organizations::Entity::find_by_id(input.organization_id)
            .one(&txn)
            .await?
            .ok_or(TransactionError::OrganizationNotFound(
                input.organization_id,
            ))?;

        // Transfers never create catalog entries at the source.
        let sku = skus::Entity::find()
            .filter(skus::Column::OrganizationId.eq(org.id))
            .filter(skus::Column::Code.eq(input.sku_code.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| TransactionError::SkuNotFound(input.sku_code.clone()))?;

        let source = locations::Entity::find()
            .filter(locations::Column::OrganizationId.eq(org.id))
            .filter(locations::Column::Name.eq(input.from_location.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                TransactionError::BadRequest(format!(
                    "no inventory for {} at {}",
                    input.sku_code, input.from_location
                ))
            })?;

        let source_state = stock_states::Entity::find()
            .filter(stock_states::Column::OrganizationId.eq(org.id))
            .filter(stock_states::Column::SkuId.eq(sku.id))
            .filter(stock_states::Column::LocationId.eq(source.id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                TransactionError::BadRequest(format!(
                    "no inventory for {} at {}",
                    input.sku_code, input.from_location
                ))
            })?;

        // Pre-validation preview only; the outbound leg below performs the
        // real consumption.
        let ctx = ShortageContext {
            sku: input.sku_code.clone(),
            location: input.from_location.clone(),
            levels: StockLevels::new(source_state.on_hand, source_state.reserved),
        };
        let preview = cost_layer::preview_unit_cost(
            &txn,
            org.id,
            org.valuation_method,
            sku.id,
            source.id,
            input.quantity,
            &ctx,
        )
        .await?;

        tracing::debug!(
            sku = %input.sku_code,
            from = %input.from_location,
            to = %input.to_location,
            quantity = input.quantity,
            preview_unit_cost = ?preview,
            "starting transfer"
        );

        let mut out_meta = input.metadata.clone();
        out_meta.insert("transfer_to", input.to_location.clone());

        let mut outbound = Self::apply_in_txn(
            &txn,
            StockMovementInput {
                organization_id: input.organization_id,
                action: StockAction::TransferOut,
                sku_code: input.sku_code.clone(),
                sku_name: None,
                location: input.from_location.clone(),
                quantity: input.quantity,
                unit_cost: None,
                ship_from: None,
                reason: None,
                metadata: out_meta,
                actor: input.actor.clone(),
            },
            None,
        )
        .await?;

        // The unit cost actually moved, derived from the consumed total.
        let unit_cost_minor = outbound
            .transaction
            .total_cost_minor
            .map(|total| total / input.quantity);

        if let Some(unit_cost) = unit_cost_minor {
            let mut meta = match outbound.transaction.metadata.clone() {
                serde_json::Value::Object(map) => Metadata::from(map),
                _ => Metadata::new(),
            };
            meta.insert("transfer_unit_cost_minor", unit_cost);

            let mut active: stock_transactions::ActiveModel = outbound.transaction.clone().into();
            active.metadata = Set(meta.into_value());
            outbound.transaction = active.update(&txn).await?;
        }

        let mut in_meta = input.metadata.clone();
        in_meta.insert("transfer_from", input.from_location.clone());
        if let Some(unit_cost) = unit_cost_minor {
            in_meta.insert("transfer_unit_cost_minor", unit_cost);
        }

        let inbound = Self::apply_in_txn(
            &txn,
            StockMovementInput {
                organization_id: input.organization_id,
                action: StockAction::TransferIn,
                sku_code: input.sku_code.clone(),
                sku_name: None,
                location: input.to_location.clone(),
                quantity: input.quantity,
                unit_cost: None,
                ship_from: None,
                reason: None,
                metadata: in_meta,
                actor: input.actor.clone(),
            },
            unit_cost_minor,
        )
        .await?;

        txn.commit().await?;

        Ok(AppliedTransfer {
            outbound,
            inbound,
            unit_cost_minor,
        })
    }

    /// Non-mutating per-unit cost preview for a prospective transfer.
    ///
    /// # Errors
    ///
    /// Returns `SkuNotFound` for an unknown SKU and `BadRequest` when the
    /// location holds no inventory.
    pub async fn transfer_cost_preview(
        &self,
        organization_id: Uuid,
        sku_code: &str,
        location: &str,
        quantity: i64,
    ) -> Result<Option<i64>, TransactionError> {
        if quantity <= 0 {
            return Err(TransactionError::BadRequest(format!(
                "transfer quantity must be positive, got {quantity}"
            )));
        }

        let txn = self.db.begin().await?;

        let org = organizations::Entity::find_by_id(organization_id)
            .one(&txn)
            .await?
            .ok_or(TransactionError::OrganizationNotFound(organization_id))?;

        let sku = skus::Entity::find()
            .filter(skus::Column::OrganizationId.eq(org.id))
            .filter(skus::Column::Code.eq(sku_code))
            .one(&txn)
            .await?
            .ok_or_else(|| TransactionError::SkuNotFound(sku_code.to_string()))?;

        let loc = locations::Entity::find()
            .filter(locations::Column::OrganizationId.eq(org.id))
            .filter(locations::Column::Name.eq(location))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                TransactionError::BadRequest(format!(
                    "no inventory for {sku_code} at {location}"
                ))
            })?;

        let state = stock_states::Entity::find()
            .filter(stock_states::Column::OrganizationId.eq(org.id))
            .filter(stock_states::Column::SkuId.eq(sku.id))
            .filter(stock_states::Column::LocationId.eq(loc.id))
            .one(&txn)
            .await?;

        let levels = state.map_or_else(StockLevels::default, |s| {
            StockLevels::new(s.on_hand, s.reserved)
        });

        let ctx = ShortageContext {
            sku: sku_code.to_string(),
            location: location.to_string(),
            levels,
        };
        let preview = cost_layer::preview_unit_cost(
            &txn,
            org.id,
            org.valuation_method,
            sku.id,
            loc.id,
            quantity,
            &ctx,
        )
        .await?;

        txn.commit().await?;
        Ok(preview)
    }

    /// Gets the current state row for a (SKU, location) key, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_state(
        &self,
        organization_id: Uuid,
        sku_code: &str,
        location: &str,
    ) -> Result<Option<stock_states::Model>, TransactionError> {
        let Some(sku) = skus::Entity::find()
            .filter(skus::Column::OrganizationId.eq(organization_id))
            .filter(skus::Column::Code.eq(sku_code))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(loc) = locations::Entity::find()
            .filter(locations::Column::OrganizationId.eq(organization_id))
            .filter(locations::Column::Name.eq(location))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(stock_states::Entity::find()
            .filter(stock_states::Column::OrganizationId.eq(organization_id))
            .filter(stock_states::Column::SkuId.eq(sku.id))
            .filter(stock_states::Column::LocationId.eq(loc.id))
            .one(&self.db)
            .await?)
    }

    /// Lists ledger transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        organization_id: Uuid,
        filter: TransactionFilter,
    ) -> Result<Vec<stock_transactions::Model>, TransactionError> {
        let mut query = stock_transactions::Entity::find()
            .filter(stock_transactions::Column::OrganizationId.eq(organization_id));

        if let Some(action) = filter.action {
            let db_action: crate::entities::sea_orm_active_enums::StockAction = action.into();
            query = query.filter(stock_transactions::Column::Action.eq(db_action));
        }

        if let Some(code) = filter.sku_code {
            let Some(sku) = skus::Entity::find()
                .filter(skus::Column::OrganizationId.eq(organization_id))
                .filter(skus::Column::Code.eq(code))
                .one(&self.db)
                .await?
            else {
                return Ok(Vec::new());
            };
            query = query.filter(stock_transactions::Column::SkuId.eq(sku.id));
        }

        if let Some(name) = filter.location {
            let Some(loc) = locations::Entity::find()
                .filter(locations::Column::OrganizationId.eq(organization_id))
                .filter(locations::Column::Name.eq(name))
                .one(&self.db)
                .await?
            else {
                return Ok(Vec::new());
            };
            query = query.filter(stock_transactions::Column::LocationId.eq(loc.id));
        }

        if let Some(from) = filter.from {
            query = query.filter(stock_transactions::Column::CreatedAt.gte(from));
        }

        if let Some(to) = filter.to {
            query = query.filter(stock_transactions::Column::CreatedAt.lte(to));
        }

        Ok(query
            .order_by_desc(stock_transactions::Column::CreatedAt)
            .order_by_desc(stock_transactions::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Sums the remaining cost value of a SKU per location.
    ///
    /// # Errors
    ///
    /// Returns `SkuNotFound` for an unknown SKU.
    pub async fn stock_valuation(
        &self,
        organization_id: Uuid,
        sku_code: &str,
    ) -> Result<Vec<ValuationLine>, TransactionError> {
        let sku = skus::Entity::find()
            .filter(skus::Column::OrganizationId.eq(organization_id))
            .filter(skus::Column::Code.eq(sku_code))
            .one(&self.db)
            .await?
            .ok_or_else(|| TransactionError::SkuNotFound(sku_code.to_string()))?;

        let layers = cost_layers::Entity::find()
            .filter(cost_layers::Column::OrganizationId.eq(organization_id))
            .filter(cost_layers::Column::SkuId.eq(sku.id))
            .filter(cost_layers::Column::QtyRemaining.gt(0))
            .order_by_asc(cost_layers::Column::LocationId)
            .all(&self.db)
            .await?;

        let mut lines: Vec<ValuationLine> = Vec::new();
        for layer in layers {
            let value = layer.qty_remaining * layer.unit_cost_minor;
            match lines.last_mut() {
                Some(line) if line.location_id == layer.location_id => {
                    line.qty_remaining += layer.qty_remaining;
                    line.value_minor += value;
                }
                _ => lines.push(ValuationLine {
                    location_id: layer.location_id,
                    qty_remaining: layer.qty_remaining,
                    value_minor: value,
                }),
            }
        }

        Ok(lines)
    }

    /// Applies one movement on the caller's transaction.
    ///
    /// `explicit_unit_cost_minor` overrides major-unit cost inference; the
    /// inbound transfer leg uses it to carry the source cost basis forward.
    async fn apply_in_txn(
        txn: &DatabaseTransaction,
        input: StockMovementInput,
        explicit_unit_cost_minor: Option<i64>,
    ) -> Result<AppliedTransaction, TransactionError> {
        validate_input(&input)?;

        let org = organizations::Entity::find_by_id(input.organization_id)
            .one(txn)
            .await?
            .ok_or(TransactionError::OrganizationNotFound(
                input.organization_id,
            ))?;

        let unit_cost_minor = match explicit_unit_cost_minor {
            Some(minor) => Some(minor),
            None => input
                .unit_cost
                .map(|cost| to_minor_units(cost, &org.currency))
                .transpose()?,
        };

        let sku = ensure_sku(
            txn,
            org.id,
            &input.sku_code,
            input.sku_name.as_deref(),
            input.action.is_inbound(),
        )
        .await?;

        let location = ensure_location(txn, org.id, &input.location).await?;

        // Lock the state row for the remainder of the transaction. A second
        // writer for the same key blocks here until we commit.
        let existing = stock_states::Entity::find()
            .filter(stock_states::Column::OrganizationId.eq(org.id))
            .filter(stock_states::Column::SkuId.eq(sku.id))
            .filter(stock_states::Column::LocationId.eq(location.id))
            .lock_exclusive()
            .one(txn)
            .await?;

        let now = chrono::Utc::now().into();
        let state = match existing {
            Some(state) => state,
            None if input.action.is_inbound() => {
                let fresh = stock_states::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(org.id),
                    sku_id: Set(sku.id),
                    location_id: Set(location.id),
                    on_hand: Set(0),
                    reserved: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                fresh.insert(txn).await.map_err(map_unique_violation)?
            }
            None => {
                return Err(TransactionError::BadRequest(format!(
                    "no inventory for {} at {}",
                    input.sku_code, input.location
                )));
            }
        };

        let before = StockLevels::new(state.on_hand, state.reserved);

        // Outbound actions are stored negative in the ledger.
        let ledger_qty = match input.action {
            StockAction::Ship | StockAction::TransferOut => -input.quantity.abs(),
            _ => input.quantity,
        };

        // Net effect on on-hand; reservations move quantity between pools
        // without changing it.
        let net = match input.action {
            StockAction::Reserve | StockAction::Unreserve => 0,
            _ => ledger_qty,
        };

        let inbound_total = match (net > 0, unit_cost_minor) {
            (true, Some(unit_cost)) => Some(net * unit_cost),
            _ => None,
        };

        // The ledger row has no reason column; a supplied reason rides in
        // the metadata map.
        let mut metadata = input.metadata.clone();
        if let Some(reason) = &input.reason {
            metadata.insert("reason", reason.clone());
        }

        let transaction_id = Uuid::new_v4();
        let row = stock_transactions::ActiveModel {
            id: Set(transaction_id),
            organization_id: Set(org.id),
            sku_id: Set(sku.id),
            location_id: Set(location.id),
            action: Set(input.action.into()),
            quantity: Set(ledger_qty),
            qty_before: Set(state.on_hand),
            total_cost_minor: Set(inbound_total),
            metadata: Set(metadata.into_value()),
            actor: Set(input.actor.clone()),
            created_at: Set(now),
        };
        let mut transaction = row.insert(txn).await?;

        let after = transition(before, input.action, ledger_qty, input.ship_from)
            .map_err(|err| enrich_stock_error(err, &input))?;

        if net > 0 {
            if let Some(unit_cost) = unit_cost_minor {
                cost_layer::record_cost(
                    txn,
                    org.id,
                    org.valuation_method,
                    sku.id,
                    location.id,
                    transaction_id,
                    net,
                    unit_cost,
                )
                .await?;
            }
        } else if net < 0 {
            let ctx = ShortageContext {
                sku: input.sku_code.clone(),
                location: input.location.clone(),
                levels: before,
            };
            let consumed = cost_layer::consume_cost(
                txn,
                org.id,
                org.valuation_method,
                sku.id,
                location.id,
                -net,
                &ctx,
            )
            .await?;

            if let Some(total) = consumed {
                let mut active: stock_transactions::ActiveModel = transaction.clone().into();
                active.total_cost_minor = Set(Some(total));
                transaction = active.update(txn).await?;
            }
        }

        let mut active: stock_states::ActiveModel = state.into();
        active.on_hand = Set(after.on_hand);
        active.reserved = Set(after.reserved);
        active.updated_at = Set(now);
        let state = active.update(txn).await?;

        tracing::debug!(
            action = %input.action,
            sku = %input.sku_code,
            location = %input.location,
            quantity = ledger_qty,
            on_hand = state.on_hand,
            reserved = state.reserved,
            "applied stock transaction"
        );

        Ok(AppliedTransaction {
            transaction,
            state,
            available_before: before.available(),
            available_after: after.available(),
        })
    }
}

/// Boundary validation of the movement payload.
fn validate_input(input: &StockMovementInput) -> Result<(), TransactionError> {
    if input.sku_code.trim().is_empty() {
        return Err(TransactionError::BadRequest(
            "SKU code must not be empty".to_string(),
        ));
    }
    if input.location.trim().is_empty() {
        return Err(TransactionError::BadRequest(
            "location must not be empty".to_string(),
        ));
    }

    if let Err(msg) = input.metadata.validate() {
        return Err(TransactionError::BadRequest(msg));
    }

    match input.action {
        StockAction::Adjust => {
            if input.quantity == 0 {
                return Err(TransactionError::BadRequest(
                    "adjustment quantity must not be zero".to_string(),
                ));
            }
            if input.reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
                return Err(TransactionError::BadRequest(
                    "adjustments require a reason".to_string(),
                ));
            }
        }
        _ => {
            if input.quantity <= 0 {
                return Err(TransactionError::BadRequest(format!(
                    "quantity must be positive for {}, got {}",
                    input.action, input.quantity
                )));
            }
        }
    }

    Ok(())
}

/// Re-raises a transition failure with SKU and location context.
fn enrich_stock_error(err: StockError, input: &StockMovementInput) -> TransactionError {
    match err {
        StockError::InsufficientStock {
            requested,
            available,
            on_hand,
            reserved,
        } => TransactionError::InsufficientStock {
            sku: input.sku_code.clone(),
            location: input.location.clone(),
            requested,
            available,
            on_hand,
            reserved,
        },
        StockError::InvalidQuantity { .. } => TransactionError::BadRequest(err.to_string()),
        StockError::InvalidOperation(msg) => TransactionError::InvalidOperation(msg),
    }
}
