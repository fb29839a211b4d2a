//! Catalog provisioning inside a stock transaction.
//!
//! SKUs and locations referenced by a movement are resolved here, scoped to
//! the tenant and running on the caller's database transaction so lazy
//! creation commits or rolls back with the rest of the unit of work.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::{locations, skus};

use super::error::TransactionError;

/// Resolves a SKU by code within the tenant.
///
/// Inbound actions auto-provision a missing SKU (using the supplied name, or
/// the code itself when no name is given); anything else fails `SkuNotFound`.
///
/// # Errors
///
/// Returns `SkuNotFound` for a missing SKU without provisioning rights, and
/// `ConcurrentModification` when a concurrent writer provisioned the same
/// code first.
pub(crate) async fn ensure_sku(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    code: &str,
    name: Option<&str>,
    auto_provision: bool,
) -> Result<skus::Model, TransactionError> {
    let existing = skus::Entity::find()
        .filter(skus::Column::OrganizationId.eq(organization_id))
        .filter(skus::Column::Code.eq(code))
        .one(txn)
        .await?;

    if let Some(sku) = existing {
        return Ok(sku);
    }

    if !auto_provision {
        return Err(TransactionError::SkuNotFound(code.to_string()));
    }

    let now = chrono::Utc::now().into();
    let sku = skus::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        code: Set(code.to_string()),
        name: Set(name.unwrap_or(code).to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    sku.insert(txn).await.map_err(map_unique_violation)
}

/// Resolves a location by name within the tenant, creating it when missing.
///
/// # Errors
///
/// Returns `ConcurrentModification` when a concurrent writer created the same
/// name first.
pub(crate) async fn ensure_location(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    name: &str,
) -> Result<locations::Model, TransactionError> {
    let existing = locations::Entity::find()
        .filter(locations::Column::OrganizationId.eq(organization_id))
        .filter(locations::Column::Name.eq(name))
        .one(txn)
        .await?;

    if let Some(location) = existing {
        return Ok(location);
    }

    let now = chrono::Utc::now().into();
    let location = locations::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        name: Set(name.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    location.insert(txn).await.map_err(map_unique_violation)
}

/// Maps a unique-constraint violation on lazy creation to the retryable
/// conflict error; two writers raced to provision the same row.
pub(crate) fn map_unique_violation(err: sea_orm::DbErr) -> TransactionError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => TransactionError::ConcurrentModification,
        _ => TransactionError::Database(err),
    }
}
