//! `SeaORM` Entity for stock_transactions table.
//!
//! Append-only ledger of stock movements. Rows are never mutated after
//! commit; the orchestrator fills in `total_cost_minor` (and the transfer
//! cross-link metadata) within the same database transaction that inserted
//! the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::StockAction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub sku_id: Uuid,
    pub location_id: Uuid,
    pub action: StockAction,
    /// Signed quantity: outbound actions are stored negative.
    pub quantity: i64,
    /// On-hand snapshot immediately prior to this transaction.
    pub qty_before: i64,
    pub total_cost_minor: Option<i64>,
    pub metadata: Json,
    pub actor: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(
        belongs_to = "super::skus::Entity",
        from = "Column::SkuId",
        to = "super::skus::Column::Id"
    )]
    Skus,
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::LocationId",
        to = "super::locations::Column::Id"
    )]
    Locations,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::skus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Skus.def()
    }
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
