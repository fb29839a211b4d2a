//! `SeaORM` Entity for cost_layers table.
//!
//! A layer is a lot of inventory carrying a specific unit cost, created by an
//! inbound transaction and drained by outbound consumption. `qty_in` never
//! changes; `qty_remaining` only decreases, within `0..=qty_in`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cost_layers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub sku_id: Uuid,
    pub location_id: Uuid,
    pub transaction_id: Uuid,
    pub qty_in: i64,
    pub qty_remaining: i64,
    pub unit_cost_minor: i64,
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
        belongs_to = "super::stock_transactions::Entity",
        from = "Column::TransactionId",
        to = "super::stock_transactions::Column::Id"
    )]
    StockTransactions,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::stock_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
