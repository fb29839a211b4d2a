//! `SeaORM` active enums mapping to `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Valuation method governing how cost layers are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "valuation_method")]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    /// Oldest layer consumed first.
    #[sea_orm(string_value = "fifo")]
    Fifo,
    /// Newest layer consumed first.
    #[sea_orm(string_value = "lifo")]
    Lifo,
    /// Single blended cost across all layers.
    #[sea_orm(string_value = "wac")]
    Wac,
}

/// Ledger action recorded on a stock transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "stock_action")]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    /// Goods received into a location.
    #[sea_orm(string_value = "receive")]
    Receive,
    /// Goods shipped out of a location.
    #[sea_orm(string_value = "ship")]
    Ship,
    /// Manual correction of on-hand quantity.
    #[sea_orm(string_value = "adjust")]
    Adjust,
    /// Earmark on-hand stock for an order.
    #[sea_orm(string_value = "reserve")]
    Reserve,
    /// Release a previous reservation.
    #[sea_orm(string_value = "unreserve")]
    Unreserve,
    /// Outbound leg of a cross-location transfer.
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    /// Inbound leg of a cross-location transfer.
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
}

impl From<stockbook_core::stock::StockAction> for StockAction {
    fn from(action: stockbook_core::stock::StockAction) -> Self {
        use stockbook_core::stock::StockAction as Core;
        match action {
            Core::Receive => Self::Receive,
            Core::Ship => Self::Ship,
            Core::Adjust => Self::Adjust,
            Core::Reserve => Self::Reserve,
            Core::Unreserve => Self::Unreserve,
            Core::TransferOut => Self::TransferOut,
            Core::TransferIn => Self::TransferIn,
        }
    }
}

impl From<StockAction> for stockbook_core::stock::StockAction {
    fn from(action: StockAction) -> Self {
        use stockbook_core::stock::StockAction as Core;
        match action {
            StockAction::Receive => Core::Receive,
            StockAction::Ship => Core::Ship,
            StockAction::Adjust => Core::Adjust,
            StockAction::Reserve => Core::Reserve,
            StockAction::Unreserve => Core::Unreserve,
            StockAction::TransferOut => Core::TransferOut,
            StockAction::TransferIn => Core::TransferIn,
        }
    }
}
