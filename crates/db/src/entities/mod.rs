//! `SeaORM` entity definitions.

pub mod cost_layers;
pub mod locations;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod skus;
pub mod stock_states;
pub mod stock_transactions;
