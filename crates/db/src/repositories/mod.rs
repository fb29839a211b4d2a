//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod catalog;
pub mod cost_layer;
pub mod error;
pub mod organization;
pub mod stock;

pub use error::TransactionError;
pub use organization::{CreateOrganizationInput, OrganizationRepository};
pub use stock::{
    AppliedTransaction, AppliedTransfer, StockMovementInput, StockRepository, TransactionFilter,
    TransferInput, ValuationLine,
};
