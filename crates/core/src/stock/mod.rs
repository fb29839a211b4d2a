//! Stock state transition rules.
//!
//! This module implements the pure rule set mapping current stock levels plus
//! an action to new stock levels:
//! - Domain types for actions, ship sourcing, and levels
//! - The transition function itself (no I/O, no partial mutation)
//! - Error types for quantity rule violations

pub mod error;
pub mod transition;
pub mod types;

#[cfg(test)]
mod transition_props;

pub use error::StockError;
pub use transition::transition;
pub use types::{ShipSource, StockAction, StockLevels};
