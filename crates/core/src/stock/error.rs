//! Error types for stock state transitions.

use thiserror::Error;

use super::types::StockAction;

/// Errors that can occur when applying a stock action to current levels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// A quantity rule (available, reserved, or on-hand floor) is violated.
    ///
    /// Carries the numbers at this layer; the orchestrator enriches the
    /// error with SKU and location before surfacing it.
    #[error(
        "Insufficient stock: requested {requested}, available {available} \
         (on hand {on_hand}, reserved {reserved})"
    )]
    InsufficientStock {
        /// Quantity the action needed.
        requested: i64,
        /// On-hand minus reserved at the time of the check.
        available: i64,
        /// On-hand at the time of the check.
        on_hand: i64,
        /// Reserved at the time of the check.
        reserved: i64,
    },

    /// The quantity does not satisfy the action's sign convention.
    #[error("Invalid quantity {quantity} for action {action}")]
    InvalidQuantity {
        /// The action being applied.
        action: StockAction,
        /// The offending quantity.
        quantity: i64,
    },

    /// A structural invariant would be violated (e.g., on-hand below reserved).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl StockError {
    /// Builds an `InsufficientStock` error from the levels a check ran against.
    #[must_use]
    pub const fn shortage(requested: i64, levels: super::types::StockLevels) -> Self {
        Self::InsufficientStock {
            requested,
            available: levels.available(),
            on_hand: levels.on_hand,
            reserved: levels.reserved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::types::StockLevels;

    #[test]
    fn test_shortage_captures_levels() {
        let err = StockError::shortage(10, StockLevels::new(8, 3));
        assert_eq!(
            err,
            StockError::InsufficientStock {
                requested: 10,
                available: 5,
                on_hand: 8,
                reserved: 3,
            }
        );
    }

    #[test]
    fn test_error_display() {
        let err = StockError::shortage(10, StockLevels::new(8, 3));
        assert_eq!(
            err.to_string(),
            "Insufficient stock: requested 10, available 5 (on hand 8, reserved 3)"
        );

        let err = StockError::InvalidQuantity {
            action: StockAction::Receive,
            quantity: -4,
        };
        assert_eq!(err.to_string(), "Invalid quantity -4 for action receive");
    }
}
