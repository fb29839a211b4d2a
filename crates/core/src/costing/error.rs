//! Error types for cost layer planning.

use thiserror::Error;

/// Errors that can occur while planning layer consumption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostingError {
    /// The requested quantity exceeds the total remaining across layers.
    ///
    /// Surfaced to callers as insufficient stock; the ledger quantity check
    /// and the layer quantity check guard the same physical goods.
    #[error("Insufficient layer quantity: requested {requested}, remaining {remaining}")]
    InsufficientLayerQuantity {
        /// Quantity the consumption needed.
        requested: i64,
        /// Total remaining quantity across the supplied layers.
        remaining: i64,
    },

    /// The planned quantity does not satisfy the sign convention.
    #[error("Invalid consumption quantity: {0}")]
    InvalidQuantity(i64),

    /// The weighted allocation could not reconcile its rounding remainder.
    ///
    /// Unreachable for well-formed layers (the distributable remainder is
    /// bounded by layer count minus one); reaching it is a defect, not a
    /// validation failure.
    #[error("Cost allocation mismatch: requested {requested}, allocated {allocated}")]
    AllocationMismatch {
        /// Quantity that was requested.
        requested: i64,
        /// Quantity the allocation actually covered.
        allocated: i64,
    },
}

impl CostingError {
    /// Returns true for the internal-invariant channel that must never be
    /// presented as caller input validation.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::AllocationMismatch { .. })
    }
}
