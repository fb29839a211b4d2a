//! Error types for stock transaction processing.
//!
//! Two channels, deliberately kept apart: recoverable domain errors that
//! callers must handle (insufficient stock, unknown SKU, retryable
//! conflicts), and the fatal `Invariant` variant reserved for defects such as
//! a weighted-cost allocation that fails to reconcile.

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use stockbook_core::currency::CurrencyError;
use stockbook_shared::AppError;

/// Errors that can occur while applying stock transactions.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A quantity rule (available, reserved, or layer quantity) is violated.
    #[error(
        "Insufficient stock for {sku} at {location}: requested {requested}, \
         available {available} (on hand {on_hand}, reserved {reserved})"
    )]
    InsufficientStock {
        /// SKU code.
        sku: String,
        /// Location name.
        location: String,
        /// Quantity the operation needed.
        requested: i64,
        /// On-hand minus reserved at the time of the check.
        available: i64,
        /// On-hand at the time of the check.
        on_hand: i64,
        /// Reserved at the time of the check.
        reserved: i64,
    },

    /// Outbound or adjust transaction referencing an unprovisioned SKU.
    #[error("SKU not found: {0}")]
    SkuNotFound(String),

    /// Organization does not exist.
    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),

    /// Structurally invalid request (bad quantity sign, missing reason,
    /// no inventory at the location, malformed metadata).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unsupported action for this operation.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// The operation would violate a structural invariant
    /// (e.g., on-hand below reserved).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Concurrent modification detected; the caller retries the whole
    /// operation.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Currency conversion failed.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Internal invariant violation. A defect, never caller input.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TransactionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::SkuNotFound(_) => "SKU_NOT_FOUND",
            Self::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidAction(_) => "INVALID_ACTION",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Currency(_) => "CURRENCY_ERROR",
            Self::Invariant(_) => "INVARIANT_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if the caller should retry the whole operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::InsufficientStock { .. } => Self::BusinessRule(err.to_string()),
            TransactionError::SkuNotFound(_) | TransactionError::OrganizationNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            TransactionError::BadRequest(_)
            | TransactionError::InvalidAction(_)
            | TransactionError::InvalidOperation(_)
            | TransactionError::Currency(_) => Self::Validation(err.to_string()),
            TransactionError::ConcurrentModification => Self::Conflict(err.to_string()),
            TransactionError::Invariant(_) => Self::Internal(err.to_string()),
            TransactionError::Database(_) => Self::Database(err.to_string()),
        }
    }
}
