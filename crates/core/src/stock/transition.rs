//! Pure stock state transition rules.
//!
//! `transition` maps (levels, action, quantity, ship source) to new levels or
//! an error. It performs no I/O and checks every precondition before
//! producing a result, so a failed transition leaves the caller's state
//! untouched.

use super::error::StockError;
use super::types::{ShipSource, StockAction, StockLevels};

/// Applies a stock action to the given levels.
///
/// Sign conventions:
/// - `Receive`, `Reserve`, `Unreserve`, `TransferIn` require a positive
///   quantity.
/// - `Ship` and `TransferOut` accept either sign and operate on the
///   magnitude (the ledger stores outbound rows negative).
/// - `Adjust` is signed and must be non-zero.
///
/// # Errors
///
/// Returns `StockError::InsufficientStock` when a quantity rule fails,
/// `StockError::InvalidQuantity` when the quantity violates the action's
/// sign convention, and `StockError::InvalidOperation` when the result
/// would leave on-hand below reserved.
pub fn transition(
    levels: StockLevels,
    action: StockAction,
    quantity: i64,
    ship_from: Option<ShipSource>,
) -> Result<StockLevels, StockError> {
    match action {
        StockAction::Receive | StockAction::TransferIn => {
            let qty = require_positive(action, quantity)?;
            Ok(StockLevels::new(levels.on_hand + qty, levels.reserved))
        }

        StockAction::Reserve => {
            let qty = require_positive(action, quantity)?;
            if levels.available() < qty {
                return Err(StockError::shortage(qty, levels));
            }
            Ok(StockLevels::new(levels.on_hand, levels.reserved + qty))
        }

        StockAction::Unreserve => {
            let qty = require_positive(action, quantity)?;
            if levels.reserved < qty {
                return Err(StockError::shortage(qty, levels));
            }
            Ok(StockLevels::new(levels.on_hand, levels.reserved - qty))
        }

        StockAction::Ship => ship(levels, quantity, ship_from.unwrap_or_default()),

        StockAction::TransferOut => {
            let qty = require_magnitude(action, quantity)?;
            if levels.on_hand < qty {
                return Err(StockError::shortage(qty, levels));
            }
            let on_hand = levels.on_hand - qty;
            // An outbound transfer never touches reservations, so it must not
            // cut below them either.
            if on_hand < levels.reserved {
                return Err(StockError::shortage(qty, levels));
            }
            Ok(StockLevels::new(on_hand, levels.reserved))
        }

        StockAction::Adjust => {
            if quantity == 0 {
                return Err(StockError::InvalidQuantity { action, quantity });
            }
            let on_hand = levels.on_hand + quantity;
            if on_hand < 0 {
                return Err(StockError::shortage(-quantity, levels));
            }
            if on_hand < levels.reserved {
                return Err(StockError::InvalidOperation(format!(
                    "adjustment would leave on hand {on_hand} below reserved {}",
                    levels.reserved
                )));
            }
            Ok(StockLevels::new(on_hand, levels.reserved))
        }
    }
}

/// Ships `quantity` (magnitude) from the requested pool.
fn ship(levels: StockLevels, quantity: i64, source: ShipSource) -> Result<StockLevels, StockError> {
    let qty = require_magnitude(StockAction::Ship, quantity)?;

    match source {
        ShipSource::Reserved => {
            if levels.reserved < qty {
                return Err(StockError::shortage(qty, levels));
            }
            Ok(StockLevels::new(levels.on_hand - qty, levels.reserved - qty))
        }
        ShipSource::Available => {
            if levels.available() < qty {
                return Err(StockError::shortage(qty, levels));
            }
            Ok(StockLevels::new(levels.on_hand - qty, levels.reserved))
        }
        ShipSource::Default => {
            if levels.on_hand < qty {
                return Err(StockError::shortage(qty, levels));
            }
            // Reserved-first: exhaust reservations before dipping into
            // available stock.
            let from_reserved = levels.reserved.min(qty);
            Ok(StockLevels::new(
                levels.on_hand - qty,
                levels.reserved - from_reserved,
            ))
        }
    }
}

fn require_positive(action: StockAction, quantity: i64) -> Result<i64, StockError> {
    if quantity > 0 {
        Ok(quantity)
    } else {
        Err(StockError::InvalidQuantity { action, quantity })
    }
}

fn require_magnitude(action: StockAction, quantity: i64) -> Result<i64, StockError> {
    if quantity == 0 {
        return Err(StockError::InvalidQuantity { action, quantity });
    }
    Ok(quantity.abs())
}
