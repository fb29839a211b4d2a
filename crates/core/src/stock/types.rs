//! Stock domain types for transitions and ledger rows.

use serde::{Deserialize, Serialize};

/// Ledger action recorded for a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    /// Goods received into a location.
    Receive,
    /// Goods shipped out of a location.
    Ship,
    /// Manual correction of on-hand quantity (signed).
    Adjust,
    /// Earmark on-hand stock for an order.
    Reserve,
    /// Release a previous reservation.
    Unreserve,
    /// Outbound leg of a cross-location transfer.
    TransferOut,
    /// Inbound leg of a cross-location transfer.
    TransferIn,
}

impl StockAction {
    /// Returns true for actions that bring stock into a location and may
    /// lazily provision catalog entries and state rows.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::Receive | Self::TransferIn)
    }

    /// Returns the snake_case name used in ledger rows and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receive => "receive",
            Self::Ship => "ship",
            Self::Adjust => "adjust",
            Self::Reserve => "reserve",
            Self::Unreserve => "unreserve",
            Self::TransferOut => "transfer_out",
            Self::TransferIn => "transfer_in",
        }
    }
}

impl std::fmt::Display for StockAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pool a shipment draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipSource {
    /// Draw from reserved stock only.
    Reserved,
    /// Draw from unreserved (available) stock only.
    Available,
    /// Exhaust reserved stock first, then dip into available.
    #[default]
    Default,
}

/// Current stock levels for one (SKU, location) key.
///
/// `available` is always derived from these two fields and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    /// Physical quantity present regardless of reservation.
    pub on_hand: i64,
    /// Portion of on-hand earmarked for orders.
    pub reserved: i64,
}

impl StockLevels {
    /// Creates levels from raw quantities.
    #[must_use]
    pub const fn new(on_hand: i64, reserved: i64) -> Self {
        Self { on_hand, reserved }
    }

    /// On-hand minus reserved; the allocatable quantity.
    #[must_use]
    pub const fn available(&self) -> i64 {
        self.on_hand - self.reserved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_is_inbound() {
        assert!(StockAction::Receive.is_inbound());
        assert!(StockAction::TransferIn.is_inbound());
        assert!(!StockAction::Ship.is_inbound());
        assert!(!StockAction::Adjust.is_inbound());
        assert!(!StockAction::Reserve.is_inbound());
        assert!(!StockAction::Unreserve.is_inbound());
        assert!(!StockAction::TransferOut.is_inbound());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(StockAction::Receive.to_string(), "receive");
        assert_eq!(StockAction::TransferOut.to_string(), "transfer_out");
    }

    #[test]
    fn test_available_is_derived() {
        let levels = StockLevels::new(20, 5);
        assert_eq!(levels.available(), 15);

        let empty = StockLevels::default();
        assert_eq!(empty.available(), 0);
    }

    #[test]
    fn test_ship_source_default() {
        assert_eq!(ShipSource::default(), ShipSource::Default);
    }
}
