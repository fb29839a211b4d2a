//! Cost layer planning under FIFO, LIFO, and weighted-average valuation.
//!
//! This module computes consumption plans and merge results over in-memory
//! layer views; the database layer loads the rows (ordered and locked),
//! runs these planners, and applies the outcome as row updates.

pub mod error;
pub mod layers;

#[cfg(test)]
mod props;

pub use error::CostingError;
pub use layers::{
    blended_unit_cost, merge_layers, plan_sequential, plan_weighted, sequential_unit_cost,
    ConsumptionPlan, LayerDraw, LayerView, MergedLayer,
};
