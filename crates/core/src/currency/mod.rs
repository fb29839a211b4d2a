//! Minor/major unit conversion per currency precision.

pub mod convert;

#[cfg(test)]
mod props;

pub use convert::{minor_unit_factor, to_major_units, to_minor_units, Currency, CurrencyError};
