//! Decimal/minor-unit conversion helpers.
//!
//! The public API speaks decimal major units (dollars), the ledger engine
//! speaks integer minor units (cents). Conversion rounds half away from
//! zero so `-0.005` becomes `-1` cent, matching the engine's own rounding.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{BridgeError, BridgeResult};

/// Convert a decimal major-unit amount to integer minor units.
pub fn to_minor_units(amount: Decimal) -> BridgeResult<i64> {
    let cents = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents
        .to_i64()
        .ok_or_else(|| BridgeError::ValidationError(format!("amount out of range: {amount}")))
}

/// Convert integer minor units back to a decimal major-unit amount.
#[must_use]
pub fn to_decimal(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, 2)
}
