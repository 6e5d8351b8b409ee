//! Money arithmetic helpers.
//!
//! All monetary values are [`rust_decimal::Decimal`]; never floating point.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to two decimal places, halves away from zero.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
