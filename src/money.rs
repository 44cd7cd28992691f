//! Money

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};

/// Monetary amounts are integer minor units (cents/pence) throughout.
pub type MinorUnits = u64;

/// Format an amount of minor units for display.
pub fn format_minor(amount: MinorUnits) -> String {
    i64::try_from(amount).map_or_else(
        |_overflow| amount.to_string(),
        |minor| Money::from_minor(minor, iso::USD).to_string(),
    )
}

/// Take a percentage of an amount, rounding halves away from zero.
///
/// `percent` is expressed in whole points: `Decimal::from(20)` is 20%.
pub fn percent_of(amount: MinorUnits, percent: Decimal) -> MinorUnits {
    let rate = Percentage::from(percent / Decimal::ONE_HUNDRED);
    let exact = rate * Decimal::from(amount);

    exact
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or_default()
}
