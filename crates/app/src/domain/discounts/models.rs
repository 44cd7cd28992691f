//! Discount Code Models

use jiff::Timestamp;
use rust_decimal::Decimal;
use tally::money::{MinorUnits, percent_of};

use crate::uuids::TypedUuid;

/// Discount Code UUID
pub type DiscountCodeUuid = TypedUuid<DiscountCode>;

/// How a code discounts a cart.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountKind {
    /// A fixed amount in minor units, capped at the cart subtotal.
    Fixed(MinorUnits),
    /// A percentage of the cart subtotal, in whole points (25 = 25%).
    Percent(Decimal),
}

/// Discount Code Model
#[derive(Debug, Clone)]
pub struct DiscountCode {
    pub uuid: DiscountCodeUuid,
    pub code: String,
    pub kind: DiscountKind,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl DiscountCode {
    /// Whether the code's active window covers the given instant.
    pub fn is_active_at(&self, at: Timestamp) -> bool {
        self.starts_at.is_none_or(|starts| starts <= at)
            && self.ends_at.is_none_or(|ends| at < ends)
    }

    /// The discount amount this code yields against a subtotal. Never
    /// exceeds the subtotal, so a discounted total cannot go negative.
    pub fn amount_for(&self, subtotal: MinorUnits) -> MinorUnits {
        match &self.kind {
            DiscountKind::Fixed(amount) => (*amount).min(subtotal),
            DiscountKind::Percent(percent) => percent_of(subtotal, *percent).min(subtotal),
        }
    }
}

/// New Discount Code Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiscountCode {
    pub uuid: DiscountCodeUuid,
    pub code: String,
    pub kind: DiscountKind,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(kind: DiscountKind) -> DiscountCode {
        DiscountCode {
            uuid: DiscountCodeUuid::new(),
            code: "CODE".to_string(),
            kind,
            starts_at: None,
            ends_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            deleted_at: None,
        }
    }

    #[test]
    fn fixed_amount_is_capped_at_subtotal() {
        let code = code(DiscountKind::Fixed(10_00));

        assert_eq!(code.amount_for(50_00), 10_00);
        assert_eq!(code.amount_for(5_00), 5_00);
    }

    #[test]
    fn percent_amount_is_a_share_of_subtotal() {
        let code = code(DiscountKind::Percent(Decimal::from(25)));

        assert_eq!(code.amount_for(40_00), 10_00);
        assert_eq!(code.amount_for(0), 0);
    }

    #[test]
    fn window_bounds_are_inclusive_start_exclusive_end() {
        let mut windowed = code(DiscountKind::Fixed(100));
        let start: Timestamp = "2026-01-01T00:00:00Z".parse().expect("valid timestamp");
        let end: Timestamp = "2026-02-01T00:00:00Z".parse().expect("valid timestamp");

        windowed.starts_at = Some(start);
        windowed.ends_at = Some(end);

        assert!(windowed.is_active_at(start));
        assert!(!windowed.is_active_at(end));
        assert!(windowed.is_active_at("2026-01-15T12:00:00Z".parse().expect("valid timestamp")));
    }
}
