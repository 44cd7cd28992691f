//! Checkout Summary

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    money::{MinorUnits, percent_of},
};

/// How the order will ship. Rates are flat per method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Standard,
    Express,
}

/// Error parsing a shipping method from its wire form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shipping method: {0}")]
pub struct UnknownShippingMethod(pub String);

impl ShippingMethod {
    /// Flat shipping rate in minor units.
    pub fn rate(self) -> MinorUnits {
        match self {
            Self::Standard => 5_00,
            Self::Express => 15_00,
        }
    }

    /// Wire form of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = UnknownShippingMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            other => Err(UnknownShippingMethod(other.to_string())),
        }
    }
}

/// The billing figures for a checkout: what the customer sees on the summary
/// panel and what the order service re-derives before persisting.
///
/// Invariant: `total == subtotal + shipping + tax − discount`. Amounts are
/// integer minor units, so the identity is exact; the tolerance only enters
/// when comparing figures computed by two parties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub subtotal: MinorUnits,
    pub shipping: MinorUnits,
    pub discount: MinorUnits,
    pub tax: MinorUnits,
    pub total: MinorUnits,
}

impl CheckoutSummary {
    /// Compute the summary for a cart. Tax is charged on the discounted
    /// subtotal at `tax_rate` whole points (e.g. `8` for 8%).
    pub fn compute(cart: &Cart, method: ShippingMethod, tax_rate: Decimal) -> Self {
        let subtotal = cart.subtotal();
        let discount = cart.discount().map_or(0, |discount| discount.amount);
        let shipping = method.rate();
        let tax = percent_of(subtotal.saturating_sub(discount), tax_rate);

        Self {
            subtotal,
            shipping,
            discount,
            tax,
            total: subtotal
                .saturating_add(shipping)
                .saturating_add(tax)
                .saturating_sub(discount),
        }
    }

    /// Build a summary from parts, deriving `total` so the invariant holds
    /// by construction.
    pub fn from_parts(
        subtotal: MinorUnits,
        shipping: MinorUnits,
        discount: MinorUnits,
        tax: MinorUnits,
    ) -> Self {
        Self {
            subtotal,
            shipping,
            discount,
            tax,
            total: subtotal
                .saturating_add(shipping)
                .saturating_add(tax)
                .saturating_sub(discount),
        }
    }

    /// Whether `total` equals `subtotal + shipping + tax − discount`.
    pub fn is_consistent(&self) -> bool {
        self.total
            == self
                .subtotal
                .saturating_add(self.shipping)
                .saturating_add(self.tax)
                .saturating_sub(self.discount)
    }

    /// Whether every figure of `other` is within `tolerance` minor units of
    /// this summary. Used to compare client-submitted billing against the
    /// server-derived figures.
    pub fn reconciles_with(&self, other: &Self, tolerance: MinorUnits) -> bool {
        let close = |a: MinorUnits, b: MinorUnits| a.abs_diff(b) <= tolerance;

        close(self.subtotal, other.subtotal)
            && close(self.shipping, other.shipping)
            && close(self.discount, other.discount)
            && close(self.tax, other.tax)
            && close(self.total, other.total)
    }
}
