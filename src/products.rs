//! Products

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::MinorUnits;

/// Read-only view of a product at a moment in time.
///
/// Carts and orders copy fields out of this snapshot rather than holding a
/// live reference; later product edits never reach existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub uuid: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub price: MinorUnits,
    pub sale_price: Option<MinorUnits>,
}

impl ProductSnapshot {
    /// The price a line added right now would be frozen at: the sale price
    /// when one exists, the regular price otherwise.
    pub fn effective_price(&self) -> MinorUnits {
        self.sale_price.unwrap_or(self.price)
    }
}
