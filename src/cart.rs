//! Cart

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{attributes::VariantAttributes, money::MinorUnits, products::ProductSnapshot};

/// Errors related to cart state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities are positive integers; zero is not shorthand for removal.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,
}

/// One product line in a cart.
///
/// `name`, `image`, and `unit_price` are display/pricing snapshots frozen at
/// the time the line was added; they are not live-linked to the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_uuid: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: MinorUnits,
    #[serde(default)]
    pub attributes: VariantAttributes,
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price × quantity` for this line.
    pub fn line_total(&self) -> MinorUnits {
        self.unit_price.saturating_mul(MinorUnits::from(self.quantity))
    }

    fn matches(&self, product: Uuid, attributes: &VariantAttributes) -> bool {
        self.product_uuid == product && self.attributes == *attributes
    }
}

/// A discount applied to the cart as a whole, not itemized onto lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub code: String,
    pub amount: MinorUnits,
}

/// Container of cart lines for exactly one subject.
///
/// Lines keep insertion order; order is not significant to totals. Two lines
/// are the same iff product and attributes are equal, and adding an existing
/// identity increments its quantity rather than appending a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: Option<Discount>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines, e.g. a local-storage document or
    /// a server cart response.
    pub fn from_lines(lines: impl Into<Vec<CartLine>>, discount: Option<Discount>) -> Self {
        Self {
            lines: lines.into(),
            discount,
        }
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The applied discount, if any.
    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    /// Whether the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line matching `(product, attributes)`.
    pub fn find(&self, product: Uuid, attributes: &VariantAttributes) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.matches(product, attributes))
    }

    /// Add a product to the cart, freezing name/image/price at call time and
    /// using the sale price when one exists.
    ///
    /// An existing `(product, attributes)` line has `quantity` added to it;
    /// otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is zero.
    pub fn add_item(
        &mut self,
        product: &ProductSnapshot,
        quantity: u32,
        attributes: VariantAttributes,
    ) -> Result<&CartLine, CartError> {
        self.add_line(CartLine {
            product_uuid: product.uuid,
            name: product.name.clone(),
            image: product.image.clone(),
            unit_price: product.effective_price(),
            attributes,
            quantity,
        })
    }

    /// Add an already-snapshotted line, merging by `(product, attributes)`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when the line quantity is zero.
    pub fn add_line(&mut self, line: CartLine) -> Result<&CartLine, CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let position = self
            .lines
            .iter()
            .position(|existing| existing.matches(line.product_uuid, &line.attributes));

        let index = match position {
            Some(index) => {
                let existing = &mut self.lines[index];
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                index
            }
            None => {
                self.lines.push(line);
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[index])
    }

    /// Set the quantity of the matching line. A missing line is a no-op;
    /// removal stays an explicit separate operation.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is zero.
    pub fn update_quantity(
        &mut self,
        product: Uuid,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(product, attributes))
        {
            line.quantity = quantity;
        }

        Ok(())
    }

    /// Delete the matching line entirely. Returns whether a line was removed.
    pub fn remove_item(&mut self, product: Uuid, attributes: &VariantAttributes) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| !line.matches(product, attributes));

        self.lines.len() != before
    }

    /// Empty all lines and drop any discount.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = None;
    }

    /// Replace the applied discount. The amount is capped at the subtotal so
    /// the cart total can never go negative.
    pub fn set_discount(&mut self, discount: Option<Discount>) {
        self.discount = discount.map(|discount| Discount {
            amount: discount.amount.min(self.subtotal()),
            ..discount
        });
    }

    /// Sum of line quantities.
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Sum of `unit_price × quantity` over all lines, before discount.
    pub fn subtotal(&self) -> MinorUnits {
        self.lines
            .iter()
            .fold(0, |acc: MinorUnits, line| {
                acc.saturating_add(line.line_total())
            })
    }

    /// Subtotal less the applied discount.
    pub fn total(&self) -> MinorUnits {
        let discount = self.discount.as_ref().map_or(0, |discount| discount.amount);

        self.subtotal().saturating_sub(discount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: MinorUnits) -> ProductSnapshot {
        ProductSnapshot {
            uuid: Uuid::now_v7(),
            name: "Widget".to_string(),
            sku: Some("WID-1".to_string()),
            image: Some("widget.jpg".to_string()),
            price,
            sale_price: None,
        }
    }

    fn red() -> VariantAttributes {
        [("color", "red")].into_iter().collect()
    }

    #[test]
    fn adding_distinct_products_sums_quantities_and_amounts() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let a = product(1000);
        let b = product(2500);

        cart.add_item(&a, 2, VariantAttributes::none())?;
        cart.add_item(&b, 3, VariantAttributes::none())?;

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.subtotal(), 2 * 1000 + 3 * 2500);
        assert_eq!(cart.total(), cart.subtotal());

        Ok(())
    }

    #[test]
    fn adding_same_identity_twice_merges_into_one_line() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(1000);

        cart.add_item(&widget, 2, VariantAttributes::none())?;
        cart.add_item(&widget, 3, VariantAttributes::none())?;

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);

        Ok(())
    }

    #[test]
    fn same_product_different_attributes_is_a_distinct_line() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(2000);

        cart.add_item(&widget, 2, VariantAttributes::none())?;
        cart.add_item(&widget, 1, red())?;

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.subtotal(), 6000);

        Ok(())
    }

    #[test]
    fn add_freezes_sale_price_at_call_time() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let mut widget = product(2000);
        widget.sale_price = Some(1500);

        cart.add_item(&widget, 1, VariantAttributes::none())?;

        assert_eq!(cart.lines()[0].unit_price, 1500);

        Ok(())
    }

    #[test]
    fn add_with_zero_quantity_is_rejected() {
        let mut cart = Cart::new();

        let result = cart.add_item(&product(1000), 0, VariantAttributes::none());

        assert_eq!(result.unwrap_err(), CartError::InvalidQuantity);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_sets_matching_line() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(1000);

        cart.add_item(&widget, 2, VariantAttributes::none())?;
        cart.update_quantity(widget.uuid, 7, &VariantAttributes::none())?;

        assert_eq!(cart.lines()[0].quantity, 7);

        Ok(())
    }

    #[test]
    fn update_quantity_zero_is_rejected_and_leaves_cart_unchanged() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(1000);

        cart.add_item(&widget, 2, VariantAttributes::none())?;

        let result = cart.update_quantity(widget.uuid, 0, &VariantAttributes::none());

        assert_eq!(result, Err(CartError::InvalidQuantity));
        assert_eq!(cart.lines()[0].quantity, 2);

        Ok(())
    }

    #[test]
    fn update_quantity_on_missing_line_is_a_no_op() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(1000);

        cart.add_item(&widget, 2, VariantAttributes::none())?;
        cart.update_quantity(Uuid::now_v7(), 5, &VariantAttributes::none())?;

        assert_eq!(cart.total_items(), 2);

        Ok(())
    }

    #[test]
    fn remove_item_on_missing_identity_leaves_cart_unchanged() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(1000);

        cart.add_item(&widget, 2, VariantAttributes::none())?;

        assert!(!cart.remove_item(widget.uuid, &red()));
        assert_eq!(cart.total_items(), 2);

        Ok(())
    }

    #[test]
    fn remove_item_deletes_the_whole_line() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let widget = product(1000);

        cart.add_item(&widget, 5, VariantAttributes::none())?;

        assert!(cart.remove_item(widget.uuid, &VariantAttributes::none()));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn clear_drops_lines_and_discount() -> Result<(), CartError> {
        let mut cart = Cart::new();

        cart.add_item(&product(1000), 1, VariantAttributes::none())?;
        cart.set_discount(Some(Discount {
            code: "SAVE10".to_string(),
            amount: 100,
        }));

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.discount().is_none());
        assert_eq!(cart.total(), 0);

        Ok(())
    }

    #[test]
    fn discount_is_capped_at_subtotal() -> Result<(), CartError> {
        let mut cart = Cart::new();

        cart.add_item(&product(500), 1, VariantAttributes::none())?;
        cart.set_discount(Some(Discount {
            code: "BIG".to_string(),
            amount: 10_000,
        }));

        assert_eq!(cart.discount().map(|d| d.amount), Some(500));
        assert_eq!(cart.total(), 0);

        Ok(())
    }
}
