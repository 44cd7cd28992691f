//! Cart Models

use jiff::Timestamp;
use tally::{attributes::VariantAttributes, cart::Discount, money::MinorUnits};
use uuid::Uuid;

use crate::{domain::products::models::ProductUuid, uuids::TypedUuid};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Cart Model
///
/// `subtotal`, `total`, and `total_items` are derived from the live lines at
/// read time; the row itself only stores identity and the applied discount.
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub customer_uuid: Option<Uuid>,
    pub subtotal: MinorUnits,
    pub total: MinorUnits,
    pub total_items: u64,
    pub discount: Option<Discount>,
    pub items: Vec<CartItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// CartItem Model
#[derive(Debug, Clone)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: MinorUnits,
    pub attributes: VariantAttributes,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// New Cart Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewCart {
    pub uuid: CartUuid,
    pub customer_uuid: Option<Uuid>,
}

/// New Cart Item Model
///
/// Display and pricing fields are not part of the input: the service freezes
/// them from the product record at add time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub attributes: VariantAttributes,
}
