//! Cart response bodies shared by the cart handlers.

use std::collections::BTreeMap;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::carts::models::{Cart, CartItem};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The customer this cart is bound to, when authenticated
    pub customer_uuid: Option<Uuid>,

    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    /// Sum of line quantities
    pub total_items: u64,

    /// Sum of `unit_price × quantity` over all items, in minor units
    pub subtotal: u64,

    /// Subtotal less the applied discount, in minor units
    pub total: u64,

    /// The applied discount, if any
    pub discount: Option<DiscountResponse>,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The product this line snapshots
    pub product_uuid: Uuid,

    /// Product name frozen at add time
    pub name: String,

    /// Product image frozen at add time
    pub image: Option<String>,

    /// Unit price frozen at add time, in minor units
    pub unit_price: u64,

    /// Selected variant values, part of line identity
    pub attributes: BTreeMap<String, String>,

    /// Line quantity
    pub quantity: u32,
}

/// Applied Discount Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DiscountResponse {
    /// The discount code
    pub code: String,

    /// The discounted amount in minor units
    pub amount: u64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            uuid: cart.uuid.into_uuid(),
            customer_uuid: cart.customer_uuid,
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            total_items: cart.total_items,
            subtotal: cart.subtotal,
            total: cart.total,
            discount: cart.discount.map(|discount| DiscountResponse {
                code: discount.code,
                amount: discount.amount,
            }),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            name: item.name,
            image: item.image,
            unit_price: item.unit_price,
            attributes: item
                .attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            quantity: item.quantity,
        }
    }
}
