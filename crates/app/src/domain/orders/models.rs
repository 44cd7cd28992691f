//! Order Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tally::{
    attributes::VariantAttributes,
    money::MinorUnits,
    order::{OrderStatus, PaymentStatus},
    summary::{CheckoutSummary, ShippingMethod},
};
use uuid::Uuid;

use crate::{domain::products::models::ProductUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Postal address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Whether every required field is present and non-blank.
    pub fn is_complete(&self) -> bool {
        ![&self.line1, &self.city, &self.postal_code, &self.country]
            .into_iter()
            .any(|field| field.trim().is_empty())
    }
}

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Shipping block of a persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub address: Address,
    pub method: ShippingMethod,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<Timestamp>,
}

/// Payment block of a persisted order. Payment is simulated: the transaction
/// id is generated at creation and the status starts pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
}

/// Order Model
///
/// Immutable after creation except `status` and the shipping tracking
/// number. Items and billing figures are snapshots, fully decoupled from
/// live product and cart state.
#[derive(Debug, Clone)]
pub struct Order {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub customer_uuid: Option<Uuid>,
    pub customer: CustomerDetails,
    pub status: OrderStatus,
    pub billing: CheckoutSummary,
    pub billing_address: Address,
    pub shipping: ShippingDetails,
    pub payment: PaymentDetails,
    pub items: Vec<OrderItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// OrderItem Model
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub product_uuid: Uuid,
    pub product_name: String,
    pub product_image: Option<String>,
    pub sku: Option<String>,
    pub unit_price: MinorUnits,
    pub quantity: u32,
    pub attributes: VariantAttributes,
}

/// New Order Model: the finalized checkout submission.
///
/// `billing` holds the client-computed figures; the service re-derives the
/// authoritative ones from product records and rejects mismatches.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer_uuid: Option<Uuid>,
    pub customer: CustomerDetails,
    pub items: Vec<NewOrderItem>,
    pub billing: CheckoutSummary,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub shipping_method: ShippingMethod,
    pub payment_method: String,
}

/// New Order Item Model: one line of the submitted cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: MinorUnits,
    pub attributes: VariantAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_completeness_requires_the_four_core_fields() {
        let address = Address {
            line1: "1 High Street".to_string(),
            line2: None,
            city: "London".to_string(),
            region: None,
            postal_code: "N1 9GU".to_string(),
            country: "GB".to_string(),
        };

        assert!(address.is_complete());

        let blank_city = Address {
            city: "  ".to_string(),
            ..address
        };

        assert!(!blank_city.is_complete());
    }
}
