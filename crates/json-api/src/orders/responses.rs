//! Order response bodies shared by the order handlers.

use std::collections::BTreeMap;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::orders::models::{Address, Order, OrderItem};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// Server-assigned, unique per tenant
    pub order_number: String,

    pub customer_uuid: Option<Uuid>,

    pub customer: CustomerResponse,

    /// `pending | processing | shipped | delivered | cancelled`
    pub status: String,

    pub billing: BillingResponse,

    pub shipping: ShippingResponse,

    pub payment: PaymentResponse,

    /// Item snapshots, decoupled from live product state
    pub items: Vec<OrderItemResponse>,

    pub created_at: String,

    pub updated_at: String,
}

/// Order Customer Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerResponse {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Order Billing Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BillingResponse {
    /// All amounts in minor units
    pub subtotal: u64,
    pub shipping: u64,
    pub discount: u64,
    pub tax: u64,
    pub total: u64,
    pub address: AddressResponse,
}

/// Order Shipping Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingResponse {
    pub address: AddressResponse,
    /// `standard | express`
    pub method: String,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
}

/// Order Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub method: String,
    pub transaction_id: String,
    /// `pending | paid | failed`
    pub status: String,
}

/// Order Address Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddressResponse {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub product_name: String,
    pub product_image: Option<String>,
    pub sku: Option<String>,
    /// Unit price in minor units, frozen at order creation
    pub unit_price: u64,
    pub quantity: u32,
    pub attributes: BTreeMap<String, String>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            region: address.region,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid,
            product_name: item.product_name,
            product_image: item.product_image,
            sku: item.sku,
            unit_price: item.unit_price,
            quantity: item.quantity,
            attributes: item
                .attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            order_number: order.order_number,
            customer_uuid: order.customer_uuid,
            customer: CustomerResponse {
                name: order.customer.name,
                email: order.customer.email,
                phone: order.customer.phone,
            },
            status: order.status.to_string(),
            billing: BillingResponse {
                subtotal: order.billing.subtotal,
                shipping: order.billing.shipping,
                discount: order.billing.discount,
                tax: order.billing.tax,
                total: order.billing.total,
                address: order.billing_address.into(),
            },
            shipping: ShippingResponse {
                address: order.shipping.address.into(),
                method: order.shipping.method.as_str().to_string(),
                tracking_number: order.shipping.tracking_number,
                estimated_delivery: order
                    .shipping
                    .estimated_delivery
                    .as_ref()
                    .map(ToString::to_string),
            },
            payment: PaymentResponse {
                method: order.payment.method,
                transaction_id: order.payment.transaction_id,
                status: order.payment.status.to_string(),
            },
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}
