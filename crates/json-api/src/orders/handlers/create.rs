//! Create Order Handler

use std::collections::BTreeMap;
use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally::summary::{CheckoutSummary, ShippingMethod};
use tally_app::domain::orders::models::{
    Address, CustomerDetails, NewOrder, NewOrderItem,
};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Create Order Request: the finalized checkout submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub uuid: Uuid,

    #[serde(default)]
    pub customer_uuid: Option<Uuid>,

    pub customer: CustomerRequest,

    pub items: Vec<OrderItemRequest>,

    /// Client-computed billing figures, re-derived and checked server-side
    pub billing: BillingRequest,

    pub shipping: ShippingRequest,

    pub payment: PaymentRequest,
}

/// Order Customer Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Order Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemRequest {
    pub product_uuid: Uuid,
    pub quantity: u32,
    /// Unit price the client's cart snapshot carried, in minor units
    pub unit_price: u64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Order Billing Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BillingRequest {
    pub subtotal: u64,
    pub shipping: u64,
    #[serde(default)]
    pub discount: u64,
    #[serde(default)]
    pub tax: u64,
    pub total: u64,
    pub address: AddressRequest,
}

/// Order Shipping Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingRequest {
    pub address: AddressRequest,
    /// `standard | express`
    pub method: String,
}

/// Order Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentRequest {
    pub method: String,
}

/// Order Address Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddressRequest {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl From<AddressRequest> for Address {
    fn from(request: AddressRequest) -> Self {
        Self {
            line1: request.line1,
            line2: request.line2,
            city: request.city,
            region: request.region,
            postal_code: request.postal_code,
            country: request.country,
        }
    }
}

fn into_new_order(
    request: CreateOrderRequest,
    method: ShippingMethod,
) -> NewOrder {
    NewOrder {
        uuid: request.uuid.into(),
        customer_uuid: request.customer_uuid,
        customer: CustomerDetails {
            name: request.customer.name,
            email: request.customer.email,
            phone: request.customer.phone,
        },
        items: request
            .items
            .into_iter()
            .map(|item| NewOrderItem {
                product_uuid: item.product_uuid.into(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                attributes: item.attributes.into_iter().collect(),
            })
            .collect(),
        billing: CheckoutSummary {
            subtotal: request.billing.subtotal,
            shipping: request.billing.shipping,
            discount: request.billing.discount,
            tax: request.billing.tax,
            total: request.billing.total,
        },
        billing_address: request.billing.address.into(),
        shipping_address: request.shipping.address.into(),
        shipping_method: method,
        payment_method: request.payment.method,
    }
}

/// Create Order Handler
///
/// Validates the submission, re-derives billing totals from authoritative
/// product prices, and persists exactly one immutable order.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid or incomplete submission"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Billing figures do not reconcile"),
        (status_code = StatusCode::CONFLICT, description = "Order already exists"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;
    let request = json.into_inner();

    let method: ShippingMethod = request
        .shipping
        .method
        .parse()
        .or_400("unknown shipping method")?;

    let order = state
        .app
        .orders
        .create_order(tenant, into_new_order(request, method))
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
