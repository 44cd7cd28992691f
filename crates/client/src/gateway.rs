//! Storefront API gateway.
//!
//! The wire-level view of the cart and order endpoints. The manager talks
//! to the [`CartGateway`] trait; [`HttpCartGateway`] is the production
//! implementation, and tests substitute the generated mock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use tally::{
    attributes::VariantAttributes,
    cart::{Cart, CartLine, Discount},
    money::MinorUnits,
    summary::CheckoutSummary,
};

/// Errors talking to the backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure; safe to retry.
    #[error("request failed")]
    Http(#[from] reqwest::Error),

    /// The addressed resource does not exist.
    #[error("not found")]
    NotFound,

    /// The server refused the request.
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A server-held cart as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCart {
    pub uuid: Uuid,
    #[serde(default)]
    pub customer_uuid: Option<Uuid>,
    pub items: Vec<RemoteCartItem>,
    pub total_items: u64,
    pub subtotal: MinorUnits,
    pub total: MinorUnits,
    #[serde(default)]
    pub discount: Option<RemoteDiscount>,
}

/// One line of a server-held cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub product_uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub unit_price: MinorUnits,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub quantity: u32,
}

/// The discount recorded on a server-held cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDiscount {
    pub code: String,
    pub amount: MinorUnits,
}

impl RemoteCart {
    /// The local cart state this server response replaces.
    pub fn into_cart(self) -> Cart {
        let lines: Vec<CartLine> = self
            .items
            .into_iter()
            .map(|item| CartLine {
                product_uuid: item.product_uuid,
                name: item.name,
                image: item.image,
                unit_price: item.unit_price,
                attributes: item.attributes.into_iter().collect(),
                quantity: item.quantity,
            })
            .collect();

        Cart::from_lines(
            lines,
            self.discount.map(|discount| Discount {
                code: discount.code,
                amount: discount.amount,
            }),
        )
    }
}

/// A postal address as submitted at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Who is checking out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The finalized checkout submission sent to `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmission {
    pub uuid: Uuid,
    pub customer_uuid: Option<Uuid>,
    pub customer: CustomerInfo,
    pub items: Vec<OrderSubmissionItem>,
    pub billing: OrderSubmissionBilling,
    pub shipping: OrderSubmissionShipping,
    pub payment: OrderSubmissionPayment,
}

/// One cart line in the submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmissionItem {
    pub product_uuid: Uuid,
    pub quantity: u32,
    pub unit_price: MinorUnits,
    pub attributes: BTreeMap<String, String>,
}

/// Client-computed billing figures plus the billing address.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmissionBilling {
    pub subtotal: MinorUnits,
    pub shipping: MinorUnits,
    pub discount: MinorUnits,
    pub tax: MinorUnits,
    pub total: MinorUnits,
    pub address: Address,
}

/// Shipping block of the submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmissionShipping {
    pub address: Address,
    pub method: String,
}

/// Payment block of the submission; payment itself is simulated server-side.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmissionPayment {
    pub method: String,
}

impl OrderSubmissionBilling {
    /// Build the billing block from a computed summary.
    pub fn from_summary(summary: CheckoutSummary, address: Address) -> Self {
        Self {
            subtotal: summary.subtotal,
            shipping: summary.shipping,
            discount: summary.discount,
            tax: summary.tax,
            total: summary.total,
            address,
        }
    }
}

/// What the client needs from a created order to drive the confirmation
/// view.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfirmation {
    pub uuid: Uuid,
    pub order_number: String,
    pub status: String,
}

/// The cart/order operations of the storefront API.
#[automock]
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Fetch the cart bound to a customer, if one exists.
    async fn fetch_customer_cart(&self, customer: Uuid)
    -> Result<Option<RemoteCart>, GatewayError>;

    /// Create a cart, optionally bound to a customer. Returns its uuid.
    async fn create_cart(
        &self,
        cart: Uuid,
        customer: Option<Uuid>,
    ) -> Result<Uuid, GatewayError>;

    /// Add a line; the server freezes name/image/price and merges by
    /// `(product, attributes)` identity.
    async fn add_item(
        &self,
        cart: Uuid,
        product: Uuid,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<RemoteCart, GatewayError>;

    /// Set a line's quantity.
    async fn update_quantity(
        &self,
        cart: Uuid,
        product: Uuid,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<RemoteCart, GatewayError>;

    /// Remove a line.
    async fn remove_item(
        &self,
        cart: Uuid,
        product: Uuid,
        attributes: &VariantAttributes,
    ) -> Result<RemoteCart, GatewayError>;

    /// Delete the cart document and all of its lines.
    async fn delete_cart(&self, cart: Uuid) -> Result<(), GatewayError>;

    /// Apply a discount code; the response carries the recomputed totals.
    async fn apply_discount(&self, cart: Uuid, code: &str) -> Result<RemoteCart, GatewayError>;

    /// Submit a finalized checkout.
    async fn submit_order(
        &self,
        order: &OrderSubmission,
    ) -> Result<OrderConfirmation, GatewayError>;
}

/// Production gateway over the storefront JSON API. Holds the storefront's
/// API credential; customer identity travels in the resource paths.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl HttpCartGateway {
    /// A gateway for the API at `base_url` authenticating with `api_token`.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn attributes_body(attributes: &VariantAttributes) -> BTreeMap<String, String> {
        attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound);
    }

    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message: response.text().await.unwrap_or_default(),
    })
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    async fn fetch_customer_cart(
        &self,
        customer: Uuid,
    ) -> Result<Option<RemoteCart>, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/customers/{customer}/cart")))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match read_response(response).await {
            Ok(cart) => Ok(Some(cart)),
            Err(GatewayError::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create_cart(
        &self,
        cart: Uuid,
        customer: Option<Uuid>,
    ) -> Result<Uuid, GatewayError> {
        #[derive(Serialize)]
        struct Body {
            uuid: Uuid,
            customer_uuid: Option<Uuid>,
        }

        #[derive(Deserialize)]
        struct Created {
            uuid: Uuid,
        }

        let response = self
            .client
            .post(self.url("/carts"))
            .bearer_auth(&self.api_token)
            .json(&Body {
                uuid: cart,
                customer_uuid: customer,
            })
            .send()
            .await?;

        let created: Created = read_response(response).await?;

        Ok(created.uuid)
    }

    async fn add_item(
        &self,
        cart: Uuid,
        product: Uuid,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<RemoteCart, GatewayError> {
        #[derive(Serialize)]
        struct Body {
            product_uuid: Uuid,
            quantity: u32,
            attributes: BTreeMap<String, String>,
        }

        let response = self
            .client
            .post(self.url(&format!("/carts/{cart}/items")))
            .bearer_auth(&self.api_token)
            .json(&Body {
                product_uuid: product,
                quantity,
                attributes: Self::attributes_body(attributes),
            })
            .send()
            .await?;

        read_response(response).await
    }

    async fn update_quantity(
        &self,
        cart: Uuid,
        product: Uuid,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<RemoteCart, GatewayError> {
        #[derive(Serialize)]
        struct Body {
            quantity: u32,
            attributes: BTreeMap<String, String>,
        }

        let response = self
            .client
            .put(self.url(&format!("/carts/{cart}/items/{product}")))
            .bearer_auth(&self.api_token)
            .json(&Body {
                quantity,
                attributes: Self::attributes_body(attributes),
            })
            .send()
            .await?;

        read_response(response).await
    }

    async fn remove_item(
        &self,
        cart: Uuid,
        product: Uuid,
        attributes: &VariantAttributes,
    ) -> Result<RemoteCart, GatewayError> {
        #[derive(Serialize)]
        struct Body {
            attributes: BTreeMap<String, String>,
        }

        let response = self
            .client
            .delete(self.url(&format!("/carts/{cart}/items/{product}")))
            .bearer_auth(&self.api_token)
            .json(&Body {
                attributes: Self::attributes_body(attributes),
            })
            .send()
            .await?;

        read_response(response).await
    }

    async fn delete_cart(&self, cart: Uuid) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url(&format!("/carts/{cart}")))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }

        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }

    async fn apply_discount(&self, cart: Uuid, code: &str) -> Result<RemoteCart, GatewayError> {
        #[derive(Serialize)]
        struct Body<'a> {
            code: &'a str,
        }

        let response = self
            .client
            .post(self.url(&format!("/carts/{cart}/discount")))
            .bearer_auth(&self.api_token)
            .json(&Body { code })
            .send()
            .await?;

        read_response(response).await
    }

    async fn submit_order(
        &self,
        order: &OrderSubmission,
    ) -> Result<OrderConfirmation, GatewayError> {
        let response = self
            .client
            .post(self.url("/orders"))
            .bearer_auth(&self.api_token)
            .json(order)
            .send()
            .await?;

        read_response(response).await
    }
}
