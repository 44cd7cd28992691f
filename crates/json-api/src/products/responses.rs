//! Product response bodies shared by the product handlers.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::products::models::Product;

/// Product Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub uuid: Uuid,

    pub name: String,

    pub sku: Option<String>,

    pub image: Option<String>,

    /// Regular unit price in minor units
    pub price: u64,

    /// Sale price in minor units; carts freeze this when present
    pub sale_price: Option<u64>,

    pub inventory_quantity: u64,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            uuid: product.uuid.into_uuid(),
            name: product.name,
            sku: product.sku,
            image: product.image,
            price: product.price,
            sale_price: product.sale_price,
            inventory_quantity: product.inventory_quantity,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}
