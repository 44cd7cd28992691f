//! Product Models

use jiff::Timestamp;
use tally::{money::MinorUnits, products::ProductSnapshot};

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product Model
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub price: MinorUnits,
    pub sale_price: Option<MinorUnits>,
    pub inventory_quantity: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Product {
    /// The pricing/display snapshot carts and orders freeze at add time.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            uuid: self.uuid.into_uuid(),
            name: self.name.clone(),
            sku: self.sku.clone(),
            image: self.image.clone(),
            price: self.price,
            sale_price: self.sale_price,
        }
    }
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub price: MinorUnits,
    pub sale_price: Option<MinorUnits>,
    pub inventory_quantity: u64,
}

/// Product Update Model
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub price: MinorUnits,
    pub sale_price: Option<MinorUnits>,
    pub inventory_quantity: u64,
}
