//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::debug;
use tally::{attributes::VariantAttributes, cart::Discount};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartUuid, NewCart, NewCartItem},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        discounts::repository::PgDiscountCodesRepository,
        products::models::ProductUuid,
        tenants::models::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    discounts_repository: PgDiscountCodesRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            discounts_repository: PgDiscountCodesRepository::new(),
        }
    }

    /// Fresh cart state after a mutation in the same transaction.
    async fn current_cart_with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut current = self.carts_repository.current_cart(tx, cart).await?;

        let items = self.items_repository.current_cart_items(tx, cart).await?;

        current.items.extend(items);

        Ok(current)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let mut found = self
            .carts_repository
            .get_cart(&mut tx, cart, point_in_time)
            .await?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart, point_in_time)
            .await?;

        tx.commit().await?;

        found.items.extend(items);

        Ok(found)
    }

    async fn find_customer_cart(
        &self,
        tenant: TenantUuid,
        customer: Uuid,
        point_in_time: Timestamp,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let mut found = self
            .carts_repository
            .find_customer_cart(&mut tx, customer, point_in_time)
            .await?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, found.uuid, point_in_time)
            .await?;

        tx.commit().await?;

        found.items.extend(items);

        Ok(found)
    }

    async fn create_cart(
        &self,
        tenant: TenantUuid,
        cart: NewCart,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .carts_repository
            .create_cart(&mut tx, cart.uuid, cart.customer_uuid)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_cart(&self, tenant: TenantUuid, cart: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self.carts_repository.delete_cart(&mut tx, cart).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn add_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<Cart, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // The line freezes name/image/price at add time; a missing or
        // deleted product cannot be added.
        let snapshot = self
            .items_repository
            .product_snapshot(&mut tx, item.product_uuid)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        self.items_repository
            .upsert_cart_item(
                &mut tx,
                cart,
                item.uuid,
                &snapshot,
                &item.attributes,
                item.quantity,
            )
            .await?;

        let updated = self.current_cart_with_items(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn update_item_quantity(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        product: ProductUuid,
        attributes: VariantAttributes,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // A missing line is a no-op: removal is an explicit operation, and
        // the caller still gets the authoritative cart back.
        self.items_repository
            .update_item_quantity(&mut tx, cart, product, &attributes, quantity)
            .await?;

        let updated = self.current_cart_with_items(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn remove_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        product: ProductUuid,
        attributes: VariantAttributes,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.items_repository
            .delete_cart_item(&mut tx, cart, product, &attributes)
            .await?;

        let updated = self.current_cart_with_items(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn apply_discount(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        code: String,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let discount_code = self
            .discounts_repository
            .find_code(&mut tx, &code)
            .await?
            .filter(|code| code.is_active_at(Timestamp::now()))
            .ok_or(CartsServiceError::UnknownDiscountCode)?;

        let current = self.carts_repository.current_cart(&mut tx, cart).await?;

        let amount = discount_code.amount_for(current.subtotal);
        let discount = Discount {
            code: discount_code.code,
            amount,
        };

        self.carts_repository
            .set_discount(&mut tx, cart, Some(&discount))
            .await?;

        let updated = self.current_cart_with_items(&mut tx, cart).await?;

        tx.commit().await?;

        debug!(cart = %cart, code = %discount.code, amount = discount.amount, "applied discount");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a single cart with its items and derived totals.
    async fn get_cart(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<Cart, CartsServiceError>;

    /// Retrieve the cart bound to an authenticated customer.
    async fn find_customer_cart(
        &self,
        tenant: TenantUuid,
        customer: Uuid,
        point_in_time: Timestamp,
    ) -> Result<Cart, CartsServiceError>;

    /// Creates a new cart, optionally bound to a customer.
    async fn create_cart(&self, tenant: TenantUuid, cart: NewCart)
    -> Result<Cart, CartsServiceError>;

    /// Deletes a cart and all of its lines.
    async fn delete_cart(&self, tenant: TenantUuid, cart: CartUuid)
    -> Result<(), CartsServiceError>;

    /// Add a product to the cart, merging onto the existing line when the
    /// `(product, attributes)` identity is already present.
    async fn add_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<Cart, CartsServiceError>;

    /// Set the quantity of the matching line. Zero is rejected; a missing
    /// line leaves the cart unchanged.
    async fn update_item_quantity(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        product: ProductUuid,
        attributes: VariantAttributes,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Delete the matching line entirely.
    async fn remove_item(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        product: ProductUuid,
        attributes: VariantAttributes,
    ) -> Result<Cart, CartsServiceError>;

    /// Validate a discount code and apply it to the cart totals.
    async fn apply_discount(
        &self,
        tenant: TenantUuid,
        cart: CartUuid,
        code: String,
    ) -> Result<Cart, CartsServiceError>;
}
