//! Orders service.
//!
//! Order assembly accepts a finalized cart snapshot and produces exactly one
//! immutable order, or fails without writing anything. Billing figures are
//! re-derived from authoritative product prices; the client-submitted ones
//! are only accepted when they reconcile.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use tally::{
    money::MinorUnits,
    order::{OrderStatus, PaymentStatus},
    summary::CheckoutSummary,
};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            models::{NewOrder, Order, OrderItemUuid, OrderUuid},
            repository::{OrderInsert, OrderItemInsert, PgOrdersRepository},
        },
        tenants::models::TenantUuid,
    },
};

/// Allowance per billing figure when comparing client-submitted against
/// server-derived amounts, covering client-side rounding of tax.
const PRICE_TOLERANCE: MinorUnits = 1;

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

fn validate(order: &NewOrder) -> Result<(), OrdersServiceError> {
    if order.items.is_empty() {
        return Err(OrdersServiceError::EmptyOrder);
    }

    if order.items.iter().any(|item| item.quantity == 0) {
        return Err(OrdersServiceError::InvalidQuantity);
    }

    if order.customer.name.trim().is_empty() {
        return Err(OrdersServiceError::MissingRequiredData("customer name"));
    }

    if order.customer.email.trim().is_empty() {
        return Err(OrdersServiceError::MissingRequiredData("customer email"));
    }

    if !order.shipping_address.is_complete() {
        return Err(OrdersServiceError::MissingRequiredData("shipping address"));
    }

    if !order.billing_address.is_complete() {
        return Err(OrdersServiceError::MissingRequiredData("billing address"));
    }

    if order.payment_method.trim().is_empty() {
        return Err(OrdersServiceError::MissingRequiredData("payment method"));
    }

    Ok(())
}

fn generate_order_number() -> String {
    format!("ord_{}", Uuid::now_v7().simple())
}

fn simulate_transaction_id() -> String {
    format!("sim_{}", Uuid::now_v7().simple())
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(
        &self,
        tenant: TenantUuid,
        order: NewOrder,
    ) -> Result<Order, OrdersServiceError> {
        validate(&order)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // Re-derive the authoritative figures from live product records; a
        // stale or tampered client snapshot must not buy at the wrong price.
        let mut snapshots = Vec::with_capacity(order.items.len());
        let mut subtotal: MinorUnits = 0;

        for item in &order.items {
            let snapshot = self
                .repository
                .resolve_product(&mut tx, item.product_uuid)
                .await?
                .ok_or(OrdersServiceError::InvalidReference)?;

            subtotal = subtotal.saturating_add(
                snapshot
                    .effective_price()
                    .saturating_mul(MinorUnits::from(item.quantity)),
            );

            snapshots.push(snapshot);
        }

        let derived = CheckoutSummary::from_parts(
            subtotal,
            order.shipping_method.rate(),
            order.billing.discount.min(subtotal),
            order.billing.tax,
        );

        if !derived.reconciles_with(&order.billing, PRICE_TOLERANCE) {
            return Err(OrdersServiceError::PriceMismatch {
                submitted: order.billing,
                derived,
            });
        }

        let order_number = generate_order_number();
        let transaction_id = simulate_transaction_id();

        let mut created = self
            .repository
            .create_order(
                &mut tx,
                &OrderInsert {
                    uuid: order.uuid,
                    order_number: &order_number,
                    customer_uuid: order.customer_uuid,
                    customer: &order.customer,
                    status: OrderStatus::Pending,
                    billing: derived,
                    billing_address: &order.billing_address,
                    shipping_address: &order.shipping_address,
                    shipping_method: order.shipping_method,
                    payment_method: &order.payment_method,
                    payment_transaction: &transaction_id,
                    payment_status: PaymentStatus::Pending,
                },
            )
            .await?;

        for (item, snapshot) in order.items.iter().zip(&snapshots) {
            let persisted = self
                .repository
                .create_order_item(
                    &mut tx,
                    created.uuid,
                    &OrderItemInsert {
                        uuid: OrderItemUuid::new(),
                        snapshot,
                        unit_price: snapshot.effective_price(),
                        quantity: item.quantity,
                        attributes: &item.attributes,
                    },
                )
                .await?;

            created.items.push(persisted);
        }

        tx.commit().await?;

        info!(
            order_number = %created.order_number,
            total = created.billing.total,
            "created order"
        );

        Ok(created)
    }

    async fn get_order(
        &self,
        tenant: TenantUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let mut found = self.repository.get_order(&mut tx, order).await?;

        let items = self.repository.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        found.items.extend(items);

        Ok(found)
    }

    async fn list_orders(&self, tenant: TenantUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let orders = self.repository.list_orders(&mut tx).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn update_status(
        &self,
        tenant: TenantUuid,
        order: OrderUuid,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self.repository.get_order(&mut tx, order).await?;

        current.status.transition(status)?;

        let mut updated = self
            .repository
            .update_order_status(&mut tx, order, status, tracking_number.as_deref())
            .await?;

        let items = self.repository.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        info!(order_number = %updated.order_number, status = %status, "order status updated");

        updated.items.extend(items);

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validates a checkout submission and persists exactly one order, or
    /// fails without partial writes.
    async fn create_order(
        &self,
        tenant: TenantUuid,
        order: NewOrder,
    ) -> Result<Order, OrdersServiceError>;

    /// Retrieve a single order with its item snapshots.
    async fn get_order(
        &self,
        tenant: TenantUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// Retrieve all of the tenant's orders, newest first, without items.
    async fn list_orders(&self, tenant: TenantUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Apply a status transition, optionally attaching a tracking number.
    async fn update_status(
        &self,
        tenant: TenantUuid,
        order: OrderUuid,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, OrdersServiceError>;
}
