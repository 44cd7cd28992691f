//! Cart State Manager
//!
//! Owns the single authoritative in-memory cart for the current session and
//! keeps it synchronized with either the local store (guest) or the
//! server-held cart (authenticated), never both at once.

use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use tally::{
    attributes::VariantAttributes,
    cart::Cart,
    products::ProductSnapshot,
    summary::{CheckoutSummary, ShippingMethod},
};

use crate::{
    errors::CartError,
    gateway::{
        Address, CartGateway, CustomerInfo, OrderConfirmation, OrderSubmission,
        OrderSubmissionBilling, OrderSubmissionItem, OrderSubmissionPayment,
        OrderSubmissionShipping,
    },
    session::Session,
    storage::LocalStore,
};

/// Everything checkout needs beyond the cart itself.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub customer: CustomerInfo,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub shipping_method: ShippingMethod,
    /// Tax rate in whole points, e.g. `Decimal::from(8)` for 8%.
    pub tax_rate: Decimal,
    pub payment_method: String,
}

/// The session-scoped cart manager.
pub struct CartManager<G> {
    gateway: G,
    store: LocalStore,
    session: Session,
    remote_cart: Option<Uuid>,
    cart: Cart,
}

impl<G: CartGateway> CartManager<G> {
    /// Start a guest session, restoring any cart the local store holds.
    /// A corrupt or unreadable store is treated as an empty cart.
    pub fn new(gateway: G, store: LocalStore) -> Self {
        let cart = match store.load() {
            Ok(cart) => cart.unwrap_or_default(),
            Err(error) => {
                warn!("discarding unreadable guest cart: {error}");

                Cart::new()
            }
        };

        Self {
            gateway,
            store,
            session: Session::Guest,
            remote_cart: None,
            cart,
        }
    }

    /// The current cart state.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The current session.
    pub fn session(&self) -> Session {
        self.session
    }

    /// Transition from guest to authenticated.
    ///
    /// The guest cart is discarded, not merged: local state is dropped and
    /// the customer's server-held cart (created empty when absent) becomes
    /// authoritative. Merge-vs-replace is a recorded product decision.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when the server cart cannot be fetched or
    /// created; the session is left unchanged.
    pub async fn begin_session(&mut self, customer: Uuid) -> Result<&Cart, CartError> {
        let (remote_uuid, cart) = match self.gateway.fetch_customer_cart(customer).await? {
            Some(remote) => (remote.uuid, remote.into_cart()),
            None => {
                let uuid = self
                    .gateway
                    .create_cart(Uuid::now_v7(), Some(customer))
                    .await?;

                (uuid, Cart::new())
            }
        };

        if let Err(error) = self.store.clear() {
            warn!("failed to drop guest cart document: {error}");
        }

        self.session = Session::Authenticated { customer };
        self.remote_cart = Some(remote_uuid);
        self.cart = cart;

        Ok(&self.cart)
    }

    /// Return to a fresh guest session.
    pub fn end_session(&mut self) {
        self.session = Session::Guest;
        self.remote_cart = None;
        self.cart = Cart::new();
    }

    /// Add a product to the cart, freezing name/image/price at call time.
    /// Same-identity adds merge into the existing line.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive quantity or a failed backend
    /// upsert; on backend failure the local cart is unchanged.
    pub async fn add_item(
        &mut self,
        product: &ProductSnapshot,
        quantity: u32,
        attributes: VariantAttributes,
    ) -> Result<&Cart, CartError> {
        if let Some(remote) = self.active_remote_cart() {
            if quantity == 0 {
                return Err(tally::cart::CartError::InvalidQuantity.into());
            }

            let updated = self
                .gateway
                .add_item(remote, product.uuid, quantity, &attributes)
                .await?;

            self.cart = updated.into_cart();
        } else {
            self.cart.add_item(product, quantity, attributes)?;
            self.persist_guest_cart();
        }

        Ok(&self.cart)
    }

    /// Set the quantity of the matching line. Zero is rejected; a missing
    /// line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive quantity or a failed backend
    /// update.
    pub async fn update_quantity(
        &mut self,
        product: Uuid,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<&Cart, CartError> {
        if let Some(remote) = self.active_remote_cart() {
            if quantity == 0 {
                return Err(tally::cart::CartError::InvalidQuantity.into());
            }

            let updated = self
                .gateway
                .update_quantity(remote, product, quantity, attributes)
                .await?;

            self.cart = updated.into_cart();
        } else {
            self.cart.update_quantity(product, quantity, attributes)?;
            self.persist_guest_cart();
        }

        Ok(&self.cart)
    }

    /// Delete the matching line entirely; a missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend removal fails.
    pub async fn remove_item(
        &mut self,
        product: Uuid,
        attributes: &VariantAttributes,
    ) -> Result<&Cart, CartError> {
        if let Some(remote) = self.active_remote_cart() {
            let updated = self.gateway.remove_item(remote, product, attributes).await?;

            self.cart = updated.into_cart();
        } else {
            self.cart.remove_item(product, attributes);
            self.persist_guest_cart();
        }

        Ok(&self.cart)
    }

    /// Empty the cart. Authenticated sessions also delete the server-held
    /// cart document.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend deletion fails; local state is
    /// only cleared once the backend has agreed.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        if let Some(remote) = self.active_remote_cart() {
            self.gateway.delete_cart(remote).await?;
            self.remote_cart = None;
        }

        self.cart.clear();
        self.persist_guest_cart();

        Ok(())
    }

    /// Apply a discount code. Guests are directed to sign in; authenticated
    /// carts adopt the server-computed totals.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DiscountRequiresAccount`] for guest sessions
    /// (cart unchanged) or a gateway error when the code is rejected.
    pub async fn apply_discount(&mut self, code: &str) -> Result<&Cart, CartError> {
        let Some(remote) = self.active_remote_cart() else {
            return Err(CartError::DiscountRequiresAccount);
        };

        let updated = self.gateway.apply_discount(remote, code).await?;

        self.cart = updated.into_cart();

        Ok(&self.cart)
    }

    /// Submit the cart as an order.
    ///
    /// The summary (subtotal, shipping, tax, discount, total) is computed
    /// here and submitted alongside the line snapshots; the server
    /// re-derives and checks it. On success the cart is cleared; on any
    /// failure it is left intact so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty cart or a rejected/failed submission.
    pub async fn checkout(
        &mut self,
        input: CheckoutInput,
    ) -> Result<OrderConfirmation, CartError> {
        if self.cart.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let summary = CheckoutSummary::compute(&self.cart, input.shipping_method, input.tax_rate);

        let customer_uuid = match self.session {
            Session::Authenticated { customer } => Some(customer),
            Session::Guest => None,
        };

        let submission = OrderSubmission {
            uuid: Uuid::now_v7(),
            customer_uuid,
            customer: input.customer,
            items: self
                .cart
                .lines()
                .iter()
                .map(|line| OrderSubmissionItem {
                    product_uuid: line.product_uuid,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    attributes: line
                        .attributes
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                })
                .collect(),
            billing: OrderSubmissionBilling::from_summary(summary, input.billing_address),
            shipping: OrderSubmissionShipping {
                address: input.shipping_address,
                method: input.shipping_method.as_str().to_string(),
            },
            payment: OrderSubmissionPayment {
                method: input.payment_method,
            },
        };

        let confirmation = self.gateway.submit_order(&submission).await?;

        // Only a confirmed order empties the cart.
        self.clear().await?;

        Ok(confirmation)
    }

    fn active_remote_cart(&self) -> Option<Uuid> {
        self.session.is_authenticated().then_some(self.remote_cart).flatten()
    }

    /// Guest persistence is best-effort: a failed write is logged, not
    /// surfaced, and never blocks the in-memory state change.
    fn persist_guest_cart(&self) {
        if self.session.is_authenticated() {
            return;
        }

        if let Err(error) = self.store.save(&self.cart) {
            warn!("failed to persist guest cart: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::gateway::{MockCartGateway, RemoteCart, RemoteCartItem};

    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = LocalStore::new(dir.path().join("cart.json"));

        (dir, store)
    }

    fn product(price: u64) -> ProductSnapshot {
        ProductSnapshot {
            uuid: Uuid::now_v7(),
            name: "Widget".to_string(),
            sku: None,
            image: None,
            price,
            sale_price: None,
        }
    }

    fn remote_cart(uuid: Uuid, quantity: u32, unit_price: u64) -> RemoteCart {
        RemoteCart {
            uuid,
            customer_uuid: None,
            items: vec![RemoteCartItem {
                product_uuid: Uuid::now_v7(),
                name: "Server Widget".to_string(),
                image: None,
                unit_price,
                attributes: Default::default(),
                quantity,
            }],
            total_items: u64::from(quantity),
            subtotal: unit_price * u64::from(quantity),
            total: unit_price * u64::from(quantity),
            discount: None,
        }
    }

    fn checkout_input() -> CheckoutInput {
        let address = Address {
            line1: "1 High Street".to_string(),
            line2: None,
            city: "London".to_string(),
            region: None,
            postal_code: "N1 9GU".to_string(),
            country: "GB".to_string(),
        };

        CheckoutInput {
            customer: CustomerInfo {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
            },
            billing_address: address.clone(),
            shipping_address: address,
            shipping_method: ShippingMethod::Standard,
            tax_rate: Decimal::ZERO,
            payment_method: "card".to_string(),
        }
    }

    #[tokio::test]
    async fn guest_operations_track_totals_locally() -> TestResult {
        let (_dir, store) = store();
        let mut manager = CartManager::new(MockCartGateway::new(), store);

        let widget = product(20_00);

        manager.add_item(&widget, 2, VariantAttributes::none()).await?;
        manager
            .add_item(&widget, 1, [("color", "red")].into_iter().collect())
            .await?;

        assert_eq!(manager.cart().lines().len(), 2);
        assert_eq!(manager.cart().total_items(), 3);
        assert_eq!(manager.cart().subtotal(), 60_00);

        manager
            .update_quantity(widget.uuid, 5, &VariantAttributes::none())
            .await?;
        manager
            .remove_item(widget.uuid, &[("color", "red")].into_iter().collect())
            .await?;

        assert_eq!(manager.cart().total_items(), 5);
        assert_eq!(manager.cart().total(), 100_00);

        Ok(())
    }

    #[tokio::test]
    async fn guest_cart_survives_manager_restart() -> TestResult {
        let (_dir, store) = store();

        {
            let mut manager = CartManager::new(MockCartGateway::new(), store.clone());
            manager.add_item(&product(15_00), 1, VariantAttributes::none()).await?;
        }

        let restarted = CartManager::new(MockCartGateway::new(), store);

        assert_eq!(restarted.cart().total_items(), 1);
        assert_eq!(restarted.cart().total(), 15_00);

        Ok(())
    }

    #[tokio::test]
    async fn guest_update_to_zero_is_rejected() -> TestResult {
        let (_dir, store) = store();
        let mut manager = CartManager::new(MockCartGateway::new(), store);

        let widget = product(10_00);
        manager.add_item(&widget, 2, VariantAttributes::none()).await?;

        let result = manager
            .update_quantity(widget.uuid, 0, &VariantAttributes::none())
            .await;

        assert!(
            matches!(result, Err(CartError::State(_))),
            "expected a quantity rejection"
        );
        assert_eq!(manager.cart().total_items(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn guest_discount_is_refused_and_cart_unchanged() -> TestResult {
        let (_dir, store) = store();
        let mut manager = CartManager::new(MockCartGateway::new(), store);

        manager.add_item(&product(40_00), 1, VariantAttributes::none()).await?;

        let result = manager.apply_discount("WELCOME").await;

        assert!(
            matches!(result, Err(CartError::DiscountRequiresAccount)),
            "guests must be directed to sign in"
        );
        assert_eq!(manager.cart().total(), 40_00);
        assert!(manager.cart().discount().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn signing_in_replaces_guest_cart_with_server_cart() -> TestResult {
        let (_dir, store) = store();
        let customer = Uuid::now_v7();
        let server_cart_uuid = Uuid::now_v7();

        let mut gateway = MockCartGateway::new();

        gateway
            .expect_fetch_customer_cart()
            .once()
            .with(eq(customer))
            .return_once(move |_| Ok(Some(remote_cart(server_cart_uuid, 3, 10_00))));

        let mut manager = CartManager::new(gateway, store.clone());

        // Guest accumulates a cart that will be discarded, not merged.
        manager.add_item(&product(99_00), 1, VariantAttributes::none()).await?;

        manager.begin_session(customer).await?;

        assert!(manager.session().is_authenticated());
        assert_eq!(manager.cart().total_items(), 3);
        assert_eq!(manager.cart().total(), 30_00);
        assert!(
            store.load()?.is_none(),
            "guest cart document should be dropped on sign-in"
        );

        Ok(())
    }

    #[tokio::test]
    async fn signing_in_without_a_server_cart_creates_one() -> TestResult {
        let (_dir, store) = store();
        let customer = Uuid::now_v7();

        let mut gateway = MockCartGateway::new();

        gateway
            .expect_fetch_customer_cart()
            .once()
            .return_once(|_| Ok(None));

        gateway
            .expect_create_cart()
            .once()
            .withf(move |_, bound_customer| *bound_customer == Some(customer))
            .return_once(|cart, _| Ok(cart));

        let mut manager = CartManager::new(gateway, store);

        manager.begin_session(customer).await?;

        assert!(manager.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn authenticated_add_adopts_the_server_response() -> TestResult {
        let (_dir, store) = store();
        let customer = Uuid::now_v7();
        let server_cart_uuid = Uuid::now_v7();

        let mut gateway = MockCartGateway::new();

        gateway
            .expect_fetch_customer_cart()
            .once()
            .return_once(move |_| Ok(Some(remote_cart(server_cart_uuid, 1, 10_00))));

        let widget = product(10_00);
        let product_uuid = widget.uuid;

        gateway
            .expect_add_item()
            .once()
            .withf(move |cart, product, quantity, _| {
                *cart == server_cart_uuid && *product == product_uuid && *quantity == 2
            })
            .return_once(move |cart, _, _, _| Ok(remote_cart(cart, 3, 10_00)));

        let mut manager = CartManager::new(gateway, store);

        manager.begin_session(customer).await?;
        manager.add_item(&widget, 2, VariantAttributes::none()).await?;

        assert_eq!(manager.cart().total_items(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn failed_backend_mutation_surfaces_and_leaves_cart_intact() -> TestResult {
        let (_dir, store) = store();
        let customer = Uuid::now_v7();
        let server_cart_uuid = Uuid::now_v7();

        let mut gateway = MockCartGateway::new();

        gateway
            .expect_fetch_customer_cart()
            .once()
            .return_once(move |_| Ok(Some(remote_cart(server_cart_uuid, 2, 10_00))));

        gateway.expect_add_item().once().return_once(|_, _, _, _| {
            Err(crate::gateway::GatewayError::Rejected {
                status: 500,
                message: "boom".to_string(),
            })
        });

        let mut manager = CartManager::new(gateway, store);

        manager.begin_session(customer).await?;

        let result = manager
            .add_item(&product(10_00), 1, VariantAttributes::none())
            .await;

        assert!(
            matches!(result, Err(CartError::Gateway(_))),
            "backend failures must surface, not vanish"
        );
        assert_eq!(manager.cart().total_items(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_submits_summary_and_clears_cart_on_success() -> TestResult {
        let (_dir, store) = store();

        let mut gateway = MockCartGateway::new();

        gateway
            .expect_submit_order()
            .once()
            .withf(|submission| {
                submission.items.len() == 1
                    && submission.billing.subtotal == 30_00
                    && submission.billing.shipping == 5_00
                    && submission.billing.total == 35_00
            })
            .return_once(|submission| {
                Ok(OrderConfirmation {
                    uuid: submission.uuid,
                    order_number: "ord_123".to_string(),
                    status: "pending".to_string(),
                })
            });

        let mut manager = CartManager::new(gateway, store.clone());

        manager.add_item(&product(15_00), 2, VariantAttributes::none()).await?;

        let confirmation = manager.checkout(checkout_input()).await?;

        assert_eq!(confirmation.order_number, "ord_123");
        assert!(manager.cart().is_empty(), "confirmed orders empty the cart");

        Ok(())
    }

    #[tokio::test]
    async fn failed_checkout_leaves_cart_intact_for_retry() -> TestResult {
        let (_dir, store) = store();

        let mut gateway = MockCartGateway::new();

        gateway.expect_submit_order().once().return_once(|_| {
            Err(crate::gateway::GatewayError::Rejected {
                status: 422,
                message: "price mismatch".to_string(),
            })
        });

        let mut manager = CartManager::new(gateway, store);

        manager.add_item(&product(15_00), 2, VariantAttributes::none()).await?;

        let result = manager.checkout(checkout_input()).await;

        assert!(result.is_err(), "the rejection must surface");
        assert_eq!(
            manager.cart().total_items(),
            2,
            "the cart must stay intact for retry"
        );

        Ok(())
    }

    #[tokio::test]
    async fn checkout_of_an_empty_cart_is_rejected() -> TestResult {
        let (_dir, store) = store();
        let mut manager = CartManager::new(MockCartGateway::new(), store);

        let result = manager.checkout(checkout_input()).await;

        assert!(
            matches!(result, Err(CartError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }
}
