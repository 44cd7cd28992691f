//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use tally::{
    order::{OrderStatus, PaymentStatus},
    summary::{CheckoutSummary, ShippingMethod},
};
use tally_app::{
    auth::MockAuthService,
    context::AppContext,
    domain::{
        carts::{MockCartsService, models::Cart, models::CartUuid},
        discounts::MockDiscountsService,
        orders::{
            MockOrdersService,
            models::{Address, CustomerDetails, Order, OrderUuid, PaymentDetails, ShippingDetails},
        },
        products::{MockProductsService, models::Product, models::ProductUuid},
        tenants::models::TenantUuid,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_TENANT_UUID: TenantUuid = TenantUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_tenant(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_tenant_uuid(TEST_TENANT_UUID);
    ctrl.call_next(req, depot, res).await;
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_find_customer_cart().never();
    carts.expect_create_cart().never();
    carts.expect_delete_cart().never();
    carts.expect_add_item().never();
    carts.expect_update_item_quantity().never();
    carts.expect_remove_item().never();
    carts.expect_apply_discount().never();

    carts
}

fn strict_discounts_mock() -> MockDiscountsService {
    let mut discounts = MockDiscountsService::new();

    discounts.expect_create_code().never();
    discounts.expect_find_code().never();
    discounts.expect_delete_code().never();

    discounts
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_create_order().never();
    orders.expect_get_order().never();
    orders.expect_list_orders().never();
    orders.expect_update_status().never();

    orders
}

struct Mocks {
    products: MockProductsService,
    carts: MockCartsService,
    discounts: MockDiscountsService,
    orders: MockOrdersService,
    auth: MockAuthService,
}

impl Mocks {
    fn strict() -> Self {
        Self {
            products: strict_products_mock(),
            carts: strict_carts_mock(),
            discounts: strict_discounts_mock(),
            orders: strict_orders_mock(),
            auth: strict_auth_mock(),
        }
    }

    fn into_state(self) -> Arc<State> {
        Arc::new(State::new(AppContext {
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            discounts: Arc::new(self.discounts),
            orders: Arc::new(self.orders),
            auth: Arc::new(self.auth),
        }))
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    let mut mocks = Mocks::strict();
    mocks.auth = auth;

    mocks.into_state()
}

pub(crate) fn state_with_products(products: MockProductsService) -> Arc<State> {
    let mut mocks = Mocks::strict();
    mocks.products = products;

    mocks.into_state()
}

pub(crate) fn state_with_carts(carts: MockCartsService) -> Arc<State> {
    let mut mocks = Mocks::strict();
    mocks.carts = carts;

    mocks.into_state()
}

pub(crate) fn state_with_orders(orders: MockOrdersService) -> Arc<State> {
    let mut mocks = Mocks::strict();
    mocks.orders = orders;

    mocks.into_state()
}

fn service_with_state(state: Arc<State>, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_tenant)
            .push(route),
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    service_with_state(state_with_carts(carts), route)
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service_with_state(state_with_products(products), route)
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    service_with_state(state_with_orders(orders), route)
}

pub(crate) fn make_cart(uuid: CartUuid) -> Cart {
    Cart {
        uuid,
        customer_uuid: None,
        subtotal: 0,
        total: 0,
        total_items: 0,
        discount: None,
        items: Vec::new(),
        created_at: Timestamp::now(),
        updated_at: Timestamp::now(),
        deleted_at: None,
    }
}

pub(crate) fn make_product(uuid: ProductUuid, price: u64) -> Product {
    Product {
        uuid,
        name: "Widget".to_string(),
        sku: Some("WID-1".to_string()),
        image: None,
        price,
        sale_price: None,
        inventory_quantity: 10,
        created_at: Timestamp::now(),
        updated_at: Timestamp::now(),
        deleted_at: None,
    }
}

pub(crate) fn make_address() -> Address {
    Address {
        line1: "1 High Street".to_string(),
        line2: None,
        city: "London".to_string(),
        region: None,
        postal_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
    }
}

pub(crate) fn make_order(uuid: OrderUuid) -> Order {
    Order {
        uuid,
        order_number: "ord_test".to_string(),
        customer_uuid: None,
        customer: CustomerDetails {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
        },
        status: OrderStatus::Pending,
        billing: CheckoutSummary::from_parts(20_00, 5_00, 0, 0),
        billing_address: make_address(),
        shipping: ShippingDetails {
            address: make_address(),
            method: ShippingMethod::Standard,
            tracking_number: None,
            estimated_delivery: None,
        },
        payment: PaymentDetails {
            method: "card".to_string(),
            transaction_id: "sim_test".to_string(),
            status: PaymentStatus::Pending,
        },
        items: Vec::new(),
        created_at: Timestamp::now(),
        updated_at: Timestamp::now(),
    }
}
