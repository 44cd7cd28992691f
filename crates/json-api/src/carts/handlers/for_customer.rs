//! Get Customer Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Get Customer Cart Handler
///
/// Returns the cart bound to an authenticated customer. This is what the
/// client fetches when a guest signs in and its local cart is replaced by
/// the server-held one.
#[endpoint(
    tags("carts"),
    summary = "Get Customer Cart",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    customer: PathParam<Uuid>,
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;
    let point_in_time = at.into_point_in_time()?;

    let cart = state
        .app
        .carts
        .find_customer_cart(tenant, customer.into_inner(), point_in_time)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use tally_app::domain::carts::{CartsServiceError, MockCartsService};

    use crate::test_helpers::{TEST_TENANT_UUID, carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(
            carts,
            Router::with_path("customers/{customer}/cart").get(handler),
        )
    }

    #[tokio::test]
    async fn test_returns_customer_cart() -> TestResult {
        let mut carts = MockCartsService::new();
        let customer = Uuid::now_v7();
        let cart_uuid = Uuid::now_v7();

        let mut cart = make_cart(cart_uuid.into());
        cart.customer_uuid = Some(customer);

        carts
            .expect_find_customer_cart()
            .once()
            .withf(move |tenant, c, _| *tenant == TEST_TENANT_UUID && *c == customer)
            .return_once(move |_, _, _| Ok(cart));

        let mut res = TestClient::get(format!("http://example.com/customers/{customer}/cart"))
            .send(&make_service(carts))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, cart_uuid);
        assert_eq!(body.customer_uuid, Some(customer));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_without_cart_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();
        let customer = Uuid::now_v7();

        carts
            .expect_find_customer_cart()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/customers/{customer}/cart"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
