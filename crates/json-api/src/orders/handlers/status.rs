//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally::order::OrderStatus;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// `pending | processing | shipped | delivered | cancelled`
    pub status: String,

    /// Carrier tracking number, usually attached when moving to `shipped`
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Update Order Status Handler
///
/// Applies one transition of the order lifecycle; anything outside the
/// transition table is rejected.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated order returned"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;
    let request = json.into_inner();

    let status: OrderStatus = request.status.parse().or_400("unknown order status")?;

    let updated = state
        .app
        .orders
        .update_status(
            tenant,
            order.into_inner().into(),
            status,
            request.tracking_number,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use tally::order::InvalidTransition;
    use testresult::TestResult;

    use tally_app::domain::orders::{MockOrdersService, OrdersServiceError};

    use crate::test_helpers::{TEST_TENANT_UUID, make_order, orders_service};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        orders_service(
            orders,
            Router::with_path("orders/{order}/status").patch(handler),
        )
    }

    #[tokio::test]
    async fn test_valid_transition_returns_updated_order() -> TestResult {
        let uuid = Uuid::now_v7();

        let mut order = make_order(uuid.into());
        order.status = OrderStatus::Processing;

        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .withf(move |tenant, u, status, tracking| {
                *tenant == TEST_TENANT_UUID
                    && *u == uuid.into()
                    && *status == OrderStatus::Processing
                    && tracking.is_none()
            })
            .return_once(move |_, _, _, _| Ok(order));

        let mut res = TestClient::patch(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "status": "processing" }))
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "processing");

        Ok(())
    }

    #[tokio::test]
    async fn test_off_table_transition_returns_409() -> TestResult {
        let uuid = Uuid::now_v7();

        let mut orders = MockOrdersService::new();

        orders.expect_update_status().once().return_once(|_, _, _, _| {
            Err(OrdersServiceError::InvalidTransition(InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            }))
        });

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "status": "delivered" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let uuid = Uuid::now_v7();

        let orders = MockOrdersService::new();

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}/status"))
            .json(&json!({ "status": "refunded" }))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
