//! Apply Discount Handler

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

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Apply Discount Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyDiscountRequest {
    pub code: String,
}

/// Apply Discount Handler
///
/// Validates the code and replaces the cart's discount with the
/// server-computed amount. The response carries the recomputed totals.
#[endpoint(
    tags("carts"),
    summary = "Apply Discount Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart returned"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Unknown or expired discount code"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    cart: PathParam<Uuid>,
    json: JsonBody<ApplyDiscountRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;

    let updated = state
        .app
        .carts
        .apply_discount(tenant, cart.into_inner().into(), json.into_inner().code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
