//! Update Cart Item Quantity Handler

use std::collections::BTreeMap;
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

/// Update Cart Item Request
///
/// Attributes travel in the body because they are part of the line identity
/// being addressed, not a change to apply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    pub quantity: u32,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Update Cart Item Quantity Handler
///
/// Sets the quantity of the matching line. Zero is rejected; a missing line
/// leaves the cart unchanged.
#[endpoint(
    tags("carts"),
    summary = "Update Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart returned"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    cart: PathParam<Uuid>,
    product: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;
    let request = json.into_inner();

    let updated = state
        .app
        .carts
        .update_item_quantity(
            tenant,
            cart.into_inner().into(),
            product.into_inner().into(),
            request.attributes.into_iter().collect(),
            request.quantity,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
