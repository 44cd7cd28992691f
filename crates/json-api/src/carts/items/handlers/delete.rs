//! Delete Cart Item Handler

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

/// Delete Cart Item Request
///
/// Attributes travel in the body: they address which line of the product is
/// being removed.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeleteCartItemRequest {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Delete Cart Item Handler
///
/// Deletes the matching line entirely; a missing line leaves the cart
/// unchanged.
#[endpoint(
    tags("carts"),
    summary = "Remove Item from Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart returned"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    cart: PathParam<Uuid>,
    product: PathParam<Uuid>,
    json: JsonBody<DeleteCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_uuid_or_401()?;

    let updated = state
        .app
        .carts
        .remove_item(
            tenant,
            cart.into_inner().into(),
            product.into_inner().into(),
            json.into_inner().attributes.into_iter().collect(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
