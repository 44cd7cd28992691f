//! Errors

use salvo::http::StatusError;
use tracing::error;

use tally_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::EmptyOrder => {
            StatusError::bad_request().brief("Order must contain at least one item")
        }
        OrdersServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be a positive integer")
        }
        OrdersServiceError::MissingRequiredData(field) => {
            StatusError::bad_request().brief(format!("Missing required checkout data: {field}"))
        }
        OrdersServiceError::PriceMismatch { .. } => StatusError::unprocessable_entity()
            .brief("Submitted billing figures do not match server-derived totals"),
        OrdersServiceError::InvalidReference => {
            StatusError::unprocessable_entity().brief("Order references an unknown product")
        }
        OrdersServiceError::InvalidTransition(source) => {
            StatusError::conflict().brief(source.to_string())
        }
        OrdersServiceError::AlreadyExists => {
            StatusError::conflict().brief("Order already exists")
        }
        OrdersServiceError::InvalidData => StatusError::bad_request().brief("Invalid order payload"),
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::NotFound => StatusError::not_found(),
    }
}
