//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use tally::{order::InvalidTransition, summary::CheckoutSummary};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("missing required checkout data: {0}")]
    MissingRequiredData(&'static str),

    #[error("submitted billing figures do not match server-derived totals")]
    PriceMismatch {
        submitted: CheckoutSummary,
        derived: CheckoutSummary,
    },

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData("column"),
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
