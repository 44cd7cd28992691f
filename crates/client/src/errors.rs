//! Cart manager errors.
//!
//! Every manager operation returns an explicit result; backend failures are
//! surfaced to the caller rather than swallowed, so the UI layer decides
//! whether to retry.

use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum CartError {
    /// A cart state rule was violated, e.g. a non-positive quantity.
    #[error(transparent)]
    State(#[from] tally::cart::CartError),

    /// Discount codes are validated server-side and only exist for
    /// authenticated carts.
    #[error("discount codes require signing in")]
    DiscountRequiresAccount,

    /// Checkout needs a non-empty cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// The backend rejected or failed the request; the local cart is
    /// unchanged and the operation can be retried.
    #[error("backend request failed")]
    Gateway(#[from] GatewayError),
}
