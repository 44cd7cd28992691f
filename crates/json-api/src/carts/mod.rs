//! Carts HTTP surface.

pub(crate) mod discount;
pub(crate) mod errors;
mod handlers;
pub(crate) mod items;
pub(crate) mod responses;

pub(crate) use handlers::{create, delete, for_customer, get};
