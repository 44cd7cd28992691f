//! Orders HTTP surface.

pub(crate) mod errors;
mod handlers;
pub(crate) mod responses;

pub(crate) use handlers::{create, get, index, status};
