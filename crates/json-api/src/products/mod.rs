//! Products HTTP surface.

pub(crate) mod errors;
mod handlers;
pub(crate) mod responses;

pub(crate) use handlers::{create, delete, get, index, update};
