//! Tenant API token authentication.

pub mod errors;
mod repository;
pub mod service;
pub mod token;

pub use errors::AuthServiceError;
pub use service::*;
pub use token::{generate_api_token, hash_api_token};
