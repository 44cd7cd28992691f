//! Tenants

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::TenantsServiceError;
pub use service::*;
