//! Tenants service.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::tenants::{
    errors::TenantsServiceError,
    models::{NewTenant, Tenant},
    repository::PgTenantsRepository,
};

/// Tenant administration runs on the superuser pool, outside tenant RLS
/// context — there is no tenant yet to scope to.
#[derive(Debug, Clone)]
pub struct PgTenantsService {
    repository: PgTenantsRepository,
}

impl PgTenantsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgTenantsRepository::new(pool),
        }
    }
}

#[async_trait]
impl TenantsService for PgTenantsService {
    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, TenantsServiceError> {
        if tenant.name.trim().is_empty() {
            return Err(TenantsServiceError::MissingRequiredData);
        }

        let created = self.repository.create_tenant(&tenant).await?;

        Ok(created)
    }
}

#[async_trait]
pub trait TenantsService: Send + Sync {
    /// Creates a new tenant with a hashed API token.
    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, TenantsServiceError>;
}
