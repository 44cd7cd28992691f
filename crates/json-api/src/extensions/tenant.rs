//! Tenant depot helpers.

use salvo::prelude::{Depot, StatusError};
use tally_app::domain::tenants::models::TenantUuid;

const TENANT_UUID_KEY: &str = "tenant_uuid";

/// Accessors for the tenant the auth middleware resolved for this request.
pub(crate) trait TenantDepotExt {
    fn insert_tenant_uuid(&mut self, tenant: TenantUuid);

    fn tenant_uuid_or_401(&self) -> Result<TenantUuid, StatusError>;
}

impl TenantDepotExt for Depot {
    fn insert_tenant_uuid(&mut self, tenant: TenantUuid) {
        self.insert(TENANT_UUID_KEY, tenant);
    }

    fn tenant_uuid_or_401(&self) -> Result<TenantUuid, StatusError> {
        self.get::<TenantUuid>(TENANT_UUID_KEY)
            .map(|tenant| *tenant)
            .map_err(|_missing| StatusError::unauthorized().brief("Not authenticated"))
    }
}
