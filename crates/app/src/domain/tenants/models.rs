//! Tenant Models

use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Tenant UUID
pub type TenantUuid = TypedUuid<Tenant>;

/// Tenant Model
#[derive(Debug, Clone)]
pub struct Tenant {
    pub uuid: TenantUuid,
    pub name: String,
    pub created_at: Timestamp,
}

/// New Tenant Model
///
/// `token_hash` is the SHA-256 hash of the tenant's API token; the raw token
/// is only ever held by the caller that generated it.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub uuid: Uuid,
    pub name: String,
    pub token_uuid: Uuid,
    pub token_hash: String,
}
