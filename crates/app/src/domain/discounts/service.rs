//! Discounts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        discounts::{
            errors::DiscountsServiceError,
            models::{DiscountCode, DiscountCodeUuid, NewDiscountCode},
            repository::PgDiscountCodesRepository,
        },
        tenants::models::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgDiscountsService {
    db: Db,
    repository: PgDiscountCodesRepository,
}

impl PgDiscountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgDiscountCodesRepository::new(),
        }
    }
}

#[async_trait]
impl DiscountsService for PgDiscountsService {
    async fn create_code(
        &self,
        tenant: TenantUuid,
        code: NewDiscountCode,
    ) -> Result<DiscountCode, DiscountsServiceError> {
        if code.code.trim().is_empty() {
            return Err(DiscountsServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.repository.create_code(&mut tx, &code).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_code(
        &self,
        tenant: TenantUuid,
        code: String,
    ) -> Result<DiscountCode, DiscountsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let found = self
            .repository
            .find_code(&mut tx, &code)
            .await?
            .ok_or(DiscountsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(found)
    }

    async fn delete_code(
        &self,
        tenant: TenantUuid,
        code: DiscountCodeUuid,
    ) -> Result<(), DiscountsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self.repository.delete_code(&mut tx, code).await?;

        if rows_affected == 0 {
            return Err(DiscountsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Creates a new discount code.
    async fn create_code(
        &self,
        tenant: TenantUuid,
        code: NewDiscountCode,
    ) -> Result<DiscountCode, DiscountsServiceError>;

    /// Look up a live discount code by its code string.
    async fn find_code(
        &self,
        tenant: TenantUuid,
        code: String,
    ) -> Result<DiscountCode, DiscountsServiceError>;

    /// Soft-deletes a discount code.
    async fn delete_code(
        &self,
        tenant: TenantUuid,
        code: DiscountCodeUuid,
    ) -> Result<(), DiscountsServiceError>;
}
