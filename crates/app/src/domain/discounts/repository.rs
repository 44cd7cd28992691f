//! Discount Codes Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    discounts::models::{DiscountCode, DiscountCodeUuid, DiscountKind, NewDiscountCode},
    products::repository::{amount_to_db, try_get_optional_amount},
};

const CREATE_DISCOUNT_CODE_SQL: &str = include_str!("sql/create_discount_code.sql");
const FIND_DISCOUNT_CODE_SQL: &str = include_str!("sql/find_discount_code.sql");
const DELETE_DISCOUNT_CODE_SQL: &str = include_str!("sql/delete_discount_code.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDiscountCodesRepository;

impl PgDiscountCodesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &NewDiscountCode,
    ) -> Result<DiscountCode, sqlx::Error> {
        let (fixed_amount, percent) = match &code.kind {
            DiscountKind::Fixed(amount) => (Some(amount_to_db(*amount)?), None),
            DiscountKind::Percent(percent) => (None, Some(*percent)),
        };

        query_as::<Postgres, DiscountCode>(CREATE_DISCOUNT_CODE_SQL)
            .bind(code.uuid.into_uuid())
            .bind(&code.code)
            .bind(fixed_amount)
            .bind(percent)
            .bind(code.starts_at.map(SqlxTimestamp::from))
            .bind(code.ends_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<DiscountCode>, sqlx::Error> {
        query_as::<Postgres, DiscountCode>(FIND_DISCOUNT_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn delete_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_DISCOUNT_CODE_SQL)
            .bind(code.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for DiscountCode {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let fixed_amount = try_get_optional_amount(row, "fixed_amount")?;
        let percent: Option<Decimal> = row.try_get("percent")?;

        let kind = match (fixed_amount, percent) {
            (Some(amount), None) => DiscountKind::Fixed(amount),
            (None, Some(percent)) => DiscountKind::Percent(percent),
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "fixed_amount".to_string(),
                    source: "exactly one discount kind must be set".into(),
                });
            }
        };

        Ok(Self {
            uuid: DiscountCodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            kind,
            starts_at: row
                .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
                .map(SqlxTimestamp::to_jiff),
            ends_at: row
                .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
