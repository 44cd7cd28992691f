//! Carts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tally::cart::Discount;
use uuid::Uuid;

use crate::domain::{
    carts::models::{Cart, CartUuid},
    products::repository::{amount_to_db, try_get_amount},
};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const CURRENT_CART_SQL: &str = include_str!("../sql/current_cart.sql");
const FIND_CUSTOMER_CART_SQL: &str = include_str!("../sql/find_customer_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const SET_CART_DISCOUNT_SQL: &str = include_str!("../sql/set_cart_discount.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_one(&mut **tx)
            .await
    }

    /// The cart as of this transaction, ignoring point-in-time filtering.
    /// Used to return fresh state right after a mutation.
    pub(crate) async fn current_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(CURRENT_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_customer_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: Uuid,
        point_in_time: Timestamp,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(FIND_CUSTOMER_CART_SQL)
            .bind(customer)
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        customer: Option<Uuid>,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(customer)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        discount: Option<&Discount>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_CART_DISCOUNT_SQL)
            .bind(cart.into_uuid())
            .bind(discount.map(|discount| discount.code.as_str()))
            .bind(
                discount
                    .map(|discount| amount_to_db(discount.amount))
                    .transpose()?,
            )
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Cart {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let subtotal = try_get_amount(row, "subtotal")?;
        let total_items = try_get_amount(row, "total_items")?;

        let discount = match row.try_get::<Option<String>, _>("discount_code")? {
            Some(code) => Some(Discount {
                code,
                amount: try_get_amount(row, "discount_amount")?,
            }),
            None => None,
        };

        let discount_amount = discount.as_ref().map_or(0, |discount| discount.amount);

        let cart_items_count: i64 = row.try_get("cart_items_count")?;

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: row.try_get("customer_uuid")?,
            subtotal,
            total: subtotal.saturating_sub(discount_amount),
            total_items,
            discount,
            items: Vec::with_capacity(usize::try_from(cart_items_count).unwrap_or_default()),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
