//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};
use tally::{
    attributes::VariantAttributes,
    order::{OrderStatus, PaymentStatus},
    products::ProductSnapshot,
    summary::{CheckoutSummary, ShippingMethod},
};

use crate::domain::{
    orders::models::{
        Address, CustomerDetails, Order, OrderItem, OrderItemUuid, OrderUuid, PaymentDetails,
        ShippingDetails,
    },
    products::{
        models::ProductUuid,
        repository::{amount_to_db, try_get_amount, try_get_optional_amount},
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const RESOLVE_PRODUCT_SQL: &str = include_str!("sql/resolve_product.sql");

/// Everything the repository needs to persist one order row.
pub(crate) struct OrderInsert<'a> {
    pub(crate) uuid: OrderUuid,
    pub(crate) order_number: &'a str,
    pub(crate) customer_uuid: Option<uuid::Uuid>,
    pub(crate) customer: &'a CustomerDetails,
    pub(crate) status: OrderStatus,
    pub(crate) billing: CheckoutSummary,
    pub(crate) billing_address: &'a Address,
    pub(crate) shipping_address: &'a Address,
    pub(crate) shipping_method: ShippingMethod,
    pub(crate) payment_method: &'a str,
    pub(crate) payment_transaction: &'a str,
    pub(crate) payment_status: PaymentStatus,
}

/// One snapshotted line to persist with its order.
pub(crate) struct OrderItemInsert<'a> {
    pub(crate) uuid: OrderItemUuid,
    pub(crate) snapshot: &'a ProductSnapshot,
    pub(crate) unit_price: u64,
    pub(crate) quantity: u32,
    pub(crate) attributes: &'a VariantAttributes,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderInsert<'_>,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.order_number)
            .bind(order.customer_uuid)
            .bind(&order.customer.name)
            .bind(&order.customer.email)
            .bind(order.customer.phone.as_deref())
            .bind(order.status.as_str())
            .bind(amount_to_db(order.billing.subtotal)?)
            .bind(amount_to_db(order.billing.shipping)?)
            .bind(amount_to_db(order.billing.discount)?)
            .bind(amount_to_db(order.billing.tax)?)
            .bind(amount_to_db(order.billing.total)?)
            .bind(Json(order.billing_address))
            .bind(Json(order.shipping_address))
            .bind(order.shipping_method.as_str())
            .bind(order.payment_method)
            .bind(order.payment_transaction)
            .bind(order.payment_status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        item: &OrderItemInsert<'_>,
    ) -> Result<OrderItem, sqlx::Error> {
        query_as::<Postgres, OrderItem>(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(item.snapshot.uuid)
            .bind(&item.snapshot.name)
            .bind(item.snapshot.image.as_deref())
            .bind(item.snapshot.sku.as_deref())
            .bind(amount_to_db(item.unit_price)?)
            .bind(i32::try_from(item.quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
            .bind(Json(item.attributes))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LIST_ORDERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        query_as::<Postgres, OrderItem>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(tracking_number)
            .fetch_one(&mut **tx)
            .await
    }

    /// The authoritative product fields totals are re-derived from.
    pub(crate) async fn resolve_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<ProductSnapshot>, sqlx::Error> {
        query_as::<Postgres, ResolvedProduct>(RESOLVE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map(|row| row.map(|row| row.0))
    }
}

struct ResolvedProduct(ProductSnapshot);

impl<'r> FromRow<'r, PgRow> for ResolvedProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(ProductSnapshot {
            uuid: row.try_get("uuid")?,
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            image: row.try_get("image")?,
            price: try_get_amount(row, "price")?,
            sale_price: try_get_optional_amount(row, "sale_price")?,
        }))
    }
}

fn decode_column<T, E>(col: &str, result: Result<T, E>) -> sqlx::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let shipping_method: String = row.try_get("shipping_method")?;
        let payment_status: String = row.try_get("payment_status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            customer_uuid: row.try_get("customer_uuid")?,
            customer: CustomerDetails {
                name: row.try_get("customer_name")?,
                email: row.try_get("customer_email")?,
                phone: row.try_get("customer_phone")?,
            },
            status: decode_column("status", status.parse())?,
            billing: CheckoutSummary {
                subtotal: try_get_amount(row, "billing_subtotal")?,
                shipping: try_get_amount(row, "billing_shipping")?,
                discount: try_get_amount(row, "billing_discount")?,
                tax: try_get_amount(row, "billing_tax")?,
                total: try_get_amount(row, "billing_total")?,
            },
            billing_address: row.try_get::<Json<Address>, _>("billing_address")?.0,
            shipping: ShippingDetails {
                address: row.try_get::<Json<Address>, _>("shipping_address")?.0,
                method: decode_column("shipping_method", shipping_method.parse())?,
                tracking_number: row.try_get("tracking_number")?,
                estimated_delivery: row
                    .try_get::<Option<SqlxTimestamp>, _>("estimated_delivery")?
                    .map(SqlxTimestamp::to_jiff),
            },
            payment: PaymentDetails {
                method: row.try_get("payment_method")?,
                transaction_id: row.try_get("payment_transaction")?,
                status: decode_column("payment_status", payment_status.parse())?,
            },
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: row.try_get("product_uuid")?,
            product_name: row.try_get("product_name")?,
            product_image: row.try_get("product_image")?,
            sku: row.try_get("sku")?,
            unit_price: try_get_amount(row, "unit_price")?,
            quantity: decode_column("quantity", u32::try_from(quantity))?,
            attributes: row
                .try_get::<Json<VariantAttributes>, _>("attributes")?
                .0,
        })
    }
}
