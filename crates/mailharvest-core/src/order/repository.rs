//! Order persistence.
//!
//! Every operation runs on a caller-supplied transaction so that a sync
//! run's lookups observe the writes it made earlier in the same run.

use chrono::Utc;
use mailharvest_extract::{ParsedOrderItem, ShipmentStatus};
use sqlx::{Row, Sqlite, Transaction};

use super::model::{NewOrder, Order, OrderId, OrderItem};
use crate::Result;
use crate::user::UserId;

/// Look up an order by its vendor order number.
///
/// The lookup is global, not per-user: the order number is the natural key
/// for deduplication across every email that references it.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_number(
    tx: &mut Transaction<'_, Sqlite>,
    order_number: &str,
) -> Result<Option<Order>> {
    let row = sqlx::query(
        r"
        SELECT id, user_id, order_number, order_date, total_amount, currency,
               shipment_status, source_type, email_message_id, raw_email_html,
               created_at, updated_at
        FROM orders
        WHERE order_number = ?
        ",
    )
    .bind(order_number)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|r| row_to_order(&r)))
}

/// Create an order and its line items.
///
/// Each item row's `total_price` is computed here, at creation time; it is
/// never recomputed afterwards.
///
/// # Errors
///
/// Returns an error if the database operation fails, including when the
/// order number already exists.
pub async fn create(
    tx: &mut Transaction<'_, Sqlite>,
    new_order: NewOrder,
    items: &[ParsedOrderItem],
) -> Result<Order> {
    let now = Utc::now().to_rfc3339();
    let order_date = new_order.order_date.to_rfc3339();

    let result = sqlx::query(
        r"
        INSERT INTO orders (user_id, order_number, order_date, total_amount, currency,
                            shipment_status, source_type, email_message_id, raw_email_html,
                            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(new_order.user_id.0)
    .bind(&new_order.order_number)
    .bind(&order_date)
    .bind(new_order.total_amount)
    .bind(&new_order.currency)
    .bind(new_order.shipment_status.as_str())
    .bind(&new_order.source_type)
    .bind(new_order.email_message_id.as_deref())
    .bind(new_order.raw_email_html.as_deref())
    .bind(&now)
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    let order_id = OrderId::new(result.last_insert_rowid());

    for item in items {
        sqlx::query(
            r"
            INSERT INTO order_items (order_id, item_name, quantity, unit_price, total_price, asin)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(order_id.0)
        .bind(&item.name)
        .bind(i64::from(item.quantity))
        .bind(item.unit_price)
        .bind(item.total_price())
        .bind(item.catalog_id.as_deref())
        .execute(&mut **tx)
        .await?;
    }

    Ok(Order {
        id: order_id,
        user_id: new_order.user_id,
        order_number: new_order.order_number,
        order_date,
        total_amount: new_order.total_amount,
        currency: new_order.currency,
        shipment_status: Some(new_order.shipment_status),
        source_type: new_order.source_type,
        email_message_id: new_order.email_message_id,
        raw_email_html: new_order.raw_email_html,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Update an order's shipment status and `updated_at` stamp.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn update_shipment_status(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: OrderId,
    status: ShipmentStatus,
) -> Result<()> {
    sqlx::query(
        r"
        UPDATE orders
        SET shipment_status = ?, updated_at = ?
        WHERE id = ?
        ",
    )
    .bind(status.as_str())
    .bind(Utc::now().to_rfc3339())
    .bind(order_id.0)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Fetch the line items belonging to an order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn items(tx: &mut Transaction<'_, Sqlite>, order_id: OrderId) -> Result<Vec<OrderItem>> {
    let rows = sqlx::query(
        r"
        SELECT id, order_id, item_name, quantity, unit_price, total_price, asin
        FROM order_items
        WHERE order_id = ?
        ORDER BY id
        ",
    )
    .bind(order_id.0)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.iter().map(row_to_item).collect())
}

/// Convert a database row to an `Order`.
fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Order {
    Order {
        id: OrderId::new(row.get("id")),
        user_id: UserId::new(row.get("user_id")),
        order_number: row.get("order_number"),
        order_date: row.get("order_date"),
        total_amount: row.get("total_amount"),
        currency: row.get("currency"),
        shipment_status: row
            .get::<Option<String>, _>("shipment_status")
            .map(|s| ShipmentStatus::parse(&s)),
        source_type: row.get("source_type"),
        email_message_id: row.get("email_message_id"),
        raw_email_html: row.get("raw_email_html"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Convert a database row to an `OrderItem`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> OrderItem {
    OrderItem {
        id: row.get("id"),
        order_id: OrderId::new(row.get("order_id")),
        item_name: row.get("item_name"),
        quantity: row.get::<i64, _>("quantity") as u32,
        unit_price: row.get("unit_price"),
        total_price: row.get("total_price"),
        asin: row.get("asin"),
    }
}
