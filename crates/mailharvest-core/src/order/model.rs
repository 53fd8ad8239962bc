//! Order model types.

use chrono::{DateTime, Utc};
use mailharvest_extract::ShipmentStatus;

use crate::user::UserId;

/// Unique identifier for a stored order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Create a new order ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored order.
///
/// Timestamps are RFC 3339 strings as stored. `order_date` is the date
/// extracted from the email (or the extraction time when the email carried
/// none), not the time the row was written.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// User this order belongs to.
    pub user_id: UserId,
    /// Vendor order number, globally unique.
    pub order_number: String,
    /// Order date (RFC 3339).
    pub order_date: String,
    /// Order total.
    pub total_amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Last known shipment status.
    pub shipment_status: Option<ShipmentStatus>,
    /// Where the record came from, `"email"` for this pipeline.
    pub source_type: String,
    /// `Message-ID` of the email that created the record.
    pub email_message_id: Option<String>,
    /// Truncated snapshot of the creating email's HTML body.
    pub raw_email_html: Option<String>,
    /// Row creation time (RFC 3339).
    pub created_at: String,
    /// Last modification time (RFC 3339).
    pub updated_at: String,
}

/// Payload for creating an order record.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Owning user.
    pub user_id: UserId,
    /// Vendor order number.
    pub order_number: String,
    /// Extracted order date.
    pub order_date: DateTime<Utc>,
    /// Order total.
    pub total_amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Shipment status at creation time.
    pub shipment_status: ShipmentStatus,
    /// Provenance marker, e.g. `"email"`.
    pub source_type: String,
    /// `Message-ID` of the source email.
    pub email_message_id: Option<String>,
    /// Truncated HTML snapshot of the source email.
    pub raw_email_html: Option<String>,
}

/// A stored line item belonging to one order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// Unique identifier.
    pub id: i64,
    /// Order this item belongs to.
    pub order_id: OrderId,
    /// Item name as extracted.
    pub item_name: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: f64,
    /// Line total, `unit_price * quantity` computed at creation.
    pub total_price: f64,
    /// Vendor catalog identifier when the email carried one.
    pub asin: Option<String>,
}
