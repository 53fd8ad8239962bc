//! Parsed order data models.
//!
//! Everything here is ephemeral: a [`ParsedOrder`] lives for one sync pass
//! and is then either discarded (duplicate message) or converted into
//! persisted order and item records by the caller.

use chrono::{DateTime, Utc};

/// Default currency assigned to parsed orders.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Shipment status recovered from an email body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipmentStatus {
    /// Order confirmed, no fulfilment signal yet.
    #[default]
    Pending,
    /// Vendor reports the order is being prepared.
    Preparing,
    /// Vendor reports the order shipped or was dispatched.
    Shipped,
    /// Vendor reports the order arrived.
    Delivered,
}

impl ShipmentStatus {
    /// Parse from stored string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "preparing" => Self::Preparing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            _ => Self::Pending,
        }
    }

    /// Convert to stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// One line item recovered from an email.
///
/// Equality covers every field; the block and context-window strategies use
/// it to drop duplicate candidates produced by overlapping markup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedOrderItem {
    /// Cleaned item name. Never empty, longer than 5 characters.
    pub name: String,
    /// Ordered quantity, 1 when the email does not say.
    pub quantity: u32,
    /// Unit price. Strictly positive (zero-priced candidates are discarded).
    pub unit_price: f64,
    /// Vendor catalog identifier (e.g. an ASIN) when present.
    pub catalog_id: Option<String>,
}

impl ParsedOrderItem {
    /// Line total for this item.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A structured order recovered from one confirmation email.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedOrder {
    /// Vendor order identifier, e.g. `123-4567890-1234567`.
    pub order_id: String,
    /// Order date; falls back to the time of extraction when the email
    /// carries no recognizable date.
    pub order_date: DateTime<Utc>,
    /// Line items in extraction order. May be empty.
    pub items: Vec<ParsedOrderItem>,
    /// Order total, 0.0 when no total line was found.
    pub total_amount: f64,
    /// ISO currency code, `USD` unless the email says otherwise.
    pub currency: String,
    /// Shipment status. `None` for plain-text parses, which carry no
    /// status signal and must not overwrite a stored one.
    pub shipment_status: Option<ShipmentStatus>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_status_roundtrip() {
        for status in [
            ShipmentStatus::Pending,
            ShipmentStatus::Preparing,
            ShipmentStatus::Shipped,
            ShipmentStatus::Delivered,
        ] {
            assert_eq!(ShipmentStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_shipment_status_parse_is_case_insensitive() {
        assert_eq!(ShipmentStatus::parse("DELIVERED"), ShipmentStatus::Delivered);
        assert_eq!(ShipmentStatus::parse("shipped"), ShipmentStatus::Shipped);
        assert_eq!(ShipmentStatus::parse("unknown"), ShipmentStatus::Pending);
    }

    #[test]
    fn test_item_total_price() {
        let item = ParsedOrderItem {
            name: "Wireless Mouse".to_string(),
            quantity: 3,
            unit_price: 19.99,
            catalog_id: None,
        };
        assert_eq!(item.total_price(), 59.97);
    }
}
