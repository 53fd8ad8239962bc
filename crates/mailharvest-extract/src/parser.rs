//! Top-level email-to-order parsing.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::markup::Document;
use crate::model::{DEFAULT_CURRENCY, ParsedOrder, ShipmentStatus};
use crate::patterns;
use crate::strategy;

/// Parse one normalized email body into a structured order.
///
/// The HTML body is preferred; the plain-text path runs only when no HTML
/// body exists. The order identifier is the only required field. Every other
/// field falls back to a default: the date to the time of extraction, the
/// item list to empty, the total to `0.0`, the currency to USD.
///
/// # Errors
///
/// [`Error::NoContent`] when both bodies are `None`,
/// [`Error::MissingOrderId`] when no vendor-format order identifier
/// appears anywhere in the visible text.
pub fn parse(html: Option<&str>, text: Option<&str>) -> Result<ParsedOrder> {
    if let Some(html) = html {
        parse_html(html)
    } else if let Some(text) = text {
        parse_text(text)
    } else {
        Err(Error::NoContent)
    }
}

fn parse_html(html: &str) -> Result<ParsedOrder> {
    let doc = Document::parse(html);
    let text = doc.text();

    let order_id = patterns::find_order_id(text).ok_or(Error::MissingOrderId)?;
    let order_date = patterns::find_order_date(text).unwrap_or_else(Utc::now);
    let items = strategy::extract_items(&doc);
    let total_amount = patterns::find_total(text).unwrap_or(0.0);
    let shipment_status = Some(detect_status(text));

    Ok(ParsedOrder {
        order_id,
        order_date,
        items,
        total_amount,
        currency: DEFAULT_CURRENCY.to_string(),
        shipment_status,
    })
}

/// Plain-text fallback. Less reliable: only the context-window strategy can
/// run, and the body carries no status signal worth trusting.
fn parse_text(text: &str) -> Result<ParsedOrder> {
    let order_id = patterns::find_order_id(text).ok_or(Error::MissingOrderId)?;
    let order_date = patterns::find_order_date(text).unwrap_or_else(Utc::now);
    let items = strategy::items_from_text_lines(text);
    let total_amount = patterns::find_combined_total(text).unwrap_or(0.0);

    Ok(ParsedOrder {
        order_id,
        order_date,
        items,
        total_amount,
        currency: DEFAULT_CURRENCY.to_string(),
        shipment_status: None,
    })
}

fn detect_status(text: &str) -> ShipmentStatus {
    let lowered = text.to_lowercase();
    if lowered.contains("delivered") {
        ShipmentStatus::Delivered
    } else if lowered.contains("shipped") || lowered.contains("dispatched") {
        ShipmentStatus::Shipped
    } else if lowered.contains("preparing") {
        ShipmentStatus::Preparing
    } else {
        ShipmentStatus::Pending
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CONFIRMATION: &str = "<html><body>
<p>Hello, thanks for your purchase!</p>
<p>Order #123-4567890-1234567</p>
<p>Order Date: March 3, 2025</p>
<table>
  <tr><th>Product</th><th>Price</th></tr>
  <tr><td>Wireless Mouse  Qty: 2</td><td>$19.99</td></tr>
</table>
<p>Order Total: $39.98</p>
</body></html>";

    #[test]
    fn test_parses_complete_confirmation() {
        let order = parse(Some(CONFIRMATION), None).unwrap();

        assert_eq!(order.order_id, "123-4567890-1234567");
        assert_eq!(
            order.order_date.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
        );
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Wireless Mouse");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, 19.99);
        assert_eq!(order.total_amount, 39.98);
        assert_eq!(order.currency, "USD");
        assert_eq!(order.shipment_status, Some(ShipmentStatus::Pending));
    }

    #[test]
    fn test_missing_order_id_fails() {
        let html = "<p>Thanks for shopping with us! Total: $10.00</p>";
        assert_eq!(parse(Some(html), None), Err(Error::MissingOrderId));
    }

    #[test]
    fn test_no_content_fails() {
        assert_eq!(parse(None, None), Err(Error::NoContent));
    }

    #[test]
    fn test_unrecognizable_date_defaults_to_now() {
        let html = "<p>Order #123-4567890-1234567</p>\
                    <p>Order Date: Smarch 32, 2025</p>\
                    <p>Order Total: $5.00</p>";
        let before = Utc::now();
        let order = parse(Some(html), None).unwrap();
        let after = Utc::now();

        assert_eq!(order.order_id, "123-4567890-1234567");
        assert!(order.order_date >= before && order.order_date <= after);
        assert_eq!(order.total_amount, 5.0);
    }

    #[test]
    fn test_table_items_win_over_priced_blocks() {
        let html = format!(
            "{CONFIRMATION}<div>Daily Deal Banner only $4.99 while stocks last</div>"
        );
        let order = parse(Some(&html), None).unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Wireless Mouse");
    }

    #[test]
    fn test_status_priority_delivered_wins() {
        let html = "<p>Order #123-4567890-1234567 was shipped and has now been delivered.</p>";
        let order = parse(Some(html), None).unwrap();
        assert_eq!(order.shipment_status, Some(ShipmentStatus::Delivered));
    }

    #[test]
    fn test_status_dispatched_counts_as_shipped() {
        let html = "<p>Order #123-4567890-1234567 has been dispatched to the courier.</p>";
        let order = parse(Some(html), None).unwrap();
        assert_eq!(order.shipment_status, Some(ShipmentStatus::Shipped));
    }

    #[test]
    fn test_html_preferred_over_text() {
        let html = "<p>Order #111-1111111-1111111</p>";
        let text = "Order #222-2222222-2222222";
        let order = parse(Some(html), Some(text)).unwrap();
        assert_eq!(order.order_id, "111-1111111-1111111");
    }

    #[test]
    fn test_plain_text_path() {
        let text = "Your order 112-7366945-6393017 has been received.\n\
                    Order Date: April 12, 2025\n\
                    USB-C Cable 2m braided\n\
                    $12.50\n\
                    Order Total: $12.50";
        let order = parse(None, Some(text)).unwrap();

        assert_eq!(order.order_id, "112-7366945-6393017");
        assert_eq!(
            order.order_date.date_naive(),
            NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
        );
        assert_eq!(order.items.len(), 2);
        assert!(order.items[0].name.contains("USB-C Cable"));
        assert_eq!(order.items[0].unit_price, 12.50);
        assert_eq!(order.total_amount, 12.50);
        assert_eq!(order.shipment_status, None);
    }

    #[test]
    fn test_text_path_accepts_short_month_date() {
        let text = "Order #112-7366945-6393017\nOrder Date: Apr 2, 2025";
        let order = parse(None, Some(text)).unwrap();
        assert_eq!(
            order.order_date.date_naive(),
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap()
        );
        assert!(order.items.is_empty());
        assert_eq!(order.total_amount, 0.0);
    }
}
