//! Compiled patterns and numeric field helpers shared by the strategies.
//!
//! Vendor confirmation emails label the interesting fields fairly
//! consistently even when the surrounding markup is chaotic, so everything
//! here scans flattened text. Malformed numeric text never aborts an
//! extraction; the caller substitutes the field default instead.

// Pattern literals are fixed at compile time; a failed compile is a bug, not
// a runtime condition.
#![allow(clippy::expect_used)]

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Vendor order identifier, e.g. `Order #123-4567890-1234567`.
pub(crate) static ORDER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Order\s*#?\s*(\d{3}-\d{7}-\d{7})").expect("valid order id pattern")
});

/// Labeled order date, e.g. `Order Date: March 3, 2025`.
pub(crate) static ORDER_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Order\s+Date:?\s*(\w+\s+\d+,\s+\d{4})").expect("valid order date pattern")
});

/// Currency amount with optional `$` prefix and thousands separators.
pub(crate) static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?([\d,]+\.\d{2})").expect("valid amount pattern"));

/// Labeled vendor catalog identifier, e.g. `ASIN: B01ABCD234`.
pub(crate) static CATALOG_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ASIN:?\s*([A-Z0-9]{10})").expect("valid catalog id pattern")
});

/// Labeled quantity, e.g. `Qty: 2` or `Quantity: 2`.
pub(crate) static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Qty|Quantity):?\s*(\d+)").expect("valid quantity pattern")
});

/// Labeled totals in priority order: the most specific label wins.
pub(crate) static TOTALS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)Order\s+Total:?\s*\$?([\d,]+\.\d{2})").expect("valid total pattern"),
        Regex::new(r"(?i)Grand\s+Total:?\s*\$?([\d,]+\.\d{2})").expect("valid total pattern"),
        Regex::new(r"(?i)Total:?\s*\$?([\d,]+\.\d{2})").expect("valid total pattern"),
    ]
});

/// Single combined total pattern for the plain-text path.
pub(crate) static COMBINED_TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Order|Grand)?\s*Total:?\s*\$?([\d,]+\.\d{2})")
        .expect("valid combined total pattern")
});

/// Price substrings stripped from item names.
pub(crate) static AMOUNT_IN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+\.\d{2}").expect("valid amount pattern"));

/// Quantity substrings stripped from item names.
pub(crate) static QUANTITY_IN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Qty:?\s*\d+").expect("valid quantity pattern"));

/// Catalog identifier substrings stripped from item names.
pub(crate) static CATALOG_IN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ASIN:?\s*[A-Z0-9]{10}").expect("valid catalog pattern"));

/// Convert a matched amount to a number, stripping thousands separators.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

/// First vendor-format order identifier in the text.
pub(crate) fn find_order_id(text: &str) -> Option<String> {
    ORDER_ID
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// First labeled order date in the text, tried as `March 3, 2025` then
/// `Mar 3, 2025`. `None` when no label matches or neither format parses.
pub(crate) fn find_order_date(text: &str) -> Option<DateTime<Utc>> {
    let caps = ORDER_DATE.captures(text)?;
    let raw = &caps[1];
    ["%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// First currency amount in the text.
pub(crate) fn find_amount(text: &str) -> Option<f64> {
    AMOUNT.captures(text).and_then(|caps| parse_amount(&caps[1]))
}

/// First labeled quantity in the text. `None` when absent or out of range.
pub(crate) fn find_quantity(text: &str) -> Option<u32> {
    QUANTITY
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// First vendor catalog identifier in the text.
pub(crate) fn find_catalog_id(text: &str) -> Option<String> {
    CATALOG_ID
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Order total via the labeled patterns in priority order.
pub(crate) fn find_total(text: &str) -> Option<f64> {
    TOTALS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| parse_amount(&caps[1]))
}

/// Order total via the single combined pattern (plain-text path).
pub(crate) fn find_combined_total(text: &str) -> Option<f64> {
    COMBINED_TOTAL
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    #[test]
    fn test_find_order_id() {
        assert_eq!(
            find_order_id("Your Amazon.com order #112-7366945-6393017 has shipped"),
            Some("112-7366945-6393017".to_string())
        );
        assert_eq!(
            find_order_id("ORDER # 112-7366945-6393017"),
            Some("112-7366945-6393017".to_string())
        );
        assert_eq!(find_order_id("order number 112-736-63"), None);
    }

    #[test]
    fn test_find_order_date_both_formats() {
        let long = find_order_date("Order Date: March 3, 2025").unwrap();
        assert_eq!((long.year(), long.month(), long.day()), (2025, 3, 3));

        let short = find_order_date("Order Date Mar 3, 2025").unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn test_find_order_date_rejects_gibberish() {
        assert_eq!(find_order_date("Order Date: Smarch 3, 2025"), None);
        assert_eq!(find_order_date("shipped on March 3, 2025"), None);
    }

    #[test]
    fn test_find_amount_strips_separators() {
        assert_eq!(find_amount("total of $1,234.56 charged"), Some(1234.56));
        assert_eq!(find_amount("1299.00"), Some(1299.0));
        assert_eq!(find_amount("no price here"), None);
    }

    #[test]
    fn test_find_quantity_defaults_on_overflow() {
        assert_eq!(find_quantity("Qty: 2"), Some(2));
        assert_eq!(find_quantity("Quantity 12"), Some(12));
        assert_eq!(find_quantity("Qty: 99999999999999999999"), None);
    }

    #[test]
    fn test_find_catalog_id() {
        assert_eq!(
            find_catalog_id("ASIN: B01N5IB20Q more text"),
            Some("B01N5IB20Q".to_string())
        );
        assert_eq!(find_catalog_id("ASIN: B01"), None);
    }

    #[test]
    fn test_find_total_priority() {
        let text = "Subtotal: $10.00\nTotal: $12.00\nOrder Total: $13.50";
        assert_eq!(find_total(text), Some(13.50));
        assert_eq!(find_total("Grand Total $99.95\nTotal: $1.00"), Some(99.95));
        assert_eq!(find_total("Total: $1.00"), Some(1.0));
        assert_eq!(find_total("no totals"), None);
    }

    #[test]
    fn test_find_combined_total() {
        assert_eq!(find_combined_total("Total: $39.98"), Some(39.98));
        assert_eq!(find_combined_total("Grand Total: 1,000.00"), Some(1000.0));
    }

    fn group_thousands(value: u64) -> String {
        let digits = value.to_string();
        let mut grouped = String::new();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        grouped
    }

    proptest! {
        #[test]
        fn amount_scan_never_panics(text in "\\PC*") {
            let _ = find_amount(&text);
            let _ = find_total(&text);
        }

        #[test]
        fn grouped_amounts_convert_exactly(dollars in 0u64..100_000_000, cents in 0u32..100) {
            let plain = format!("{dollars}.{cents:02}");
            let grouped = format!("${}.{cents:02}", group_thousands(dollars));
            let expected: f64 = plain.parse().unwrap();
            prop_assert_eq!(find_amount(&grouped), Some(expected));
        }
    }
}
