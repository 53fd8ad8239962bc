//! Line-item extraction strategies.
//!
//! Vendors render order items three broadly different ways, so extraction
//! runs an ordered list of pure strategies over the scanned document and
//! takes the first non-empty result. Later strategies are progressively
//! more aggressive and more prone to false positives, which is why the
//! ordering is fixed and why the last one caps its output.

use crate::markup::{Document, TableRow};
use crate::model::ParsedOrderItem;
use crate::patterns;

/// A pure extraction pass over a scanned document.
pub(crate) type Strategy = fn(&Document) -> Vec<ParsedOrderItem>;

/// Strategies in priority order.
pub(crate) const STRATEGIES: [Strategy; 3] = [table_items, block_items, context_window_items];

/// Aggressive line scanning stops after this many accepted items.
const CONTEXT_WINDOW_ITEM_CAP: usize = 20;

/// Run the strategies in order, returning the first non-empty result.
pub(crate) fn extract_items(doc: &Document) -> Vec<ParsedOrderItem> {
    for strategy in STRATEGIES {
        let items = strategy(doc);
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

/// Tabular strategy: parse rows of tables that talk about products.
fn table_items(doc: &Document) -> Vec<ParsedOrderItem> {
    let mut items = Vec::new();
    for table in doc.tables() {
        let table_text = table.text().to_lowercase();
        if !table_text.contains("product") && !table_text.contains("item") {
            continue;
        }
        for row in table.rows() {
            if let Some(item) = item_from_row(row) {
                items.push(item);
            }
        }
    }
    items
}

fn item_from_row(row: &TableRow) -> Option<ParsedOrderItem> {
    let cells = row.cells();
    if cells.len() < 2 {
        return None;
    }

    let joined = cells.join(" ");
    let lowered = joined.to_lowercase();
    if lowered.contains("product") && lowered.contains("price") {
        // Header row, not an item.
        return None;
    }

    let quantity = patterns::find_quantity(&joined).unwrap_or(1);
    let unit_price = patterns::find_amount(&joined).unwrap_or(0.0);
    let catalog_id = patterns::find_catalog_id(&joined);

    // The name is usually the longest cell; first wins on ties.
    let mut name_cell: &str = "";
    for cell in cells {
        if cell.chars().count() > name_cell.chars().count() {
            name_cell = cell;
        }
    }
    let name = patterns::AMOUNT_IN_NAME.replace_all(name_cell, "");
    let name = patterns::QUANTITY_IN_NAME.replace_all(&name, "");
    let name = name.trim().to_string();

    (name.chars().count() > 5 && unit_price > 0.0).then(|| ParsedOrderItem {
        name,
        quantity,
        unit_price,
        catalog_id,
    })
}

/// Block strategy: priced `<div>` containers of plausible length.
fn block_items(doc: &Document) -> Vec<ParsedOrderItem> {
    let mut items = Vec::new();
    for block in doc.blocks() {
        if !patterns::AMOUNT.is_match(block) {
            continue;
        }
        let length = block.chars().count();
        if length <= 10 || length >= 500 {
            continue;
        }
        if let Some(item) = item_from_text(block) {
            if !items.contains(&item) {
                items.push(item);
            }
        }
    }
    items
}

/// Context-window strategy: scan raw lines around each detected price.
fn context_window_items(doc: &Document) -> Vec<ParsedOrderItem> {
    items_from_text_lines(doc.text())
}

/// Shared with the plain-text parsing path, which has no document to scan.
pub(crate) fn items_from_text_lines(text: &str) -> Vec<ParsedOrderItem> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut items = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !patterns::AMOUNT.is_match(line) {
            continue;
        }
        let start = i.saturating_sub(2);
        let end = (i + 3).min(lines.len());
        let window = lines[start..end].join(" ");
        if let Some(item) = item_from_text(&window) {
            if !items.contains(&item) {
                items.push(item);
            }
        }
    }
    items.truncate(CONTEXT_WINDOW_ITEM_CAP);
    items
}

/// Field extraction shared by the block and context-window strategies.
fn item_from_text(text: &str) -> Option<ParsedOrderItem> {
    let unit_price = patterns::find_amount(text)?;
    let quantity = patterns::find_quantity(text).unwrap_or(1);
    let catalog_id = patterns::find_catalog_id(text);

    let name = patterns::AMOUNT_IN_NAME.replace_all(text, "");
    let name = patterns::QUANTITY_IN_NAME.replace_all(&name, "");
    let name = patterns::CATALOG_IN_NAME.replace_all(&name, "");
    let name = normalize_whitespace(&name);
    let name = truncate_chars(name, 200);

    (name.chars().count() > 5 && unit_price > 0.0).then(|| ParsedOrderItem {
        name,
        quantity,
        unit_price,
        catalog_id,
    })
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(mut text: String, limit: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(limit) {
        text.truncate(idx);
    }
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::markup::Document;
    use std::fmt::Write;

    const PRODUCT_TABLE: &str = "\
        <table>\
          <tr><th>Product</th><th>Qty</th><th>Price</th></tr>\
          <tr><td>Wireless Mouse with USB Receiver</td><td>Qty: 2</td><td>$19.99</td></tr>\
          <tr><td>Mechanical Keyboard ASIN: B01N5IB20Q</td><td>Qty: 1</td><td>$89.50</td></tr>\
        </table>";

    #[test]
    fn test_table_strategy_parses_product_rows() {
        let doc = Document::parse(PRODUCT_TABLE);
        let items = table_items(&doc);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Wireless Mouse with USB Receiver");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price, 19.99);
        assert_eq!(items[0].catalog_id, None);

        assert!(items[1].name.contains("Mechanical Keyboard"));
        assert_eq!(items[1].quantity, 1);
        assert_eq!(items[1].unit_price, 89.50);
        assert_eq!(items[1].catalog_id, Some("B01N5IB20Q".to_string()));
    }

    #[test]
    fn test_table_strategy_skips_header_and_junk_rows() {
        let html = "\
            <table>\
              <tr><th>Product</th><th>Price</th></tr>\
              <tr><td>Free promotional sticker pack</td><td>$0.00</td></tr>\
              <tr><td>Socks</td><td>$9.99</td></tr>\
              <tr><td>Travel Mug, stainless</td><td>$14.25</td></tr>\
            </table>";
        let doc = Document::parse(html);
        let items = table_items(&doc);

        // Header (product+price), zero-priced row, and too-short name all drop.
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Travel Mug, stainless");
    }

    #[test]
    fn test_table_strategy_ignores_unrelated_tables() {
        let html = "<table><tr><td>Shipping address</td><td>12 Main St, $0.00 due</td></tr></table>";
        let doc = Document::parse(html);
        assert!(table_items(&doc).is_empty());
    }

    #[test]
    fn test_block_strategy_extracts_and_dedups() {
        let repeated = "<div>Espresso Grinder Qty: 1 $120.00</div>";
        let html = format!(
            "{repeated}{repeated}<div>tiny $1</div><div>{}</div>",
            "x".repeat(600)
        );
        let doc = Document::parse(&html);
        let items = block_items(&doc);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Espresso Grinder");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].unit_price, 120.0);
    }

    #[test]
    fn test_block_strategy_strips_catalog_from_name() {
        let html = "<div>Walnut Desk Organizer ASIN: B09XYZQ123 $34.00</div>";
        let doc = Document::parse(html);
        let items = block_items(&doc);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Walnut Desk Organizer");
        assert_eq!(items[0].catalog_id, Some("B09XYZQ123".to_string()));
    }

    #[test]
    fn test_context_window_uses_neighbor_lines() {
        let text = "Thanks for your order\nCeramic Pour-Over Set\nQty: 1\n$28.75\nShips soon";
        let items = items_from_text_lines(text);

        assert_eq!(items.len(), 1);
        assert!(items[0].name.contains("Ceramic Pour-Over Set"));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].unit_price, 28.75);
    }

    #[test]
    fn test_context_window_caps_output() {
        let mut text = String::new();
        for i in 0..30 {
            let _ = writeln!(text, "Limited Gadget Number {i} priced at ${i}.99");
        }
        let items = items_from_text_lines(&text);
        assert_eq!(items.len(), CONTEXT_WINDOW_ITEM_CAP);
    }

    #[test]
    fn test_strategies_stop_at_first_non_empty() {
        let html = format!(
            "{PRODUCT_TABLE}<div>Ambiguous Marketing Banner just $5.00 today</div>"
        );
        let doc = Document::parse(&html);
        let items = extract_items(&doc);

        // Table rows win; the priced div is never consulted.
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| !item.name.contains("Banner")));
    }

    #[test]
    fn test_strategies_fall_through_to_blocks() {
        let html = "<div>Ambiguous Marketing Banner just $5.00 today</div>";
        let doc = Document::parse(html);
        let items = extract_items(&doc);

        assert_eq!(items.len(), 1);
        assert!(items[0].name.contains("Marketing Banner"));
    }
}
