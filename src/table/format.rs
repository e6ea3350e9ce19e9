//! Display-only formatting for table cells and headers.
//!
//! Nothing here changes the underlying values; sorting, filtering and export
//! all work on the raw cells.

use crate::core::value::{display, format_number};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref MONEY_COLUMN: Regex = Regex::new(r"(?i)(value|cost)").unwrap();
}

/// Friendly names for well-known inventory export headers.
const HEADER_MAP: [(&str, &str); 6] = [
    ("ITEM_ID", "Item ID"),
    ("ITEM_DESCRIPTION", "Description"),
    ("TOTAL_INVENTORY_VALUE", "Total Inventory Value"),
    ("AVG_COST", "Avg. Cost"),
    ("QTY_ON_HAND", "Qty On Hand"),
    ("AVG_LEADTIME", "Avg. Lead Time"),
];

/// Header label for a column: a known mapping, else underscores become spaces
/// and each word is capitalised.
pub fn header_label(column: &str) -> String {
    if let Some((_, label)) = HEADER_MAP.iter().find(|(key, _)| *key == column) {
        return label.to_string();
    }
    column
        .replace('_', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether numbers in this column are money.
pub fn is_money_column(column: &str) -> bool {
    MONEY_COLUMN.is_match(column)
}

fn group_digits(int_part: u64) -> String {
    let digits = int_part.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$1,234.50`, two decimals, sign in front of the symbol.
pub fn format_currency(n: f64) -> String {
    let cents = (n.abs() * 100.0).round() as u64;
    let sign = if n < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_digits(cents / 100), cents % 100)
}

/// Thousands separators with up to three decimals, trailing zeros dropped.
pub fn format_grouped(n: f64) -> String {
    let scaled = (n.abs() * 1000.0).round() as u64;
    let sign = if n < 0.0 && scaled > 0 { "-" } else { "" };
    let whole = group_digits(scaled / 1000);
    let frac = scaled % 1000;
    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        let frac = format!("{frac:03}");
        format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

/// Display text for a cell. `quantity_columns` get digit grouping, numeric
/// money columns get currency formatting, everything else renders plainly.
pub fn format_cell(column: &str, value: Option<&Value>, quantity_columns: &[String]) -> String {
    match value {
        Some(Value::Number(n)) => {
            let n = n.as_f64().unwrap_or(0.0);
            if is_money_column(column) {
                format_currency(n)
            } else if quantity_columns.iter().any(|q| q == column) {
                format_grouped(n)
            } else {
                format_number(n)
            }
        }
        Some(other) => display(other),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_header_labels() {
        assert_eq!(header_label("AVG_COST"), "Avg. Cost");
        assert_eq!(header_label("Quantity_on_Hand"), "Quantity On Hand");
        assert_eq!(header_label("supplier"), "Supplier");
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-12.345), "-$12.35");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn test_grouped() {
        assert_eq!(format_grouped(1234.0), "1,234");
        assert_eq!(format_grouped(12.5), "12.5");
        assert_eq!(format_grouped(999.0), "999");
    }

    #[test]
    fn test_format_cell() {
        let qty = vec!["Qty".to_string()];
        assert_eq!(format_cell("Inventory_Value", Some(&json!(36)), &qty), "$36.00");
        assert_eq!(format_cell("Qty", Some(&json!(12000)), &qty), "12,000");
        assert_eq!(format_cell("Cost", Some(&json!("n/a")), &qty), "n/a");
        assert_eq!(format_cell("Item", Some(&json!(7)), &qty), "7");
        assert_eq!(format_cell("Item", None, &qty), "");
    }
}
