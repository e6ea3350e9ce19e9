//! Resolving a clicked chart category back to the rows behind it.
//!
//! The chart's x key is not always the column that holds the clicked label
//! (backend frames are often aggregated or renamed), so the grouping field is
//! resolved against the dataset first and the rows are filtered second.

use crate::core::Row;
use crate::core::value::{is_blank, loose_string};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Column name fragments tried, in order, when the x key is blank in the data.
const GROUPING_HINTS: [&str; 5] = ["supplier", "vendor", "manufacturer", "company", "brand"];

/// How the drilled rows were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchMode {
    Exact,
    Substring,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact match"),
            MatchMode::Substring => write!(f, "partial match"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillResult {
    pub label: String,
    pub field: String,
    pub match_mode: MatchMode,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillOutcome {
    NoDetailData,
    NoMatch { label: String },
    Found(DrillResult),
}

impl DrillOutcome {
    /// User-facing notice for outcomes that do not open a window.
    pub fn notice(&self) -> Option<String> {
        match self {
            DrillOutcome::NoDetailData => Some("No detail data is available".to_string()),
            DrillOutcome::NoMatch { label } => {
                Some(format!("No detailed data available for \"{label}\""))
            }
            DrillOutcome::Found(_) => None,
        }
    }
}

/// Pick the column that holds `label`.
///
/// The first column (in the first row's key order) where any row matches the
/// label wins. Failing that, when the first row has no usable `x_key` value a
/// supplier-like column is used; otherwise `x_key` itself.
pub fn resolve_field(rows: &[Row], label: &str, x_key: &str) -> String {
    let Some(first) = rows.first() else {
        return x_key.to_string();
    };
    let wanted = label.to_lowercase();

    let matched = first.columns().find(|column| {
        rows.iter()
            .any(|row| loose_string(row.get(column)).to_lowercase() == wanted)
    });
    if let Some(column) = matched {
        return column.to_string();
    }

    if is_blank(first.get(x_key)) {
        for hint in GROUPING_HINTS {
            if let Some(column) = first
                .columns()
                .find(|column| column.to_lowercase().contains(hint))
            {
                return column.to_string();
            }
        }
    }
    x_key.to_string()
}

/// Filter `rows` down to the ones behind `label`: exact case-insensitive
/// matches on the resolved field, else substring matches.
pub fn drill_down(rows: &[Row], label: &str, x_key: &str) -> DrillOutcome {
    if rows.is_empty() {
        return DrillOutcome::NoDetailData;
    }

    let field = resolve_field(rows, label, x_key);
    let wanted = label.to_lowercase();
    let cell = |row: &Row| loose_string(row.get(&field)).to_lowercase();

    let exact: Vec<Row> = rows.iter().filter(|&r| cell(r) == wanted).cloned().collect();
    let (match_mode, matched) = if !exact.is_empty() {
        (MatchMode::Exact, exact)
    } else {
        let partial: Vec<Row> = rows
            .iter()
            .filter(|&r| cell(r).contains(&wanted))
            .cloned()
            .collect();
        (MatchMode::Substring, partial)
    };

    if matched.is_empty() {
        debug!("Drill-down on '{label}' via '{field}' matched nothing");
        return DrillOutcome::NoMatch {
            label: label.to_string(),
        };
    }

    debug!(
        "Drill-down on '{label}' via '{field}' ({match_mode}): {} rows",
        matched.len()
    );
    DrillOutcome::Found(DrillResult {
        label: label.to_string(),
        field,
        match_mode,
        rows: matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn inventory() -> Vec<Row> {
        vec![
            Row::from_pairs([
                ("Item", json!("Bolt")),
                ("Supplier", json!("Acme Corp")),
                ("Qty", json!(5)),
            ]),
            Row::from_pairs([
                ("Item", json!("Nut")),
                ("Supplier", json!("Globex")),
                ("Qty", json!(0)),
            ]),
        ]
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(drill_down(&[], "Acme", "Supplier"), DrillOutcome::NoDetailData);
    }

    #[test]
    fn test_field_found_by_value_not_x_key() {
        // x key from an aggregated frame that the raw rows do not carry
        assert_eq!(resolve_field(&inventory(), "globex", "vendor_name"), "Supplier");
    }

    #[test]
    fn test_hint_column_when_x_key_blank() {
        assert_eq!(resolve_field(&inventory(), "Initech", "vendor_name"), "Supplier");
    }

    #[test]
    fn test_nominal_x_key_when_present() {
        assert_eq!(resolve_field(&inventory(), "Initech", "Item"), "Item");
    }

    #[test]
    fn test_zero_never_matches_as_label() {
        // A zero quantity coalesces to blank and cannot be drilled into as "0"
        let outcome = drill_down(&inventory(), "0", "Qty");
        assert_eq!(
            outcome,
            DrillOutcome::NoMatch {
                label: "0".to_string()
            }
        );
        assert_eq!(
            outcome.notice().as_deref(),
            Some("No detailed data available for \"0\"")
        );
    }

    #[test]
    fn test_substring_fallback() {
        let DrillOutcome::Found(result) = drill_down(&inventory(), "acme", "Supplier") else {
            panic!("expected rows");
        };
        assert_eq!(result.match_mode, MatchMode::Substring);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.field, "Supplier");
    }

    #[test]
    fn test_idempotent() {
        let rows = inventory();
        assert_eq!(
            drill_down(&rows, "Globex", "Supplier"),
            drill_down(&rows, "Globex", "Supplier")
        );
    }
}
