use crate::core::row::Row;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The full row collection from one CSV upload.
///
/// Rows are shared behind an `Arc`: windows keep a clone as their drill-down
/// source, and a new upload replaces the session's dataset without touching the
/// copies those windows hold.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    rows: Arc<Vec<Row>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows: Arc::new(rows),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, in the first row's key order
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Whether two handles point at the same loaded rows
    pub fn same_rows(&self, other: &Dataset) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }

    /// Returns a summary string with row/column count.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows, {} columns",
            self.name,
            self.row_count(),
            self.columns().len()
        )
    }
}

/// A `{columns, data}` projection of rows, as produced by the analysis backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularFrame {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Row>,
}

impl TabularFrame {
    pub fn new(columns: Vec<String>, data: Vec<Row>) -> Self {
        Self { columns, data }
    }

    /// Columns to display: the declared list, or the first row's keys when the
    /// frame arrived without one.
    pub fn effective_columns(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        self.data
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_columns_follow_first_row() {
        let ds = Dataset::new(
            "inv.csv",
            vec![
                Row::from_pairs([("Supplier", json!("Acme")), ("Qty", json!(10))]),
                Row::from_pairs([("Qty", json!(3)), ("Supplier", json!("Globex"))]),
            ],
        );
        assert_eq!(ds.columns(), vec!["Supplier", "Qty"]);
        assert_eq!(ds.summary(), "inv.csv: 2 rows, 2 columns");
    }

    #[test]
    fn test_clones_share_rows() {
        let ds = Dataset::new("a", vec![Row::new()]);
        let other = ds.clone();
        assert!(ds.same_rows(&other));
        assert!(!ds.same_rows(&Dataset::new("a", vec![Row::new()])));
    }

    #[test]
    fn test_frame_deserialize() {
        let frame: TabularFrame =
            serde_json::from_str(r#"{"columns":["A"],"data":[{"A":1}]}"#).unwrap();
        assert_eq!(frame.effective_columns(), vec!["A"]);
        let bare: TabularFrame = serde_json::from_str(r#"{"data":[{"B":1}]}"#).unwrap();
        assert_eq!(bare.effective_columns(), vec!["B"]);
    }
}
