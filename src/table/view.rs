//! Sortable, filterable, paginated view over a set of rows.
//!
//! The view keeps the source rows untouched and recomputes the ordered list of
//! visible row indices every time a sort or filter input changes.

use super::derived::DerivedColumns;
use super::format::{format_cell, header_label};
use crate::core::value::{compare_values, display, display_opt, is_present};
use crate::core::{Row, TabularFrame};
use crate::error::Result;
use crate::services::export::write_delimited;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};
use tracing::debug;

/// Number of page buttons shown by the pager.
const PAGER_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "▲"),
            SortDirection::Descending => write!(f, "▼"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

/// Allowed page sizes.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize,
)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    #[default]
    TwentyFive,
    Fifty,
    Hundred,
}

impl PageSize {
    pub fn rows(self) -> usize {
        match self {
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    /// Next size in the cycle 25 → 50 → 100 → 25.
    pub fn next(self) -> Self {
        match self {
            PageSize::TwentyFive => PageSize::Fifty,
            PageSize::Fifty => PageSize::Hundred,
            PageSize::Hundred => PageSize::TwentyFive,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(n: usize) -> std::result::Result<Self, Self::Error> {
        PageSize::iter()
            .find(|size| size.rows() == n)
            .ok_or_else(|| format!("page size must be 25, 50 or 100, got {n}"))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> usize {
        size.rows()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows())
    }
}

/// Construction options for a [`TableView`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub page_size: PageSize,
    pub long_text_threshold: usize,
    /// Computed inventory value, used for drill-down detail tables.
    pub derived: Option<DerivedColumns>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            long_text_threshold: 100,
            derived: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableView {
    columns: Vec<String>,
    rows: Vec<Row>,
    hidden: HashSet<String>,
    sort: Option<SortState>,
    column_filters: BTreeMap<String, String>,
    global_filter: String,
    page_index: usize,
    page_size: PageSize,
    long_text_threshold: usize,
    derived: Option<DerivedColumns>,
    /// Source row indices after filtering and sorting
    visible: Vec<usize>,
}

impl TableView {
    pub fn new(frame: &TabularFrame, options: &TableOptions) -> Self {
        let mut view = Self {
            columns: frame.effective_columns(),
            rows: Vec::new(),
            hidden: HashSet::new(),
            sort: None,
            column_filters: BTreeMap::new(),
            global_filter: String::new(),
            page_index: 0,
            page_size: options.page_size,
            long_text_threshold: options.long_text_threshold,
            derived: options.derived.clone(),
            visible: Vec::new(),
        };
        view.set_rows(frame.data.clone());
        view.hide_long_text_columns();
        view
    }

    pub fn from_rows(rows: Vec<Row>, options: &TableOptions) -> Self {
        Self::new(&TabularFrame::new(Vec::new(), rows), options)
    }

    /// Replace the source rows. Derived columns are recomputed; sort, filters
    /// and visibility are kept.
    pub fn set_rows(&mut self, mut rows: Vec<Row>) {
        if self.columns.is_empty()
            && let Some(first) = rows.first()
        {
            self.columns = first.columns().map(str::to_string).collect();
        }
        if let Some(derived) = &self.derived
            && derived.applies_to(&rows)
        {
            derived.apply(&mut rows);
            if !self.columns.contains(&derived.output_field) {
                self.columns.push(derived.output_field.clone());
            }
        }
        self.rows = rows;
        self.refresh();
    }

    fn hide_long_text_columns(&mut self) {
        let Some(first) = self.rows.first() else {
            return;
        };
        let long: Vec<String> = self
            .columns
            .iter()
            .filter(|col| {
                matches!(first.get(col), Some(serde_json::Value::String(s))
                    if s.chars().count() > self.long_text_threshold)
            })
            .cloned()
            .collect();
        if !long.is_empty() {
            debug!("Hiding long text columns: {:?}", long);
        }
        self.hidden.extend(long);
    }

    fn row_matches(&self, row: &Row) -> bool {
        let column_ok = self.column_filters.iter().all(|(col, needle)| {
            display_opt(row.get(col))
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        if !column_ok {
            return false;
        }
        if self.global_filter.is_empty() {
            return true;
        }
        let needle = self.global_filter.to_lowercase();
        row.iter()
            .any(|(_, value)| display(value).to_lowercase().contains(&needle))
    }

    fn refresh(&mut self) {
        let mut visible: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.row_matches(&self.rows[i]))
            .collect();

        if let Some(sort) = &self.sort {
            let col = sort.column.as_str();
            // Null and absent cells sort last in either direction
            visible.sort_by(|&a, &b| {
                let (va, vb) = (self.rows[a].get(col), self.rows[b].get(col));
                match (is_present(va), is_present(vb)) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => match sort.direction {
                        SortDirection::Ascending => compare_values(va, vb),
                        SortDirection::Descending => compare_values(va, vb).reverse(),
                    },
                }
            });
        }
        self.visible = visible;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        let last = self.page_count().saturating_sub(1);
        if self.page_index > last {
            self.page_index = last;
        }
    }

    // Columns and visibility

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn visible_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(c.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn is_visible(&self, column: &str) -> bool {
        !self.hidden.contains(column)
    }

    pub fn set_column_visible(&mut self, column: &str, visible: bool) {
        if visible {
            self.hidden.remove(column);
        } else {
            self.hidden.insert(column.to_string());
        }
    }

    pub fn toggle_column(&mut self, column: &str) {
        let visible = self.is_visible(column);
        self.set_column_visible(column, !visible);
    }

    pub fn show_all_columns(&mut self) {
        self.hidden.clear();
    }

    pub fn header_labels(&self) -> Vec<String> {
        self.visible_columns().into_iter().map(header_label).collect()
    }

    // Sorting

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Cycle the sort on `column`: none → ascending → descending → none. A
    /// different column starts again at ascending. The page index is kept.
    pub fn cycle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some(SortState { column: current, direction }) if current == column => {
                match direction {
                    SortDirection::Ascending => Some(SortState {
                        column: current,
                        direction: SortDirection::Descending,
                    }),
                    SortDirection::Descending => None,
                }
            }
            _ => Some(SortState {
                column: column.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
        self.refresh();
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.refresh();
    }

    // Filtering; every change returns to the first page

    pub fn column_filter(&self, column: &str) -> Option<&str> {
        self.column_filters.get(column).map(String::as_str)
    }

    pub fn column_filters(&self) -> &BTreeMap<String, String> {
        &self.column_filters
    }

    /// Set a column's substring filter; empty text removes it.
    pub fn set_column_filter(&mut self, column: &str, text: &str) {
        if text.is_empty() {
            self.column_filters.remove(column);
        } else {
            self.column_filters
                .insert(column.to_string(), text.to_string());
        }
        self.page_index = 0;
        self.refresh();
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn set_global_filter(&mut self, text: &str) {
        self.global_filter = text.to_string();
        self.page_index = 0;
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.column_filters.clear();
        self.global_filter.clear();
        self.page_index = 0;
        self.refresh();
    }

    // Pagination

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Change the page size, keeping the first row of the current page visible.
    pub fn set_page_size(&mut self, size: PageSize) {
        let first_row = self.page_index * self.page_size.rows();
        self.page_size = size;
        self.page_index = first_row / size.rows();
        self.clamp_page();
    }

    pub fn cycle_page_size(&mut self) {
        self.set_page_size(self.page_size.next());
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Number of pages; zero when no rows pass the filters.
    pub fn page_count(&self) -> usize {
        self.visible.len().div_ceil(self.page_size.rows())
    }

    pub fn set_page_index(&mut self, index: usize) {
        self.page_index = index;
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        self.set_page_index(self.page_index + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page_index(self.page_index.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    pub fn last_page(&mut self) {
        self.page_index = self.page_count().saturating_sub(1);
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Filtered and sorted rows across every page.
    pub fn filtered_rows(&self) -> impl Iterator<Item = &Row> {
        self.visible.iter().map(|&i| &self.rows[i])
    }

    pub fn page_rows(&self) -> Vec<&Row> {
        let size = self.page_size.rows();
        self.visible
            .iter()
            .skip(self.page_index * size)
            .take(size)
            .map(|&i| &self.rows[i])
            .collect()
    }

    pub fn page_summary(&self) -> String {
        let total = self.visible.len();
        if total == 0 {
            return "Showing 0-0 of 0 items".to_string();
        }
        let size = self.page_size.rows();
        let start = self.page_index * size + 1;
        let end = ((self.page_index + 1) * size).min(total);
        format!("Showing {start}-{end} of {total} items")
    }

    /// One-based page numbers for the pager: at most five, centred on the
    /// current page once it is away from either end.
    pub fn page_buttons(&self) -> Vec<usize> {
        let total = self.page_count();
        let current = self.page_index + 1;
        let width = PAGER_WIDTH.min(total);
        let start = if total <= PAGER_WIDTH || current <= 3 {
            1
        } else if current + 2 >= total {
            total + 1 - PAGER_WIDTH
        } else {
            current - 2
        };
        (start..start + width).collect()
    }

    // Display and export

    /// Formatted cell text for display.
    pub fn display_cell(&self, row: &Row, column: &str) -> String {
        let quantity: &[String] = self
            .derived
            .as_ref()
            .map(|d| d.quantity_columns())
            .unwrap_or(&[]);
        format_cell(column, row.get(column), quantity)
    }

    /// CSV of the visible columns over all filtered rows, unformatted.
    pub fn export_csv(&self) -> Result<String> {
        let columns = self.visible_columns();
        write_delimited(
            columns.iter().copied(),
            self.filtered_rows()
                .map(|row| columns.iter().map(|c| row.display(c)).collect::<Vec<_>>()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn numbered(n: usize) -> TableView {
        let rows = (1..=n)
            .map(|i| Row::from_pairs([("Id", json!(i)), ("Name", json!(format!("item {i}")))]))
            .collect();
        TableView::from_rows(rows, &TableOptions::default())
    }

    #[test]
    fn test_first_page_summary() {
        let view = numbered(120);
        assert_eq!(view.page_summary(), "Showing 1-25 of 120 items");
        assert_eq!(view.page_rows().len(), 25);
        assert_eq!(view.page_rows()[0].get("Id"), Some(&json!(1)));
        assert_eq!(view.page_count(), 5);
    }

    #[test]
    fn test_empty_summary() {
        let view = numbered(0);
        assert_eq!(view.page_summary(), "Showing 0-0 of 0 items");
        assert!(view.page_buttons().is_empty());
    }

    #[test]
    fn test_sort_cycle() {
        let mut view = numbered(3);
        view.cycle_sort("Id");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Ascending);
        view.cycle_sort("Id");
        assert_eq!(view.page_rows()[0].get("Id"), Some(&json!(3)));
        view.cycle_sort("Id");
        assert!(view.sort().is_none());
        view.cycle_sort("Id");
        view.cycle_sort("Name");
        assert_eq!(
            view.sort(),
            Some(&SortState {
                column: "Name".to_string(),
                direction: SortDirection::Ascending
            })
        );
    }

    #[test]
    fn test_sort_is_typed_and_stable() {
        let rows = vec![
            Row::from_pairs([("V", json!(10)), ("Tag", json!("a"))]),
            Row::from_pairs([("V", json!("x")), ("Tag", json!("b"))]),
            Row::from_pairs([("V", json!(9)), ("Tag", json!("c"))]),
            Row::from_pairs([("V", json!(10)), ("Tag", json!("d"))]),
            Row::from_pairs([("V", serde_json::Value::Null), ("Tag", json!("e"))]),
        ];
        let mut view = TableView::from_rows(rows, &TableOptions::default());
        view.cycle_sort("V");
        let tags: Vec<String> = view.page_rows().iter().map(|r| r.display("Tag")).collect();
        assert_eq!(tags, vec!["c", "a", "d", "b", "e"]);

        view.cycle_sort("V");
        let tags: Vec<String> = view.page_rows().iter().map(|r| r.display("Tag")).collect();
        assert_eq!(tags, vec!["b", "a", "d", "c", "e"]);
    }

    #[test]
    fn test_filters_reset_page() {
        let mut view = numbered(120);
        view.last_page();
        assert_eq!(view.page_index(), 4);
        view.set_global_filter("ITEM 1");
        assert_eq!(view.page_index(), 0);
        // 1, 10-19, 100-120
        assert_eq!(view.filtered_len(), 32);

        // 11 and 110-119
        view.set_column_filter("Id", "11");
        assert_eq!(view.filtered_len(), 11);
        view.set_column_filter("Id", "");
        assert_eq!(view.filtered_len(), 32);
    }

    #[test]
    fn test_sort_keeps_page() {
        let mut view = numbered(120);
        view.next_page();
        view.cycle_sort("Id");
        assert_eq!(view.page_index(), 1);
    }

    #[test]
    fn test_page_size_keeps_top_row() {
        let mut view = numbered(120);
        view.set_page_index(3);
        view.set_page_size(PageSize::Fifty);
        assert_eq!(view.page_index(), 1);
        assert_eq!(view.page_summary(), "Showing 51-100 of 120 items");
        assert_eq!(PageSize::try_from(30), Err("page size must be 25, 50 or 100, got 30".into()));
    }

    #[test]
    fn test_page_buttons_window() {
        let mut view = numbered(250);
        assert_eq!(view.page_buttons(), vec![1, 2, 3, 4, 5]);
        view.set_page_index(5);
        assert_eq!(view.page_buttons(), vec![4, 5, 6, 7, 8]);
        view.last_page();
        assert_eq!(view.page_buttons(), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_long_text_hidden_and_export() {
        let long = "x".repeat(101);
        let rows = vec![
            Row::from_pairs([("Item", json!("Bolt, M4")), ("Notes", json!(long)), ("Qty", json!(3))]),
            Row::from_pairs([("Item", json!("Nut")), ("Notes", json!("short")), ("Qty", json!(1))]),
        ];
        let mut view = TableView::from_rows(rows, &TableOptions::default());
        assert_eq!(view.visible_columns(), vec!["Item", "Qty"]);
        assert_eq!(view.export_csv().unwrap(), "Item,Qty\n\"Bolt, M4\",3\nNut,1");

        view.toggle_column("Notes");
        assert_eq!(view.visible_columns(), vec!["Item", "Notes", "Qty"]);
    }

    #[test]
    fn test_derived_detail_table() {
        let rows = vec![Row::from_pairs([
            ("Item", json!("Bolt")),
            ("Qty", json!("1200")),
            ("Cost", json!(2.5)),
        ])];
        let options = TableOptions {
            derived: Some(DerivedColumns::default()),
            ..TableOptions::default()
        };
        let view = TableView::from_rows(rows, &options);
        assert_eq!(view.columns(), &["Item", "Qty", "Cost", "Inventory_Value"]);
        let row = view.page_rows()[0];
        assert_eq!(view.display_cell(row, "Inventory_Value"), "$3,000.00");
        assert_eq!(view.display_cell(row, "Qty"), "1,200");
        assert_eq!(view.display_cell(row, "Cost"), "$2.50");
    }
}
