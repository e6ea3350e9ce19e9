//! Client-side CSV parsing into an in-memory [`Dataset`].
//!
//! Parsing is best-effort: the header names the columns, blank lines are skipped,
//! and each cell becomes a number when its text parses as one.

use crate::core::value::{number_value, parse_number};
use crate::core::{CsvImportOptions, Dataset, Row};
use crate::error::{OptixError, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Parse CSV text into rows.
pub fn parse_rows(text: &str, options: &CsvImportOptions) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .quote(options.quote_char)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() {
        return Err(OptixError::MissingHeader);
    }

    let mut rows = Vec::new();
    let mut extra_field_records = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.len() > headers.len() {
            extra_field_records += 1;
        }
        let row = Row::from_pairs(
            headers
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.clone(), coerce_cell(cell))),
        );
        rows.push(row);
    }

    if extra_field_records > 0 {
        warn!("{extra_field_records} CSV record(s) had more fields than the header; extras ignored");
    }
    debug!("Parsed {} rows with {} columns", rows.len(), headers.len());
    Ok(rows)
}

/// Parse CSV text into a named dataset.
pub fn parse_dataset(name: &str, text: &str, options: &CsvImportOptions) -> Result<Dataset> {
    Ok(Dataset::new(name, parse_rows(text, options)?))
}

/// Read a CSV file from disk and parse it.
pub fn load_file(path: &Path, options: &CsvImportOptions) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_dataset(&name, &text, options)
}

fn coerce_cell(cell: &str) -> Value {
    match parse_number(cell) {
        Some(n) => number_value(n),
        None => Value::String(cell.to_string()),
    }
}
