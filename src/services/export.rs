//! Comma-separated export of windows and chart data.

use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref RESERVED: Regex = Regex::new(r#"[/\\:*?"<>|]"#).unwrap();
}

/// A rendered CSV export ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

/// Serialize a header and records as CSV. Cells are quoted only when they
/// contain the delimiter, a quote or a line break; quotes are doubled.
pub fn write_delimited<H, R, C>(header: H, records: R) -> Result<String>
where
    H: IntoIterator,
    H::Item: AsRef<str>,
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: AsRef<str>,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header.into_iter().map(|h| h.as_ref().to_string()))?;
    for record in records {
        writer.write_record(record.into_iter().map(|c| c.as_ref().to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// File name for an export. Whitespace runs in the title and suffix become
/// underscores, as do path separators and characters reserved on Windows.
pub fn export_file_name(title: &str, suffix: &str) -> String {
    let stem = format!("{}{}", title.trim(), suffix.trim_end());
    let stem = WHITESPACE.replace_all(&stem, "_");
    let stem = RESERVED.replace_all(&stem, "_");
    format!("{stem}.csv")
}

/// Write an export into `dir` and return the written path.
pub fn write_export(dir: &Path, export: &CsvExport) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)?;
    }
    let path = dir.join(&export.file_name);
    std::fs::write(&path, &export.contents)?;
    info!("Exported {} bytes to {}", export.contents.len(), path.display());
    Ok(path)
}
