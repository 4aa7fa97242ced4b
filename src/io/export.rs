//! Delimited-text export boundary
//!
//! Report rows are rendered to UTF-8 CSV with a leading BOM; the BOM is
//! load-bearing for the spreadsheet imports downstream, do not drop it.
//! Cells containing the delimiter, quotes or newlines are quoted.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

/// One output column: header label plus cell projection
pub struct Column<T> {
    pub label: &'static str,
    pub cell: fn(&T) -> String,
}

impl<T> Column<T> {
    pub fn new(label: &'static str, cell: fn(&T) -> String) -> Self {
        Self { label, cell }
    }
}

/// Render rows into BOM-prefixed delimited text with a header row
pub fn to_delimited_text<T>(rows: &[T], columns: &[Column<T>]) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|c| c.label))
        .context("failed to write header row")?;
    for row in rows {
        writer
            .write_record(columns.iter().map(|c| (c.cell)(row)))
            .context("failed to write data row")?;
    }

    let bytes = writer.into_inner().context("failed to flush csv writer")?;
    let text = String::from_utf8(bytes).context("csv output was not valid utf-8")?;
    Ok(format!("\u{FEFF}{}", text))
}

/// Write export text under `dir`, creating the directory if needed
pub fn write_export(dir: &str, file_name: &str, text: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(dir).join(file_name);
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&path, text.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(file = %path.display(), bytes = %text.len(), "export_written");
    Ok(path)
}
