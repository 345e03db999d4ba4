//! Output formatting and persistence for metrics tables.
//!
//! Supports CSV encoding (optionally gzip-compressed), atomic file writes and
//! JSON rendering for logs.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use polars::prelude::*;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Encodes a table as CSV with a header row. Missing cells are left empty.
pub fn to_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(df)
        .context("failed to encode CSV")?;
    Ok(buf)
}

/// Encodes a table as CSV, gzip-compressing the result when `gzip` is set.
pub fn encode_table(df: &mut DataFrame, gzip: bool) -> Result<Vec<u8>> {
    let csv = to_csv_bytes(df)?;
    if !gzip {
        return Ok(csv);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&csv)?;
    Ok(encoder.finish()?)
}

/// Writes a table to `path`, replacing any existing file.
///
/// The file is first written next to the target and then renamed, so readers
/// never observe a partially written table.
pub async fn write_table(path: &Path, df: &mut DataFrame, gzip: bool) -> Result<()> {
    let body = encode_table(df, gzip)?;
    debug!(path = %path.display(), bytes = body.len(), gzip, "Writing table");

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &body)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move {} into place", tmp.display()))?;
    Ok(())
}

/// Renders a table as a JSON array with one object per row.
pub fn to_json(df: &mut DataFrame) -> Result<String> {
    let mut buf = Vec::new();
    JsonWriter::new(&mut buf)
        .with_json_format(JsonFormat::Json)
        .finish(df)
        .context("failed to encode JSON")?;
    Ok(String::from_utf8(buf)?)
}

/// Logs a table as JSON.
pub fn print_json(df: &mut DataFrame) -> Result<()> {
    info!("{}", to_json(df)?);
    Ok(())
}
