//! CSV parser for metrics tables.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use polars::prelude::*;
use std::io::{Cursor, Read};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Cell contents read as missing, the same set pandas treats as NA by
/// default. Empty cells are always missing.
pub const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Decodes a CSV document (optionally gzip-compressed) into a [`DataFrame`].
///
/// Column types are inferred from every row. Integer columns holding a
/// missing cell are widened to `Float64`, and a column with no values at all
/// is an all-missing `Float64` column. Everything else keeps the type polars
/// infers, so whole-number columns stay `Int64` and are never scored.
///
/// # Errors
///
/// Returns an error if the bytes are not valid gzip or CSV.
pub fn parse_table(bytes: &[u8]) -> Result<DataFrame> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .context("failed to decompress gzip CSV")?;
        return parse_csv(decoded);
    }
    parse_csv(bytes.to_vec())
}

fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(DataFrame::empty());
    }

    let null_values = NullValues::AllColumns(MISSING_TOKENS.iter().map(|t| (*t).into()).collect());
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("failed to parse CSV")?;

    widen_missing(df)
}

/// Casts integer columns with gaps, and columns with no values, to `Float64`.
fn widen_missing(df: DataFrame) -> Result<DataFrame> {
    let casts: Vec<Expr> = df
        .get_columns()
        .iter()
        .filter(|c| {
            let nulls = c.null_count();
            (c.dtype().is_integer() && nulls > 0) || (c.len() > 0 && nulls == c.len())
        })
        .map(|c| col(c.name().as_str()).cast(DataType::Float64))
        .collect();

    if casts.is_empty() {
        return Ok(df);
    }
    df.lazy()
        .with_columns(casts)
        .collect()
        .context("failed to widen columns with missing values")
}
