//! Concrete collaborators.
//!
//! [`local`] keeps tables as CSV files in directories, [`s3`] keeps them as
//! objects in a bucket, and [`http`] reads source tables from a web server.

pub mod http;
pub mod local;
pub mod s3;

use anyhow::Result;
use chrono::{DateTime, Utc};
use polars::prelude::*;

/// Column recording when a table was persisted.
pub const SAVED_TIMESTAMP: &str = "_saved_timestamp";

/// Column recording when a backup copy was taken.
pub const BACKUP_TIMESTAMP: &str = "_backup_timestamp";

/// File (or object) name of a persisted destination.
pub fn table_file_name(destination: &str, gzip: bool) -> String {
    if gzip {
        format!("{destination}.csv.gz")
    } else {
        format!("{destination}.csv")
    }
}

/// Compact timestamp used in backup names, e.g. `20250131T094500.123Z`.
pub fn backup_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Sets `column` to the RFC 3339 form of `at` on every row.
pub fn stamp_table(df: &mut DataFrame, column: &str, at: DateTime<Utc>) -> Result<()> {
    let stamp = at.to_rfc3339();
    df.with_column(Column::new(column.into(), vec![stamp; df.height()]))?;
    Ok(())
}
