//! Per-metric scores and grades.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::scoring::category::Category;
use crate::scoring::grade::convert_to_grade;
use crate::scoring::scale::{scale_series, scale_series_inverted};

/// Valuation ratios where a lower raw value is better.
pub const VALUATION_METRICS: &[&str] = Category::Valuation.metrics();

/// Bookkeeping columns added by persistence, never scored.
pub const METADATA_COLUMNS: &[&str] = &["_saved_timestamp", "_backup_timestamp"];

pub const SCORE_PREFIX: &str = "score - ";
pub const GRADE_PREFIX: &str = "AAA - ";

pub fn score_column(name: &str) -> String {
    format!("{SCORE_PREFIX}{name}")
}

pub fn grade_column(name: &str) -> String {
    format!("{GRADE_PREFIX}{name}")
}

/// Letter grades for a column of scores, named `name`.
pub fn grade_series(name: &str, scores: &Float64Chunked) -> Series {
    scores
        .into_iter()
        .map(|s| convert_to_grade(s.unwrap_or(f64::NAN)).as_str())
        .collect::<StringChunked>()
        .with_name(name.into())
        .into_series()
}

/// Float columns that get a per-metric score, in table order.
fn scoring_candidates(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_float())
        .map(|c| c.name().to_string())
        .filter(|name| !METADATA_COLUMNS.contains(&name.as_str()))
        .collect()
}

/// Adds a `score - <metric>` column for every float, non-metadata column.
///
/// Integer and text columns are passed through. Valuation metrics are
/// inverted so the cheapest instrument scores 10.
pub fn score_metrics(df: &mut DataFrame) -> Result<()> {
    for name in scoring_candidates(df) {
        let raw = df.column(&name)?.f64()?;
        let (column, scores) = if VALUATION_METRICS.contains(&name.as_str()) {
            (score_column(&name), scale_series_inverted(raw))
        } else {
            (score_column(&name.to_lowercase()), scale_series(raw))
        };
        df.with_column(scores.with_name(column.into()).into_series())
            .with_context(|| format!("failed to add score for '{name}'"))?;
    }
    Ok(())
}

/// Adds an `AAA - <metric>` grade column for every `score - <metric>` column.
pub fn grade_metrics(df: &mut DataFrame) -> Result<()> {
    let score_columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.starts_with(SCORE_PREFIX))
        .map(|name| name.to_string())
        .collect();

    for column in score_columns {
        let metric = column.trim_start_matches(SCORE_PREFIX).to_lowercase();
        let grades = grade_series(&grade_column(&metric), df.column(&column)?.f64()?);
        df.with_column(grades)?;
    }
    Ok(())
}
