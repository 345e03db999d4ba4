//! The scoring engine: preprocessing followed by every scoring stage.

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

use crate::scoring::category::{Category, set_category_grade, set_overall_rating};
use crate::scoring::metric::{grade_metrics, score_metrics};
use crate::scoring::weights::ScoringWeights;

/// Replaces every missing value with zero.
///
/// Float columns get `0.0` for both nulls and NaN, text columns get `"0"`.
/// Other columns never hold gaps after parsing and are left alone.
pub fn fill_missing_with_zero(df: DataFrame) -> Result<DataFrame> {
    let fills: Vec<Expr> = df
        .get_columns()
        .iter()
        .filter_map(|c| {
            let name = c.name().as_str();
            match c.dtype() {
                dt if dt.is_float() => Some(col(name).fill_nan(lit(0.0)).fill_null(lit(0.0))),
                DataType::String => Some(col(name).fill_null(lit("0"))),
                _ => None,
            }
        })
        .collect();

    if fills.is_empty() {
        return Ok(df);
    }
    df.lazy()
        .with_columns(fills)
        .collect()
        .context("failed to fill missing values")
}

/// Turns a raw metrics table into a fully graded one.
///
/// Pure and deterministic: the same input always produces the same output.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Runs preprocessing, per-metric scoring and grading, the four category
    /// grades and the overall rating.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric required by a category is missing.
    pub fn grade_table(&self, df: DataFrame) -> Result<DataFrame> {
        let mut df = fill_missing_with_zero(df)?;

        score_metrics(&mut df)?;
        grade_metrics(&mut df)?;
        debug!(
            rows = df.height(),
            columns = df.width(),
            "Metric scores computed"
        );

        for category in Category::ALL {
            set_category_grade(&mut df, category, &self.weights)?;
        }
        set_overall_rating(&mut df, &self.weights)?;

        Ok(df)
    }

    /// Grades a small synthetic table covering every known metric.
    pub fn self_test(&self) -> Result<()> {
        let mut columns = vec![Column::new("ticker".into(), ["AAA", "BBB"])];
        for category in Category::ALL {
            for metric in category.metrics() {
                columns.push(Column::new((*metric).into(), [1.0, 2.0]));
            }
        }

        let graded = self.grade_table(DataFrame::new(columns)?)?;
        graded.column("score - overall")?.f64()?;
        Ok(())
    }
}
