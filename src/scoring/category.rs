//! Category grades and the overall rating.
//!
//! Each category is a weighted sum of metric scores, rescaled to 0–10 across
//! all rows and graded. The overall rating does the same over the four
//! category scores.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fmt;

use crate::scoring::metric::{grade_column, grade_series, score_column};
use crate::scoring::scale::{scale_series, scale_series_inverted};
use crate::scoring::weights::ScoringWeights;

/// Name of the overall rating columns (`score - overall`, `AAA - overall`).
pub const OVERALL: &str = "overall";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Valuation,
    Profitability,
    Growth,
    Performance,
}

impl Category {
    /// Categories in the order they are computed.
    pub const ALL: [Category; 4] = [
        Category::Valuation,
        Category::Profitability,
        Category::Growth,
        Category::Performance,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Category::Valuation => "valuation",
            Category::Profitability => "profitability",
            Category::Growth => "growth",
            Category::Performance => "performance",
        }
    }

    /// Metrics whose scores feed this category.
    pub const fn metrics(&self) -> &'static [&'static str] {
        match self {
            Category::Valuation => &["fwd_p_e", "peg", "p_s", "p_b", "p_fcf"],
            Category::Profitability => &["profit_m", "oper_m", "gross_m", "roe", "roa"],
            Category::Growth => &["eps_this_y", "eps_next_y", "eps_next_5y", "sales_q_q", "eps_q_q"],
            Category::Performance => &[
                "perf_month",
                "perf_quart",
                "perf_half",
                "perf_year",
                "perf_ytd",
                "volatility_m",
            ],
        }
    }

    /// Whether the rescaled category score is flipped (`10 - score`).
    ///
    /// Valuation metric scores are already inverted per metric; the category
    /// flips them a second time.
    pub const fn inverted(&self) -> bool {
        matches!(self, Category::Valuation)
    }

    /// Weights aligned with [`Category::metrics`].
    pub fn weights(&self, weights: &ScoringWeights) -> Vec<f64> {
        match self {
            Category::Valuation => {
                let w = &weights.valuation;
                vec![w.fwd_p_e, w.peg, w.p_s, w.p_b, w.p_fcf]
            }
            Category::Profitability => {
                let w = &weights.profitability;
                vec![w.profit_m, w.oper_m, w.gross_m, w.roe, w.roa]
            }
            Category::Growth => {
                let w = &weights.growth;
                vec![w.eps_this_y, w.eps_next_y, w.eps_next_5y, w.sales_q_q, w.eps_q_q]
            }
            Category::Performance => {
                let w = &weights.performance;
                vec![
                    w.perf_month,
                    w.perf_quart,
                    w.perf_half,
                    w.perf_year,
                    w.perf_ytd,
                    w.volatility_m,
                ]
            }
        }
    }

    /// Weight of this category in the overall rating.
    pub fn overall_weight(&self, weights: &ScoringWeights) -> f64 {
        match self {
            Category::Valuation => weights.overall.valuation,
            Category::Profitability => weights.overall.profitability,
            Category::Growth => weights.overall.growth,
            Category::Performance => weights.overall.performance,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-wise weighted sum of the given score columns.
fn weighted_sum(df: &DataFrame, parts: &[(String, f64)]) -> Result<Float64Chunked> {
    let mut total = Float64Chunked::full("sum".into(), 0.0, df.height());
    for (column, weight) in parts {
        let scores = df
            .column(column)
            .and_then(|c| c.f64())
            .with_context(|| format!("missing score column '{column}'"))?;
        total = &total + &(scores * *weight);
    }
    Ok(total)
}

/// Rescales `sum`, optionally inverts it, and stores score and grade columns.
fn set_scaled(df: &mut DataFrame, name: &str, sum: &Float64Chunked, invert: bool) -> Result<()> {
    let scores = if invert {
        scale_series_inverted(sum)
    } else {
        scale_series(sum)
    };
    let grades = grade_series(&grade_column(name), &scores);
    df.with_column(scores.with_name(score_column(name).into()).into_series())?;
    df.with_column(grades)?;
    Ok(())
}

/// Adds `score - <category>` and `AAA - <category>` for one category.
pub fn set_category_grade(
    df: &mut DataFrame,
    category: Category,
    weights: &ScoringWeights,
) -> Result<()> {
    let parts: Vec<(String, f64)> = category
        .metrics()
        .iter()
        .map(|metric| score_column(metric))
        .zip(category.weights(weights))
        .collect();

    let sum = weighted_sum(df, &parts)
        .with_context(|| format!("cannot compute {category} category"))?;
    set_scaled(df, category.name(), &sum, category.inverted())
}

/// Adds `score - overall` and `AAA - overall` from the four category scores.
pub fn set_overall_rating(df: &mut DataFrame, weights: &ScoringWeights) -> Result<()> {
    let parts: Vec<(String, f64)> = Category::ALL
        .iter()
        .map(|c| (score_column(c.name()), c.overall_weight(weights)))
        .collect();

    let sum = weighted_sum(df, &parts).context("cannot compute overall rating")?;
    set_scaled(df, OVERALL, &sum, false)
}
