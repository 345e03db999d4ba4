//! AAA scoring engine.
//!
//! Turns a table of raw fundamental and performance metrics into per-metric
//! scores and grades, four category grades and one overall rating.

pub mod category;
pub mod engine;
pub mod grade;
pub mod metric;
pub mod scale;
pub mod weights;

pub use engine::ScoringEngine;
pub use grade::{Grade, convert_to_grade};
pub use scale::scale_to_10;
pub use weights::ScoringWeights;
