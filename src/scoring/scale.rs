//! Min-max scaling onto the 0–10 score range.

use polars::prelude::*;

/// Neutral score returned when a column has no spread.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Linearly rescales `value` from `[min, max]` to `[0, 10]`.
///
/// Returns [`NEUTRAL_SCORE`] when `min == max`, whatever `value` is. A NaN
/// `min` or `max` never compares equal, so it yields NaN instead of a panic.
pub fn scale_to_10(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return NEUTRAL_SCORE;
    }
    (value - min) / (max - min) * 10.0
}

/// Scales a whole column against its own minimum and maximum.
///
/// Bounds skip missing values, and missing values stay missing.
pub fn scale_series(values: &Float64Chunked) -> Float64Chunked {
    let min = values.min().unwrap_or(f64::NAN);
    let max = values.max().unwrap_or(f64::NAN);
    values.apply_values(|v| scale_to_10(v, min, max))
}

/// Same as [`scale_series`] but flipped, so the smallest raw value scores 10.
pub fn scale_series_inverted(values: &Float64Chunked) -> Float64Chunked {
    scale_series(values).apply_values(|s| 10.0 - s)
}
