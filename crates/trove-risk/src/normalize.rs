//! Min-max scaling.

use trove_core::stats::{max, min};

/// Scale `values` onto `[0, 1]` by `(x - min) / (max - min)`.
///
/// A constant (zero-range) column maps every value to 0, and an empty input
/// returns an empty vector.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let (Some(lo), Some(hi)) = (min(values), max(values)) else {
        return Vec::new();
    };
    let range = hi - lo;
    if range <= 0.0 || !range.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - lo) / range).collect()
}
