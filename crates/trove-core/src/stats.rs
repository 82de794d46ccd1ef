//! Small numeric helpers shared by the feature computers and the report.
//!
//! Missing values are represented as `None` and skipped by every reduction.

use serde_json::Value;

/// Sum of `values`, `None` when it overflows. An empty slice sums to 0.
pub fn sum(values: &[f64]) -> Option<f64> {
    Some(values.iter().sum::<f64>()).filter(|s| s.is_finite())
}

/// Arithmetic mean, `None` for an empty slice or an overflowing sum.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    sum(values).map(|s| s / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), `None` below two values
/// or when the squared deviations overflow.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt()).filter(|s| s.is_finite())
}

/// Median of `values`, averaging the two middle elements for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// `1 - std/mean`, or `0` whenever the ratio is undefined or non-finite.
pub fn dispersion_consistency(std: Option<f64>, mean: Option<f64>) -> f64 {
    match (std, mean) {
        (Some(s), Some(m)) => {
            let ratio = s / m;
            if ratio.is_finite() { 1.0 - ratio } else { 0.0 }
        }
        _ => 0.0,
    }
}

/// Lenient numeric coercion: JSON numbers and numeric strings parse, anything
/// else (null, empty string, garbage, NaN) is missing.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn mean_and_std_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        // sample variance = 32 / 7
        let std = sample_std(&v).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn std_undefined_for_single_value() {
        assert_eq!(sample_std(&[3.0]), None);
        assert_eq!(sample_std(&[]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn overflowing_reductions_are_missing() {
        let huge = [1e308, 1e308];
        assert_eq!(sum(&huge), None);
        assert_eq!(mean(&huge), None);
        assert_eq!(sample_std(&huge), None);
        assert_eq!(sample_std(&[1e200, -1e200]), None);
        assert_eq!(sum(&[]), Some(0.0));
        assert_eq!(max(&huge), Some(1e308));
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn extrema() {
        assert_eq!(min(&[3.0, -1.0, 2.0]), Some(-1.0));
        assert_eq!(max(&[3.0, -1.0, 2.0]), Some(3.0));
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn consistency_defaults_to_zero() {
        assert_eq!(dispersion_consistency(None, Some(1.0)), 0.0);
        assert_eq!(dispersion_consistency(Some(0.0), Some(0.0)), 0.0);
        assert_eq!(dispersion_consistency(Some(1.0), Some(0.0)), 0.0);
        assert_eq!(dispersion_consistency(Some(0.0), Some(5.0)), 1.0);
        assert!((dispersion_consistency(Some(1.0), Some(4.0)) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn consistency_can_go_negative() {
        assert!(dispersion_consistency(Some(3.0), Some(1.0)) < 0.0);
    }

    #[test]
    fn coercion() {
        assert_eq!(coerce_f64(&json!(1.5)), Some(1.5));
        assert_eq!(coerce_f64(&json!("2.25")), Some(2.25));
        assert_eq!(coerce_f64(&json!(" 7 ")), Some(7.0));
        assert_eq!(coerce_f64(&json!("")), None);
        assert_eq!(coerce_f64(&json!("abc")), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!({"v": 1})), None);
    }

    proptest! {
        #[test]
        fn std_is_non_negative(values in proptest::collection::vec(-1e6f64..1e6, 2..50)) {
            let std = sample_std(&values).unwrap();
            prop_assert!(std >= 0.0);
        }

        #[test]
        fn mean_within_extrema(values in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
            let m = mean(&values).unwrap();
            prop_assert!(m >= min(&values).unwrap() - 1e-6);
            prop_assert!(m <= max(&values).unwrap() + 1e-6);
        }
    }
}
