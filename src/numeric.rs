//! Numeric guards used across the project.
//!
//! Interaction inputs arrive from behaviours and hosts alike; these helpers
//! keep the acceptance rules for amounts and stats in one place.

use crate::STAT_MAX;

/// Returns `true` when `value` is finite and strictly greater than zero.
///
/// # Examples
/// ```
/// use boidworld::numeric::is_positive_finite;
/// assert!(is_positive_finite(0.5));
/// assert!(!is_positive_finite(0.0));
/// assert!(!is_positive_finite(f64::NAN));
/// ```
#[must_use]
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Clamp a stat into `[0, STAT_MAX]`, mapping `NaN` to zero.
#[must_use]
pub fn clamp_stat(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, STAT_MAX)
}

/// Convert a millisecond delta into seconds.
#[must_use]
pub fn ms_to_seconds(ms: f64) -> f64 {
    ms / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-5.0, 0.0)]
    #[case(42.0, 42.0)]
    #[case(250.0, 100.0)]
    #[case(f64::NAN, 0.0)]
    #[case(f64::INFINITY, 100.0)]
    fn clamps_stats(#[case] input: f64, #[case] expected: f64) {
        assert!((clamp_stat(input) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(1.0, true)]
    #[case(-1.0, false)]
    #[case(f64::INFINITY, false)]
    fn positive_finite(#[case] input: f64, #[case] expected: bool) {
        assert_eq!(is_positive_finite(input), expected);
    }
}
