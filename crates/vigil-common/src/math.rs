//! Clamping and fixed-precision rounding shared by every scorer.

use crate::constants::{SCORE_MAX, SCORE_MIN, SCORE_PRECISION};

/// Keep `value` inside `[min, max]`.
///
/// NaN collapses to `min`, so a corrupted input degrades to the neutral end
/// of the range instead of poisoning later arithmetic.
pub fn keep_between(min: f64, max: f64, value: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Round `value` to `places` decimal digits.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Clamp to the score range, then round to score precision.
pub fn normalize_score(value: f64) -> f64 {
    round_to(keep_between(SCORE_MIN, SCORE_MAX, value), SCORE_PRECISION)
}

/// Euclidean distance between two points
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (x2 - x1).hypot(y2 - y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_between() {
        assert_eq!(keep_between(0.0, 100.0, -3.5), 0.0);
        assert_eq!(keep_between(0.0, 100.0, 250.0), 100.0);
        assert_eq!(keep_between(0.0, 100.0, 42.0), 42.0);
        assert_eq!(keep_between(0.0, 100.0, f64::NAN), 0.0);
        assert_eq!(keep_between(0.0, 100.0, f64::INFINITY), 100.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(25.754, 2), 25.75);
        assert_eq!(round_to(25.756, 2), 25.76);
        assert_eq!(round_to(-1.234, 1), -1.2);
        assert_eq!(round_to(7.0, 0), 7.0);
    }

    #[test]
    fn test_normalize_score() {
        assert_eq!(normalize_score(101.123), 100.0);
        assert_eq!(normalize_score(-0.001), 0.0);
        assert_eq!(normalize_score(12.3456), 12.35);
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(10.0, 10.0, 10.0, 10.0), 0.0);
    }
}
