//! Closed-form significance approximations.
//!
//! p-values come from the Abramowitz–Stegun 7.1.26 error-function
//! approximation of the normal CDF. Student-t statistics are mapped onto the
//! normal scale with the A&S 26.7.8 degrees-of-freedom adjustment rather than
//! an exact t distribution; the hypothesis confidence tables are tuned against
//! exactly this approximation.

use serde::{Deserialize, Serialize};

use crate::analyzers::descriptive::{mean, sample_variance};

/// Magnitude used in place of an infinite test statistic.
pub const MAX_TEST_STATISTIC: f64 = 1.0e6;

const EPSILON: f64 = 1e-12;

/// Error function, A&S 7.1.26 (|error| < 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Two-sided p-value of a standard normal statistic, clamped to [0, 1].
pub fn two_sided_p_value(z: f64) -> f64 {
    if !z.is_finite() {
        return 0.0;
    }
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Maps a t statistic with `df` degrees of freedom onto the normal scale.
pub fn t_to_z(t: f64, df: f64) -> f64 {
    let df = df.max(1.0);
    t * (1.0 - 1.0 / (4.0 * df)) / (1.0 + t * t / (2.0 * df)).sqrt()
}

/// Two-sided p-value for a t statistic.
pub fn p_value_from_t(t: f64, df: f64) -> f64 {
    two_sided_p_value(t_to_z(t, df))
}

/// t statistic for a Pearson coefficient over `n` pairs.
pub fn correlation_t_statistic(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 0.0;
    }
    let denom = 1.0 - r * r;
    if denom <= EPSILON {
        return MAX_TEST_STATISTIC * r.signum();
    }
    r * ((n as f64 - 2.0) / denom).sqrt()
}

/// Result of a two-sample Welch comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelchTest {
    pub mean_a: f64,
    pub mean_b: f64,
    pub t_statistic: f64,
    /// min(n_a, n_b) - 1, a conservative stand-in for Welch–Satterthwaite
    pub degrees_of_freedom: f64,
    pub p_value: f64,
}

/// Welch's t-test with the conservative min(n1, n2) - 1 degrees of freedom.
///
/// Returns `None` when either sample has fewer than two values.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<WelchTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    let se = (sample_variance(a) / a.len() as f64 + sample_variance(b) / b.len() as f64).sqrt();
    let diff = mean_a - mean_b;

    let t_statistic = if se <= EPSILON {
        if diff.abs() <= EPSILON {
            0.0
        } else {
            MAX_TEST_STATISTIC * diff.signum()
        }
    } else {
        diff / se
    };
    let degrees_of_freedom = (a.len().min(b.len()) - 1) as f64;

    Some(WelchTest {
        mean_a,
        mean_b,
        t_statistic,
        degrees_of_freedom,
        p_value: p_value_from_t(t_statistic, degrees_of_freedom),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!((erf(3.0) - 0.999_977_9).abs() < 1e-6);
    }

    #[test]
    fn test_normal_cdf_symmetry() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((normal_cdf(1.5) + normal_cdf(-1.5) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn test_two_sided_p_value() {
        assert!((two_sided_p_value(1.96) - 0.05).abs() < 1e-3);
        assert!((two_sided_p_value(0.0) - 1.0).abs() < 1e-7);
        assert_eq!(two_sided_p_value(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_t_to_z_shrinks_small_samples() {
        let z_small = t_to_z(2.5, 4.0);
        let z_large = t_to_z(2.5, 1000.0);
        assert!(z_small < z_large);
        assert!((z_large - 2.5).abs() < 0.01);
    }

    #[test]
    fn test_welch_detects_shifted_groups() {
        let a = [10.0, 11.0, 9.5, 10.5, 10.2, 9.8];
        let b = [20.0, 21.0, 19.5, 20.5, 20.2, 19.8];
        let test = welch_t_test(&a, &b).unwrap();
        assert!(test.t_statistic < 0.0);
        assert_eq!(test.degrees_of_freedom, 5.0);
        assert!(test.p_value < 0.01);
    }

    #[test]
    fn test_welch_identical_constant_groups() {
        let test = welch_t_test(&[5.0, 5.0, 5.0], &[5.0, 5.0]).unwrap();
        assert_eq!(test.t_statistic, 0.0);
        assert!((test.p_value - 1.0).abs() < 1e-7);
        assert!(welch_t_test(&[1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_correlation_t_statistic() {
        assert_eq!(correlation_t_statistic(0.5, 2), 0.0);
        assert!(correlation_t_statistic(1.0, 20) >= MAX_TEST_STATISTIC);
        let t = correlation_t_statistic(0.5, 27);
        assert!((t - 0.5 * (25.0f64 / 0.75).sqrt()).abs() < 1e-9);
    }
}
