//! Hypothesis testing against raw data.
//!
//! Tests always recompute from the dataset they are given, never from the
//! evidence stored on the hypothesis, so schema drift and changed data are
//! reported rather than masked.

use tracing::{debug, instrument};

use super::generator::{extreme_groups, group_values};
use super::types::{Hypothesis, HypothesisTestResult, HypothesisType};
use crate::analyzers::correlation::{calculate_correlation, point_biserial_correlation};
use crate::analyzers::descriptive::{calculate_stats, detect_outliers_iqr, sample_variance};
use crate::analyzers::runner::aligned_pairs;
use crate::analyzers::significance::{
    correlation_t_statistic, p_value_from_t, two_sided_p_value, welch_t_test, MAX_TEST_STATISTIC,
};
use crate::analyzers::trend::linear_regression;
use crate::core::DataSet;

/// Significance level for a supported hypothesis.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

pub const MIN_CORRELATION_PAIRS: usize = 10;
pub const MIN_GROUP_SIZE: usize = 5;
pub const MIN_TREND_POINTS: usize = 10;
pub const MIN_ANOMALY_VALUES: usize = 4;

/// Tests hypotheses by type.
#[derive(Debug, Clone, Default)]
pub struct HypothesisTester;

impl HypothesisTester {
    pub fn new() -> Self {
        Self
    }

    /// Tests `hypothesis` against `dataset`.
    #[instrument(skip(self, dataset, hypothesis), fields(id = %hypothesis.id, kind = %hypothesis.hypothesis_type))]
    pub fn test(&self, dataset: &DataSet, hypothesis: &Hypothesis) -> HypothesisTestResult {
        let missing: Vec<&str> = hypothesis
            .variables
            .iter()
            .filter(|v| dataset.column_index(v).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            debug!(missing = ?missing, "Hypothesis references missing columns");
            return HypothesisTestResult::not_supported(
                format!("Could not find column(s) {} in dataset '{}'", missing.join(", "), dataset.name),
                vec!["The dataset schema may have changed since the hypothesis was generated".to_string()],
            );
        }

        let result = match hypothesis.hypothesis_type {
            HypothesisType::Correlation => self.test_correlation(dataset, &hypothesis.variables),
            HypothesisType::GroupDifference => self.test_group_difference(dataset, &hypothesis.variables),
            HypothesisType::Trend => self.test_trend(dataset, &hypothesis.variables),
            HypothesisType::Anomaly => self.test_anomaly(dataset, &hypothesis.variables),
        };
        debug!(
            supported = result.supported,
            p_value = result.p_value,
            sample_size = result.sample_size,
            "Hypothesis tested"
        );
        result
    }

    /// Tests `hypothesis` and returns it with the outcome recorded.
    pub fn test_and_update(&self, dataset: &DataSet, hypothesis: &Hypothesis) -> Hypothesis {
        hypothesis.with_test_result(self.test(dataset, hypothesis))
    }

    fn test_correlation(&self, dataset: &DataSet, variables: &[String]) -> HypothesisTestResult {
        let caveats = vec![
            "Correlation does not imply causation".to_string(),
            "Pearson's r only captures linear relationships".to_string(),
        ];
        let Some((a, b)) = two_columns(dataset, variables) else {
            return HypothesisTestResult::not_supported(
                "Insufficient variables: a correlation test needs two columns",
                caveats,
            );
        };

        let (xs, ys) = aligned_pairs(dataset, a, b);
        let n = xs.len();
        if n < MIN_CORRELATION_PAIRS {
            return HypothesisTestResult::not_supported(
                format!(
                    "Insufficient paired numeric observations: {n} found, at least {MIN_CORRELATION_PAIRS} needed"
                ),
                caveats,
            );
        }

        let r = calculate_correlation(&xs, &ys);
        let t = correlation_t_statistic(r, n);
        let p = p_value_from_t(t, (n - 2) as f64);
        let supported = p < SIGNIFICANCE_LEVEL;
        let mut caveats = caveats;
        if n < 30 {
            caveats.push(format!("Small sample ({n} pairs); the estimate is unstable"));
        }

        HypothesisTestResult {
            supported,
            confidence: confidence_from_p(p),
            test_statistic: t,
            p_value: p,
            effect_size: r,
            interpretation: format!(
                "r = {r:.3} over {n} pairs (p = {p:.4}): the correlation is {}",
                if supported { "statistically significant" } else { "not statistically significant" }
            ),
            caveats,
            sample_size: n,
        }
    }

    fn test_group_difference(&self, dataset: &DataSet, variables: &[String]) -> HypothesisTestResult {
        let caveats = vec![
            "Group differences may reflect composition rather than the grouping itself".to_string(),
            "Degrees of freedom use the conservative min(n1, n2) - 1".to_string(),
        ];
        let Some((cat_idx, num_idx)) = two_columns(dataset, variables) else {
            return HypothesisTestResult::not_supported(
                "Insufficient variables: a group test needs a category and a value column",
                caveats,
            );
        };

        let groups = group_values(dataset, cat_idx, num_idx, MIN_GROUP_SIZE);
        let Some((top, bottom)) = extreme_groups(&groups) else {
            return HypothesisTestResult::not_supported(
                format!("Insufficient groups: at least 2 groups with {MIN_GROUP_SIZE} or more values needed"),
                caveats,
            );
        };
        let Some(test) = welch_t_test(&top.1, &bottom.1) else {
            return HypothesisTestResult::not_supported("Insufficient values for a t-test", caveats);
        };

        let pooled_sd = ((sample_variance(&top.1) + sample_variance(&bottom.1)) / 2.0).sqrt();
        let cohens_d = if pooled_sd > 0.0 {
            (test.mean_a - test.mean_b) / pooled_sd
        } else {
            0.0
        };
        let numeric = dataset.column_at(num_idx);
        let categorical = dataset.column_at(cat_idx);
        let r_pb = point_biserial_correlation(&numeric, &categorical);
        let supported = test.p_value < SIGNIFICANCE_LEVEL;

        HypothesisTestResult {
            supported,
            confidence: confidence_from_p(test.p_value),
            test_statistic: test.t_statistic,
            p_value: test.p_value,
            effect_size: cohens_d,
            interpretation: format!(
                "'{}' averages {:.2} versus {:.2} for '{}' (Cohen's d = {cohens_d:.2}, point-biserial r = {r_pb:.3}); the difference is {}",
                top.0,
                test.mean_a,
                test.mean_b,
                bottom.0,
                if supported { "statistically significant" } else { "not statistically significant" }
            ),
            caveats,
            sample_size: top.1.len() + bottom.1.len(),
        }
    }

    fn test_trend(&self, dataset: &DataSet, variables: &[String]) -> HypothesisTestResult {
        let caveats = vec![
            "A linear fit can miss seasonal or non-linear patterns".to_string(),
            "Row order is assumed to be time order".to_string(),
        ];
        let Some(idx) = variables.first().and_then(|v| dataset.column_index(v)) else {
            return HypothesisTestResult::not_supported("Insufficient variables: a trend test needs a column", caveats);
        };

        let values: Vec<f64> = dataset.numeric_column(idx).into_iter().map(|(_, v)| v).collect();
        let n = values.len();
        if n < MIN_TREND_POINTS {
            return HypothesisTestResult::not_supported(
                format!("Insufficient data points: {n} found, at least {MIN_TREND_POINTS} needed"),
                caveats,
            );
        }

        let fit = linear_regression(&values);
        let mean_x = (n - 1) as f64 / 2.0;
        let sxx: f64 = (0..n).map(|i| (i as f64 - mean_x).powi(2)).sum();
        let sse: f64 = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (fit.intercept + fit.slope * i as f64)).powi(2))
            .sum();
        let se = (sse / (n - 2) as f64 / sxx).sqrt();
        let t = if se > 1e-12 {
            fit.slope / se
        } else if fit.slope.abs() > 1e-12 {
            MAX_TEST_STATISTIC * fit.slope.signum()
        } else {
            0.0
        };
        let p = p_value_from_t(t, (n - 2) as f64);
        let supported = p < SIGNIFICANCE_LEVEL;

        HypothesisTestResult {
            supported,
            confidence: confidence_from_p(p),
            test_statistic: t,
            p_value: p,
            effect_size: fit.slope,
            interpretation: format!(
                "Slope {:.4} per row over {n} points (p = {p:.4}): the trend is {}",
                fit.slope,
                if supported { "statistically significant" } else { "not statistically significant" }
            ),
            caveats,
            sample_size: n,
        }
    }

    fn test_anomaly(&self, dataset: &DataSet, variables: &[String]) -> HypothesisTestResult {
        let caveats = vec![
            "Outliers may be valid extreme values rather than errors".to_string(),
            "The z-score assumes roughly normal data".to_string(),
        ];
        let Some(idx) = variables.first().and_then(|v| dataset.column_index(v)) else {
            return HypothesisTestResult::not_supported("Insufficient variables: an anomaly test needs a column", caveats);
        };

        let indexed = dataset.numeric_column(idx);
        let n = indexed.len();
        if n < MIN_ANOMALY_VALUES {
            return HypothesisTestResult::not_supported(
                format!("Insufficient values: {n} found, at least {MIN_ANOMALY_VALUES} needed"),
                caveats,
            );
        }

        let values: Vec<f64> = indexed.iter().map(|&(_, v)| v).collect();
        let stats = calculate_stats(&values);
        let max_z = if stats.std > 0.0 {
            values
                .iter()
                .map(|v| ((v - stats.mean) / stats.std).abs())
                .fold(0.0, f64::max)
        } else {
            0.0
        };
        let p = (two_sided_p_value(max_z) * n as f64).min(1.0);
        let column = &dataset.columns[idx];
        let outliers = detect_outliers_iqr(column, &indexed);
        let supported = !outliers.is_empty() && p < SIGNIFICANCE_LEVEL;

        HypothesisTestResult {
            supported,
            confidence: confidence_from_p(p),
            test_statistic: max_z,
            p_value: p,
            effect_size: max_z,
            interpretation: format!(
                "{} IQR outliers; largest |z| = {max_z:.2} (Bonferroni p = {p:.4})",
                outliers.len()
            ),
            caveats,
            sample_size: n,
        }
    }
}

/// Tests a hypothesis with the default tester.
pub fn test_hypothesis(dataset: &DataSet, hypothesis: &Hypothesis) -> HypothesisTestResult {
    HypothesisTester::new().test(dataset, hypothesis)
}

fn two_columns(dataset: &DataSet, variables: &[String]) -> Option<(usize, usize)> {
    match variables {
        [a, b, ..] => Some((dataset.column_index(a)?, dataset.column_index(b)?)),
        _ => None,
    }
}

fn confidence_from_p(p: f64) -> f64 {
    ((1.0 - p) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CellValue;
    use crate::hypothesis::types::{CausalInterpretation, HypothesisStatus};

    fn hypothesis(kind: HypothesisType, variables: &[&str]) -> Hypothesis {
        Hypothesis {
            id: "H1".to_string(),
            hypothesis_type: kind,
            title: String::new(),
            description: String::new(),
            confidence: 50.0,
            evidence: Vec::new(),
            causal_interpretation: CausalInterpretation::Correlational,
            confounders: Vec::new(),
            recommendations: Vec::new(),
            variables: variables.iter().map(|s| s.to_string()).collect(),
            testable: true,
            suggested_test: String::new(),
            status: HypothesisStatus::Generated,
            test_result: None,
        }
    }

    fn linear(n: usize) -> DataSet {
        let rows = (0..n)
            .map(|i| {
                let x = i as f64;
                vec![CellValue::from(x), CellValue::from(2.0 * x + (i % 2) as f64)]
            })
            .collect();
        DataSet::new("lin", vec!["x".into(), "y".into()], rows).unwrap()
    }

    #[test]
    fn test_missing_column() {
        let result = test_hypothesis(&linear(20), &hypothesis(HypothesisType::Correlation, &["x", "gone"]));
        assert!(!result.supported);
        assert!(result.interpretation.starts_with("Could not find"));
        assert!(result.interpretation.contains("gone"));
        assert!(!result.caveats.is_empty());
    }

    #[test]
    fn test_insufficient_pairs() {
        let result = test_hypothesis(&linear(9), &hypothesis(HypothesisType::Correlation, &["x", "y"]));
        assert!(!result.supported);
        assert!(result.interpretation.starts_with("Insufficient"));
    }

    #[test]
    fn test_supported_correlation() {
        let result = test_hypothesis(&linear(30), &hypothesis(HypothesisType::Correlation, &["x", "y"]));
        assert!(result.supported);
        assert!(result.p_value < 0.05);
        assert!(result.effect_size > 0.99);
        assert_eq!(result.sample_size, 30);
        assert!(result.caveats.iter().any(|c| c.contains("causation")));
    }

    #[test]
    fn test_trend_test() {
        let result = test_hypothesis(&linear(30), &hypothesis(HypothesisType::Trend, &["y"]));
        assert!(result.supported);
        assert!(result.effect_size > 1.9);
    }

    #[test]
    fn test_anomaly_test() {
        let mut rows: Vec<Vec<CellValue>> = (0..30).map(|i| vec![CellValue::from(10.0 + (i % 3) as f64)]).collect();
        rows.push(vec![CellValue::from(500.0)]);
        let ds = DataSet::new("a", vec!["latency".into()], rows).unwrap();
        let result = test_hypothesis(&ds, &hypothesis(HypothesisType::Anomaly, &["latency"]));
        assert!(result.supported);
        assert!(result.test_statistic > 4.0);
    }

    #[test]
    fn test_retest_is_idempotent() {
        let ds = linear(30);
        let h = hypothesis(HypothesisType::Correlation, &["x", "y"]);
        let tester = HypothesisTester::new();
        let once = tester.test_and_update(&ds, &h);
        let twice = tester.test_and_update(&ds, &once);
        assert_eq!(once.status, HypothesisStatus::Supported);
        assert_eq!(once, twice);
        assert_eq!(tester.test(&ds, &h), tester.test(&ds, &h));
    }
}
