//! Hypothesis generation from a precomputed analysis.
//!
//! Four independent detectors propose hypotheses; the generator merges them,
//! keeps the most confident and numbers them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::causal::{classify, is_confounder_like};
use super::types::{CausalInterpretation, Hypothesis, HypothesisStatus, HypothesisType};
use crate::analyzers::significance::welch_t_test;
use crate::analyzers::{AnalysisResult, Correlation, TrendDirection};
use crate::core::{CellValue, DataSet};
use crate::error::{InsightError, Result};

/// Caveats attached to every trend hypothesis.
pub const TIME_SERIES_CONFOUNDERS: &[&str] = &[
    "seasonality",
    "external events",
    "changes in data collection",
];

/// Thresholds for hypothesis generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypothesisConfig {
    /// Most hypotheses returned per run (default: 10)
    pub max_hypotheses: usize,
    /// Minimum |r| for a correlation hypothesis (default: 0.4)
    pub min_correlation: f64,
    /// Most correlation hypotheses considered (default: 5)
    pub max_correlation_hypotheses: usize,
    /// |r| a third column needs with both endpoints to be a confounder (default: 0.3)
    pub confounder_correlation: f64,
    /// Most categories a grouping column may have (default: 10)
    pub max_group_categories: usize,
    /// Minimum values per group (default: 5)
    pub min_group_size: usize,
    /// Minimum relative difference between top and bottom group means (default: 0.10)
    pub min_group_difference: f64,
    /// Minimum |change %| for a trend hypothesis (default: 5)
    pub min_trend_change_percent: f64,
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            max_hypotheses: 10,
            min_correlation: 0.4,
            max_correlation_hypotheses: 5,
            confounder_correlation: 0.3,
            max_group_categories: 10,
            min_group_size: 5,
            min_group_difference: 0.10,
            min_trend_change_percent: 5.0,
        }
    }
}

impl HypothesisConfig {
    pub fn with_max_hypotheses(mut self, max: usize) -> Self {
        self.max_hypotheses = max;
        self
    }

    pub fn with_min_correlation(mut self, min: f64) -> Self {
        self.min_correlation = min;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_correlation) {
            return Err(InsightError::invalid_config(
                "min_correlation must be within [0, 1]",
            ));
        }
        if self.min_group_size < 2 {
            return Err(InsightError::invalid_config(
                "min_group_size must be at least 2",
            ));
        }
        if self.max_group_categories < 2 {
            return Err(InsightError::invalid_config(
                "max_group_categories must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Generates ranked hypotheses from an [`AnalysisResult`].
#[derive(Debug, Clone, Default)]
pub struct HypothesisGenerator {
    config: HypothesisConfig,
}

impl HypothesisGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HypothesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HypothesisConfig {
        &self.config
    }

    /// Runs every detector, keeps the most confident hypotheses and assigns ids.
    ///
    /// Output is sorted by confidence, highest first; ties keep detector order
    /// (correlation, group difference, trend, anomaly).
    #[instrument(skip(self, dataset, analysis), fields(dataset = %dataset.name))]
    pub fn generate(&self, dataset: &DataSet, analysis: &AnalysisResult) -> Vec<Hypothesis> {
        let mut hypotheses = self.correlation_hypotheses(dataset, analysis);
        hypotheses.extend(self.group_difference_hypotheses(dataset, analysis));
        hypotheses.extend(self.trend_hypotheses(analysis));
        hypotheses.extend(self.anomaly_hypotheses(analysis));
        debug!(candidates = hypotheses.len(), "Collected candidate hypotheses");

        hypotheses.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        hypotheses.truncate(self.config.max_hypotheses);
        for (i, hypothesis) in hypotheses.iter_mut().enumerate() {
            hypothesis.id = format!("H{}", i + 1);
        }

        info!(
            dataset = %dataset.name,
            hypotheses = hypotheses.len(),
            "Generated hypotheses"
        );
        hypotheses
    }

    fn correlation_hypotheses(&self, dataset: &DataSet, analysis: &AnalysisResult) -> Vec<Hypothesis> {
        let mut strong: Vec<&Correlation> = analysis
            .correlations
            .iter()
            .filter(|c| c.pearson.abs() >= self.config.min_correlation)
            .collect();
        strong.sort_by(|a, b| b.pearson.abs().total_cmp(&a.pearson.abs()));
        strong.truncate(self.config.max_correlation_hypotheses);

        strong
            .into_iter()
            .map(|corr| {
                let statistical = self.statistical_confounders(analysis, corr);
                let reading = classify(&corr.column_a, &corr.column_b, !statistical.is_empty());

                let mut confounders = statistical;
                for column in &dataset.columns {
                    if !corr.involves(column)
                        && is_confounder_like(column)
                        && !confounders.contains(column)
                    {
                        confounders.push(column.clone());
                    }
                }

                let r = corr.pearson;
                let mut confidence = (r.abs() * 80.0).round();
                if analysis.row_count > 1000 {
                    confidence += 10.0;
                } else if analysis.row_count < 100 {
                    confidence -= 10.0;
                }
                if confounders.len() > 2 {
                    confidence -= 10.0;
                }

                let direction = if r > 0.0 { "increases" } else { "decreases" };
                let title = match reading.interpretation {
                    CausalInterpretation::Causal | CausalInterpretation::ReverseCausal => {
                        format!("{} may influence {}", reading.cause, reading.effect)
                    }
                    _ => format!("{} is associated with {}", corr.column_a, corr.column_b),
                };
                let mut recommendations = vec![format!(
                    "Test the correlation between {} and {} on fresh data",
                    corr.column_a, corr.column_b
                )];
                if !confounders.is_empty() {
                    recommendations.push(format!(
                        "Control for {} before drawing conclusions",
                        confounders.join(", ")
                    ));
                }
                if matches!(reading.interpretation, CausalInterpretation::Causal) {
                    recommendations
                        .push("Run a controlled experiment to confirm the causal direction".to_string());
                }

                Hypothesis {
                    id: String::new(),
                    hypothesis_type: HypothesisType::Correlation,
                    title,
                    description: format!(
                        "As {} increases, {} {} ({} {} correlation, r = {:.3})",
                        corr.column_a,
                        corr.column_b,
                        direction,
                        corr.strength,
                        if r > 0.0 { "positive" } else { "negative" },
                        r
                    ),
                    confidence: confidence.clamp(0.0, 100.0),
                    evidence: vec![
                        format!("Pearson r = {:.3} over {} paired rows", r, corr.sample_size),
                        format!("Correlation strength: {}", corr.strength),
                    ],
                    causal_interpretation: reading.interpretation,
                    confounders,
                    recommendations,
                    variables: vec![corr.column_a.clone(), corr.column_b.clone()],
                    testable: true,
                    suggested_test: "Pearson correlation t-test".to_string(),
                    status: HypothesisStatus::Generated,
                    test_result: None,
                }
            })
            .collect()
    }

    /// Third numeric columns correlated with both endpoints.
    fn statistical_confounders(&self, analysis: &AnalysisResult, corr: &Correlation) -> Vec<String> {
        let threshold = self.config.confounder_correlation;
        analysis
            .numeric_columns()
            .into_iter()
            .filter(|&column| !corr.involves(column))
            .filter(|&column| {
                let with = |other: &str| {
                    analysis
                        .correlation_between(column, other)
                        .is_some_and(|c| c.pearson.abs() > threshold)
                };
                with(&corr.column_a) && with(&corr.column_b)
            })
            .map(str::to_string)
            .collect()
    }

    fn group_difference_hypotheses(
        &self,
        dataset: &DataSet,
        analysis: &AnalysisResult,
    ) -> Vec<Hypothesis> {
        let mut hypotheses = Vec::new();
        let numeric_columns = analysis.numeric_columns();

        for stats in analysis.column_stats.iter().filter_map(|s| s.as_categorical()) {
            if stats.unique_count < 2 || stats.unique_count > self.config.max_group_categories {
                continue;
            }
            let Some(cat_idx) = dataset.column_index(&stats.column) else {
                continue;
            };
            for numeric in &numeric_columns {
                let Some(num_idx) = dataset.column_index(numeric) else {
                    continue;
                };
                let groups = group_values(dataset, cat_idx, num_idx, self.config.min_group_size);
                if let Some(h) = self.group_hypothesis(&stats.column, numeric, &groups) {
                    hypotheses.push(h);
                }
            }
        }
        hypotheses
    }

    fn group_hypothesis(
        &self,
        category: &str,
        numeric: &str,
        groups: &[(String, Vec<f64>)],
    ) -> Option<Hypothesis> {
        let (top, bottom) = extreme_groups(groups)?;
        let top_mean = mean_of(&top.1);
        let bottom_mean = mean_of(&bottom.1);
        let relative = relative_difference(top_mean, bottom_mean);
        if relative < self.config.min_group_difference {
            return None;
        }

        let test = welch_t_test(&top.1, &bottom.1)?;
        let base = if test.p_value < 0.001 {
            85.0
        } else if test.p_value < 0.01 {
            75.0
        } else if test.p_value < 0.05 {
            65.0
        } else {
            45.0
        };
        let confidence = (base + (relative * 10.0).min(10.0)).round().min(95.0);

        Some(Hypothesis {
            id: String::new(),
            hypothesis_type: HypothesisType::GroupDifference,
            title: format!("{numeric} differs across {category}"),
            description: format!(
                "{numeric} averages {top_mean:.2} for '{}' versus {bottom_mean:.2} for '{}' ({:.0}% difference)",
                top.0,
                bottom.0,
                relative * 100.0
            ),
            confidence,
            evidence: vec![
                format!(
                    "Welch t = {:.3} with {} degrees of freedom, p = {:.4}",
                    test.t_statistic, test.degrees_of_freedom, test.p_value
                ),
                format!("{} groups with at least {} values", groups.len(), self.config.min_group_size),
            ],
            causal_interpretation: CausalInterpretation::Correlational,
            confounders: Vec::new(),
            recommendations: vec![
                format!("Compare the distribution of {numeric} within each {category} group"),
                "Check whether group sizes or composition explain the gap".to_string(),
            ],
            variables: vec![category.to_string(), numeric.to_string()],
            testable: true,
            suggested_test: "Welch's t-test".to_string(),
            status: HypothesisStatus::Generated,
            test_result: None,
        })
    }

    fn trend_hypotheses(&self, analysis: &AnalysisResult) -> Vec<Hypothesis> {
        analysis
            .trends
            .iter()
            .filter(|t| t.change_percent.abs() > self.config.min_trend_change_percent)
            .map(|trend| {
                let n = analysis
                    .stats_for(&trend.column)
                    .and_then(|s| s.as_numeric())
                    .map_or(0, |s| s.stats.count);
                let length_bonus = if n >= 50 {
                    10.0
                } else if n >= 20 {
                    5.0
                } else {
                    0.0
                };
                let confidence =
                    (50.0 + (trend.change_percent.abs() / 2.0).min(25.0) + length_bonus).min(95.0);
                let verb = match trend.direction {
                    TrendDirection::Up => "rising",
                    TrendDirection::Down => "falling",
                    TrendDirection::Stable => "shifting",
                };

                Hypothesis {
                    id: String::new(),
                    hypothesis_type: HypothesisType::Trend,
                    title: format!("{} is {verb} over time", trend.column),
                    description: format!(
                        "{} changed by {:.1}% from the first to the last quarter of the data",
                        trend.column, trend.change_percent
                    ),
                    confidence: confidence.round(),
                    evidence: vec![
                        format!("Linear slope {:.4} per row", trend.slope),
                        format!("{n} observations"),
                    ],
                    causal_interpretation: CausalInterpretation::Correlational,
                    confounders: TIME_SERIES_CONFOUNDERS.iter().map(|s| s.to_string()).collect(),
                    recommendations: vec![
                        format!("Plot {} over time to confirm the trend", trend.column),
                        "Look for events that coincide with the change".to_string(),
                    ],
                    variables: vec![trend.column.clone()],
                    testable: true,
                    suggested_test: "Linear regression slope t-test".to_string(),
                    status: HypothesisStatus::Generated,
                    test_result: None,
                }
            })
            .collect()
    }

    fn anomaly_hypotheses(&self, analysis: &AnalysisResult) -> Vec<Hypothesis> {
        let mut hypotheses = Vec::new();
        for column in analysis.numeric_columns() {
            let outliers: Vec<_> = analysis.outliers_in(column).collect();
            if outliers.is_empty() {
                continue;
            }
            let count = analysis
                .stats_for(column)
                .and_then(|s| s.as_numeric())
                .map_or(0, |s| s.stats.count);
            let max_z = outliers.iter().map(|o| o.z_score.abs()).fold(0.0, f64::max);
            let (severity, bonus) = if max_z > 4.0 {
                ("extreme", 20.0)
            } else if max_z > 3.0 {
                ("severe", 10.0)
            } else {
                ("moderate", 0.0)
            };
            let percent = if count == 0 {
                0.0
            } else {
                outliers.len() as f64 / count as f64 * 100.0
            };
            let confidence = (50.0 + bonus + (2.0 * percent).min(20.0)).min(95.0);

            hypotheses.push(Hypothesis {
                id: String::new(),
                hypothesis_type: HypothesisType::Anomaly,
                title: format!("{column} contains {severity} outliers"),
                description: format!(
                    "{} of {count} values ({percent:.1}%) in {column} fall outside the IQR fences",
                    outliers.len()
                ),
                confidence: confidence.round(),
                evidence: vec![
                    format!("Largest |z| = {max_z:.2}"),
                    format!(
                        "Expected range [{:.2}, {:.2}]",
                        outliers[0].expected.min, outliers[0].expected.max
                    ),
                ],
                causal_interpretation: CausalInterpretation::Correlational,
                confounders: Vec::new(),
                recommendations: vec![
                    format!("Review the flagged rows in {column} for data entry errors"),
                    "Decide whether outliers should be excluded or analyzed separately".to_string(),
                ],
                variables: vec![column.to_string()],
                testable: true,
                suggested_test: "Maximum z-score with Bonferroni correction".to_string(),
                status: HypothesisStatus::Generated,
                test_result: None,
            });
        }
        hypotheses
    }
}

/// Generates hypotheses with the default configuration.
pub fn generate_hypotheses(dataset: &DataSet, analysis: &AnalysisResult) -> Vec<Hypothesis> {
    HypothesisGenerator::new().generate(dataset, analysis)
}

/// Buckets numeric values by category, in first-encountered category order,
/// keeping groups with at least `min_size` values.
pub(crate) fn group_values(
    dataset: &DataSet,
    cat_idx: usize,
    num_idx: usize,
    min_size: usize,
) -> Vec<(String, Vec<f64>)> {
    let mut order: Vec<(String, Vec<f64>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in &dataset.rows {
        let (Some(key), Some(value)) = (
            row.get(cat_idx).and_then(CellValue::as_key),
            row.get(num_idx).and_then(CellValue::as_number),
        ) else {
            continue;
        };
        match positions.get(&key) {
            Some(&pos) => order[pos].1.push(value),
            None => {
                positions.insert(key.clone(), order.len());
                order.push((key, vec![value]));
            }
        }
    }
    order.retain(|(_, values)| values.len() >= min_size);
    order
}

/// Groups with the highest and lowest mean. `None` for fewer than two groups.
pub(crate) fn extreme_groups(
    groups: &[(String, Vec<f64>)],
) -> Option<(&(String, Vec<f64>), &(String, Vec<f64>))> {
    if groups.len() < 2 {
        return None;
    }
    let mut top = &groups[0];
    let mut bottom = &groups[0];
    for group in &groups[1..] {
        let m = mean_of(&group.1);
        if m > mean_of(&top.1) {
            top = group;
        }
        if m < mean_of(&bottom.1) {
            bottom = group;
        }
    }
    if std::ptr::eq(top, bottom) {
        // All means equal: compare the first two groups
        return Some((&groups[0], &groups[1]));
    }
    Some((top, bottom))
}

/// (top - bottom) relative to |bottom|, falling back to |top|, then 1.
pub(crate) fn relative_difference(top_mean: f64, bottom_mean: f64) -> f64 {
    let baseline = if bottom_mean != 0.0 {
        bottom_mean.abs()
    } else if top_mean != 0.0 {
        top_mean.abs()
    } else {
        1.0
    };
    (top_mean - bottom_mean).abs() / baseline
}

fn mean_of(values: &[f64]) -> f64 {
    crate::analyzers::descriptive::mean(values)
}
