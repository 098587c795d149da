//! Orchestration of the per-dataset analysis pass.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::change_point::{detect_change_points, DEFAULT_CHANGE_THRESHOLD, DEFAULT_MIN_SEGMENT_SIZE};
use super::correlation::{
    calculate_correlation, cramers_v, spearman_correlation, CategoricalAssociation, Correlation,
};
use super::descriptive::{
    calculate_categorical_stats, calculate_stats, detect_outliers_iqr, ColumnStats,
    NumericColumnStats,
};
use super::seasonality::detect_seasonality;
use super::trend::detect_trend;
use super::types::{AnalysisResult, ColumnChangePoints, ColumnSeasonality};
use crate::core::{row_fingerprint, CellValue, DataSet};
use crate::error::{InsightError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::sampling::timing::Stopwatch;
use crate::{log_detector, log_info, log_timing};

/// Switches and thresholds for [`DataSetAnalyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub compute_correlations: bool,
    pub detect_trends: bool,
    pub detect_outliers: bool,
    pub detect_duplicates: bool,
    pub detect_change_points: bool,
    pub detect_seasonality: bool,
    pub compute_associations: bool,
    /// Also rank-correlate every numeric pair
    pub compute_spearman: bool,
    /// Minimum row-aligned numeric pairs for a correlation
    pub min_correlation_pairs: usize,
    pub min_segment_size: usize,
    pub change_threshold: f64,
    /// Categorical columns with more categories are skipped for Cramér's V
    pub max_association_categories: usize,
    /// Associations below this V are dropped
    pub min_association: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            compute_correlations: true,
            detect_trends: true,
            detect_outliers: true,
            detect_duplicates: true,
            detect_change_points: true,
            detect_seasonality: true,
            compute_associations: true,
            compute_spearman: false,
            min_correlation_pairs: 3,
            min_segment_size: DEFAULT_MIN_SEGMENT_SIZE,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            max_association_categories: 10,
            min_association: 0.2,
        }
    }
}

impl AnalysisConfig {
    /// Only descriptive statistics, correlations, trends, outliers and duplicates.
    pub fn minimal() -> Self {
        Self {
            detect_change_points: false,
            detect_seasonality: false,
            compute_associations: false,
            ..Self::default()
        }
    }

    pub fn with_correlations(mut self, enabled: bool) -> Self {
        self.compute_correlations = enabled;
        self
    }

    pub fn with_trends(mut self, enabled: bool) -> Self {
        self.detect_trends = enabled;
        self
    }

    pub fn with_outliers(mut self, enabled: bool) -> Self {
        self.detect_outliers = enabled;
        self
    }

    pub fn with_change_points(mut self, enabled: bool) -> Self {
        self.detect_change_points = enabled;
        self
    }

    pub fn with_seasonality(mut self, enabled: bool) -> Self {
        self.detect_seasonality = enabled;
        self
    }

    pub fn with_associations(mut self, enabled: bool) -> Self {
        self.compute_associations = enabled;
        self
    }

    pub fn with_spearman(mut self, enabled: bool) -> Self {
        self.compute_spearman = enabled;
        self
    }

    pub fn with_min_segment_size(mut self, size: usize) -> Self {
        self.min_segment_size = size;
        self
    }

    pub fn with_change_threshold(mut self, threshold: f64) -> Self {
        self.change_threshold = threshold;
        self
    }

    /// Rejects thresholds that would make detectors meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.min_correlation_pairs < 2 {
            return Err(InsightError::invalid_config(
                "min_correlation_pairs must be at least 2",
            ));
        }
        if self.min_segment_size == 0 {
            return Err(InsightError::invalid_config(
                "min_segment_size must be positive",
            ));
        }
        if !self.change_threshold.is_finite() || self.change_threshold < 0.0 {
            return Err(InsightError::invalid_config(
                "change_threshold must be a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_association) {
            return Err(InsightError::invalid_config(
                "min_association must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Computes an [`AnalysisResult`] for a dataset.
///
/// # Examples
///
/// ```rust
/// use term_insight::analyzers::DataSetAnalyzer;
/// use term_insight::core::{CellValue, DataSet};
///
/// let rows = (0..10)
///     .map(|i| vec![CellValue::from(i as f64), CellValue::from(2.0 * i as f64)])
///     .collect();
/// let ds = DataSet::new("t", vec!["x".into(), "y".into()], rows).unwrap();
///
/// let result = DataSetAnalyzer::new().analyze(&ds);
/// assert_eq!(result.correlations.len(), 1);
/// assert!((result.correlations[0].pearson - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataSetAnalyzer {
    config: AnalysisConfig,
    log_config: LogConfig,
}

impl DataSetAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            log_config: LogConfig::default(),
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs every enabled detector over `dataset`.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name, rows = dataset.row_count()))]
    pub fn analyze(&self, dataset: &DataSet) -> AnalysisResult {
        let stopwatch = Stopwatch::start("analyze_dataset");
        log_info!(
            self.log_config,
            dataset = %dataset.name,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Starting dataset analysis"
        );

        let numeric_indices = dataset.numeric_column_indices();
        let mut result =
            AnalysisResult::empty(&dataset.name, dataset.row_count(), dataset.column_count());

        result.column_stats = (0..dataset.column_count())
            .map(|idx| self.column_stats(dataset, idx, numeric_indices.contains(&idx)))
            .collect();

        if self.config.compute_correlations {
            result.correlations = self.correlations(dataset, &numeric_indices);
        }

        for &idx in &numeric_indices {
            let column = &dataset.columns[idx];
            let indexed = dataset.numeric_column(idx);
            let values: Vec<f64> = indexed.iter().map(|&(_, v)| v).collect();

            if self.config.detect_trends {
                if let Some(trend) = detect_trend(column, &values) {
                    log_detector!(
                        self.log_config,
                        column = %column,
                        direction = %trend.direction,
                        change_percent = trend.change_percent,
                        "Trend detected"
                    );
                    result.trends.push(trend);
                }
            }

            if self.config.detect_outliers {
                let outliers = detect_outliers_iqr(column, &indexed);
                log_detector!(
                    self.log_config,
                    column = %column,
                    outliers = outliers.len(),
                    "IQR outlier scan"
                );
                result.outliers.extend(outliers);
            }

            if self.config.detect_change_points {
                let change_points = detect_change_points(
                    &values,
                    self.config.min_segment_size,
                    self.config.change_threshold,
                );
                if !change_points.is_empty() {
                    log_detector!(
                        self.log_config,
                        column = %column,
                        change_points = change_points.len(),
                        "Change points detected"
                    );
                    result.change_points.push(ColumnChangePoints {
                        column: column.clone(),
                        change_points,
                    });
                }
            }

            if self.config.detect_seasonality {
                let seasonality = detect_seasonality(&values, None);
                if seasonality.detected {
                    log_detector!(
                        self.log_config,
                        column = %column,
                        period = ?seasonality.period,
                        "Seasonality detected"
                    );
                    result.seasonality.push(ColumnSeasonality {
                        column: column.clone(),
                        seasonality,
                    });
                }
            }
        }

        if self.config.detect_duplicates {
            result.duplicate_rows = count_duplicate_rows(dataset);
        }

        if self.config.compute_associations {
            result.categorical_associations = self.associations(dataset, &result.column_stats);
        }

        let elapsed_ms = stopwatch.finish();
        log_timing!(
            self.log_config,
            dataset = %truncate_field(&dataset.name, self.log_config.max_field_length),
            elapsed_ms,
            "Analysis timing"
        );
        log_info!(
            self.log_config,
            dataset = %dataset.name,
            correlations = result.correlations.len(),
            trends = result.trends.len(),
            outliers = result.outliers.len(),
            duplicate_rows = result.duplicate_rows,
            "Completed dataset analysis"
        );

        result
    }

    fn column_stats(&self, dataset: &DataSet, idx: usize, numeric: bool) -> ColumnStats {
        let column = &dataset.columns[idx];
        let cells = dataset.column_at(idx);
        if numeric {
            let values: Vec<f64> = cells.iter().filter_map(|c| c.as_number()).collect();
            ColumnStats::Numeric(NumericColumnStats {
                column: column.clone(),
                null_count: cells.iter().filter(|c| c.is_null()).count(),
                stats: calculate_stats(&values),
            })
        } else {
            ColumnStats::Categorical(calculate_categorical_stats(column, &cells))
        }
    }

    fn correlations(&self, dataset: &DataSet, numeric_indices: &[usize]) -> Vec<Correlation> {
        let mut correlations = Vec::new();
        for (pos, &i) in numeric_indices.iter().enumerate() {
            for &j in &numeric_indices[pos + 1..] {
                let (xs, ys) = aligned_pairs(dataset, i, j);
                if xs.len() < self.config.min_correlation_pairs {
                    continue;
                }
                let r = calculate_correlation(&xs, &ys);
                let mut correlation =
                    Correlation::new(&dataset.columns[i], &dataset.columns[j], r, xs.len());
                if self.config.compute_spearman {
                    correlation = correlation.with_spearman(spearman_correlation(&xs, &ys));
                }
                correlations.push(correlation);
            }
        }
        // Stable: equal |r| keeps column-pair order
        correlations.sort_by(|a, b| b.pearson.abs().total_cmp(&a.pearson.abs()));
        debug!(count = correlations.len(), "Computed pairwise correlations");
        correlations
    }

    fn associations(
        &self,
        dataset: &DataSet,
        column_stats: &[ColumnStats],
    ) -> Vec<CategoricalAssociation> {
        let eligible: Vec<usize> = column_stats
            .iter()
            .enumerate()
            .filter_map(|(idx, stats)| {
                let cat = stats.as_categorical()?;
                (cat.unique_count >= 2 && cat.unique_count <= self.config.max_association_categories)
                    .then_some(idx)
            })
            .collect();

        let mut associations = Vec::new();
        for (pos, &i) in eligible.iter().enumerate() {
            let a = dataset.column_at(i);
            for &j in &eligible[pos + 1..] {
                let b = dataset.column_at(j);
                let v = cramers_v(&a, &b);
                if v >= self.config.min_association {
                    associations.push(CategoricalAssociation {
                        column_a: dataset.columns[i].clone(),
                        column_b: dataset.columns[j].clone(),
                        cramers_v: v,
                    });
                }
            }
        }
        associations.sort_by(|a, b| b.cramers_v.total_cmp(&a.cramers_v));
        associations
    }
}

/// Analyzes a dataset with the default configuration.
pub fn analyze_dataset(dataset: &DataSet) -> AnalysisResult {
    DataSetAnalyzer::new().analyze(dataset)
}

/// Row-aligned numeric values of two columns, skipping rows where either
/// cell is not a number.
pub fn aligned_pairs(dataset: &DataSet, a: usize, b: usize) -> (Vec<f64>, Vec<f64>) {
    dataset
        .rows
        .iter()
        .filter_map(|row| {
            let x = row.get(a).and_then(CellValue::as_number)?;
            let y = row.get(b).and_then(CellValue::as_number)?;
            Some((x, y))
        })
        .unzip()
}

/// Rows minus distinct row fingerprints.
pub fn count_duplicate_rows(dataset: &DataSet) -> usize {
    let distinct: HashSet<[u8; 16]> = dataset.rows.iter().map(|r| row_fingerprint(r)).collect();
    dataset.row_count() - distinct.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> DataSet {
        let rows = (0..20)
            .map(|i| {
                let x = i as f64;
                vec![
                    CellValue::from(x),
                    CellValue::from(100.0 - 3.0 * x),
                    CellValue::from(if i % 2 == 0 { "even" } else { "odd" }),
                    CellValue::from(if i % 2 == 0 { "red" } else { "blue" }),
                ]
            })
            .collect();
        DataSet::new(
            "sample",
            vec!["x".into(), "y".into(), "parity".into(), "color".into()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let ds = dataset();
        assert_eq!(analyze_dataset(&ds), analyze_dataset(&ds));
        let json = serde_json::to_value(analyze_dataset(&ds)).unwrap();
        assert!(json.get("elapsed_ms").is_none());
    }

    #[test]
    fn test_column_stats_per_kind() {
        let result = analyze_dataset(&dataset());
        assert_eq!(result.column_stats.len(), 4);
        assert_eq!(result.numeric_columns(), vec!["x", "y"]);
        assert_eq!(result.categorical_columns(), vec!["parity", "color"]);
        let parity = result.stats_for("parity").unwrap().as_categorical().unwrap();
        assert_eq!(parity.unique_count, 2);
    }

    #[test]
    fn test_correlation_and_trends() {
        let result = analyze_dataset(&dataset());
        assert_eq!(result.correlations.len(), 1);
        assert!((result.correlations[0].pearson + 1.0).abs() < 1e-9);
        assert_eq!(result.trends.len(), 2);
    }

    #[test]
    fn test_spearman_is_opt_in() {
        assert_eq!(analyze_dataset(&dataset()).correlations[0].spearman, None);

        let ranked = DataSetAnalyzer::with_config(AnalysisConfig::default().with_spearman(true))
            .analyze(&dataset());
        let spearman = ranked.correlations[0].spearman.unwrap();
        assert!((spearman + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_categorical_association() {
        let result = analyze_dataset(&dataset());
        assert_eq!(result.categorical_associations.len(), 1);
        assert!((result.categorical_associations[0].cramers_v - 1.0).abs() < 1e-9);

        let minimal = DataSetAnalyzer::with_config(AnalysisConfig::minimal()).analyze(&dataset());
        assert!(minimal.categorical_associations.is_empty());
    }

    #[test]
    fn test_duplicate_rows() {
        let row = vec![CellValue::from(1.0), CellValue::from("a")];
        let ds = DataSet::new(
            "dups",
            vec!["n".into(), "s".into()],
            vec![
                row.clone(),
                row.clone(),
                row,
                vec![CellValue::from(2.0), CellValue::from("a")],
            ],
        )
        .unwrap();
        assert_eq!(count_duplicate_rows(&ds), 2);
    }

    #[test]
    fn test_correlation_needs_aligned_pairs() {
        let ds = DataSet::new(
            "sparse",
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::from(1.0), CellValue::Null],
                vec![CellValue::from(2.0), CellValue::from(4.0)],
                vec![CellValue::Null, CellValue::from(6.0)],
                vec![CellValue::from(4.0), CellValue::from(8.0)],
            ],
        )
        .unwrap();
        assert!(analyze_dataset(&ds).correlations.is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert!(AnalysisConfig::default()
            .with_min_segment_size(0)
            .validate()
            .is_err());
    }
}
