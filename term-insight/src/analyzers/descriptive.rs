//! Descriptive statistics and univariate outlier detection.
//!
//! Every function here degrades gracefully: empty input, all-null columns and
//! zero variance produce zero-valued or empty results, never NaN or a panic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::CellValue;

/// Default |z| above which a value is a z-score outlier.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Tukey fence multiplier.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Number of most frequent values kept for categorical columns.
pub const TOP_VALUES_LIMIT: usize = 10;

/// Summary statistics for a numeric sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std: f64,
    pub sum: f64,
    pub q1: f64,
    pub q3: f64,
}

impl NumericStats {
    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Computes summary statistics over the finite values of `values`.
///
/// Quartiles use nearest rank on the sorted sample
/// (`q1 = sorted[n/4]`, `q3 = sorted[3n/4]`). Empty input yields an
/// all-zero result.
///
/// # Examples
///
/// ```rust
/// use term_insight::analyzers::descriptive::calculate_stats;
///
/// let stats = calculate_stats(&[10.0, 20.0, 30.0, 40.0, 50.0]);
/// assert_eq!(stats.mean, 30.0);
/// assert_eq!(stats.median, 30.0);
/// assert!((stats.std - 14.142).abs() < 0.01);
/// ```
pub fn calculate_stats(values: &[f64]) -> NumericStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return NumericStats::default();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let sum: f64 = sorted.iter().sum();
    let mean = sum / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    NumericStats {
        count: n,
        mean,
        median,
        min: sorted[0],
        max: sorted[n - 1],
        std: variance.sqrt(),
        sum,
        q1: sorted[(n as f64 * 0.25).floor() as usize],
        q3: sorted[((n as f64 * 0.75).floor() as usize).min(n - 1)],
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample (n - 1) variance; 0 for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Standard score of `value`; 0 when `std` is zero.
pub fn calculate_z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }
    (value - mean) / std
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Summary of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub column: String,
    /// Total number of cells, nulls included
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    /// Up to ten most frequent values, ties in first-encountered order
    pub top_values: Vec<ValueCount>,
}

/// Computes categorical statistics for a column.
pub fn calculate_categorical_stats(column: &str, values: &[&CellValue]) -> CategoricalStats {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut null_count = 0usize;

    for cell in values {
        match cell.as_key() {
            None => null_count += 1,
            Some(key) => match positions.get(&key) {
                Some(&pos) => order[pos].1 += 1,
                None => {
                    positions.insert(key.clone(), order.len());
                    order.push((key, 1));
                }
            },
        }
    }

    let unique_count = order.len();
    // Stable sort keeps first-encountered order among equal counts
    order.sort_by(|a, b| b.1.cmp(&a.1));
    let top_values = order
        .into_iter()
        .take(TOP_VALUES_LIMIT)
        .map(|(value, count)| ValueCount { value, count })
        .collect();

    CategoricalStats {
        column: column.to_string(),
        count: values.len(),
        null_count,
        unique_count,
        top_values,
    }
}

/// Summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnStats {
    pub column: String,
    pub null_count: usize,
    #[serde(flatten)]
    pub stats: NumericStats,
}

/// Per-column statistics, by column kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric(NumericColumnStats),
    Categorical(CategoricalStats),
}

impl ColumnStats {
    pub fn column(&self) -> &str {
        match self {
            ColumnStats::Numeric(s) => &s.column,
            ColumnStats::Categorical(s) => &s.column,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnStats::Numeric(s) => s.null_count,
            ColumnStats::Categorical(s) => s.null_count,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericColumnStats> {
        match self {
            ColumnStats::Numeric(s) => Some(s),
            ColumnStats::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalStats> {
        match self {
            ColumnStats::Categorical(s) => Some(s),
            ColumnStats::Numeric(_) => None,
        }
    }
}

/// A value flagged by z-score detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreOutlier {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
}

/// Flags values whose |z| exceeds `threshold`.
///
/// Requires at least three values and a non-zero standard deviation.
pub fn detect_outliers_zscore(values: &[f64], threshold: f64) -> Vec<ZScoreOutlier> {
    if values.len() < 3 {
        return Vec::new();
    }
    let stats = calculate_stats(values);
    if stats.std == 0.0 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .filter_map(|(index, &value)| {
            let z_score = calculate_z_score(value, stats.mean, stats.std);
            (z_score.abs() > threshold).then_some(ZScoreOutlier {
                index,
                value,
                z_score,
            })
        })
        .collect()
}

/// Fence a value was expected to fall within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    pub min: f64,
    pub max: f64,
}

/// A value outside the Tukey fences of its column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub column: String,
    pub row_index: usize,
    pub value: f64,
    pub expected: ExpectedRange,
    pub z_score: f64,
}

/// Flags values outside `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`.
///
/// `values` pairs each number with its row index. Requires at least three
/// values.
pub fn detect_outliers_iqr(column: &str, values: &[(usize, f64)]) -> Vec<Outlier> {
    if values.len() < 3 {
        return Vec::new();
    }
    let raw: Vec<f64> = values.iter().map(|&(_, v)| v).collect();
    let stats = calculate_stats(&raw);
    let iqr = stats.iqr();
    let expected = ExpectedRange {
        min: stats.q1 - IQR_MULTIPLIER * iqr,
        max: stats.q3 + IQR_MULTIPLIER * iqr,
    };

    values
        .iter()
        .filter(|(_, v)| *v < expected.min || *v > expected.max)
        .map(|&(row_index, value)| Outlier {
            column: column.to_string(),
            row_index,
            value,
            expected,
            z_score: calculate_z_score(value, stats.mean, stats.std),
        })
        .collect()
}
