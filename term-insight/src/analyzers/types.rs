//! Result types produced by dataset analysis.

use serde::{Deserialize, Serialize};

use super::change_point::ChangePoint;
use super::correlation::{CategoricalAssociation, Correlation};
use super::descriptive::{ColumnStats, Outlier};
use super::seasonality::SeasonalityResult;
use super::trend::Trend;

/// Change points detected in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChangePoints {
    pub column: String,
    pub change_points: Vec<ChangePoint>,
}

/// Seasonality detected in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSeasonality {
    pub column: String,
    #[serde(flatten)]
    pub seasonality: SeasonalityResult,
}

/// Everything [`analyze_dataset`](super::analyze_dataset) finds in one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub dataset_name: String,
    pub row_count: usize,
    pub column_count: usize,
    /// One entry per column, in column order
    pub column_stats: Vec<ColumnStats>,
    /// Numeric column pairs, strongest |r| first
    pub correlations: Vec<Correlation>,
    pub trends: Vec<Trend>,
    pub outliers: Vec<Outlier>,
    pub duplicate_rows: usize,
    /// Only columns with at least one change point
    #[serde(default)]
    pub change_points: Vec<ColumnChangePoints>,
    /// Only columns where seasonality was detected
    #[serde(default)]
    pub seasonality: Vec<ColumnSeasonality>,
    #[serde(default)]
    pub categorical_associations: Vec<CategoricalAssociation>,
}

impl AnalysisResult {
    /// An empty result for a dataset with the given shape.
    pub fn empty(dataset_name: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            row_count,
            column_count,
            column_stats: Vec::new(),
            correlations: Vec::new(),
            trends: Vec::new(),
            outliers: Vec::new(),
            duplicate_rows: 0,
            change_points: Vec::new(),
            seasonality: Vec::new(),
            categorical_associations: Vec::new(),
        }
    }

    /// Statistics for a column by name.
    pub fn stats_for(&self, column: &str) -> Option<&ColumnStats> {
        self.column_stats.iter().find(|s| s.column() == column)
    }

    /// Names of the numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_stats
            .iter()
            .filter(|s| s.as_numeric().is_some())
            .map(ColumnStats::column)
            .collect()
    }

    /// Names of the categorical columns, in column order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.column_stats
            .iter()
            .filter(|s| s.as_categorical().is_some())
            .map(ColumnStats::column)
            .collect()
    }

    /// The correlation between two columns, in either order.
    pub fn correlation_between(&self, a: &str, b: &str) -> Option<&Correlation> {
        self.correlations.iter().find(|c| c.involves_pair(a, b))
    }

    /// Outliers flagged in one column.
    pub fn outliers_in<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Outlier> + 'a {
        self.outliers.iter().filter(move |o| o.column == column)
    }
}
