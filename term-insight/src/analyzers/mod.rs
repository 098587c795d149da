//! Statistical analysis of a single dataset.
//!
//! ## Components
//!
//! - [`descriptive`]: summary statistics, z-scores and univariate outliers
//! - [`correlation`]: Pearson, Spearman, Cramér's V and point-biserial
//! - [`trend`], [`change_point`], [`seasonality`]: ordered-series detectors
//! - [`significance`]: closed-form p-value approximations shared with hypothesis testing
//! - [`runner`]: [`DataSetAnalyzer`], which runs all of the above over a [`DataSet`](crate::core::DataSet)

pub mod change_point;
pub mod correlation;
pub mod descriptive;
pub mod runner;
pub mod seasonality;
pub mod significance;
pub mod trend;
pub mod types;

pub use change_point::{detect_change_points, ChangeDirection, ChangePoint};
pub use correlation::{
    calculate_correlation, cramers_v, point_biserial_correlation, spearman_correlation,
    CategoricalAssociation, Correlation, CorrelationStrength,
};
pub use descriptive::{
    calculate_categorical_stats, calculate_stats, calculate_z_score, detect_outliers_iqr,
    detect_outliers_zscore, CategoricalStats, ColumnStats, ExpectedRange, NumericColumnStats,
    NumericStats, Outlier, ValueCount, ZScoreOutlier,
};
pub use runner::{analyze_dataset, AnalysisConfig, DataSetAnalyzer};
pub use seasonality::{detect_seasonality, SeasonalityResult};
pub use trend::{detect_trend, Trend, TrendDirection};
pub use types::{AnalysisResult, ColumnChangePoints, ColumnSeasonality};
