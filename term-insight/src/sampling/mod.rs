//! Dataset sizing, deterministic sampling, chunked processing and caching.
//!
//! Every dataset is classified into a [`DatasetTier`] by row count before
//! analysis. Medium and larger datasets are reduced with systematic sampling
//! (never random), so the same input always yields the same sample.
//!
//! ```rust
//! use term_insight::sampling::{get_dataset_tier, DatasetTier};
//!
//! assert_eq!(get_dataset_tier(100_000), DatasetTier::Medium);
//! assert_eq!(get_dataset_tier(100_001), DatasetTier::Large);
//! ```

pub mod cache;
pub mod chunked;
pub mod timing;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::core::{CellValue, DataSet};
use crate::error::{InsightError, Result};
use crate::log_sampling;
use crate::logging::{truncate_field, LogConfig};

pub use cache::{AnalysisCache, CacheStats, DEFAULT_CACHE_TTL};
pub use chunked::{merge_results, process_in_chunks, ChunkHandler, ProgressCallback};
pub use timing::{timed, Stopwatch};

/// Size class of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetTier {
    Small,
    Medium,
    Large,
    Massive,
}

impl DatasetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetTier::Small => "small",
            DatasetTier::Medium => "medium",
            DatasetTier::Large => "large",
            DatasetTier::Massive => "massive",
        }
    }
}

impl fmt::Display for DatasetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-count boundaries and sample sizes for each tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Largest row count still analyzed in full
    pub small_max_rows: usize,
    pub medium_max_rows: usize,
    pub large_max_rows: usize,
    /// Sample size for medium datasets
    pub medium_sample_size: usize,
    /// Sample size for large and massive datasets
    pub large_sample_size: usize,
    /// Rows per chunk when chunked processing applies
    pub chunk_size: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            small_max_rows: 10_000,
            medium_max_rows: 100_000,
            large_max_rows: 500_000,
            medium_sample_size: 10_000,
            large_sample_size: 5_000,
            chunk_size: 1_000,
        }
    }
}

impl SamplingConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_sample_sizes(mut self, medium: usize, large: usize) -> Self {
        self.medium_sample_size = medium;
        self.large_sample_size = large;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.small_max_rows < self.medium_max_rows
            && self.medium_max_rows < self.large_max_rows)
        {
            return Err(InsightError::invalid_config(
                "tier boundaries must be strictly increasing",
            ));
        }
        if self.medium_sample_size == 0 || self.large_sample_size == 0 {
            return Err(InsightError::invalid_config("sample sizes must be positive"));
        }
        if self.chunk_size == 0 {
            return Err(InsightError::invalid_config("chunk_size must be positive"));
        }
        Ok(())
    }

    /// Classifies a row count.
    pub fn tier(&self, row_count: usize) -> DatasetTier {
        if row_count <= self.small_max_rows {
            DatasetTier::Small
        } else if row_count <= self.medium_max_rows {
            DatasetTier::Medium
        } else if row_count <= self.large_max_rows {
            DatasetTier::Large
        } else {
            DatasetTier::Massive
        }
    }

    /// Decides how a dataset of `row_count` rows should be processed.
    pub fn strategy(&self, row_count: usize) -> ProcessingStrategy {
        let tier = self.tier(row_count);
        let (sample_size, use_chunking) = match tier {
            DatasetTier::Small => (None, false),
            DatasetTier::Medium => (Some(self.medium_sample_size), false),
            DatasetTier::Large | DatasetTier::Massive => (Some(self.large_sample_size), true),
        };
        let warning = match tier {
            DatasetTier::Large => Some(format!(
                "Large dataset ({row_count} rows): analysis uses a systematic sample of {} rows",
                self.large_sample_size
            )),
            DatasetTier::Massive => Some(format!(
                "Massive dataset ({row_count} rows): analysis uses a systematic sample of {} rows; results are approximate",
                self.large_sample_size
            )),
            _ => None,
        };

        ProcessingStrategy {
            tier,
            row_count,
            use_sampling: sample_size.is_some(),
            sample_size,
            use_chunking,
            chunk_size: self.chunk_size,
            warning,
        }
    }
}

/// How a dataset will be processed before analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessingStrategy {
    pub tier: DatasetTier,
    pub row_count: usize,
    pub use_sampling: bool,
    pub sample_size: Option<usize>,
    pub use_chunking: bool,
    pub chunk_size: usize,
    pub warning: Option<String>,
}

/// Dataset ready for analysis with the strategy that produced it.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub processed_data: DataSet,
    pub strategy: ProcessingStrategy,
    pub warning: Option<String>,
}

impl PreparedData {
    /// Whether the processed data is a sample rather than the full dataset.
    pub fn is_sampled(&self) -> bool {
        self.processed_data.row_count() < self.strategy.row_count
    }
}

/// Keeps every `⌈n / target⌉`-th row starting at row 0, truncated to `target`.
///
/// Returns the rows unchanged when there are no more than `target` of them.
pub fn systematic_sample(rows: &[Vec<CellValue>], target: usize) -> Vec<Vec<CellValue>> {
    if target == 0 {
        return Vec::new();
    }
    if rows.len() <= target {
        return rows.to_vec();
    }
    let stride = rows.len().div_ceil(target);
    rows.iter().step_by(stride).take(target).cloned().collect()
}

/// Applies the sizing strategy to datasets.
#[derive(Debug, Clone, Default)]
pub struct DatasetSampler {
    config: SamplingConfig,
    log_config: LogConfig,
}

impl DatasetSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SamplingConfig) -> Self {
        Self {
            config,
            log_config: LogConfig::default(),
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn strategy(&self, dataset: &DataSet) -> ProcessingStrategy {
        self.config.strategy(dataset.row_count())
    }

    /// Samples the dataset if its tier requires it. The input is never modified.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name, rows = dataset.row_count()))]
    pub fn prepare(&self, dataset: &DataSet) -> PreparedData {
        let strategy = self.strategy(dataset);

        let processed_data = match strategy.sample_size {
            Some(target) if dataset.row_count() > target => {
                let sampled = dataset.with_rows(systematic_sample(&dataset.rows, target));
                log_sampling!(
                    self.log_config,
                    dataset = %truncate_field(&dataset.name, self.log_config.max_field_length),
                    tier = %strategy.tier,
                    original_rows = dataset.row_count(),
                    sampled_rows = sampled.row_count(),
                    "Applied systematic sampling"
                );
                sampled
            }
            _ => dataset.clone(),
        };

        if let Some(message) = &strategy.warning {
            warn!(dataset = %dataset.name, tier = %strategy.tier, "{}", message);
        }

        PreparedData {
            processed_data,
            warning: strategy.warning.clone(),
            strategy,
        }
    }
}

/// Classifies a row count with the default boundaries.
pub fn get_dataset_tier(row_count: usize) -> DatasetTier {
    SamplingConfig::default().tier(row_count)
}

/// Default processing strategy for a dataset.
pub fn get_processing_strategy(dataset: &DataSet) -> ProcessingStrategy {
    SamplingConfig::default().strategy(dataset.row_count())
}

/// Samples a dataset with the default strategy.
pub fn prepare_for_analysis(dataset: &DataSet) -> PreparedData {
    DatasetSampler::new().prepare(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Vec<CellValue>> {
        (0..n).map(|i| vec![CellValue::from(i as f64)]).collect()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(get_dataset_tier(0), DatasetTier::Small);
        assert_eq!(get_dataset_tier(10_000), DatasetTier::Small);
        assert_eq!(get_dataset_tier(10_001), DatasetTier::Medium);
        assert_eq!(get_dataset_tier(100_000), DatasetTier::Medium);
        assert_eq!(get_dataset_tier(100_001), DatasetTier::Large);
        assert_eq!(get_dataset_tier(500_000), DatasetTier::Large);
        assert_eq!(get_dataset_tier(500_001), DatasetTier::Massive);
    }

    #[test]
    fn test_strategies() {
        let config = SamplingConfig::default();

        let small = config.strategy(500);
        assert!(!small.use_sampling && !small.use_chunking && small.warning.is_none());

        let medium = config.strategy(50_000);
        assert_eq!(medium.sample_size, Some(10_000));
        assert!(!medium.use_chunking && medium.warning.is_none());

        let large = config.strategy(200_000);
        assert_eq!(large.sample_size, Some(5_000));
        assert!(large.use_chunking);
        assert!(large.warning.as_deref().unwrap().contains("200000 rows"));

        let massive = config.strategy(1_000_000);
        assert_eq!(massive.tier, DatasetTier::Massive);
        assert!(massive.warning.is_some());
    }

    #[test]
    fn test_systematic_sample_stride() {
        let sample = systematic_sample(&rows(25), 10);
        // stride = ceil(25 / 10) = 3
        let picked: Vec<f64> = sample.iter().filter_map(|r| r[0].as_number()).collect();
        assert_eq!(picked, vec![0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0, 24.0]);

        let exact = systematic_sample(&rows(30), 10);
        assert_eq!(exact.len(), 10);
        assert_eq!(exact[1][0], CellValue::from(3.0));

        assert_eq!(systematic_sample(&rows(5), 10).len(), 5);
        assert!(systematic_sample(&rows(5), 0).is_empty());
    }

    #[test]
    fn test_prepare_samples_medium_dataset() {
        let ds = DataSet::new("big", vec!["x".into()], rows(20_000)).unwrap();
        let prepared = prepare_for_analysis(&ds);

        assert_eq!(prepared.strategy.tier, DatasetTier::Medium);
        assert_eq!(prepared.processed_data.row_count(), 10_000);
        assert_eq!(prepared.processed_data.rows[1][0], CellValue::from(2.0));
        assert!(prepared.is_sampled());
        assert!(prepared.warning.is_none());
        assert_eq!(ds.row_count(), 20_000);
    }

    #[test]
    fn test_prepare_keeps_small_dataset() {
        let ds = DataSet::new("small", vec!["x".into()], rows(100)).unwrap();
        let prepared = prepare_for_analysis(&ds);
        assert!(!prepared.is_sampled());
        assert_eq!(prepared.processed_data.rows, ds.rows);
    }

    #[test]
    fn test_config_validation() {
        assert!(SamplingConfig::default().validate().is_ok());
        assert!(SamplingConfig::default().with_chunk_size(0).validate().is_err());
    }
}
