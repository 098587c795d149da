//! Sequential chunked analysis with progress reporting.
//!
//! A dataset is split into contiguous blocks. Each block is handed to a
//! [`ChunkHandler`] and awaited before the next one starts, so at most one
//! chunk is in flight. Partial results are then folded with [`merge_results`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use crate::analyzers::{AnalysisResult, Correlation, DataSetAnalyzer};
use crate::core::DataSet;
use crate::error::{InsightError, Result};

/// Most outliers a merged result keeps.
pub const MAX_MERGED_OUTLIERS: usize = 100;

/// Type alias for progress callback function.
///
/// Receives the completed fraction in `(0, 1]` after each chunk.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Produces a partial analysis for one chunk.
#[async_trait]
pub trait ChunkHandler: Send + Sync {
    /// Analyzes `chunk`, the `index`-th block of the dataset.
    async fn process_chunk(&self, chunk: &DataSet, index: usize) -> Result<AnalysisResult>;
}

#[async_trait]
impl ChunkHandler for DataSetAnalyzer {
    async fn process_chunk(&self, chunk: &DataSet, _index: usize) -> Result<AnalysisResult> {
        Ok(self.analyze(chunk))
    }
}

/// Drives a [`ChunkHandler`] over contiguous blocks of a dataset.
///
/// # Examples
///
/// ```rust,no_run
/// use term_insight::analyzers::DataSetAnalyzer;
/// use term_insight::sampling::chunked::ChunkProcessor;
/// # use term_insight::core::DataSet;
/// # async fn example(dataset: DataSet) -> term_insight::error::Result<()> {
/// let merged = ChunkProcessor::new(1_000)
///     .on_progress(|progress| println!("{:.0}%", progress * 100.0))
///     .run(&dataset, &DataSetAnalyzer::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChunkProcessor {
    chunk_size: usize,
    on_progress: Option<ProgressCallback>,
}

impl ChunkProcessor {
    /// Creates a processor; a zero chunk size is treated as one row per chunk.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            on_progress: None,
        }
    }

    /// Sets a progress callback that will be called after each chunk.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn with_progress_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Processes every chunk in order and merges the partial results.
    ///
    /// Outlier row indices are shifted to dataset-global positions before
    /// merging. The first failing chunk aborts the run.
    #[instrument(skip(self, dataset, handler), fields(dataset = %dataset.name, rows = dataset.row_count(), chunk_size = self.chunk_size))]
    pub async fn run<H>(&self, dataset: &DataSet, handler: &H) -> Result<AnalysisResult>
    where
        H: ChunkHandler + ?Sized,
    {
        let total_chunks = dataset.row_count().div_ceil(self.chunk_size);
        if total_chunks == 0 {
            return handler
                .process_chunk(dataset, 0)
                .await
                .map_err(|e| InsightError::chunk_processing(0, e.to_string()));
        }

        info!(chunks = total_chunks, "Starting chunked analysis");
        let mut partials = Vec::with_capacity(total_chunks);

        for (index, block) in dataset.rows.chunks(self.chunk_size).enumerate() {
            let chunk = dataset.with_rows(block.to_vec());
            debug!(chunk = index, rows = block.len(), "Processing chunk");

            let mut partial = handler.process_chunk(&chunk, index).await.map_err(|e| {
                error!(chunk = index, error = %e, "Chunk failed");
                InsightError::chunk_processing(index, e.to_string())
            })?;

            let offset = index * self.chunk_size;
            for outlier in &mut partial.outliers {
                outlier.row_index += offset;
            }
            partials.push(partial);

            if let Some(ref callback) = self.on_progress {
                callback((index + 1) as f64 / total_chunks as f64);
            }
        }

        merge_results(&dataset.name, partials)
    }
}

/// Runs `handler` over `chunk_size`-row blocks of `dataset`.
pub async fn process_in_chunks<H>(
    dataset: &DataSet,
    chunk_size: usize,
    handler: &H,
    on_progress: Option<ProgressCallback>,
) -> Result<AnalysisResult>
where
    H: ChunkHandler + ?Sized,
{
    ChunkProcessor::new(chunk_size)
        .with_progress_callback(on_progress)
        .run(dataset, handler)
        .await
}

/// Folds partial results into one.
///
/// Row counts and duplicate counts are summed. The first partial's
/// column statistics, trends, change points, seasonality and associations
/// stand for the whole dataset. Correlations are unioned by unordered column
/// pair with the first occurrence winning, and outliers are concatenated up to
/// [`MAX_MERGED_OUTLIERS`].
pub fn merge_results(dataset_name: &str, partials: Vec<AnalysisResult>) -> Result<AnalysisResult> {
    let mut iter = partials.into_iter();
    let mut merged = iter.next().ok_or_else(|| {
        InsightError::Internal(format!("no partial results to merge for '{dataset_name}'"))
    })?;
    merged.dataset_name = dataset_name.to_string();

    let mut seen: HashSet<(String, String)> = merged.correlations.iter().map(pair_key).collect();
    merged.outliers.truncate(MAX_MERGED_OUTLIERS);

    for partial in iter {
        merged.row_count += partial.row_count;
        merged.duplicate_rows += partial.duplicate_rows;

        for correlation in partial.correlations {
            if seen.insert(pair_key(&correlation)) {
                merged.correlations.push(correlation);
            }
        }

        let room = MAX_MERGED_OUTLIERS.saturating_sub(merged.outliers.len());
        merged.outliers.extend(partial.outliers.into_iter().take(room));
    }

    Ok(merged)
}

fn pair_key(correlation: &Correlation) -> (String, String) {
    let (a, b) = (&correlation.column_a, &correlation.column_b);
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::analyzers::{ExpectedRange, Outlier};
    use crate::core::CellValue;

    fn dataset(n: usize) -> DataSet {
        let rows = (0..n)
            .map(|i| vec![CellValue::from(i as f64), CellValue::from((i % 7) as f64)])
            .collect();
        DataSet::new("chunky", vec!["x".into(), "y".into()], rows).unwrap()
    }

    struct RowCounter {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChunkHandler for RowCounter {
        async fn process_chunk(&self, chunk: &DataSet, index: usize) -> Result<AnalysisResult> {
            self.seen.lock().unwrap().push(index);
            Ok(AnalysisResult::empty(&chunk.name, chunk.row_count(), chunk.column_count()))
        }
    }

    struct FailOnSecond;

    #[async_trait]
    impl ChunkHandler for FailOnSecond {
        async fn process_chunk(&self, chunk: &DataSet, index: usize) -> Result<AnalysisResult> {
            if index == 1 {
                return Err(InsightError::Internal("boom".into()));
            }
            Ok(AnalysisResult::empty(&chunk.name, chunk.row_count(), chunk.column_count()))
        }
    }

    fn outlier(row_index: usize) -> Outlier {
        Outlier {
            column: "x".into(),
            row_index,
            value: 1.0,
            expected: ExpectedRange { min: 0.0, max: 0.5 },
            z_score: 3.5,
        }
    }

    #[tokio::test]
    async fn test_chunks_are_sequential_and_report_progress() {
        let handler = RowCounter {
            seen: Mutex::new(Vec::new()),
        };
        let progress = Arc::new(Mutex::new(Vec::new()));
        let progress_clone = progress.clone();

        let merged = ChunkProcessor::new(10)
            .on_progress(move |p| progress_clone.lock().unwrap().push(p))
            .run(&dataset(35), &handler)
            .await
            .unwrap();

        assert_eq!(merged.row_count, 35);
        assert_eq!(*handler.seen.lock().unwrap(), vec![0, 1, 2, 3]);
        let progress = progress.lock().unwrap();
        assert_eq!(*progress, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[tokio::test]
    async fn test_failing_chunk_aborts() {
        let err = process_in_chunks(&dataset(30), 10, &FailOnSecond, None)
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::ChunkProcessing { chunk: 1, .. }));
    }

    #[tokio::test]
    async fn test_analyzer_as_handler() {
        let merged = process_in_chunks(&dataset(40), 20, &DataSetAnalyzer::new(), None)
            .await
            .unwrap();
        assert_eq!(merged.row_count, 40);
        assert_eq!(merged.column_count, 2);
        assert_eq!(merged.correlations.len(), 1);
    }

    #[test]
    fn test_merge_dedups_correlations_and_caps_outliers() {
        let mut first = AnalysisResult::empty("d", 10, 3);
        first.correlations.push(Correlation::new("a", "b", 0.9, 10));
        first.outliers = (0..80).map(outlier).collect();
        first.duplicate_rows = 1;

        let mut second = AnalysisResult::empty("d", 10, 3);
        second.correlations.push(Correlation::new("b", "a", 0.1, 10));
        second.correlations.push(Correlation::new("a", "c", 0.5, 10));
        second.outliers = (80..130).map(outlier).collect();
        second.duplicate_rows = 2;

        let merged = merge_results("d", vec![first, second]).unwrap();
        assert_eq!(merged.row_count, 20);
        assert_eq!(merged.duplicate_rows, 3);
        assert_eq!(merged.correlations.len(), 2);
        assert_eq!(merged.correlations[0].pearson, 0.9);
        assert_eq!(merged.outliers.len(), MAX_MERGED_OUTLIERS);
        assert_eq!(merged.outliers.last().unwrap().row_index, 99);
    }

    #[test]
    fn test_merge_requires_partials() {
        assert!(merge_results("d", Vec::new()).is_err());
    }
}
