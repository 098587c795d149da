//! Integration tests for tiered sampling, chunked analysis and result caching.

use std::sync::{Arc, Mutex};

use term_insight::config::InsightConfig;
use term_insight::core::{CellValue, DataSet, InsightEngine};
use term_insight::error::InsightError;
use term_insight::sampling::{
    get_processing_strategy, prepare_for_analysis, DatasetTier, ProgressCallback, SamplingConfig,
};

/// Tiers scaled down so tests stay fast: small <= 100, medium <= 1000, large <= 5000.
fn scaled_sampling() -> SamplingConfig {
    SamplingConfig {
        small_max_rows: 100,
        medium_max_rows: 1_000,
        large_max_rows: 5_000,
        medium_sample_size: 200,
        large_sample_size: 100,
        chunk_size: 25,
    }
}

/// `n` rows cycling through 10..=16 with a single spike at row 1000.
fn readings(n: usize) -> DataSet {
    let rows = (0..n)
        .map(|i| {
            let value = if i == 1_000 { 10_000.0 } else { 10.0 + (i % 7) as f64 };
            vec![CellValue::from(value)]
        })
        .collect();
    DataSet::new("readings", vec!["value".into()], rows).unwrap()
}

fn scaled_engine() -> InsightEngine {
    InsightEngine::builder()
        .config(InsightConfig::default().with_sampling(scaled_sampling()))
        .build()
        .unwrap()
}

#[test]
fn test_default_strategy_by_size() {
    let small = get_processing_strategy(&readings(50));
    assert_eq!(small.tier, DatasetTier::Small);
    assert!(!small.use_sampling);
    assert_eq!(small.sample_size, None);

    let medium = get_processing_strategy(&readings(12_000));
    assert_eq!(medium.tier, DatasetTier::Medium);
    assert_eq!(medium.sample_size, Some(10_000));
    assert!(!medium.use_chunking);
    assert!(medium.warning.is_none());
}

#[test]
fn test_prepare_samples_medium_datasets() {
    let prepared = prepare_for_analysis(&readings(12_000));
    assert!(prepared.is_sampled());
    assert_eq!(prepared.processed_data.row_count(), 10_000);
    assert_eq!(prepared.processed_data.name, "readings");
    // stride 2: every other row starting at row 0
    assert_eq!(prepared.processed_data.rows[1][0].as_number(), Some(12.0));

    let untouched = prepare_for_analysis(&readings(40));
    assert!(!untouched.is_sampled());
    assert_eq!(untouched.processed_data.row_count(), 40);
}

#[test]
fn test_large_dataset_is_sampled_with_warning() {
    let mut engine = scaled_engine();
    let result = engine.analyze(&readings(2_000));

    assert_eq!(result.strategy.tier, DatasetTier::Large);
    assert_eq!(result.analysis.row_count, 100);
    let warning = result.warning.unwrap();
    assert!(warning.contains("2000 rows"));
    assert!(warning.contains("sample of 100 rows"));
}

#[tokio::test]
async fn test_chunked_analysis_reports_progress() {
    let mut engine = scaled_engine();
    let progress = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&progress);
    let callback: ProgressCallback = Arc::new(move |p: f64| recorder.lock().unwrap().push(p));

    let result = engine
        .analyze_chunked(&readings(2_000), Some(callback))
        .await
        .unwrap();

    assert!(!result.cached);
    assert!(result.strategy.use_chunking);
    assert_eq!(result.analysis.row_count, 100);
    assert_eq!(*progress.lock().unwrap(), vec![0.25, 0.5, 0.75, 1.0]);

    // Row 1000 is sample row 50, the first row of the third chunk
    let spikes: Vec<_> = result.analysis.outliers_in("value").collect();
    assert_eq!(spikes.len(), 1);
    assert_eq!(spikes[0].row_index, 50);
    assert_eq!(spikes[0].value, 10_000.0);
}

#[tokio::test]
async fn test_chunked_analysis_uses_cache() {
    let mut engine = scaled_engine();
    let ds = readings(2_000);

    let first = engine.analyze_chunked(&ds, None).await.unwrap();
    let second = engine.analyze_chunked(&ds, None).await.unwrap();
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.analysis, second.analysis);
    assert_eq!(engine.cache().size(), 1);

    engine.clear_cache();
    assert!(engine.cache().is_empty());
    assert!(!engine.analyze_chunked(&ds, None).await.unwrap().cached);
}

#[tokio::test]
async fn test_small_datasets_skip_chunking() {
    let mut engine = scaled_engine();
    let result = engine.analyze_chunked(&readings(60), None).await.unwrap();
    assert_eq!(result.strategy.tier, DatasetTier::Small);
    assert!(!result.strategy.use_chunking);
    assert_eq!(result.analysis.row_count, 60);
}

#[test]
fn test_invalid_sampling_config_is_rejected() {
    let err = InsightEngine::builder()
        .config(InsightConfig::default().with_sampling(SamplingConfig::default().with_chunk_size(0)))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, InsightError::InvalidConfiguration(_)));
}
