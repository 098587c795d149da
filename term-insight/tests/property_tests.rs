//! Property-based tests for the term-insight analysis engine.
//!
//! ## Test Categories
//!
//! ### 1. Descriptive Statistics
//! - Standard deviation is never negative; empty input is all-zero
//! - Z-score outliers never fire on constant or tiny inputs
//!
//! ### 2. Correlation
//! - Pearson is symmetric and bounded
//!
//! ### 3. Dataset-level Invariants
//! - Analysis is a pure function of the dataset
//! - Duplicate rows equal rows minus distinct row contents
//! - Hypotheses are sorted, bounded and uniquely identified
//! - Systematic samples are deterministic prefixes of a fixed stride
//!
//! ### 4. Schema Inference
//! - Arbitrary text cells never panic the classifiers or scorers

use std::collections::HashSet;

use proptest::prelude::*;
use term_insight::analyzers::{
    analyze_dataset, calculate_correlation, calculate_stats, detect_outliers_zscore,
};
use term_insight::core::{CellValue, DataSet};
use term_insight::hypothesis::generate_hypotheses;
use term_insight::inference::infer_schema;
use term_insight::sampling::{get_dataset_tier, systematic_sample, DatasetTier};

// ============================================================================
// Strategies
// ============================================================================

fn finite_values(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6f64, 0..max_len)
}

fn small_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        (0..3i64).prop_map(CellValue::from),
        prop::sample::select(vec!["a", "b"]).prop_map(CellValue::from),
        Just(CellValue::Null),
    ]
}

fn small_table() -> impl Strategy<Value = DataSet> {
    prop::collection::vec(prop::collection::vec(small_cell(), 2), 0..40).prop_map(|rows| {
        DataSet::new("t", vec!["a".into(), "b".into()], rows).unwrap()
    })
}

fn mixed_table() -> impl Strategy<Value = DataSet> {
    prop::collection::vec(
        (
            -100.0..100.0f64,
            -100.0..100.0f64,
            0.0..10.0f64,
            prop::sample::select(vec!["north", "south", "east"]),
        ),
        10..60,
    )
    .prop_map(|rows| {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, (a, b, c, region))| {
                vec![
                    CellValue::from(a + i as f64),
                    CellValue::from(b),
                    CellValue::from(c * 2.0 + a),
                    CellValue::from(region),
                ]
            })
            .collect();
        DataSet::new(
            "mixed",
            vec!["spend".into(), "noise".into(), "revenue".into(), "region".into()],
            rows,
        )
        .unwrap()
    })
}

// ============================================================================
// Descriptive statistics
// ============================================================================

proptest! {
    #[test]
    fn prop_std_is_non_negative(values in finite_values(200)) {
        let stats = calculate_stats(&values);
        prop_assert!(stats.std >= 0.0);
        prop_assert!(stats.min <= stats.max || values.is_empty());
    }

    #[test]
    fn prop_constant_series_has_no_zscore_outliers(value in -1.0e6..1.0e6f64, len in 0usize..100) {
        let values = vec![value; len];
        prop_assert!(detect_outliers_zscore(&values, 2.0).is_empty());
    }

    #[test]
    fn prop_tiny_series_has_no_zscore_outliers(values in finite_values(3)) {
        prop_assume!(values.len() < 3);
        prop_assert!(detect_outliers_zscore(&values, 0.0).is_empty());
    }
}

#[test]
fn empty_stats_are_zero() {
    let stats = calculate_stats(&[]);
    for value in [
        stats.mean, stats.median, stats.min, stats.max, stats.std, stats.sum, stats.q1, stats.q3,
    ] {
        assert_eq!(value, 0.0);
    }
    assert_eq!(stats.count, 0);
}

// ============================================================================
// Correlation
// ============================================================================

proptest! {
    #[test]
    fn prop_pearson_symmetric_and_bounded(
        pairs in prop::collection::vec((-1.0e3..1.0e3f64, -1.0e3..1.0e3f64), 2..100)
    ) {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let xy = calculate_correlation(&x, &y);
        let yx = calculate_correlation(&y, &x);
        prop_assert_eq!(xy, yx);
        prop_assert!((-1.0..=1.0).contains(&xy));
    }
}

// ============================================================================
// Dataset-level invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_analysis_is_deterministic(ds in mixed_table()) {
        prop_assert_eq!(analyze_dataset(&ds), analyze_dataset(&ds));
    }

    #[test]
    fn prop_duplicates_match_distinct_rows(ds in small_table()) {
        let distinct: HashSet<String> = ds
            .rows
            .iter()
            .map(|row| serde_json::to_string(row).unwrap())
            .collect();
        let result = analyze_dataset(&ds);
        prop_assert_eq!(result.duplicate_rows, ds.row_count() - distinct.len());
    }

    #[test]
    fn prop_hypotheses_sorted_bounded_unique(ds in mixed_table()) {
        let analysis = analyze_dataset(&ds);
        let hypotheses = generate_hypotheses(&ds, &analysis);

        prop_assert!(hypotheses.len() <= 10);
        for pair in hypotheses.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
        }
        let ids: HashSet<&str> = hypotheses.iter().map(|h| h.id.as_str()).collect();
        prop_assert_eq!(ids.len(), hypotheses.len());
    }

    #[test]
    fn prop_systematic_sample_is_deterministic(n in 0usize..5_000, target in 1usize..500) {
        let rows: Vec<Vec<CellValue>> = (0..n).map(|i| vec![CellValue::from(i as i64)]).collect();
        let first = systematic_sample(&rows, target);
        let second = systematic_sample(&rows, target);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.len() <= target);

        if n > target {
            let stride = n.div_ceil(target);
            for (k, row) in first.iter().enumerate() {
                prop_assert_eq!(row[0].as_number(), Some((k * stride) as f64));
            }
        }
    }
}

// ============================================================================
// Schema inference
// ============================================================================

fn text_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        any::<String>().prop_map(CellValue::from),
        "[0-9٠-٩۰-۹]{4}-[0-9٠-٩]{2}-[0-9٠-٩]{2}[T ][0-9٠-٩]{2}:[0-9]{2}".prop_map(CellValue::from),
        Just(CellValue::Null),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_infer_schema_never_panics(cells in prop::collection::vec(text_cell(), 1..20)) {
        let rows = cells.into_iter().map(|cell| vec![cell]).collect();
        let ds = DataSet::new("free_text", vec!["created_at".into()], rows).unwrap();

        let schema = infer_schema(&ds);
        prop_assert_eq!(schema.columns.len(), 1);
        prop_assert!((0.0..=100.0).contains(&schema.columns[0].confidence));
    }
}

#[test]
fn tier_boundaries() {
    assert_eq!(get_dataset_tier(100_000), DatasetTier::Medium);
    assert_eq!(get_dataset_tier(100_001), DatasetTier::Large);
}
