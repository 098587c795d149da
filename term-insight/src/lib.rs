//! # Term Insight - Exploratory Data Analysis for Rust
//!
//! Term Insight turns an in-memory table into statistical findings, typed and
//! confidence-scored column semantics, causally annotated hypotheses and
//! cross-dataset join relationships. It performs no I/O: loaders hand it a
//! [`DataSet`](core::DataSet) and renderers consume its serializable results.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_insight::prelude::*;
//!
//! # fn main() -> term_insight::error::Result<()> {
//! let rows = (0..40)
//!     .map(|i| {
//!         let spend = i as f64;
//!         vec![CellValue::from(spend), CellValue::from(3.0 * spend + (i % 4) as f64)]
//!     })
//!     .collect();
//! let ds = DataSet::new("ads", vec!["ad_spend".into(), "revenue".into()], rows)?;
//!
//! let mut engine = InsightEngine::new();
//! let analysis = engine.analyze(&ds).analysis;
//! assert_eq!(analysis.correlations.len(), 1);
//!
//! let schema = engine.infer_schema(&ds);
//! assert_eq!(schema.columns.len(), 2);
//!
//! for hypothesis in engine.generate_hypotheses(&ds, &analysis) {
//!     let result = engine.test_hypothesis(&ds, &hypothesis);
//!     println!("{}: supported = {}", hypothesis.title, result.supported);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! ### Descriptive Statistics
//!
//! - **Numeric**: mean, median, quartiles, population standard deviation
//! - **Categorical**: distinct counts and the ten most frequent values
//! - **Correlation**: Pearson, Spearman, Cramér's V and point-biserial
//! - **Outliers**: Tukey fences and z-scores
//!
//! ### Series Detectors
//!
//! Trends (least-squares slope), change points (pooled-variance split
//! statistic) and seasonality (autocorrelation peaks) run over every numeric
//! column in row order.
//!
//! ### Schema Inference
//!
//! Each column gets a basic storage type and a ranked semantic type produced by
//! a registry of [`SemanticScorer`](inference::SemanticScorer)s. Low-confidence
//! columns come with clarifying questions.
//!
//! ### Large Datasets
//!
//! Row counts above 10,000 are reduced with deterministic systematic sampling
//! before analysis; the largest tiers can also be processed in sequential
//! chunks with progress reporting.
//!
//! ## Architecture
//!
//! - **`core`**: `DataSet`, `CellValue`, confidence bands and the `InsightEngine` facade
//! - **`analyzers`**: statistics, correlation and series detectors
//! - **`inference`**: basic and semantic type inference
//! - **`hypothesis`**: hypothesis generation and significance testing
//! - **`relationships`**: join key discovery across datasets
//! - **`sampling`**: dataset tiers, sampling, chunking, caching and timing
//! - **`config`**, **`error`**, **`logging`**: ambient configuration, errors and tracing setup

pub mod analyzers;
pub mod config;
pub mod core;
pub mod error;
pub mod hypothesis;
pub mod inference;
pub mod logging;
pub mod prelude;
pub mod relationships;
pub mod sampling;
