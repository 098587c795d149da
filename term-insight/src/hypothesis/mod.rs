//! Hypothesis generation and testing.
//!
//! [`HypothesisGenerator`] turns an [`AnalysisResult`](crate::analyzers::AnalysisResult)
//! into ranked, causally annotated hypotheses. [`HypothesisTester`] checks a
//! hypothesis against raw data and moves it to a terminal status.
//!
//! ```rust
//! use term_insight::analyzers::analyze_dataset;
//! use term_insight::core::{CellValue, DataSet};
//! use term_insight::hypothesis::{generate_hypotheses, test_hypothesis};
//!
//! let rows = (0..30)
//!     .map(|i| vec![CellValue::from(i as f64), CellValue::from(3.0 * i as f64 + 1.0)])
//!     .collect();
//! let ds = DataSet::new("ads", vec!["ad_spend".into(), "sales".into()], rows).unwrap();
//!
//! let analysis = analyze_dataset(&ds);
//! let hypotheses = generate_hypotheses(&ds, &analysis);
//! let result = test_hypothesis(&ds, &hypotheses[0]);
//! assert!(result.supported);
//! ```

pub mod causal;
pub mod generator;
pub mod tester;
pub mod types;

pub use causal::{classify, CausalReading};
pub use generator::{generate_hypotheses, HypothesisConfig, HypothesisGenerator};
pub use tester::{test_hypothesis, HypothesisTester};
pub use types::{
    CausalInterpretation, Hypothesis, HypothesisStatus, HypothesisTestResult, HypothesisType,
};
