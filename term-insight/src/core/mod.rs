//! Data model, confidence bands and the [`InsightEngine`] facade.
//!
//! ## Overview
//!
//! - **[`DataSet`]**: an in-memory table of [`CellValue`]s, read-only to the engine
//! - **[`ConfidenceLevel`]**: the 0-100 score bands shared by inference,
//!   hypotheses and relationships
//! - **[`InsightEngine`]**: one object that samples, analyzes, caches and
//!   exposes every other component
//!
//! ## Architecture
//!
//! ```text
//! DataSet
//!     ├── sampling (tier, systematic sample)
//!     │   └── analyzers ── AnalysisResult
//!     │                     └── hypothesis (generate, test)
//!     ├── inference ── SchemaInference
//!     └── relationships (with other datasets) ── RelationshipReport
//! ```

pub mod confidence;
pub mod dataset;
pub mod engine;

pub use confidence::{ConfidenceLevel, HIGH_CONFIDENCE, LOW_CONFIDENCE, MEDIUM_CONFIDENCE};
pub use dataset::{row_fingerprint, BasicType, CellValue, DataSet};
pub use engine::{EngineAnalysis, InsightEngine, InsightEngineBuilder};
