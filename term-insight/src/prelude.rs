//! Prelude for commonly used types and traits in term-insight.

pub use crate::analyzers::{analyze_dataset, AnalysisConfig, AnalysisResult};
pub use crate::config::InsightConfig;
pub use crate::core::{BasicType, CellValue, ConfidenceLevel, DataSet, InsightEngine};
pub use crate::error::{ErrorContext, InsightError, Result};
pub use crate::hypothesis::{generate_hypotheses, test_hypothesis, Hypothesis, HypothesisTestResult};
pub use crate::inference::{infer_schema, SchemaInference, SemanticScorer, SemanticType};
pub use crate::logging::LogConfig;
pub use crate::relationships::{find_relationships, RelationshipReport};
pub use crate::sampling::{
    get_dataset_tier, get_processing_strategy, prepare_for_analysis, ChunkHandler, DatasetTier,
};
