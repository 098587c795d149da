//! Schema and semantic type inference.
//!
//! Inference runs in two stages per column. The basic stage decides how the
//! values are stored ([`BasicType`](crate::core::BasicType)); the semantic
//! stage runs every registered [`SemanticScorer`] and ranks what the column
//! most likely means.
//!
//! ## Example
//!
//! ```rust
//! use term_insight::core::{CellValue, DataSet};
//! use term_insight::inference::{SchemaInferenceEngine, SemanticType};
//!
//! let rows = ["ada@example.com", "bob@example.com", "cy@example.org"]
//!     .iter()
//!     .map(|e| vec![CellValue::from(*e)])
//!     .collect();
//! let ds = DataSet::new("users", vec!["email".into()], rows).unwrap();
//!
//! let schema = SchemaInferenceEngine::new().infer(&ds);
//! assert_eq!(schema.columns[0].semantic_type, SemanticType::Email);
//! ```

pub mod basic;
pub mod patterns;
pub mod questions;
pub mod scorers;
pub mod semantic;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use basic::{infer_basic_type, BasicTypeInference};
pub use questions::{ClarifyingQuestion, QuestionKind};
pub use scorers::default_scorers;
pub use semantic::{ColumnSample, SemanticScorer, SemanticType, SemanticTypeScore};

use crate::core::{CellValue, ConfidenceLevel, DataSet};
use crate::error::{InsightError, Result};
use crate::logging::LogConfig;
use crate::{log_detector, log_info};

/// Number of ranked alternatives kept per column.
pub const MAX_ALTERNATIVES: usize = 3;

/// Configuration for the schema inference engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Rows examined per column (default: 10,000)
    pub sample_size: usize,
    /// Share of non-null values a basic type must reach (default: 0.8)
    pub basic_type_threshold: f64,
    /// Distinct sample values kept per column (default: 5)
    pub max_sample_values: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 10_000,
            basic_type_threshold: 0.8,
            max_sample_values: 5,
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(InsightError::invalid_config("sample_size must be positive"));
        }
        if !(self.basic_type_threshold > 0.0 && self.basic_type_threshold <= 1.0) {
            return Err(InsightError::invalid_config(
                "basic_type_threshold must be within (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Value statistics behind an inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInferenceStats {
    pub total: usize,
    pub null_count: usize,
    pub unique_count: usize,
    /// Distinct over non-null values
    pub unique_ratio: f64,
}

/// Inferred types for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTypeInference {
    pub column: String,
    pub basic_type: BasicTypeInference,
    pub semantic_type: SemanticType,
    /// Score of the winning semantic type, 0-100
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    /// Next-best semantic types with a positive score, best first
    pub alternatives: Vec<SemanticTypeScore>,
    pub sample_values: Vec<String>,
    pub stats: ColumnInferenceStats,
}

/// Inferred schema of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInference {
    pub dataset_name: String,
    pub columns: Vec<ColumnTypeInference>,
    /// Mean semantic confidence over all columns
    pub overall_confidence: f64,
    pub questions: Vec<ClarifyingQuestion>,
}

impl SchemaInference {
    pub fn column(&self, name: &str) -> Option<&ColumnTypeInference> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn overall_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.overall_confidence)
    }
}

/// Builder for [`SchemaInferenceEngine`].
pub struct SchemaInferenceEngineBuilder {
    config: InferenceConfig,
    log_config: LogConfig,
    scorers: Vec<Box<dyn SemanticScorer>>,
}

impl SchemaInferenceEngineBuilder {
    /// Set the number of rows examined per column
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Set the basic type ratio threshold
    pub fn basic_type_threshold(mut self, threshold: f64) -> Self {
        self.config.basic_type_threshold = threshold;
        self
    }

    /// Set the number of sample values kept per column
    pub fn max_sample_values(mut self, max: usize) -> Self {
        self.config.max_sample_values = max;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the logging configuration
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Register an additional scorer after the built-in ones
    pub fn add_scorer(mut self, scorer: Box<dyn SemanticScorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    /// Build the SchemaInferenceEngine
    pub fn build(self) -> SchemaInferenceEngine {
        SchemaInferenceEngine {
            config: self.config,
            log_config: self.log_config,
            scorers: self.scorers,
        }
    }
}

/// Runs basic and semantic inference over every column of a dataset.
pub struct SchemaInferenceEngine {
    config: InferenceConfig,
    log_config: LogConfig,
    scorers: Vec<Box<dyn SemanticScorer>>,
}

impl Default for SchemaInferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferenceEngine {
    /// Create a new builder with the built-in scorers registered
    pub fn builder() -> SchemaInferenceEngineBuilder {
        SchemaInferenceEngineBuilder {
            config: InferenceConfig::default(),
            log_config: LogConfig::default(),
            scorers: default_scorers(),
        }
    }

    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infers the schema of every column.
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name))]
    pub fn infer(&self, dataset: &DataSet) -> SchemaInference {
        log_info!(
            self.log_config,
            dataset = %dataset.name,
            columns = dataset.column_count(),
            scorers = self.scorers.len(),
            "Starting schema inference"
        );

        let columns: Vec<ColumnTypeInference> = (0..dataset.column_count())
            .map(|idx| self.infer_column(dataset, idx))
            .collect();

        let overall_confidence = if columns.is_empty() {
            0.0
        } else {
            columns.iter().map(|c| c.confidence).sum::<f64>() / columns.len() as f64
        };
        let questions = columns.iter().flat_map(questions::questions_for).collect();

        let schema = SchemaInference {
            dataset_name: dataset.name.clone(),
            columns,
            overall_confidence,
            questions,
        };

        log_info!(
            self.log_config,
            dataset = %dataset.name,
            overall_confidence = schema.overall_confidence,
            questions = schema.questions.len(),
            "Completed schema inference"
        );
        schema
    }

    /// Infers the types of the column at `idx`.
    pub fn infer_column(&self, dataset: &DataSet, idx: usize) -> ColumnTypeInference {
        let column = dataset.columns.get(idx).cloned().unwrap_or_default();
        let cells: Vec<&CellValue> = dataset
            .rows
            .iter()
            .take(self.config.sample_size)
            .filter_map(|row| row.get(idx))
            .collect();

        let mut basic_type = infer_basic_type(&cells, self.config.basic_type_threshold);
        if let Some(declared) = dataset.declared_type(&column) {
            if declared != basic_type.basic_type {
                basic_type.reasons.push(format!(
                    "Declared type '{declared}' differs from inferred type '{}'",
                    basic_type.basic_type
                ));
            }
        }

        let sample = ColumnSample::new(&column, &cells);
        let ranked = self.rank(&sample);
        log_detector!(
            self.log_config,
            column = %column,
            scores = ?ranked.iter().take(MAX_ALTERNATIVES + 1).collect::<Vec<_>>(),
            "Semantic scorer results"
        );
        let (semantic_type, confidence) = match ranked.first() {
            Some(top) if top.score > 0.0 => (top.semantic_type, top.score),
            _ => (SemanticType::Text, 0.0),
        };
        let alternatives: Vec<SemanticTypeScore> = if confidence > 0.0 {
            ranked
                .iter()
                .skip(1)
                .filter(|s| s.score > 0.0)
                .take(MAX_ALTERNATIVES)
                .copied()
                .collect()
        } else {
            Vec::new()
        };

        let null_count = cells.iter().filter(|c| c.is_null()).count();
        let stats = ColumnInferenceStats {
            total: cells.len(),
            null_count,
            unique_count: sample.unique_count(),
            unique_ratio: sample.unique_ratio(),
        };

        debug!(
            column = %column,
            basic_type = %basic_type.basic_type,
            semantic_type = %semantic_type,
            confidence,
            "Inferred column type"
        );

        ColumnTypeInference {
            confidence_level: ConfidenceLevel::from_score(confidence),
            sample_values: distinct_samples(sample.texts(), self.config.max_sample_values),
            column,
            basic_type,
            semantic_type,
            confidence,
            alternatives,
            stats,
        }
    }

    /// Scores a sample with every scorer, best first (ties keep registry order).
    pub fn rank(&self, sample: &ColumnSample<'_>) -> Vec<SemanticTypeScore> {
        let mut scores: Vec<SemanticTypeScore> = self
            .scorers
            .iter()
            .map(|scorer| SemanticTypeScore {
                semantic_type: scorer.semantic_type(),
                score: scorer.score(sample).clamp(0.0, 100.0),
            })
            .collect();
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }
}

/// Infers a schema with the default engine.
pub fn infer_schema(dataset: &DataSet) -> SchemaInference {
    SchemaInferenceEngine::new().infer(dataset)
}

fn distinct_samples(texts: &[String], max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    texts
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .take(max)
        .cloned()
        .collect()
}
