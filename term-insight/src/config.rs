//! Aggregate configuration for [`InsightEngine`](crate::core::InsightEngine).
//!
//! Every section defaults to the engine's fixed threshold tables, so an empty
//! JSON object is a complete configuration:
//!
//! ```rust
//! use term_insight::config::InsightConfig;
//!
//! let config = InsightConfig::from_json_str(r#"{"hypothesis": {"max_hypotheses": 3}}"#).unwrap();
//! assert_eq!(config.hypothesis.max_hypotheses, 3);
//! assert_eq!(config.sampling.large_sample_size, 5_000);
//! ```

use serde::{Deserialize, Serialize};

use crate::analyzers::AnalysisConfig;
use crate::error::{ErrorContext, Result};
use crate::hypothesis::HypothesisConfig;
use crate::inference::InferenceConfig;
use crate::relationships::RelationshipConfig;
use crate::sampling::SamplingConfig;

/// All engine thresholds in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub analysis: AnalysisConfig,
    pub inference: InferenceConfig,
    pub hypothesis: HypothesisConfig,
    pub relationships: RelationshipConfig,
    pub sampling: SamplingConfig,
    /// Whether [`InsightEngine::analyze`](crate::core::InsightEngine::analyze) reuses cached results
    pub use_cache: bool,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            inference: InferenceConfig::default(),
            hypothesis: HypothesisConfig::default(),
            relationships: RelationshipConfig::default(),
            sampling: SamplingConfig::default(),
            use_cache: true,
        }
    }
}

impl InsightConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse insight config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_hypothesis(mut self, hypothesis: HypothesisConfig) -> Self {
        self.hypothesis = hypothesis;
        self
    }

    pub fn with_relationships(mut self, relationships: RelationshipConfig) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.inference.validate()?;
        self.hypothesis.validate()?;
        self.relationships.validate()?;
        self.sampling.validate()?;
        Ok(())
    }
}
