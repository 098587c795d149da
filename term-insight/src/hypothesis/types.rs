//! Hypothesis values and their test results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ConfidenceLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisType {
    Correlation,
    GroupDifference,
    Trend,
    Anomaly,
}

impl HypothesisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HypothesisType::Correlation => "correlation",
            HypothesisType::GroupDifference => "group_difference",
            HypothesisType::Trend => "trend",
            HypothesisType::Anomaly => "anomaly",
        }
    }
}

impl fmt::Display for HypothesisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a relationship between variables should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalInterpretation {
    Causal,
    Correlational,
    ReverseCausal,
    Confounded,
}

impl fmt::Display for CausalInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CausalInterpretation::Causal => "causal",
            CausalInterpretation::Correlational => "correlational",
            CausalInterpretation::ReverseCausal => "reverse_causal",
            CausalInterpretation::Confounded => "confounded",
        })
    }
}

/// Lifecycle of a hypothesis. Supported and unsupported are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisStatus {
    Generated,
    Supported,
    Unsupported,
}

impl HypothesisStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, HypothesisStatus::Generated)
    }
}

/// A testable statement about a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// `H1`, `H2`, ... within one generation run
    pub id: String,
    pub hypothesis_type: HypothesisType,
    pub title: String,
    pub description: String,
    /// 0-100
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub causal_interpretation: CausalInterpretation,
    pub confounders: Vec<String>,
    pub recommendations: Vec<String>,
    /// Columns the hypothesis refers to; testers resolve them by name
    pub variables: Vec<String>,
    pub testable: bool,
    pub suggested_test: String,
    pub status: HypothesisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_result: Option<HypothesisTestResult>,
}

impl Hypothesis {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Returns this hypothesis after a test.
    ///
    /// An untested hypothesis moves to supported or unsupported; one that was
    /// already tested is returned unchanged.
    pub fn with_test_result(&self, result: HypothesisTestResult) -> Self {
        if self.status.is_terminal() {
            return self.clone();
        }
        let mut tested = self.clone();
        tested.status = if result.supported {
            HypothesisStatus::Supported
        } else {
            HypothesisStatus::Unsupported
        };
        tested.test_result = Some(result);
        tested
    }
}

/// Outcome of testing a hypothesis against raw data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisTestResult {
    pub supported: bool,
    /// 0-100
    pub confidence: f64,
    pub test_statistic: f64,
    pub p_value: f64,
    pub effect_size: f64,
    pub interpretation: String,
    pub caveats: Vec<String>,
    pub sample_size: usize,
}

impl HypothesisTestResult {
    /// An unsupported result that carries only an explanation.
    pub fn not_supported(interpretation: impl Into<String>, caveats: Vec<String>) -> Self {
        Self {
            supported: false,
            confidence: 0.0,
            test_statistic: 0.0,
            p_value: 1.0,
            effect_size: 0.0,
            interpretation: interpretation.into(),
            caveats,
            sample_size: 0,
        }
    }
}
