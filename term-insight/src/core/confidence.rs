//! Confidence bands shared by schema inference, hypotheses and relationships.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores at or above this are high confidence.
pub const HIGH_CONFIDENCE: f64 = 90.0;
/// Scores at or above this are medium confidence.
pub const MEDIUM_CONFIDENCE: f64 = 70.0;
/// Scores at or above this are low confidence; below is very low.
pub const LOW_CONFIDENCE: f64 = 50.0;

/// Confidence band derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// >= 90: proceed automatically
    High,
    /// 70-89: proceed but note the uncertainty
    Medium,
    /// 50-69: ask a clarifying question
    Low,
    /// < 50: require user input
    VeryLow,
}

impl ConfidenceLevel {
    /// Buckets a 0-100 score.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            ConfidenceLevel::High
        } else if score >= MEDIUM_CONFIDENCE {
            ConfidenceLevel::Medium
        } else if score >= LOW_CONFIDENCE {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    /// What a consumer should do with a result in this band.
    pub fn recommended_action(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "auto-proceed",
            ConfidenceLevel::Medium => "proceed and note uncertainty",
            ConfidenceLevel::Low => "ask a clarifying question",
            ConfidenceLevel::VeryLow => "require user input",
        }
    }

    /// Low and very low results need a human decision.
    pub fn needs_clarification(&self) -> bool {
        matches!(self, ConfidenceLevel::Low | ConfidenceLevel::VeryLow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very_low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ConfidenceLevel::from_score(100.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(90.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(89.9), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(70.0), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(69.0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(50.0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(49.9), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn test_clarification_needed_only_for_low_bands() {
        assert!(!ConfidenceLevel::High.needs_clarification());
        assert!(!ConfidenceLevel::Medium.needs_clarification());
        assert!(ConfidenceLevel::Low.needs_clarification());
        assert!(ConfidenceLevel::VeryLow.needs_clarification());
    }
}
