//! Name-based causal heuristics.
//!
//! Column names are tokenized and matched against fixed keyword lists. These
//! heuristics only suggest a reading; they never establish causation.

use super::types::CausalInterpretation;
use crate::inference::semantic::tokenize;

pub const TIME_KEYWORDS: &[&str] = &[
    "date", "time", "year", "month", "day", "week", "period", "timestamp", "quarter",
];

pub const CAUSE_KEYWORDS: &[&str] = &[
    "spend", "marketing", "price", "discount", "training", "investment", "budget", "effort",
    "dose", "treatment", "ad", "ads", "campaign", "hours", "input", "temperature",
];

pub const EFFECT_KEYWORDS: &[&str] = &[
    "revenue", "sales", "profit", "conversion", "conversions", "satisfaction", "score",
    "outcome", "result", "performance", "churn", "retention", "growth", "output", "yield",
];

pub const CONFOUNDER_KEYWORDS: &[&str] = &[
    "time", "date", "size", "region", "location", "age", "season", "segment", "population",
    "income", "category",
];

fn has_keyword(column: &str, keywords: &[&str]) -> bool {
    tokenize(column).iter().any(|t| keywords.contains(&t.as_str()))
}

pub fn is_time_like(column: &str) -> bool {
    has_keyword(column, TIME_KEYWORDS)
}

pub fn is_cause_like(column: &str) -> bool {
    has_keyword(column, CAUSE_KEYWORDS)
}

pub fn is_effect_like(column: &str) -> bool {
    has_keyword(column, EFFECT_KEYWORDS)
}

pub fn is_confounder_like(column: &str) -> bool {
    has_keyword(column, CONFOUNDER_KEYWORDS)
}

/// Reading of a column pair, with the presumed cause first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalReading {
    pub interpretation: CausalInterpretation,
    pub cause: String,
    pub effect: String,
}

/// Classifies the pair `(a, b)` by name.
///
/// A time-like column is always the cause. `a` being a cause keyword and `b`
/// an effect keyword reads as causal; the reverse reads as reverse causal.
/// Everything else is correlational, or confounded when `has_confounder`.
pub fn classify(a: &str, b: &str, has_confounder: bool) -> CausalReading {
    let reading = |interpretation, cause: &str, effect: &str| CausalReading {
        interpretation,
        cause: cause.to_string(),
        effect: effect.to_string(),
    };

    if is_time_like(a) {
        return reading(CausalInterpretation::Causal, a, b);
    }
    if is_time_like(b) {
        return reading(CausalInterpretation::Causal, b, a);
    }
    if is_cause_like(a) && is_effect_like(b) {
        return reading(CausalInterpretation::Causal, a, b);
    }
    if is_effect_like(a) && is_cause_like(b) {
        return reading(CausalInterpretation::ReverseCausal, b, a);
    }
    if has_confounder {
        reading(CausalInterpretation::Confounded, a, b)
    } else {
        reading(CausalInterpretation::Correlational, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_is_always_cause() {
        let reading = classify("revenue", "order_date", false);
        assert_eq!(reading.interpretation, CausalInterpretation::Causal);
        assert_eq!(reading.cause, "order_date");
    }

    #[test]
    fn test_cause_effect_direction() {
        let forward = classify("marketing_spend", "revenue", false);
        assert_eq!(forward.interpretation, CausalInterpretation::Causal);
        assert_eq!(forward.cause, "marketing_spend");

        let reverse = classify("revenue", "adSpend", false);
        assert_eq!(reverse.interpretation, CausalInterpretation::ReverseCausal);
        assert_eq!(reverse.cause, "adSpend");
    }

    #[test]
    fn test_neutral_pair() {
        assert_eq!(
            classify("height", "weight", false).interpretation,
            CausalInterpretation::Correlational
        );
        assert_eq!(
            classify("height", "weight", true).interpretation,
            CausalInterpretation::Confounded
        );
    }

    #[test]
    fn test_keywords_match_whole_tokens() {
        assert!(is_cause_like("ad_budget"));
        assert!(!is_cause_like("download_count"));
        assert!(is_confounder_like("customer_age"));
        assert!(!is_confounder_like("average_order"));
    }
}
