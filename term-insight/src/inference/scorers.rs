//! Built-in semantic scorers.
//!
//! Every scorer combines three kinds of evidence: name keywords (see
//! [`ColumnSample::keyword_score`]), the share of values matching a pattern,
//! and numeric range heuristics. Scores are clamped to 0-100.

use super::patterns::{
    is_boolean_literal, is_currency, is_date_text, is_datetime_text, is_email, is_numeric_text,
    is_percentage, is_phone, is_url, is_uuid,
};
use super::semantic::{ColumnSample, SemanticScorer, SemanticType};

/// Weight of a full value-pattern match.
const PATTERN_WEIGHT: f64 = 60.0;

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn is_integer(v: f64) -> bool {
    v.fract() == 0.0
}

/// Identifier columns: id-like names, UUID values, near-all-unique values.
pub struct IdScorer;

impl SemanticScorer for IdScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Id
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score = sample.keyword_score(&["id", "uuid", "guid", "pk", "key"], &["_id", "code", "ref"]);
        score += 40.0 * sample.text_ratio(is_uuid);
        if sample.non_null() >= 2 && sample.unique_ratio() >= 0.95 {
            score += 30.0;
            if sample.all_numbers(|v| is_integer(v) && v >= 0.0) {
                score += 10.0;
            }
        }
        clamp_score(score)
    }
}

pub struct BooleanScorer;

impl SemanticScorer for BooleanScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Boolean
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score = sample.keyword_score(
            &["is", "has", "flag", "active", "enabled", "can"],
            &["flag", "bool"],
        );
        score += PATTERN_WEIGHT * sample.text_ratio(is_boolean_literal);
        if sample.non_null() >= 2
            && sample.unique_count() == 2
            && sample.all_numbers(|v| v == 0.0 || v == 1.0)
            && sample.is_mostly_numeric()
        {
            score += 40.0;
        }
        clamp_score(score)
    }
}

pub struct PercentageScorer;

impl SemanticScorer for PercentageScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Percentage
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score =
            sample.keyword_score(&["percent", "percentage", "pct"], &["pct", "percent", "share"]);
        score += PATTERN_WEIGHT * sample.text_ratio(is_percentage);
        if sample.is_mostly_numeric()
            && sample.all_numbers(|v| (0.0..=100.0).contains(&v))
            && sample.any_number(|v| v > 1.0)
        {
            score += 20.0;
        }
        clamp_score(score)
    }
}

pub struct CurrencyScorer;

impl SemanticScorer for CurrencyScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Currency
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score = sample.keyword_score(
            &[
                "price", "cost", "amount", "revenue", "salary", "fee", "spend", "budget", "usd",
                "eur", "income", "sales", "profit",
            ],
            &["price", "cost", "amount", "revenue", "pay", "income", "sales"],
        );
        score += PATTERN_WEIGHT * sample.text_ratio(is_currency);
        if sample.is_mostly_numeric() && sample.all_numbers(|v| (v * 100.0).fract().abs() < 1e-9) {
            score += 10.0;
        }
        clamp_score(score)
    }
}

pub struct CountScorer;

impl SemanticScorer for CountScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Count
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score = sample.keyword_score(
            &["count", "qty", "quantity", "units", "visits", "clicks", "views", "num"],
            &["count", "qty", "num"],
        );
        if sample.is_mostly_numeric() && sample.all_numbers(|v| is_integer(v) && v >= 0.0) {
            score += 30.0;
        }
        clamp_score(score)
    }
}

pub struct RateScorer;

impl SemanticScorer for RateScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Rate
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score =
            sample.keyword_score(&["rate", "ratio", "probability", "prob"], &["rate", "ratio"]);
        if sample.is_mostly_numeric()
            && sample.all_numbers(|v| (0.0..=1.0).contains(&v))
            && sample.any_number(|v| !is_integer(v))
        {
            score += 40.0;
        }
        clamp_score(score)
    }
}

pub struct DateScorer;

impl SemanticScorer for DateScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Date
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let score = sample.keyword_score(&["date", "day", "dob", "birthday"], &["date", "dt"])
            + PATTERN_WEIGHT * sample.text_ratio(is_date_text);
        clamp_score(score)
    }
}

pub struct TimestampScorer;

impl SemanticScorer for TimestampScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Timestamp
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let score = sample.keyword_score(
            &["timestamp", "datetime", "ts", "time", "at"],
            &["time", "stamp"],
        ) + PATTERN_WEIGHT * sample.text_ratio(is_datetime_text);
        clamp_score(score)
    }
}

pub struct EmailScorer;

impl SemanticScorer for EmailScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Email
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let score = sample.keyword_score(&["email", "mail", "e-mail"], &["email", "mail"])
            + PATTERN_WEIGHT * sample.text_ratio(is_email);
        clamp_score(score)
    }
}

pub struct PhoneScorer;

impl SemanticScorer for PhoneScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Phone
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let score = sample.keyword_score(
            &["phone", "mobile", "tel", "telephone", "cell", "fax"],
            &["phone", "mobile"],
        ) + PATTERN_WEIGHT * sample.text_ratio(is_phone);
        clamp_score(score)
    }
}

pub struct UrlScorer;

impl SemanticScorer for UrlScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Url
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let score = sample.keyword_score(
            &["url", "link", "website", "uri", "homepage"],
            &["url", "link", "site"],
        ) + PATTERN_WEIGHT * sample.text_ratio(is_url);
        clamp_score(score)
    }
}

/// Low-cardinality labels.
pub struct CategoricalScorer {
    /// Most distinct values a categorical column may have
    pub max_categories: usize,
}

impl Default for CategoricalScorer {
    fn default() -> Self {
        Self { max_categories: 20 }
    }
}

impl SemanticScorer for CategoricalScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Categorical
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score = sample.keyword_score(
            &[
                "category", "type", "status", "kind", "group", "class", "segment", "region",
                "level", "tier",
            ],
            &["type", "status", "category", "cat"],
        );
        if sample.non_null() >= 5
            && sample.unique_count() <= self.max_categories
            && sample.unique_ratio() <= 0.5
        {
            score += 40.0;
        }
        if sample.non_null() > 0 && sample.text_ratio(|t| !is_numeric_text(t)) >= 0.9 {
            score += 10.0;
        }
        clamp_score(score)
    }
}

/// Free-form prose.
pub struct TextScorer;

impl SemanticScorer for TextScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Text
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        let mut score = sample.keyword_score(
            &[
                "description", "comment", "comments", "notes", "note", "text", "message", "body",
                "summary", "name", "title",
            ],
            &["desc", "text", "note", "comment"],
        );
        if sample.mean_text_length() > 30.0 {
            score += 40.0;
        }
        score += 20.0 * sample.text_ratio(|t| !is_numeric_text(t) && t.contains(' '));
        clamp_score(score)
    }
}

/// The built-in registry, in tie-breaking order.
pub fn default_scorers() -> Vec<Box<dyn SemanticScorer>> {
    vec![
        Box::new(IdScorer),
        Box::new(BooleanScorer),
        Box::new(PercentageScorer),
        Box::new(CurrencyScorer),
        Box::new(CountScorer),
        Box::new(RateScorer),
        Box::new(DateScorer),
        Box::new(TimestampScorer),
        Box::new(EmailScorer),
        Box::new(PhoneScorer),
        Box::new(UrlScorer),
        Box::new(CategoricalScorer::default()),
        Box::new(TextScorer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CellValue;

    fn score_with(scorer: &dyn SemanticScorer, name: &str, values: &[CellValue]) -> f64 {
        let refs: Vec<&CellValue> = values.iter().collect();
        scorer.score(&ColumnSample::new(name, &refs))
    }

    fn texts(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|s| CellValue::from(*s)).collect()
    }

    #[test]
    fn test_registry_covers_every_type_once() {
        let scorers = default_scorers();
        assert_eq!(scorers.len(), 13);
        let mut seen: Vec<SemanticType> = scorers.iter().map(|s| s.semantic_type()).collect();
        seen.dedup();
        assert_eq!(seen.len(), 13);
    }

    #[test]
    fn test_email_scorer() {
        let values = texts(&["a@x.com", "b@y.org", "c@z.net"]);
        assert_eq!(score_with(&EmailScorer, "email", &values), 100.0);
        assert!((score_with(&EmailScorer, "contact", &values) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_versus_percentage() {
        let rates: Vec<CellValue> = [0.1, 0.25, 0.5, 0.75].iter().map(|v| CellValue::from(*v)).collect();
        assert!(score_with(&RateScorer, "conversion_rate", &rates) >= 90.0);
        assert_eq!(score_with(&PercentageScorer, "conversion_rate", &rates), 0.0);

        let percents: Vec<CellValue> = [10.0, 25.0, 50.0, 75.0].iter().map(|v| CellValue::from(*v)).collect();
        assert_eq!(score_with(&PercentageScorer, "completion_pct", &percents), 70.0);
        assert_eq!(score_with(&RateScorer, "completion_pct", &percents), 0.0);
    }

    #[test]
    fn test_id_scorer_rewards_unique_integers() {
        let ids: Vec<CellValue> = (1..=10).map(|i| CellValue::from(i as f64)).collect();
        assert_eq!(score_with(&IdScorer, "customer_id", &ids), 90.0);
        assert_eq!(score_with(&IdScorer, "value", &ids), 40.0);
    }

    #[test]
    fn test_categorical_scorer() {
        let values = texts(&["gold", "silver", "gold", "bronze", "gold", "silver"]);
        assert_eq!(score_with(&CategoricalScorer::default(), "tier", &values), 100.0);
        assert_eq!(score_with(&CategoricalScorer::default(), "medal", &values), 50.0);
    }

    #[test]
    fn test_boolean_numeric_flags() {
        let values: Vec<CellValue> = [0.0, 1.0, 1.0, 0.0].iter().map(|v| CellValue::from(*v)).collect();
        assert_eq!(score_with(&BooleanScorer, "is_active", &values), 90.0);
    }
}
