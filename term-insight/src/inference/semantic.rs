//! Semantic type vocabulary and the scorer abstraction.
//!
//! A semantic type is what a column *means* (an email address, a rate, an
//! identifier) as opposed to how it is stored. Each [`SemanticScorer`] rates
//! one semantic type from the column name and values; the engine runs every
//! registered scorer and ranks the results.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::patterns::is_numeric_text;
use crate::core::CellValue;

/// Real-world meaning of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Id,
    Boolean,
    Percentage,
    Currency,
    Count,
    Rate,
    Date,
    Timestamp,
    Email,
    Phone,
    Url,
    Categorical,
    Text,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Id => "id",
            SemanticType::Boolean => "boolean",
            SemanticType::Percentage => "percentage",
            SemanticType::Currency => "currency",
            SemanticType::Count => "count",
            SemanticType::Rate => "rate",
            SemanticType::Date => "date",
            SemanticType::Timestamp => "timestamp",
            SemanticType::Email => "email",
            SemanticType::Phone => "phone",
            SemanticType::Url => "url",
            SemanticType::Categorical => "categorical",
            SemanticType::Text => "text",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score a scorer assigned to its semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticTypeScore {
    pub semantic_type: SemanticType,
    /// 0-100
    pub score: f64,
}

/// Rates how well a column fits one semantic type.
///
/// Implementations must be pure: the same sample always yields the same score.
pub trait SemanticScorer: Send + Sync {
    /// The semantic type this scorer rates.
    fn semantic_type(&self) -> SemanticType;

    /// Returns a score in 0-100.
    fn score(&self, sample: &ColumnSample<'_>) -> f64;
}

/// Points for a name token exactly matching a strong keyword.
pub const STRONG_KEYWORD_POINTS: f64 = 50.0;
/// Points for the name containing a weak keyword.
pub const WEAK_KEYWORD_POINTS: f64 = 25.0;

/// A column name and its values, pre-digested for scoring.
#[derive(Debug, Clone)]
pub struct ColumnSample<'a> {
    name: &'a str,
    name_lower: String,
    tokens: Vec<String>,
    /// Display form of each non-null cell
    texts: Vec<String>,
    /// Number cells plus numeric text
    numbers: Vec<f64>,
    total: usize,
    unique: usize,
}

impl<'a> ColumnSample<'a> {
    pub fn new(name: &'a str, cells: &[&CellValue]) -> Self {
        let mut texts = Vec::new();
        let mut numbers = Vec::new();
        for cell in cells {
            match cell {
                CellValue::Null => {}
                CellValue::Number(v) => {
                    texts.push(v.to_string());
                    if v.is_finite() {
                        numbers.push(*v);
                    }
                }
                CellValue::Text(s) => {
                    let trimmed = s.trim();
                    if is_numeric_text(trimmed) {
                        if let Ok(v) = trimmed.parse::<f64>() {
                            numbers.push(v);
                        }
                    }
                    texts.push(s.clone());
                }
            }
        }
        let unique = texts.iter().collect::<HashSet<_>>().len();

        Self {
            name,
            name_lower: name.to_lowercase(),
            tokens: tokenize(name),
            texts,
            numbers,
            total: cells.len(),
            unique,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Lowercase name tokens split on separators and camelCase boundaries.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn numbers(&self) -> &[f64] {
        &self.numbers
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn non_null(&self) -> usize {
        self.texts.len()
    }

    pub fn unique_count(&self) -> usize {
        self.unique
    }

    /// Distinct non-null values over non-null values.
    pub fn unique_ratio(&self) -> f64 {
        if self.texts.is_empty() {
            0.0
        } else {
            self.unique as f64 / self.texts.len() as f64
        }
    }

    /// Share of non-null values that are numeric.
    pub fn numeric_ratio(&self) -> f64 {
        if self.texts.is_empty() {
            0.0
        } else {
            self.numbers.len() as f64 / self.texts.len() as f64
        }
    }

    /// Share of non-null display values satisfying `predicate`.
    pub fn text_ratio(&self, predicate: impl Fn(&str) -> bool) -> f64 {
        if self.texts.is_empty() {
            return 0.0;
        }
        let matches = self.texts.iter().filter(|t| predicate(t)).count();
        matches as f64 / self.texts.len() as f64
    }

    /// True when the column is (almost) entirely numeric.
    pub fn is_mostly_numeric(&self) -> bool {
        !self.numbers.is_empty() && self.numeric_ratio() >= 0.9
    }

    pub fn all_numbers(&self, predicate: impl Fn(f64) -> bool) -> bool {
        !self.numbers.is_empty() && self.numbers.iter().all(|v| predicate(*v))
    }

    pub fn any_number(&self, predicate: impl Fn(f64) -> bool) -> bool {
        self.numbers.iter().any(|v| predicate(*v))
    }

    pub fn has_token(&self, keywords: &[&str]) -> bool {
        self.tokens.iter().any(|t| keywords.contains(&t.as_str()))
    }

    pub fn name_contains(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.name_lower.contains(k))
    }

    /// Strong tier (token match) or weak tier (substring) keyword points.
    pub fn keyword_score(&self, strong: &[&str], weak: &[&str]) -> f64 {
        if self.has_token(strong) {
            STRONG_KEYWORD_POINTS
        } else if self.name_contains(weak) {
            WEAK_KEYWORD_POINTS
        } else {
            0.0
        }
    }

    /// Mean character length of the non-null display values.
    pub fn mean_text_length(&self) -> f64 {
        if self.texts.is_empty() {
            0.0
        } else {
            self.texts.iter().map(|t| t.chars().count()).sum::<usize>() as f64
                / self.texts.len() as f64
        }
    }
}

/// Splits a column name into lowercase tokens.
///
/// `customerId`, `customer_id` and `Customer ID` all become `["customer", "id"]`.
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("customerId"), vec!["customer", "id"]);
        assert_eq!(tokenize("customer_id"), vec!["customer", "id"]);
        assert_eq!(tokenize("Customer ID"), vec!["customer", "id"]);
        assert_eq!(tokenize("HTTPStatus"), vec!["httpstatus"]);
        assert!(tokenize("__").is_empty());
    }

    #[test]
    fn test_column_sample_ratios() {
        let cells = vec![
            CellValue::from(1.0),
            CellValue::from("2"),
            CellValue::from("x"),
            CellValue::Null,
        ];
        let refs: Vec<&CellValue> = cells.iter().collect();
        let sample = ColumnSample::new("value_count", &refs);
        assert_eq!(sample.total(), 4);
        assert_eq!(sample.non_null(), 3);
        assert_eq!(sample.numbers(), &[1.0, 2.0]);
        assert!((sample.numeric_ratio() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(sample.unique_ratio(), 1.0);
        assert_eq!(sample.keyword_score(&["count"], &[]), STRONG_KEYWORD_POINTS);
        assert_eq!(sample.keyword_score(&["total"], &["val"]), WEAK_KEYWORD_POINTS);
    }
}
