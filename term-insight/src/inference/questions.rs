//! Clarifying questions for columns the engine is unsure about.

use serde::{Deserialize, Serialize};

use super::ColumnTypeInference;

/// Most raw samples attached to a question.
pub const MAX_QUESTION_SAMPLES: usize = 5;
/// Most alternative types offered alongside the top one.
pub const MAX_QUESTION_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// The semantic type is uncertain
    SemanticType,
    /// Every value is distinct
    UniqueIdentifier,
}

/// A question a human should answer before the inference is trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifyingQuestion {
    pub column: String,
    pub kind: QuestionKind,
    pub question: String,
    pub options: Vec<String>,
    pub sample_values: Vec<String>,
}

/// Builds the questions for one inferred column.
pub fn questions_for(inference: &ColumnTypeInference) -> Vec<ClarifyingQuestion> {
    let mut questions = Vec::new();
    let samples: Vec<String> = inference
        .sample_values
        .iter()
        .take(MAX_QUESTION_SAMPLES)
        .cloned()
        .collect();

    if inference.confidence_level.needs_clarification() && !inference.alternatives.is_empty() {
        let options = std::iter::once(inference.semantic_type)
            .chain(
                inference
                    .alternatives
                    .iter()
                    .take(MAX_QUESTION_ALTERNATIVES)
                    .map(|alt| alt.semantic_type),
            )
            .map(|t| t.as_str().to_string())
            .collect();
        questions.push(ClarifyingQuestion {
            column: inference.column.clone(),
            kind: QuestionKind::SemanticType,
            question: format!(
                "What kind of data does column '{}' contain? Best guess is '{}' at {:.0}% confidence.",
                inference.column, inference.semantic_type, inference.confidence
            ),
            options,
            sample_values: samples.clone(),
        });
    }

    let stats = &inference.stats;
    let non_null = stats.total - stats.null_count;
    if non_null >= 2 && stats.unique_count == non_null {
        questions.push(ClarifyingQuestion {
            column: inference.column.clone(),
            kind: QuestionKind::UniqueIdentifier,
            question: format!(
                "Every value in column '{}' is unique. Is it an identifier or unique data?",
                inference.column
            ),
            options: vec!["identifier".to_string(), "unique data".to_string()],
            sample_values: samples,
        });
    }

    questions
}
