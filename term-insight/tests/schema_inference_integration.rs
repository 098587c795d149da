//! Integration tests for schema and semantic type inference.

use std::collections::HashMap;

use term_insight::core::{BasicType, CellValue, ConfidenceLevel, DataSet};
use term_insight::inference::{
    infer_schema, ColumnSample, QuestionKind, SchemaInferenceEngine, SemanticScorer, SemanticType,
};

const SEGMENTS: [&str; 3] = ["retail", "wholesale", "online"];

fn customers() -> DataSet {
    let rows = (1..=20)
        .map(|i| {
            vec![
                CellValue::from(i as f64),
                CellValue::from(format!("user{i}@example.com")),
                CellValue::from(SEGMENTS[i % 3]),
                CellValue::from((i % 2) as f64),
                CellValue::from(0.05 + 0.01 * i as f64),
                CellValue::from(format!("2024-01-{i:02}")),
            ]
        })
        .collect();
    DataSet::new(
        "customers",
        vec![
            "customer_id".into(),
            "email".into(),
            "segment".into(),
            "is_active".into(),
            "churn_rate".into(),
            "signup_date".into(),
        ],
        rows,
    )
    .unwrap()
}

#[test]
fn test_email_column_is_recognized() {
    let rows = ["ann@example.com", "bo@example.org", "cy@test.net", "di@mail.io", "ed@corp.co"]
        .iter()
        .map(|e| vec![CellValue::from(*e)])
        .collect();
    let ds = DataSet::new("contacts", vec!["email".into()], rows).unwrap();

    let schema = infer_schema(&ds);
    let email = schema.column("email").unwrap();
    assert_eq!(email.semantic_type, SemanticType::Email);
    assert!(email.confidence >= 80.0);
    assert_eq!(email.basic_type.basic_type, BasicType::String);
    assert_eq!(email.sample_values.len(), 5);
}

#[test]
fn test_customer_table_semantics() {
    let schema = infer_schema(&customers());
    let semantic = |name: &str| schema.column(name).unwrap().semantic_type;

    assert_eq!(semantic("customer_id"), SemanticType::Id);
    assert_eq!(semantic("email"), SemanticType::Email);
    assert_eq!(semantic("segment"), SemanticType::Categorical);
    assert_eq!(semantic("is_active"), SemanticType::Boolean);
    assert_eq!(semantic("churn_rate"), SemanticType::Rate);
    assert_eq!(semantic("signup_date"), SemanticType::Date);

    let id = schema.column("customer_id").unwrap();
    assert_eq!(id.confidence, 90.0);
    assert_eq!(id.confidence_level, ConfidenceLevel::High);
    assert_eq!(id.basic_type.basic_type, BasicType::Number);
    assert_eq!(id.stats.unique_count, 20);
    assert!(id.alternatives.len() <= 3);
    for pair in id.alternatives.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    assert_eq!(
        schema.column("signup_date").unwrap().basic_type.basic_type,
        BasicType::Date
    );
    assert!(schema.overall_confidence > 80.0);
}

#[test]
fn test_unique_columns_raise_identifier_question() {
    let schema = infer_schema(&customers());
    let unique_columns: Vec<&str> = schema
        .questions
        .iter()
        .filter(|q| q.kind == QuestionKind::UniqueIdentifier)
        .map(|q| q.column.as_str())
        .collect();

    assert!(unique_columns.contains(&"customer_id"));
    assert!(!unique_columns.contains(&"segment"));
    assert!(!unique_columns.contains(&"is_active"));
}

#[test]
fn test_declared_types_are_noted() {
    let mut types = HashMap::new();
    types.insert("customer_id".to_string(), BasicType::String);
    let ds = customers().with_column_types(types).unwrap();

    let schema = infer_schema(&ds);
    let id = schema.column("customer_id").unwrap();
    assert_eq!(id.basic_type.basic_type, BasicType::Number);
    assert!(id
        .basic_type
        .reasons
        .iter()
        .any(|r| r.contains("Declared type")));
}

struct AmountAbbreviationScorer;

impl SemanticScorer for AmountAbbreviationScorer {
    fn semantic_type(&self) -> SemanticType {
        SemanticType::Currency
    }

    fn score(&self, sample: &ColumnSample<'_>) -> f64 {
        if sample.has_token(&["amt"]) {
            100.0
        } else {
            0.0
        }
    }
}

#[test]
fn test_custom_scorer_is_consulted() {
    let rows = (0..10).map(|i| vec![CellValue::from(i as f64 * 1.5)]).collect();
    let ds = DataSet::new("ledger", vec!["amt".into()], rows).unwrap();

    let default_schema = SchemaInferenceEngine::new().infer(&ds);
    assert_ne!(default_schema.columns[0].semantic_type, SemanticType::Currency);

    let engine = SchemaInferenceEngine::builder()
        .add_scorer(Box::new(AmountAbbreviationScorer))
        .build();
    let schema = engine.infer(&ds);
    assert_eq!(schema.columns[0].semantic_type, SemanticType::Currency);
    assert_eq!(schema.columns[0].confidence, 100.0);
}

#[test]
fn test_sample_size_limits_rows_examined() {
    let engine = SchemaInferenceEngine::builder().sample_size(5).build();
    let schema = engine.infer(&customers());
    assert_eq!(schema.column("email").unwrap().stats.total, 5);
}

#[test]
fn test_all_null_column() {
    let rows = (0..4).map(|_| vec![CellValue::Null]).collect();
    let ds = DataSet::new("blank", vec!["notes".into()], rows).unwrap();

    let column = &infer_schema(&ds).columns[0];
    assert_eq!(column.basic_type.basic_type, BasicType::Null);
    assert_eq!(column.stats.null_count, 4);
}

#[test]
fn test_non_ascii_digit_text_is_a_string() {
    let rows = ["٢٠٢٤-٠١-٠١T12:30", "٢٠٢٤-٠٢-١٥T08:05", "١٢/٣١/٢٠٢٤"]
        .into_iter()
        .map(|v| vec![CellValue::from(v)])
        .collect();
    let ds = DataSet::new("events", vec!["occurred_at".into()], rows).unwrap();

    let column = &infer_schema(&ds).columns[0];
    assert_eq!(column.basic_type.basic_type, BasicType::String);
    assert_ne!(column.semantic_type, SemanticType::Timestamp);
}
