//! Storage-level type detection.

use serde::{Deserialize, Serialize};

use super::patterns::{is_boolean_literal, is_numeric_text, is_temporal_text};
use crate::core::{BasicType, CellValue};

/// Outcome of basic type detection for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicTypeInference {
    pub basic_type: BasicType,
    /// 0-100
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// Match counts over the non-null cells of a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub non_null: usize,
    pub boolean: usize,
    pub date: usize,
    pub numeric: usize,
}

impl TypeCounts {
    pub fn collect(cells: &[&CellValue]) -> Self {
        let mut counts = Self::default();
        for cell in cells {
            match cell {
                CellValue::Null => {}
                CellValue::Number(_) => {
                    counts.non_null += 1;
                    counts.numeric += 1;
                }
                CellValue::Text(text) => {
                    counts.non_null += 1;
                    if is_boolean_literal(text) {
                        counts.boolean += 1;
                    }
                    if is_temporal_text(text) {
                        counts.date += 1;
                    }
                    if is_numeric_text(text) {
                        counts.numeric += 1;
                    }
                }
            }
        }
        counts
    }

    fn ratio(&self, count: usize) -> f64 {
        if self.non_null == 0 {
            0.0
        } else {
            count as f64 / self.non_null as f64
        }
    }
}

/// Picks a basic type by ratio vote: boolean, then date, then number must
/// reach `threshold` (0-1) of the non-null cells; otherwise string.
pub fn infer_basic_type(cells: &[&CellValue], threshold: f64) -> BasicTypeInference {
    let counts = TypeCounts::collect(cells);
    if counts.non_null == 0 {
        return BasicTypeInference {
            basic_type: BasicType::Null,
            confidence: 100.0,
            reasons: vec![format!("All {} values are null", cells.len())],
        };
    }

    let boolean = counts.ratio(counts.boolean);
    let date = counts.ratio(counts.date);
    let numeric = counts.ratio(counts.numeric);
    let percent = |r: f64| r * 100.0;

    let candidates = [
        (BasicType::Boolean, boolean, counts.boolean, "boolean literals"),
        (BasicType::Date, date, counts.date, "a date pattern"),
        (BasicType::Number, numeric, counts.numeric, "numbers"),
    ];
    for (basic_type, ratio, count, label) in candidates {
        if ratio >= threshold {
            return BasicTypeInference {
                basic_type,
                confidence: percent(ratio),
                reasons: vec![format!(
                    "{count} of {} non-null values ({:.0}%) are {label}",
                    counts.non_null,
                    percent(ratio)
                )],
            };
        }
    }

    let strongest = boolean.max(date).max(numeric);
    let mut reasons = vec![format!(
        "No typed pattern reached {:.0}% of {} non-null values",
        percent(threshold),
        counts.non_null
    )];
    if strongest > 0.0 {
        reasons.push(format!(
            "Mixed content: up to {:.0}% of values match a typed pattern",
            percent(strongest)
        ));
    }
    BasicTypeInference {
        basic_type: BasicType::String,
        confidence: percent(1.0 - strongest),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[CellValue]) -> Vec<&CellValue> {
        values.iter().collect()
    }

    #[test]
    fn test_all_null() {
        let values = vec![CellValue::Null, CellValue::Null];
        let result = infer_basic_type(&cells(&values), 0.8);
        assert_eq!(result.basic_type, BasicType::Null);
        assert_eq!(result.confidence, 100.0);
    }

    #[test]
    fn test_boolean_beats_number_text() {
        let values: Vec<CellValue> = ["yes", "no", "Y", "n", "true"]
            .iter()
            .map(|s| CellValue::from(*s))
            .collect();
        let result = infer_basic_type(&cells(&values), 0.8);
        assert_eq!(result.basic_type, BasicType::Boolean);
        assert_eq!(result.confidence, 100.0);
    }

    #[test]
    fn test_dates_and_numbers() {
        let dates: Vec<CellValue> = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "n/a"]
            .iter()
            .map(|s| CellValue::from(*s))
            .collect();
        let result = infer_basic_type(&cells(&dates), 0.8);
        assert_eq!(result.basic_type, BasicType::Date);
        assert!((result.confidence - 80.0).abs() < 1e-9);

        let numbers = vec![CellValue::from(1.0), CellValue::from("2.5"), CellValue::Null];
        let result = infer_basic_type(&cells(&numbers), 0.8);
        assert_eq!(result.basic_type, BasicType::Number);
        assert_eq!(result.confidence, 100.0);
    }

    #[test]
    fn test_mixed_content_is_string() {
        let values: Vec<CellValue> = vec![
            CellValue::from(1.0),
            CellValue::from(2.0),
            CellValue::from("apple"),
            CellValue::from("pear"),
        ];
        let result = infer_basic_type(&cells(&values), 0.8);
        assert_eq!(result.basic_type, BasicType::String);
        assert!((result.confidence - 50.0).abs() < 1e-9);
        assert_eq!(result.reasons.len(), 2);
    }
}
