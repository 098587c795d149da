//! Join-key candidate extraction.

use std::collections::BTreeSet;

use super::naming::is_identifier_name;
use crate::core::DataSet;

/// A column that could take part in a join.
#[derive(Debug, Clone)]
pub struct KeyCandidate {
    pub dataset: String,
    pub column: String,
    /// Distinct non-null values, keyed by [`CellValue::as_key`](crate::core::CellValue::as_key).
    pub values: BTreeSet<String>,
    pub non_null: usize,
}

impl KeyCandidate {
    pub fn unique_count(&self) -> usize {
        self.values.len()
    }

    /// Distinct values over non-null values.
    pub fn uniqueness(&self) -> f64 {
        if self.non_null == 0 {
            0.0
        } else {
            self.values.len() as f64 / self.non_null as f64
        }
    }

    /// Whether this side of a join holds at most one row per key.
    pub fn is_one_side(&self, threshold: f64) -> bool {
        self.uniqueness() > threshold
    }
}

/// Collects the key candidates of one dataset.
///
/// A column qualifies when its name looks like an identifier or when more
/// than `min_unique_ratio` of its non-null values are distinct. Columns with
/// no non-null values never qualify.
pub fn extract_candidates(dataset: &DataSet, min_unique_ratio: f64) -> Vec<KeyCandidate> {
    dataset
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, column)| {
            let cells = dataset.column_at(idx);
            let keys: Vec<String> = cells.iter().filter_map(|c| c.as_key()).collect();
            if keys.is_empty() {
                return None;
            }
            let candidate = KeyCandidate {
                dataset: dataset.name.clone(),
                column: column.clone(),
                non_null: keys.len(),
                values: keys.into_iter().collect(),
            };
            (is_identifier_name(column) || candidate.uniqueness() > min_unique_ratio)
                .then_some(candidate)
        })
        .collect()
}
