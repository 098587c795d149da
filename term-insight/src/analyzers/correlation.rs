//! Pairwise association measures.
//!
//! Pearson and Spearman for numeric pairs, Cramér's V for two categorical
//! columns, and point-biserial for numeric against categorical. All of them
//! return 0 on degenerate input (mismatched or short series, zero variance,
//! a single category) instead of NaN.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::CellValue;

/// Strength bucket for a correlation coefficient, judged on |r|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    None,
}

impl CorrelationStrength {
    /// Buckets a coefficient: strong >= 0.7, moderate >= 0.4, weak >= 0.2.
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r >= 0.7 {
            CorrelationStrength::Strong
        } else if r >= 0.4 {
            CorrelationStrength::Moderate
        } else if r >= 0.2 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::None => "none",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pearson correlation between two numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub column_a: String,
    pub column_b: String,
    pub pearson: f64,
    pub strength: CorrelationStrength,
    /// Rank correlation over the same pairs, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spearman: Option<f64>,
    /// Number of row-aligned pairs the coefficient was computed from
    pub sample_size: usize,
}

impl Correlation {
    pub fn new(
        column_a: impl Into<String>,
        column_b: impl Into<String>,
        pearson: f64,
        sample_size: usize,
    ) -> Self {
        Self {
            column_a: column_a.into(),
            column_b: column_b.into(),
            pearson,
            strength: CorrelationStrength::from_coefficient(pearson),
            spearman: None,
            sample_size,
        }
    }

    pub fn with_spearman(mut self, spearman: f64) -> Self {
        self.spearman = Some(spearman);
        self
    }

    /// True when this correlation is between `a` and `b` in either order.
    pub fn involves_pair(&self, a: &str, b: &str) -> bool {
        (self.column_a == a && self.column_b == b) || (self.column_a == b && self.column_b == a)
    }

    /// True when either endpoint is `column`.
    pub fn involves(&self, column: &str) -> bool {
        self.column_a == column || self.column_b == column
    }

    /// The endpoint that is not `column`.
    pub fn other(&self, column: &str) -> Option<&str> {
        if self.column_a == column {
            Some(&self.column_b)
        } else if self.column_b == column {
            Some(&self.column_a)
        } else {
            None
        }
    }
}

/// Cramér's V between two categorical columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalAssociation {
    pub column_a: String,
    pub column_b: String,
    pub cramers_v: f64,
}

/// Pearson correlation coefficient.
///
/// Returns 0 for mismatched lengths, fewer than two points, or a constant
/// series. The result is clamped to [-1, 1].
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return 0.0;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    let r = cov / denom;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Average ranks (1-based); ties share the mean of their positions.
pub fn compute_ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j < indexed.len() && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 0.5;
        for &(original, _) in &indexed[i..j] {
            ranks[original] = avg_rank;
        }
        i = j;
    }
    ranks
}

/// Spearman rank correlation: Pearson over average ranks.
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 || x.len() != y.len() {
        return 0.0;
    }
    calculate_correlation(&compute_ranks(x), &compute_ranks(y))
}

/// Cramér's V between two categorical columns.
///
/// Only rows where both cells are non-null contribute. Returns 0 when either
/// side has fewer than two categories or no rows remain.
pub fn cramers_v(x: &[&CellValue], y: &[&CellValue]) -> f64 {
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut col_index: HashMap<String, usize> = HashMap::new();
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    for (a, b) in x.iter().zip(y) {
        let (Some(ka), Some(kb)) = (a.as_key(), b.as_key()) else {
            continue;
        };
        let next_row = row_index.len();
        let r = *row_index.entry(ka).or_insert(next_row);
        let next_col = col_index.len();
        let c = *col_index.entry(kb).or_insert(next_col);
        pairs.push((r, c));
    }

    let n = pairs.len();
    let rows = row_index.len();
    let cols = col_index.len();
    let k = rows.min(cols);
    if n == 0 || k < 2 {
        return 0.0;
    }

    let mut table = vec![0.0f64; rows * cols];
    let mut row_totals = vec![0.0f64; rows];
    let mut col_totals = vec![0.0f64; cols];
    for (r, c) in pairs {
        table[r * cols + c] += 1.0;
        row_totals[r] += 1.0;
        col_totals[c] += 1.0;
    }

    let total = n as f64;
    let mut chi_squared = 0.0;
    for r in 0..rows {
        for c in 0..cols {
            let expected = row_totals[r] * col_totals[c] / total;
            if expected > 0.0 {
                let observed = table[r * cols + c];
                chi_squared += (observed - expected).powi(2) / expected;
            }
        }
    }

    let v = (chi_squared / (total * (k - 1) as f64)).sqrt();
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Point-biserial correlation between a numeric and a categorical column.
///
/// The most frequent category (first encountered on ties) is coded 1 and all
/// others 0. Returns 0 when only one group is present.
pub fn point_biserial_correlation(numeric: &[&CellValue], categorical: &[&CellValue]) -> f64 {
    let rows: Vec<(f64, String)> = numeric
        .iter()
        .zip(categorical)
        .filter_map(|(n, c)| Some((n.as_number()?, c.as_key()?)))
        .collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for (_, category) in &rows {
        match counts.iter_mut().find(|(k, _)| *k == category.as_str()) {
            Some(entry) => entry.1 += 1,
            None => counts.push((category.as_str(), 1)),
        }
    }
    if counts.len() < 2 {
        return 0.0;
    }

    // max_by_key returns the last maximum, so scan manually to keep the first
    let mut dominant = counts[0];
    for &entry in &counts[1..] {
        if entry.1 > dominant.1 {
            dominant = entry;
        }
    }

    let values: Vec<f64> = rows.iter().map(|(v, _)| *v).collect();
    let codes: Vec<f64> = rows
        .iter()
        .map(|(_, c)| if c == dominant.0 { 1.0 } else { 0.0 })
        .collect();
    calculate_correlation(&values, &codes)
}
