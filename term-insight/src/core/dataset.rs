//! Tabular data model consumed by every engine component.
//!
//! A [`DataSet`] is row-major: named columns and ordered rows of nullable
//! scalar [`CellValue`]s. Loaders outside this crate build it (it derives
//! `Deserialize`, so JSON of the shape `{"name": .., "columns": [..],
//! "rows": [[..]]}` works out of the box); the engine only reads it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{InsightError, Result};

/// A single nullable scalar cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric value.
    Number(f64),
    /// A string value.
    Text(String),
    /// A missing value.
    Null,
}

impl CellValue {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Returns true for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns the value of a finite numeric cell.
    ///
    /// Text that happens to look numeric is not converted: row-aligned
    /// statistics only use cells that were loaded as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload of a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns a grouping key for non-null cells (numbers use their display form).
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(v) => Some(v.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

/// Storage-level type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicType {
    String,
    Number,
    Date,
    Boolean,
    Null,
}

impl BasicType {
    /// Returns the lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            BasicType::String => "string",
            BasicType::Number => "number",
            BasicType::Date => "date",
            BasicType::Boolean => "boolean",
            BasicType::Null => "null",
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-memory table of named columns and nullable cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Dataset name, used in reports and relationship discovery
    pub name: String,
    /// Ordered column names
    pub columns: Vec<String>,
    /// Ordered rows; every row has one cell per column
    pub rows: Vec<Vec<CellValue>>,
    /// Optional declared basic type per column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_types: Option<HashMap<String, BasicType>>,
}

impl DataSet {
    /// Creates a dataset, checking that every row has one cell per column.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use term_insight::core::{CellValue, DataSet};
    ///
    /// let ds = DataSet::new(
    ///     "orders",
    ///     vec!["id".to_string(), "amount".to_string()],
    ///     vec![vec![CellValue::from(1.0), CellValue::from(9.5)]],
    /// )
    /// .unwrap();
    /// assert_eq!(ds.row_count(), 1);
    /// ```
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let dataset = Self {
            name: name.into(),
            columns,
            rows,
            column_types: None,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Attaches declared basic types for some or all columns.
    ///
    /// Fails with [`InsightError::ColumnNotFound`] when a declared column is
    /// not one of the dataset's columns.
    pub fn with_column_types(mut self, types: HashMap<String, BasicType>) -> Result<Self> {
        if let Some(unknown) = types.keys().find(|name| self.column_index(name).is_none()) {
            return Err(InsightError::column_not_found(unknown.as_str()));
        }
        self.column_types = Some(types);
        Ok(self)
    }

    /// Checks the row-length invariant.
    ///
    /// Datasets built through `Deserialize` skip [`DataSet::new`], so loaders
    /// should call this before handing the dataset to the engine.
    pub fn validate(&self) -> Result<()> {
        let expected = self.columns.len();
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(InsightError::RowLength {
                    dataset: self.name.clone(),
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }

    /// Creates a dataset with the same name, columns and types but different rows.
    pub fn with_rows(&self, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
            column_types: self.column_types.clone(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Returns the declared type of a column, if any.
    pub fn declared_type(&self, column: &str) -> Option<BasicType> {
        self.column_types
            .as_ref()
            .and_then(|types| types.get(column).copied())
    }

    /// Returns every cell of the column at `index`, in row order.
    pub fn column_at(&self, index: usize) -> Vec<&CellValue> {
        self.rows.iter().filter_map(|row| row.get(index)).collect()
    }

    /// Returns `(row_index, value)` for every numeric cell of a column.
    pub fn numeric_column(&self, index: usize) -> Vec<(usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(index).and_then(CellValue::as_number).map(|v| (i, v)))
            .collect()
    }

    /// Decides whether a column is treated as numeric.
    ///
    /// A declared type wins; otherwise at least half of the non-null cells
    /// must be numbers.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        if let Some(declared) = self
            .columns
            .get(index)
            .and_then(|name| self.declared_type(name))
        {
            return declared == BasicType::Number;
        }

        let mut non_null = 0usize;
        let mut numeric = 0usize;
        for row in &self.rows {
            match row.get(index) {
                Some(CellValue::Null) | None => {}
                Some(cell) => {
                    non_null += 1;
                    if cell.as_number().is_some() {
                        numeric += 1;
                    }
                }
            }
        }
        non_null > 0 && numeric * 2 >= non_null
    }

    /// Returns the indices of all numeric columns.
    pub fn numeric_column_indices(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| self.is_numeric_column(i))
            .collect()
    }

    /// Content fingerprint used as the analysis cache key.
    ///
    /// Covers the name, column list, row count and the first three cells of
    /// the first and last rows. Two datasets that differ only in interior
    /// rows share a fingerprint; the cache TTL bounds how long that matters.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0x1f]);
        for column in &self.columns {
            hasher.update(column.as_bytes());
            hasher.update([0x1e]);
        }
        hasher.update((self.rows.len() as u64).to_le_bytes());
        for row in [self.rows.first(), self.rows.last()].into_iter().flatten() {
            for cell in row.iter().take(3) {
                hash_cell(&mut hasher, cell);
            }
            hasher.update([0x1d]);
        }
        let hash = hasher.finalize();
        hex::encode(&hash[..16])
    }
}

/// Digest of a row's typed cell contents, used for duplicate detection.
///
/// Numbers hash by their bit pattern and text by its bytes, each prefixed by a
/// type tag, so `1` and `"1"` never collide.
pub fn row_fingerprint(row: &[CellValue]) -> [u8; 16] {
    let mut hasher = Sha256::new();
    for cell in row {
        hash_cell(&mut hasher, cell);
    }
    let hash = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&hash[..16]);
    out
}

fn hash_cell(hasher: &mut Sha256, cell: &CellValue) {
    match cell {
        CellValue::Null => hasher.update([0u8]),
        CellValue::Number(v) => {
            hasher.update([1u8]);
            hasher.update(v.to_bits().to_le_bytes());
        }
        CellValue::Text(s) => {
            hasher.update([2u8]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
    }
}
