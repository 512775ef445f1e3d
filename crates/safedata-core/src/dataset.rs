//! In-memory tabular dataset model
//!
//! A [`Dataset`] is an ordered sequence of records over named, typed columns.
//! Column types are inferred once at construction and re-inferred only when an
//! anonymization technique rewrites cell values (a numeric column whose values
//! become "[lo-hi]" range labels is categorical afterwards).
//!
//! Every row carries a [`RecordId`] assigned at construction. Anonymization
//! techniques preserve these ids through generalization and suppression, which
//! lets the utility evaluator join original and processed rows by identity
//! instead of by position.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::Error;

/// Stable per-record identifier, unique within one dataset lineage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

/// A single cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    /// Missing data. Skipped by numeric extraction and frequency counts,
    /// grouped as its own key in equivalence classes.
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell, `None` for non-numeric or missing values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Hashable, totally-ordered grouping key for this value.
    pub fn key(&self) -> ValueKey {
        match self {
            // Normalize -0.0 so it groups with 0.0.
            Value::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                ValueKey::Number(n.to_bits())
            }
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Timestamp(ts) => ValueKey::Timestamp(ts.and_utc().timestamp()),
            Value::Null => ValueKey::Null,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Null => write!(f, ""),
        }
    }
}

/// Grouping key derived from a [`Value`]. Equality and hashing are exact,
/// so equivalence classes are well-defined even over float cells.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueKey {
    Number(u64),
    Text(String),
    Timestamp(i64),
    Null,
}

/// Per-column scalar type, inferred at dataset construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Temporal,
}

/// An ordered, immutable-after-construction table of records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    ids: Vec<RecordId>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset from column names and row values. Record ids are
    /// assigned positionally and column types inferred from the cells.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, Error> {
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.clone()) {
                return Err(Error::InvalidParameter {
                    name: "columns",
                    reason: format!("duplicate column name '{}'", col),
                });
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::InvalidParameter {
                    name: "rows",
                    reason: format!(
                        "row {} has {} cells, expected {}",
                        i,
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }
        let ids = (0..rows.len() as u64).map(RecordId).collect();
        let types = infer_types(&columns, &rows);
        Ok(Dataset {
            columns,
            types,
            ids,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_type(&self, index: usize) -> ColumnType {
        self.types[index]
    }

    /// Resolve a column name, surfacing a typed error for unknown names.
    pub fn require_column(&self, name: &str) -> Result<usize, Error> {
        self.column_index(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    pub fn record_id(&self, row: usize) -> RecordId {
        self.ids[row]
    }

    pub fn record_ids(&self) -> &[RecordId] {
        &self.ids
    }

    pub fn value(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    pub fn row(&self, row: usize) -> &[Value] {
        &self.rows[row]
    }

    /// All non-null numeric values of a column, in row order.
    pub fn numeric_values(&self, col: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row[col].as_number())
            .collect()
    }

    /// Column indices whose current type is numeric, in declaration order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| self.types[i] == ColumnType::Numeric)
            .collect()
    }

    /// New dataset keeping only the given row positions (ids preserved).
    pub fn select_rows(&self, positions: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            types: self.types.clone(),
            ids: positions.iter().map(|&p| self.ids[p]).collect(),
            rows: positions.iter().map(|&p| self.rows[p].clone()).collect(),
        }
    }

    /// New dataset with the given row positions removed (ids preserved).
    pub fn remove_rows(&self, positions: &BTreeSet<usize>) -> Dataset {
        let keep: Vec<usize> = (0..self.rows.len())
            .filter(|p| !positions.contains(p))
            .collect();
        self.select_rows(&keep)
    }

    pub(crate) fn set_value(&mut self, row: usize, col: usize, value: Value) {
        self.rows[row][col] = value;
    }

    /// Re-infer column types after cells were rewritten by a technique.
    pub(crate) fn reinfer_types(&mut self) {
        self.types = infer_types(&self.columns, &self.rows);
    }
}

fn infer_types(columns: &[String], rows: &[Vec<Value>]) -> Vec<ColumnType> {
    (0..columns.len())
        .map(|col| {
            let mut seen_any = false;
            let mut all_numeric = true;
            let mut all_temporal = true;
            for row in rows {
                match &row[col] {
                    Value::Null => continue,
                    Value::Number(_) => {
                        seen_any = true;
                        all_temporal = false;
                    }
                    Value::Timestamp(_) => {
                        seen_any = true;
                        all_numeric = false;
                    }
                    Value::Text(_) => {
                        seen_any = true;
                        all_numeric = false;
                        all_temporal = false;
                    }
                }
            }
            if seen_any && all_numeric {
                ColumnType::Numeric
            } else if seen_any && all_temporal {
                ColumnType::Temporal
            } else {
                ColumnType::Categorical
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_type_inference() {
        let ds = Dataset::from_rows(
            vec!["age".into(), "city".into(), "mixed".into()],
            vec![
                vec![num(34.0), text("Pune"), num(1.0)],
                vec![num(29.0), text("Delhi"), text("x")],
                vec![Value::Null, Value::Null, Value::Null],
            ],
        )
        .unwrap();

        assert_eq!(ds.column_type(0), ColumnType::Numeric);
        assert_eq!(ds.column_type(1), ColumnType::Categorical);
        assert_eq!(ds.column_type(2), ColumnType::Categorical);
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Dataset::from_rows(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Dataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![num(1.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_ids_survive_row_removal() {
        let ds = Dataset::from_rows(
            vec!["a".into()],
            vec![vec![num(1.0)], vec![num(2.0)], vec![num(3.0)]],
        )
        .unwrap();

        let mut gone = BTreeSet::new();
        gone.insert(1usize);
        let trimmed = ds.remove_rows(&gone);

        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed.record_id(0), RecordId(0));
        assert_eq!(trimmed.record_id(1), RecordId(2));
    }

    #[test]
    fn test_negative_zero_groups_with_zero() {
        assert_eq!(num(0.0).key(), num(-0.0).key());
    }

    #[test]
    fn test_numeric_values_skip_nulls() {
        let ds = Dataset::from_rows(
            vec!["a".into()],
            vec![vec![num(1.0)], vec![Value::Null], vec![num(3.0)]],
        )
        .unwrap();
        assert_eq!(ds.numeric_values(0), vec![1.0, 3.0]);
    }
}
