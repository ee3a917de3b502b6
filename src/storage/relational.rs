//! Relational table storage for TandemDB
//!
//! A fixed-column row store with predicate-based select, update, and delete.
//! Column layout is set at creation; rows are plain value sequences aligned
//! positionally to the columns.

use crate::error::{Error, Result};
use crate::storage::{Row, RowInput, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Predicate over a row's cells. Rows are visited in insertion order.
pub type RowPredicate = dyn Fn(&[Value]) -> bool;

/// Declared type tag every column receives by default. Informational only:
/// inserts are never checked against it.
const DEFAULT_COLUMN_TYPE: &str = "text";

/// Result of a `select`: the surviving column names and the matching rows,
/// cell order aligned to `columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSet {
    /// Column names, after projection
    pub columns: Vec<String>,
    /// Matching rows, in insertion order
    pub rows: Vec<Row>,
}

/// A relational table: ordered unique columns and positional rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RelationalTableRecord")]
pub struct RelationalTable {
    columns: Vec<String>,
    column_types: IndexMap<String, String>,
    rows: Vec<Row>,
}

impl RelationalTable {
    /// Create an empty table with the given column layout.
    ///
    /// Fails with `DuplicateColumn` if a name repeats; every column gets the
    /// default `"text"` type tag.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut column_types = IndexMap::with_capacity(columns.len());
        for column in &columns {
            let replaced =
                column_types.insert(column.clone(), DEFAULT_COLUMN_TYPE.to_string());
            if replaced.is_some() {
                return Err(Error::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self {
            columns,
            column_types,
            rows: Vec::new(),
        })
    }

    /// Get the column names in layout order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the declared column type tags
    pub fn column_types(&self) -> &IndexMap<String, String> {
        &self.column_types
    }

    /// Get all rows in insertion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row.
    ///
    /// A positional row must match the column count exactly. A named row is
    /// reordered to the column layout: missing columns become `Null`, unknown
    /// keys are silently dropped.
    pub fn insert(&mut self, row: RowInput) -> Result<()> {
        let row = match row {
            RowInput::Positional(values) => {
                if values.len() != self.columns.len() {
                    return Err(Error::ColumnCountMismatch {
                        expected: self.columns.len(),
                        got: values.len(),
                    });
                }
                values
            }
            RowInput::Named(mut entries) => self
                .columns
                .iter()
                .map(|column| entries.swap_remove(column).unwrap_or(Value::Null))
                .collect(),
        };

        self.rows.push(row);
        Ok(())
    }

    /// Select rows, optionally filtered by `predicate` and projected to
    /// `projection`.
    ///
    /// Projection keeps the requested columns in the order given and silently
    /// drops names the table does not have; the returned column list contains
    /// only the kept names so it stays aligned with the row cells. Row order
    /// is always insertion order.
    pub fn select(
        &self,
        predicate: Option<&RowPredicate>,
        projection: Option<&[String]>,
    ) -> RowSet {
        let matching: Vec<&Row> = match predicate {
            Some(pred) => self
                .rows
                .iter()
                .filter(|row| pred(row.as_slice()))
                .collect(),
            None => self.rows.iter().collect(),
        };

        match projection {
            Some(requested) => {
                let kept: Vec<(&String, usize)> = requested
                    .iter()
                    .filter_map(|name| self.column_index(name).map(|idx| (name, idx)))
                    .collect();

                RowSet {
                    columns: kept.iter().map(|(name, _)| (*name).clone()).collect(),
                    rows: matching
                        .iter()
                        .map(|row| kept.iter().map(|&(_, idx)| row[idx].clone()).collect())
                        .collect(),
                }
            }
            None => RowSet {
                columns: self.columns.clone(),
                rows: matching.into_iter().cloned().collect(),
            },
        }
    }

    /// Overwrite the named columns on every row matching `predicate` (all
    /// rows when absent). Update keys naming unknown columns are silently
    /// ignored. Returns the number of rows matched.
    pub fn update(
        &mut self,
        updates: &IndexMap<String, Value>,
        predicate: Option<&RowPredicate>,
    ) -> usize {
        let resolved: Vec<(usize, &Value)> = updates
            .iter()
            .filter_map(|(name, value)| self.column_index(name).map(|idx| (idx, value)))
            .collect();

        let mut affected = 0;
        for row in &mut self.rows {
            if predicate.map_or(true, |pred| pred(row.as_slice())) {
                for &(idx, value) in &resolved {
                    row[idx] = value.clone();
                }
                affected += 1;
            }
        }
        affected
    }

    /// Remove every row matching `predicate`, preserving the order of the
    /// survivors. The predicate is mandatory: there is no implicit
    /// full-table delete. Returns the number of rows removed.
    pub fn delete(&mut self, predicate: &RowPredicate) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate(row.as_slice()));
        before - self.rows.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Serialization proxy for `RelationalTable`.
///
/// Tolerates records written without `column_types` by restoring the
/// all-`"text"` default, so files from older producers still load. Rows that
/// do not match the column count are rejected so a malformed record fails
/// the load instead of panicking in row access later.
#[derive(Deserialize)]
struct RelationalTableRecord {
    columns: Vec<String>,
    #[serde(default)]
    column_types: Option<IndexMap<String, String>>,
    rows: Vec<Row>,
}

impl TryFrom<RelationalTableRecord> for RelationalTable {
    type Error = Error;

    fn try_from(record: RelationalTableRecord) -> Result<Self> {
        for row in &record.rows {
            if row.len() != record.columns.len() {
                return Err(Error::ColumnCountMismatch {
                    expected: record.columns.len(),
                    got: row.len(),
                });
            }
        }

        let column_types = record.column_types.unwrap_or_else(|| {
            record
                .columns
                .iter()
                .map(|column| (column.clone(), DEFAULT_COLUMN_TYPE.to_string()))
                .collect()
        });

        Ok(Self {
            columns: record.columns,
            column_types,
            rows: record.rows,
        })
    }
}
