//! Value and row types for TandemDB
//!
//! This module defines how cell values are represented in memory and on disk.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single row: cell values aligned positionally to a table's columns.
pub type Row = Vec<Value>;

/// Metadata attached to a stored vector: an ordered string-keyed mapping.
pub type Metadata = IndexMap<String, Value>;

/// A value in a table cell or a metadata entry.
///
/// The variant set is closed on purpose: every cell is one of these shapes,
/// so serialization is deterministic. On disk a `Value` is a plain JSON
/// scalar, array, or object (the representation is untagged), which keeps
/// table files readable by any JSON tooling. Non-finite floats have no JSON
/// form and are written as `null`, so they reload as `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL / absent value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit)
    Integer(i64),
    /// Float value (64-bit)
    Float(f64),
    /// String value
    String(String),
    /// Nested sequence
    Array(Vec<Value>),
    /// Nested mapping with stable key order
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to convert to f64 (integers widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to convert to string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Object(_) => "OBJECT",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Object(v)
    }
}

/// A row handed to `insert`, in either of the two accepted shapes.
///
/// `Positional` rows must match the table's column count exactly. `Named`
/// rows are reordered to the table's column layout; missing columns become
/// `Value::Null` and unknown keys are silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum RowInput {
    /// Values in column order
    Positional(Row),
    /// Values keyed by column name
    Named(IndexMap<String, Value>),
}

impl From<Row> for RowInput {
    fn from(row: Row) -> Self {
        RowInput::Positional(row)
    }
}

impl From<IndexMap<String, Value>> for RowInput {
    fn from(entries: IndexMap<String, Value>) -> Self {
        RowInput::Named(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::String("abc".to_string()).as_str(), Some("abc"));
        assert_eq!(Value::String("abc".to_string()).as_i64(), None);
    }

    #[test]
    fn test_untagged_json_form() {
        // Cells are stored as plain JSON, not enum-tagged records.
        assert_eq!(serde_json::to_string(&Value::Integer(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::Float(2.5)).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&Value::String("hi".to_string())).unwrap(),
            "\"hi\""
        );

        let parsed: Value = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, Value::Integer(5));
        let parsed: Value = serde_json::from_str("2.5").unwrap();
        assert_eq!(parsed, Value::Float(2.5));
        let parsed: Value = serde_json::from_str("true").unwrap();
        assert_eq!(parsed, Value::Boolean(true));
        let parsed: Value = serde_json::from_str(r#"{"id": 1, "tags": ["a"]}"#).unwrap();
        match parsed {
            Value::Object(entries) => {
                assert_eq!(entries["id"], Value::Integer(1));
                assert_eq!(
                    entries["tags"],
                    Value::Array(vec![Value::String("a".to_string())])
                );
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_float_degrades_to_null() {
        // JSON has no NaN or infinity; such cells come back as Null after a
        // reload, and the record stays parseable.
        assert_eq!(
            serde_json::to_string(&Value::Float(f64::NAN)).unwrap(),
            "null"
        );
        assert_eq!(
            serde_json::to_string(&Value::Float(f64::INFINITY)).unwrap(),
            "null"
        );
        let parsed: Value = serde_json::from_str("null").unwrap();
        assert!(parsed.is_null());
    }

    #[test]
    fn test_object_preserves_key_order() {
        let parsed: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        match parsed {
            Value::Object(entries) => {
                let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["z", "a", "m"]);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Boolean(false).to_string(), "FALSE");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(
            Value::Array(vec![Value::Integer(1), Value::Integer(2)]).to_string(),
            "[1, 2]"
        );
    }
}
