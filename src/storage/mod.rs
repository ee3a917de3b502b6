//! Storage module
//!
//! This module contains the in-memory table structures:
//! - Cell values and row representation
//! - Relational row tables
//! - Vector tables with cosine-similarity search

pub mod relational;
pub mod value;
pub mod vector;

pub use relational::{RelationalTable, RowPredicate, RowSet};
pub use value::{Metadata, Row, RowInput, Value};
pub use vector::{SearchHit, VectorTable, DEFAULT_DIMENSION, DEFAULT_TOP_K};

use std::fmt;

/// The two table families a database manages.
///
/// Their namespaces are independent: a relational table and a vector table
/// may share a name without conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Relational,
    Vector,
}

impl TableKind {
    /// File suffix used in on-disk table file names (`<table>.<suffix>.db`).
    pub fn suffix(&self) -> &'static str {
        match self {
            TableKind::Relational => "rel",
            TableKind::Vector => "vec",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Relational => write!(f, "relational"),
            TableKind::Vector => write!(f, "vector"),
        }
    }
}
