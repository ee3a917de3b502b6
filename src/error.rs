//! Error types for TandemDB
//!
//! This module defines all error types used throughout the database engine.

use crate::storage::TableKind;
use thiserror::Error;

/// The main error type for TandemDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Vector Table Errors ==========
    #[error("Vector error: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Vector error: vector has zero L2 norm and cannot be normalized")]
    ZeroNormVector,

    #[error("Vector error: vector has a non-finite L2 norm and cannot be normalized")]
    NonFiniteVector,

    #[error("Vector error: table record has {vectors} vectors but {metadata} metadata entries")]
    MetadataMisaligned { vectors: usize, metadata: usize },

    // ========== Relational Table Errors ==========
    #[error("Table error: row has {got} values but table has {expected} columns")]
    ColumnCountMismatch { expected: usize, got: usize },

    #[error("Table error: duplicate column '{0}' in table definition")]
    DuplicateColumn(String),

    // ========== Catalog Errors ==========
    #[error("Catalog error: database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    #[error("Catalog error: database '{0}' does not exist")]
    DatabaseNotFound(String),

    #[error("Catalog error: {kind} table '{name}' already exists")]
    TableAlreadyExists { kind: TableKind, name: String },

    #[error("Catalog error: {kind} table '{name}' not found")]
    TableNotFound { kind: TableKind, name: String },

    #[error("Catalog error: no database selected")]
    NoDatabaseSelected,

    // ========== Persistence Errors ==========
    #[error("Load error: table file '{name}' could not be read: {reason}")]
    LoadFailure { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for TandemDB operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DimensionMismatch {
            expected: 128,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "Vector error: dimension mismatch: expected 128, got 3"
        );

        let err = Error::TableNotFound {
            kind: TableKind::Vector,
            name: "embeddings".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Catalog error: vector table 'embeddings' not found"
        );

        let err = Error::NonFiniteVector;
        assert_eq!(
            err.to_string(),
            "Vector error: vector has a non-finite L2 norm and cannot be normalized"
        );

        let err = Error::NoDatabaseSelected;
        assert_eq!(err.to_string(), "Catalog error: no database selected");
    }
}
