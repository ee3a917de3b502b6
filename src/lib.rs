//! TandemDB - An embedded relational + vector database engine written in Rust
//!
//! This library provides the core components of a file-backed data store:
//! - Relational tables (ordered columns, predicate select/update/delete)
//! - Vector tables (fixed dimension, cosine-similarity search)
//! - Databases (one directory of table files each, loaded lazily)
//! - Catalog (root-directory discovery and active-database routing)
//!
//! Command parsing and network transport are left to consumers of the typed
//! API exposed here.

pub mod catalog;
pub mod error;
pub mod storage;

pub use error::{Error, Result};
