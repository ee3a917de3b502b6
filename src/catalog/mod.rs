//! Catalog module
//!
//! Databases under one root directory, the table files inside them, and the
//! active-database routing that table operations go through.

pub mod catalog;
pub mod database;

pub use catalog::{Catalog, TableListing};
pub use database::Database;
