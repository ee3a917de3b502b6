//! A named database: one directory of table files
//!
//! Every table lives in its own file directly under the database directory,
//! named `<table>.rel.db` or `<table>.vec.db` by kind. The two kinds are
//! independent namespaces, so a relational and a vector table may share a
//! name. Tables load lazily on first access and are re-written wholesale
//! after every mutation; there is no write-ahead log and no cross-table
//! atomicity.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::{
    Metadata, RelationalTable, RowInput, RowPredicate, RowSet, SearchHit, TableKind, Value,
    VectorTable,
};

/// A database scopes a set of tables to one directory on disk.
///
/// The in-memory maps hold only the tables touched so far; a table can exist
/// on disk without appearing in either map until an operation loads it.
#[derive(Debug)]
pub struct Database {
    name: String,
    path: PathBuf,
    relational_tables: HashMap<String, RelationalTable>,
    vector_tables: HashMap<String, VectorTable>,
}

impl Database {
    /// Open the database directory under `root`, creating it if absent.
    ///
    /// No table files are read here; loading is deferred to first access.
    pub fn open(name: &str, root: &Path) -> Result<Self> {
        let path = root.join(name);
        fs::create_dir_all(&path)?;
        Ok(Self {
            name: name.to_string(),
            path,
            relational_tables: HashMap::new(),
            vector_tables: HashMap::new(),
        })
    }

    /// Get the database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the directory backing this database
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File path backing the table of the given kind.
    pub fn table_path(&self, name: &str, kind: TableKind) -> PathBuf {
        self.path.join(format!("{}.{}.db", name, kind.suffix()))
    }

    /// Create a relational table and persist its empty record immediately.
    ///
    /// The name is taken if a table of the same kind is already in memory or
    /// has a file on disk, so a restarted process cannot clobber data it has
    /// not loaded yet.
    pub fn create_table(&mut self, name: &str, columns: Vec<String>) -> Result<()> {
        if self.table_taken(name, TableKind::Relational) {
            return Err(Error::TableAlreadyExists {
                kind: TableKind::Relational,
                name: name.to_string(),
            });
        }

        let table = RelationalTable::new(columns)?;
        write_table(&self.table_path(name, TableKind::Relational), &table)?;
        self.relational_tables.insert(name.to_string(), table);
        debug!(
            "created relational table '{}' in database '{}'",
            name, self.name
        );
        Ok(())
    }

    /// Create a vector table of fixed `dimension` and persist it immediately.
    pub fn create_vector_table(&mut self, name: &str, dimension: usize) -> Result<()> {
        if self.table_taken(name, TableKind::Vector) {
            return Err(Error::TableAlreadyExists {
                kind: TableKind::Vector,
                name: name.to_string(),
            });
        }

        let table = VectorTable::new(dimension);
        write_table(&self.table_path(name, TableKind::Vector), &table)?;
        self.vector_tables.insert(name.to_string(), table);
        debug!(
            "created vector table '{}' (dimension {}) in database '{}'",
            name, dimension, self.name
        );
        Ok(())
    }

    /// Drop a table of the given kind: forget the in-memory copy and delete
    /// the backing file. Dropping a table that exists nowhere is a no-op.
    pub fn drop_table(&mut self, name: &str, kind: TableKind) -> Result<()> {
        match kind {
            TableKind::Relational => {
                self.relational_tables.remove(name);
            }
            TableKind::Vector => {
                self.vector_tables.remove(name);
            }
        }

        let path = self.table_path(name, kind);
        if path.is_file() {
            fs::remove_file(&path)?;
            debug!(
                "dropped {} table '{}' from database '{}'",
                kind, name, self.name
            );
        }
        Ok(())
    }

    /// Insert one row into a relational table and persist the table.
    pub fn insert_row(&mut self, table: &str, row: RowInput) -> Result<()> {
        let path = self.table_path(table, TableKind::Relational);
        let loaded = ensure_loaded(
            &mut self.relational_tables,
            &path,
            TableKind::Relational,
            table,
        )?;
        loaded.insert(row)?;
        write_table(&path, loaded)
    }

    /// Select rows from a relational table, optionally filtered and projected.
    pub fn select(
        &mut self,
        table: &str,
        predicate: Option<&RowPredicate>,
        columns: Option<&[String]>,
    ) -> Result<RowSet> {
        let path = self.table_path(table, TableKind::Relational);
        let loaded = ensure_loaded(
            &mut self.relational_tables,
            &path,
            TableKind::Relational,
            table,
        )?;
        Ok(loaded.select(predicate, columns))
    }

    /// Overwrite named columns on every matching row and persist the table.
    /// Returns the number of rows touched.
    pub fn update(
        &mut self,
        table: &str,
        updates: &IndexMap<String, Value>,
        predicate: Option<&RowPredicate>,
    ) -> Result<usize> {
        let path = self.table_path(table, TableKind::Relational);
        let loaded = ensure_loaded(
            &mut self.relational_tables,
            &path,
            TableKind::Relational,
            table,
        )?;
        let affected = loaded.update(updates, predicate);
        write_table(&path, loaded)?;
        Ok(affected)
    }

    /// Delete every matching row and persist the table. Returns the number
    /// of rows removed.
    pub fn delete_rows(&mut self, table: &str, predicate: &RowPredicate) -> Result<usize> {
        let path = self.table_path(table, TableKind::Relational);
        let loaded = ensure_loaded(
            &mut self.relational_tables,
            &path,
            TableKind::Relational,
            table,
        )?;
        let removed = loaded.delete(predicate);
        write_table(&path, loaded)?;
        Ok(removed)
    }

    /// Insert a vector with optional metadata and persist the table.
    /// Returns the new entry's index.
    pub fn insert_vector(
        &mut self,
        table: &str,
        vector: Vec<f64>,
        metadata: Option<Metadata>,
    ) -> Result<usize> {
        let path = self.table_path(table, TableKind::Vector);
        let loaded = ensure_loaded(&mut self.vector_tables, &path, TableKind::Vector, table)?;
        let index = loaded.insert(vector, metadata)?;
        write_table(&path, loaded)?;
        Ok(index)
    }

    /// Rank a vector table's entries against `query` and return the best
    /// `top_k` hits.
    pub fn search(&mut self, table: &str, query: &[f64], top_k: usize) -> Result<Vec<SearchHit>> {
        let path = self.table_path(table, TableKind::Vector);
        let loaded = ensure_loaded(&mut self.vector_tables, &path, TableKind::Vector, table)?;
        loaded.search(query, top_k)
    }

    fn table_taken(&self, name: &str, kind: TableKind) -> bool {
        let in_memory = match kind {
            TableKind::Relational => self.relational_tables.contains_key(name),
            TableKind::Vector => self.vector_tables.contains_key(name),
        };
        in_memory || self.table_path(name, kind).is_file()
    }
}

/// Get the table from the map, loading it from disk on first access.
///
/// A table absent from both the map and the disk is `TableNotFound`; so is a
/// file that exists but cannot be parsed (the load failure is logged and the
/// table treated as absent rather than wedging every later operation).
fn ensure_loaded<'a, T: DeserializeOwned>(
    tables: &'a mut HashMap<String, T>,
    path: &Path,
    kind: TableKind,
    name: &str,
) -> Result<&'a mut T> {
    match tables.entry(name.to_string()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(slot) => match read_table(path, kind, name) {
            Some(table) => Ok(slot.insert(table)),
            None => Err(Error::TableNotFound {
                kind,
                name: name.to_string(),
            }),
        },
    }
}

fn read_table<T: DeserializeOwned>(path: &Path, kind: TableKind, name: &str) -> Option<T> {
    if !path.is_file() {
        return None;
    }

    let parsed = fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|contents| serde_json::from_str(&contents).map_err(Error::from));
    match parsed {
        Ok(table) => {
            debug!("loaded {} table '{}' from {}", kind, name, path.display());
            Some(table)
        }
        Err(err) => {
            warn!(
                "{}",
                Error::LoadFailure {
                    name: name.to_string(),
                    reason: err.to_string(),
                }
            );
            None
        }
    }
}

fn write_table<T: Serialize>(path: &Path, table: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(path, json)?;
    Ok(())
}
