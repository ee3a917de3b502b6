//! Engine catalog: the root directory of databases
//!
//! The catalog owns every database under a single root directory and tracks
//! which one is active. Opening it scans the root for subdirectories and
//! registers each as a database shell with no tables loaded. Table listings
//! come from directory contents rather than in-memory state, so files written
//! by an earlier process show up without any extra bookkeeping.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::database::Database;
use crate::error::{Error, Result};
use crate::storage::{Metadata, RowInput, RowPredicate, RowSet, SearchHit, TableKind, Value};

/// Table names in one database, split by kind.
///
/// Built from the directory listing, so it reflects disk state whether or
/// not the tables have been loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableListing {
    pub relational: Vec<String>,
    pub vector: Vec<String>,
}

/// The engine's root object: the databases under one directory, plus the
/// active selection that per-table operations route through.
#[derive(Debug)]
pub struct Catalog {
    /// Root directory holding one subdirectory per database
    root_path: PathBuf,
    /// Registered databases by name
    databases: HashMap<String, Database>,
    /// Name of the active database; `None` until one is created or selected
    current_db: Option<String>,
}

impl Catalog {
    /// Open the root directory, creating it if absent, and register every
    /// subdirectory as a database. No table files are read here.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root_path = root.into();
        fs::create_dir_all(&root_path)?;

        let mut databases = HashMap::new();
        for entry in fs::read_dir(&root_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                let database = Database::open(name, &root_path)?;
                debug!("discovered database '{}'", name);
                databases.insert(name.to_string(), database);
            }
        }

        info!(
            "catalog opened at {} with {} database(s)",
            root_path.display(),
            databases.len()
        );

        Ok(Self {
            root_path,
            databases,
            current_db: None,
        })
    }

    /// Get the root directory
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Name of the active database, if one is selected
    pub fn current_database(&self) -> Option<&str> {
        self.current_db.as_deref()
    }

    /// Create a database and make it the active one.
    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if self.databases.contains_key(name) {
            return Err(Error::DatabaseAlreadyExists(name.to_string()));
        }

        let database = Database::open(name, &self.root_path)?;
        self.databases.insert(name.to_string(), database);
        self.current_db = Some(name.to_string());
        info!("created database '{}'", name);
        Ok(())
    }

    /// Drop a database: every table file, then the directory itself, then the
    /// registration. Clears the active selection if it pointed here.
    ///
    /// The multi-file delete is not atomic; a failure partway through leaves
    /// the remaining files on disk and the database still registered.
    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        if !self.databases.contains_key(name) {
            return Err(Error::DatabaseNotFound(name.to_string()));
        }

        let path = self.root_path.join(name);
        if path.is_dir() {
            for entry in fs::read_dir(&path)? {
                let entry = entry?;
                fs::remove_file(entry.path())?;
            }
            fs::remove_dir(&path)?;
        }

        self.databases.remove(name);
        if self.current_db.as_deref() == Some(name) {
            self.current_db = None;
        }
        info!("dropped database '{}'", name);
        Ok(())
    }

    /// Select the active database.
    ///
    /// The one lookup that misses softly: a hit selects and returns the
    /// database, a miss returns `None` and leaves the current selection
    /// unchanged.
    pub fn use_database(&mut self, name: &str) -> Option<&Database> {
        if !self.databases.contains_key(name) {
            return None;
        }
        self.current_db = Some(name.to_string());
        self.databases.get(name)
    }

    /// List registered database names, sorted.
    pub fn list_databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.keys().cloned().collect();
        names.sort();
        names
    }

    /// List a database's tables by kind, read straight from its directory.
    ///
    /// `db` falls back to the active database when `None`; when neither
    /// resolves (no such database, or nothing selected) the listing is empty
    /// rather than an error.
    pub fn list_tables(&self, db: Option<&str>) -> Result<TableListing> {
        let name = match db.or(self.current_db.as_deref()) {
            Some(name) => name,
            None => return Ok(TableListing::default()),
        };
        let database = match self.databases.get(name) {
            Some(database) => database,
            None => return Ok(TableListing::default()),
        };

        let mut listing = TableListing::default();
        for entry in fs::read_dir(database.path())? {
            let entry = entry?;
            if let Some(file_name) = entry.file_name().to_str() {
                if let Some(table) = file_name.strip_suffix(".rel.db") {
                    listing.relational.push(table.to_string());
                } else if let Some(table) = file_name.strip_suffix(".vec.db") {
                    listing.vector.push(table.to_string());
                }
            }
        }
        listing.relational.sort();
        listing.vector.sort();
        Ok(listing)
    }

    /// Create a relational table in the active database.
    pub fn create_table(&mut self, name: &str, columns: Vec<String>) -> Result<()> {
        self.active_database_mut()?.create_table(name, columns)
    }

    /// Create a vector table in the active database.
    pub fn create_vector_table(&mut self, name: &str, dimension: usize) -> Result<()> {
        self.active_database_mut()?.create_vector_table(name, dimension)
    }

    /// Drop a table of the given kind from the active database.
    pub fn drop_table(&mut self, name: &str, kind: TableKind) -> Result<()> {
        self.active_database_mut()?.drop_table(name, kind)
    }

    /// Insert a row into a relational table in the active database.
    pub fn insert_row(&mut self, table: &str, row: RowInput) -> Result<()> {
        self.active_database_mut()?.insert_row(table, row)
    }

    /// Select rows from a relational table in the active database.
    pub fn select(
        &mut self,
        table: &str,
        predicate: Option<&RowPredicate>,
        columns: Option<&[String]>,
    ) -> Result<RowSet> {
        self.active_database_mut()?.select(table, predicate, columns)
    }

    /// Update rows in a relational table in the active database. Returns the
    /// number of rows touched.
    pub fn update(
        &mut self,
        table: &str,
        updates: &IndexMap<String, Value>,
        predicate: Option<&RowPredicate>,
    ) -> Result<usize> {
        self.active_database_mut()?.update(table, updates, predicate)
    }

    /// Delete rows from a relational table in the active database. Returns
    /// the number of rows removed.
    pub fn delete_rows(&mut self, table: &str, predicate: &RowPredicate) -> Result<usize> {
        self.active_database_mut()?.delete_rows(table, predicate)
    }

    /// Insert a vector into a vector table in the active database. Returns
    /// the new entry's index.
    pub fn insert_vector(
        &mut self,
        table: &str,
        vector: Vec<f64>,
        metadata: Option<Metadata>,
    ) -> Result<usize> {
        self.active_database_mut()?
            .insert_vector(table, vector, metadata)
    }

    /// Search a vector table in the active database.
    pub fn vector_search(
        &mut self,
        table: &str,
        query: &[f64],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        self.active_database_mut()?.search(table, query, top_k)
    }

    fn active_database_mut(&mut self) -> Result<&mut Database> {
        match self.current_db.as_deref() {
            Some(name) => self
                .databases
                .get_mut(name)
                .ok_or_else(|| Error::DatabaseNotFound(name.to_string())),
            None => Err(Error::NoDatabaseSelected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_database_activates_it() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();
        assert_eq!(catalog.current_database(), None);

        catalog.create_database("app").unwrap();
        assert_eq!(catalog.current_database(), Some("app"));

        // Table operations work without an explicit use_database.
        catalog.create_table("users", vec!["id".to_string()]).unwrap();
        catalog
            .insert_row("users", RowInput::Positional(vec![Value::Integer(1)]))
            .unwrap();
        assert_eq!(catalog.select("users", None, None).unwrap().rows.len(), 1);
    }

    #[test]
    fn test_create_database_duplicate() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();
        catalog.create_database("app").unwrap();

        let result = catalog.create_database("app");
        assert!(matches!(result, Err(Error::DatabaseAlreadyExists(_))));
    }

    #[test]
    fn test_use_database_miss_keeps_selection() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();
        catalog.create_database("app").unwrap();

        assert!(catalog.use_database("missing").is_none());
        assert_eq!(catalog.current_database(), Some("app"));

        let database = catalog.use_database("app").unwrap();
        assert_eq!(database.name(), "app");
    }

    #[test]
    fn test_no_database_selected() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();

        let result = catalog.create_table("users", vec!["id".to_string()]);
        assert!(matches!(result, Err(Error::NoDatabaseSelected)));
    }

    #[test]
    fn test_drop_database() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();
        catalog.create_database("app").unwrap();
        catalog.create_table("users", vec!["id".to_string()]).unwrap();

        catalog.drop_database("app").unwrap();
        assert_eq!(catalog.current_database(), None);
        assert!(!dir.path().join("app").exists());
        assert!(catalog.list_databases().is_empty());

        let result = catalog.drop_database("app");
        assert!(matches!(result, Err(Error::DatabaseNotFound(_))));
    }

    #[test]
    fn test_list_databases_sorted() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();
        catalog.create_database("zebra").unwrap();
        catalog.create_database("aardvark").unwrap();

        assert_eq!(catalog.list_databases(), vec!["aardvark", "zebra"]);
    }

    #[test]
    fn test_list_tables_from_disk() {
        let dir = tempdir().unwrap();
        let mut catalog = Catalog::open(dir.path()).unwrap();
        catalog.create_database("app").unwrap();
        catalog.create_table("users", vec!["id".to_string()]).unwrap();
        catalog.create_table("orders", vec!["id".to_string()]).unwrap();
        catalog.create_vector_table("users", 8).unwrap();

        let listing = catalog.list_tables(None).unwrap();
        assert_eq!(listing.relational, vec!["orders", "users"]);
        assert_eq!(listing.vector, vec!["users"]);

        // Explicit name and misses.
        assert_eq!(catalog.list_tables(Some("app")).unwrap(), listing);
        assert_eq!(
            catalog.list_tables(Some("missing")).unwrap(),
            TableListing::default()
        );
    }

    #[test]
    fn test_list_tables_with_nothing_selected() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::open(dir.path()).unwrap();
        assert_eq!(catalog.list_tables(None).unwrap(), TableListing::default());
    }

    #[test]
    fn test_reopen_discovers_databases() {
        let dir = tempdir().unwrap();
        {
            let mut catalog = Catalog::open(dir.path()).unwrap();
            catalog.create_database("app").unwrap();
            catalog
                .create_table("users", vec!["id".to_string()])
                .unwrap();
            catalog
                .insert_row("users", RowInput::Positional(vec![Value::Integer(5)]))
                .unwrap();
        }

        let mut catalog = Catalog::open(dir.path()).unwrap();
        assert_eq!(catalog.list_databases(), vec!["app"]);
        // Discovery registers the database but selects nothing.
        assert_eq!(catalog.current_database(), None);

        catalog.use_database("app").unwrap();
        let result = catalog.select("users", None, None).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(5)]]);
    }
}
