//! Persistent store boundary.
//!
//! Services speak to the store through [`PersistentStore`]: query text in,
//! a forward-only [`Rows`] cursor out. [`SqliteStore`] is the relational
//! backend; its connection is opened on first use and kept for the life of
//! the process.

use crate::{Error, Result};
use once_cell::sync::OnceCell;
use rusqlite::types::ValueRef;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a write waits on another process holding the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Query/update surface consumed by the caches and services
pub trait PersistentStore: Send + Sync {
    /// Run a query and materialize its rows
    fn execute_query(&self, query: &str) -> Result<Rows>;

    /// Run an insert/update/delete, returning the number of rows affected
    fn execute_update(&self, update: &str) -> Result<usize>;
}

/// A single column value as returned by the store
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Forward-only cursor over a query result with 1-based column access
///
/// The cursor starts before the first row; call [`Rows::advance`] to move
/// onto it.
#[derive(Clone, Debug, Default)]
pub struct Rows {
    rows: Vec<Vec<Column>>,
    position: Option<usize>,
}

impl Rows {
    pub fn new(rows: Vec<Vec<Column>>) -> Self {
        Self {
            rows,
            position: None,
        }
    }

    /// Move to the next row, returning false once the rows are exhausted
    pub fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    pub fn has_next(&self) -> bool {
        self.position.map_or(0, |p| p + 1) < self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, index: usize) -> Result<&Column> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| Error::UnexpectedResult("cursor is not on a row".into()))?;
        index
            .checked_sub(1)
            .and_then(|i| row.get(i))
            .ok_or_else(|| {
                Error::UnexpectedResult(format!(
                    "column {} out of range (row has {})",
                    index,
                    row.len()
                ))
            })
    }

    pub fn get_int(&self, index: usize) -> Result<i64> {
        match self.column(index)? {
            Column::Integer(v) => Ok(*v),
            other => Err(mismatch(index, "integer", other)),
        }
    }

    pub fn get_float(&self, index: usize) -> Result<f64> {
        self.get_opt_float(index)?
            .ok_or_else(|| mismatch(index, "number", &Column::Null))
    }

    /// Numeric column that may be NULL, e.g. an aggregate over no rows
    pub fn get_opt_float(&self, index: usize) -> Result<Option<f64>> {
        match self.column(index)? {
            Column::Null => Ok(None),
            Column::Integer(v) => Ok(Some(*v as f64)),
            Column::Real(v) => Ok(Some(*v)),
            other => Err(mismatch(index, "number", other)),
        }
    }

    pub fn get_string(&self, index: usize) -> Result<String> {
        self.get_opt_string(index)?
            .ok_or_else(|| mismatch(index, "text", &Column::Null))
    }

    pub fn get_opt_string(&self, index: usize) -> Result<Option<String>> {
        match self.column(index)? {
            Column::Null => Ok(None),
            Column::Text(v) => Ok(Some(v.clone())),
            other => Err(mismatch(index, "text", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, found: &Column) -> Error {
    Error::UnexpectedResult(format!(
        "column {}: expected {}, found {:?}",
        index, expected, found
    ))
}

/// Advance onto the single row of an aggregate query and read its first column
pub fn single_int(mut rows: Rows, what: &str) -> Result<i64> {
    if !rows.advance() {
        return Err(Error::UnexpectedResult(format!("{} returned no rows", what)));
    }
    rows.get_int(1)
}

/// Where the SQLite database lives
#[derive(Clone, Debug, PartialEq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// SQLite-backed store with a lazily opened, process-lifetime connection
pub struct SqliteStore {
    location: StoreLocation,
    connection: OnceCell<Mutex<rusqlite::Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            connection: OnceCell::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            connection: OnceCell::new(),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Whether the connection has been established yet
    pub fn is_connected(&self) -> bool {
        self.connection.get().is_some()
    }

    fn connect(&self) -> Result<Mutex<rusqlite::Connection>> {
        let connection = match &self.location {
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                tracing::info!("Opening store at {:?}", path);
                rusqlite::Connection::open(path)?
            }
            StoreLocation::Memory => {
                tracing::info!("Opening in-memory store");
                rusqlite::Connection::open_in_memory()?
            }
        };
        connection.busy_timeout(BUSY_TIMEOUT)?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Mutex::new(connection))
    }

    pub(crate) fn connection(&self) -> Result<MutexGuard<'_, rusqlite::Connection>> {
        self.connection
            .get_or_try_init(|| self.connect())?
            .lock()
            .map_err(|_| Error::Other("store connection lock poisoned".into()))
    }

    /// Run several statements at once (schema setup)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection()?.execute_batch(sql).map_err(classify)
    }
}

impl PersistentStore for SqliteStore {
    fn execute_query(&self, query: &str) -> Result<Rows> {
        tracing::debug!("query: {}", query);
        let connection = self.connection()?;
        let mut statement = connection.prepare(query).map_err(classify)?;
        let width = statement.column_count();
        let mut cursor = statement.query([]).map_err(classify)?;

        let mut rows = Vec::new();
        while let Some(row) = cursor.next().map_err(classify)? {
            let mut columns = Vec::with_capacity(width);
            for i in 0..width {
                columns.push(match row.get_ref(i)? {
                    ValueRef::Null => Column::Null,
                    ValueRef::Integer(v) => Column::Integer(v),
                    ValueRef::Real(v) => Column::Real(v),
                    ValueRef::Text(v) | ValueRef::Blob(v) => {
                        Column::Text(String::from_utf8_lossy(v).into_owned())
                    }
                });
            }
            rows.push(columns);
        }
        Ok(Rows::new(rows))
    }

    fn execute_update(&self, update: &str) -> Result<usize> {
        tracing::debug!("update: {}", update);
        let affected = self.connection()?.execute(update, []).map_err(classify)?;
        Ok(affected)
    }
}

/// Uniqueness violations become [`Error::Conflict`]; everything else stays a store error
fn classify(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::Conflict(message.clone().unwrap_or_else(|| failure.to_string()))
        }
        _ => Error::Store(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_opened_lazily() {
        let store = SqliteStore::in_memory();
        assert!(!store.is_connected());

        let rows = store.execute_query("select 1").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.is_connected());
    }

    #[test]
    fn test_cursor_walks_rows_with_one_based_columns() {
        let store = SqliteStore::in_memory();
        store
            .execute_batch(
                "create table t (a integer, b text, c real);
                 insert into t values (1, 'one', 1.5);
                 insert into t values (2, null, null);",
            )
            .unwrap();

        let mut rows = store.execute_query("select a, b, c from t order by a").unwrap();
        assert!(rows.has_next());
        assert!(rows.advance());
        assert_eq!(rows.get_int(1).unwrap(), 1);
        assert_eq!(rows.get_string(2).unwrap(), "one");
        assert_eq!(rows.get_float(3).unwrap(), 1.5);

        assert!(rows.advance());
        assert_eq!(rows.get_opt_string(2).unwrap(), None);
        assert_eq!(rows.get_opt_float(3).unwrap(), None);
        assert!(!rows.has_next());
        assert!(!rows.advance());
        assert!(!rows.advance());
    }

    #[test]
    fn test_accessor_errors_are_unexpected_results() {
        let mut rows = Rows::new(vec![vec![Column::Text("x".into())]]);
        assert!(matches!(rows.get_int(1), Err(Error::UnexpectedResult(_))));

        rows.advance();
        assert!(matches!(rows.get_int(1), Err(Error::UnexpectedResult(_))));
        assert!(matches!(rows.get_string(0), Err(Error::UnexpectedResult(_))));
        assert!(matches!(rows.get_string(2), Err(Error::UnexpectedResult(_))));
        assert_eq!(rows.get_string(1).unwrap(), "x");
    }

    #[test]
    fn test_single_int_requires_a_row() {
        let err = single_int(Rows::default(), "count").unwrap_err();
        assert!(matches!(err, Error::UnexpectedResult(_)));
        let count = single_int(Rows::new(vec![vec![Column::Integer(4)]]), "count").unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let store = SqliteStore::in_memory();
        store
            .execute_batch("create table u (k integer unique)")
            .unwrap();
        assert_eq!(store.execute_update("insert into u values (1)").unwrap(), 1);

        let err = store.execute_update("insert into u values (1)").unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_file_store_creates_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data").join("trainer.db");
        let store = SqliteStore::open(&path);

        store.execute_batch("create table t (a integer)").unwrap();
        assert!(path.exists());
    }
}
