//! Store doubles shared by the unit tests.

use crate::schema::{apply_schema, seed_demo};
use crate::store::{Column, PersistentStore, Rows, SqliteStore};
use crate::{AppContext, Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory SQLite store with the demo data loaded
pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::in_memory();
    apply_schema(&store).expect("schema");
    seed_demo(&store).expect("demo data");
    store
}

pub fn seeded_context() -> AppContext {
    AppContext::new(Arc::new(seeded_store()))
}

/// Counts every round-trip before delegating
pub struct CountingStore<S> {
    inner: S,
    queries: AtomicUsize,
    updates: AtomicUsize,
}

impl<S: PersistentStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl<S: PersistentStore> PersistentStore for CountingStore<S> {
    fn execute_query(&self, query: &str) -> Result<Rows> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.execute_query(query)
    }

    fn execute_update(&self, update: &str) -> Result<usize> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.execute_update(update)
    }
}

/// Answers known queries with canned rows; anything else fails
#[derive(Default)]
pub struct ScriptedStore {
    answers: HashMap<String, Vec<Vec<Column>>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that is unreachable for every call
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, rows: Vec<Vec<Column>>) -> Self {
        self.answers.insert(query.to_string(), rows);
        self
    }
}

impl PersistentStore for ScriptedStore {
    fn execute_query(&self, query: &str) -> Result<Rows> {
        self.answers
            .get(query)
            .map(|rows| Rows::new(rows.clone()))
            .ok_or_else(|| Error::Other(format!("store unreachable for '{}'", query)))
    }

    fn execute_update(&self, update: &str) -> Result<usize> {
        Err(Error::Other(format!("store unreachable for '{}'", update)))
    }
}
