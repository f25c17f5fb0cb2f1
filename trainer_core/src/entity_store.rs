//! Process-lifetime caches mirroring the client, trainer and program tables.
//!
//! Each cache fetches its whole table on first access, exactly once even
//! under concurrent callers, and never refreshes afterwards. Relationship
//! data (connections, bookings, ratings, purchases) is never cached.

use crate::queries;
use crate::store::{PersistentStore, Rows};
use crate::types::{Client, ClientId, Exercise, Program, Trainer, TrainerId};
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A record that can be mirrored into an [`EntityStore`]
pub trait Entity: Sized + Send + Sync {
    /// Human-readable kind used in logs and errors
    const KIND: &'static str;

    /// Query returning one row per record; column 1 must be the id
    const LOAD_QUERY: &'static str;

    fn id(&self) -> i64;

    /// Build a record from the row the cursor is on
    fn from_row(rows: &Rows) -> Result<Self>;

    /// Fetch child data owned by this record; runs once per newly loaded record
    fn hydrate(&mut self, _store: &dyn PersistentStore) -> Result<()> {
        Ok(())
    }
}

impl Entity for Client {
    const KIND: &'static str = "client";
    const LOAD_QUERY: &'static str = queries::ALL_CLIENTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(rows: &Rows) -> Result<Self> {
        Ok(Client {
            id: rows.get_int(1)?,
            first_name: rows.get_string(2)?,
        })
    }
}

impl Entity for Trainer {
    const KIND: &'static str = "trainer";
    const LOAD_QUERY: &'static str = queries::ALL_TRAINERS;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(rows: &Rows) -> Result<Self> {
        Ok(Trainer {
            id: rows.get_int(1)?,
            first_name: rows.get_string(2)?,
            last_name: rows.get_string(3)?,
            city: rows.get_string(4)?,
            hourly_rate: rows.get_float(5)?,
            years_experience: rows.get_int(6)?,
            picture_path: rows.get_opt_string(7)?,
        })
    }
}

impl Entity for Program {
    const KIND: &'static str = "program";
    const LOAD_QUERY: &'static str = queries::ALL_PROGRAMS;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(rows: &Rows) -> Result<Self> {
        Ok(Program {
            id: rows.get_int(1)?,
            trainer_id: rows.get_int(2)?,
            title: rows.get_string(3)?,
            exercises: Vec::new(),
        })
    }

    fn hydrate(&mut self, store: &dyn PersistentStore) -> Result<()> {
        let mut rows = store.execute_query(&queries::exercises_for_program(self.id))?;
        while rows.advance() {
            self.exercises.push(Exercise {
                title: rows.get_string(1)?,
                num_reps: rows.get_int(2)?,
                num_sets: rows.get_int(3)?,
                rest_time: rows.get_int(4)?,
                rpe: rows.get_int(5)?,
                video_path: rows.get_opt_string(6)?,
            });
        }
        Ok(())
    }
}

/// Lazily populated, append-once cache of one entity table
pub struct EntityStore<T: Entity> {
    store: Arc<dyn PersistentStore>,
    records: OnceCell<Vec<T>>,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            store,
            records: OnceCell::new(),
        }
    }

    /// Every cached record, loading the table on first call
    pub fn all(&self) -> &[T] {
        self.records.get_or_init(|| self.load())
    }

    /// Look up a record that must exist
    ///
    /// A miss means a relationship row points at an id the cache never saw,
    /// which callers treat as fatal.
    pub fn get(&self, id: i64) -> Result<&T> {
        self.find(id).ok_or(Error::MissingEntity { kind: T::KIND, id })
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.all().iter().find(|record| record.id() == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.records.get().is_some()
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    /// Resolve column 1 of every row to a cached record
    pub(crate) fn resolve_ids(&self, mut rows: Rows) -> Result<Vec<&T>> {
        let mut records = Vec::with_capacity(rows.len());
        while rows.advance() {
            records.push(self.get(rows.get_int(1)?)?);
        }
        Ok(records)
    }

    fn load(&self) -> Vec<T> {
        let mut records = Vec::new();
        match self.fill(&mut records) {
            Ok(()) => tracing::info!("Loaded {} {} records", records.len(), T::KIND),
            Err(e) => tracing::warn!(
                "Failed to load {} records: {}. Continuing with {} cached.",
                T::KIND,
                e,
                records.len()
            ),
        }
        records
    }

    fn fill(&self, records: &mut Vec<T>) -> Result<()> {
        let mut rows = self.store.execute_query(T::LOAD_QUERY)?;
        while rows.advance() {
            let id = rows.get_int(1)?;
            if records.iter().any(|record| record.id() == id) {
                tracing::debug!("Skipping duplicate {} {}", T::KIND, id);
                continue;
            }
            let mut record = T::from_row(&rows)?;
            record.hydrate(self.store.as_ref())?;
            records.push(record);
        }
        Ok(())
    }
}

impl EntityStore<Client> {
    /// Trivial login: resolve a username to its cached client
    pub fn by_username(&self, username: &str) -> Result<Option<&Client>> {
        let mut rows = self
            .store
            .execute_query(&queries::client_id_for_username(username))?;
        if !rows.advance() {
            return Ok(None);
        }
        let id: ClientId = rows.get_int(1)?;
        self.get(id).map(Some)
    }
}

impl EntityStore<Program> {
    /// Programs sold by a trainer, in load order
    pub fn for_trainer(&self, trainer_id: TrainerId) -> Vec<&Program> {
        self.all()
            .iter()
            .filter(|program| program.trainer_id == trainer_id)
            .collect()
    }
}
