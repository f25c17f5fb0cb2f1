//! Client-trainer connections.
//!
//! A connection is what lets a client book, rate and buy from a trainer.
//! `create` inserts without looking for an existing row, so calling it twice
//! for the same pair leaves two rows; the CLI only offers it for unconnected
//! trainers.

use crate::entity_store::EntityStore;
use crate::queries;
use crate::store::PersistentStore;
use crate::types::{ClientId, Trainer, TrainerId};
use crate::Result;

pub struct ConnectionService<'a> {
    store: &'a dyn PersistentStore,
    trainers: &'a EntityStore<Trainer>,
}

impl<'a> ConnectionService<'a> {
    pub fn new(store: &'a dyn PersistentStore, trainers: &'a EntityStore<Trainer>) -> Self {
        Self { store, trainers }
    }

    pub fn create(&self, client_id: ClientId, trainer_id: TrainerId) -> Result<()> {
        self.store
            .execute_update(&queries::insert_connection(client_id, trainer_id))?;
        tracing::info!("Connected client {} with trainer {}", client_id, trainer_id);
        Ok(())
    }

    /// Remove the pair's connection; a pair that was never connected is a no-op
    pub fn remove(&self, client_id: ClientId, trainer_id: TrainerId) -> Result<()> {
        let removed = self
            .store
            .execute_update(&queries::delete_connection(client_id, trainer_id))?;
        tracing::info!(
            "Removed {} connection(s) between client {} and trainer {}",
            removed,
            client_id,
            trainer_id
        );
        Ok(())
    }

    pub fn is_connected(&self, client_id: ClientId, trainer_id: TrainerId) -> Result<bool> {
        let mut rows = self
            .store
            .execute_query(&queries::find_connection(client_id, trainer_id))?;
        Ok(rows.advance())
    }

    /// Trainers the client is connected with
    pub fn connections(&self, client_id: ClientId) -> Result<Vec<&'a Trainer>> {
        let rows = self
            .store
            .execute_query(&queries::connected_trainers(client_id))?;
        self.trainers.resolve_ids(rows)
    }

    /// Trainers the client is not yet connected with, computed by the store
    pub fn unconnected_trainers(&self, client_id: ClientId) -> Result<Vec<&'a Trainer>> {
        let rows = self
            .store
            .execute_query(&queries::unconnected_trainers(client_id))?;
        self.trainers.resolve_ids(rows)
    }
}
