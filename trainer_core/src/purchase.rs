//! Program purchases.
//!
//! Purchases have no uniqueness rule in the store; `purchase` inserts
//! unconditionally and `has_purchased` stays true however many rows exist.

use crate::queries;
use crate::store::{single_int, PersistentStore};
use crate::types::{ClientId, ProgramId, TrainerId};
use crate::Result;

pub struct PurchaseService<'a> {
    store: &'a dyn PersistentStore,
}

impl<'a> PurchaseService<'a> {
    pub fn new(store: &'a dyn PersistentStore) -> Self {
        Self { store }
    }

    pub fn has_purchased(&self, program_id: ProgramId, client_id: ClientId) -> Result<bool> {
        let rows = self
            .store
            .execute_query(&queries::count_purchases(program_id, client_id))?;
        Ok(single_int(rows, "purchase count")? > 0)
    }

    pub fn purchase(&self, program_id: ProgramId, client_id: ClientId) -> Result<()> {
        self.store
            .execute_update(&queries::insert_purchase(program_id, client_id))?;
        tracing::info!("Client {} purchased program {}", client_id, program_id);
        Ok(())
    }

    /// Number of programs the trainer sells, counted by the store
    pub fn program_count(&self, trainer_id: TrainerId) -> Result<i64> {
        let rows = self
            .store
            .execute_query(&queries::count_programs(trainer_id))?;
        single_int(rows, "program count")
    }
}
