//! Application context.
//!
//! One context is built at startup and handed by reference to everything
//! that needs the caches or the services, so there is exactly one cache per
//! entity kind for the life of the process.

use crate::booking::BookingResolver;
use crate::connection::ConnectionService;
use crate::entity_store::EntityStore;
use crate::purchase::PurchaseService;
use crate::rating::RatingService;
use crate::store::PersistentStore;
use crate::types::{Client, Program, Trainer};
use std::sync::Arc;

pub struct AppContext {
    store: Arc<dyn PersistentStore>,
    pub clients: EntityStore<Client>,
    pub trainers: EntityStore<Trainer>,
    pub programs: EntityStore<Program>,
}

impl AppContext {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            clients: EntityStore::new(store.clone()),
            trainers: EntityStore::new(store.clone()),
            programs: EntityStore::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &dyn PersistentStore {
        self.store.as_ref()
    }

    /// Populate every cache now instead of on first use
    pub fn warm(&self) {
        let clients = self.clients.len();
        let trainers = self.trainers.len();
        let programs = self.programs.len();
        tracing::debug!(
            "Caches warm: {} clients, {} trainers, {} programs",
            clients,
            trainers,
            programs
        );
    }

    pub fn bookings(&self) -> BookingResolver<'_> {
        BookingResolver::new(self.store())
    }

    pub fn connections(&self) -> ConnectionService<'_> {
        ConnectionService::new(self.store(), &self.trainers)
    }

    pub fn ratings(&self) -> RatingService<'_> {
        RatingService::new(self.store())
    }

    pub fn purchases(&self) -> PurchaseService<'_> {
        PurchaseService::new(self.store())
    }
}
