//! Trainer ratings.
//!
//! A rating hangs off the client's connection to the trainer. The 1..=5
//! range is enforced where the value is typed in (see
//! [`RatingValue`](crate::RatingValue)); this service stores whatever integer
//! it is given.

use crate::queries;
use crate::store::{single_int, PersistentStore};
use crate::types::{ClientId, TrainerId};
use crate::Result;

pub struct RatingService<'a> {
    store: &'a dyn PersistentStore,
}

impl<'a> RatingService<'a> {
    pub fn new(store: &'a dyn PersistentStore) -> Self {
        Self { store }
    }

    pub fn has_rated(&self, trainer_id: TrainerId, client_id: ClientId) -> Result<bool> {
        let rows = self
            .store
            .execute_query(&queries::count_ratings(trainer_id, client_id))?;
        Ok(single_int(rows, "rating count")? > 0)
    }

    /// Insert a rating without checking for an earlier one
    ///
    /// The store allows one rating per connection, so a repeat surfaces as
    /// [`Error::Conflict`](crate::Error::Conflict).
    pub fn rate(&self, trainer_id: TrainerId, client_id: ClientId, value: i64) -> Result<()> {
        self.store
            .execute_update(&queries::insert_rating(trainer_id, client_id, value))?;
        tracing::info!(
            "Client {} rated trainer {} with {}",
            client_id,
            trainer_id,
            value
        );
        Ok(())
    }

    /// Mean rating across all of the trainer's connections, `None` if unrated
    pub fn average_rating(&self, trainer_id: TrainerId) -> Result<Option<f64>> {
        let mut rows = self
            .store
            .execute_query(&queries::average_rating(trainer_id))?;
        if !rows.advance() {
            return Ok(None);
        }
        rows.get_opt_float(1)
    }
}
