//! Timeslot status resolution and booking creation.
//!
//! Status is always read fresh from the store. Nothing here is transactional:
//! two clients resolving the same free slot can both attempt the insert, and
//! the store's one-booking-per-timeslot rule rejects the second with
//! [`Error::Conflict`].

use crate::queries;
use crate::store::{single_int, PersistentStore};
use crate::types::{check_time_index, ClientId, Day, SlotStatus, TrainerId, SLOTS_PER_DAY};
use crate::{Error, Result};

/// Resolves a trainer's weekly grid into per-client booking state
pub struct BookingResolver<'a> {
    store: &'a dyn PersistentStore,
}

impl<'a> BookingResolver<'a> {
    pub fn new(store: &'a dyn PersistentStore) -> Self {
        Self { store }
    }

    /// Status of one slot as seen by `client_id`
    ///
    /// One round-trip when the slot is free, two when it is booked.
    pub fn status(
        &self,
        trainer_id: TrainerId,
        day: Day,
        time_index: u32,
        client_id: ClientId,
    ) -> Result<SlotStatus> {
        if self.is_available(trainer_id, day, time_index)? {
            return Ok(SlotStatus::Available);
        }

        let mut rows = self
            .store
            .execute_query(&queries::booking_client(trainer_id, day, time_index))?;
        if !rows.advance() {
            return Err(Error::UnexpectedResult(format!(
                "booking for trainer {} {} slot {} has no client",
                trainer_id, day, time_index
            )));
        }

        if rows.get_int(1)? == client_id {
            Ok(SlotStatus::BookedBySelf)
        } else {
            Ok(SlotStatus::BookedByOther)
        }
    }

    pub fn is_available(&self, trainer_id: TrainerId, day: Day, time_index: u32) -> Result<bool> {
        check_time_index(time_index)?;
        let rows = self
            .store
            .execute_query(&queries::count_bookings(trainer_id, day, time_index))?;
        Ok(single_int(rows, "booking count")? == 0)
    }

    /// Book a slot under the client's existing connection to the trainer
    ///
    /// Availability is not re-checked; the caller decides when to book.
    pub fn create_booking(
        &self,
        client_id: ClientId,
        trainer_id: TrainerId,
        day: Day,
        time_index: u32,
    ) -> Result<()> {
        check_time_index(time_index)?;

        let mut rows = self
            .store
            .execute_query(&queries::find_connection(client_id, trainer_id))?;
        if !rows.advance() {
            return Err(Error::MissingConnection {
                client_id,
                trainer_id,
            });
        }
        let connect_id = rows.get_int(1)?;

        let mut rows = self
            .store
            .execute_query(&queries::find_timeslot(trainer_id, day, time_index))?;
        if !rows.advance() {
            return Err(Error::UnexpectedResult(format!(
                "trainer {} has no timeslot {} {}",
                trainer_id, day, time_index
            )));
        }
        let timeslot_id = rows.get_int(1)?;

        self.store
            .execute_update(&queries::insert_booking(connect_id, timeslot_id))?;
        tracing::info!(
            "Client {} booked trainer {} on {} slot {}",
            client_id,
            trainer_id,
            day,
            time_index
        );
        Ok(())
    }

    /// The full week for one trainer, one status per half-hour slot
    pub fn weekly_schedule(
        &self,
        trainer_id: TrainerId,
        client_id: ClientId,
    ) -> Result<Vec<(Day, Vec<SlotStatus>)>> {
        Day::ALL
            .into_iter()
            .map(|day| {
                let slots = (0..SLOTS_PER_DAY)
                    .map(|index| self.status(trainer_id, day, index, client_id))
                    .collect::<Result<Vec<_>>>()?;
                Ok((day, slots))
            })
            .collect()
    }
}
