//! Query and update text for every store round-trip the core makes.
//!
//! Identifiers are integers and days come from [`Day`], so the only free-form
//! literal is the login username, which is quoted.

use crate::types::{ClientId, Day, ProgramId, TrainerId};

/// Quote a string literal, doubling embedded single quotes
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ============================================================================
// Entity tables
// ============================================================================

pub const ALL_CLIENTS: &str = "select client_id, first_name from client order by client_id";

pub const ALL_TRAINERS: &str = "select trainer_id, first_name, last_name, city, hourly_rate, \
     years_experience, picture_path from trainer order by trainer_id";

pub const ALL_PROGRAMS: &str =
    "select program_id, trainer_id, title from program order by program_id";

pub fn exercises_for_program(program_id: ProgramId) -> String {
    format!(
        "select title, num_reps, num_sets, rest_time, rpe, video_path from exercise \
         where program_id = {} order by exercise_id",
        program_id
    )
}

pub fn client_id_for_username(username: &str) -> String {
    format!(
        "select client_id from client where username = {}",
        quote(username)
    )
}

// ============================================================================
// Connections
// ============================================================================

fn connect_id(client_id: ClientId, trainer_id: TrainerId) -> String {
    format!(
        "(select connect_id from connect where client_id = {} and trainer_id = {} \
         order by connect_id limit 1)",
        client_id, trainer_id
    )
}

pub fn find_connection(client_id: ClientId, trainer_id: TrainerId) -> String {
    format!(
        "select connect_id from connect where client_id = {} and trainer_id = {} \
         order by connect_id limit 1",
        client_id, trainer_id
    )
}

pub fn connected_trainers(client_id: ClientId) -> String {
    format!(
        "select distinct trainer_id from connect where client_id = {} order by trainer_id",
        client_id
    )
}

pub fn unconnected_trainers(client_id: ClientId) -> String {
    format!(
        "select trainer_id from trainer where trainer_id not in \
         (select trainer_id from connect where client_id = {}) order by trainer_id",
        client_id
    )
}

pub fn insert_connection(client_id: ClientId, trainer_id: TrainerId) -> String {
    format!(
        "insert into connect (client_id, trainer_id) values ({}, {})",
        client_id, trainer_id
    )
}

pub fn delete_connection(client_id: ClientId, trainer_id: TrainerId) -> String {
    format!(
        "delete from connect where client_id = {} and trainer_id = {}",
        client_id, trainer_id
    )
}

// ============================================================================
// Timeslots and bookings
// ============================================================================

fn timeslot_id(trainer_id: TrainerId, day: Day, time_index: u32) -> String {
    format!(
        "(select timeslot_id from timeslot where trainer_id = {} and day_name = {} \
         and time_index = {})",
        trainer_id,
        quote(day.as_str()),
        time_index
    )
}

pub fn find_timeslot(trainer_id: TrainerId, day: Day, time_index: u32) -> String {
    format!(
        "select timeslot_id from timeslot where trainer_id = {} and day_name = {} \
         and time_index = {}",
        trainer_id,
        quote(day.as_str()),
        time_index
    )
}

pub fn count_bookings(trainer_id: TrainerId, day: Day, time_index: u32) -> String {
    format!(
        "select count(*) from booking where timeslot_id = {}",
        timeslot_id(trainer_id, day, time_index)
    )
}

pub fn booking_client(trainer_id: TrainerId, day: Day, time_index: u32) -> String {
    format!(
        "select connect.client_id from booking join connect \
         on booking.connect_id = connect.connect_id where booking.timeslot_id = {}",
        timeslot_id(trainer_id, day, time_index)
    )
}

pub fn insert_booking(connect_id: i64, timeslot_id: i64) -> String {
    format!(
        "insert into booking (connect_id, timeslot_id) values ({}, {})",
        connect_id, timeslot_id
    )
}

// ============================================================================
// Ratings
// ============================================================================

pub fn count_ratings(trainer_id: TrainerId, client_id: ClientId) -> String {
    format!(
        "select count(*) from rating where connect_id = {}",
        connect_id(client_id, trainer_id)
    )
}

pub fn insert_rating(trainer_id: TrainerId, client_id: ClientId, value: i64) -> String {
    format!(
        "insert into rating (connect_id, rating_value) values ({}, {})",
        connect_id(client_id, trainer_id),
        value
    )
}

pub fn average_rating(trainer_id: TrainerId) -> String {
    format!(
        "select avg(rating.rating_value) from rating join connect \
         on rating.connect_id = connect.connect_id where connect.trainer_id = {}",
        trainer_id
    )
}

// ============================================================================
// Programs and purchases
// ============================================================================

pub fn count_programs(trainer_id: TrainerId) -> String {
    format!(
        "select count(*) from program where trainer_id = {}",
        trainer_id
    )
}

pub fn count_purchases(program_id: ProgramId, client_id: ClientId) -> String {
    format!(
        "select count(*) from program_purchase where program_id = {} and client_id = {}",
        program_id, client_id
    )
}

pub fn insert_purchase(program_id: ProgramId, client_id: ClientId) -> String {
    format!(
        "insert into program_purchase (program_id, client_id) values ({}, {})",
        program_id, client_id
    )
}
