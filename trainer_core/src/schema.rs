//! Store schema and demo data.
//!
//! Uniqueness rules live here: one booking per timeslot and one rating per
//! connection. Connections and purchases carry no uniqueness rule, so a
//! direct service call can insert duplicates of either.

use crate::queries::quote;
use crate::store::{PersistentStore, SqliteStore};
use crate::types::{Day, SLOTS_PER_DAY};
use crate::Result;

pub const SCHEMA: &str = r#"
create table if not exists client (
    client_id   integer primary key,
    first_name  text not null,
    username    text not null unique
);

create table if not exists trainer (
    trainer_id        integer primary key,
    first_name        text not null,
    last_name         text not null,
    city              text not null,
    hourly_rate       real not null,
    years_experience  integer not null,
    picture_path      text
);

create table if not exists program (
    program_id  integer primary key,
    trainer_id  integer not null references trainer(trainer_id),
    title       text not null
);

create table if not exists exercise (
    exercise_id  integer primary key,
    program_id   integer not null references program(program_id) on delete cascade,
    title        text not null,
    num_reps     integer not null,
    num_sets     integer not null,
    rest_time    integer not null,
    rpe          integer not null,
    video_path   text
);

create table if not exists connect (
    connect_id  integer primary key,
    client_id   integer not null references client(client_id),
    trainer_id  integer not null references trainer(trainer_id)
);

create table if not exists timeslot (
    timeslot_id  integer primary key,
    trainer_id   integer not null references trainer(trainer_id),
    day_name     text not null,
    time_index   integer not null check (time_index >= 0 and time_index < 48),
    unique (trainer_id, day_name, time_index)
);

create table if not exists booking (
    booking_id   integer primary key,
    connect_id   integer not null references connect(connect_id) on delete cascade,
    timeslot_id  integer not null unique references timeslot(timeslot_id)
);

create table if not exists rating (
    rating_id     integer primary key,
    connect_id    integer not null unique references connect(connect_id) on delete cascade,
    rating_value  integer not null
);

create table if not exists program_purchase (
    purchase_id  integer primary key,
    program_id   integer not null references program(program_id),
    client_id    integer not null references client(client_id)
);
"#;

/// Create every table that does not exist yet
pub fn apply_schema(store: &SqliteStore) -> Result<()> {
    store.execute_batch(SCHEMA)?;
    tracing::info!("Schema applied");
    Ok(())
}

/// Give every trainer the full weekly grid of timeslots, skipping slots that exist
pub fn seed_timeslots(store: &dyn PersistentStore) -> Result<usize> {
    let days = Day::ALL
        .iter()
        .map(|day| format!("select {}", quote(day.as_str())))
        .collect::<Vec<_>>()
        .join(" union all ");

    let update = format!(
        "with recursive slot(i) as (select 0 union all select i + 1 from slot where i < {last}), \
         days(name) as ({days}) \
         insert into timeslot (trainer_id, day_name, time_index) \
         select trainer.trainer_id, days.name, slot.i from trainer, days, slot \
         where not exists (select 1 from timeslot t where t.trainer_id = trainer.trainer_id \
         and t.day_name = days.name and t.time_index = slot.i)",
        last = SLOTS_PER_DAY - 1,
        days = days,
    );

    let created = store.execute_update(&update)?;
    tracing::info!("Created {} timeslots", created);
    Ok(created)
}

const DEMO_DATA: &[&str] = &[
    "insert or ignore into client (client_id, first_name, username) values (1, 'Cara', 'cara')",
    "insert or ignore into client (client_id, first_name, username) values (3, 'Alice', 'alice')",
    "insert or ignore into client (client_id, first_name, username) values (5, 'Ben', 'ben')",
    "insert or ignore into trainer values (2, 'Priya', 'Shah', 'Melbourne', 85.0, 6, 'pictures/priya.png')",
    "insert or ignore into trainer values (7, 'Tom', 'Nguyen', 'Sydney', 70.0, 4, 'pictures/tom.png')",
    "insert or ignore into trainer values (9, 'Lena', 'Park', 'Brisbane', 95.5, 10, null)",
    "insert or ignore into program values (1, 7, 'Strength Foundations')",
    "insert or ignore into program values (2, 7, 'Hypertrophy Block')",
    "insert or ignore into program values (3, 2, 'Run Prep')",
    "insert or ignore into exercise values (1, 1, 'Back Squat', 5, 5, 180, 8, 'videos/squat.mp4')",
    "insert or ignore into exercise values (2, 1, 'Bench Press', 5, 5, 180, 8, 'videos/bench.mp4')",
    "insert or ignore into exercise values (3, 1, 'Deadlift', 3, 3, 240, 9, null)",
    "insert or ignore into exercise values (4, 2, 'Incline Dumbbell Press', 10, 4, 90, 7, null)",
    "insert or ignore into exercise values (5, 2, 'Cable Row', 12, 4, 60, 7, null)",
    "insert or ignore into exercise values (6, 3, 'Tempo Run', 1, 1, 0, 6, 'videos/tempo.mp4')",
    "insert or ignore into exercise values (7, 3, 'Hill Sprints', 8, 2, 120, 9, null)",
];

/// Seed demo clients, trainers, programs and the trainers' timeslot grids
pub fn seed_demo(store: &dyn PersistentStore) -> Result<()> {
    for update in DEMO_DATA {
        store.execute_update(update)?;
    }
    seed_timeslots(store)?;
    tracing::info!("Seeded demo data");
    Ok(())
}
