//! Core domain types for the personal trainer system.
//!
//! This module defines the records mirrored from the store:
//! - Clients and trainers
//! - Programs and their exercises
//! - Weekly timeslot coordinates and booking status
//! - Rating values accepted at the input boundary

use crate::{Error, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ClientId = i64;
pub type TrainerId = i64;
pub type ProgramId = i64;

/// Number of half-hour slots in a day
pub const SLOTS_PER_DAY: u32 = 48;

// ============================================================================
// Users
// ============================================================================

/// A client of the platform
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
}

/// A trainer offering sessions and programs
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Trainer {
    pub id: TrainerId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub hourly_rate: f64,
    pub years_experience: i64,
    pub picture_path: Option<String>,
}

impl Trainer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// Programs
// ============================================================================

/// One exercise inside a trainer's program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub title: String,
    pub num_reps: i64,
    pub num_sets: i64,
    /// Rest between sets, in seconds
    pub rest_time: i64,
    /// Rating of perceived exertion
    pub rpe: i64,
    pub video_path: Option<String>,
}

/// A purchasable program; exercises keep the order they were loaded in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: ProgramId,
    pub title: String,
    pub trainer_id: TrainerId,
    pub exercises: Vec<Exercise>,
}

// ============================================================================
// Schedule
// ============================================================================

/// Day of the week, stored by its full English name
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = Error;

    /// Accepts full names and three-letter abbreviations, any case
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| {
                let name = day.as_str().to_lowercase();
                name == lower || name[..3] == lower
            })
            .ok_or_else(|| Error::InvalidTimeslot(format!("Unknown day '{}'", s)))
    }
}

/// Reject indices outside the 48 half-hour slots of a day
pub fn check_time_index(time_index: u32) -> Result<()> {
    if time_index < SLOTS_PER_DAY {
        Ok(())
    } else {
        Err(Error::InvalidTimeslot(format!(
            "time index {} outside 0..{}",
            time_index, SLOTS_PER_DAY
        )))
    }
}

/// Wall-clock start of a slot: index 0 is 00:00, index 1 is 00:30, ...
pub fn slot_label(time_index: u32) -> Result<String> {
    check_time_index(time_index)?;
    let time = NaiveTime::from_hms_opt(time_index / 2, (time_index % 2) * 30, 0)
        .ok_or_else(|| Error::InvalidTimeslot(format!("time index {}", time_index)))?;
    Ok(time.format("%H:%M").to_string())
}

/// Status of one timeslot as seen by a specific client
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    BookedByOther,
    BookedBySelf,
}

// ============================================================================
// Ratings
// ============================================================================

/// A rating accepted from user input, always within 1..=5
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidRating(format!(
                "{} is not between {} and {}",
                value,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(&self) -> i64 {
        i64::from(self.0)
    }
}

impl FromStr for RatingValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidRating(format!("'{}' is not a whole number", s.trim())))?;
        Self::new(value)
    }
}
