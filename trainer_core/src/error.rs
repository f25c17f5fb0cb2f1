//! Error types for the trainer_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for trainer_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying store failure (connection, syntax, constraint other than uniqueness)
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The store answered with a shape we did not expect (missing row, wrong column type)
    #[error("Unexpected store result: {0}")]
    UnexpectedResult(String),

    /// A relationship row referenced an entity that is not in the cache
    #[error("{kind} {id} is not present in the entity cache")]
    MissingEntity { kind: &'static str, id: i64 },

    /// Booking was attempted without a client-trainer connection
    #[error("Client {client_id} is not connected to trainer {trainer_id}")]
    MissingConnection { client_id: i64, trainer_id: i64 },

    /// Time index outside the 48 half-hour slots of a day
    #[error("Invalid timeslot: {0}")]
    InvalidTimeslot(String),

    /// Rating input outside 1..=5 or not a number
    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    /// A uniqueness rule of the store rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error came from a store uniqueness rule
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
