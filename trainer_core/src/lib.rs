#![forbid(unsafe_code)]

//! Core domain model and consistency logic for the personal trainer system.
//!
//! This crate provides:
//! - Domain types (clients, trainers, programs, timeslots)
//! - The persistent store boundary and its SQLite backend
//! - Process-lifetime entity caches
//! - Booking resolution and connection, rating and purchase services

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod queries;
pub mod schema;
pub mod entity_store;
pub mod context;
pub mod booking;
pub mod connection;
pub mod rating;
pub mod purchase;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{PersistentStore, Rows, SqliteStore};
pub use entity_store::{Entity, EntityStore};
pub use context::AppContext;
pub use booking::BookingResolver;
pub use connection::ConnectionService;
pub use rating::RatingService;
pub use purchase::PurchaseService;
