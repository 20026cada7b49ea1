//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Record models for users and tasks

mod database;
mod models;

pub use database::{ConnectOptions, Database};
pub use models::*;
