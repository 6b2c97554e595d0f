//! SQLite backend for the Stemma genealogy store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Foreign-key actions (CASCADE /
//! SET NULL / RESTRICT) declared in the schema carry the deletion policies
//! the application relies on; `PRAGMA foreign_keys` is switched on at
//! startup.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
