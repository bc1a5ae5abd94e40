//! Storage layer
//!
//! Owns the SQLite file: schema bootstrap, row-level SQL and the typed
//! storage errors those produce.

pub mod database;
pub mod error;
pub mod schema;

pub use database::Database;
pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
