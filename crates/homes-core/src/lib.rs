//! Homes Core Library
//!
//! This crate provides the record access layer for Homes, a small
//! real-estate listing tracker backed by SQLite.
//!
//! # Architecture
//!
//! - **Keys**: `listings` and `listings/<id>`, resolved once into a
//!   [`ResourceKey`]
//! - **Validation**: field rules checked before any write
//! - **Storage**: a single SQLite table, bootstrapped on first open
//! - **Notifications**: observers subscribe to a [`Scope`] and re-query
//!   when told their data changed
//!
//! # Quick Start
//!
//! ```text
//! let mut store = ListingStore::open()?;
//!
//! let id = store.insert(
//!     &ResourceKey::Collection,
//!     &ListingValues::new().address("1 Main St").home_type(HomeType::Single),
//! )?;
//!
//! let listings = store.query(&ResourceKey::Collection, None, None)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Validated, change-notifying store (main entry point)
//! - `models`: Listing, home type and write payload
//! - `contract`: Resource keys, key resolution and media types
//! - `validation`: Field rules
//! - `query`: Typed filters and sort orders
//! - `notify`: Change notification hub and subscriptions
//! - `storage`: SQLite schema and row access
//! - `config`: Application configuration

pub mod config;
pub mod contract;
pub mod error;
pub mod models;
pub mod notify;
pub mod query;
pub mod storage;
pub mod store;
pub mod validation;

pub use config::Config;
pub use contract::{KeyResolver, MediaType, ResourceKey};
pub use error::{Operation, StoreError, StoreResult, ValidationError};
pub use models::{HomeType, Listing, ListingId, ListingValues};
pub use notify::{Change, ChangeKind, NotificationHub, Scope, Subscription};
pub use query::{Column, Comparison, Condition, Direction, Filter, SortOrder};
pub use storage::{Database, StorageError};
pub use store::{ListingStore, Snapshot};
