//! Error taxonomy for the listing store
//!
//! Three kinds of failure are kept apart so callers can react to each:
//! bad caller data ([`ValidationError`]), persistence faults
//! ([`StorageError`]), and keys or key/operation pairs the store does not
//! serve ([`StoreError::UnsupportedOperation`]). A missing record is not an
//! error; operations report a zero count instead.

use std::fmt;

use thiserror::Error;

pub use crate::storage::error::StorageError;

/// A caller-supplied field failed its rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("address required")]
    AddressRequired,

    #[error("invalid type: missing")]
    MissingType,

    #[error("invalid type: {0} (expected 0, 1 or 2)")]
    InvalidType(i64),

    #[error("invalid income: {0} (must be zero or more)")]
    InvalidIncome(i64),
}

/// The store operation a request was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Resolve,
    Query,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Resolve => "resolve",
            Operation::Query => "query",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`ListingStore`](crate::ListingStore) operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Unsupported operation: cannot {operation} '{key}'")]
    UnsupportedOperation { operation: Operation, key: String },
}

impl StoreError {
    pub fn unsupported(operation: Operation, key: impl Into<String>) -> Self {
        StoreError::UnsupportedOperation {
            operation,
            key: key.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, StoreError::UnsupportedOperation { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        StoreError::Storage(StorageError::Database(error))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
