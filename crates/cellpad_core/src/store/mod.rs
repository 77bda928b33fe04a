//! Collection persistence contracts and file-backed implementation.
//!
//! # Responsibility
//! - Define the whole-collection read/write contract used by the HTTP layer.
//! - Keep file format and seeding details inside the store boundary.
//!
//! # Invariants
//! - A missing backing file is recovered locally by seeding; it is the only
//!   locally-recovered failure.
//! - Malformed persisted data is surfaced, never silently replaced.

use crate::model::collection::Collection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file_store;

/// Result type used by store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from collection persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying read or write failure (other than missing-on-read).
    Io(std::io::Error),
    /// Persisted bytes cannot be parsed into a valid collection.
    Malformed(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Malformed(message) => write!(f, "malformed notebook file: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Malformed(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Whole-collection persistence interface.
///
/// The gateway only ever sees full snapshots: fine-grained edits are applied
/// in memory through `Collection` operations between one fetch and the next
/// write-back.
pub trait CollectionStore {
    /// Loads the full collection from the backing storage.
    fn fetch_all(&self) -> StoreResult<Collection>;
    /// Overwrites the backing storage with the given collection.
    fn replace_all(&self, collection: &Collection) -> StoreResult<()>;
}
