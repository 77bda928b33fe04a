//! Notebook use-case service.
//!
//! # Responsibility
//! - Provide the stable fetch/replace entry points transport layers call.
//! - Delegate persistence to store implementations.
//!
//! # Invariants
//! - Service APIs never bypass store seeding/validation contracts.
//! - Service layer remains storage-agnostic.

use crate::model::collection::Collection;
use crate::store::{CollectionStore, StoreResult};

/// Use-case service wrapper for whole-collection persistence.
#[derive(Debug, Clone)]
pub struct NotebookService<S: CollectionStore> {
    store: S,
}

impl<S: CollectionStore> NotebookService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the full collection, seeding the backing storage on first run.
    pub fn fetch_all(&self) -> StoreResult<Collection> {
        self.store.fetch_all()
    }

    /// Overwrites the backing storage with the given collection.
    pub fn replace_all(&self, collection: &Collection) -> StoreResult<()> {
        self.store.replace_all(collection)
    }
}
