//! Core domain logic for CellPad.
//! This crate is the single source of truth for notebook invariants.

pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging};
pub use model::cell::{generate_cell_id, Cell, CellId, CellType};
pub use model::collection::{Collection, CollectionError, CollectionResult, MoveDirection};
pub use service::notebook_service::NotebookService;
pub use store::file_store::{seed_cells, FileCollectionStore};
pub use store::{CollectionStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
