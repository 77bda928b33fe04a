//! Flat-file collection store.
//!
//! # Responsibility
//! - Round-trip the full collection to a single JSON file.
//! - Materialize seed content when the file does not exist yet.
//!
//! # Invariants
//! - The file contents are exactly the serialized collection written by the
//!   last successful replace (or the seed, if never written).
//! - A parse failure leaves the file untouched; user data is never replaced
//!   on the read path.
//! - The overwrite is not atomic: a reader racing a write can observe a
//!   truncated file. A single trusted local writer is assumed.

use super::{CollectionStore, StoreError, StoreResult};
use crate::model::cell::{Cell, CellType};
use crate::model::collection::Collection;
use log::{error, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File-backed collection store.
///
/// Holds only the backing path; every fetch performs its own fresh read, so
/// concurrent fetches share no mutable state.
#[derive(Debug, Clone)]
pub struct FileCollectionStore {
    path: PathBuf,
}

impl FileCollectionStore {
    /// Creates a store over `dir/filename`.
    pub fn new(dir: impl AsRef<Path>, filename: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(filename),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seed(&self) -> StoreResult<Collection> {
        let cells = seed_cells();
        let body = serialize_cells(&cells)?;
        fs::write(&self.path, body)?;
        info!(
            "event=notebook_seed module=store status=ok path={} cells={}",
            self.path.display(),
            cells.len()
        );
        Collection::from_cells(cells).map_err(|err| StoreError::Malformed(err.to_string()))
    }
}

impl CollectionStore for FileCollectionStore {
    fn fetch_all(&self) -> StoreResult<Collection> {
        let started_at = Instant::now();
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // First run: materialize the seed instead of failing.
                return self.seed();
            }
            Err(err) => {
                error!(
                    "event=notebook_read module=store status=error path={} error={}",
                    self.path.display(),
                    err
                );
                return Err(err.into());
            }
        };

        let collection = parse_collection(&text)?;
        info!(
            "event=notebook_read module=store status=ok duration_ms={} cells={}",
            started_at.elapsed().as_millis(),
            collection.len()
        );
        Ok(collection)
    }

    fn replace_all(&self, collection: &Collection) -> StoreResult<()> {
        let started_at = Instant::now();
        let body = serialize_cells(&collection.to_cells())?;
        if let Err(err) = fs::write(&self.path, body) {
            error!(
                "event=notebook_write module=store status=error path={} error={}",
                self.path.display(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=notebook_write module=store status=ok duration_ms={} cells={}",
            started_at.elapsed().as_millis(),
            collection.len()
        );
        Ok(())
    }
}

fn parse_collection(text: &str) -> StoreResult<Collection> {
    let cells: Vec<Cell> =
        serde_json::from_str(text).map_err(|err| StoreError::Malformed(err.to_string()))?;
    Collection::from_cells(cells).map_err(|err| StoreError::Malformed(err.to_string()))
}

fn serialize_cells(cells: &[Cell]) -> StoreResult<String> {
    serde_json::to_string(cells).map_err(|err| StoreError::Malformed(err.to_string()))
}

/// Default introductory cells written when no backing file exists yet.
///
/// Ids are fixed short strings so the seed file is stable across runs and
/// readable in diffs.
pub fn seed_cells() -> Vec<Cell> {
    vec![
        Cell::with_id(
            "aaaaa",
            CellType::Text,
            "# CellPad\n\
             This is an interactive notebook. Mix markdown prose with code and \
             everything you write is saved to the notebook file you opened.\n\
             - Click any text cell (including this one) to edit it\n\
             - Reorder or delete cells with the buttons on each cell\n\
             - Add new cells by hovering on the divider between cells",
        ),
        Cell::with_id(
            "bbbbb",
            CellType::Code,
            "const greet = (name) => `Hello, ${name}!`;\nshow(greet('CellPad'));",
        ),
        Cell::with_id(
            "ccccc",
            CellType::Code,
            "// Values defined in earlier code cells stay in scope here.\nshow(greet('again'));",
        ),
    ]
}
