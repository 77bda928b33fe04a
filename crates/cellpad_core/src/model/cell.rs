//! Cell domain model.
//!
//! # Responsibility
//! - Define the canonical record for one unit of notebook content.
//! - Provide id generation for engine-created cells.
//!
//! # Invariants
//! - `id` is stable and never reused for another cell.
//! - `kind` is fixed at creation and never changes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable opaque identifier for one cell.
///
/// Kept as a plain string: the wire format and existing backing files carry
/// opaque short ids that are not required to be uuids.
pub type CellId = String;

/// Content category for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Free-form markdown prose.
    Text,
    /// Source text handed to an external bundler/runner.
    Code,
}

/// One ordered unit of notebook content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Stable id used for ordering, linking and persistence.
    pub id: CellId,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: CellType,
    /// Mutable payload: markdown for `text`, source text for `code`.
    pub content: String,
}

impl Cell {
    /// Creates a new empty cell with a generated stable id.
    pub fn new(kind: CellType) -> Self {
        Self::with_id(generate_cell_id(), kind, "")
    }

    /// Creates a cell with a caller-provided id.
    ///
    /// Used by deserialization and seed paths where identity already exists.
    pub fn with_id(id: impl Into<CellId>, kind: CellType, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
        }
    }
}

/// Generates a fresh cell id.
///
/// Uniqueness within one collection lifetime is what matters here; a v4 uuid
/// in hyphen-less form clears that bar with margin.
pub fn generate_cell_id() -> CellId {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::{generate_cell_id, Cell, CellType};

    #[test]
    fn new_cell_starts_empty() {
        let cell = Cell::new(CellType::Text);
        assert_eq!(cell.kind, CellType::Text);
        assert!(cell.content.is_empty());
        assert!(!cell.id.is_empty());
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_cell_id(), generate_cell_id());
    }

    #[test]
    fn cell_serializes_with_external_type_field() {
        let cell = Cell::with_id("aaaaa", CellType::Code, "1 + 1");
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"id":"aaaaa","type":"code","content":"1 + 1"}"#);
    }

    #[test]
    fn unknown_cell_type_fails_deserialization() {
        let err = serde_json::from_str::<Cell>(r#"{"id":"x","type":"table","content":""}"#);
        assert!(err.is_err());
    }
}
