//! Ordered cell collection and its mutation operations.
//!
//! # Responsibility
//! - Hold the ordered set of cells for one notebook file.
//! - Apply structural edits (insert-after, move, delete, content update)
//!   as pure value transformations.
//!
//! # Invariants
//! - `order` contains every cell id exactly once.
//! - `records` keys are exactly the set of ids in `order`.
//! - No-op paths return a value equal to the input.

use crate::model::cell::{Cell, CellId, CellType};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by fallible collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors from collection construction and mutation.
#[derive(Debug)]
pub enum CollectionError {
    /// Target cell does not exist in the collection.
    CellNotFound(CellId),
    /// Input cell list carries the same id more than once.
    DuplicateCellId(CellId),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CellNotFound(id) => write!(f, "cell not found: {id}"),
            Self::DuplicateCellId(id) => write!(f, "duplicate cell id: {id}"),
        }
    }
}

impl Error for CollectionError {}

/// Direction for single-step reorder moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Swap with the immediate predecessor.
    Up,
    /// Swap with the immediate successor.
    Down,
}

/// The full ordered set of cells for one notebook.
///
/// Fields stay private so every reachable value upholds the order/records
/// invariant. Mutations are value-in/value-out: callers thread a collection
/// through the operations and persist whole snapshots, so concurrent readers
/// never observe a partially-applied edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    order: Vec<CellId>,
    records: HashMap<CellId, Cell>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from an ordered cell list.
    ///
    /// This is the deserialization boundary: rejects duplicate ids instead
    /// of silently dropping cells.
    pub fn from_cells(cells: Vec<Cell>) -> CollectionResult<Self> {
        let mut order = Vec::with_capacity(cells.len());
        let mut records = HashMap::with_capacity(cells.len());
        for cell in cells {
            if records.contains_key(&cell.id) {
                return Err(CollectionError::DuplicateCellId(cell.id));
            }
            order.push(cell.id.clone());
            records.insert(cell.id.clone(), cell);
        }
        Ok(Self { order, records })
    }

    /// Returns the cells in display order.
    pub fn to_cells(&self) -> Vec<Cell> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// Returns the display order of cell ids.
    pub fn order(&self) -> &[CellId] {
        &self.order
    }

    /// Looks up one cell by id.
    pub fn get(&self, id: &str) -> Option<&Cell> {
        self.records.get(id)
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the collection has no cells.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Inserts a fresh empty cell of `kind` and returns its id.
    ///
    /// The new id is placed immediately after `after`, or at the front when
    /// `after` is `None` or not present in the order. Existing cells and
    /// positions are untouched.
    pub fn insert_after(&self, after: Option<&str>, kind: CellType) -> (Self, CellId) {
        let cell = Cell::new(kind);
        let id = cell.id.clone();

        let mut next = self.clone();
        next.records.insert(id.clone(), cell);
        match after.and_then(|after| next.position(after)) {
            Some(index) => next.order.insert(index + 1, id.clone()),
            None => next.order.insert(0, id.clone()),
        }

        debug_assert!(next.invariant_holds());
        (next, id)
    }

    /// Swaps `id` with its immediate neighbor in the given direction.
    ///
    /// Silent no-op when `id` is unknown or the move would leave the bounds
    /// of the order (first cell up, last cell down).
    pub fn move_cell(&self, id: &str, direction: MoveDirection) -> Self {
        let mut next = self.clone();
        let Some(index) = next.position(id) else {
            return next;
        };
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1).filter(|t| *t < next.order.len()),
        };
        if let Some(target) = target {
            next.order.swap(index, target);
        }

        debug_assert!(next.invariant_holds());
        next
    }

    /// Removes `id` from both the order and the record map.
    ///
    /// Silent no-op when `id` is not present. Remaining cells keep their
    /// relative order; only the gap closes.
    pub fn delete(&self, id: &str) -> Self {
        let mut next = self.clone();
        if next.records.remove(id).is_some() {
            next.order.retain(|entry| entry != id);
        }

        debug_assert!(next.invariant_holds());
        next
    }

    /// Replaces the content of the cell at `id`.
    ///
    /// # Errors
    /// - `CollectionError::CellNotFound` when `id` is not present. This
    ///   operation never creates a cell.
    pub fn update_content(&self, id: &str, content: impl Into<String>) -> CollectionResult<Self> {
        let mut next = self.clone();
        match next.records.get_mut(id) {
            Some(cell) => cell.content = content.into(),
            None => return Err(CollectionError::CellNotFound(id.to_string())),
        }

        debug_assert!(next.invariant_holds());
        Ok(next)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|entry| entry == id)
    }

    fn invariant_holds(&self) -> bool {
        if self.order.len() != self.records.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(self.order.len());
        self.order
            .iter()
            .all(|id| seen.insert(id) && self.records.contains_key(id))
    }
}
