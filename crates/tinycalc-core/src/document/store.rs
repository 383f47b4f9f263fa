//! Cell storage for the sheet.
//!
//! - [`Cell`] - raw content, cached value, flags and both edge lists
//! - [`CellId`] - stable index of a cell in the arena
//! - [`CellStore`] - the arena plus a coordinate index
//!
//! Dependency edges are stored as [`CellId`] pairs: a cell lists the cells it
//! reads and the cells that read it. Every edge is mirrored, and the only
//! functions that touch the edge lists are [`CellStore::add_edge`] and
//! [`CellStore::clear_reads`].

use dashmap::DashMap;
use std::rc::Rc;

use crate::error::Result;
use tinycalc_engine::engine::{CellRef, CellSource, Value};

/// Index of a cell in the [`CellStore`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CellFlags {
    /// Cached value is stale.
    pub dirty: bool,
    /// Content starts with `=`.
    pub formula: bool,
    /// Cell exists only as an edge target; it has no content.
    pub placeholder: bool,
    /// Cell is on the current evaluation path.
    pub visiting: bool,
}

/// A cell in the sheet.
#[derive(Clone, Debug)]
pub struct Cell {
    at: CellRef,
    content: Option<Rc<str>>,
    pub(crate) cached: Value,
    pub(crate) flags: CellFlags,
    /// Cells this cell reads.
    reads: Vec<CellId>,
    /// Cells that read this cell.
    read_by: Vec<CellId>,
}

impl Cell {
    fn placeholder(at: CellRef) -> Cell {
        Cell {
            at,
            content: None,
            cached: Value::Null,
            flags: CellFlags {
                placeholder: true,
                ..CellFlags::default()
            },
            reads: Vec::new(),
            read_by: Vec::new(),
        }
    }

    pub fn at(&self) -> CellRef {
        self.at
    }

    /// Raw content as entered (formulas keep their leading `=`).
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub(crate) fn shared_content(&self) -> Option<&Rc<str>> {
        self.content.as_ref()
    }

    /// Replace the content wholesale. Edges are not touched.
    pub(crate) fn set_content(&mut self, content: Option<Rc<str>>, formula: bool) {
        self.flags.formula = formula && content.is_some();
        self.flags.placeholder = content.is_none();
        self.content = content;
        self.cached = Value::Null;
    }

    /// Last computed value.
    pub fn value(&self) -> &Value {
        &self.cached
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.dirty
    }

    pub fn is_formula(&self) -> bool {
        self.flags.formula
    }

    pub fn is_placeholder(&self) -> bool {
        self.flags.placeholder
    }

    pub fn reads(&self) -> &[CellId] {
        &self.reads
    }

    pub fn read_by(&self) -> &[CellId] {
        &self.read_by
    }
}

/// Arena of cells with O(1) lookup by coordinate.
///
/// Cells are never moved while edges point at them; [`CellStore::compact`]
/// rewrites every edge when it removes cells.
#[derive(Default)]
pub struct CellStore {
    cells: Vec<Cell>,
    index: DashMap<CellRef, CellId>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn id_of(&self, at: CellRef) -> Option<CellId> {
        self.index.get(&at).map(|entry| *entry.value())
    }

    pub fn find(&self, at: CellRef) -> Option<&Cell> {
        self.id_of(at).map(|id| self.cell(id))
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.0]
    }

    /// All cells in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells.iter().enumerate().map(|(i, cell)| (CellId(i), cell))
    }

    /// Return the cell at `at`, creating an empty placeholder if absent.
    /// Existing cells are never overwritten.
    pub fn insert_if_absent(&mut self, at: CellRef) -> Result<CellId> {
        if let Some(id) = self.id_of(at) {
            return Ok(id);
        }
        self.cells.try_reserve(1)?;
        let id = CellId(self.cells.len());
        self.cells.push(Cell::placeholder(at));
        self.index.insert(at, id);
        tracing::trace!(cell = %at, "created cell");
        Ok(id)
    }

    /// Record that `owner` reads `target`, on both sides.
    pub(crate) fn add_edge(&mut self, owner: CellId, target: CellId) -> Result<()> {
        if self.cells[owner.0].reads.contains(&target) {
            return Ok(());
        }
        self.cells[owner.0].reads.try_reserve(1)?;
        self.cells[target.0].read_by.try_reserve(1)?;
        self.cells[owner.0].reads.push(target);
        self.cells[target.0].read_by.push(owner);
        Ok(())
    }

    /// Remove every outgoing edge of `owner` and the mirrored incoming edges.
    pub(crate) fn clear_reads(&mut self, owner: CellId) {
        let reads = std::mem::take(&mut self.cells[owner.0].reads);
        for target in reads {
            self.cells[target.0].read_by.retain(|&id| id != owner);
        }
    }

    /// Mark `start` and everything that transitively reads it dirty.
    ///
    /// Stops at cells that are already dirty.
    pub(crate) fn propagate_dirty(&mut self, start: CellId) {
        let mut to_process = vec![start];
        while let Some(id) = to_process.pop() {
            let cell = &mut self.cells[id.0];
            if cell.flags.dirty {
                continue;
            }
            cell.flags.dirty = true;
            to_process.extend(cell.read_by.iter().copied());
        }
    }

    /// Drop cells that have no content and no edges, renumbering the rest.
    /// Returns the number of cells removed.
    pub(crate) fn compact(&mut self) -> usize {
        let keep = |cell: &Cell| {
            cell.content.is_some() || !cell.reads.is_empty() || !cell.read_by.is_empty()
        };

        let mut remap: Vec<Option<CellId>> = Vec::with_capacity(self.cells.len());
        let mut next = 0;
        for cell in &self.cells {
            if keep(cell) {
                remap.push(Some(CellId(next)));
                next += 1;
            } else {
                remap.push(None);
            }
        }
        let removed = self.cells.len() - next;
        if removed == 0 {
            return 0;
        }

        let renumber = |ids: &mut Vec<CellId>| {
            for id in ids.iter_mut() {
                // Edge targets always have an edge, so they are always kept.
                if let Some(new_id) = remap[id.0] {
                    *id = new_id;
                }
            }
        };

        let old = std::mem::take(&mut self.cells);
        self.index.clear();
        for mut cell in old.into_iter().filter(|cell| keep(cell)) {
            renumber(&mut cell.reads);
            renumber(&mut cell.read_by);
            self.index.insert(cell.at, CellId(self.cells.len()));
            self.cells.push(cell);
        }
        removed
    }
}

impl CellSource for CellStore {
    fn cached_value(&self, at: CellRef) -> Value {
        self.find(at).map(|cell| cell.cached.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(name: &str) -> CellRef {
        CellRef::parse(name).unwrap()
    }

    fn assert_mirrored(store: &CellStore) {
        for (id, c) in store.iter() {
            for &target in c.reads() {
                assert!(store.cell(target).read_by().contains(&id));
            }
            for &reader in c.read_by() {
                assert!(store.cell(reader).reads().contains(&id));
            }
        }
    }

    #[test]
    fn test_insert_if_absent_is_idempotent() {
        let mut store = CellStore::new();
        let a = store.insert_if_absent(cell("A1")).unwrap();
        let b = store.insert_if_absent(cell("A1")).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert!(store.cell(a).is_placeholder());
        assert_eq!(store.cached_value(cell("B7")), Value::Null);
    }

    #[test]
    fn test_edges_are_mirrored_and_cleared_together() {
        let mut store = CellStore::new();
        let a = store.insert_if_absent(cell("A1")).unwrap();
        let b = store.insert_if_absent(cell("B1")).unwrap();
        let c = store.insert_if_absent(cell("C1")).unwrap();
        store.add_edge(a, b).unwrap();
        store.add_edge(a, c).unwrap();
        store.add_edge(a, b).unwrap();
        store.add_edge(c, b).unwrap();
        assert_eq!(store.cell(a).reads(), &[b, c]);
        assert_eq!(store.cell(b).read_by(), &[a, c]);
        assert_mirrored(&store);

        store.clear_reads(a);
        assert!(store.cell(a).reads().is_empty());
        assert_eq!(store.cell(b).read_by(), &[c]);
        assert!(store.cell(c).read_by().is_empty());
        assert_mirrored(&store);
    }

    #[test]
    fn test_propagate_dirty_stops_at_dirty_cells() {
        let mut store = CellStore::new();
        let a = store.insert_if_absent(cell("A1")).unwrap();
        let b = store.insert_if_absent(cell("B1")).unwrap();
        // Cycle: a reads b, b reads a.
        store.add_edge(a, b).unwrap();
        store.add_edge(b, a).unwrap();
        store.propagate_dirty(a);
        assert!(store.cell(a).is_dirty());
        assert!(store.cell(b).is_dirty());
    }

    #[test]
    fn test_compact_keeps_edges_consistent() {
        let mut store = CellStore::new();
        let _lonely = store.insert_if_absent(cell("Z9")).unwrap();
        let a = store.insert_if_absent(cell("A1")).unwrap();
        let b = store.insert_if_absent(cell("B1")).unwrap();
        store.add_edge(a, b).unwrap();

        assert_eq!(store.compact(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.find(cell("Z9")).is_none());
        let a = store.id_of(cell("A1")).unwrap();
        let b = store.id_of(cell("B1")).unwrap();
        assert_eq!(store.cell(a).reads(), &[b]);
        assert_mirrored(&store);
    }
}
