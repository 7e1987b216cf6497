//! `IntervalMesh` — a 1-D hierarchical mesh with binary refinement.
//!
//! # Storage
//!
//! Cells live in an append-only arena `Vec`.  Refining a cell pushes its two
//! children at the end; coarsening tombstones the children (`alive = false`)
//! and never reuses their slots.  Because slots are never reused, the arena
//! allocation order — and therefore every `CellId` — is a pure function of
//! the operation history, which is what makes flag-log replay reconstruct
//! identical ids.
//!
//! # Active order
//!
//! `active_cells` enumerates leaves left-to-right (depth-first, left child
//! first), i.e. in ascending spatial order along the interval.  Adjacency in
//! that order is geometric adjacency, which `smooth_flags` relies on.

use rustc_hash::FxHashSet;

use ts_core::CellId;

use crate::mesh::{CellPath, RefinableMesh};
use crate::{FlagSet, MeshError, MeshResult};

#[derive(Clone, Debug)]
struct Cell {
    level: u32,
    parent: Option<CellId>,
    children: Option<[CellId; 2]>,
    alive: bool,
}

/// A refinable 1-D mesh over a row of equally sized root cells.
#[derive(Clone, Debug)]
pub struct IntervalMesh {
    cells: Vec<Cell>,
    roots: Vec<CellId>,
    /// Flags staged by `apply_flags`, consumed by
    /// `execute_coarsening_and_refinement`.
    pending: FlagSet,
}

impl IntervalMesh {
    /// A flat mesh of `root_cells` level-0 cells.
    pub fn new(root_cells: usize) -> MeshResult<Self> {
        if root_cells == 0 {
            return Err(MeshError::NoRootCells);
        }
        let cells = (0..root_cells)
            .map(|_| Cell { level: 0, parent: None, children: None, alive: true })
            .collect();
        let roots = (0..root_cells).map(|i| CellId(i as u32)).collect();
        Ok(Self { cells, roots, pending: FlagSet::new() })
    }

    fn get(&self, cell: CellId) -> MeshResult<&Cell> {
        self.cells
            .get(cell.index())
            .filter(|c| c.alive)
            .ok_or(MeshError::UnknownCell(cell))
    }

    fn require_active(&self, cell: CellId) -> MeshResult<()> {
        if self.get(cell)?.children.is_some() {
            return Err(MeshError::CellNotActive(cell));
        }
        Ok(())
    }

    /// Parents whose coarsen flags are complete and unopposed: both children
    /// active, both coarsen-flagged, neither refine-flagged.  Returned in
    /// active (spatial) order of their left child.
    fn coarsen_parents(&self, flags: &FlagSet) -> Vec<CellId> {
        let mut parents = Vec::new();
        for cell in self.active_cells() {
            if !flags.coarsen.contains(&cell) {
                continue;
            }
            let Some(parent) = self.cells[cell.index()].parent else { continue };
            let Some([left, right]) = self.cells[parent.index()].children else { continue };
            // Record once, at the left child, to avoid duplicates.
            if cell != left {
                continue;
            }
            let pair_ok = self.is_active(left)
                && self.is_active(right)
                && flags.coarsen.contains(&right)
                && !flags.refine.contains(&left)
                && !flags.refine.contains(&right);
            if pair_ok {
                parents.push(parent);
            }
        }
        parents
    }

    fn merge(&mut self, parent: CellId) {
        if let Some([left, right]) = self.cells[parent.index()].children.take() {
            self.cells[left.index()].alive = false;
            self.cells[right.index()].alive = false;
        }
    }

    fn split(&mut self, cell: CellId) {
        let level = self.cells[cell.index()].level + 1;
        let left = CellId(self.cells.len() as u32);
        let right = CellId(self.cells.len() as u32 + 1);
        self.cells.push(Cell { level, parent: Some(cell), children: None, alive: true });
        self.cells.push(Cell { level, parent: Some(cell), children: None, alive: true });
        self.cells[cell.index()].children = Some([left, right]);
    }

    /// Effective post-execution level of each active cell under `flags`:
    /// +1 for a refine flag, −1 for a cell whose sibling pair will merge.
    fn effective_levels(&self, active: &[CellId], flags: &FlagSet) -> Vec<i64> {
        let merged: FxHashSet<CellId> = self
            .coarsen_parents(flags)
            .into_iter()
            .filter_map(|p| self.cells[p.index()].children)
            .flat_map(|[l, r]| [l, r])
            .collect();
        active
            .iter()
            .map(|&c| {
                let base = self.cells[c.index()].level as i64;
                if flags.refine.contains(&c) {
                    base + 1
                } else if merged.contains(&c) {
                    base - 1
                } else {
                    base
                }
            })
            .collect()
    }
}

impl RefinableMesh for IntervalMesh {
    fn active_cells(&self) -> Vec<CellId> {
        let mut out = Vec::new();
        let mut stack: Vec<CellId> = self.roots.iter().rev().copied().collect();
        while let Some(cell) = stack.pop() {
            match self.cells[cell.index()].children {
                None => out.push(cell),
                Some([left, right]) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    fn active_cell_count(&self) -> usize {
        self.active_cells().len()
    }

    fn level(&self, cell: CellId) -> MeshResult<u32> {
        Ok(self.get(cell)?.level)
    }

    fn apply_flags(&mut self, flags: &FlagSet) -> MeshResult<()> {
        // Validate in ascending id order so failures are deterministic.
        for cell in flags.sorted_cells() {
            self.require_active(cell)?;
        }
        self.pending.merge(flags);
        Ok(())
    }

    fn clear_flags(&mut self) {
        self.pending = FlagSet::new();
    }

    fn execute_coarsening_and_refinement(&mut self) -> MeshResult<()> {
        let flags = std::mem::take(&mut self.pending);
        for parent in self.coarsen_parents(&flags) {
            self.merge(parent);
        }
        // Refine targets survive coarsening: a refine flag on either sibling
        // vetoes the pair's merge.
        for cell in self.active_cells() {
            if flags.refine.contains(&cell) {
                self.split(cell);
            }
        }
        Ok(())
    }

    fn predicted_active_cells(&self, flags: &FlagSet) -> usize {
        let refined = self
            .active_cells()
            .iter()
            .filter(|c| flags.refine.contains(c))
            .count();
        let merged_pairs = self.coarsen_parents(flags).len();
        // Each split nets +1 (two children replace one cell); each merged
        // sibling pair nets −1.
        self.active_cell_count() + refined - merged_pairs
    }

    fn smooth_flags(&self, flags: &mut FlagSet) {
        let active = self.active_cells();
        // Raising a cell's effective level is monotone and bounded by the
        // deepest level in the mesh, so this fixpoint loop terminates.
        loop {
            let eff = self.effective_levels(&active, flags);
            let mut changed = false;
            for i in 0..active.len().saturating_sub(1) {
                let (a, b) = (active[i], active[i + 1]);
                if eff[i] > eff[i + 1] + 1 {
                    changed |= raise(flags, b);
                } else if eff[i + 1] > eff[i] + 1 {
                    changed |= raise(flags, a);
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn path_of(&self, cell: CellId) -> MeshResult<CellPath> {
        self.get(cell)?;
        let mut turns = Vec::new();
        let mut current = cell;
        while let Some(parent) = self.cells[current.index()].parent {
            let turn = match self.cells[parent.index()].children {
                Some([left, _]) if current == left => 0,
                _ => 1,
            };
            turns.push(turn);
            current = parent;
        }
        turns.reverse();
        let root = self
            .roots
            .iter()
            .position(|&r| r == current)
            .ok_or(MeshError::UnknownCell(cell))? as u32;
        Ok(CellPath { root, turns })
    }

    fn resolve_path(&self, path: &CellPath) -> Option<CellId> {
        let mut current = *self.roots.get(path.root as usize)?;
        for &turn in &path.turns {
            match self.cells[current.index()].children {
                // A turn outside the branching factor is a malformed path,
                // not a coarser mesh.
                Some(children) => current = *children.get(turn as usize)?,
                None => break,
            }
        }
        Some(current)
    }

    fn is_active(&self, cell: CellId) -> bool {
        self.cells
            .get(cell.index())
            .is_some_and(|c| c.alive && c.children.is_none())
    }
}

/// Lift a cell's effective level by one: drop its coarsen flag if present,
/// otherwise add a refine flag.  Returns whether anything changed.
fn raise(flags: &mut FlagSet, cell: CellId) -> bool {
    if flags.coarsen.remove(&cell) {
        true
    } else {
        flags.refine.insert(cell)
    }
}
