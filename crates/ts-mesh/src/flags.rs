//! `FlagSet` — one sweep's refine/coarsen decision as plain cell sets.
//!
//! Flag sets are data, not actions: applying one to a mesh stages it, and
//! nothing changes until `execute_coarsening_and_refinement` runs.  This
//! split is what lets a refinement decision be recorded now and executed at
//! the next mesh rebuild.

use rustc_hash::FxHashSet;

use ts_core::CellId;

/// The refine and coarsen flags of one sweep.
///
/// Membership is per-cell.  A cell flagged for both refinement and
/// coarsening refines: refine flags always win, and a coarsen flag only
/// executes when every sibling carries it too (mesh-specific rule, see
/// [`RefinableMesh`][crate::RefinableMesh] implementations).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlagSet {
    pub refine: FxHashSet<CellId>,
    pub coarsen: FxHashSet<CellId>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.refine.is_empty() && self.coarsen.is_empty()
    }

    /// Total number of flags (refine + coarsen).
    pub fn len(&self) -> usize {
        self.refine.len() + self.coarsen.len()
    }

    /// Add refine flags, never removing anything already present.
    pub fn union_refine<I: IntoIterator<Item = CellId>>(&mut self, cells: I) {
        self.refine.extend(cells);
    }

    /// Union all flags from `other` into `self`.
    pub fn merge(&mut self, other: &FlagSet) {
        self.refine.extend(other.refine.iter().copied());
        self.coarsen.extend(other.coarsen.iter().copied());
    }

    /// All flagged cells in ascending id order.  Used where a deterministic
    /// iteration over set contents is required (validation, tests).
    pub fn sorted_cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.refine.union(&self.coarsen).copied().collect();
        cells.sort_unstable();
        cells.dedup();
        cells
    }
}
