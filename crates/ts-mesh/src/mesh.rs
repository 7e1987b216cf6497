//! The `RefinableMesh` trait — the narrow contract through which the
//! time-stepping core drives a mesh, and `CellPath` for cross-mesh cell
//! correspondence.
//!
//! The framework never looks inside a mesh.  Everything it needs is: staging
//! and executing refine/coarsen flags, counting and enumerating active
//! cells, predicting the cell count a flag set would produce, and limiting
//! the refinement-level skew of a candidate flag set.

use ts_core::CellId;

use crate::{FlagSet, MeshResult};

// ── CellPath ──────────────────────────────────────────────────────────────────

/// Structural address of a cell: which root it descends from, and the child
/// turn taken at every level.
///
/// Meshes of adjacent time steps are all grown from one shared coarse
/// template, so a path recorded on one mesh can be resolved on another —
/// this is how refine flags are mirrored between neighboring steps whose
/// `CellId` spaces are unrelated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPath {
    /// Index into the mesh's root-cell list.
    pub root: u32,
    /// Child index chosen at each descent level, from the root down.
    pub turns: Vec<u8>,
}

// ── RefinableMesh ─────────────────────────────────────────────────────────────

/// A hierarchical mesh that can stage and execute refine/coarsen flags.
///
/// `Clone` doubles as "copy from the coarse template": the framework keeps
/// one pristine coarse mesh per timeline and clones it as the seed of every
/// rebuild.
///
/// # Determinism requirement
///
/// Implementations must be replay-deterministic: starting from equal meshes,
/// applying equal flag sets and executing must produce equal topology *and*
/// equal `CellId` assignment.  The flag-log eviction scheme depends on this.
pub trait RefinableMesh: Clone {
    /// All active (leaf) cells in a deterministic, geometry-defined order.
    ///
    /// Per-cell data supplied by collaborators (error criteria) is aligned
    /// with this order.
    fn active_cells(&self) -> Vec<CellId>;

    /// Number of active cells.
    fn active_cell_count(&self) -> usize;

    /// Refinement level of a cell (root cells are level 0).
    fn level(&self, cell: CellId) -> MeshResult<u32>;

    /// Stage flags for the next execution, unioning with anything already
    /// staged.  Fails if any flagged cell is unknown or not active.
    fn apply_flags(&mut self, flags: &FlagSet) -> MeshResult<()>;

    /// Drop all staged flags.
    fn clear_flags(&mut self);

    /// Execute all staged flags: coarsening first, then refinement.  Staged
    /// flags are consumed.
    ///
    /// A coarsen flag executes only when every sibling of the cell carries
    /// one and no sibling is refine-flagged; refine flags always execute.
    fn execute_coarsening_and_refinement(&mut self) -> MeshResult<()>;

    /// The active-cell count this mesh would have after executing `flags`,
    /// without changing anything.
    fn predicted_active_cells(&self, flags: &FlagSet) -> usize;

    /// Adjust `flags` so that, after execution, neighboring active cells
    /// differ by at most one refinement level.  Only adds refine flags and
    /// removes coarsen flags — never the reverse.
    fn smooth_flags(&self, flags: &mut FlagSet);

    /// Structural address of `cell`, resolvable on sibling meshes.
    fn path_of(&self, cell: CellId) -> MeshResult<CellPath>;

    /// Deepest existing cell along `path`, or `None` if the root index is
    /// out of range.  The returned cell may be interior (this mesh is
    /// refined deeper than the path) or active at a shallower level than
    /// the path describes (this mesh is coarser there).
    fn resolve_path(&self, path: &CellPath) -> Option<CellId>;

    /// Whether `cell` is currently an active leaf.
    fn is_active(&self, cell: CellId) -> bool;
}
