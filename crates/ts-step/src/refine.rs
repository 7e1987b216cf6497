//! Refinement policy and the cell-number correction algorithm.
//!
//! # Cell-number correction (summary)
//!
//! Adjacent time levels should not differ wildly in mesh size, or the
//! interpolation between them dominates the error.  After threshold-based
//! flagging, a step's predicted cell count is nudged into a corridor around
//! its predecessor's count `P`:
//!
//! ```text
//! allowed = [bottom * P, top * P]        (widened per iteration by the
//!                                         sweep's relaxation factor)
//! too many cells → drop weakest refine flags, then add coarsen flags
//! too few  cells → drop strongest coarsen flags, then add refine flags
//! ```
//!
//! Candidates are always ordered by the caller-supplied error criteria, with
//! the cell id as a deterministic tie-breaker.  A boundary-exact count is
//! inside the corridor; if relaxation ever makes the bounds cross, the top
//! bound wins (bias toward fewer cells, so corridor misconfiguration cannot
//! cause runaway growth).

use ts_core::{CellId, SweepId};
use ts_mesh::{FlagSet, RefinableMesh};

use crate::{StepError, StepResult};

// ── Value types ───────────────────────────────────────────────────────────────

/// Thresholds for one refinement decision, applied against the per-cell
/// error criteria.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefineData {
    /// Cells with criterion `>=` this value are flagged for refinement.
    pub refine_threshold: f64,
    /// Cells with criterion `<=` this value are flagged for coarsening.
    pub coarsen_threshold: f64,
}

/// Allowed cell-count band relative to the previous step's count.
///
/// `top`/`bottom` are multiplicative factors: with `P` previous cells, the
/// corrected count must land in `[bottom * P, top * P]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCorridor {
    top: f64,
    bottom: f64,
}

impl CellCorridor {
    /// Fails with [`StepError::InvalidCorridor`] unless
    /// `0 <= bottom <= top` and both factors are finite.
    pub fn new(top: f64, bottom: f64) -> StepResult<Self> {
        if !(top.is_finite() && bottom.is_finite() && bottom >= 0.0 && top >= bottom) {
            return Err(StepError::InvalidCorridor { top, bottom });
        }
        Ok(Self { top, bottom })
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }
}

/// Per-sweep, per-iteration corridor relaxation factors.
///
/// Row = sweep, column = correction iteration.  Missing entries mean no
/// relaxation (0.0).  Loadable from CSV via
/// [`load_relaxations_reader`][crate::load_relaxations_reader].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelaxationTable(Vec<Vec<f64>>);

impl RelaxationTable {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }

    /// Relaxation factor for one sweep/iteration; 0.0 where the table has
    /// no entry.
    pub fn relaxation(&self, sweep: SweepId, iteration: u32) -> f64 {
        self.0
            .get(sweep.index())
            .and_then(|row| row.get(iteration as usize))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }
}

/// Everything that shapes a step's refinement decision besides the
/// thresholds themselves.
///
/// The default policy disables every optional mechanism: no level cap, no
/// cell-number correction, no mirroring, no adaptation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefinementPolicy {
    /// Hard cap on refinement levels; refine flags on cells at this level
    /// are cleared regardless of their criteria.  0 = unlimited.
    pub max_level: u32,
    /// First sweep in which cell-number correction runs.
    pub first_sweep_with_correction: SweepId,
    /// Correction is skipped while the step's own mesh has fewer active
    /// cells than this.
    pub min_cells_for_correction: usize,
    /// Allowed cell-count band relative to the previous step.
    pub corridor: CellCorridor,
    /// Per-sweep/iteration corridor relaxations.
    pub relaxations: RelaxationTable,
    /// Maximum correction iterations per decision.  0 disables correction.
    pub correction_steps: u32,
    /// Mirror this step's refine flags onto the previous step's mesh
    /// (union only; does not recurse further back).
    pub mirror_flags_to_previous: bool,
    /// Run the mesh's level-skew smoothing over the final flag set.
    pub adapt_meshes: bool,
}

impl Default for RefinementPolicy {
    fn default() -> Self {
        Self {
            max_level: 0,
            first_sweep_with_correction: SweepId::ZERO,
            min_cells_for_correction: usize::MAX,
            corridor: CellCorridor { top: 1.0, bottom: 0.0 },
            relaxations: RelaxationTable::default(),
            correction_steps: 0,
            mirror_flags_to_previous: false,
            adapt_meshes: false,
        }
    }
}

/// What a refinement decision produced, mostly for reporting and tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RefineOutcome {
    /// Refine flags in the stored decision.
    pub refined: usize,
    /// Coarsen flags in the stored decision.
    pub coarsened: usize,
    /// Predicted active-cell count after the decision executes.
    pub predicted: usize,
}

// ── Flagging ──────────────────────────────────────────────────────────────────

/// Threshold-based initial flagging.  `criteria` is aligned with `active`
/// (the mesh's active-cell order).  Where degenerate thresholds would flag a
/// cell both ways, refine wins.
pub(crate) fn flag_by_thresholds(
    active: &[CellId],
    criteria: &[f64],
    data: &RefineData,
) -> FlagSet {
    let mut flags = FlagSet::new();
    for (&cell, &criterion) in active.iter().zip(criteria) {
        if criterion >= data.refine_threshold {
            flags.refine.insert(cell);
        } else if criterion <= data.coarsen_threshold {
            flags.coarsen.insert(cell);
        }
    }
    flags
}

// ── Cell-number correction ────────────────────────────────────────────────────

/// Nudge `flags` until the predicted cell count sits inside the (relaxed)
/// corridor around `prev_count`.  Returns the final predicted count, which
/// is outside the corridor only if the candidate flags were exhausted or
/// `correction_steps` ran out.
pub(crate) fn correct_cell_count<M: RefinableMesh>(
    mesh: &M,
    active: &[CellId],
    criteria: &[f64],
    flags: &mut FlagSet,
    prev_count: usize,
    policy: &RefinementPolicy,
    sweep: SweepId,
) -> usize {
    let p = prev_count as f64;
    let mut predicted = mesh.predicted_active_cells(flags);
    for iteration in 0..policy.correction_steps {
        let relax = policy.relaxations.relaxation(sweep, iteration);
        let top = policy.corridor.top() * (1.0 + relax) * p;
        let bottom = (policy.corridor.bottom() * (1.0 - relax) * p).min(top);
        if (predicted as f64) > top {
            predicted = shrink(mesh, active, criteria, flags, top, policy.max_level);
        } else if (predicted as f64) < bottom {
            predicted = grow(mesh, active, criteria, flags, bottom, policy.max_level);
        } else {
            break;
        }
    }
    predicted
}

/// Active cells ordered by ascending criterion, cell id breaking ties.
fn ascending_by_criteria(active: &[CellId], criteria: &[f64]) -> Vec<CellId> {
    let mut order: Vec<usize> = (0..active.len()).collect();
    order.sort_by(|&a, &b| criteria[a].total_cmp(&criteria[b]).then(active[a].cmp(&active[b])));
    order.into_iter().map(|i| active[i]).collect()
}

/// Reduce the predicted count to at most `top`: drop refine flags weakest
/// first, then add coarsen flags weakest first.
fn shrink<M: RefinableMesh>(
    mesh: &M,
    active: &[CellId],
    criteria: &[f64],
    flags: &mut FlagSet,
    top: f64,
    _max_level: u32,
) -> usize {
    let order = ascending_by_criteria(active, criteria);
    let mut predicted = mesh.predicted_active_cells(flags);

    for &cell in &order {
        if (predicted as f64) <= top {
            return predicted;
        }
        if flags.refine.remove(&cell) {
            predicted = mesh.predicted_active_cells(flags);
        }
    }
    for &cell in &order {
        if (predicted as f64) <= top {
            return predicted;
        }
        if !flags.refine.contains(&cell) && flags.coarsen.insert(cell) {
            predicted = mesh.predicted_active_cells(flags);
        }
    }
    predicted
}

/// Raise the predicted count to at least `bottom`: drop coarsen flags
/// strongest first, then add refine flags strongest first (respecting the
/// level cap).
fn grow<M: RefinableMesh>(
    mesh: &M,
    active: &[CellId],
    criteria: &[f64],
    flags: &mut FlagSet,
    bottom: f64,
    max_level: u32,
) -> usize {
    let mut order = ascending_by_criteria(active, criteria);
    order.reverse();
    let mut predicted = mesh.predicted_active_cells(flags);

    for &cell in &order {
        if (predicted as f64) >= bottom {
            return predicted;
        }
        if flags.coarsen.remove(&cell) {
            predicted = mesh.predicted_active_cells(flags);
        }
    }
    for &cell in &order {
        if (predicted as f64) >= bottom {
            return predicted;
        }
        let capped = max_level > 0
            && mesh.level(cell).map(|l| l >= max_level).unwrap_or(true);
        if !capped && flags.refine.insert(cell) {
            predicted = mesh.predicted_active_cells(flags);
        }
    }
    predicted
}
