//! `MeshSlot` — an evictable mesh bound to one time step.
//!
//! # Why this exists
//!
//! Keeping every time level's refined mesh in memory for a whole sweep is
//! what makes time-dependent adaptive runs blow up.  A `MeshSlot` holds the
//! mesh only while its step is inside a pass's wake window; outside it, the
//! slot keeps just the per-sweep [`FlagLog`] and rebuilds the mesh
//! deterministically from the shared coarse template on the next wake.
//!
//! # Wiring
//!
//! A step type embeds a slot next to its [`StepState`][crate::StepState] and
//! forwards three hooks:
//!
//! ```text
//! init_sweep  → slot.begin_sweep(state.sweep())
//! wake_up(s)  → slot.wake_up(s)
//! sleep(s)    → slot.sleep(s)
//! ```
//!
//! The refinement pass calls [`refine_mesh`][MeshSlot::refine_mesh], handing
//! in the predecessor's slot (obtained from the pass context) so the
//! decision can consult the neighbor's cell count and mirror flags backward.

use std::sync::Arc;

use ts_core::{Signal, SweepId, WindowPolicy};
use ts_mesh::{CellPath, FlagLog, FlagSet, RefinableMesh};

use crate::refine::{correct_cell_count, flag_by_thresholds};
use crate::{RefineData, RefineOutcome, RefinementPolicy, StepError, StepResult};

// ── WakeFlags ─────────────────────────────────────────────────────────────────

/// When a slot builds and destroys its mesh, in wake/sleep signal terms.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WakeFlags {
    /// Destroy the mesh on sleep and rebuild it on wake.  When false the
    /// mesh survives sleeps and is caught up in place from the flag log.
    pub rebuild_on_wake: bool,
    /// Wake signal at which the mesh is (re)built.
    pub wake_level_to_build: Signal,
    /// Sleep signal at which the mesh is destroyed.
    pub sleep_level_to_destroy: Signal,
}

impl WakeFlags {
    pub fn new(
        rebuild_on_wake: bool,
        wake_level_to_build: Signal,
        sleep_level_to_destroy: Signal,
    ) -> Self {
        Self { rebuild_on_wake, wake_level_to_build, sleep_level_to_destroy }
    }

    /// Like [`new`][Self::new], but fails unless both levels fall inside the
    /// window of the pass this slot will run under — a build level the pass
    /// never signals would leave the mesh asleep when compute needs it.
    pub fn checked(
        rebuild_on_wake: bool,
        wake_level_to_build: Signal,
        sleep_level_to_destroy: Signal,
        policy: WindowPolicy,
    ) -> StepResult<Self> {
        if wake_level_to_build.0 > policy.look_ahead {
            return Err(StepError::WakeLevelOutOfWindow {
                level: wake_level_to_build,
                limit: policy.look_ahead,
            });
        }
        if sleep_level_to_destroy.0 > policy.look_back {
            return Err(StepError::SleepLevelOutOfWindow {
                level: sleep_level_to_destroy,
                limit: policy.look_back,
            });
        }
        Ok(Self::new(rebuild_on_wake, wake_level_to_build, sleep_level_to_destroy))
    }
}

impl Default for WakeFlags {
    /// Rebuild on every wake, build at signal 0, destroy at signal 0 —
    /// valid under any window policy.
    fn default() -> Self {
        Self::new(true, Signal::ZERO, Signal::ZERO)
    }
}

// ── MeshSlot ──────────────────────────────────────────────────────────────────

/// The evictable mesh of one time step.
///
/// Invariant: `mesh` is `Some` iff the step is awake at or past its build
/// threshold and has not yet hit its destroy threshold.  Rebuilds replay the
/// flag log against the shared coarse template, so topology and cell ids
/// come back bit-identical (see [`FlagLog`]).
pub struct MeshSlot<M: RefinableMesh> {
    /// Shared immutable coarse template.  Outlives every slot that
    /// references it by construction — `Arc` makes the lifetime contract a
    /// type-system fact instead of a documentation clause.
    coarse: Arc<M>,
    mesh: Option<M>,
    /// Flag-log entries already reflected in `mesh`'s topology.
    replayed: usize,
    flags: WakeFlags,
    log: FlagLog,
    sweep: SweepId,
    /// Cell count at the moment of the last eviction, so a sleeping
    /// neighbor can still be consulted for cell-number correction.
    last_count: Option<usize>,
    woken_this_sweep: bool,
    decided_this_sweep: bool,
    /// Refine flags mirrored here by the successor before our own decision
    /// ran; merged into the next decision's initial flag set.
    extra_flags: FlagSet,
}

impl<M: RefinableMesh> MeshSlot<M> {
    pub fn new(coarse: Arc<M>, flags: WakeFlags) -> Self {
        Self {
            coarse,
            mesh: None,
            replayed: 0,
            flags,
            log: FlagLog::new(),
            sweep: SweepId::ZERO,
            last_count: None,
            woken_this_sweep: false,
            decided_this_sweep: false,
            extra_flags: FlagSet::new(),
        }
    }

    // ── Lifecycle hooks ───────────────────────────────────────────────────

    /// Reset the per-sweep latches.  Forward your step's `init_sweep` here.
    pub fn begin_sweep(&mut self, sweep: SweepId) {
        self.sweep = sweep;
        self.woken_this_sweep = false;
        self.decided_this_sweep = false;
    }

    /// Build the mesh if this signal is the configured build level, or if
    /// this is the first wake the slot sees this sweep (covers passes whose
    /// window starts past the build level).
    pub fn wake_up(&mut self, signal: Signal) -> StepResult<()> {
        let build = signal == self.flags.wake_level_to_build || !self.woken_this_sweep;
        self.woken_this_sweep = true;
        if build {
            self.ensure_mesh()?;
        }
        Ok(())
    }

    /// Destroy the mesh at the configured destroy level.  Safe at any time:
    /// every decision already sits in the flag log, which is all a rebuild
    /// needs.
    pub fn sleep(&mut self, signal: Signal) -> StepResult<()> {
        if self.flags.rebuild_on_wake && signal == self.flags.sleep_level_to_destroy {
            if let Some(mesh) = self.mesh.take() {
                self.last_count = Some(mesh.active_cell_count());
                self.replayed = 0;
            }
        }
        Ok(())
    }

    fn ensure_mesh(&mut self) -> StepResult<()> {
        match &mut self.mesh {
            None => {
                let mesh = self.log.replay(self.coarse.as_ref())?;
                self.replayed = self.log.len();
                self.mesh = Some(mesh);
            }
            // Mesh kept alive across sweeps: catch up on decisions recorded
            // since it was last current.
            Some(mesh) => {
                if self.replayed < self.log.len() {
                    self.replayed = self.log.replay_onto(mesh, self.replayed)?;
                }
            }
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn is_awake(&self) -> bool {
        self.mesh.is_some()
    }

    /// The live mesh, or [`StepError::MeshAsleep`].
    pub fn mesh(&self) -> StepResult<&M> {
        self.mesh.as_ref().ok_or(StepError::MeshAsleep)
    }

    pub fn mesh_mut(&mut self) -> StepResult<&mut M> {
        self.mesh.as_mut().ok_or(StepError::MeshAsleep)
    }

    /// Active-cell count of the live mesh, falling back to the count cached
    /// at the last eviction.  `None` if no mesh was ever built.
    pub fn active_cell_count(&self) -> Option<usize> {
        match &self.mesh {
            Some(mesh) => Some(mesh.active_cell_count()),
            None => self.last_count,
        }
    }

    pub fn log(&self) -> &FlagLog {
        &self.log
    }

    pub fn sweep(&self) -> SweepId {
        self.sweep
    }

    // ── Refinement ────────────────────────────────────────────────────────

    /// Compute and record this sweep's refinement decision.
    ///
    /// Steps, in order: threshold flagging (plus flags mirrored here by the
    /// successor), level cap, cell-number correction against the previous
    /// step's count, mirroring our refine flags onto `previous`, level-skew
    /// adaptation, and finally appending the decision to the flag log.
    /// Execution is deferred: the mesh itself only changes on a later
    /// rebuild or wake (the decision may never be needed again this sweep).
    ///
    /// Correction is skipped when `previous` is `None` or has never built a
    /// mesh.  A second call in the same sweep fails with
    /// [`StepError::FlagsAlreadyStored`].
    pub fn refine_mesh(
        &mut self,
        data: RefineData,
        criteria: &[f64],
        policy: &RefinementPolicy,
        mut previous: Option<&mut MeshSlot<M>>,
    ) -> StepResult<RefineOutcome> {
        if self.decided_this_sweep {
            return Err(StepError::FlagsAlreadyStored { sweep: self.sweep });
        }
        let mesh = self.mesh.as_ref().ok_or(StepError::MeshAsleep)?;
        let active = mesh.active_cells();
        if criteria.len() != active.len() {
            return Err(StepError::CriteriaCountMismatch {
                expected: active.len(),
                got: criteria.len(),
            });
        }

        // 1. Threshold flagging, merged with flags the successor mirrored in.
        let mut flags = flag_by_thresholds(&active, criteria, &data);
        let extra = std::mem::take(&mut self.extra_flags);
        flags.merge(&extra);

        // 2. Hard level cap, independent of the error indicator.
        if policy.max_level > 0 {
            let mut capped: Vec<_> = flags
                .refine
                .iter()
                .filter(|&&c| mesh.level(c).map(|l| l >= policy.max_level).unwrap_or(true))
                .copied()
                .collect();
            capped.sort_unstable();
            for cell in capped {
                flags.refine.remove(&cell);
            }
        }

        // 3. Cell-number correction against the predecessor.
        let mut predicted = mesh.predicted_active_cells(&flags);
        let prev_count = previous.as_ref().and_then(|p| p.active_cell_count());
        if self.sweep >= policy.first_sweep_with_correction
            && active.len() >= policy.min_cells_for_correction
            && policy.correction_steps > 0
        {
            if let Some(prev_count) = prev_count {
                predicted = correct_cell_count(
                    mesh, &active, criteria, &mut flags, prev_count, policy, self.sweep,
                );
            }
        }

        // 4. Mirror refine flags backward (union only, no recursion).
        if policy.mirror_flags_to_previous {
            if let Some(prev_slot) = previous.as_deref_mut() {
                let mut paths = Vec::with_capacity(flags.refine.len());
                for &cell in active.iter().filter(|c| flags.refine.contains(c)) {
                    paths.push(mesh.path_of(cell)?);
                }
                prev_slot.absorb_refine_paths(&paths)?;
            }
        }

        // 5. Level-skew adaptation over the final candidate set.
        if policy.adapt_meshes {
            mesh.smooth_flags(&mut flags);
            predicted = mesh.predicted_active_cells(&flags);
        }

        // 6. Record the decision; execution happens at the next rebuild.
        let outcome = RefineOutcome {
            refined: flags.refine.len(),
            coarsened: flags.coarsen.len(),
            predicted,
        };
        self.log.push(flags);
        self.decided_this_sweep = true;
        Ok(outcome)
    }

    /// Accept refine flags mirrored from the successor's mesh, addressed by
    /// cell path (the two meshes share a coarse template but not cell ids).
    ///
    /// If our decision for this sweep is already stored, the flags are
    /// unioned into it; otherwise they are parked and merged into the
    /// upcoming decision.  Requires an awake mesh to resolve the paths.
    pub fn absorb_refine_paths(&mut self, paths: &[CellPath]) -> StepResult<()> {
        let mesh = self.mesh.as_ref().ok_or(StepError::MeshAsleep)?;
        let mut cells = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(cell) = mesh.resolve_path(path) {
                // An interior hit means we are already refined at least as
                // deep as the mirrored flag asks for.
                if mesh.is_active(cell) {
                    cells.push(cell);
                }
            }
        }
        if self.decided_this_sweep {
            if let Some(entry) = self.log.last_mut() {
                entry.union_refine(cells);
            }
        } else {
            self.extra_flags.union_refine(cells);
        }
        Ok(())
    }
}
