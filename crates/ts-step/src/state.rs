//! `StepState` — the bookkeeping every time step carries.
//!
//! # Design
//!
//! The original design for this kind of scheduler wires steps together with
//! non-owning neighbor pointers that a privileged mutator refreshes on every
//! structural change.  Here the timeline is the single owner of adjacency:
//! at the start of each sweep it stamps every step's position, sweep number,
//! and the *times* of its neighbors.  Steps never hold references to each
//! other, so inserting or removing a step can never leave a dangling link —
//! only stale numbers that the next `start_sweep` refreshes.

use ts_core::{PassKind, SweepId};

use crate::{StepError, StepResult};

/// Per-step bookkeeping.  Embed one in every [`TimeStep`][crate::TimeStep]
/// implementor and hand it out through `state()`/`state_mut()`.
#[derive(Clone, Debug)]
pub struct StepState {
    /// The time value of this step.  Immutable after construction.
    time: f64,
    /// Sweep number, stamped by the timeline at `start_sweep`.
    sweep: SweepId,
    /// Position in the step sequence.  Only valid within a sweep: stamped at
    /// `start_sweep`, stale after any insert/remove until the next one.
    position: usize,
    /// Time of the sequence predecessor, if any.  Stamped with `position`.
    prev_time: Option<f64>,
    /// Time of the sequence successor, if any.  Stamped with `position`.
    next_time: Option<f64>,
    /// What the current pass will ask this step to do, set by the pass's
    /// `init_*` hook before any wake call.
    pending: Option<PassKind>,
}

impl StepState {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            sweep: SweepId::ZERO,
            position: 0,
            prev_time: None,
            next_time: None,
            pending: None,
        }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn sweep(&self) -> SweepId {
        self.sweep
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn pending(&self) -> Option<PassKind> {
        self.pending
    }

    /// Record the work the current pass will perform on this step.  Called
    /// by the `init_*` hooks; overriders must do this before any preparation
    /// that branches on the pending kind.
    #[inline]
    pub fn set_pending(&mut self, kind: PassKind) {
        self.pending = Some(kind);
    }

    /// Length of the timestep from the predecessor to this step.
    pub fn backward_timestep(&self) -> StepResult<f64> {
        match self.prev_time {
            Some(prev) => Ok(self.time - prev),
            None => Err(StepError::NoNeighbor { direction: "backward", time: self.time }),
        }
    }

    /// Length of the timestep from this step to the successor.
    pub fn forward_timestep(&self) -> StepResult<f64> {
        match self.next_time {
            Some(next) => Ok(next - self.time),
            None => Err(StepError::NoNeighbor { direction: "forward", time: self.time }),
        }
    }

    /// Refresh the timeline-owned fields.
    ///
    /// This is the timeline's privileged mutator, invoked from
    /// `start_sweep` — user code has no reason to call it.
    pub fn relink(
        &mut self,
        position: usize,
        sweep: SweepId,
        prev_time: Option<f64>,
        next_time: Option<f64>,
    ) {
        self.position = position;
        self.sweep = sweep;
        self.prev_time = prev_time;
        self.next_time = next_time;
    }
}
