//! The `Timeline` struct: owned step sequence and sweep bookkeeping.

use ts_core::{SweepId, WindowPolicy};
use ts_step::TimeStep;

use crate::{TimelineError, TimelineResult};

/// An ordered sequence of owned time steps plus the per-pass window
/// policies, driving sweeps and passes over them.
///
/// `Timeline<S>` is generic over the step type; a problem mixing several
/// step types uses `S = Box<dyn TimeStep>` (a forwarding impl exists).
/// Steps are ordered by ascending time — the timeline does not enforce
/// this, but all directional-traversal semantics assume it, so callers are
/// responsible for insertion order.
///
/// The three window policies are fixed at construction.  They bound peak
/// resource usage: a pass keeps at most `look_ahead + look_back + 1` steps
/// awake at once.
pub struct Timeline<S: TimeStep> {
    pub(crate) steps: Vec<S>,
    current_sweep: SweepId,
    primal: WindowPolicy,
    dual: WindowPolicy,
    postprocess: WindowPolicy,
}

impl<S: TimeStep> Timeline<S> {
    pub fn new(primal: WindowPolicy, dual: WindowPolicy, postprocess: WindowPolicy) -> Self {
        Self {
            steps: Vec::new(),
            current_sweep: SweepId::ZERO,
            primal,
            dual,
            postprocess,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current_sweep(&self) -> SweepId {
        self.current_sweep
    }

    pub fn primal_policy(&self) -> WindowPolicy {
        self.primal
    }

    pub fn dual_policy(&self) -> WindowPolicy {
        self.dual
    }

    pub fn postprocess_policy(&self) -> WindowPolicy {
        self.postprocess
    }

    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    pub fn step(&self, position: usize) -> Option<&S> {
        self.steps.get(position)
    }

    pub fn step_mut(&mut self, position: usize) -> Option<&mut S> {
        self.steps.get_mut(position)
    }

    // ── Structural mutation ───────────────────────────────────────────────
    //
    // Inserting or removing a step leaves every step's position/neighbor
    // fields stale; they are refreshed wholesale by the next `start_sweep`.

    /// Append a step at the end of the sequence (ownership transfers to the
    /// timeline).
    pub fn push(&mut self, step: S) {
        self.steps.push(step);
    }

    /// Insert a step at `position` in `[0, len]`.
    pub fn insert(&mut self, position: usize, step: S) -> TimelineResult<()> {
        if position > self.steps.len() {
            return Err(TimelineError::InvalidPosition {
                requested: position,
                len: self.steps.len(),
            });
        }
        self.steps.insert(position, step);
        Ok(())
    }

    /// Remove and return the step at `position` in `[0, len)`.  Dropping
    /// the returned step destroys it.
    pub fn remove(&mut self, position: usize) -> TimelineResult<S> {
        if position >= self.steps.len() {
            return Err(TimelineError::InvalidPosition {
                requested: position,
                len: self.steps.len(),
            });
        }
        Ok(self.steps.remove(position))
    }

    // ── Sweep bookkeeping ─────────────────────────────────────────────────

    /// Begin sweep `sweep`: stamp every step's position, sweep number, and
    /// neighbor times, then call `init_sweep()` on each.
    ///
    /// Bookkeeping runs over the whole sequence before the first hook, so
    /// an `init_sweep` implementation can rely on its own fields — and its
    /// neighbors' — being current.
    pub fn start_sweep(&mut self, sweep: SweepId) {
        self.current_sweep = sweep;
        let times: Vec<f64> = self.steps.iter().map(|s| s.state().time()).collect();
        for (i, step) in self.steps.iter_mut().enumerate() {
            let prev_time = (i > 0).then(|| times[i - 1]);
            let next_time = times.get(i + 1).copied();
            step.state_mut().relink(i, sweep, prev_time, next_time);
        }
        for step in &mut self.steps {
            step.init_sweep();
        }
    }

    /// End the current sweep: call `end_sweep()` on every step in index
    /// order.
    pub fn end_sweep(&mut self) {
        for step in &mut self.steps {
            step.end_sweep();
        }
    }
}
