//! The `TimeStep` trait — the main extension point for user code.

use ts_core::{PassKind, Signal};

use crate::{StepError, StepResult, StepState};

/// One time level of a time-dependent problem.
///
/// Implement this trait to define what a step does in each pass.  The
/// timeline drives the hooks in a fixed order: `init_*` on every step, then
/// per step `wake_up` (with descending-distance signals), the pass's solve
/// hook, and `sleep`.
///
/// # Required methods
///
/// Only [`state`][Self::state]/[`state_mut`][Self::state_mut] (hand out the
/// embedded [`StepState`]) and [`solve_primal`][Self::solve_primal] are
/// required.  `solve_dual` and `postprocess_step` default to
/// [`StepError::Unimplemented`] so that running a dual or postprocess pass
/// over a problem without those phases fails loudly instead of silently
/// doing nothing.
///
/// # Overriding `init_*`
///
/// The default `init_*` hooks record the pending pass kind.  Overriders must
/// set the pending kind *first* (`self.state_mut().set_pending(..)`), then
/// run their own preparation — later hooks (including `wake_up`) branch on
/// it.
///
/// # Example
///
/// ```rust,ignore
/// struct DiffusionStep {
///     state: StepState,
///     slot:  MeshSlot<IntervalMesh>,
/// }
///
/// impl TimeStep for DiffusionStep {
///     fn state(&self) -> &StepState { &self.state }
///     fn state_mut(&mut self) -> &mut StepState { &mut self.state }
///
///     fn init_sweep(&mut self) {
///         self.slot.begin_sweep(self.state.sweep());
///     }
///     fn wake_up(&mut self, signal: Signal) -> StepResult<()> {
///         self.slot.wake_up(signal)
///     }
///     fn sleep(&mut self, signal: Signal) -> StepResult<()> {
///         self.slot.sleep(signal)
///     }
///     fn solve_primal(&mut self) -> StepResult<()> {
///         let dt = self.state.backward_timestep()?;
///         // assemble and solve on self.slot.mesh()? ...
///         Ok(())
///     }
/// }
/// ```
pub trait TimeStep {
    /// The embedded bookkeeping state.
    fn state(&self) -> &StepState;
    fn state_mut(&mut self) -> &mut StepState;

    /// Called when this step enters a pass's look-ahead window, once per
    /// signal distance from `look_ahead` down to 0.  Materialize expensive
    /// resources here.  Base behavior: nothing.
    fn wake_up(&mut self, _signal: Signal) -> StepResult<()> {
        Ok(())
    }

    /// Symmetric to [`wake_up`][Self::wake_up]: called as this step falls
    /// out of the look-back window, signals 0 up to `look_back`.  Release
    /// expensive resources here.  Base behavior: nothing.
    fn sleep(&mut self, _signal: Signal) -> StepResult<()> {
        Ok(())
    }

    /// Called once per sweep, after the timeline refreshed this step's
    /// position/sweep/neighbor fields — they are current by the time this
    /// runs.
    fn init_sweep(&mut self) {}

    /// Called once at the end of a sweep.
    fn end_sweep(&mut self) {}

    fn init_primal(&mut self) {
        self.state_mut().set_pending(PassKind::Primal);
    }

    fn init_dual(&mut self) {
        self.state_mut().set_pending(PassKind::Dual);
    }

    fn init_postprocess(&mut self) {
        self.state_mut().set_pending(PassKind::Postprocess);
    }

    fn init_refinement(&mut self) {
        self.state_mut().set_pending(PassKind::Refinement);
    }

    /// Solve the primal problem on this step.  Every concrete step must
    /// implement this.
    fn solve_primal(&mut self) -> StepResult<()>;

    /// Solve the dual problem on this step.
    fn solve_dual(&mut self) -> StepResult<()> {
        Err(StepError::Unimplemented("solve_dual"))
    }

    /// Postprocess this step's solution.
    fn postprocess_step(&mut self) -> StepResult<()> {
        Err(StepError::Unimplemented("postprocess_step"))
    }
}

// Forwarding impl so heterogeneous sequences can use `Box<dyn TimeStep>` as
// the timeline's step type.  Every method forwards — including the
// defaulted ones, so an override behind the box is never shadowed by a
// trait default.
impl<T: TimeStep + ?Sized> TimeStep for Box<T> {
    fn state(&self) -> &StepState {
        (**self).state()
    }
    fn state_mut(&mut self) -> &mut StepState {
        (**self).state_mut()
    }
    fn wake_up(&mut self, signal: Signal) -> StepResult<()> {
        (**self).wake_up(signal)
    }
    fn sleep(&mut self, signal: Signal) -> StepResult<()> {
        (**self).sleep(signal)
    }
    fn init_sweep(&mut self) {
        (**self).init_sweep()
    }
    fn end_sweep(&mut self) {
        (**self).end_sweep()
    }
    fn init_primal(&mut self) {
        (**self).init_primal()
    }
    fn init_dual(&mut self) {
        (**self).init_dual()
    }
    fn init_postprocess(&mut self) {
        (**self).init_postprocess()
    }
    fn init_refinement(&mut self) {
        (**self).init_refinement()
    }
    fn solve_primal(&mut self) -> StepResult<()> {
        (**self).solve_primal()
    }
    fn solve_dual(&mut self) -> StepResult<()> {
        (**self).solve_dual()
    }
    fn postprocess_step(&mut self) -> StepResult<()> {
        (**self).postprocess_step()
    }
}
