//! The pass traversal engine: windowed wake/compute/sleep dispatch.

use ts_core::{Direction, Signal, WindowPolicy};
use ts_step::TimeStep;

use crate::{NoopPassObserver, PassObserver, Timeline, TimelineError, TimelineResult};

/// What the compute callback sees for one traversal step.
///
/// `previous` is the *sequence-order* predecessor (the step at
/// `position - 1`) regardless of traversal direction — it is how a
/// refinement decision reaches the earlier time level's mesh without steps
/// holding references to each other.
pub struct PassStep<'a, S> {
    pub current: &'a mut S,
    pub previous: Option<&'a mut S>,
    /// Sequence index of `current`.
    pub position: usize,
}

impl<S: TimeStep> Timeline<S> {
    /// Run one pass over the whole sequence.
    ///
    /// Phases, in order:
    ///
    /// 1. **Init**: `init` on every step in traversal order, so each step's
    ///    pending pass kind is set before any wake hook can branch on it.
    /// 2. **Pre-roll**: for virtual traversal steps `-look_ahead..0`, wake
    ///    in-range steps at the matching look-ahead signals.  The first few
    ///    real steps are therefore fully awake — having seen the complete
    ///    signal ladder down from `look_ahead` — before any compute runs.
    /// 3. **Main**: per real step, wakes with ascending signals
    ///    `0..=look_ahead` (targets ahead in traversal direction), then the
    ///    compute callback, then sleeps with ascending signals
    ///    `0..=look_back` (targets behind).
    /// 4. **Post-roll**: for virtual steps `n..n + look_back`, the trailing
    ///    sleep signals still owed to the last steps.
    ///
    /// Net effect: every step receives exactly one wake per signal in
    /// `[0, look_ahead]` and one sleep per signal in `[0, look_back]`, with
    /// all its wakes before its compute and all its sleeps after.
    ///
    /// A failing callback aborts the pass immediately; steps left awake are
    /// the caller's to retry sleeping — there is no rollback.
    pub fn run_pass<I, C, O>(
        &mut self,
        mut init: I,
        mut compute: C,
        policy: WindowPolicy,
        direction: Direction,
        observer: &mut O,
    ) -> TimelineResult<()>
    where
        I: FnMut(&mut S),
        C: FnMut(PassStep<'_, S>) -> TimelineResult<()>,
        O: PassObserver,
    {
        let n = self.steps.len();
        if n == 0 {
            return Ok(());
        }
        let ahead = policy.look_ahead as i64;
        let back = policy.look_back as i64;

        // ── Phase 1: init every step ──────────────────────────────────────
        for i in 0..n {
            let position = direction.order(i, n);
            observer.on_init(position);
            init(&mut self.steps[position]);
        }

        // ── Phase 2: pre-roll wakes ───────────────────────────────────────
        for virtual_step in -ahead..0 {
            for signal in 0..=ahead {
                let target = virtual_step + signal;
                if (0..n as i64).contains(&target) {
                    let position = direction.order(target as usize, n);
                    dispatch_wake(&mut self.steps, position, Signal(signal as u32), observer)?;
                }
            }
        }

        // ── Phase 3: main loop ────────────────────────────────────────────
        for i in 0..n {
            // Wakes: the computed-on step (signal 0) and the steps ahead.
            for signal in 0..=ahead {
                let target = i as i64 + signal;
                if (0..n as i64).contains(&target) {
                    let position = direction.order(target as usize, n);
                    dispatch_wake(&mut self.steps, position, Signal(signal as u32), observer)?;
                }
            }

            // Compute, with split-borrow access to the sequence predecessor.
            let position = direction.order(i, n);
            observer.on_compute(position);
            let (left, right) = self.steps.split_at_mut(position);
            let (current, _) = right.split_first_mut().ok_or_else(|| {
                TimelineError::Internal(format!("compute position {position} out of bounds"))
            })?;
            compute(PassStep { current, previous: left.last_mut(), position })?;

            // Sleeps: the just-computed step (signal 0) and the steps behind.
            for signal in 0..=back {
                let target = i as i64 - signal;
                if (0..n as i64).contains(&target) {
                    let position = direction.order(target as usize, n);
                    dispatch_sleep(&mut self.steps, position, Signal(signal as u32), observer)?;
                }
            }
        }

        // ── Phase 4: post-roll sleeps ─────────────────────────────────────
        for virtual_step in n as i64..n as i64 + back {
            for signal in 0..=back {
                let target = virtual_step - signal;
                if (0..n as i64).contains(&target) {
                    let position = direction.order(target as usize, n);
                    dispatch_sleep(&mut self.steps, position, Signal(signal as u32), observer)?;
                }
            }
        }

        observer.on_pass_end();
        Ok(())
    }

    // ── Pass wrappers ─────────────────────────────────────────────────────

    /// Forward pass pairing `init_primal` with `solve_primal`, under the
    /// primal window policy.
    pub fn solve_primal(&mut self) -> TimelineResult<()> {
        let policy = self.primal_policy();
        self.run_pass(
            |step| step.init_primal(),
            |ctx| ctx.current.solve_primal().map_err(TimelineError::from),
            policy,
            Direction::Forward,
            &mut NoopPassObserver,
        )
    }

    /// Pass pairing `init_dual` with `solve_dual`, under the dual window
    /// policy.  Dual problems commonly run backward in time, but the
    /// direction is the caller's choice.
    pub fn solve_dual(&mut self, direction: Direction) -> TimelineResult<()> {
        let policy = self.dual_policy();
        self.run_pass(
            |step| step.init_dual(),
            |ctx| ctx.current.solve_dual().map_err(TimelineError::from),
            policy,
            direction,
            &mut NoopPassObserver,
        )
    }

    /// Forward pass pairing `init_postprocess` with `postprocess_step`,
    /// under the postprocess window policy.
    pub fn postprocess_steps(&mut self) -> TimelineResult<()> {
        let policy = self.postprocess_policy();
        self.run_pass(
            |step| step.init_postprocess(),
            |ctx| ctx.current.postprocess_step().map_err(TimelineError::from),
            policy,
            Direction::Forward,
            &mut NoopPassObserver,
        )
    }

    /// Refinement pass: presets `init_refinement` and hands the compute
    /// callback the full [`PassStep`] so it can reach the predecessor's
    /// mesh (cell-number correction, flag mirroring).
    ///
    /// The window policy is explicit because refinement windows depend on
    /// the problem (the policy must keep the predecessor's mesh awake when
    /// correction or mirroring is enabled).
    pub fn run_refinement<C>(
        &mut self,
        compute: C,
        policy: WindowPolicy,
        direction: Direction,
    ) -> TimelineResult<()>
    where
        C: FnMut(PassStep<'_, S>) -> TimelineResult<()>,
    {
        self.run_pass(
            |step| step.init_refinement(),
            compute,
            policy,
            direction,
            &mut NoopPassObserver,
        )
    }
}

// ── Dispatch helpers ──────────────────────────────────────────────────────────

fn dispatch_wake<S: TimeStep, O: PassObserver>(
    steps: &mut [S],
    position: usize,
    signal: Signal,
    observer: &mut O,
) -> TimelineResult<()> {
    observer.on_wake(position, signal);
    steps[position].wake_up(signal)?;
    Ok(())
}

fn dispatch_sleep<S: TimeStep, O: PassObserver>(
    steps: &mut [S],
    position: usize,
    signal: Signal,
    observer: &mut O,
) -> TimelineResult<()> {
    observer.on_sleep(position, signal);
    steps[position].sleep(signal)?;
    Ok(())
}
