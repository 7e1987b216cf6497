//! Pass observer trait for progress reporting and traversal tracing.

use ts_core::Signal;

/// Callbacks invoked by [`Timeline::run_pass`][crate::Timeline::run_pass]
/// at every dispatch point of a pass.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Positions are sequence indices (not
/// logical traversal steps), so forward and backward passes report the same
/// positions for the same steps.
///
/// # Example — wake/sleep tracer
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Tracer { events: Vec<String> }
///
/// impl PassObserver for Tracer {
///     fn on_wake(&mut self, position: usize, signal: Signal) {
///         self.events.push(format!("wake {position} {signal}"));
///     }
/// }
/// ```
pub trait PassObserver {
    /// Called once per step during the init phase, before any wake.
    fn on_init(&mut self, _position: usize) {}

    /// Called immediately before `wake_up(signal)` is dispatched to the
    /// step at `position`.
    fn on_wake(&mut self, _position: usize, _signal: Signal) {}

    /// Called immediately before the compute callback runs on the step at
    /// `position`.
    fn on_compute(&mut self, _position: usize) {}

    /// Called immediately before `sleep(signal)` is dispatched to the step
    /// at `position`.
    fn on_sleep(&mut self, _position: usize, _signal: Signal) {}

    /// Called once after the post-roll completes.
    fn on_pass_end(&mut self) {}
}

/// A [`PassObserver`] that does nothing.  Used by the pass wrappers and
/// anywhere callbacks are not needed.
pub struct NoopPassObserver;

impl PassObserver for NoopPassObserver {}
