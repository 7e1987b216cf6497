//! Wake/sleep signals, look-ahead/look-back window policies, and traversal
//! direction.
//!
//! # Design
//!
//! A pass over the step sequence keeps a sliding window of steps awake: the
//! `look_ahead` steps in front of the one being computed on, and the
//! `look_back` steps behind it.  Steps entering the window receive
//! `wake_up(signal)` calls, steps leaving it receive `sleep(signal)` calls,
//! where the signal is the integer distance from the computed-on step.
//!
//! Signal 0 is deliberately kept as an explicit call (rather than folded into
//! the compute callback) so that all resource management can be routed
//! through the wake/sleep hooks uniformly.
//!
//! Forward and backward traversals share a single loop body: every dispatch
//! site works in *logical* step space and maps to a sequence index through
//! [`Direction::order`] at the last moment.  There are no per-direction code
//! paths anywhere in the framework.

use std::fmt;

// ── Signal ────────────────────────────────────────────────────────────────────

/// Distance between a woken/slept step and the step currently being computed
/// on, in traversal direction.
///
/// `Signal(0)` means "you are about to be computed on"; `Signal(k)` means
/// "you are `k` steps away".  Steps branch on the signal value to decide how
/// much of their resource state to materialize or release.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal(pub u32);

impl Signal {
    pub const ZERO: Signal = Signal(0);
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

// ── WindowPolicy ──────────────────────────────────────────────────────────────

/// How many neighboring steps a pass keeps awake around the computed-on step.
///
/// Fixed at timeline construction (immutable policy).  The window bounds the
/// peak resource usage of a pass: at most [`max_awake`][Self::max_awake]
/// steps hold their expensive state simultaneously.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowPolicy {
    /// Steps ahead of the computed-on step that must already be awake.
    pub look_ahead: u32,
    /// Steps behind the computed-on step that are kept awake before being
    /// put back to sleep.
    pub look_back: u32,
}

impl WindowPolicy {
    /// A window keeping only the computed-on step awake.
    pub const NONE: WindowPolicy = WindowPolicy { look_ahead: 0, look_back: 0 };

    pub fn new(look_ahead: u32, look_back: u32) -> Self {
        Self { look_ahead, look_back }
    }

    /// Upper bound on the number of simultaneously awake steps during a pass
    /// run under this policy.
    #[inline]
    pub fn max_awake(&self) -> u32 {
        self.look_ahead + self.look_back + 1
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Traversal direction of a pass over the step sequence.
///
/// Primal and postprocess passes conventionally run [`Forward`][Self::Forward]
/// (ascending time); dual problems commonly run [`Backward`][Self::Backward].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Map a logical traversal step in `[0, len)` to a sequence index.
    ///
    /// `Forward` is the identity; `Backward` mirrors the sequence.  All
    /// wake/compute/sleep dispatch arithmetic is written once in logical
    /// space and routed through this mapping, so both directions exercise
    /// the same loop body.
    #[inline]
    pub fn order(self, step: usize, len: usize) -> usize {
        debug_assert!(step < len);
        match self {
            Direction::Forward => step,
            Direction::Backward => len - 1 - step,
        }
    }

    pub fn reversed(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}
