//! Pass kinds — the work a step is asked to do next.

use std::fmt;

/// The kind of work pending on a step, set by the pass-specific `init_*`
/// hook before any wake/compute/sleep happens.
///
/// Wake hooks may branch on the pending kind (e.g. skip building a mesh for
/// a postprocess-only pass), which is why the init phase of a pass runs to
/// completion over all steps before the first wake is dispatched.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassKind {
    /// Solve the primal problem on this step.
    Primal,
    /// Solve the dual problem on this step.
    Dual,
    /// Postprocess the step's solution.
    Postprocess,
    /// Compute a refinement/coarsening decision for this step's mesh.
    Refinement,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PassKind::Primal => "primal",
            PassKind::Dual => "dual",
            PassKind::Postprocess => "postprocess",
            PassKind::Refinement => "refinement",
        };
        write!(f, "{name}")
    }
}
