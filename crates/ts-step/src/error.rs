use thiserror::Error;

use ts_core::{Signal, SweepId};
use ts_mesh::MeshError;

#[derive(Debug, Error)]
pub enum StepError {
    /// Requested a timestep length toward a neighbor that does not exist
    /// (first/last step of the sequence).
    #[error("step at t={time} has no {direction} neighbor: cannot compute timestep")]
    NoNeighbor { direction: &'static str, time: f64 },

    /// A pass invoked an operation the step never implemented.  Deliberately
    /// an error rather than a silent no-op, to catch accidental dual or
    /// postprocess passes on problems without those phases.
    #[error("`{0}` invoked on a step that does not implement it")]
    Unimplemented(&'static str),

    /// A mesh operation ran while the slot holds no mesh.
    #[error("mesh operation requires an awake mesh, but the slot is asleep")]
    MeshAsleep,

    #[error("wake level {level} lies outside the pass window (look-ahead {limit})")]
    WakeLevelOutOfWindow { level: Signal, limit: u32 },

    #[error("sleep level {level} lies outside the pass window (look-back {limit})")]
    SleepLevelOutOfWindow { level: Signal, limit: u32 },

    #[error("invalid cell-number corridor: need top >= bottom >= 0, got top {top}, bottom {bottom}")]
    InvalidCorridor { top: f64, bottom: f64 },

    #[error("criteria length {got} does not match active cell count {expected}")]
    CriteriaCountMismatch { expected: usize, got: usize },

    /// A second refinement decision in one sweep would corrupt the
    /// one-entry-per-sweep flag log.
    #[error("refinement flags for {sweep} were already stored")]
    FlagsAlreadyStored { sweep: SweepId },

    #[error("relaxation table parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type StepResult<T> = Result<T, StepError>;
