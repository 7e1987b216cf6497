use thiserror::Error;

use ts_step::StepError;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("position {requested} out of range for a sequence of {len} steps")]
    InvalidPosition { requested: usize, len: usize },

    /// The orchestrator's own index bookkeeping was found inconsistent.
    /// Defensive: never expected under correct use.
    #[error("internal bookkeeping error: {0}")]
    Internal(String),

    #[error(transparent)]
    Step(#[from] StepError),
}

pub type TimelineResult<T> = Result<T, TimelineError>;
