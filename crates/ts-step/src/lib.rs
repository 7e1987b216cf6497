//! `ts-step` — the lifecycle of a single time level.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`state`]  | `StepState` — per-step bookkeeping set by the timeline     |
//! | [`step`]   | `TimeStep` trait — wake/sleep/init/solve hooks             |
//! | [`slot`]   | `MeshSlot<M>` — evictable mesh with flag-log rebuild       |
//! | [`refine`] | `RefinementPolicy`, corridor correction, flag mirroring    |
//! | [`loader`] | CSV loader for per-sweep relaxation tables                 |
//! | [`error`]  | `StepError`, `StepResult<T>`                               |
//!
//! # Lifecycle (summary)
//!
//! Within one pass, every step cycles through
//!
//! ```text
//! init_*          (sets the pending pass kind)
//! wake_up(s)      for s = look_ahead .. 0   (resources materialize)
//! solve_* / postprocess_step / refinement decision
//! sleep(s)        for s = 0 .. look_back    (resources released)
//! ```
//!
//! The base hooks are no-ops; [`MeshSlot`] is the building block that turns
//! wake/sleep signals into lazy mesh construction and eviction.

pub mod error;
pub mod loader;
pub mod refine;
pub mod slot;
pub mod state;
pub mod step;


pub use error::{StepError, StepResult};
pub use loader::{load_relaxations_csv, load_relaxations_reader};
pub use refine::{CellCorridor, RefineData, RefineOutcome, RefinementPolicy, RelaxationTable};
pub use slot::{MeshSlot, WakeFlags};
pub use state::StepState;
pub use step::TimeStep;
