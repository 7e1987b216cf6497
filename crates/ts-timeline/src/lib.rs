//! `ts-timeline` — pass orchestrator for the rust_ts framework.
//!
//! # The pass loop
//!
//! ```text
//! timeline.start_sweep(s)          ① stamp position/sweep/neighbor times,
//!                                    then init_sweep() on every step
//! timeline.solve_primal()          ② one forward pass:
//!     init_primal() on all steps       init phase (sets pending kind)
//!     pre-roll wakes                   virtual steps -look_ahead..0
//!     per step: wake(0..=a) →          window slides over the sequence
//!               solve_primal() →
//!               sleep(0..=b)
//!     post-roll sleeps                 virtual steps n..n+look_back
//! timeline.solve_dual(Backward)    ③ same loop, mirrored indices
//! timeline.postprocess_steps()     ④ …
//! timeline.run_refinement(..)      ⑤ compute gets the predecessor too
//! timeline.end_sweep()             ⑥ end_sweep() on every step
//! ```
//!
//! Forward and backward share one loop body: all dispatch arithmetic lives
//! in logical step space and is mapped through `Direction::order` at the
//! last moment.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`timeline`] | `Timeline<S>` — owned step sequence, sweeps, wrappers  |
//! | [`pass`]     | `run_pass` traversal engine, `PassStep`                |
//! | [`observer`] | `PassObserver` trait, `NoopPassObserver`               |
//! | [`error`]    | `TimelineError`, `TimelineResult<T>`                   |

pub mod error;
pub mod observer;
pub mod pass;
pub mod timeline;


pub use error::{TimelineError, TimelineResult};
pub use observer::{NoopPassObserver, PassObserver};
pub use pass::PassStep;
pub use timeline::Timeline;
