//! `ts-mesh` — the mesh side of the rust_ts time-stepping framework.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`flags`]    | `FlagSet` (refine/coarsen cell sets)                     |
//! | [`mesh`]     | `RefinableMesh` trait, `CellPath`                        |
//! | [`history`]  | `FlagLog` — append-only per-sweep flag log with replay   |
//! | [`interval`] | `IntervalMesh` — concrete 1-D binary-refinement mesh     |
//! | [`error`]    | `MeshError`, `MeshResult<T>`                             |
//!
//! # Eviction model (summary)
//!
//! A mesh is expensive derived state.  Instead of persisting it while its
//! time step sleeps, the framework records each sweep's refine/coarsen
//! decision in a [`FlagLog`] and discards the mesh entirely:
//!
//! ```text
//! mesh = coarse.clone()
//! for entry in log:              # one entry per completed sweep
//!     mesh.apply_flags(entry)
//!     mesh.execute_coarsening_and_refinement()
//! ```
//!
//! Replay is bit-deterministic: the same log against the same coarse template
//! always reconstructs the same topology and the same `CellId` assignment.

pub mod error;
pub mod flags;
pub mod history;
pub mod interval;
pub mod mesh;

#[cfg(test)]
mod tests;

pub use error::{MeshError, MeshResult};
pub use flags::FlagSet;
pub use history::FlagLog;
pub use interval::IntervalMesh;
pub use mesh::{CellPath, RefinableMesh};
