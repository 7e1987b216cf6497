//! `ts-core` — foundational value types for the `rust_ts` time-stepping
//! framework.
//!
//! This crate is a dependency of every other `ts-*` crate.  It intentionally
//! has no `ts-*` dependencies and no required external ones (only optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`ids`]     | `SweepId`, `CellId`                                     |
//! | [`window`]  | `Signal`, `WindowPolicy`, `Direction`                   |
//! | [`pass`]    | `PassKind`                                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.       |

pub mod ids;
pub mod pass;
pub mod window;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ids::{CellId, SweepId};
pub use pass::PassKind;
pub use window::{Direction, Signal, WindowPolicy};
