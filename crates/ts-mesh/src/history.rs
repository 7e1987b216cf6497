//! `FlagLog` — append-only refinement history with deterministic replay.
//!
//! # Why this exists
//!
//! A refined mesh is expensive to keep but cheap to re-derive: the coarse
//! template is the arena seed and the per-sweep flag decisions are an
//! append-only log.  Storing the log instead of the mesh lets a sleeping
//! time step drop megabytes of topology and reconstruct it bit-identically
//! the next time it wakes.
//!
//! One entry is appended per sweep (by the step's refinement decision), so
//! `log.len()` equals the number of sweeps with a recorded decision.

use crate::{FlagSet, MeshResult, RefinableMesh};

/// Append-only log of per-sweep refine/coarsen decisions.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlagLog {
    entries: Vec<FlagSet>,
}

impl FlagLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded sweeps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one sweep's final decision.
    pub fn push(&mut self, flags: FlagSet) {
        self.entries.push(flags);
    }

    pub fn entries(&self) -> &[FlagSet] {
        &self.entries
    }

    /// The most recent entry, for unioning in flags mirrored from a
    /// neighboring step after this step already decided.
    pub fn last_mut(&mut self) -> Option<&mut FlagSet> {
        self.entries.last_mut()
    }

    /// Rebuild a mesh from scratch: clone the coarse template and replay
    /// every entry in order.
    pub fn replay<M: RefinableMesh>(&self, coarse: &M) -> MeshResult<M> {
        let mut mesh = coarse.clone();
        self.replay_onto(&mut mesh, 0)?;
        Ok(mesh)
    }

    /// Replay `entries[from..]` onto a live mesh whose topology already
    /// reflects the first `from` entries.  Returns the new replayed count
    /// (always `self.len()`).
    ///
    /// This is the catch-up path for meshes kept alive across sweeps.
    pub fn replay_onto<M: RefinableMesh>(&self, mesh: &mut M, from: usize) -> MeshResult<usize> {
        for entry in &self.entries[from..] {
            mesh.apply_flags(entry)?;
            mesh.execute_coarsening_and_refinement()?;
        }
        Ok(self.entries.len())
    }
}
