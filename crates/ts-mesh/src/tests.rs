//! Unit tests for ts-mesh.

use ts_core::CellId;

use crate::{CellPath, FlagLog, FlagSet, IntervalMesh, MeshError, RefinableMesh};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn refine_set(cells: &[CellId]) -> FlagSet {
    let mut flags = FlagSet::new();
    flags.refine.extend(cells.iter().copied());
    flags
}

fn coarsen_set(cells: &[CellId]) -> FlagSet {
    let mut flags = FlagSet::new();
    flags.coarsen.extend(cells.iter().copied());
    flags
}

/// Apply + execute in one go.
fn run(mesh: &mut IntervalMesh, flags: &FlagSet) {
    mesh.apply_flags(flags).unwrap();
    mesh.execute_coarsening_and_refinement().unwrap();
}

fn levels(mesh: &IntervalMesh) -> Vec<u32> {
    mesh.active_cells()
        .iter()
        .map(|&c| mesh.level(c).unwrap())
        .collect()
}

// ── IntervalMesh basics ───────────────────────────────────────────────────────

#[cfg(test)]
mod interval {
    use super::*;

    #[test]
    fn empty_mesh_rejected() {
        assert!(matches!(IntervalMesh::new(0), Err(MeshError::NoRootCells)));
    }

    #[test]
    fn flat_mesh_active_cells() {
        let mesh = IntervalMesh::new(4).unwrap();
        assert_eq!(mesh.active_cell_count(), 4);
        assert_eq!(
            mesh.active_cells(),
            vec![CellId(0), CellId(1), CellId(2), CellId(3)]
        );
        assert_eq!(levels(&mesh), vec![0, 0, 0, 0]);
    }

    #[test]
    fn refine_replaces_leaf_with_two_children() {
        let mut mesh = IntervalMesh::new(2).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        assert_eq!(mesh.active_cell_count(), 3);
        // Children appended at the arena end, enumerated before the
        // untouched right root.
        assert_eq!(mesh.active_cells(), vec![CellId(2), CellId(3), CellId(1)]);
        assert_eq!(levels(&mesh), vec![1, 1, 0]);
        assert!(!mesh.is_active(CellId(0)));
    }

    #[test]
    fn coarsen_requires_complete_sibling_pair() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)])); // leaves: 1, 2

        // Only one child flagged: nothing merges.
        run(&mut mesh, &coarsen_set(&[CellId(1)]));
        assert_eq!(mesh.active_cell_count(), 2);

        // Both flagged: pair merges back into the root.
        run(&mut mesh, &coarsen_set(&[CellId(1), CellId(2)]));
        assert_eq!(mesh.active_cells(), vec![CellId(0)]);
    }

    #[test]
    fn refine_flag_vetoes_sibling_merge() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)])); // leaves: 1, 2

        let mut flags = coarsen_set(&[CellId(1), CellId(2)]);
        flags.refine.insert(CellId(2));
        run(&mut mesh, &flags);
        // No merge; cell 2 split instead.
        assert_eq!(mesh.active_cells(), vec![CellId(1), CellId(3), CellId(4)]);
    }

    #[test]
    fn flags_on_inactive_cell_rejected() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        // Cell 0 now has children.
        let err = mesh.apply_flags(&refine_set(&[CellId(0)])).unwrap_err();
        assert!(matches!(err, MeshError::CellNotActive(CellId(0))));
    }

    #[test]
    fn flags_on_unknown_cell_rejected() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        let err = mesh.apply_flags(&refine_set(&[CellId(99)])).unwrap_err();
        assert!(matches!(err, MeshError::UnknownCell(CellId(99))));
    }

    #[test]
    fn tombstoned_cells_stay_dead() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        run(&mut mesh, &coarsen_set(&[CellId(1), CellId(2)]));
        // Ids 1 and 2 are tombstones now.
        assert!(matches!(mesh.level(CellId(1)), Err(MeshError::UnknownCell(_))));
        assert!(!mesh.is_active(CellId(2)));
    }

    #[test]
    fn clear_flags_discards_staged() {
        let mut mesh = IntervalMesh::new(2).unwrap();
        mesh.apply_flags(&refine_set(&[CellId(0)])).unwrap();
        mesh.clear_flags();
        mesh.execute_coarsening_and_refinement().unwrap();
        assert_eq!(mesh.active_cell_count(), 2);
    }
}

// ── Predicted cell counts ─────────────────────────────────────────────────────

#[cfg(test)]
mod predicted {
    use super::*;

    #[test]
    fn refine_nets_plus_one_each() {
        let mesh = IntervalMesh::new(4).unwrap();
        let flags = refine_set(&[CellId(0), CellId(2)]);
        assert_eq!(mesh.predicted_active_cells(&flags), 6);
    }

    #[test]
    fn merge_nets_minus_one_per_pair() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        let flags = coarsen_set(&[CellId(1), CellId(2)]);
        assert_eq!(mesh.predicted_active_cells(&flags), 1);
    }

    #[test]
    fn incomplete_pair_predicts_no_change() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        let flags = coarsen_set(&[CellId(1)]);
        assert_eq!(mesh.predicted_active_cells(&flags), 2);
    }

    #[test]
    fn prediction_matches_execution() {
        let mut mesh = IntervalMesh::new(3).unwrap();
        run(&mut mesh, &refine_set(&[CellId(1)]));
        let mut flags = refine_set(&[CellId(0), CellId(3)]);
        flags.coarsen.insert(CellId(4));
        let predicted = mesh.predicted_active_cells(&flags);
        run(&mut mesh, &flags);
        assert_eq!(mesh.active_cell_count(), predicted);
    }
}

// ── Flag smoothing ────────────────────────────────────────────────────────────

#[cfg(test)]
mod smoothing {
    use super::*;

    #[test]
    fn deep_refine_next_to_root_adds_ladder() {
        // Mesh: [0 refined twice on its right edge] [1 at level 0].
        let mut mesh = IntervalMesh::new(2).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)])); // leaves 2,3,1
        run(&mut mesh, &refine_set(&[CellId(3)])); // leaves 2,4,5,1

        // Refining 5 (level 2 -> 3) next to root 1 (level 0) must drag 1 up.
        let mut flags = refine_set(&[CellId(5)]);
        mesh.smooth_flags(&mut flags);
        assert!(flags.refine.contains(&CellId(1)));
        // Leaf 2 (level 1) borders 4 (level 2), a difference of one: it
        // must stay unflagged.
        assert!(!flags.refine.contains(&CellId(2)));
    }

    #[test]
    fn coarsen_flag_removed_instead_of_refine_added() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)])); // leaves 1,2
        run(&mut mesh, &refine_set(&[CellId(1)])); // leaves 3,4,2

        run(&mut mesh, &refine_set(&[CellId(4)])); // leaves 3,5,6,2

        // Refining 6 to level 3 next to 2 (level 1, flagged for coarsening):
        // smoothing first cancels the coarsen flag, then promotes 2.
        let mut flags = refine_set(&[CellId(6)]);
        flags.coarsen.insert(CellId(2));
        mesh.smooth_flags(&mut flags);
        assert!(flags.refine.contains(&CellId(2)));
        assert!(!flags.coarsen.contains(&CellId(2)));
    }

    #[test]
    fn balanced_flags_untouched() {
        let mut mesh = IntervalMesh::new(2).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        let mut flags = refine_set(&[CellId(1)]);
        let before = flags.clone();
        mesh.smooth_flags(&mut flags);
        assert_eq!(flags, before);
    }
}

// ── Cell paths ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod paths {
    use super::*;

    #[test]
    fn path_roundtrip_on_same_mesh() {
        let mut mesh = IntervalMesh::new(2).unwrap();
        run(&mut mesh, &refine_set(&[CellId(1)]));
        run(&mut mesh, &refine_set(&[CellId(3)]));
        for cell in mesh.active_cells() {
            let path = mesh.path_of(cell).unwrap();
            assert_eq!(mesh.resolve_path(&path), Some(cell));
        }
    }

    #[test]
    fn path_resolves_to_ancestor_on_coarser_mesh() {
        let mut fine = IntervalMesh::new(2).unwrap();
        run(&mut fine, &refine_set(&[CellId(0)]));
        let deep = fine.active_cells()[0]; // level-1 left child
        let path = fine.path_of(deep).unwrap();

        let coarse = IntervalMesh::new(2).unwrap();
        // Coarse mesh has no children: resolution stops at the root cell.
        assert_eq!(coarse.resolve_path(&path), Some(CellId(0)));
    }

    #[test]
    fn unknown_root_unresolved() {
        let mesh = IntervalMesh::new(1).unwrap();
        let path = CellPath { root: 5, turns: vec![] };
        assert_eq!(mesh.resolve_path(&path), None);
    }

    #[test]
    fn turn_beyond_branching_factor_unresolved() {
        let mut mesh = IntervalMesh::new(1).unwrap();
        run(&mut mesh, &refine_set(&[CellId(0)]));
        // The struct's fields are public, so a hand-built path can carry a
        // turn no binary split produces.
        let path = CellPath { root: 0, turns: vec![2] };
        assert_eq!(mesh.resolve_path(&path), None);
    }
}

// ── FlagLog replay ────────────────────────────────────────────────────────────

#[cfg(test)]
mod history {
    use super::*;

    /// Drive a mesh through `sweeps` synthetic decisions, logging each one,
    /// and return the final mesh plus the log.
    fn grow(coarse: &IntervalMesh, sweeps: usize) -> (IntervalMesh, FlagLog) {
        let mut mesh = coarse.clone();
        let mut log = FlagLog::new();
        for s in 0..sweeps {
            // Refine every third active cell, offset per sweep.
            let active = mesh.active_cells();
            let flags = refine_set(
                &active.iter().copied().skip(s % 3).step_by(3).collect::<Vec<_>>(),
            );
            mesh.apply_flags(&flags).unwrap();
            mesh.execute_coarsening_and_refinement().unwrap();
            log.push(flags);
        }
        (mesh, log)
    }

    #[test]
    fn replay_reconstructs_identical_topology() {
        let coarse = IntervalMesh::new(5).unwrap();
        for sweeps in 0..5 {
            let (original, log) = grow(&coarse, sweeps);
            let rebuilt = log.replay(&coarse).unwrap();
            assert_eq!(rebuilt.active_cell_count(), original.active_cell_count());
            assert_eq!(rebuilt.active_cells(), original.active_cells());
            assert_eq!(levels(&rebuilt), levels(&original));
        }
    }

    #[test]
    fn replay_with_coarsening_entries() {
        let coarse = IntervalMesh::new(1).unwrap();
        let mut mesh = coarse.clone();
        let mut log = FlagLog::new();

        let refine = refine_set(&[CellId(0)]);
        run(&mut mesh, &refine);
        log.push(refine);

        let coarsen = coarsen_set(&[CellId(1), CellId(2)]);
        run(&mut mesh, &coarsen);
        log.push(coarsen);

        let rebuilt = log.replay(&coarse).unwrap();
        assert_eq!(rebuilt.active_cells(), mesh.active_cells());
    }

    #[test]
    fn replay_onto_catches_up_live_mesh() {
        let coarse = IntervalMesh::new(3).unwrap();
        let (full, log) = grow(&coarse, 4);

        // A mesh that only saw the first two entries.
        let mut stale = coarse.clone();
        let replayed = log.replay_onto(&mut stale, 0).unwrap();
        assert_eq!(replayed, 4);
        assert_eq!(stale.active_cells(), full.active_cells());

        // Partial catch-up: rebuild to entry 2, then finish.
        let mut partial = coarse.clone();
        for entry in &log.entries()[..2] {
            partial.apply_flags(entry).unwrap();
            partial.execute_coarsening_and_refinement().unwrap();
        }
        log.replay_onto(&mut partial, 2).unwrap();
        assert_eq!(partial.active_cells(), full.active_cells());
    }

    #[test]
    fn empty_log_replay_is_coarse_clone() {
        let coarse = IntervalMesh::new(4).unwrap();
        let rebuilt = FlagLog::new().replay(&coarse).unwrap();
        assert_eq!(rebuilt.active_cells(), coarse.active_cells());
    }
}
