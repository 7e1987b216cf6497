//! Unit tests for ts-core.

use crate::{CellId, Direction, PassKind, Signal, SweepId, WindowPolicy};

// ── Ids ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ids {
    use super::*;

    #[test]
    fn invalid_sentinel_is_default() {
        assert_eq!(CellId::default(), CellId::INVALID);
        assert_eq!(SweepId::default(), SweepId::INVALID);
    }

    #[test]
    fn index_roundtrip() {
        let c = CellId(7);
        assert_eq!(c.index(), 7);
        assert_eq!(CellId::try_from(7usize).unwrap(), c);
    }

    #[test]
    fn sweep_offset() {
        assert_eq!(SweepId::ZERO.offset(3), SweepId(3));
    }

    #[test]
    fn display_formats() {
        assert_eq!(CellId(3).to_string(), "CellId(3)");
        assert_eq!(Signal(2).to_string(), "S2");
    }
}

// ── WindowPolicy ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod window {
    use super::*;

    #[test]
    fn max_awake_bound() {
        assert_eq!(WindowPolicy::NONE.max_awake(), 1);
        assert_eq!(WindowPolicy::new(1, 1).max_awake(), 3);
        assert_eq!(WindowPolicy::new(2, 3).max_awake(), 6);
    }

    #[test]
    fn default_is_none() {
        assert_eq!(WindowPolicy::default(), WindowPolicy::NONE);
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod direction {
    use super::*;

    #[test]
    fn forward_is_identity() {
        for i in 0..5 {
            assert_eq!(Direction::Forward.order(i, 5), i);
        }
    }

    #[test]
    fn backward_mirrors() {
        let mapped: Vec<usize> = (0..5).map(|i| Direction::Backward.order(i, 5)).collect();
        assert_eq!(mapped, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn single_element_sequence() {
        assert_eq!(Direction::Forward.order(0, 1), 0);
        assert_eq!(Direction::Backward.order(0, 1), 0);
    }

    #[test]
    fn reversed() {
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Backward.reversed(), Direction::Forward);
    }
}

// ── PassKind ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pass {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(PassKind::Primal.to_string(), "primal");
        assert_eq!(PassKind::Refinement.to_string(), "refinement");
    }
}
