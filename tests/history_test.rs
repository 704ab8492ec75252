//! Property tests for the undo/redo history
//!
//! Random commit/undo/redo sequences are checked against a plain reference
//! model and against the bound, inverse and pruning laws.

use proptest::prelude::*;
use sprite_tools::AlphaMask;
use sprite_tools::history::History;

const DEPTH: usize = 20;

#[derive(Debug, Clone)]
enum Op {
    Commit(u8),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::Commit),
        2 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

fn mask(value: u8) -> AlphaMask {
    AlphaMask::filled(3, 2, value)
}

/// Straightforward list-and-cursor model of the expected behavior
struct Model {
    states: Vec<u8>,
    index: usize,
    depth: usize,
}

impl Model {
    fn new(initial: u8, depth: usize) -> Self {
        Self {
            states: vec![initial],
            index: 0,
            depth,
        }
    }

    fn commit(&mut self, value: u8) {
        self.states.truncate(self.index + 1);
        self.states.push(value);
        if self.states.len() > self.depth {
            self.states.remove(0);
        }
        self.index = self.states.len() - 1;
    }

    fn undo(&mut self) -> Option<u8> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.states[self.index])
    }

    fn redo(&mut self) -> Option<u8> {
        if self.index + 1 >= self.states.len() {
            return None;
        }
        self.index += 1;
        Some(self.states[self.index])
    }
}

// ============================================================================
// Eviction Tests
// ============================================================================

#[test]
fn test_oldest_snapshots_unrecoverable_after_overflow() {
    let mut history = History::with_depth(mask(0), DEPTH);
    for v in 1..=(DEPTH as u8 + 5) {
        history.commit(&mask(v));
    }

    assert_eq!(history.len(), DEPTH);

    let mut reached = Vec::new();
    while let Some(m) = history.undo() {
        reached.push(m.as_raw()[0]);
    }
    assert_eq!(reached.len(), DEPTH - 1);
    assert_eq!(reached.last(), Some(&6));
    for evicted in 0..=5u8 {
        assert!(!reached.contains(&evicted), "snapshot {} should be gone", evicted);
    }
}

#[test]
fn test_default_depth_is_twenty() {
    let history = History::new(mask(0));
    assert_eq!(history.max_depth(), 20);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn history_matches_reference_model(ops in prop::collection::vec(op_strategy(), 0..120)) {
        let mut history = History::with_depth(mask(0), DEPTH);
        let mut model = Model::new(0, DEPTH);

        for op in ops {
            match op {
                Op::Commit(v) => {
                    history.commit(&mask(v));
                    model.commit(v);
                }
                Op::Undo => {
                    prop_assert_eq!(history.undo(), model.undo().map(mask));
                }
                Op::Redo => {
                    prop_assert_eq!(history.redo(), model.redo().map(mask));
                }
            }
            prop_assert_eq!(history.current(), &mask(model.states[model.index]));
            prop_assert_eq!(history.index(), model.index);
        }
    }

    #[test]
    fn history_never_exceeds_depth(
        depth in 1usize..30,
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        let mut history = History::with_depth(mask(0), depth);
        for op in ops {
            match op {
                Op::Commit(v) => history.commit(&mask(v)),
                Op::Undo => {
                    history.undo();
                }
                Op::Redo => {
                    history.redo();
                }
            }
            prop_assert!(history.len() <= depth);
            prop_assert!(history.index() < history.len());
        }
    }

    #[test]
    fn undo_then_redo_is_identity(
        commits in prop::collection::vec(any::<u8>(), 1..40),
        undos in 0usize..10,
    ) {
        let mut history = History::with_depth(mask(0), DEPTH);
        for v in &commits {
            history.commit(&mask(*v));
        }
        for _ in 0..undos {
            history.undo();
        }

        let before = history.current().clone();
        if history.undo().is_some() {
            prop_assert_eq!(history.redo(), Some(before));
        } else {
            prop_assert_eq!(history.current(), &before);
        }
    }

    #[test]
    fn commit_after_undo_prunes_redo(
        commits in prop::collection::vec(any::<u8>(), 1..40),
        fresh in any::<u8>(),
    ) {
        let mut history = History::with_depth(mask(0), DEPTH);
        for v in &commits {
            history.commit(&mask(*v));
        }

        prop_assert!(history.undo().is_some());
        history.commit(&mask(fresh));

        prop_assert!(!history.can_redo());
        prop_assert_eq!(history.redo(), None);
        prop_assert_eq!(history.current(), &mask(fresh));
    }
}
