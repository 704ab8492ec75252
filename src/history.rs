use crate::config::DEFAULT_HISTORY_DEPTH;
use crate::types::AlphaMask;

/// Bounded undo/redo history of mask snapshots.
///
/// Holds at least one snapshot (the session's starting mask) and a cursor
/// pointing at the snapshot that matches the current mask.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<AlphaMask>,
    index: usize,
    max_depth: usize,
}

impl History {
    pub fn new(initial: AlphaMask) -> Self {
        Self::with_depth(initial, DEFAULT_HISTORY_DEPTH)
    }

    /// A depth of 0 is treated as 1
    pub fn with_depth(initial: AlphaMask, max_depth: usize) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Record a new state after the cursor.
    /// Anything that could have been redone is dropped first.
    pub fn commit(&mut self, mask: &AlphaMask) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(mask.clone());
        self.index = self.snapshots.len() - 1;

        // Limit history size
        if self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
            self.index -= excess;
        }
    }

    /// Step back; `None` when there is nothing to undo
    pub fn undo(&mut self) -> Option<AlphaMask> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.snapshots[self.index].clone())
    }

    /// Step forward; `None` when there is nothing to redo
    pub fn redo(&mut self) -> Option<AlphaMask> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(self.snapshots[self.index].clone())
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> &AlphaMask {
        &self.snapshots[self.index]
    }

    /// Drop everything and start over from `initial` (e.g. when loading a new image)
    pub fn reset(&mut self, initial: AlphaMask) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Get undo step count (for UI display)
    pub fn undo_count(&self) -> usize {
        self.index
    }

    /// Get redo step count (for UI display)
    pub fn redo_count(&self) -> usize {
        self.snapshots.len() - self.index - 1
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
