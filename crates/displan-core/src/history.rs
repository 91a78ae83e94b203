//! Linear undo history of full canvas snapshots.

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::document::CanvasState;

/// Snapshot history with a current index.
///
/// The snapshot at `index` always equals the live state after the last
/// commit, undo or redo. The stack is never empty, so the index is always in
/// bounds.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    snapshots: Vec<CanvasState>,
    index: usize,
    limit: usize,
}

impl HistoryStack {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: CanvasState) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Start a history keeping at most `limit` snapshots (at least one).
    pub fn with_limit(initial: CanvasState, limit: usize) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Record a committed state.
    ///
    /// Drops forward history past the current index, appends the snapshot and
    /// moves the index to it. The oldest snapshots fall off past the limit.
    pub fn commit(&mut self, state: CanvasState) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(state);

        let overflow = self.snapshots.len().saturating_sub(self.limit);
        if overflow > 0 {
            self.snapshots.drain(..overflow);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot.
    /// Returns the snapshot to restore, or None at the start of history.
    pub fn undo(&mut self) -> Option<&CanvasState> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Step forward one snapshot.
    /// Returns the snapshot to restore, or None at the end of history.
    pub fn redo(&mut self) -> Option<&CanvasState> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// The snapshot at the current index.
    pub fn current(&self) -> &CanvasState {
        &self.snapshots[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Forget everything and start over from `state`.
    pub fn reset(&mut self, state: CanvasState) {
        self.snapshots.clear();
        self.snapshots.push(state);
        self.index = 0;
    }
}
