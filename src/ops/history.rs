use crate::model::board::BoardState;

/// Default number of snapshots kept on the timeline
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Linear undo/redo timeline of whole-board snapshots.
///
/// `snapshots[index]` is always the live state. Recording a new state while
/// the cursor is behind the tail discards everything after the cursor.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<BoardState>,
    index: usize,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(BoardState::default(), DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// Start a timeline whose first snapshot is `initial`. A depth of zero
    /// is treated as one.
    pub fn new(initial: BoardState, max_depth: usize) -> Self {
        History {
            snapshots: vec![initial],
            index: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// The live state
    pub fn current(&self) -> &BoardState {
        &self.snapshots[self.index]
    }

    /// Push the result of a mutating command. Drops any redo branch and the
    /// oldest snapshots beyond `max_depth`.
    pub fn record(&mut self, state: BoardState) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(state);
        if self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. Returns `None` at the start of the timeline.
    pub fn undo(&mut self) -> Option<&BoardState> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Step forward one snapshot. Returns `None` at the tail.
    pub fn redo(&mut self) -> Option<&BoardState> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Forget the timeline and start over from `state`
    pub fn reset(&mut self, state: BoardState) {
        self.snapshots = vec![state];
        self.index = 0;
    }

    /// Number of retained snapshots
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
