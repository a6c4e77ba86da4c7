//! Undo/redo history for a slide's lines.

use crate::model::Line;
use std::collections::VecDeque;
use std::sync::Arc;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 100;

/// Immutable snapshot of a slide's lines.
pub type LinesSnapshot = Arc<Vec<Line>>;

/// Undo and redo stacks of line documents.
#[derive(Debug, Clone, Default)]
pub struct LinesHistory {
    undo_stack: VecDeque<LinesSnapshot>,
    redo_stack: Vec<LinesSnapshot>,
}

impl LinesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the document as it was before an edit.
    pub fn push(&mut self, previous: LinesSnapshot) {
        self.undo_stack.push_back(previous);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.pop_front();
        }
    }

    /// Step back. `current` moves to the redo stack and the restored
    /// document is returned.
    pub fn undo(&mut self, current: LinesSnapshot) -> Option<LinesSnapshot> {
        let snapshot = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(snapshot)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: LinesSnapshot) -> Option<LinesSnapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
