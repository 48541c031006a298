//! # Undo/Redo History
//!
//! Tracks applied operations in batches and replays their inverses.
//!
//! ## Design
//!
//! - Every op that reaches the document while recording is on lands in a
//!   batch; a command groups its ops with `begin`/`end` so one user action
//!   undoes as one step
//! - Undo applies the inverses of a batch in reverse order and restores the
//!   selection captured when the batch opened
//! - Redo replays the original ops and restores the closing selection
//! - Pushing a new batch clears the redo stack
//! - Depth capped (oldest batches fall off first)

use vellum_model::Selection;

use crate::ops::Op;

/// One undoable step: the ops applied by a command plus the selection on
/// either side of it.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Ops in application order.
    pub ops: Vec<Op>,
    /// Selection before the first op.
    pub selection_before: Selection,
    /// Selection after the last op.
    pub selection_after: Selection,
}

/// Undo/redo stacks with batch grouping.
#[derive(Debug)]
pub struct History {
    /// Applied batches, most recent last.
    undos: Vec<Batch>,
    /// Undone batches, most recent last.
    redos: Vec<Batch>,
    /// Batch under construction, with nesting depth.
    open: Option<Batch>,
    depth: usize,
    /// Off while undo/redo replays ops.
    recording: bool,
    /// Maximum number of undo levels (0 = unlimited).
    max_levels: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undos: Vec::new(),
            redos: Vec::new(),
            open: None,
            depth: 0,
            recording: true,
            max_levels,
        }
    }

    /// Opens a batch (or deepens an already-open one).
    pub fn begin(&mut self, selection: Selection) {
        self.depth += 1;
        if self.open.is_none() {
            self.open = Some(Batch {
                ops: Vec::new(),
                selection_before: selection,
                selection_after: None,
            });
        }
    }

    /// Closes one nesting level; at depth zero the batch is committed.
    pub fn end(&mut self, selection: Selection) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            return;
        }
        if let Some(mut batch) = self.open.take() {
            if !batch.ops.is_empty() {
                batch.selection_after = selection;
                self.push(batch);
            }
        }
    }

    /// Records an applied op into the open batch.
    pub fn record(&mut self, op: Op) {
        if !self.recording {
            return;
        }
        if let Some(batch) = &mut self.open {
            batch.ops.push(op);
        }
    }

    pub fn has_open_batch(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_depth(&self) -> usize {
        self.depth
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn pop_undo(&mut self) -> Option<Batch> {
        self.undos.pop()
    }

    pub fn pop_redo(&mut self) -> Option<Batch> {
        self.redos.pop()
    }

    /// Moves an undone batch to the redo stack.
    pub fn push_redo(&mut self, batch: Batch) {
        self.redos.push(batch);
    }

    /// Returns a redone batch to the undo stack without clearing redos.
    pub fn restore_undo(&mut self, batch: Batch) {
        self.undos.push(batch);
    }

    fn push(&mut self, batch: Batch) {
        self.undos.push(batch);
        if self.max_levels > 0 && self.undos.len() > self.max_levels {
            self.undos.remove(0);
        }
        // A fresh step invalidates any undone future.
        self.redos.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undos.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redos.len()
    }

    pub fn clear(&mut self) {
        self.undos.clear();
        self.redos.clear();
        self.open = None;
        self.depth = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
