//! # Editor State
//!
//! One owned struct holds the whole editing surface:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ commands: user-facing operations             │
//! │  (toggle_mark, toggle_element, set_link, …)  │
//! └──────────────────────────────────────────────┘
//!                      ↓
//! ┌──────────────────────────────────────────────┐
//! │ transforms: structural primitives            │
//! │  (wrap/unwrap, property patches, marks, …)   │
//! └──────────────────────────────────────────────┘
//!                      ↓
//! ┌──────────────────────────────────────────────┐
//! │ ops: invertible tree edits + history         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Commands never touch the tree directly; every change flows through
//! [`Op`]s so selection mapping, undo and the version counter stay
//! consistent. The version bumps on every applied op and on selection
//! changes, which is what change observers key off.

use vellum_model::{Marks, Node, Range, Selection};

use crate::errors::EditorResult;
use crate::history::History;
use crate::ops::{self, Op};

pub struct Editor {
    pub(crate) children: Vec<Node>,
    pub(crate) selection: Selection,
    pub(crate) pending_marks: Option<Marks>,
    pub(crate) history: History,
    version: u64,
}

impl Editor {
    /// An editor over a single empty paragraph.
    pub fn new() -> Editor {
        Editor::with_children(vec![Node::Element(vellum_model::Element::paragraph(vec![
            Node::Text(vellum_model::Text::plain("")),
        ]))])
    }

    /// Wraps an existing document. The tree is normalized on the way in
    /// without touching history.
    pub fn with_children(children: Vec<Node>) -> Editor {
        let mut editor = Editor {
            children,
            selection: None,
            pending_marks: None,
            history: History::new(),
            version: 0,
        };
        editor.history.set_recording(false);
        if let Err(err) = crate::normalize::normalize(&mut editor) {
            tracing::warn!(error = %err, "could not normalize initial document");
        }
        editor.history.set_recording(true);
        editor
    }

    pub fn from_json(json: &str) -> EditorResult<Editor> {
        let children: Vec<Node> = serde_json::from_str(json)?;
        Ok(Editor::with_children(children))
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(&self.children)?)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Monotonic revision counter. Bumps on every applied op and on
    /// selection changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Bumps the version for state changes that bypass ops, e.g. staging
    /// caret marks.
    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Moves the selection. Pending caret marks are dropped: they belong
    /// to the caret position they were staged at.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
        self.pending_marks = None;
        self.version += 1;
    }

    pub fn select_range(&mut self, range: Range) {
        self.select(Some(range));
    }

    pub fn deselect(&mut self) {
        self.select(None);
    }

    /// Applies one op: mutates the tree, maps the selection through it,
    /// records it for undo and bumps the version.
    pub(crate) fn apply(&mut self, op: Op) -> EditorResult<()> {
        let implicit = self.history.is_recording() && !self.history.has_open_batch();
        if implicit {
            self.history.begin(self.selection.clone());
        }
        let result = self.apply_inner(op);
        if implicit {
            self.history.end(self.selection.clone());
        }
        result
    }

    fn apply_inner(&mut self, op: Op) -> EditorResult<()> {
        op.apply(&mut self.children)?;
        if let Some(range) = &self.selection {
            let anchor = ops::transform_point(&range.anchor, &op);
            let focus = ops::transform_point(&range.focus, &op);
            self.selection = match (anchor, focus) {
                (Some(anchor), Some(focus)) => Some(Range { anchor, focus }),
                _ => None,
            };
        }
        self.history.record(op);
        self.version += 1;
        Ok(())
    }

    /// Opens a history batch; nested calls share one batch.
    pub fn begin_batch(&mut self) {
        self.history.begin(self.selection.clone());
    }

    /// Closes a history batch. When the outermost level closes, the tree
    /// is normalized first so repair ops land inside the same undo step.
    pub fn end_batch(&mut self) -> EditorResult<()> {
        let result = if self.history.open_depth() == 1 {
            crate::normalize::normalize(self)
        } else {
            Ok(())
        };
        self.history.end(self.selection.clone());
        result
    }

    pub(crate) fn with_batch<F>(&mut self, f: F) -> EditorResult<()>
    where
        F: FnOnce(&mut Editor) -> EditorResult<()>,
    {
        self.begin_batch();
        let result = f(self);
        let end = self.end_batch();
        result.and(end)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the most recent batch. A no-op when nothing is undoable.
    pub fn undo(&mut self) -> EditorResult<()> {
        let Some(batch) = self.history.pop_undo() else {
            return Ok(());
        };
        self.history.set_recording(false);
        let mut result = Ok(());
        for op in batch.ops.iter().rev() {
            let Some(inverse) = op.invert() else {
                tracing::warn!(op = ?op, "op has no inverse, skipping during undo");
                continue;
            };
            if let Err(err) = self.apply(inverse) {
                result = Err(err);
                break;
            }
        }
        self.history.set_recording(true);
        result?;
        self.selection = batch.selection_before.clone();
        self.pending_marks = None;
        self.version += 1;
        self.history.push_redo(batch);
        Ok(())
    }

    /// Replays the most recently undone batch.
    pub fn redo(&mut self) -> EditorResult<()> {
        let Some(batch) = self.history.pop_redo() else {
            return Ok(());
        };
        self.history.set_recording(false);
        let mut result = Ok(());
        for op in &batch.ops {
            if let Err(err) = self.apply(op.clone()) {
                result = Err(err);
                break;
            }
        }
        self.history.set_recording(true);
        result?;
        self.selection = batch.selection_after.clone();
        self.pending_marks = None;
        self.version += 1;
        self.history.restore_undo(batch);
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::{Element, Path, Point, Text};

    fn editor_with(text: &str) -> Editor {
        Editor::with_children(vec![Node::Element(Element::paragraph(vec![Node::Text(
            Text::plain(text),
        )]))])
    }

    #[test]
    fn new_editor_holds_one_empty_paragraph() {
        let editor = Editor::new();
        assert_eq!(editor.children().len(), 1);
        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_text().unwrap().text, "");
    }

    #[test]
    fn apply_bumps_version_and_maps_selection() {
        let mut editor = editor_with("hello");
        editor.select_range(Range::collapsed(Point::new(vec![0, 0], 5)));
        let before = editor.version();
        editor
            .apply(Op::InsertText {
                path: Path::new(vec![0, 0]),
                offset: 0,
                text: "ab".into(),
            })
            .unwrap();
        assert!(editor.version() > before);
        let selection = editor.selection().clone().unwrap();
        assert_eq!(selection.anchor.offset, 7);
    }

    #[test]
    fn undo_restores_content_and_selection() {
        let mut editor = editor_with("hello");
        editor.select_range(Range::collapsed(Point::new(vec![0, 0], 0)));
        editor
            .apply(Op::InsertText {
                path: Path::new(vec![0, 0]),
                offset: 5,
                text: "!".into(),
            })
            .unwrap();
        assert!(editor.can_undo());

        editor.undo().unwrap();
        let text = &editor.children()[0].children().unwrap()[0];
        assert_eq!(text.as_text().unwrap().text, "hello");
        assert_eq!(
            editor.selection().clone().unwrap().anchor,
            Point::new(vec![0, 0], 0)
        );
        assert!(editor.can_redo());

        editor.redo().unwrap();
        let text = &editor.children()[0].children().unwrap()[0];
        assert_eq!(text.as_text().unwrap().text, "hello!");
        assert!(!editor.can_redo());
    }

    #[test]
    fn json_roundtrip() {
        let editor = editor_with("persist me");
        let json = editor.to_json().unwrap();
        let back = Editor::from_json(&json).unwrap();
        assert_eq!(back.children(), editor.children());
    }

    #[test]
    fn select_clears_pending_marks() {
        let mut editor = editor_with("hello");
        editor.pending_marks = Some(Marks::default());
        editor.select_range(Range::collapsed(Point::new(vec![0, 0], 1)));
        assert!(editor.pending_marks.is_none());
    }
}
