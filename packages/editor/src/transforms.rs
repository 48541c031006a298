//! Structural primitives commands are built from: property patches,
//! wrapping and unwrapping, mark application and text edits. Everything
//! here goes through [`Op`]s inside a history batch, so each public
//! transform is one undo step and the selection survives it.

use serde_json::Value;
use tracing::warn;
use vellum_model::{
    text::char_to_byte, walk, Element, ElementKind, Mark, Marks, Node, Path, Point, Range, Text,
};

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::ops::{self, Op, PropertyMap};

/// Which nodes a transform applies to.
#[derive(Debug, Clone)]
pub enum Target<'a> {
    /// Deepest text-holding blocks intersecting the selection. This is
    /// the default for property patches: alignment on a list selection
    /// lands on the items, not the list.
    LowestBlocks,
    /// Elements of the given kind intersecting the selection.
    Kind(ElementKind),
    /// Elements of any of the given kinds intersecting the selection.
    Kinds(&'a [ElementKind]),
    /// One node addressed by path, selection or not.
    At(Path),
}

/// A selection edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// A maximal run of consecutive siblings: parent path, index of the
/// first child and how many follow.
type Run = (Path, usize, usize);

fn contiguous_runs(paths: &[Path]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for path in paths {
        let (Some(parent), Some(index)) = (path.parent(), path.index()) else {
            continue;
        };
        match runs.last_mut() {
            Some((run_parent, first, count)) if *run_parent == parent && *first + *count == index => {
                *count += 1;
            }
            _ => runs.push((parent, index, 1)),
        }
    }
    runs
}

/// True when any strict ancestor of `path` is a void element.
pub(crate) fn inside_void(children: &[Node], path: &Path) -> bool {
    let mut current = path.parent();
    while let Some(ancestor) = current {
        if ancestor.is_empty() {
            break;
        }
        if walk::element_at(children, &ancestor).map_or(false, Element::is_void) {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

impl Editor {
    /// Text leaves lying entirely inside `range`, with their lengths.
    pub(crate) fn covered_leaves(&self, range: &Range) -> Vec<(Path, usize)> {
        let (start, end) = range.edges();
        walk::texts(&self.children)
            .filter_map(|(path, leaf)| {
                let len = leaf.len_chars();
                let first = Point::new(path.clone(), 0);
                let last = Point::new(path.clone(), len);
                (&first >= start && &last <= end).then_some((path, len))
            })
            .collect()
    }

    fn resolve_target(&self, target: &Target<'_>) -> Vec<Path> {
        match target {
            Target::LowestBlocks => self.lowest_block_paths_in_selection(),
            Target::Kind(kind) => self.kind_paths_in_selection(&[*kind]),
            Target::Kinds(kinds) => self.kind_paths_in_selection(kinds),
            Target::At(path) => vec![path.clone()],
        }
    }

    /// Patches element properties. A `null` value removes the property.
    /// Only keys that actually change are recorded, so a patch that
    /// matches the current state is a no-op.
    pub fn set_node_properties(
        &mut self,
        target: Target<'_>,
        props: &PropertyMap,
    ) -> EditorResult<()> {
        let paths = self.resolve_target(&target);
        if paths.is_empty() || props.is_empty() {
            return Ok(());
        }
        self.with_batch(|ed| {
            for path in &paths {
                let Some(el) = walk::element_at(&ed.children, path) else {
                    continue;
                };
                let mut next = PropertyMap::new();
                let mut prev = PropertyMap::new();
                for (key, value) in props {
                    let current = el.field(key).unwrap_or(Value::Null);
                    if &current == value {
                        continue;
                    }
                    next.insert(key.clone(), value.clone());
                    prev.insert(key.clone(), current);
                }
                if next.is_empty() {
                    continue;
                }
                ed.apply(Op::SetNodeProps {
                    path: path.clone(),
                    props: next,
                    prev,
                })?;
            }
            Ok(())
        })
    }

    /// Wraps the selected content in copies of `wrapper`. Block wrappers
    /// take the lowest blocks in the selection, one wrapper per run of
    /// siblings. Inline wrappers take text leaves; with `split` the edge
    /// leaves are split first so only the selected characters move.
    pub fn wrap_nodes(&mut self, wrapper: Element, split: bool) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        self.with_batch(|ed| {
            if wrapper.is_inline() {
                ed.wrap_leaf_runs(wrapper, split)
            } else {
                ed.wrap_block_runs(wrapper)
            }
        })
    }

    fn wrap_block_runs(&mut self, wrapper: Element) -> EditorResult<()> {
        let paths = self.lowest_block_paths_in_selection();
        self.wrap_runs(&paths, &wrapper)
    }

    fn wrap_leaf_runs(&mut self, wrapper: Element, split: bool) -> EditorResult<()> {
        if split {
            self.split_range_edges()?;
        }
        let Some(range) = self.selection.clone() else {
            return Ok(());
        };
        let range = self.unhang_range(&range);
        let paths: Vec<Path> = self
            .covered_leaves(&range)
            .into_iter()
            .map(|(path, _)| path)
            .filter(|path| !inside_void(&self.children, path))
            .collect();
        self.wrap_runs(&paths, &wrapper)
    }

    fn wrap_runs(&mut self, paths: &[Path], wrapper: &Element) -> EditorResult<()> {
        // Later runs first: earlier sibling indices stay valid.
        for (parent, first, count) in contiguous_runs(paths).into_iter().rev() {
            let mut shell = wrapper.clone();
            shell.children_mut().clear();
            let at = parent.child(first);
            self.apply(Op::InsertNode {
                path: at.clone(),
                node: Node::Element(shell),
            })?;
            for i in 0..count {
                self.apply(Op::MoveNode {
                    from: parent.child(first + 1),
                    to: at.child(i),
                })?;
            }
        }
        Ok(())
    }

    /// Removes wrappers of the given kinds from the selection, hoisting
    /// their children in place. With `split`, a wrapper only partially
    /// inside the selection is split first so untouched children keep
    /// their wrapper.
    pub fn unwrap_nodes(&mut self, kinds: &[ElementKind], split: bool) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        self.with_batch(|ed| {
            let mut rounds = 0;
            loop {
                let target = {
                    let Some(range) = ed.selection.clone() else {
                        return Ok(());
                    };
                    let range = ed.unhang_range(&range);
                    ed.elements_in_range(&range)
                        .into_iter()
                        .find(|(_, el)| kinds.contains(&el.kind()))
                        .map(|(path, el)| (path, el.children().len()))
                };
                let Some((path, child_count)) = target else {
                    return Ok(());
                };
                ed.unwrap_at(&path, child_count, split)?;
                rounds += 1;
                if rounds > 1000 {
                    warn!(kinds = ?kinds, "unwrap did not converge, giving up");
                    return Ok(());
                }
            }
        })
    }

    fn unwrap_at(&mut self, path: &Path, child_count: usize, split: bool) -> EditorResult<()> {
        let mut wrapper = path.clone();
        if split {
            if let Some(range) = self.selection.clone() {
                let range = self.unhang_range(&range);
                let mut first = None;
                let mut last = None;
                for i in 0..child_count {
                    if range.includes_path(&path.child(i)) {
                        first.get_or_insert(i);
                        last = Some(i);
                    }
                }
                if let (Some(a), Some(b)) = (first, last) {
                    if b + 1 < child_count {
                        self.apply(Op::SplitNode {
                            path: path.clone(),
                            position: b + 1,
                        })?;
                    }
                    if a > 0 {
                        self.apply(Op::SplitNode {
                            path: path.clone(),
                            position: a,
                        })?;
                        wrapper = path
                            .next_sibling()
                            .ok_or_else(|| EditorError::invalid_path(path))?;
                    }
                }
            }
        }

        let count = walk::element_at(&self.children, &wrapper)
            .map(|el| el.children().len())
            .ok_or_else(|| EditorError::invalid_path(&wrapper))?;
        let parent = wrapper
            .parent()
            .ok_or_else(|| EditorError::invalid_path(&wrapper))?;
        let index = wrapper
            .index()
            .ok_or_else(|| EditorError::invalid_path(&wrapper))?;
        for i in 0..count {
            self.apply(Op::MoveNode {
                from: wrapper.child(0),
                to: parent.child(index + 1 + i),
            })?;
        }
        let shell = walk::node_at(&self.children, &wrapper)
            .cloned()
            .ok_or_else(|| EditorError::invalid_path(&wrapper))?;
        self.apply(Op::RemoveNode {
            path: wrapper,
            node: shell,
        })
    }

    /// Inserts nodes at an explicit path, or at the selection. Inline
    /// content goes into the text at the caret; block content lands after
    /// the top-level block under the caret, replacing it when it is an
    /// empty paragraph.
    pub fn insert_nodes(&mut self, nodes: Vec<Node>, at: Option<Path>) -> EditorResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        if let Some(base) = at {
            let parent = base
                .parent()
                .ok_or_else(|| EditorError::invalid_path(&base))?;
            let index = base
                .index()
                .ok_or_else(|| EditorError::invalid_path(&base))?;
            return self.with_batch(|ed| {
                for (i, node) in nodes.into_iter().enumerate() {
                    ed.apply(Op::InsertNode {
                        path: parent.child(index + i),
                        node,
                    })?;
                }
                Ok(())
            });
        }

        if self.selection.is_none() {
            return Ok(());
        }
        self.with_batch(|ed| {
            ed.delete_selection_inner()?;
            let Some(range) = ed.selection.clone() else {
                return Ok(());
            };
            let caret = range.start().clone();
            let all_inline = nodes.iter().all(|node| match node {
                Node::Text(_) => true,
                Node::Element(el) => el.is_inline(),
            });
            if all_inline {
                ed.insert_inline_at(&caret, nodes)
            } else {
                ed.insert_blocks_at(&caret, nodes)
            }
        })
    }

    fn insert_inline_at(&mut self, caret: &Point, nodes: Vec<Node>) -> EditorResult<()> {
        let len = walk::text_at(&self.children, &caret.path)
            .map(Text::len_chars)
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        let parent = caret
            .path
            .parent()
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        let index = caret
            .path
            .index()
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        let base = if caret.offset == 0 {
            index
        } else if caret.offset >= len {
            index + 1
        } else {
            self.apply(Op::SplitNode {
                path: caret.path.clone(),
                position: caret.offset,
            })?;
            index + 1
        };
        for (i, node) in nodes.into_iter().enumerate() {
            self.apply(Op::InsertNode {
                path: parent.child(base + i),
                node,
            })?;
        }
        Ok(())
    }

    fn insert_blocks_at(&mut self, caret: &Point, nodes: Vec<Node>) -> EditorResult<()> {
        let block = self
            .block_path_at(caret)
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        // New blocks land at the top level even when the caret is nested,
        // keeping list and table children well typed.
        let top_index = block.as_slice()[0];
        let count = nodes.len();
        for (i, node) in nodes.into_iter().enumerate() {
            self.apply(Op::InsertNode {
                path: Path::new(vec![top_index + 1 + i]),
                node,
            })?;
        }
        let replace = block.len() == 1
            && walk::element_at(&self.children, &block).map_or(false, |el| {
                el.kind() == ElementKind::Paragraph
                    && matches!(
                        el.children().as_slice(),
                        [Node::Text(t)] if t.is_empty() && t.marks.is_empty()
                    )
            });
        if replace {
            let node = walk::node_at(&self.children, &block)
                .cloned()
                .ok_or_else(|| EditorError::invalid_path(&block))?;
            self.apply(Op::RemoveNode { path: block, node })?;
            // Land the caret in the first inserted block.
            if count > 0 {
                let first = Path::new(vec![top_index]);
                let landing = walk::texts(&self.children)
                    .find(|(path, _)| first.is_prefix_of(path))
                    .map(|(path, _)| path);
                if let Some(path) = landing {
                    self.select_range(Range::collapsed(Point::new(path, 0)));
                }
            }
        }
        Ok(())
    }

    /// Validates a fragment and inserts it at the selection.
    pub fn insert_fragment(&mut self, fragment: Vec<Node>) -> EditorResult<()> {
        vellum_model::validate_fragment(&fragment)?;
        self.insert_nodes(fragment, None)
    }

    /// Removes every node the target resolves to, later paths first.
    pub fn remove_nodes(&mut self, target: Target<'_>) -> EditorResult<()> {
        let mut paths = self.resolve_target(&target);
        if paths.is_empty() {
            return Ok(());
        }
        paths.sort();
        self.with_batch(|ed| {
            for path in paths.iter().rev() {
                let Some(node) = walk::node_at(&ed.children, path).cloned() else {
                    continue;
                };
                ed.apply(Op::RemoveNode {
                    path: path.clone(),
                    node,
                })?;
            }
            Ok(())
        })
    }

    pub fn move_node(&mut self, from: Path, to: Path) -> EditorResult<()> {
        self.with_batch(|ed| ed.apply(Op::MoveNode { from, to }))
    }

    /// Applies a mark to the selection. On a caret the mark is staged and
    /// picked up by the next insertion; on a range the edge leaves are
    /// split and every covered leaf gets the mark. Superscript and
    /// subscript displace each other.
    pub fn add_mark(&mut self, mark: Mark, value: Value) -> EditorResult<()> {
        let Some(range) = self.selection.clone() else {
            return Ok(());
        };
        if range.is_collapsed() {
            let mut marks = self.marks().unwrap_or_default();
            set_mark_exclusive(&mut marks, mark, value)?;
            self.pending_marks = Some(marks);
            self.touch();
            return Ok(());
        }
        let unhung = self.unhang_range(&range);
        self.with_batch(|ed| {
            ed.select_range(unhung);
            ed.split_range_edges()?;
            let Some(range) = ed.selection.clone() else {
                return Ok(());
            };
            for (path, _) in ed.covered_leaves(&range) {
                if inside_void(&ed.children, &path) {
                    continue;
                }
                let Some(prev) = walk::text_at(&ed.children, &path).map(|l| l.marks.clone())
                else {
                    continue;
                };
                let mut next = prev.clone();
                set_mark_exclusive(&mut next, mark, value.clone())?;
                if next == prev {
                    continue;
                }
                ed.apply(Op::SetMarks {
                    path,
                    marks: next,
                    prev,
                })?;
            }
            Ok(())
        })
    }

    /// Removes a mark from the selection, with the same caret staging as
    /// [`Editor::add_mark`].
    pub fn remove_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let Some(range) = self.selection.clone() else {
            return Ok(());
        };
        if range.is_collapsed() {
            let mut marks = self.marks().unwrap_or_default();
            marks.remove(mark);
            self.pending_marks = Some(marks);
            self.touch();
            return Ok(());
        }
        let unhung = self.unhang_range(&range);
        self.with_batch(|ed| {
            ed.select_range(unhung);
            ed.split_range_edges()?;
            let Some(range) = ed.selection.clone() else {
                return Ok(());
            };
            for (path, _) in ed.covered_leaves(&range) {
                if inside_void(&ed.children, &path) {
                    continue;
                }
                let Some(prev) = walk::text_at(&ed.children, &path).map(|l| l.marks.clone())
                else {
                    continue;
                };
                if prev.get(mark).is_none() {
                    continue;
                }
                let mut next = prev.clone();
                next.remove(mark);
                ed.apply(Op::SetMarks {
                    path,
                    marks: next,
                    prev,
                })?;
            }
            Ok(())
        })
    }

    /// Inserts text at the selection, replacing it when expanded. Staged
    /// caret marks become a fresh leaf carrying them.
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        if text.is_empty() || self.selection.is_none() {
            return Ok(());
        }
        self.with_batch(|ed| {
            ed.delete_selection_inner()?;
            let Some(range) = ed.selection.clone() else {
                return Ok(());
            };
            let caret = range.start().clone();
            let leaf_marks = walk::text_at(&ed.children, &caret.path).map(|l| l.marks.clone());
            match ed.pending_marks.clone() {
                Some(marks) if Some(&marks) != leaf_marks.as_ref() => {
                    ed.insert_marked_leaf(&caret, text, marks)
                }
                _ => ed.apply(Op::InsertText {
                    path: caret.path.clone(),
                    offset: caret.offset,
                    text: text.to_string(),
                }),
            }
        })
    }

    fn insert_marked_leaf(&mut self, caret: &Point, text: &str, marks: Marks) -> EditorResult<()> {
        let len = walk::text_at(&self.children, &caret.path)
            .map(Text::len_chars)
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        let parent = caret
            .path
            .parent()
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        let index = caret
            .path
            .index()
            .ok_or_else(|| EditorError::invalid_path(&caret.path))?;
        let at = if caret.offset == 0 {
            caret.path.clone()
        } else if caret.offset >= len {
            parent.child(index + 1)
        } else {
            self.apply(Op::SplitNode {
                path: caret.path.clone(),
                position: caret.offset,
            })?;
            parent.child(index + 1)
        };
        let width = text.chars().count();
        self.apply(Op::InsertNode {
            path: at.clone(),
            node: Node::Text(Text::with_marks(text, marks)),
        })?;
        self.select_range(Range::collapsed(Point::new(at, width)));
        Ok(())
    }

    /// Inserts text at an explicit point without moving the selection
    /// there first.
    pub fn insert_text_at(&mut self, point: &Point, text: &str) -> EditorResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.with_batch(|ed| {
            ed.apply(Op::InsertText {
                path: point.path.clone(),
                offset: point.offset,
                text: text.to_string(),
            })
        })
    }

    /// Deletes `chars` characters starting at an explicit point.
    pub fn delete_at(&mut self, point: &Point, chars: usize) -> EditorResult<()> {
        if chars == 0 {
            return Ok(());
        }
        self.with_batch(|ed| {
            let leaf = walk::text_at(&ed.children, &point.path)
                .ok_or_else(|| EditorError::invalid_path(&point.path))?;
            let len = leaf.len_chars();
            if point.offset + chars > len {
                return Err(EditorError::InvalidOffset {
                    path: point.path.clone(),
                    offset: point.offset + chars,
                    len,
                });
            }
            let from = char_to_byte(&leaf.text, point.offset);
            let to = char_to_byte(&leaf.text, point.offset + chars);
            let removed = leaf.text[from..to].to_string();
            ed.apply(Op::RemoveText {
                path: point.path.clone(),
                offset: point.offset,
                text: removed,
            })
        })
    }

    /// Deletes the selected content and collapses the selection to its
    /// start. Partially selected edge leaves are trimmed; elements lying
    /// wholly between the edges are removed.
    pub fn delete_selection(&mut self) -> EditorResult<()> {
        self.with_batch(Editor::delete_selection_inner)
    }

    fn delete_selection_inner(&mut self) -> EditorResult<()> {
        let Some(range) = self.selection.clone() else {
            return Ok(());
        };
        if range.is_collapsed() {
            return Ok(());
        }
        let range = self.unhang_range(&range);
        let (start, end) = range.edges();
        let start = start.clone();
        let end = end.clone();

        // Text trims first: they shift no paths, so everything below can
        // keep using the original coordinates.
        let mut trims = Vec::new();
        for (path, leaf) in walk::texts(&self.children) {
            if path < start.path || path > end.path {
                continue;
            }
            let len = leaf.len_chars();
            let from = if path == start.path { start.offset } else { 0 };
            let to = if path == end.path { end.offset } else { len };
            if from >= to {
                continue;
            }
            let removed =
                leaf.text[char_to_byte(&leaf.text, from)..char_to_byte(&leaf.text, to)].to_string();
            trims.push((path, from, removed));
        }
        for (path, offset, text) in trims {
            self.apply(Op::RemoveText { path, offset, text })?;
        }

        for path in self.interior_element_paths(&start, &end).into_iter().rev() {
            let Some(node) = walk::node_at(&self.children, &path).cloned() else {
                continue;
            };
            self.apply(Op::RemoveNode { path, node })?;
        }

        self.select_range(Range::collapsed(start));
        Ok(())
    }

    /// Outermost elements lying strictly between the two edge leaves.
    fn interior_element_paths(&self, start: &Point, end: &Point) -> Vec<Path> {
        let mut kept: Vec<Path> = Vec::new();
        for (path, _) in walk::elements(&self.children) {
            if path <= start.path || path >= end.path {
                continue;
            }
            if path.is_prefix_of(&start.path) || path.is_prefix_of(&end.path) {
                continue;
            }
            if kept.iter().any(|k| k.is_prefix_of(&path)) {
                continue;
            }
            kept.push(path);
        }
        kept
    }

    pub fn collapse_selection(&mut self, edge: Edge) {
        let Some(range) = self.selection.clone() else {
            return;
        };
        let point = match edge {
            Edge::Start => range.start().clone(),
            Edge::End => range.end().clone(),
        };
        self.select_range(Range::collapsed(point));
    }

    /// Splits the leaves under the selection edges so the selection
    /// afterwards covers whole leaves only. Leaves marks and wrapping
    /// free to treat covered leaves as units.
    pub(crate) fn split_range_edges(&mut self) -> EditorResult<()> {
        let Some(range) = self.selection.clone() else {
            return Ok(());
        };
        if range.is_collapsed() {
            return Ok(());
        }
        let range = self.unhang_range(&range);
        let (start, end) = range.edges();
        let start = start.clone();
        let end = end.clone();

        if start.path == end.path {
            let len = walk::text_at(&self.children, &start.path)
                .map(Text::len_chars)
                .ok_or_else(|| EditorError::invalid_path(&start.path))?;
            if end.offset < len {
                self.apply(Op::SplitNode {
                    path: start.path.clone(),
                    position: end.offset,
                })?;
            }
            let mid = if start.offset > 0 {
                self.apply(Op::SplitNode {
                    path: start.path.clone(),
                    position: start.offset,
                })?;
                start
                    .path
                    .next_sibling()
                    .ok_or_else(|| EditorError::invalid_path(&start.path))?
            } else {
                start.path.clone()
            };
            let width = end.offset - start.offset;
            self.select_range(Range::new(
                Point::new(mid.clone(), 0),
                Point::new(mid, width),
            ));
            return Ok(());
        }

        // End first: splitting the start leaf may shift the end leaf's
        // path, not the other way around.
        let end_len = walk::text_at(&self.children, &end.path)
            .map(Text::len_chars)
            .ok_or_else(|| EditorError::invalid_path(&end.path))?;
        if end.offset > 0 && end.offset < end_len {
            self.apply(Op::SplitNode {
                path: end.path.clone(),
                position: end.offset,
            })?;
        }
        let mut new_end = end.clone();

        let start_len = walk::text_at(&self.children, &start.path)
            .map(Text::len_chars)
            .ok_or_else(|| EditorError::invalid_path(&start.path))?;
        let mut new_start = start.clone();
        if start.offset > 0 && start.offset < start_len {
            let op = Op::SplitNode {
                path: start.path.clone(),
                position: start.offset,
            };
            self.apply(op.clone())?;
            new_start = Point::new(
                start
                    .path
                    .next_sibling()
                    .ok_or_else(|| EditorError::invalid_path(&start.path))?,
                0,
            );
            if let Some(path) = ops::transform_path(&new_end.path, &op) {
                new_end.path = path;
            }
        }
        self.select_range(Range::new(new_start, new_end));
        Ok(())
    }
}

fn set_mark_exclusive(marks: &mut Marks, mark: Mark, value: Value) -> EditorResult<()> {
    match mark {
        Mark::Superscript => marks.remove(Mark::Subscript),
        Mark::Subscript => marks.remove(Mark::Superscript),
        _ => {}
    }
    marks.set(mark, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vellum_model::Align;

    fn two_paragraphs() -> Editor {
        let mut editor = Editor::with_children(vec![
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("one"))])),
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("two"))])),
        ]);
        editor.select_range(Range::new(
            Point::new(vec![0, 0], 0),
            Point::new(vec![1, 0], 3),
        ));
        editor
    }

    #[test]
    fn wrap_then_unwrap_blocks_roundtrips() {
        let mut editor = two_paragraphs();
        editor
            .wrap_nodes(Element::block_quote(vec![]), false)
            .unwrap();
        assert_eq!(editor.children().len(), 1);
        let quote = editor.children()[0].as_element().unwrap();
        assert_eq!(quote.kind(), ElementKind::BlockQuote);
        assert_eq!(quote.children().len(), 2);

        editor
            .unwrap_nodes(&[ElementKind::BlockQuote], false)
            .unwrap();
        assert_eq!(editor.children().len(), 2);
        assert!(editor
            .children()
            .iter()
            .all(|n| n.kind() == Some(ElementKind::Paragraph)));
    }

    #[test]
    fn add_mark_splits_edges_and_marks_covered_leaves() {
        let mut editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::plain("hello world")),
        ]))]);
        editor.select_range(Range::new(
            Point::new(vec![0, 0], 2),
            Point::new(vec![0, 0], 7),
        ));
        editor.add_mark(Mark::Bold, json!(true)).unwrap();

        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].as_text().unwrap().text, "he");
        assert_eq!(children[1].as_text().unwrap().text, "llo w");
        assert_eq!(children[1].as_text().unwrap().marks.bold, Some(true));
        assert_eq!(children[2].as_text().unwrap().text, "orld");
        assert_eq!(children[2].as_text().unwrap().marks.bold, None);
    }

    #[test]
    fn add_mark_on_caret_stages_pending_marks() {
        let mut editor = two_paragraphs();
        editor.select_range(Range::collapsed(Point::new(vec![0, 0], 1)));
        editor.add_mark(Mark::Italic, json!(true)).unwrap();
        assert_eq!(editor.marks().unwrap().italic, Some(true));
        // Nothing in the tree changed.
        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 1);
        assert!(children[0].as_text().unwrap().marks.is_empty());
    }

    #[test]
    fn superscript_displaces_subscript() {
        let mut editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::plain("x2")),
        ]))]);
        editor.select_range(Range::new(
            Point::new(vec![0, 0], 1),
            Point::new(vec![0, 0], 2),
        ));
        editor.add_mark(Mark::Subscript, json!(true)).unwrap();
        editor.select_range(Range::new(
            Point::new(vec![0, 1], 0),
            Point::new(vec![0, 1], 1),
        ));
        editor.add_mark(Mark::Superscript, json!(true)).unwrap();

        let children = editor.children()[0].children().unwrap();
        let marked = children[1].as_text().unwrap();
        assert_eq!(marked.marks.superscript, Some(true));
        assert_eq!(marked.marks.subscript, None);
    }

    #[test]
    fn insert_text_with_pending_marks_makes_a_styled_leaf() {
        let mut editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::plain("hello")),
        ]))]);
        editor.select_range(Range::collapsed(Point::new(vec![0, 0], 5)));
        editor.add_mark(Mark::Bold, json!(true)).unwrap();
        editor.insert_text("!").unwrap();

        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].as_text().unwrap().text, "hello");
        let tail = children[1].as_text().unwrap();
        assert_eq!(tail.text, "!");
        assert_eq!(tail.marks.bold, Some(true));
        assert_eq!(
            editor.selection().clone().unwrap().anchor,
            Point::new(vec![0, 1], 1)
        );
    }

    #[test]
    fn insert_text_replaces_an_expanded_selection() {
        let mut editor = two_paragraphs();
        editor.select_range(Range::new(
            Point::new(vec![0, 0], 1),
            Point::new(vec![0, 0], 3),
        ));
        editor.insert_text("k").unwrap();
        let children = editor.children()[0].children().unwrap();
        assert_eq!(children[0].as_text().unwrap().text, "ok");
    }

    #[test]
    fn delete_selection_trims_edges_and_collapses() {
        let mut editor = Editor::with_children(vec![
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("hello"))])),
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("world"))])),
        ]);
        editor.select_range(Range::new(
            Point::new(vec![0, 0], 2),
            Point::new(vec![1, 0], 3),
        ));
        editor.delete_selection().unwrap();

        assert_eq!(
            editor.children()[0].children().unwrap()[0]
                .as_text()
                .unwrap()
                .text,
            "he"
        );
        assert_eq!(
            editor.children()[1].children().unwrap()[0]
                .as_text()
                .unwrap()
                .text,
            "ld"
        );
        let selection = editor.selection().clone().unwrap();
        assert!(selection.is_collapsed());
        assert_eq!(selection.anchor, Point::new(vec![0, 0], 2));
    }

    #[test]
    fn delete_selection_removes_interior_blocks() {
        let mut editor = Editor::with_children(vec![
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("aaa"))])),
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("bbb"))])),
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("ccc"))])),
        ]);
        editor.select_range(Range::new(
            Point::new(vec![0, 0], 1),
            Point::new(vec![2, 0], 2),
        ));
        editor.delete_selection().unwrap();
        assert_eq!(editor.children().len(), 2);
        assert_eq!(
            editor.children()[0].children().unwrap()[0]
                .as_text()
                .unwrap()
                .text,
            "a"
        );
        assert_eq!(
            editor.children()[1].children().unwrap()[0]
                .as_text()
                .unwrap()
                .text,
            "c"
        );
    }

    #[test]
    fn set_node_properties_patches_and_undoes() {
        let mut editor = two_paragraphs();
        let mut props = PropertyMap::new();
        props.insert("align".into(), json!("center"));
        editor
            .set_node_properties(Target::LowestBlocks, &props)
            .unwrap();
        assert!(editor
            .children()
            .iter()
            .all(|n| n.as_element().unwrap().align() == Some(Align::Center)));

        editor.undo().unwrap();
        assert!(editor
            .children()
            .iter()
            .all(|n| n.as_element().unwrap().align().is_none()));
    }

    #[test]
    fn insert_blocks_replaces_a_lone_empty_paragraph() {
        let mut editor = Editor::new();
        editor.select_range(Range::collapsed(Point::new(vec![0, 0], 0)));
        editor
            .insert_nodes(vec![Node::Element(Element::image("a.png"))], None)
            .unwrap();
        assert_eq!(editor.children().len(), 1);
        assert_eq!(editor.children()[0].kind(), Some(ElementKind::Image));
    }

    #[test]
    fn no_selection_is_a_no_op() {
        let mut editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::plain("still here")),
        ]))]);
        let before = editor.children().to_vec();
        editor.add_mark(Mark::Bold, json!(true)).unwrap();
        editor.wrap_nodes(Element::block_quote(vec![]), false).unwrap();
        editor.insert_text("nope").unwrap();
        editor.delete_selection().unwrap();
        assert_eq!(editor.children(), before.as_slice());
    }
}
