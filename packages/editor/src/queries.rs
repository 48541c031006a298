//! Read-only lookups over the editor state.

use vellum_model::{walk, Element, ElementKind, Marks, Node, Path, Point, Range};

use crate::editor::Editor;

/// A block that directly holds text (possibly with inline elements mixed
/// in). Property patches target these by default, which is why alignment
/// set on a list selection lands on the list items rather than the list.
pub(crate) fn is_lowest_block(el: &Element) -> bool {
    !el.is_inline()
        && el.children().iter().all(|child| match child {
            Node::Text(_) => true,
            Node::Element(inner) => inner.is_inline(),
        })
}

impl Editor {
    /// Marks at the caret: staged caret marks if any, otherwise the marks
    /// of the leaf holding the selection start.
    pub fn marks(&self) -> Option<Marks> {
        let range = self.selection.as_ref()?;
        if let Some(pending) = &self.pending_marks {
            return Some(pending.clone());
        }
        let start = range.start();
        walk::text_at(&self.children, &start.path).map(|leaf| leaf.marks.clone())
    }

    /// Trims a range whose end hangs at offset zero of a later leaf back
    /// to the end of the previous text leaf. Kind matching over a
    /// triple-click selection would otherwise see the next block too.
    pub fn unhang_range(&self, range: &Range) -> Range {
        if range.is_collapsed() {
            return range.clone();
        }
        let (start, end) = range.edges();
        if end.offset != 0 {
            return range.clone();
        }
        let mut prev: Option<(Path, usize)> = None;
        for (path, leaf) in walk::texts(&self.children) {
            if path >= end.path {
                break;
            }
            prev = Some((path, leaf.len_chars()));
        }
        match prev {
            Some((path, len)) if path >= start.path => Range::new(
                start.clone(),
                Point { path, offset: len },
            ),
            _ => range.clone(),
        }
    }

    pub fn nodes_in_range(&self, range: &Range) -> Vec<(Path, &Node)> {
        walk::nodes(&self.children)
            .filter(|(path, _)| range.includes_path(path))
            .collect()
    }

    /// Elements intersecting the range, outermost first in document order.
    pub fn elements_in_range(&self, range: &Range) -> Vec<(Path, &Element)> {
        walk::elements(&self.children)
            .filter(|(path, _)| range.includes_path(path))
            .collect()
    }

    pub fn lowest_blocks_in_range(&self, range: &Range) -> Vec<(Path, &Element)> {
        self.elements_in_range(range)
            .into_iter()
            .filter(|(_, el)| is_lowest_block(el))
            .collect()
    }

    /// First element intersecting the (unhung) selection, optionally
    /// filtered by kind. Returns an owned copy so callers can keep it
    /// across subsequent mutations.
    pub fn first_element_in_selection(
        &self,
        kind: Option<ElementKind>,
    ) -> Option<(Path, Element)> {
        let range = self.selection.as_ref()?;
        let range = self.unhang_range(range);
        self.elements_in_range(&range)
            .into_iter()
            .find(|(_, el)| kind.map_or(true, |k| el.kind() == k))
            .map(|(path, el)| (path, el.clone()))
    }

    pub(crate) fn lowest_block_paths_in_selection(&self) -> Vec<Path> {
        let Some(range) = self.selection.as_ref() else {
            return Vec::new();
        };
        let range = self.unhang_range(range);
        self.lowest_blocks_in_range(&range)
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    pub(crate) fn kind_paths_in_selection(&self, kinds: &[ElementKind]) -> Vec<Path> {
        let Some(range) = self.selection.as_ref() else {
            return Vec::new();
        };
        let range = self.unhang_range(range);
        self.elements_in_range(&range)
            .into_iter()
            .filter(|(_, el)| kinds.contains(&el.kind()))
            .map(|(path, _)| path)
            .collect()
    }

    /// Paths of every element currently flagged draggable, tree-wide.
    pub(crate) fn draggable_carrier_paths(&self) -> Vec<Path> {
        walk::elements(&self.children)
            .filter(|(_, el)| el.draggable() == Some(true))
            .map(|(path, _)| path)
            .collect()
    }

    /// Deepest text-holding block containing the point.
    pub(crate) fn block_path_at(&self, point: &Point) -> Option<Path> {
        let mut best = None;
        for (path, el) in walk::elements(&self.children) {
            if path.is_prefix_of(&point.path) && is_lowest_block(el) {
                best = Some(path);
            }
        }
        best
    }
}
