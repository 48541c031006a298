//! Points, ranges and selections over the document tree.

use serde::{Deserialize, Serialize};

use crate::path::Path;
use crate::text::AdvancedHighlight;

/// A position inside a text leaf: the leaf's path plus a character offset
/// into its content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Point {
        Point {
            path: path.into(),
            offset,
        }
    }
}

/// A span between two points. `anchor` is where the selection started,
/// `focus` where it ends; focus may precede anchor (backward selection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Range {
        Range { anchor, focus }
    }

    /// Zero-width range at a single point.
    pub fn collapsed(point: Point) -> Range {
        Range {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// The two points in document order.
    pub fn edges(&self) -> (&Point, &Point) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.edges().0
    }

    pub fn end(&self) -> &Point {
        self.edges().1
    }

    /// Whether the subtree at `path` intersects this range. Points sit in
    /// text leaves, so a path intersects when it is neither wholly before
    /// the start leaf nor wholly after the end leaf.
    pub fn includes_path(&self, path: &Path) -> bool {
        let (start, end) = self.edges();
        let after_start = *path >= start.path || path.is_prefix_of(&start.path);
        let before_end = *path <= end.path || path.is_prefix_of(&end.path);
        after_start && before_end
    }
}

/// The editor selection: `None` when the document has no cursor.
pub type Selection = Option<Range>;

/// A transient highlight span attached to a text leaf by the decoration
/// pass. Decorations never persist in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub range: Range,
    pub highlight: AdvancedHighlight,
    /// Set when this span is the active search result.
    pub active: bool,
}
