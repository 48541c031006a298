//! # Tree Operations
//!
//! The lowest mutation layer: every edit to a document decomposes into a
//! sequence of [`Op`]s. Each op carries enough state to be inverted
//! mechanically, which is what makes batched undo/redo possible without
//! snapshotting the tree.
//!
//! ## Design
//!
//! - Ops are positional: paths and offsets address the tree revision the op
//!   was built against, so callers apply them in construction order
//! - Every op has an inverse derivable from the op alone
//! - [`transform_path`] / [`transform_point`] map locations forward through
//!   an applied op; the editor uses them to keep the live selection valid

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vellum_model::text::char_to_byte;
use vellum_model::{walk, Marks, Node, Path, Point, Text};

use crate::errors::{EditorError, EditorResult};

/// Shallow JSON patch over an element's fields.
pub type PropertyMap = Map<String, Value>;

/// A single invertible mutation of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Insert `node` so that it ends up at `path`.
    InsertNode { path: Path, node: Node },

    /// Remove the node at `path`. Carries the removed node for inversion.
    RemoveNode { path: Path, node: Node },

    /// Merge `props` into the element at `path`. `Null` values delete the
    /// field. `prev` records the prior value of every touched key.
    SetNodeProps {
        path: Path,
        props: PropertyMap,
        prev: PropertyMap,
    },

    /// Replace the marks of the text leaf at `path` wholesale.
    SetMarks {
        path: Path,
        marks: Marks,
        prev: Marks,
    },

    /// Insert `text` at a character offset of the leaf at `path`.
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },

    /// Remove `text` starting at a character offset of the leaf at `path`.
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },

    /// Split the node at `path` in two. For texts `position` is a character
    /// offset, for elements a child index. The second half lands at the
    /// next sibling path.
    SplitNode { path: Path, position: usize },

    /// Merge the node at `path` into its previous sibling. `position`
    /// records the sibling's prior length so the inverse can split there.
    MergeNode { path: Path, position: usize },

    /// Relocate the node at `from` to `to`, with `to` interpreted against
    /// the tree before removal.
    MoveNode { from: Path, to: Path },
}

impl Op {
    /// Applies the op to a document forest.
    pub fn apply(&self, children: &mut Vec<Node>) -> EditorResult<()> {
        match self {
            Op::InsertNode { path, node } => {
                let (siblings, index) = siblings_and_index(children, path)?;
                if index > siblings.len() {
                    return Err(EditorError::invalid_path(path));
                }
                siblings.insert(index, node.clone());
                Ok(())
            }

            Op::RemoveNode { path, .. } => {
                let (siblings, index) = siblings_and_index(children, path)?;
                if index >= siblings.len() {
                    return Err(EditorError::invalid_path(path));
                }
                siblings.remove(index);
                Ok(())
            }

            Op::SetNodeProps { path, props, .. } => {
                for key in ["children", "text"] {
                    if props.contains_key(key) {
                        return Err(EditorError::invalid_patch(format!(
                            "property patches may not touch `{key}`"
                        )));
                    }
                }
                let el = walk::node_at_mut(children, path)
                    .ok_or_else(|| EditorError::invalid_path(path))?
                    .as_element_mut()
                    .ok_or_else(|| EditorError::NotAnElement { path: path.clone() })?;
                let mut value = el.to_value()?;
                let map = value
                    .as_object_mut()
                    .ok_or_else(|| EditorError::invalid_patch("element is not an object"))?;
                for (key, patch) in props {
                    if patch.is_null() {
                        map.remove(key);
                    } else {
                        map.insert(key.clone(), patch.clone());
                    }
                }
                *el = vellum_model::Element::from_value(value)?;
                Ok(())
            }

            Op::SetMarks { path, marks, .. } => {
                let text = text_at_mut(children, path)?;
                text.marks = marks.clone();
                Ok(())
            }

            Op::InsertText { path, offset, text } => {
                let leaf = text_at_mut(children, path)?;
                let len = leaf.len_chars();
                if *offset > len {
                    return Err(EditorError::InvalidOffset {
                        path: path.clone(),
                        offset: *offset,
                        len,
                    });
                }
                let byte = char_to_byte(&leaf.text, *offset);
                leaf.text.insert_str(byte, text);
                Ok(())
            }

            Op::RemoveText { path, offset, text } => {
                let leaf = text_at_mut(children, path)?;
                let len = leaf.len_chars();
                let chars = text.chars().count();
                if offset + chars > len {
                    return Err(EditorError::InvalidOffset {
                        path: path.clone(),
                        offset: *offset,
                        len,
                    });
                }
                let start = char_to_byte(&leaf.text, *offset);
                let end = char_to_byte(&leaf.text, offset + chars);
                leaf.text.replace_range(start..end, "");
                Ok(())
            }

            Op::SplitNode { path, position } => {
                let second = {
                    let node = walk::node_at_mut(children, path)
                        .ok_or_else(|| EditorError::invalid_path(path))?;
                    match node {
                        Node::Text(leaf) => {
                            if *position > leaf.len_chars() {
                                return Err(EditorError::InvalidSplit {
                                    path: path.clone(),
                                    position: *position,
                                });
                            }
                            let byte = char_to_byte(&leaf.text, *position);
                            let rest = leaf.text.split_off(byte);
                            Node::Text(Text::with_marks(rest, leaf.marks.clone()))
                        }
                        Node::Element(el) => {
                            if *position > el.children().len() {
                                return Err(EditorError::InvalidSplit {
                                    path: path.clone(),
                                    position: *position,
                                });
                            }
                            let mut twin = el.clone();
                            let tail = el.children_mut().split_off(*position);
                            *twin.children_mut() = tail;
                            Node::Element(twin)
                        }
                    }
                };
                let (siblings, index) = siblings_and_index(children, path)?;
                siblings.insert(index + 1, second);
                Ok(())
            }

            Op::MergeNode { path, .. } => {
                let (siblings, index) = siblings_and_index(children, path)?;
                if index == 0 || index >= siblings.len() {
                    return Err(EditorError::InvalidMerge { path: path.clone() });
                }
                // Text merges into text, element into element. Mixed
                // merges would not be invertible.
                let compatible = matches!(
                    (&siblings[index - 1], &siblings[index]),
                    (Node::Text(_), Node::Text(_)) | (Node::Element(_), Node::Element(_))
                );
                if !compatible {
                    return Err(EditorError::InvalidMerge { path: path.clone() });
                }
                let removed = siblings.remove(index);
                match (&mut siblings[index - 1], removed) {
                    (Node::Text(prev), Node::Text(leaf)) => prev.text.push_str(&leaf.text),
                    (Node::Element(prev), Node::Element(el)) => {
                        prev.children_mut().extend(el.children().iter().cloned())
                    }
                    _ => unreachable!("merge compatibility checked above"),
                }
                Ok(())
            }

            Op::MoveNode { from, to } => {
                if from == to {
                    return Ok(());
                }
                if from.is_prefix_of(to) {
                    return Err(EditorError::invalid_path(to));
                }
                let removed = {
                    let (siblings, index) = siblings_and_index(children, from)?;
                    if index >= siblings.len() {
                        return Err(EditorError::invalid_path(from));
                    }
                    siblings.remove(index)
                };
                let target = remove_shift(to, from).ok_or_else(|| EditorError::invalid_path(to))?;
                let insert_result = (|| -> EditorResult<()> {
                    let (siblings, index) = siblings_and_index(children, &target)?;
                    if index > siblings.len() {
                        return Err(EditorError::invalid_path(&target));
                    }
                    siblings.insert(index, removed.clone());
                    Ok(())
                })();
                if insert_result.is_err() {
                    // Put the node back where it was before failing.
                    if let Ok((siblings, index)) = siblings_and_index(children, from) {
                        siblings.insert(index.min(siblings.len()), removed);
                    }
                }
                insert_result
            }
        }
    }

    /// The op that undoes this one. `None` only for degenerate paths that
    /// never come out of the transform layer.
    pub fn invert(&self) -> Option<Op> {
        match self {
            Op::InsertNode { path, node } => Some(Op::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            }),
            Op::RemoveNode { path, node } => Some(Op::InsertNode {
                path: path.clone(),
                node: node.clone(),
            }),
            Op::SetNodeProps { path, props, prev } => Some(Op::SetNodeProps {
                path: path.clone(),
                props: prev.clone(),
                prev: props.clone(),
            }),
            Op::SetMarks { path, marks, prev } => Some(Op::SetMarks {
                path: path.clone(),
                marks: prev.clone(),
                prev: marks.clone(),
            }),
            Op::InsertText { path, offset, text } => Some(Op::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            }),
            Op::RemoveText { path, offset, text } => Some(Op::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            }),
            Op::SplitNode { path, position } => Some(Op::MergeNode {
                path: path.next_sibling()?,
                position: *position,
            }),
            Op::MergeNode { path, position } => Some(Op::SplitNode {
                path: path.previous_sibling()?,
                position: *position,
            }),
            Op::MoveNode { from, to } => {
                if from == to {
                    return Some(self.clone());
                }
                // Remove from where the node landed, reinsert at the old
                // slot as the post-move tree sees it.
                let inverse_from = transform_path(from, self)?;
                let inverse_to = transform_path(&from.next_sibling()?, self)?;
                Some(Op::MoveNode {
                    from: inverse_from,
                    to: inverse_to,
                })
            }
        }
    }
}

/// Maps a path forward through an applied op. `None` means the location no
/// longer exists (it was inside a removed subtree).
pub fn transform_path(path: &Path, op: &Op) -> Option<Path> {
    if path.is_empty() {
        return Some(path.clone());
    }
    let mut p = path.as_slice().to_vec();
    match op {
        Op::InsertNode { path: ip, .. } => {
            if ip == path || ends_before(ip, path) || ip.is_ancestor_of(path) {
                p[ip.len() - 1] += 1;
            }
        }

        Op::RemoveNode { path: rp, .. } => {
            if rp == path || rp.is_ancestor_of(path) {
                return None;
            }
            if ends_before(rp, path) {
                p[rp.len() - 1] -= 1;
            }
        }

        Op::MergeNode { path: mp, position } => {
            if mp == path || ends_before(mp, path) {
                p[mp.len() - 1] -= 1;
            } else if mp.is_ancestor_of(path) {
                p[mp.len() - 1] -= 1;
                p[mp.len()] += position;
            }
        }

        Op::SplitNode { path: sp, position } => {
            if sp == path {
                // The node itself stays put as the first half.
            } else if ends_before(sp, path) {
                p[sp.len() - 1] += 1;
            } else if sp.is_ancestor_of(path) && p[sp.len()] >= *position {
                p[sp.len() - 1] += 1;
                p[sp.len()] -= position;
            }
        }

        Op::MoveNode { from, to } => {
            if from == to {
                return Some(Path::new(p));
            }
            // Where the insert lands once the node is out of the tree.
            let target = remove_shift(to, from)?;
            if from.is_prefix_of(path) {
                // The node itself (or a descendant) moves wholesale.
                let mut landed = target.as_slice().to_vec();
                landed.extend_from_slice(&path.as_slice()[from.len()..]);
                return Some(Path::new(landed));
            }
            // Everyone else sees a removal at `from` followed by an
            // insert at `target`.
            let shifted = remove_shift(path, from)?;
            let mut q = shifted.as_slice().to_vec();
            if target == shifted || ends_before(&target, &shifted) || target.is_ancestor_of(&shifted)
            {
                q[target.len() - 1] += 1;
            }
            return Some(Path::new(q));
        }

        Op::SetNodeProps { .. }
        | Op::SetMarks { .. }
        | Op::InsertText { .. }
        | Op::RemoveText { .. } => {}
    }
    Some(Path::new(p))
}

/// Maps a point forward through an applied op, with forward affinity: a
/// point sitting exactly where text was inserted ends up after it.
pub fn transform_point(point: &Point, op: &Op) -> Option<Point> {
    let mut p = point.clone();
    match op {
        Op::InsertText { path, offset, text } => {
            if *path == p.path && *offset <= p.offset {
                p.offset += text.chars().count();
            }
        }

        Op::RemoveText { path, offset, text } => {
            if *path == p.path && *offset <= p.offset {
                let removed = text.chars().count();
                p.offset -= (p.offset - offset).min(removed);
            }
        }

        Op::SplitNode { path, position } => {
            if *path == p.path {
                if p.offset >= *position {
                    p.path = path.next_sibling()?;
                    p.offset -= position;
                }
            } else {
                p.path = transform_path(&p.path, op)?;
            }
        }

        Op::MergeNode { path, position } => {
            if *path == p.path {
                p.offset += position;
            }
            p.path = transform_path(&p.path, op)?;
        }

        Op::InsertNode { .. } | Op::RemoveNode { .. } | Op::MoveNode { .. } => {
            p.path = transform_path(&p.path, op)?;
        }

        Op::SetNodeProps { .. } | Op::SetMarks { .. } => {}
    }
    Some(p)
}

/// True when `a` sits before `b` among the siblings at `a`'s depth.
fn ends_before(a: &Path, b: &Path) -> bool {
    if a.is_empty() || b.len() < a.len() {
        return false;
    }
    let i = a.len() - 1;
    a.as_slice()[..i] == b.as_slice()[..i] && a.as_slice()[i] < b.as_slice()[i]
}

/// Path shift caused by removing the subtree at `removed`.
fn remove_shift(path: &Path, removed: &Path) -> Option<Path> {
    if removed == path || removed.is_ancestor_of(path) {
        return None;
    }
    let mut p = path.as_slice().to_vec();
    if ends_before(removed, path) {
        p[removed.len() - 1] -= 1;
    }
    Some(Path::new(p))
}

fn siblings_and_index<'a>(
    children: &'a mut Vec<Node>,
    path: &Path,
) -> EditorResult<(&'a mut Vec<Node>, usize)> {
    let parent = path.parent().ok_or_else(|| EditorError::invalid_path(path))?;
    let index = path.index().ok_or_else(|| EditorError::invalid_path(path))?;
    let siblings = walk::siblings_mut(children, &parent)
        .ok_or_else(|| EditorError::invalid_path(path))?;
    Ok((siblings, index))
}

fn text_at_mut<'a>(children: &'a mut [Node], path: &Path) -> EditorResult<&'a mut Text> {
    walk::node_at_mut(children, path)
        .ok_or_else(|| EditorError::invalid_path(path))?
        .as_text_mut()
        .ok_or_else(|| EditorError::NotAText { path: path.clone() })
}
