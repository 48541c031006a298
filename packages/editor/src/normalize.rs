//! Tree repair. After every top-level batch (and once when a document is
//! loaded) the tree is walked for shape violations and patched back into
//! a valid state, one fix at a time, until a fixpoint. Repair ops go
//! through [`Editor::apply`] like everything else, so they are undone
//! together with the edit that made them necessary.
//!
//! The rules, in scan priority:
//!
//! - a void element holds exactly one empty text leaf
//! - empty lists and links are dropped, other childless elements get an
//!   empty text leaf
//! - list containers hold only list items: loose blocks are retyped,
//!   loose texts and inlines are wrapped
//! - a list item outside a list becomes a paragraph
//! - a text leaf at the root is wrapped in a paragraph
//! - search annotations never persist
//! - an empty text leaf beside siblings is dropped, and neighbouring
//!   leaves with identical marks merge

use serde_json::Value;
use tracing::warn;
use vellum_model::{walk, Element, ElementKind, Highlight, Node, Path, Text};

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::ops::{Op, PropertyMap};

/// Upper bound on single-violation fixes per normalization run. A large
/// pasted fragment can legitimately need many.
const MAX_FIXES: usize = 1000;

pub(crate) fn normalize(editor: &mut Editor) -> EditorResult<()> {
    for _ in 0..MAX_FIXES {
        let Some(fix) = find_violation(editor) else {
            return Ok(());
        };
        apply_fix(editor, fix)?;
    }
    warn!("normalization did not reach a fixpoint, giving up");
    Ok(())
}

enum Fix {
    ResetVoidChildren { path: Path },
    DropEmptyContainer { path: Path },
    FillEmptyElement { path: Path },
    RetypeToListItem { path: Path },
    WrapInListItem { path: Path },
    RetypeOrphanListItem { path: Path },
    WrapRootText { path: Path },
    StripSearch { path: Path },
    DropEmptyText { path: Path },
    MergeAdjacentTexts { path: Path, position: usize },
}

fn valid_void_shape(el: &Element) -> bool {
    matches!(el.children().as_slice(), [Node::Text(t)] if t.is_empty())
}

fn has_search_annotation(leaf: &Text) -> bool {
    matches!(
        &leaf.marks.highlight,
        Some(Highlight::Advanced(adv)) if adv.search.is_some()
    )
}

fn find_violation(editor: &Editor) -> Option<Fix> {
    let children = &editor.children;
    for (path, node) in walk::nodes(children) {
        match node {
            Node::Element(el) => {
                if el.is_void() {
                    if !valid_void_shape(el) {
                        return Some(Fix::ResetVoidChildren { path });
                    }
                    continue;
                }
                if el.children().is_empty() {
                    let disposable =
                        el.kind().is_list() || el.kind() == ElementKind::Link;
                    return Some(if disposable {
                        Fix::DropEmptyContainer { path }
                    } else {
                        Fix::FillEmptyElement { path }
                    });
                }
                if el.kind().is_list() {
                    for (i, child) in el.children().iter().enumerate() {
                        match child {
                            Node::Element(inner) if inner.kind() == ElementKind::ListItem => {}
                            Node::Element(inner) if !inner.is_inline() => {
                                return Some(Fix::RetypeToListItem {
                                    path: path.child(i),
                                });
                            }
                            _ => {
                                return Some(Fix::WrapInListItem {
                                    path: path.child(i),
                                });
                            }
                        }
                    }
                }
                if el.kind() == ElementKind::ListItem {
                    let in_list = path
                        .parent()
                        .filter(|p| !p.is_empty())
                        .and_then(|p| walk::element_at(children, &p))
                        .map_or(false, |parent| parent.kind().is_list());
                    if !in_list {
                        return Some(Fix::RetypeOrphanListItem { path });
                    }
                }
            }
            Node::Text(leaf) => {
                if has_search_annotation(leaf) {
                    return Some(Fix::StripSearch { path });
                }
                let Some(parent) = path.parent() else { continue };
                let Some(index) = path.index() else { continue };
                if parent.is_empty() {
                    return Some(Fix::WrapRootText { path });
                }
                let siblings = match walk::element_at(children, &parent) {
                    Some(el) => el.children().as_slice(),
                    None => continue,
                };
                if leaf.is_empty() && siblings.len() > 1 {
                    return Some(Fix::DropEmptyText { path });
                }
                if let Some(Node::Text(next)) = siblings.get(index + 1) {
                    if next.marks == leaf.marks {
                        if let Some(next_path) = path.next_sibling() {
                            return Some(Fix::MergeAdjacentTexts {
                                path: next_path,
                                position: leaf.len_chars(),
                            });
                        }
                    }
                }
            }
        }
    }
    None
}

fn apply_fix(editor: &mut Editor, fix: Fix) -> EditorResult<()> {
    match fix {
        Fix::ResetVoidChildren { path } => {
            let count = walk::element_at(&editor.children, &path)
                .map(|el| el.children().len())
                .unwrap_or(0);
            for i in (0..count).rev() {
                let child = path.child(i);
                let Some(node) = walk::node_at(&editor.children, &child).cloned() else {
                    continue;
                };
                editor.apply(Op::RemoveNode { path: child, node })?;
            }
            editor.apply(Op::InsertNode {
                path: path.child(0),
                node: Node::Text(Text::plain("")),
            })
        }
        Fix::DropEmptyContainer { path } | Fix::DropEmptyText { path } => {
            let Some(node) = walk::node_at(&editor.children, &path).cloned() else {
                return Ok(());
            };
            editor.apply(Op::RemoveNode { path, node })
        }
        Fix::FillEmptyElement { path } => editor.apply(Op::InsertNode {
            path: path.child(0),
            node: Node::Text(Text::plain("")),
        }),
        Fix::RetypeToListItem { path } => retype(editor, path, ElementKind::ListItem),
        Fix::RetypeOrphanListItem { path } => retype(editor, path, ElementKind::Paragraph),
        Fix::WrapInListItem { path } => wrap_single(editor, path, Element::list_item(vec![])),
        Fix::WrapRootText { path } => wrap_single(editor, path, Element::paragraph(vec![])),
        Fix::StripSearch { path } => {
            let Some(prev) = walk::text_at(&editor.children, &path).map(|l| l.marks.clone())
            else {
                return Ok(());
            };
            let mut marks = prev.clone();
            marks.strip_search();
            editor.apply(Op::SetMarks { path, marks, prev })
        }
        Fix::MergeAdjacentTexts { path, position } => {
            editor.apply(Op::MergeNode { path, position })
        }
    }
}

fn retype(editor: &mut Editor, path: Path, kind: ElementKind) -> EditorResult<()> {
    let previous = walk::element_at(&editor.children, &path).map(Element::kind);
    let mut props = PropertyMap::new();
    props.insert("type".into(), Value::String(kind.as_str().to_string()));
    let mut prev = PropertyMap::new();
    if let Some(previous) = previous {
        prev.insert("type".into(), Value::String(previous.as_str().to_string()));
    }
    editor.apply(Op::SetNodeProps { path, props, prev })
}

fn wrap_single(editor: &mut Editor, path: Path, shell: Element) -> EditorResult<()> {
    editor.apply(Op::InsertNode {
        path: path.clone(),
        node: Node::Element(shell),
    })?;
    let from = path
        .next_sibling()
        .ok_or_else(|| EditorError::invalid_path(&path))?;
    editor.apply(Op::MoveNode {
        from,
        to: path.child(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::validate_document;

    #[test]
    fn loose_block_in_list_becomes_a_list_item() {
        let editor = Editor::with_children(vec![Node::Element(Element::bulleted_list(vec![
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("item"))])),
        ]))]);
        let list = editor.children()[0].as_element().unwrap();
        assert_eq!(list.children()[0].kind(), Some(ElementKind::ListItem));
        assert!(validate_document(editor.children()).is_ok());
    }

    #[test]
    fn loose_text_in_list_is_wrapped() {
        let editor = Editor::with_children(vec![Node::Element(Element::bulleted_list(vec![
            Node::Text(Text::plain("loose")),
        ]))]);
        let list = editor.children()[0].as_element().unwrap();
        let item = list.children()[0].as_element().unwrap();
        assert_eq!(item.kind(), ElementKind::ListItem);
        assert_eq!(item.children()[0].as_text().unwrap().text, "loose");
    }

    #[test]
    fn orphan_list_item_becomes_a_paragraph() {
        let editor = Editor::with_children(vec![Node::Element(Element::list_item(vec![
            Node::Text(Text::plain("stray")),
        ]))]);
        assert_eq!(editor.children()[0].kind(), Some(ElementKind::Paragraph));
    }

    #[test]
    fn void_children_are_reset() {
        let mut image = Element::image("pic.png");
        image.children_mut().clear();
        image
            .children_mut()
            .push(Node::Text(Text::plain("stowaway")));
        image
            .children_mut()
            .push(Node::Text(Text::plain("another")));
        let editor = Editor::with_children(vec![Node::Element(image)]);
        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_text().unwrap().text, "");
    }

    #[test]
    fn empty_list_is_dropped_and_empty_paragraph_is_filled() {
        let editor = Editor::with_children(vec![
            Node::Element(Element::bulleted_list(vec![])),
            Node::Element(Element::paragraph(vec![])),
        ]);
        assert_eq!(editor.children().len(), 1);
        let paragraph = editor.children()[0].as_element().unwrap();
        assert_eq!(paragraph.kind(), ElementKind::Paragraph);
        assert_eq!(paragraph.children().len(), 1);
    }

    #[test]
    fn adjacent_identical_leaves_merge() {
        let editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::plain("ab")),
            Node::Text(Text::plain("cd")),
        ]))]);
        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_text().unwrap().text, "abcd");
    }

    #[test]
    fn differently_marked_leaves_stay_apart() {
        let mut marks = vellum_model::Marks::default();
        marks.bold = Some(true);
        let editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::plain("plain")),
            Node::Text(Text::with_marks("bold", marks)),
        ]))]);
        assert_eq!(editor.children()[0].children().unwrap().len(), 2);
    }

    #[test]
    fn search_annotations_do_not_survive_a_load() {
        use vellum_model::{AdvancedHighlight, SearchAnnotation};
        let mut marks = vellum_model::Marks::default();
        marks.highlight = Some(Highlight::Advanced(AdvancedHighlight {
            color: "#ffff00".into(),
            search: Some(SearchAnnotation {
                key: "k1".into(),
                active_color: "#ff9632".into(),
                offset: 4,
            }),
        }));
        let editor = Editor::with_children(vec![Node::Element(Element::paragraph(vec![
            Node::Text(Text::with_marks("find", marks)),
        ]))]);
        let leaf = editor.children()[0].children().unwrap()[0].as_text().unwrap();
        match leaf.marks.highlight.as_ref().unwrap() {
            Highlight::Advanced(adv) => assert!(adv.search.is_none()),
            other => panic!("unexpected highlight {other:?}"),
        }
    }

    #[test]
    fn root_text_is_wrapped_in_a_paragraph() {
        let editor = Editor::with_children(vec![Node::Text(Text::plain("bare"))]);
        assert_eq!(editor.children()[0].kind(), Some(ElementKind::Paragraph));
        assert!(validate_document(editor.children()).is_ok());
    }
}
