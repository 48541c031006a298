//! Construction-boundary validation.
//!
//! Fragments crossing into the engine (paste output, host-supplied initial
//! documents) are checked here. Inside the engine the transform layer keeps
//! the tree well-formed by normalizing after every mutation, so runtime
//! violations are programmer error rather than input error.

use thiserror::Error;

use crate::node::{ElementKind, Node};
use crate::path::Path;
use crate::text::Highlight;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("void {kind} element at {path} must hold exactly one empty text child")]
    VoidShape { kind: ElementKind, path: Path },

    #[error("{kind} element at {path} has no children")]
    EmptyElement { kind: ElementKind, path: Path },

    #[error("list container at {path} holds a non-list-item child at index {index}")]
    LooseListChild { path: Path, index: usize },

    #[error("list item at {path} sits outside a list container")]
    OrphanListItem { path: Path },

    #[error("document root holds a bare text leaf at index {index}")]
    TextAtRoot { index: usize },

    #[error("search annotation persisted in a text leaf at {path}")]
    PersistedSearch { path: Path },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Checks the shape rules a fragment must satisfy before it may enter a
/// document: void elements carry exactly one empty text child, elements are
/// never childless, and no leaf carries a search annotation. List
/// discipline is not enforced here; loose list items in pasted fragments
/// are repaired by normalization after insertion.
pub fn validate_fragment(nodes: &[Node]) -> ModelResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        check_shape(node, Path::new(vec![i]))?;
    }
    Ok(())
}

/// Full document validation: fragment shape rules, plus block-only root
/// children and list discipline.
pub fn validate_document(nodes: &[Node]) -> ModelResult<()> {
    validate_fragment(nodes)?;
    for (i, node) in nodes.iter().enumerate() {
        if node.is_text() {
            return Err(ModelError::TextAtRoot { index: i });
        }
        check_lists(node, Path::new(vec![i]), None)?;
    }
    Ok(())
}

fn check_shape(node: &Node, path: Path) -> ModelResult<()> {
    match node {
        Node::Text(text) => {
            if let Some(Highlight::Advanced(adv)) = &text.marks.highlight {
                if adv.search.is_some() {
                    return Err(ModelError::PersistedSearch { path });
                }
            }
            Ok(())
        }
        Node::Element(el) => {
            let kind = el.kind();
            let children = el.children();
            if children.is_empty() {
                return Err(ModelError::EmptyElement { kind, path });
            }
            if kind.is_void() {
                let sole_empty_text = children.len() == 1
                    && children[0].as_text().is_some_and(|t| t.text.is_empty());
                if !sole_empty_text {
                    return Err(ModelError::VoidShape { kind, path });
                }
            }
            for (i, child) in children.iter().enumerate() {
                check_shape(child, path.child(i))?;
            }
            Ok(())
        }
    }
}

fn check_lists(node: &Node, path: Path, parent: Option<ElementKind>) -> ModelResult<()> {
    let Some(el) = node.as_element() else {
        return Ok(());
    };
    let kind = el.kind();
    if kind.is_list() {
        for (i, child) in el.children().iter().enumerate() {
            if child.kind() != Some(ElementKind::ListItem) {
                return Err(ModelError::LooseListChild { path: path.clone(), index: i });
            }
        }
    }
    if kind == ElementKind::ListItem && !parent.is_some_and(|p| p.is_list()) {
        return Err(ModelError::OrphanListItem { path });
    }
    for (i, child) in el.children().iter().enumerate() {
        check_lists(child, path.child(i), Some(kind))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;
    use crate::text::{AdvancedHighlight, SearchAnnotation, Text};

    #[test]
    fn accepts_a_plain_document() {
        let doc = vec![
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("hello"))])),
            Node::Element(Element::bulleted_list(vec![Node::Element(Element::list_item(
                vec![Node::Text(Text::plain("item"))],
            ))])),
            Node::Element(Element::image("a.png")),
        ];
        assert_eq!(validate_document(&doc), Ok(()));
    }

    #[test]
    fn rejects_malformed_voids() {
        let doc = vec![Node::Element(Element::Image {
            source: crate::node::ImageSource::Remote,
            url: "a.png".into(),
            width: None,
            height: None,
            inline: None,
            float: None,
            align: None,
            children: vec![Node::Text(Text::plain("caption"))],
        })];
        assert!(matches!(
            validate_fragment(&doc),
            Err(ModelError::VoidShape { kind: ElementKind::Image, .. })
        ));
    }

    #[test]
    fn rejects_childless_elements() {
        let doc = vec![Node::Element(Element::paragraph(vec![]))];
        assert!(matches!(
            validate_fragment(&doc),
            Err(ModelError::EmptyElement { kind: ElementKind::Paragraph, .. })
        ));
    }

    #[test]
    fn fragment_allows_loose_list_items_document_does_not() {
        let nodes = vec![Node::Element(Element::list_item(vec![Node::Text(Text::plain(
            "loose",
        ))]))];
        assert_eq!(validate_fragment(&nodes), Ok(()));
        assert!(matches!(
            validate_document(&nodes),
            Err(ModelError::OrphanListItem { .. })
        ));
    }

    #[test]
    fn rejects_persisted_search_annotations() {
        let mut text = Text::plain("hit");
        text.marks.highlight = Some(Highlight::Advanced(AdvancedHighlight {
            color: "#ffff00".into(),
            search: Some(SearchAnnotation {
                key: "k".into(),
                active_color: "#ff9632".into(),
                offset: 3,
            }),
        }));
        let doc = vec![Node::Element(Element::paragraph(vec![Node::Text(text)]))];
        assert!(matches!(
            validate_fragment(&doc),
            Err(ModelError::PersistedSearch { .. })
        ));
    }
}
