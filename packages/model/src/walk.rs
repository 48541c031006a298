//! Depth-first traversal and path-based access.

use crate::node::{Element, Node};
use crate::path::Path;
use crate::text::Text;

/// Pre-order iterator over every node in a subforest, paired with its path.
pub struct NodeIter<'a> {
    stack: Vec<(Path, &'a Node)>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = (Path, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        if let Some(children) = node.children() {
            for (i, child) in children.iter().enumerate().rev() {
                self.stack.push((path.child(i), child));
            }
        }
        Some((path, node))
    }
}

/// All nodes of the document in document order.
pub fn nodes(children: &[Node]) -> NodeIter<'_> {
    let stack = children
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (Path::new(vec![i]), node))
        .collect();
    NodeIter { stack }
}

/// All text leaves of the document in document order.
pub fn texts(children: &[Node]) -> impl Iterator<Item = (Path, &Text)> {
    nodes(children).filter_map(|(path, node)| node.as_text().map(|text| (path, text)))
}

/// All elements of the document in document order.
pub fn elements(children: &[Node]) -> impl Iterator<Item = (Path, &Element)> {
    nodes(children).filter_map(|(path, node)| node.as_element().map(|el| (path, el)))
}

pub fn node_at<'a>(children: &'a [Node], path: &Path) -> Option<&'a Node> {
    let (&first, rest) = path.as_slice().split_first()?;
    let mut node = children.get(first)?;
    for &index in rest {
        node = node.children()?.get(index)?;
    }
    Some(node)
}

pub fn node_at_mut<'a>(children: &'a mut [Node], path: &Path) -> Option<&'a mut Node> {
    let (&first, rest) = path.as_slice().split_first()?;
    let mut node = children.get_mut(first)?;
    for &index in rest {
        node = node.children_mut()?.get_mut(index)?;
    }
    Some(node)
}

pub fn element_at<'a>(children: &'a [Node], path: &Path) -> Option<&'a Element> {
    node_at(children, path).and_then(Node::as_element)
}

pub fn text_at<'a>(children: &'a [Node], path: &Path) -> Option<&'a Text> {
    node_at(children, path).and_then(Node::as_text)
}

/// Mutable child list under `parent`, with the root path resolving to the
/// top-level list itself.
pub fn siblings_mut<'a>(children: &'a mut Vec<Node>, parent: &Path) -> Option<&'a mut Vec<Node>> {
    if parent.is_empty() {
        return Some(children);
    }
    node_at_mut(children, parent)?.children_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ElementKind;

    fn sample() -> Vec<Node> {
        vec![
            Node::Element(Element::paragraph(vec![
                Node::Text(Text::plain("one")),
                Node::Element(Element::link("u", vec![Node::Text(Text::plain("two"))])),
            ])),
            Node::Element(Element::paragraph(vec![Node::Text(Text::plain("three"))])),
        ]
    }

    #[test]
    fn walk_is_preorder_document_order() {
        let doc = sample();
        let paths: Vec<Path> = nodes(&doc).map(|(p, _)| p).collect();
        let expected: Vec<Path> = [
            vec![0],
            vec![0, 0],
            vec![0, 1],
            vec![0, 1, 0],
            vec![1],
            vec![1, 0],
        ]
        .into_iter()
        .map(Path::new)
        .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn texts_yields_only_leaves() {
        let doc = sample();
        let contents: Vec<&str> = texts(&doc).map(|(_, t)| t.text.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn node_at_resolves_paths() {
        let doc = sample();
        let link = element_at(&doc, &Path::new(vec![0, 1]));
        assert_eq!(link.map(Element::kind), Some(ElementKind::Link));
        assert!(node_at(&doc, &Path::new(vec![0, 9])).is_none());
        assert!(node_at(&doc, &Path::new(vec![0, 0, 0])).is_none());
    }

    #[test]
    fn siblings_mut_resolves_root() {
        let mut doc = sample();
        let root = siblings_mut(&mut doc, &Path::root()).unwrap();
        assert_eq!(root.len(), 2);
        let inner = siblings_mut(&mut doc, &Path::new(vec![0, 1])).unwrap();
        assert_eq!(inner.len(), 1);
    }
}
