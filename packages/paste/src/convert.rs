//! Pasted markup → document fragment.
//!
//! Two dispatch tables drive a recursive descent over the markup tree:
//! block tags build elements, inline tags apply marks to every leaf
//! beneath them, and anything unrecognized is transparently unwrapped so
//! its children survive. Nothing in here raises on strange input; the
//! worst case is flattening to plain text.

use tracing::debug;
use vellum_model::{
    validate_fragment, Element, ElementKind, ImageSource, Mark, Marks, Node, Text,
};

use crate::error::PasteResult;
use crate::markup::{self, MarkupNode};

/// Subtrees that never contribute content.
const DROP_TAGS: &[&str] = &["HEAD", "TITLE", "META", "LINK"];

/// Converts pasted markup into a document fragment ready for
/// `insert_fragment`. Empty input yields an empty fragment.
pub fn deserialize(input: &str) -> PasteResult<Vec<Node>> {
    deserialize_tree(&markup::parse(input))
}

/// Converts an already-parsed markup tree. Hosts that hand over a
/// structured clipboard payload skip the string parse.
pub fn deserialize_tree(root: &MarkupNode) -> PasteResult<Vec<Node>> {
    let fragment = convert_children(root);
    validate_fragment(&fragment)?;
    debug!(nodes = fragment.len(), "deserialized pasted markup");
    Ok(fragment)
}

fn convert_children(parent: &MarkupNode) -> Vec<Node> {
    let mut out = Vec::new();
    for child in parent.children() {
        if is_layout_artifact(child) {
            continue;
        }
        out.extend(convert_node(child));
    }
    out
}

/// Pretty-printed markup carries whitespace runs between block siblings.
/// They contain newlines; deliberate inline spacing never does.
fn is_layout_artifact(node: &MarkupNode) -> bool {
    match node {
        MarkupNode::Text(s) => s.contains('\n') && s.trim().is_empty(),
        MarkupNode::Element { .. } => false,
    }
}

fn convert_node(node: &MarkupNode) -> Vec<Node> {
    let tag = match node {
        MarkupNode::Text(s) => return vec![Node::Text(Text::plain(s.clone()))],
        MarkupNode::Element { tag, .. } => tag.as_str(),
    };
    if tag == "BR" {
        return vec![Node::Text(Text::plain("\n"))];
    }
    if DROP_TAGS.contains(&tag) {
        return Vec::new();
    }

    if tag == "IMG" {
        return vec![Node::Element(image_from(node))];
    }

    let children = convert_children(node);
    if tag == "A" {
        let link = Element::link(
            node.attribute("href").unwrap_or_default(),
            or_empty_text(children),
        );
        return vec![Node::Element(link)];
    }
    if let Some(kind) = block_kind(tag) {
        return vec![Node::Element(container(kind, children))];
    }
    if let Some(mark) = mark_for(tag) {
        let mut marked = children;
        apply_mark(&mut marked, mark);
        return marked;
    }
    // Unrecognized tag: promote the children, drop the tag.
    children
}

/// The block dispatch table. `A` and `IMG` sit outside it because they
/// read attributes.
fn block_kind(tag: &str) -> Option<ElementKind> {
    let kind = match tag {
        "BLOCKQUOTE" => ElementKind::BlockQuote,
        "H1" => ElementKind::HeadingOne,
        "H2" => ElementKind::HeadingTwo,
        "H3" => ElementKind::HeadingThree,
        "H4" => ElementKind::HeadingFour,
        "H5" => ElementKind::HeadingFive,
        "H6" => ElementKind::HeadingSix,
        "LI" => ElementKind::ListItem,
        "OL" => ElementKind::NumberedList,
        "P" => ElementKind::Paragraph,
        "UL" => ElementKind::BulletedList,
        _ => return None,
    };
    Some(kind)
}

/// The mark dispatch table.
fn mark_for(tag: &str) -> Option<Mark> {
    let mark = match tag {
        "B" | "STRONG" => Mark::Bold,
        "EM" | "I" => Mark::Italic,
        "U" => Mark::Underline,
        "S" | "DEL" | "STRIKE" => Mark::Linethrough,
        "CODE" => Mark::Code,
        _ => return None,
    };
    Some(mark)
}

fn container(kind: ElementKind, children: Vec<Node>) -> Element {
    let mut element = Element::empty_of_kind(kind);
    *element.children_mut() = or_empty_text(children);
    element
}

fn or_empty_text(children: Vec<Node>) -> Vec<Node> {
    if children.is_empty() {
        vec![Node::Text(Text::plain(""))]
    } else {
        children
    }
}

fn image_from(node: &MarkupNode) -> Element {
    Element::Image {
        source: ImageSource::Remote,
        url: node.attribute("src").unwrap_or_default().to_string(),
        width: node.attribute("width").and_then(|w| w.parse().ok()),
        height: node.attribute("height").and_then(|h| h.parse().ok()),
        inline: (node.attribute("data-element") == Some("inline")).then_some(true),
        float: None,
        align: None,
        children: vec![Node::Text(Text::plain(""))],
    }
}

fn apply_mark(nodes: &mut [Node], mark: Mark) {
    for node in nodes {
        match node {
            Node::Text(leaf) => set_flag(&mut leaf.marks, mark),
            Node::Element(el) => apply_mark(el.children_mut(), mark),
        }
    }
}

fn set_flag(marks: &mut Marks, mark: Mark) {
    match mark {
        Mark::Bold => marks.bold = Some(true),
        Mark::Italic => marks.italic = Some(true),
        Mark::Underline => marks.underline = Some(true),
        Mark::Linethrough => marks.linethrough = Some(true),
        Mark::Code => marks.code = Some(true),
        _ => {}
    }
}
