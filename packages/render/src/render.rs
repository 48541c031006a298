//! Document tree → virtual DOM.
//!
//! Rendering is a pure function of the tree plus a set of transient
//! decorations. Mark wrappers nest in a fixed order so identical marks
//! always produce identical structure, and decorated leaves split into
//! one segment per search span.

use vellum_model::{
    text::char_to_byte, walk, Decoration, Element, ElementKind, FontSize, Highlight, Mark, Node,
    Path, Text,
};

use crate::vdom::{VDocument, VNode};

/// Renders a whole document. `decorations` carry search highlights; pass
/// an empty slice when there are none.
pub fn render_document(children: &[Node], decorations: &[Decoration]) -> VDocument {
    VDocument::new(render_nodes(children, &Path::root(), decorations))
}

/// Renders with a decoration callback invoked once per text leaf, the
/// contract hosts plug their own highlighters into.
pub fn render_with<F>(children: &[Node], decorate: F) -> VDocument
where
    F: Fn(&Text, &Path) -> Vec<Decoration>,
{
    let decorations: Vec<Decoration> = walk::texts(children)
        .flat_map(|(path, leaf)| decorate(leaf, &path))
        .collect();
    render_document(children, &decorations)
}

fn render_nodes(children: &[Node], base: &Path, decorations: &[Decoration]) -> Vec<VNode> {
    let mut out = Vec::new();
    for (i, node) in children.iter().enumerate() {
        let path = base.child(i);
        match node {
            Node::Element(el) => out.push(render_element(el, &path, decorations)),
            Node::Text(leaf) => out.extend(render_leaf(leaf, &path, decorations)),
        }
    }
    out
}

fn tag_for(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Paragraph => "p",
        ElementKind::HeadingOne => "h1",
        ElementKind::HeadingTwo => "h2",
        ElementKind::HeadingThree => "h3",
        ElementKind::HeadingFour => "h4",
        ElementKind::HeadingFive => "h5",
        ElementKind::HeadingSix => "h6",
        ElementKind::BlockQuote => "blockquote",
        ElementKind::BulletedList => "ul",
        ElementKind::NumberedList => "ol",
        ElementKind::ListItem => "li",
        ElementKind::CheckListItem => "div",
        ElementKind::Link => "a",
        ElementKind::Image => "img",
        ElementKind::Video => "video",
        ElementKind::Audio => "audio",
        ElementKind::Formula => "span",
        ElementKind::Table => "table",
        ElementKind::TableRow => "tr",
        ElementKind::TableCell => "td",
    }
}

fn string_field(el: &Element, name: &str) -> Option<String> {
    el.field(name)
        .and_then(|v| v.as_str().map(str::to_string))
}

fn number_field(el: &Element, name: &str) -> Option<f64> {
    el.field(name).and_then(|v| v.as_f64())
}

pub fn render_element(el: &Element, path: &Path, decorations: &[Decoration]) -> VNode {
    let kind = el.kind();
    let mut node = VNode::element(tag_for(kind));
    if let Some(align) = el.align() {
        node = node.with_style("text-align", align.as_str());
    }
    match kind {
        ElementKind::Paragraph => {
            // Hosts gate editing and drag handles off these.
            if el.lock() == Some(true) {
                node = node.with_attr("data-lock", "true");
            }
            if el.draggable() == Some(true) {
                node = node.with_attr("data-draggable", "true");
            }
        }
        ElementKind::Link => {
            if let Some(url) = string_field(el, "url") {
                node = node.with_attr("href", url);
            }
        }
        ElementKind::Image => {
            if let Some(url) = string_field(el, "url") {
                node = node.with_attr("src", url);
            }
            if let Some(width) = number_field(el, "width") {
                node = node.with_style("width", format!("{width}px"));
            }
            if let Some(height) = number_field(el, "height") {
                node = node.with_style("height", format!("{height}px"));
            }
            if let Some(float) = string_field(el, "float") {
                node = node.with_style("float", float);
            }
        }
        ElementKind::Video | ElementKind::Audio => {
            if let Some(url) = string_field(el, "url") {
                node = node.with_attr("src", url);
            }
            node = node.with_attr("controls", "");
        }
        ElementKind::Formula => {
            if let Some(latex) = string_field(el, "latex") {
                node = node.with_attr("data-latex", latex);
            }
        }
        ElementKind::CheckListItem => {
            let checked = el
                .field("checked")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            node = node
                .with_attr("data-checked", checked.to_string())
                .with_child(checkbox(checked));
        }
        _ => {}
    }
    if kind.is_void() {
        // Void content is presentation-owned; the single empty leaf
        // never renders.
        if el.is_inline() {
            node = node.with_style("display", "inline-block");
        }
        return node;
    }
    node.with_children(render_nodes(el.children(), path, decorations))
}

fn checkbox(checked: bool) -> VNode {
    let input = VNode::element("input").with_attr("type", "checkbox");
    if checked {
        input.with_attr("checked", "")
    } else {
        input
    }
}

fn render_leaf(leaf: &Text, path: &Path, decorations: &[Decoration]) -> Vec<VNode> {
    let mut spans: Vec<(usize, usize, &Decoration)> = decorations
        .iter()
        .filter(|d| d.range.start().path == *path)
        .map(|d| (d.range.start().offset, d.range.end().offset, d))
        .collect();
    if spans.is_empty() {
        return vec![wrap_marks(leaf, VNode::text(leaf.text.clone()))];
    }
    spans.sort_by_key(|(start, _, _)| *start);

    let mut out = Vec::new();
    let mut cursor = 0;
    for (start, end, deco) in spans {
        if start > cursor {
            out.push(wrap_marks(leaf, text_segment(leaf, cursor, start)));
        }
        let body = wrap_marks(leaf, text_segment(leaf, start, end));
        out.push(search_wrapper(deco, path, body));
        cursor = end;
    }
    let total = leaf.len_chars();
    if cursor < total {
        out.push(wrap_marks(leaf, text_segment(leaf, cursor, total)));
    }
    out
}

fn text_segment(leaf: &Text, from: usize, to: usize) -> VNode {
    let text = &leaf.text[char_to_byte(&leaf.text, from)..char_to_byte(&leaf.text, to)];
    VNode::text(text)
}

fn search_wrapper(deco: &Decoration, path: &Path, body: VNode) -> VNode {
    let color = match (&deco.highlight.search, deco.active) {
        (Some(search), true) => search.active_color.as_str(),
        _ => deco.highlight.color.as_str(),
    };
    let mut node = VNode::element("mark").with_style("background-color", color);
    if let Some(search) = &deco.highlight.search {
        node = node
            .with_attr("data-search-key", search.key.clone())
            .with_attr("data-search-offset", search.offset.to_string())
            .with_attr("data-search-path", path.to_string());
    }
    node.with_child(body)
}

/// Wraps a text node in the leaf's mark elements, innermost first. The
/// nesting order is fixed: strong, code, em, u, s, styled span, mark,
/// sup/sub outermost.
fn wrap_marks(leaf: &Text, body: VNode) -> VNode {
    let marks = &leaf.marks;
    let mut node = body;
    if marks.is_truthy(Mark::Bold) {
        node = VNode::element("strong").with_child(node);
    }
    if marks.is_truthy(Mark::Code) {
        node = VNode::element("code").with_child(node);
    }
    if marks.is_truthy(Mark::Italic) {
        node = VNode::element("em").with_child(node);
    }
    if marks.is_truthy(Mark::Underline) {
        node = VNode::element("u").with_child(node);
    }
    if marks.is_truthy(Mark::Linethrough) {
        node = VNode::element("s").with_child(node);
    }

    let mut styles: Vec<(&str, String)> = Vec::new();
    if let Some(color) = marks.color.as_deref().filter(|c| !c.is_empty()) {
        styles.push(("color", color.to_string()));
    }
    match &marks.fontsize {
        Some(FontSize::Number(size)) if *size != 0.0 => {
            styles.push(("font-size", format!("{size}px")));
        }
        Some(FontSize::Custom(size)) if !size.is_empty() => {
            styles.push(("font-size", size.clone()));
        }
        _ => {}
    }
    if !styles.is_empty() {
        let mut span = VNode::element("span");
        for (key, value) in styles {
            span = span.with_style(key, value);
        }
        node = span.with_child(node);
    }

    match &marks.highlight {
        Some(Highlight::Flag(true)) => {
            node = VNode::element("mark").with_child(node);
        }
        Some(Highlight::Advanced(adv)) => {
            node = VNode::element("mark")
                .with_style("background-color", adv.color.clone())
                .with_child(node);
        }
        _ => {}
    }

    if marks.is_truthy(Mark::Superscript) {
        node = VNode::element("sup").with_child(node);
    }
    if marks.is_truthy(Mark::Subscript) {
        node = VNode::element("sub").with_child(node);
    }
    node
}
