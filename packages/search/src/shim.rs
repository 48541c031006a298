//! Render-observation collection, kept as a compatibility shim.
//!
//! Some hosts let the rendering layer reflow text in ways the model cannot
//! predict; for those, the rendered output is the only trustworthy source
//! of span locations. The shim scans rendered `mark` nodes for the search
//! data attributes and reverse-maps each span into document coordinates.
//! On reflow-free renders it agrees with [`crate::collect::collect`].

use vellum_model::{walk, Node, Path, Point, Range};
use vellum_render::{VDocument, VNode};

use crate::collect::SearchResult;

/// Reverse-maps every rendered search span back into a [`SearchResult`].
/// Spans whose path no longer resolves in `children` are skipped.
pub fn collect_rendered(children: &[Node], vdoc: &VDocument) -> Vec<SearchResult> {
    let mut out = Vec::new();
    for node in vdoc.elements() {
        let Some((key, path, end)) = parse_mark(node) else {
            continue;
        };
        let Some(leaf) = walk::text_at(children, &path) else {
            continue;
        };
        let keyword = node.text_content();
        let start = end.saturating_sub(keyword.chars().count());
        out.push(SearchResult {
            key,
            search: keyword,
            node: leaf.clone(),
            range: Range::new(Point::new(path.clone(), start), Point::new(path, end)),
        });
    }
    out
}

fn parse_mark(node: &VNode) -> Option<(String, Path, usize)> {
    if node.tag() != Some("mark") {
        return None;
    }
    let key = node.attribute("data-search-key")?.to_string();
    let path = parse_path(node.attribute("data-search-path")?)?;
    let end = node.attribute("data-search-offset")?.parse().ok()?;
    Some((key, path, end))
}

fn parse_path(raw: &str) -> Option<Path> {
    let mut indices = Vec::new();
    for part in raw.split('.') {
        indices.push(part.parse().ok()?);
    }
    Some(Path::new(indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::decorate_document;
    use serde_json::json;
    use vellum_render::render_document;

    #[test]
    fn agrees_with_model_native_collection() {
        let children: Vec<Node> = serde_json::from_value(json!([
            {"type": "paragraph", "children": [{"text": "ab ab"}, {"text": "ab", "bold": true}]},
            {"type": "bulleted-list", "children": [
                {"type": "list-item", "children": [{"text": "drab"}]}
            ]}
        ]))
        .unwrap();

        let decorations = decorate_document(&children, "ab", "");
        let vdoc = render_document(&children, &decorations);

        let rendered = collect_rendered(&children, &vdoc);
        let native = crate::collect::collect(&children, "ab");
        assert_eq!(rendered, native);
    }

    #[test]
    fn plain_highlight_marks_are_ignored() {
        let children: Vec<Node> = serde_json::from_value(json!([
            {"type": "paragraph", "children": [{"text": "lit", "highlight": true}]}
        ]))
        .unwrap();
        let vdoc = render_document(&children, &[]);
        assert!(collect_rendered(&children, &vdoc).is_empty());
    }
}
