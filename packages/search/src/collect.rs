//! Authoritative search-result collection.
//!
//! Results are computed straight from the document tree, with keys derived
//! exactly as the decoration pass derives them, so every rendered span has
//! a matching entry here.

use serde::Serialize;
use vellum_model::{walk, Node, Point, Range, Text};

use crate::decorate::{match_offsets, search_key};

/// One keyword match: its opaque key, the keyword it matched, the owning
/// leaf and the matched range in document coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub key: String,
    pub search: String,
    pub node: Text,
    pub range: Range,
}

/// Collects every keyword match in document order. An empty keyword or a
/// document without matches yields an empty list.
pub fn collect(children: &[Node], keyword: &str) -> Vec<SearchResult> {
    if keyword.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (path, leaf) in walk::texts(children) {
        for (start, end) in match_offsets(&leaf.text, keyword) {
            out.push(SearchResult {
                key: search_key(&path, end),
                search: keyword.to_string(),
                node: leaf.clone(),
                range: Range::new(
                    Point::new(path.clone(), start),
                    Point::new(path.clone(), end),
                ),
            });
        }
    }
    out
}
