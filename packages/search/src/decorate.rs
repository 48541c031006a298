//! The decoration pass: keyword matches → highlight spans.
//!
//! Pure functions of `(leaf, path, keyword)`. The render layer calls
//! [`decorate`] for every leaf on every pass, so nothing here may hold
//! state or allocate keys that drift between passes.

use crc32fast::Hasher;
use vellum_model::{
    walk, AdvancedHighlight, Decoration, Node, Path, Point, Range, SearchAnnotation, Text,
};

/// Background for every keyword match.
pub const HIGHLIGHT_COLOR: &str = "#ffff00";

/// Background for the active match.
pub const ACTIVE_COLOR: &str = "#ff9632";

/// Derives the opaque key for a match from its leaf path and end offset.
/// Stable across passes, so decoration spans and collected results pair up
/// by key alone.
pub fn search_key(path: &Path, end_offset: usize) -> String {
    let mut hasher = Hasher::new();
    for index in path.as_slice() {
        hasher.update(&index.to_le_bytes());
    }
    hasher.update(&end_offset.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Leftmost non-overlapping keyword matches as character offset pairs.
pub(crate) fn match_offsets(haystack: &str, keyword: &str) -> Vec<(usize, usize)> {
    if keyword.is_empty() {
        return Vec::new();
    }
    let keyword_chars = keyword.chars().count();
    let mut out = Vec::new();
    let mut chars_before = 0;
    let mut counted_to = 0;
    for (byte_index, _) in haystack.match_indices(keyword) {
        chars_before += haystack[counted_to..byte_index].chars().count();
        counted_to = byte_index;
        out.push((chars_before, chars_before + keyword_chars));
    }
    out
}

/// Emits one highlight span per keyword match in `leaf`. The span whose key
/// equals `active_key` is flagged active so it renders in [`ACTIVE_COLOR`].
pub fn decorate(leaf: &Text, path: &Path, keyword: &str, active_key: &str) -> Vec<Decoration> {
    match_offsets(&leaf.text, keyword)
        .into_iter()
        .map(|(start, end)| {
            let key = search_key(path, end);
            let active = !active_key.is_empty() && key == active_key;
            Decoration {
                range: Range::new(
                    Point::new(path.clone(), start),
                    Point::new(path.clone(), end),
                ),
                highlight: AdvancedHighlight {
                    color: HIGHLIGHT_COLOR.into(),
                    search: Some(SearchAnnotation {
                        key,
                        active_color: ACTIVE_COLOR.into(),
                        offset: end,
                    }),
                },
                active,
            }
        })
        .collect()
}

/// Decorates every leaf of a document. Convenience for hosts that hand the
/// whole set to the render layer at once.
pub fn decorate_document(children: &[Node], keyword: &str, active_key: &str) -> Vec<Decoration> {
    if keyword.is_empty() {
        return Vec::new();
    }
    walk::texts(children)
        .flat_map(|(path, leaf)| decorate(leaf, &path, keyword, active_key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_leftmost_and_disjoint() {
        assert_eq!(match_offsets("ababab", "ab"), vec![(0, 2), (2, 4), (4, 6)]);
        assert_eq!(match_offsets("aaaa", "aa"), vec![(0, 2), (2, 4)]);
        assert_eq!(match_offsets("hello", "xyz"), vec![]);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        assert_eq!(match_offsets("héllo héllo", "héllo"), vec![(0, 5), (6, 11)]);
    }

    #[test]
    fn empty_keyword_decorates_nothing() {
        let leaf = Text::plain("anything");
        assert!(decorate(&leaf, &Path::new(vec![0, 0]), "", "").is_empty());
    }

    #[test]
    fn keys_are_stable_and_position_dependent() {
        let path = Path::new(vec![0, 0]);
        assert_eq!(search_key(&path, 2), search_key(&path, 2));
        assert_ne!(search_key(&path, 2), search_key(&path, 4));
        assert_ne!(search_key(&path, 2), search_key(&Path::new(vec![1, 0]), 2));
    }

    #[test]
    fn the_active_span_is_flagged() {
        let leaf = Text::plain("ababab");
        let path = Path::new(vec![0, 0]);
        let key = search_key(&path, 4);
        let decos = decorate(&leaf, &path, "ab", &key);
        assert_eq!(decos.len(), 3);
        assert!(!decos[0].active);
        assert!(decos[1].active);
        assert_eq!(decos[1].highlight.search.as_ref().unwrap().offset, 4);
        assert!(!decos[2].active);
    }
}
