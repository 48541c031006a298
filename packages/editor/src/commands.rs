//! The user-facing command surface. Commands are what toolbar buttons
//! and key bindings call; each one is a no-op without a selection and
//! lands as a single undo step.

use serde_json::{json, Value};
use tracing::debug;
use vellum_model::{walk, Align, Element, ElementKind, Mark, Node, Text, LIST_KINDS};

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::ops::{Op, PropertyMap};
use crate::transforms::{Edge, Target};

/// Options for [`Editor::toggle_draggable`].
#[derive(Debug, Clone, Default)]
pub struct DraggableOptions {
    /// Clear the flag everywhere else first, so at most one element in
    /// the document stays draggable.
    pub unique: bool,
    /// Force the flag to a value instead of toggling.
    pub draggable: Option<bool>,
}

/// Which fields [`Editor::get_element_fields_value`] reads.
#[derive(Debug, Clone, Copy)]
pub enum FieldQuery<'a> {
    /// The whole element as a JSON object.
    All,
    One(&'a str),
    Many(&'a [&'a str]),
}

/// Options for [`Editor::set_element_properties`].
#[derive(Debug, Clone, Default)]
pub struct SetPropertiesOptions {
    /// Rebuild the element from its patched JSON instead of patching in
    /// place. Needed when the patch changes the element's shape, e.g.
    /// its `type`.
    pub refactor: bool,
}

impl Editor {
    /// Whether a mark is active at the selection, by truthiness of its
    /// value. `false`, an empty string and a zero size all read inactive.
    pub fn is_mark_active(&self, mark: Mark) -> bool {
        self.marks().map_or(false, |marks| marks.is_truthy(mark))
    }

    pub fn toggle_mark(&mut self, mark: Mark) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        if self.is_mark_active(mark) {
            self.remove_mark(mark)
        } else {
            self.add_mark(mark, json!(true))
        }
    }

    /// Value of a mark at the selection, e.g. the current font size.
    pub fn get_mark_property(&self, mark: Mark) -> Option<Value> {
        self.marks().and_then(|marks| marks.get(mark))
    }

    /// Sets a valued mark, overwriting any existing value.
    pub fn set_mark_property(&mut self, mark: Mark, value: Value) -> EditorResult<()> {
        self.add_mark(mark, value)
    }

    pub fn is_element_active(&self, kind: ElementKind) -> bool {
        !self.kind_paths_in_selection(&[kind]).is_empty()
    }

    /// Toggles the block kind of the selection. Toggling any kind first
    /// dissolves lists around it, so a heading applied inside a list ends
    /// up as a plain heading. Toggling a list retypes the blocks to items
    /// and wraps them.
    pub fn toggle_element(&mut self, kind: ElementKind) -> EditorResult<()> {
        if self.selection.is_none() || !kind.is_wrap_toggleable() {
            return Ok(());
        }
        let active = self.is_element_active(kind);
        let is_list = kind.is_list();
        debug!(kind = %kind, active, "toggle element");
        self.with_batch(|ed| {
            ed.unwrap_nodes(&LIST_KINDS, true)?;
            let target_type = if active {
                ElementKind::Paragraph
            } else if is_list {
                ElementKind::ListItem
            } else {
                kind
            };
            let mut props = PropertyMap::new();
            props.insert("type".into(), json!(target_type.as_str()));
            ed.set_node_properties(Target::LowestBlocks, &props)?;
            if !active && is_list {
                ed.wrap_nodes(Element::empty_of_kind(kind), false)?;
            }
            Ok(())
        })
    }

    /// Toggles alignment on the selected blocks: same value clears it,
    /// another sets it. The effective value is read off the first element
    /// in the selection, or its first item when that is a list.
    pub fn toggle_align(&mut self, align: Align) -> EditorResult<()> {
        let Some((_, first)) = self.first_element_in_selection(None) else {
            return Ok(());
        };
        let current = if first.kind().is_list() {
            first
                .children()
                .first()
                .and_then(Node::as_element)
                .and_then(Element::align)
        } else {
            first.align()
        };
        let value = if current == Some(align) {
            Value::Null
        } else {
            json!(align.as_str())
        };
        let mut props = PropertyMap::new();
        props.insert("align".into(), value);
        self.set_node_properties(Target::LowestBlocks, &props)
    }

    /// Toggles the lock flag on elements of `kind` in the selection.
    /// Inline elements cannot be locked. Callers that lock an element are
    /// expected to clear its draggable flag themselves.
    pub fn toggle_lock(&mut self, kind: ElementKind) -> EditorResult<()> {
        let Some((_, el)) = self.first_element_in_selection(Some(kind)) else {
            return Ok(());
        };
        if el.is_inline() {
            return Ok(());
        }
        let value = if el.lock() == Some(true) {
            Value::Null
        } else {
            json!(true)
        };
        let mut props = PropertyMap::new();
        props.insert("lock".into(), value);
        self.set_node_properties(Target::Kind(kind), &props)
    }

    /// Toggles the draggable flag on elements of `kind` in the selection.
    pub fn toggle_draggable(
        &mut self,
        kind: ElementKind,
        options: DraggableOptions,
    ) -> EditorResult<()> {
        let Some((_, el)) = self.first_element_in_selection(Some(kind)) else {
            return Ok(());
        };
        let target = options.draggable.unwrap_or(el.draggable() != Some(true));
        self.with_batch(|ed| {
            if options.unique && target {
                // Prior carriers lose the flag explicitly, not by deletion.
                let mut off = PropertyMap::new();
                off.insert("draggable".into(), json!(false));
                for path in ed.draggable_carrier_paths() {
                    ed.set_node_properties(Target::At(path), &off)?;
                }
            }
            let mut props = PropertyMap::new();
            props.insert(
                "draggable".into(),
                if target { json!(true) } else { Value::Null },
            );
            ed.set_node_properties(Target::Kind(kind), &props)
        })
    }

    /// True when any element in the document carries the draggable flag.
    pub fn has_draggable_nodes(&self) -> bool {
        !self.draggable_carrier_paths().is_empty()
    }

    /// Applies a link to the selection: retargets an existing link, wraps
    /// selected text, or inserts the URL as a new link at a caret.
    pub fn set_link(&mut self, url: &str) -> EditorResult<()> {
        let Some(range) = self.selection.clone() else {
            return Ok(());
        };
        debug!(url, "set link");
        if self.is_element_active(ElementKind::Link) {
            let mut props = PropertyMap::new();
            props.insert("url".into(), json!(url));
            return self.set_node_properties(Target::Kind(ElementKind::Link), &props);
        }
        if range.is_collapsed() {
            let link = Element::link(url, vec![Node::Text(Text::plain(url))]);
            return self.insert_nodes(vec![Node::Element(link)], None);
        }
        self.with_batch(|ed| {
            ed.wrap_nodes(Element::link(url, vec![]), true)?;
            ed.collapse_selection(Edge::End);
            Ok(())
        })
    }

    /// Removes links from the selection, keeping their text.
    pub fn unset_link(&mut self) -> EditorResult<()> {
        self.unwrap_nodes(&[ElementKind::Link], false)
    }

    /// Reads fields off the first matching element in the selection.
    /// Missing fields come back as `null`.
    pub fn get_element_fields_value(
        &self,
        query: FieldQuery<'_>,
        kind: Option<ElementKind>,
    ) -> Option<Value> {
        let (_, el) = self.first_element_in_selection(kind)?;
        match query {
            FieldQuery::All => el.to_value().ok(),
            FieldQuery::One(name) => Some(el.field(name).unwrap_or(Value::Null)),
            FieldQuery::Many(names) => Some(Value::Array(
                names
                    .iter()
                    .map(|name| el.field(name).unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }

    /// Patches every element of `kind` in the selection. With `refactor`
    /// the first match is rebuilt wholesale from its patched JSON, which
    /// allows shape-changing patches.
    pub fn set_element_properties(
        &mut self,
        kind: ElementKind,
        props: &PropertyMap,
        options: SetPropertiesOptions,
    ) -> EditorResult<()> {
        if !options.refactor {
            return self.set_node_properties(Target::Kind(kind), props);
        }
        let Some((path, el)) = self.first_element_in_selection(Some(kind)) else {
            return Ok(());
        };
        let mut value = el.to_value()?;
        if let Value::Object(map) = &mut value {
            for (key, patch) in props {
                if patch.is_null() {
                    map.remove(key);
                } else {
                    map.insert(key.clone(), patch.clone());
                }
            }
        }
        let rebuilt = Element::from_value(value)?;
        self.with_batch(|ed| {
            let old = walk::node_at(&ed.children, &path)
                .cloned()
                .ok_or_else(|| EditorError::invalid_path(&path))?;
            ed.apply(Op::RemoveNode {
                path: path.clone(),
                node: old,
            })?;
            ed.apply(Op::InsertNode {
                path: path.clone(),
                node: Node::Element(rebuilt),
            })
        })
    }

    /// Removes every element of `kind` in the selection.
    pub fn remove_element(&mut self, kind: ElementKind) -> EditorResult<()> {
        self.remove_nodes(Target::Kind(kind))
    }

    /// Routes pasted plain text: a bare URL becomes a link, anything else
    /// is inserted as text.
    pub fn insert_pasted_text(&mut self, text: &str) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        if is_url(text) {
            self.set_link(text.trim())
        } else {
            self.insert_text(text)
        }
    }
}

/// A pasted string counts as a URL when it is a single http(s) token.
fn is_url(text: &str) -> bool {
    let trimmed = text.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(rest) => !rest.is_empty() && !trimmed.chars().any(char::is_whitespace),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com/a?b=c"));
        assert!(is_url("  http://example.com  "));
        assert!(!is_url("http://"));
        assert!(!is_url("example.com"));
        assert!(!is_url("visit https://example.com today"));
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn commands_without_selection_do_nothing() {
        let mut editor = Editor::new();
        let before = editor.children().to_vec();
        editor.toggle_mark(Mark::Bold).unwrap();
        editor.toggle_element(ElementKind::HeadingOne).unwrap();
        editor.toggle_align(Align::Center).unwrap();
        editor.set_link("https://example.com").unwrap();
        editor.insert_pasted_text("hello").unwrap();
        assert_eq!(editor.children(), before.as_slice());
        assert!(!editor.can_undo());
        assert!(!editor.is_mark_active(Mark::Bold));
        assert_eq!(editor.get_element_fields_value(FieldQuery::All, None), None);
    }
}
