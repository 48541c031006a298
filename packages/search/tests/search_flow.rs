//! End-to-end search flows: keyword → decorate → render → collect →
//! activate → replace, the way a host drives them.

use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use vellum_editor::Editor;
use vellum_model::{Node, Point, Range};
use vellum_render::render_document;
use vellum_search::{
    collect_rendered, decorate_document, SearchEvent, SearchSession, ACTIVE_COLOR,
    HIGHLIGHT_COLOR,
};

fn editor_from(value: serde_json::Value) -> Editor {
    let children: Vec<Node> = serde_json::from_value(value).unwrap();
    Editor::with_children(children)
}

fn root_text(editor: &Editor, index: usize) -> String {
    match &editor.children()[index] {
        Node::Element(el) => el
            .children()
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.text.as_str()),
                Node::Element(_) => None,
            })
            .collect(),
        Node::Text(t) => t.text.clone(),
    }
}

#[test]
fn test_two_phase_keyword_search() {
    let editor = editor_from(json!([
        {"type": "paragraph", "children": [{"text": "ababab"}]}
    ]));
    let mut session = SearchSession::new();

    session.set_keyword("ab");
    // Phase one: the state knows the keyword but has no results yet.
    assert_eq!(session.get_state().keyword, "ab");
    assert!(session.get_state().results.is_empty());

    // The host renders with decorations, then flushes.
    let decorations = decorate_document(editor.children(), "ab", "");
    assert_eq!(decorations.len(), 3);
    session.flush(&editor);

    let results = &session.get_state().results;
    assert_eq!(results.len(), 3);
    let spans: Vec<(usize, usize)> = results
        .iter()
        .map(|r| (r.range.start().offset, r.range.end().offset))
        .collect();
    assert_eq!(spans, vec![(0, 2), (2, 4), (4, 6)]);
    for result in results {
        assert_eq!(result.search, "ab");
        assert_eq!(result.node.text, "ababab");
    }
}

#[test]
fn test_rendered_collection_matches_the_model() {
    let editor = editor_from(json!([
        {"type": "heading-one", "children": [{"text": "Search me"}]},
        {"type": "bulleted-list", "children": [
            {"type": "list-item", "children": [{"text": "searching"}]},
            {"type": "list-item", "children": [{"text": "nothing here"}]}
        ]}
    ]));
    let mut session = SearchSession::new();
    session.set_keyword("earch");
    session.flush(&editor);

    let decorations = decorate_document(editor.children(), "earch", "");
    let vdoc = render_document(editor.children(), &decorations);
    let rendered = collect_rendered(editor.children(), &vdoc);

    assert_eq!(rendered, session.get_state().results);
    assert_eq!(rendered.len(), 2);
}

#[test]
fn test_activation_recolors_and_notifies_after_flush() {
    let editor = editor_from(json!([
        {"type": "paragraph", "children": [{"text": "ab ab"}]}
    ]));
    let mut session = SearchSession::new();
    let events: Rc<RefCell<Vec<SearchEvent>>> = Rc::default();
    let sink = Rc::clone(&events);
    session.subscribe(move |_, event| sink.borrow_mut().push(event.clone()));

    session.set_keyword("ab");
    session.flush(&editor);
    let key = session.get_state().results[1].key.clone();

    session.set_active_key(&key);
    // The activating render picks up the colour immediately.
    let decorations = decorate_document(editor.children(), "ab", &key);
    let vdoc = render_document(editor.children(), &decorations);
    let marks: Vec<_> = vdoc
        .elements()
        .into_iter()
        .filter(|n| n.attribute("data-search-key").is_some())
        .collect();
    assert_eq!(marks[0].style("background-color"), Some(HIGHLIGHT_COLOR));
    assert_eq!(marks[1].style("background-color"), Some(ACTIVE_COLOR));

    // The scroll notification waits for the flush.
    assert!(!events
        .borrow()
        .iter()
        .any(|e| matches!(e, SearchEvent::Activated(_))));
    session.flush(&editor);
    assert_eq!(
        events.borrow().last(),
        Some(&SearchEvent::Activated(key.clone()))
    );
}

#[test]
fn test_edits_schedule_a_recollection() {
    let mut editor = editor_from(json!([
        {"type": "paragraph", "children": [{"text": "ab"}]}
    ]));
    let mut session = SearchSession::new();
    session.set_keyword("ab");
    session.flush(&editor);
    assert_eq!(session.get_state().results.len(), 1);

    editor.select_range(Range::new(
        Point::new(vec![0, 0], 2),
        Point::new(vec![0, 0], 2),
    ));
    editor.insert_text("ab").unwrap();

    session.document_changed(&editor);
    session.flush(&editor);
    assert_eq!(session.get_state().results.len(), 2);
}

#[test]
fn test_replace_current_walks_matches_one_by_one() {
    let mut editor = editor_from(json!([
        {"type": "paragraph", "children": [{"text": "one fish two fish"}]}
    ]));
    let mut session = SearchSession::new();
    session.set_keyword("fish");
    session.flush(&editor);
    assert_eq!(session.get_state().results.len(), 2);

    session.replace_current(&mut editor, "cat").unwrap();
    assert_eq!(root_text(&editor, 0), "one cat two fish");

    // Ranges were invalidated; the forced pass recollects before the next
    // replacement.
    session.flush(&editor);
    assert_eq!(session.get_state().results.len(), 1);
    session.replace_current(&mut editor, "cat").unwrap();
    assert_eq!(root_text(&editor, 0), "one cat two cat");

    session.flush(&editor);
    assert!(session.get_state().results.is_empty());
}

#[test]
fn test_reset_always_returns_to_idle() {
    let editor = editor_from(json!([
        {"type": "paragraph", "children": [{"text": "ab ab"}]}
    ]));
    let mut session = SearchSession::new();
    session.set_keyword("ab");
    session.flush(&editor);
    session.set_active_key(&session.get_state().results[0].key.clone());

    session.reset();
    let state = session.get_state();
    assert_eq!(state.keyword, "");
    assert_eq!(state.active_key, "");
    assert!(state.results.is_empty());
    // Idempotent.
    session.reset();
    assert_eq!(session.get_state().keyword, "");
}

#[test]
fn test_marks_survive_replacement() {
    let mut editor = editor_from(json!([
        {"type": "paragraph", "children": [
            {"text": "plain ab "},
            {"text": "bold ab", "bold": true}
        ]}
    ]));
    let mut session = SearchSession::new();
    session.set_keyword("ab");
    session.flush(&editor);

    session.replace_all(&mut editor, "cd").unwrap();
    assert_eq!(root_text(&editor, 0), "plain cd bold cd");
    match &editor.children()[0] {
        Node::Element(el) => {
            let leaves: Vec<&vellum_model::Text> = el
                .children()
                .iter()
                .filter_map(|n| match n {
                    Node::Text(t) => Some(t),
                    Node::Element(_) => None,
                })
                .collect();
            assert_eq!(leaves.len(), 2);
            assert_eq!(leaves[1].marks.bold, Some(true));
        }
        Node::Text(_) => panic!("expected a paragraph"),
    }
}
