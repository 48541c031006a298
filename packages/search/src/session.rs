//! The search session: observable state plus deferred collection.
//!
//! All mutation is synchronous; the only deferred construct is a
//! single-slot pending action. Scheduling a new action replaces whatever
//! was pending, so a flush never runs against stale keyword or active-key
//! values. The host calls [`SearchSession::flush`] once the render
//! reflecting the previous state change has committed. Dropping the
//! session discards any pending action with it.

use serde::Serialize;
use tracing::debug;
use vellum_editor::Editor;

use crate::collect::{collect, SearchResult};

/// Snapshot of the search subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub keyword: String,
    pub active_key: String,
    pub results: Vec<SearchResult>,
}

/// What changed, delivered to subscribers alongside the new state.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// `results` was recomputed.
    Collected,
    /// A result became active; scroll it into view now.
    Activated(String),
    /// The whole subsystem returned to idle.
    Reset,
}

/// Handle returned by [`SearchSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SearchState, &SearchEvent)>;

#[derive(Debug, Clone, PartialEq)]
enum Deferred {
    Collect,
    Activate(String),
}

/// Owns search state for one editing session.
pub struct SearchSession {
    state: SearchState,
    /// At most one deferred action; newer schedules supersede older.
    pending: Option<Deferred>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    /// Editor version at the last collection, to skip redundant passes.
    collected_version: Option<u64>,
}

impl Default for SearchSession {
    fn default() -> SearchSession {
        SearchSession::new()
    }
}

impl SearchSession {
    pub fn new() -> SearchSession {
        SearchSession {
            state: SearchState::default(),
            pending: None,
            listeners: Vec::new(),
            next_subscription: 0,
            collected_version: None,
        }
    }

    pub fn get_state(&self) -> &SearchState {
        &self.state
    }

    /// Sets the keyword and schedules a collection pass. An empty keyword
    /// clears the results immediately and cancels anything pending.
    pub fn set_keyword(&mut self, keyword: &str) {
        if self.state.keyword == keyword {
            return;
        }
        debug!(keyword, "search keyword changed");
        self.state.keyword = keyword.to_string();
        if keyword.is_empty() {
            self.state.results.clear();
            self.pending = None;
            self.collected_version = None;
            self.notify(&SearchEvent::Collected);
        } else {
            self.pending = Some(Deferred::Collect);
        }
    }

    /// Marks one result active. The scroll notification is deferred until
    /// the activating render has committed.
    pub fn set_active_key(&mut self, key: &str) {
        self.state.active_key = key.to_string();
        self.pending = Some(Deferred::Activate(key.to_string()));
    }

    /// Returns to idle: clears keyword, active key and results in one step
    /// and cancels any pending action.
    pub fn reset(&mut self) {
        self.state = SearchState::default();
        self.pending = None;
        self.collected_version = None;
        self.notify(&SearchEvent::Reset);
    }

    /// Schedules a collection pass even when the document version has not
    /// moved. Used after replacements, which invalidate every range.
    pub fn force_collect(&mut self) {
        if !self.state.keyword.is_empty() {
            self.collected_version = None;
            self.pending = Some(Deferred::Collect);
        }
    }

    /// Host signal that the document mutated. Schedules a collection pass
    /// when a keyword is live and the version actually moved.
    pub fn document_changed(&mut self, editor: &Editor) {
        if self.state.keyword.is_empty() {
            return;
        }
        if self.collected_version == Some(editor.version()) {
            return;
        }
        self.pending = Some(Deferred::Collect);
    }

    /// Runs the pending action, if any. The host calls this once per
    /// committed render; only the most recently scheduled action runs.
    /// Returns whether anything ran.
    pub fn flush(&mut self, editor: &Editor) -> bool {
        let Some(action) = self.pending.take() else {
            return false;
        };
        match action {
            Deferred::Collect => {
                self.state.results = collect(editor.children(), &self.state.keyword);
                self.collected_version = Some(editor.version());
                debug!(
                    keyword = %self.state.keyword,
                    results = self.state.results.len(),
                    "search results collected"
                );
                self.notify(&SearchEvent::Collected);
            }
            Deferred::Activate(key) => {
                self.notify(&SearchEvent::Activated(key));
            }
        }
        true
    }

    /// Registers a listener for state changes. Listeners fire synchronously
    /// inside the call that changes state.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SearchState, &SearchEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    fn notify(&mut self, event: &SearchEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state, event);
        }
    }
}
