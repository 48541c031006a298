//! # Vellum Search
//!
//! Keyword search over a document, in two cooperating passes:
//!
//! ```text
//! set_keyword ──► decorate (pure, per leaf, every render)
//!                     │
//!                 render commits
//!                     │
//! flush ────────► collect (authoritative results, keyed like the pass)
//! ```
//!
//! The decoration pass runs on every render and owns no state; the
//! [`SearchSession`] owns the state and defers collection until the host
//! confirms the render has committed. Results are collected straight from
//! the model by default; [`collect_rendered`] keeps the old
//! scan-the-rendered-output path alive for hosts that reflow text.
//!
//! ```rust,ignore
//! use vellum_search::SearchSession;
//!
//! let mut session = SearchSession::new();
//! session.set_keyword("kitten");
//! // ... host renders with decorate_document(...) ...
//! session.flush(&editor);
//! println!("{} matches", session.get_state().results.len());
//! ```

pub mod collect;
pub mod decorate;
pub mod replace;
pub mod session;
pub mod shim;

pub use collect::{collect, SearchResult};
pub use decorate::{decorate, decorate_document, search_key, ACTIVE_COLOR, HIGHLIGHT_COLOR};
pub use session::{SearchEvent, SearchSession, SearchState, SubscriptionId};
pub use shim::collect_rendered;
