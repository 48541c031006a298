//! Keyword replacement over collected results.
//!
//! Replacement trusts the collected ranges: each edit deletes exactly the
//! keyword's length at a match anchor and inserts the replacement there.
//! Every call schedules a fresh collection pass because the edits
//! invalidate all ranges, including replacements that happen to contain
//! the keyword again.

use tracing::debug;
use vellum_editor::{Editor, EditorResult};

use crate::collect::SearchResult;
use crate::session::SearchSession;

impl SearchSession {
    /// Replaces the active match, or the first match when none is active.
    /// A no-op without results.
    pub fn replace_current(&mut self, editor: &mut Editor, replacement: &str) -> EditorResult<()> {
        let state = self.get_state();
        let current = state
            .results
            .iter()
            .find(|r| !state.active_key.is_empty() && r.key == state.active_key)
            .or_else(|| state.results.first())
            .cloned();
        let Some(result) = current else {
            return Ok(());
        };

        let keyword_chars = state.keyword.chars().count();
        debug!(key = %result.key, "replacing current match");
        editor.begin_batch();
        let edit = replace_one(editor, &result, keyword_chars, replacement);
        let end = editor.end_batch();
        edit.and(end)?;

        self.force_collect();
        Ok(())
    }

    /// Replaces every collected match in one history step, walking the
    /// results in reverse document order so earlier ranges stay valid
    /// while later ones are edited.
    pub fn replace_all(&mut self, editor: &mut Editor, replacement: &str) -> EditorResult<()> {
        if self.get_state().results.is_empty() {
            return Ok(());
        }
        let results = self.get_state().results.clone();
        let keyword_chars = self.get_state().keyword.chars().count();
        debug!(count = results.len(), "replacing all matches");

        editor.begin_batch();
        let edits = (|| {
            for result in results.iter().rev() {
                replace_one(editor, result, keyword_chars, replacement)?;
            }
            Ok(())
        })();
        let end = editor.end_batch();
        edits.and(end)?;

        self.force_collect();
        Ok(())
    }
}

fn replace_one(
    editor: &mut Editor,
    result: &SearchResult,
    keyword_chars: usize,
    replacement: &str,
) -> EditorResult<()> {
    let anchor = result.range.start().clone();
    editor.delete_at(&anchor, keyword_chars)?;
    if !replacement.is_empty() {
        editor.insert_text_at(&anchor, replacement)?;
    }
    Ok(())
}
