//! Background-scheduled tokenization cache.
//!
//! The engine never touches the buffer on its own: a host drives it with
//! three calls --
//!
//! * [`TokenizationEngine::buffer_did_change`] after every edit,
//! * [`TokenizationEngine::run_pending_chunk`] once per tick while
//!   [`TokenizationEngine::has_pending_chunk`] is true,
//! * [`TokenizationEngine::tokenized_line_for_row`] / `_for_rows` whenever a
//!   caller needs a line's tokens right now, tokenized or not.
//!
//! Edits and background chunking both flow through the same fixed-point
//! rule: stop re-tokenizing downstream rows as soon as a freshly rebuilt
//! row's rule stack equals what was already cached there, since every row
//! after that point would tokenize identically to before.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::events::TokenizeEvent;
use crate::grammar::{Grammar, GrammarSubscription, RuleStack};
use crate::invalid_rows::InvalidRowSet;
use crate::tags::scopes_from_tags;
use crate::tokenized_line::TokenizedLine;
use crate::TextSource;

/// Default number of rows processed per background chunk or eagerly after
/// an edit before the rest is deferred to the scheduler.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// A single-buffer-row-granular edit, as reported by the buffer.
///
/// `start` is shared between the old and new extents: edits don't move
/// their own starting row, only how many rows follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferEdit {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl BufferEdit {
    pub fn new(start: usize, old_end: usize, new_end: usize) -> Self {
        Self {
            start,
            old_end,
            new_end,
        }
    }

    fn delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }
}

/// Incremental tokenization cache for one buffer.
#[derive(Debug)]
pub struct TokenizationEngine {
    grammar: Arc<dyn Grammar>,
    tab_length: usize,
    large_file_mode: bool,
    chunk_size: usize,
    tokenized_lines: Vec<Option<TokenizedLine>>,
    invalid_rows: InvalidRowSet,
    fully_tokenized: bool,
    visible: bool,
    pending_chunk: bool,
    alive: bool,
    grammar_update_pending: Arc<AtomicBool>,
    grammar_subscription: GrammarSubscription,
}

impl TokenizationEngine {
    pub fn new(grammar: Arc<dyn Grammar>, tab_length: usize, large_file_mode: bool) -> Self {
        let grammar_update_pending = Arc::new(AtomicBool::new(false));
        let grammar_subscription = Self::subscribe(grammar.as_ref(), &grammar_update_pending);
        Self {
            grammar,
            tab_length: tab_length.max(1),
            large_file_mode,
            chunk_size: DEFAULT_CHUNK_SIZE,
            tokenized_lines: Vec::new(),
            invalid_rows: InvalidRowSet::new(),
            fully_tokenized: false,
            visible: false,
            pending_chunk: false,
            alive: true,
            grammar_update_pending,
            grammar_subscription,
        }
    }

    /// Subscribes to `grammar`'s update notifications, flipping `flag` on
    /// whenever it fires. The returned subscription must be held for the
    /// duration the engine should keep reacting to that grammar.
    fn subscribe(grammar: &dyn Grammar, flag: &Arc<AtomicBool>) -> GrammarSubscription {
        let flag = Arc::clone(flag);
        grammar.on_did_update(Arc::new(move || {
            flag.store(true, Ordering::Relaxed);
        }))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn tab_length(&self) -> usize {
        self.tab_length
    }

    pub fn is_fully_tokenized(&self) -> bool {
        self.fully_tokenized
    }

    pub fn invalid_row_count(&self) -> usize {
        self.invalid_rows.len()
    }

    pub fn has_pending_chunk(&self) -> bool {
        self.pending_chunk || self.grammar_update_pending.load(Ordering::Relaxed)
    }

    pub(crate) fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    pub(crate) fn resolve_scope_names(&self, scope_ids: &[i32]) -> Vec<String> {
        scope_ids
            .iter()
            .filter_map(|&id| self.grammar.scope_for_id(id).map(str::to_string))
            .collect()
    }

    /// Resets the cache to one empty slot per line and kicks off
    /// tokenization from row 0, unless the grammar is the null grammar or
    /// the buffer is in large-file mode, in which case rows are left to be
    /// synthesized on demand.
    pub fn retokenize_lines(&mut self, buffer: &dyn TextSource) -> Vec<TokenizeEvent> {
        let line_count = TextSource::line_count(buffer);
        self.tokenized_lines = vec![None; line_count];
        self.invalid_rows.clear();
        self.pending_chunk = false;

        if self.large_file_mode {
            return self.mark_tokenization_complete();
        }
        if self.grammar.is_null_grammar() {
            for row in 0..line_count {
                let line = self.build_line(row, buffer, None, &[]);
                self.tokenized_lines[row] = Some(line);
            }
            return self.mark_tokenization_complete();
        }

        self.fully_tokenized = line_count == 0;
        if line_count == 0 {
            return Vec::new();
        }
        self.invalidate_row(0);
        Vec::new()
    }

    /// Replaces the grammar. A no-op if `grammar` is the same instance
    /// already in use.
    pub fn set_grammar(
        &mut self,
        grammar: Arc<dyn Grammar>,
        buffer: &dyn TextSource,
    ) -> Vec<TokenizeEvent> {
        if Arc::ptr_eq(&self.grammar, &grammar) {
            return Vec::new();
        }
        tracing::debug!(
            target: "syntax.engine",
            grammar = grammar.name(),
            "grammar replaced, retokenizing"
        );
        self.grammar_update_pending.store(false, Ordering::Relaxed);
        self.grammar_subscription = Self::subscribe(grammar.as_ref(), &self.grammar_update_pending);
        self.grammar = grammar;
        let mut events = vec![TokenizeEvent::DidChangeGrammar];
        events.extend(self.retokenize_lines(buffer));
        events
    }

    /// Marks whether the buffer is currently visible. Background
    /// tokenization only runs while visible; becoming visible with
    /// outstanding invalid rows immediately requests a chunk.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible && !self.invalid_rows.is_empty() {
            self.tokenize_in_background();
        }
    }

    /// Requests that [`Self::run_pending_chunk`] be called on the next
    /// tick. A no-op while invisible, dead, or already pending.
    pub fn tokenize_in_background(&mut self) {
        if self.pending_chunk || !self.visible || !self.alive {
            return;
        }
        self.pending_chunk = true;
    }

    /// Applies a row-granular edit: rebases pending invalid rows, splices
    /// the cache, and (for a real grammar, outside large-file mode)
    /// eagerly rebuilds the edited rows up to one chunk's worth before
    /// leaving the rest to the background scheduler.
    pub fn buffer_did_change(&mut self, edit: BufferEdit, buffer: &dyn TextSource) -> Vec<TokenizeEvent> {
        if !self.alive {
            return Vec::new();
        }
        let delta = edit.delta();
        self.invalid_rows.rebase(edit.start, edit.old_end, delta);

        let previous_end_stack = self.rule_stack_at(edit.old_end);

        let old_count = edit.old_end - edit.start + 1;
        let new_count = edit.new_end - edit.start + 1;
        let splice_start = edit.start.min(self.tokenized_lines.len());
        let splice_end = (edit.start + old_count).min(self.tokenized_lines.len());
        self.tokenized_lines
            .splice(splice_start..splice_end, vec![None; new_count]);

        if self.large_file_mode {
            return Vec::new();
        }

        if self.grammar.is_null_grammar() {
            for row in edit.start..=edit.new_end {
                let line = self.build_line(row, buffer, None, &[]);
                self.set_line(row, line);
            }
            return Vec::new();
        }

        let (stack, open_scopes) = self.seed_for_row(edit.start, buffer);
        self.build_rows(edit.start, edit.new_end, stack, open_scopes, buffer);

        let new_end_stack = self.rule_stack_at(edit.new_end);
        if new_end_stack.is_some() && new_end_stack != previous_end_stack {
            let next_row = edit.new_end + 1;
            if next_row < TextSource::line_count(buffer) {
                self.invalidate_row(next_row);
            }
        }
        Vec::new()
    }

    /// Processes up to one chunk's worth of invalid rows. Intended to be
    /// called once per tick while [`Self::has_pending_chunk`] is true.
    pub fn run_pending_chunk(&mut self, buffer: &dyn TextSource) -> Vec<TokenizeEvent> {
        self.pending_chunk = false;
        if !self.alive {
            return Vec::new();
        }
        let mut events = Vec::new();

        if self.grammar_update_pending.swap(false, Ordering::Relaxed) {
            tracing::debug!(
                target: "syntax.engine",
                grammar = self.grammar.name(),
                "grammar update observed, retokenizing"
            );
            events.extend(self.retokenize_lines(buffer));
        }

        let last_row = TextSource::last_row(buffer);
        let mut budget = self.chunk_size;

        while budget > 0 {
            let Some(start_row) = self.invalid_rows.min() else {
                break;
            };
            if start_row > last_row {
                self.invalid_rows.pop_min();
                continue;
            }
            self.invalid_rows.pop_min();

            let (mut stack, mut open_scopes) = self.seed_for_row(start_row, buffer);
            let mut row = start_row;
            let end_row;
            let reached_fixed_point;
            loop {
                let previous_stack = self.rule_stack_at(row);
                let line = self.build_line(row, buffer, stack.as_ref(), &open_scopes);
                let new_stack = line.rule_stack.clone();
                let next_open_scopes =
                    scopes_from_tags(&line.open_scopes, &line.tags, self.grammar.as_ref(), buffer);
                self.set_line(row, line);
                budget -= 1;

                if budget == 0 {
                    end_row = row;
                    reached_fixed_point = false;
                    break;
                }
                if row == last_row {
                    end_row = row;
                    reached_fixed_point = true;
                    break;
                }
                if previous_stack.as_ref() == Some(&new_stack) {
                    end_row = row;
                    reached_fixed_point = true;
                    break;
                }
                stack = Some(new_stack);
                open_scopes = next_open_scopes;
                row += 1;
            }

            self.invalid_rows.validate_up_to(end_row);
            if reached_fixed_point {
                tracing::trace!(
                    target: "syntax.engine",
                    start_row,
                    end_row,
                    "fixed point reached, stopping rebuild early"
                );
            } else {
                self.invalidate_row(end_row + 1);
            }
            tracing::debug!(
                target: "syntax.engine",
                start_row,
                end_row,
                rows_remaining = self.invalid_rows.len(),
                "chunk drained"
            );
            events.push(TokenizeEvent::DidInvalidateRange(start_row..end_row + 1));
        }

        if !self.invalid_rows.is_empty() {
            self.tokenize_in_background();
        } else {
            let newly_complete = !self.fully_tokenized;
            events.extend(self.mark_tokenization_complete());
            if newly_complete {
                tracing::debug!(target: "syntax.engine", "tokenization complete");
            }
        }
        events
    }

    /// Returns the cached (or freshly synthesized) tokenized line for `row`.
    /// Synthesizing stores the placeholder so later callers see the same
    /// value until the real tokenization pass overwrites it.
    pub fn tokenized_line_for_row(
        &mut self,
        row: usize,
        buffer: &dyn TextSource,
    ) -> Option<TokenizedLine> {
        if row > TextSource::last_row(buffer) {
            return None;
        }
        if let Some(Some(line)) = self.tokenized_lines.get(row) {
            return Some(line.clone());
        }
        let placeholder = self.synthesize_placeholder(row, buffer);
        self.set_line(row, placeholder.clone());
        Some(placeholder)
    }

    pub fn tokenized_lines_for_rows(
        &mut self,
        start: usize,
        end: usize,
        buffer: &dyn TextSource,
    ) -> Vec<TokenizedLine> {
        (start..=end)
            .filter_map(|row| self.tokenized_line_for_row(row, buffer))
            .collect()
    }

    /// Tears down the engine: no further background work runs, and the
    /// cache is dropped.
    pub fn destroy(&mut self) {
        self.alive = false;
        self.pending_chunk = false;
        self.tokenized_lines.clear();
        self.invalid_rows.clear();
        self.grammar_subscription = GrammarSubscription::noop();
        self.grammar_update_pending.store(false, Ordering::Relaxed);
    }

    fn invalidate_row(&mut self, row: usize) {
        self.invalid_rows.insert(row);
        if !self.large_file_mode && !self.grammar.is_null_grammar() {
            self.fully_tokenized = false;
        }
        self.tokenize_in_background();
    }

    fn mark_tokenization_complete(&mut self) -> Vec<TokenizeEvent> {
        let was_complete = self.fully_tokenized;
        self.fully_tokenized = true;
        if was_complete {
            Vec::new()
        } else {
            vec![TokenizeEvent::DidTokenize]
        }
    }

    fn rule_stack_at(&self, row: usize) -> Option<RuleStack> {
        self.tokenized_lines
            .get(row)
            .and_then(|slot| slot.as_ref())
            .map(|line| line.rule_stack.clone())
    }

    /// Rule stack and start-of-line scope stack to use when (re)building
    /// `row`, derived from row `row - 1`'s cached line.
    fn seed_for_row(&self, row: usize, buffer: &dyn TextSource) -> (Option<RuleStack>, Vec<i32>) {
        let Some(prev_row) = row.checked_sub(1) else {
            return (None, Vec::new());
        };
        match self.tokenized_lines.get(prev_row).and_then(|s| s.as_ref()) {
            Some(prev) => {
                let stack = Some(prev.rule_stack.clone());
                let open_scopes =
                    scopes_from_tags(&prev.open_scopes, &prev.tags, self.grammar.as_ref(), buffer);
                (stack, open_scopes)
            }
            None => (None, Vec::new()),
        }
    }

    /// Eagerly builds rows `[start, end]`, stopping after one chunk's worth
    /// and invalidating wherever it stopped so the scheduler picks up the
    /// rest.
    fn build_rows(
        &mut self,
        start: usize,
        end: usize,
        mut stack: Option<RuleStack>,
        mut open_scopes: Vec<i32>,
        buffer: &dyn TextSource,
    ) {
        let limit = start + self.chunk_size;
        let mut row = start;
        while row <= end && row < limit {
            let line = self.build_line(row, buffer, stack.as_ref(), &open_scopes);
            open_scopes =
                scopes_from_tags(&line.open_scopes, &line.tags, self.grammar.as_ref(), buffer);
            stack = Some(line.rule_stack.clone());
            self.set_line(row, line);
            row += 1;
        }
        if row <= end {
            self.invalidate_row(row);
        }
    }

    fn build_line(
        &self,
        row: usize,
        buffer: &dyn TextSource,
        rule_stack: Option<&RuleStack>,
        open_scopes: &[i32],
    ) -> TokenizedLine {
        let text = TextSource::line_for_row(buffer, row).unwrap_or_default();
        let line_ending = TextSource::line_ending_for_row(buffer, row);
        let result = self.grammar.tokenize_line(&text, rule_stack, row == 0);
        TokenizedLine {
            text,
            line_ending,
            tags: result.tags,
            rule_stack: result.rule_stack,
            open_scopes: open_scopes.to_vec(),
            grammar: self.grammar.clone(),
        }
    }

    fn synthesize_placeholder(&self, row: usize, buffer: &dyn TextSource) -> TokenizedLine {
        let text = TextSource::line_for_row(buffer, row).unwrap_or_default();
        let line_ending = TextSource::line_ending_for_row(buffer, row);
        let root_scope = self.grammar.scope_name().to_string();
        let open = self.grammar.start_id_for_scope(&root_scope);
        let close = self.grammar.end_id_for_scope(&root_scope);
        let len = text.len() as i32;
        let mut tags = vec![open];
        if len > 0 {
            tags.push(len);
        }
        tags.push(close);
        TokenizedLine {
            text,
            line_ending,
            tags,
            rule_stack: RuleStack::empty(),
            open_scopes: Vec::new(),
            grammar: self.grammar.clone(),
        }
    }

    fn set_line(&mut self, row: usize, line: TokenizedLine) {
        if row >= self.tokenized_lines.len() {
            self.tokenized_lines.resize(row + 1, None);
        }
        self.tokenized_lines[row] = Some(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{NullGrammar, ScopeRegistry, TokenizeResult};
    use crate::testutil::VecBuffer;

    /// A grammar whose rule stack just counts the cumulative number of
    /// `{` minus `}` seen so far (as a single-element stack), enough to
    /// exercise multi-line continuation, fixed-point detection, and
    /// comment-scope folding without needing a real pattern engine.
    #[derive(Debug)]
    struct BraceGrammar {
        registry: std::sync::Mutex<ScopeRegistry>,
    }

    impl BraceGrammar {
        fn new() -> Self {
            Self {
                registry: std::sync::Mutex::new(ScopeRegistry::new()),
            }
        }
    }

    impl Grammar for BraceGrammar {
        fn name(&self) -> &str {
            "brace"
        }
        fn scope_name(&self) -> &str {
            "source.brace"
        }
        fn tokenize_line(
            &self,
            text: &str,
            rule_stack: Option<&RuleStack>,
            _is_first_line: bool,
        ) -> TokenizeResult {
            let depth_in = rule_stack
                .and_then(|s| s.ids().first().copied())
                .unwrap_or(0);
            let opens = text.matches('{').count() as u32;
            let closes = text.matches('}').count() as u32;
            let depth_out = depth_in + opens - closes.min(depth_in + opens);
            let tags = if text.is_empty() {
                Vec::new()
            } else {
                vec![text.len() as i32]
            };
            TokenizeResult {
                tags,
                rule_stack: RuleStack::new(vec![depth_out]),
            }
        }
        fn scope_for_id(&self, _id: i32) -> Option<&str> {
            None
        }
        fn start_id_for_scope(&self, name: &str) -> i32 {
            self.registry.lock().unwrap().intern(name).0
        }
        fn end_id_for_scope(&self, name: &str) -> i32 {
            self.registry.lock().unwrap().intern(name).1
        }
    }

    #[test]
    fn retokenize_under_null_grammar_builds_every_line_eagerly() {
        let buffer = VecBuffer::new(vec!["hello".to_string(), "world".to_string()]);
        let mut engine = TokenizationEngine::new(Arc::new(NullGrammar), 4, false);
        let events = engine.retokenize_lines(&buffer);
        assert!(engine.is_fully_tokenized());
        assert_eq!(engine.invalid_row_count(), 0);
        assert_eq!(events, vec![TokenizeEvent::DidTokenize]);
        let line0 = engine.tokenized_line_for_row(0, &buffer).unwrap();
        assert_eq!(line0.tags, vec![5]);
        let line1 = engine.tokenized_line_for_row(1, &buffer).unwrap();
        assert_eq!(line1.tags, vec![5]);
    }

    #[test]
    fn retokenize_under_large_file_mode_marks_complete_without_building() {
        let buffer = VecBuffer::new(vec!["hello".to_string(), "world".to_string()]);
        let mut engine = TokenizationEngine::new(Arc::new(NullGrammar), 4, true);
        engine.retokenize_lines(&buffer);
        assert!(engine.is_fully_tokenized());
        assert_eq!(engine.invalid_row_count(), 0);
    }

    #[test]
    fn background_chunk_processes_invalid_rows_and_reaches_fixed_point() {
        let buffer = VecBuffer::new(vec![
            "a {".to_string(),
            "b".to_string(),
            "c }".to_string(),
            "d".to_string(),
        ]);
        let mut engine =
            TokenizationEngine::new(Arc::new(BraceGrammar::new()), 4, false).with_chunk_size(10);
        engine.set_visible(true);
        engine.retokenize_lines(&buffer);
        assert!(engine.has_pending_chunk());
        let events = engine.run_pending_chunk(&buffer);
        assert!(!engine.has_pending_chunk());
        assert!(engine.is_fully_tokenized());
        assert!(events.contains(&TokenizeEvent::DidTokenize));
    }

    #[test]
    fn edit_beyond_rule_stack_change_invalidates_following_row() {
        let mut buffer = VecBuffer::new(vec![
            "a {".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        let mut engine =
            TokenizationEngine::new(Arc::new(BraceGrammar::new()), 4, false).with_chunk_size(10);
        engine.set_visible(true);
        engine.retokenize_lines(&buffer);
        engine.run_pending_chunk(&buffer);
        assert!(engine.is_fully_tokenized());

        // Insert an unmatched "{" on row 1, changing its outgoing rule stack.
        buffer.set_line(1, "b {".to_string());
        let edit = BufferEdit::new(1, 1, 1);
        engine.buffer_did_change(edit, &buffer);
        assert!(!engine.is_fully_tokenized());
        assert_eq!(engine.invalid_row_count(), 1);

        engine.run_pending_chunk(&buffer);
        assert!(engine.is_fully_tokenized());
    }

    #[test]
    fn destroy_stops_further_background_work() {
        let buffer = VecBuffer::new(vec!["a {".to_string(), "b".to_string()]);
        let mut engine =
            TokenizationEngine::new(Arc::new(BraceGrammar::new()), 4, false).with_chunk_size(10);
        engine.set_visible(true);
        engine.retokenize_lines(&buffer);
        engine.destroy();
        assert!(!engine.has_pending_chunk());
        engine.tokenize_in_background();
        assert!(!engine.has_pending_chunk());
    }

    /// A grammar that reports no rule-table changes on its own, but exposes
    /// `fire_update` so a test can simulate an async grammar load finishing
    /// after the grammar is already in use.
    #[derive(Default)]
    struct ReloadingGrammar {
        registry: std::sync::Mutex<ScopeRegistry>,
        callback: std::sync::Mutex<Option<Arc<dyn Fn() + Send + Sync>>>,
    }

    impl std::fmt::Debug for ReloadingGrammar {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ReloadingGrammar").finish()
        }
    }

    impl ReloadingGrammar {
        fn fire_update(&self) {
            if let Some(cb) = self.callback.lock().unwrap().as_ref() {
                cb();
            }
        }
    }

    impl Grammar for ReloadingGrammar {
        fn name(&self) -> &str {
            "reloading"
        }
        fn scope_name(&self) -> &str {
            "source.reloading"
        }
        fn tokenize_line(
            &self,
            text: &str,
            _rule_stack: Option<&RuleStack>,
            _is_first_line: bool,
        ) -> TokenizeResult {
            let tags = if text.is_empty() {
                Vec::new()
            } else {
                vec![text.len() as i32]
            };
            TokenizeResult {
                tags,
                rule_stack: RuleStack::empty(),
            }
        }
        fn scope_for_id(&self, _id: i32) -> Option<&str> {
            None
        }
        fn start_id_for_scope(&self, name: &str) -> i32 {
            self.registry.lock().unwrap().intern(name).0
        }
        fn end_id_for_scope(&self, name: &str) -> i32 {
            self.registry.lock().unwrap().intern(name).1
        }
        fn on_did_update(&self, callback: Arc<dyn Fn() + Send + Sync>) -> GrammarSubscription {
            *self.callback.lock().unwrap() = Some(callback);
            GrammarSubscription::noop()
        }
    }

    #[test]
    fn grammar_update_after_set_grammar_triggers_retokenize() {
        let buffer = VecBuffer::new(vec!["hello".to_string()]);
        let grammar = Arc::new(ReloadingGrammar::default());
        let mut engine = TokenizationEngine::new(Arc::new(NullGrammar), 4, false);
        engine.set_visible(true);
        engine.retokenize_lines(&buffer);

        let events = engine.set_grammar(grammar.clone(), &buffer);
        assert!(events.contains(&TokenizeEvent::DidChangeGrammar));
        engine.run_pending_chunk(&buffer);
        assert!(engine.is_fully_tokenized());
        assert!(!engine.has_pending_chunk());

        // Simulate the grammar's async rule load finishing after the fact.
        grammar.fire_update();
        assert!(engine.has_pending_chunk());

        let events = engine.run_pending_chunk(&buffer);
        assert!(!engine.has_pending_chunk());
        assert!(events.contains(&TokenizeEvent::DidTokenize));
    }

    #[test]
    fn on_demand_query_synthesizes_placeholder_before_tokenization_runs() {
        let buffer = VecBuffer::new(vec!["a {".to_string(), "b".to_string()]);
        let mut engine =
            TokenizationEngine::new(Arc::new(BraceGrammar::new()), 4, false).with_chunk_size(10);
        engine.retokenize_lines(&buffer);
        // No run_pending_chunk yet: row 1 is still invalid.
        let line = engine.tokenized_line_for_row(1, &buffer).unwrap();
        assert_eq!(line.text, "b");
    }
}
