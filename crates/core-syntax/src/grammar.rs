//! Grammar collaborator contract.
//!
//! A grammar turns line text plus a carried-over continuation into a tag
//! stream (see [`crate::tags`]). The engine never interprets tag payloads
//! itself beyond the open/close/span convention documented there; everything
//! about *which* scopes exist and when rules start/stop is delegated here.

use std::sync::Arc;

/// Interned identifier for a grammar rule, used to build a [`RuleStack`].
pub type RuleId = u32;

/// Opaque grammar continuation carried across a line boundary.
///
/// Two rule stacks must compare equal exactly when the grammar would resume
/// in the same state from either of them. The tokenization engine relies on
/// this to detect a fixed point and stop re-tokenizing downstream lines
/// unaffected by an edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleStack(Arc<[RuleId]>);

impl RuleStack {
    pub fn new(ids: impl Into<Arc<[RuleId]>>) -> Self {
        Self(ids.into())
    }

    pub fn empty() -> Self {
        Self(Arc::from([]))
    }

    pub fn ids(&self) -> &[RuleId] {
        &self.0
    }
}

/// Result of tokenizing a single line of text.
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    /// Tag stream for the line; see [`crate::tags`] for the encoding.
    pub tags: Vec<i32>,
    /// Continuation to hand back in on the following line.
    pub rule_stack: RuleStack,
}

/// A live `on_did_update` registration. Dropping it stops delivery.
///
/// Grammars that never report updates after construction hand back
/// [`GrammarSubscription::noop`], which does nothing on drop.
pub struct GrammarSubscription(Option<Box<dyn FnOnce() + Send>>);

impl GrammarSubscription {
    /// Wraps an `unsubscribe` closure to run exactly once, on drop.
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(unsubscribe)))
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self(None)
    }
}

impl Drop for GrammarSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.0.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for GrammarSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarSubscription").finish()
    }
}

/// Pluggable syntax collaborator.
///
/// Implementations own their own rule/pattern tables; the engine only ever
/// sees `RuleId`s and scope ids through this trait.
pub trait Grammar: std::fmt::Debug + Send + Sync {
    /// Short name, used in diagnostics.
    fn name(&self) -> &str;

    /// Dotted root scope name, e.g. `source.rust`.
    fn scope_name(&self) -> &str;

    /// Tokenize one line. `rule_stack` is the continuation from the previous
    /// line, or `None` at the start of the buffer. `is_first_line` is passed
    /// separately because a grammar may special-case line 1 even when no
    /// continuation is available for other reasons (e.g. after a full reset).
    fn tokenize_line(
        &self,
        text: &str,
        rule_stack: Option<&RuleStack>,
        is_first_line: bool,
    ) -> TokenizeResult;

    /// Resolve an open-tag id back to its dotted scope name.
    fn scope_for_id(&self, id: i32) -> Option<&str>;

    /// Open-tag id for a scope name, used to synthesize placeholder lines.
    fn start_id_for_scope(&self, name: &str) -> i32;

    /// Close-tag id for a scope name, used to synthesize placeholder lines.
    fn end_id_for_scope(&self, name: &str) -> i32;

    /// Grammar-provided predicate used by `TokenizedLine::is_comment`.
    ///
    /// `scopes` is the open-tag scope stack active at a token, outermost
    /// first. The default never recognizes a comment.
    fn is_comment_scope(&self, scopes: &[i32]) -> bool {
        let _ = scopes;
        false
    }

    /// Whether this is the fallback "no grammar assigned" grammar. The engine
    /// special-cases this: tokenization is synchronous and trivial, so the
    /// background scheduler never has work to do.
    fn is_null_grammar(&self) -> bool {
        false
    }

    /// Registers `callback` to run whenever this grammar's rule table
    /// changes in place, e.g. when an async grammar load finishes adding
    /// rules after the grammar was already handed to an engine.
    ///
    /// The returned [`GrammarSubscription`] must be held for as long as the
    /// callback should keep firing; dropping it unsubscribes. The default
    /// implementation is for grammars that never change after construction.
    fn on_did_update(&self, callback: Arc<dyn Fn() + Send + Sync>) -> GrammarSubscription {
        let _ = callback;
        GrammarSubscription::noop()
    }
}

/// Fallback grammar for buffers with no assigned language. Produces a single
/// root-scope span per line and never needs a background pass.
#[derive(Debug, Default)]
pub struct NullGrammar;

impl Grammar for NullGrammar {
    fn name(&self) -> &str {
        "null-grammar"
    }

    fn scope_name(&self) -> &str {
        "text.plain.null-grammar"
    }

    fn tokenize_line(
        &self,
        text: &str,
        _rule_stack: Option<&RuleStack>,
        _is_first_line: bool,
    ) -> TokenizeResult {
        let len = text.len() as i32;
        let tags = if len > 0 { vec![len] } else { Vec::new() };
        TokenizeResult {
            tags,
            rule_stack: RuleStack::empty(),
        }
    }

    fn scope_for_id(&self, _id: i32) -> Option<&str> {
        None
    }

    fn start_id_for_scope(&self, _name: &str) -> i32 {
        0
    }

    fn end_id_for_scope(&self, _name: &str) -> i32 {
        0
    }

    fn is_null_grammar(&self) -> bool {
        true
    }
}

/// Sequentially assigns open/close tag ids to scope names and remembers the
/// mapping. Grammar implementations are free to use their own scheme; this
/// is a convenience for ones that just need stable interning.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    names: Vec<String>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`, returning its (open, close) tag id pair. Open ids are
    /// negative and odd; close ids are the open id minus one.
    pub fn intern(&mut self, name: &str) -> (i32, i32) {
        if let Some(idx) = self.names.iter().position(|n| n == name) {
            return Self::ids_for_index(idx);
        }
        self.names.push(name.to_string());
        Self::ids_for_index(self.names.len() - 1)
    }

    pub fn scope_for_id(&self, id: i32) -> Option<&str> {
        let idx = Self::index_for_open_id(id)?;
        self.names.get(idx).map(String::as_str)
    }

    fn ids_for_index(idx: usize) -> (i32, i32) {
        let open = -(2 * idx as i32 + 1);
        (open, open - 1)
    }

    fn index_for_open_id(id: i32) -> Option<usize> {
        if id >= 0 || id % 2 == 0 {
            return None;
        }
        Some(((-id - 1) / 2) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_registry_round_trips() {
        let mut reg = ScopeRegistry::new();
        let (open_a, close_a) = reg.intern("comment.block");
        let (open_b, _) = reg.intern("keyword.control");
        assert_ne!(open_a, open_b);
        assert_eq!(close_a, open_a - 1);
        assert_eq!(reg.scope_for_id(open_a), Some("comment.block"));
        assert_eq!(reg.scope_for_id(open_b), Some("keyword.control"));
    }

    #[test]
    fn intern_is_idempotent() {
        let mut reg = ScopeRegistry::new();
        let first = reg.intern("a.b");
        let second = reg.intern("a.b");
        assert_eq!(first, second);
    }

    #[test]
    fn null_grammar_emits_single_span() {
        let g = NullGrammar;
        let r = g.tokenize_line("hello", None, true);
        assert_eq!(r.tags, vec![5]);
        assert_eq!(r.rule_stack, RuleStack::empty());
    }

    #[test]
    fn null_grammar_emits_nothing_for_blank_line() {
        let g = NullGrammar;
        let r = g.tokenize_line("", None, false);
        assert!(r.tags.is_empty());
    }
}
