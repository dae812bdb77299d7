//! Events emitted by [`crate::TokenizationEngine`] so a host can know when
//! to re-render or re-query without polling the whole cache.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeEvent {
    /// The engine's grammar was replaced. Always emitted before any
    /// `DidTokenize`/`DidInvalidateRange` event resulting from the same
    /// change.
    DidChangeGrammar,
    /// Rows `range` (end exclusive) were re-tokenized and may now render
    /// differently.
    DidInvalidateRange(Range<usize>),
    /// The buffer transitioned from not-fully-tokenized to fully-tokenized.
    /// Fired at most once per transition.
    DidTokenize,
}
