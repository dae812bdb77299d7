//! Serialization envelope for carrying tokenization cache state across a
//! session boundary (e.g. restoring an editor session after restart).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::grammar::Grammar;
use crate::invalid_rows::InvalidRowSet;

/// Portable snapshot of a [`crate::TokenizationEngine`]'s cache state.
///
/// Tokenized line contents are deliberately not part of the envelope: they
/// are cheap to rebuild from the buffer and grammar, and leaving them out
/// keeps a saved session from carrying a shadow copy of every open file's
/// syntax cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializationEnvelope {
    pub buffer_id: u64,
    pub grammar_scope_name: String,
    pub invalid_rows: InvalidRowSet,
    pub fully_tokenized: bool,
}

/// Resolves a buffer id (as stored in a [`SerializationEnvelope`]) back to a
/// live grammar, so [`SerializationEnvelope::deserialize`] can hand a fresh
/// engine its collaborator.
///
/// No implementation lives in this crate: mapping a buffer id to an open
/// buffer is a property of the host's document registry, not of
/// tokenization itself.
pub trait BufferResolver {
    fn resolve(&self, buffer_id: u64) -> Option<Arc<dyn Grammar>>;
}

impl SerializationEnvelope {
    pub fn serialize(
        buffer_id: u64,
        grammar: &dyn Grammar,
        invalid_rows: InvalidRowSet,
        fully_tokenized: bool,
    ) -> Self {
        Self {
            buffer_id,
            grammar_scope_name: grammar.scope_name().to_string(),
            invalid_rows,
            fully_tokenized,
        }
    }

    /// Resolves this envelope's grammar via `resolver`. Returns `None` if
    /// the buffer id can't be resolved in the current environment (the file
    /// was closed, or this is a different process than the one that saved
    /// the session); the caller should fall back to building a fresh
    /// engine rather than trusting the envelope's `invalid_rows`.
    pub fn deserialize(&self, resolver: &dyn BufferResolver) -> Option<Arc<dyn Grammar>> {
        resolver.resolve(self.buffer_id)
    }
}
