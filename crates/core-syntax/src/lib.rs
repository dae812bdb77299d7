//! Incremental syntax tokenization for a line-oriented text buffer.
//!
//! [`TokenizationEngine`] keeps a per-row cache of [`TokenizedLine`]s fresh
//! as a buffer is edited, doing the work in small background chunks rather
//! than blocking on the whole file. It never reads buffer content on its own
//! initiative; callers drive it by calling [`TokenizationEngine::buffer_did_change`]
//! on edits and [`TokenizationEngine::run_pending_chunk`] once per tick while
//! [`TokenizationEngine::has_pending_chunk`] is true.
//!
//! The buffer itself is an external collaborator, reached only through the
//! [`TextSource`] trait so this crate never needs to know about rope storage,
//! grapheme segmentation, or any of `core-text`'s other concerns.

mod engine;
mod events;
mod grammar;
mod invalid_rows;
mod queries;
mod scope_class;
mod selector;
mod serialization;
mod tags;
mod tokenized_line;

#[cfg(test)]
mod testutil;

pub use engine::{BufferEdit, TokenizationEngine, DEFAULT_CHUNK_SIZE};
pub use events::TokenizeEvent;
pub use grammar::{Grammar, NullGrammar, RuleId, RuleStack, ScopeRegistry, TokenizeResult};
pub use invalid_rows::InvalidRowSet;
pub use queries::{indent_level_for_line, indent_level_for_row};
pub use scope_class::{cached_css_classes_for_scope, css_classes_for_scope};
pub use selector::{DottedSelector, ScopeSelector};
pub use serialization::{BufferResolver, SerializationEnvelope};
pub use tags::scopes_from_tags;
pub use tokenized_line::{LineEnding, Token, TokenizedLine};

use core_text::Position;

/// Read-only view of a line-oriented text buffer, as seen by the
/// tokenization engine and its queries.
///
/// `core-text`'s `Buffer` implements this directly; anything else that can
/// answer these questions about its own content works too.
pub trait TextSource {
    /// Number of lines in the buffer. A buffer always has at least one line,
    /// even if it is empty.
    fn line_count(&self) -> usize;

    /// Text of a line, excluding its line ending. `None` if `row` is out of
    /// range.
    fn line_for_row(&self, row: usize) -> Option<String>;

    /// Line ending used by a line. `LineEnding::None` for the last line of a
    /// buffer that doesn't end in a newline, and for out-of-range rows.
    fn line_ending_for_row(&self, row: usize) -> LineEnding;

    /// Byte length of a line, excluding its line ending.
    fn line_byte_len(&self, row: usize) -> usize;

    /// Whether a line consists only of whitespace (or is out of range).
    fn is_row_blank(&self, row: usize) -> bool;

    /// The next row after `row` that is not blank, if any.
    fn next_non_blank_row(&self, row: usize) -> Option<usize>;

    /// Stable identifier for the buffer, used by the serialization envelope.
    fn id(&self) -> u64;

    /// Display path for the buffer, used in diagnostics. `None` for
    /// buffers with no backing file.
    fn path(&self) -> Option<&str>;

    /// Full buffer contents, used only for diagnostic reporting on a
    /// malformed tag stream.
    fn full_text(&self) -> String;

    /// Index of the last row in the buffer.
    fn last_row(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// Clips `position` into the buffer's valid range, the way every query
    /// in this crate expects its input already clipped.
    fn clip_position(&self, mut position: Position) -> Position {
        position.clamp_to(self.line_count(), |row| self.line_byte_len(row));
        position
    }
}

fn strip_line_ending(s: &str) -> (String, LineEnding) {
    if let Some(stripped) = s.strip_suffix("\r\n") {
        (stripped.to_string(), LineEnding::CrLf)
    } else if let Some(stripped) = s.strip_suffix('\n') {
        (stripped.to_string(), LineEnding::Lf)
    } else {
        (s.to_string(), LineEnding::None)
    }
}

impl TextSource for core_text::Buffer {
    fn line_count(&self) -> usize {
        core_text::Buffer::line_count(self)
    }

    fn line_for_row(&self, row: usize) -> Option<String> {
        core_text::Buffer::line(self, row).map(|s| strip_line_ending(&s).0)
    }

    fn line_ending_for_row(&self, row: usize) -> LineEnding {
        core_text::Buffer::line(self, row)
            .map(|s| strip_line_ending(&s).1)
            .unwrap_or(LineEnding::None)
    }

    fn line_byte_len(&self, row: usize) -> usize {
        core_text::Buffer::line_byte_len(self, row)
    }

    fn is_row_blank(&self, row: usize) -> bool {
        TextSource::line_for_row(self, row)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    }

    fn next_non_blank_row(&self, row: usize) -> Option<usize> {
        let count = TextSource::line_count(self);
        let mut r = row + 1;
        while r < count {
            if !TextSource::is_row_blank(self, r) {
                return Some(r);
            }
            r += 1;
        }
        None
    }

    fn id(&self) -> u64 {
        0
    }

    fn path(&self) -> Option<&str> {
        Some(self.name.as_str())
    }

    fn full_text(&self) -> String {
        let count = TextSource::line_count(self);
        (0..count)
            .map(|r| core_text::Buffer::line(self, r).unwrap_or_default())
            .collect()
    }
}
