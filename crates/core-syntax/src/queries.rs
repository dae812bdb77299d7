//! Position- and row-based queries over a [`TokenizationEngine`]'s cache.

use core_text::Position;

use crate::engine::TokenizationEngine;
use crate::selector::ScopeSelector;
use crate::tags::scopes_from_tags;
use crate::tokenized_line::Token;
use crate::TextSource;

impl TokenizationEngine {
    /// Ordered scope-name stack active at `position`.
    ///
    /// If `position` falls inside a token, that token's scopes are
    /// returned. Past the last token (including on an empty line) the full
    /// end-of-line scope stack is returned, which is exactly what a cursor
    /// sitting at the end of the line would see.
    pub fn scope_descriptor_for_position(
        &mut self,
        buffer: &dyn TextSource,
        position: Position,
    ) -> Vec<String> {
        let clipped = buffer.clip_position(position);
        let Some(line) = self.tokenized_line_for_row(clipped.line, buffer) else {
            return Vec::new();
        };
        let tokens = line.tokens();
        for tok in &tokens {
            if clipped.byte < tok.end {
                return self.resolve_scope_names(&tok.scopes);
            }
        }
        let end_stack = scopes_from_tags(&line.open_scopes, &line.tags, self.grammar(), buffer);
        self.resolve_scope_names(&end_stack)
    }

    /// Token covering `position`, if any.
    pub fn token_for_position(
        &mut self,
        buffer: &dyn TextSource,
        position: Position,
    ) -> Option<Token> {
        let clipped = buffer.clip_position(position);
        let line = self.tokenized_line_for_row(clipped.line, buffer)?;
        line.token_at_buffer_column(clipped.byte)
    }

    /// Start position of the token covering `position`.
    pub fn token_start_position_for_position(
        &mut self,
        buffer: &dyn TextSource,
        position: Position,
    ) -> Option<Position> {
        let clipped = buffer.clip_position(position);
        let line = self.tokenized_line_for_row(clipped.line, buffer)?;
        let start = line.token_start_column_for_buffer_column(clipped.byte)?;
        Some(Position::new(clipped.line, start))
    }

    /// Widest contiguous byte range (within a single row) around `position`
    /// whose tokens all match `selector`. `None` if the token at `position`
    /// itself doesn't match.
    pub fn buffer_range_for_scope_at_position(
        &mut self,
        buffer: &dyn TextSource,
        selector: &dyn ScopeSelector,
        position: Position,
    ) -> Option<(usize, usize, usize)> {
        let clipped = buffer.clip_position(position);
        let line = self.tokenized_line_for_row(clipped.line, buffer)?;
        let tokens = line.tokens();
        let idx = tokens.iter().position(|t| clipped.byte < t.end).or_else(|| {
            if tokens.last().is_some_and(|t| clipped.byte == t.end) {
                Some(tokens.len() - 1)
            } else {
                None
            }
        })?;

        if !selector.matches(&self.resolve_scope_names(&tokens[idx].scopes)) {
            return None;
        }

        let mut left = idx;
        while left > 0 && selector.matches(&self.resolve_scope_names(&tokens[left - 1].scopes)) {
            left -= 1;
        }
        let mut right = idx;
        while right + 1 < tokens.len()
            && selector.matches(&self.resolve_scope_names(&tokens[right + 1].scopes))
        {
            right += 1;
        }
        Some((clipped.line, tokens[left].start, tokens[right].end))
    }

    /// Whether `row` can be folded, either because a following line is more
    /// indented than a non-comment `row`, or because `row` begins a
    /// contiguous run of comment lines.
    pub fn is_foldable_at_row(&mut self, buffer: &dyn TextSource, row: usize) -> bool {
        if row > TextSource::last_row(buffer) {
            return false;
        }
        self.is_foldable_code_at_row(buffer, row) || self.is_foldable_comment_at_row(buffer, row)
    }

    fn is_foldable_code_at_row(&mut self, buffer: &dyn TextSource, row: usize) -> bool {
        if buffer.is_row_blank(row) {
            return false;
        }
        let is_comment = self
            .tokenized_line_for_row(row, buffer)
            .map(|l| l.is_comment())
            .unwrap_or(false);
        if is_comment {
            return false;
        }
        let Some(next) = buffer.next_non_blank_row(row) else {
            return false;
        };
        indent_level_for_row(buffer, next, self.tab_length())
            > indent_level_for_row(buffer, row, self.tab_length())
    }

    fn is_foldable_comment_at_row(&mut self, buffer: &dyn TextSource, row: usize) -> bool {
        let row_is_comment = self
            .tokenized_line_for_row(row, buffer)
            .map(|l| l.is_comment())
            .unwrap_or(false);
        if !row_is_comment {
            return false;
        }
        let prev_is_comment = match row.checked_sub(1) {
            Some(prev) => self
                .tokenized_line_for_row(prev, buffer)
                .map(|l| l.is_comment())
                .unwrap_or(false),
            None => false,
        };
        if prev_is_comment {
            return false;
        }
        if row + 1 > TextSource::last_row(buffer) {
            return false;
        }
        self.tokenized_line_for_row(row + 1, buffer)
            .map(|l| l.is_comment())
            .unwrap_or(false)
    }
}

/// Indent level of a line's leading whitespace, expanding tabs to the next
/// multiple of `tab_length`. Fractional when a tab doesn't land on a
/// `tab_length` boundary.
pub fn indent_level_for_line(line: &str, tab_length: usize) -> f64 {
    let tab_length = tab_length.max(1);
    let mut col = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => col += 1,
            '\t' => col += tab_length - (col % tab_length),
            _ => break,
        }
    }
    col as f64 / tab_length as f64
}

/// Indent level of `row`. Blank rows take the larger of the (ceiled) indent
/// levels of the nearest non-blank rows before and after.
pub fn indent_level_for_row(buffer: &dyn TextSource, row: usize, tab_length: usize) -> f64 {
    if !buffer.is_row_blank(row) {
        let line = buffer.line_for_row(row).unwrap_or_default();
        return indent_level_for_line(&line, tab_length);
    }
    let next = buffer.next_non_blank_row(row);
    let prev = prev_non_blank_row(buffer, row);
    let next_indent = next
        .map(|r| indent_level_for_row(buffer, r, tab_length).ceil())
        .unwrap_or(0.0);
    let prev_indent = prev
        .map(|r| indent_level_for_row(buffer, r, tab_length).ceil())
        .unwrap_or(0.0);
    next_indent.max(prev_indent)
}

fn prev_non_blank_row(buffer: &dyn TextSource, row: usize) -> Option<usize> {
    let mut r = row.checked_sub(1)?;
    loop {
        if !buffer.is_row_blank(r) {
            return Some(r);
        }
        r = r.checked_sub(1)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::VecBuffer;

    #[test]
    fn indent_level_counts_spaces() {
        assert_eq!(indent_level_for_line("    a", 4), 1.0);
        assert_eq!(indent_level_for_line("        a", 4), 2.0);
        assert_eq!(indent_level_for_line("a", 4), 0.0);
    }

    #[test]
    fn indent_level_expands_tabs_to_boundary() {
        assert_eq!(indent_level_for_line("\ta", 4), 1.0);
        assert_eq!(indent_level_for_line("  \ta", 4), 1.0); // 2 spaces + tab -> col 4
    }

    #[test]
    fn blank_row_takes_max_of_neighbors() {
        let buffer = VecBuffer::new(vec![
            "    a".to_string(),
            "".to_string(),
            "        b".to_string(),
        ]);
        assert_eq!(indent_level_for_row(&buffer, 1, 4), 2.0);
    }

    #[test]
    fn foldable_code_row_checks_next_non_blank_indent() {
        let buffer = VecBuffer::new(vec![
            "def f():".to_string(),
            "    a".to_string(),
            "    b".to_string(),
            "c".to_string(),
        ]);
        let mut engine = TokenizationEngine::new(
            std::sync::Arc::new(crate::grammar::NullGrammar),
            2,
            false,
        );
        engine.retokenize_lines(&buffer);
        assert!(engine.is_foldable_at_row(&buffer, 0));
        assert!(!engine.is_foldable_at_row(&buffer, 1));
        assert!(!engine.is_foldable_at_row(&buffer, 3));
    }
}
