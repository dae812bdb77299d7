//! Per-line tokenization result.

use std::sync::Arc;

use crate::grammar::{Grammar, RuleStack};

/// Line ending a [`TokenizedLine`] was read with, preserved so the engine
/// never needs to re-derive it from the buffer for presentation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    None,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::None => "",
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A contiguous byte span carrying the same scope stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Start byte offset within the line, inclusive.
    pub start: usize,
    /// End byte offset within the line, exclusive.
    pub end: usize,
    /// Scope stack active for this span, outermost first.
    pub scopes: Vec<i32>,
}

/// Tokenization result for a single line.
///
/// An immutable value: once built, a `TokenizedLine` never changes in place.
/// Edits that affect a row replace its cache entry with a new one.
#[derive(Debug, Clone)]
pub struct TokenizedLine {
    pub text: String,
    pub line_ending: LineEnding,
    pub tags: Vec<i32>,
    pub rule_stack: RuleStack,
    /// Scope stack active at the *start* of this line, outermost first.
    pub open_scopes: Vec<i32>,
    pub grammar: Arc<dyn Grammar>,
}

impl TokenizedLine {
    /// Walks the tag stream, producing the line's tokens in order.
    ///
    /// An unmatched close is tolerated here (unlike [`crate::tags::scopes_from_tags`],
    /// which is the authoritative fold used while building the cache): a
    /// query walking an already-built line should degrade gracefully rather
    /// than panic or re-report an error that building already logged.
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        let mut scopes = self.open_scopes.clone();
        let mut col = 0usize;
        for &tag in &self.tags {
            if tag > 0 {
                let start = col;
                let end = col + tag as usize;
                out.push(Token {
                    start,
                    end,
                    scopes: scopes.clone(),
                });
                col = end;
            } else if crate::tags::is_scope_open(tag) {
                scopes.push(tag);
            } else if crate::tags::is_scope_close(tag) {
                let want = tag + 1;
                match scopes.iter().rposition(|&s| s == want) {
                    Some(idx) => scopes.truncate(idx),
                    None => scopes.clear(),
                }
            }
        }
        out
    }

    /// Index into a token slice covering `byte_col`, treating the end of the
    /// last token as still belonging to it (a cursor sitting just past the
    /// final character is still "in" that token).
    fn token_index_at(tokens: &[Token], byte_col: usize) -> Option<usize> {
        if tokens.is_empty() {
            return None;
        }
        for (idx, tok) in tokens.iter().enumerate() {
            if byte_col >= tok.start && byte_col < tok.end {
                return Some(idx);
            }
        }
        if byte_col == tokens.last().unwrap().end {
            return Some(tokens.len() - 1);
        }
        None
    }

    pub fn token_at_buffer_column(&self, byte_col: usize) -> Option<Token> {
        let tokens = self.tokens();
        let idx = Self::token_index_at(&tokens, byte_col)?;
        Some(tokens[idx].clone())
    }

    pub fn token_start_column_for_buffer_column(&self, byte_col: usize) -> Option<usize> {
        let tokens = self.tokens();
        let idx = Self::token_index_at(&tokens, byte_col)?;
        Some(tokens[idx].start)
    }

    /// True iff the first non-whitespace token on the line has a scope the
    /// grammar recognizes as a comment.
    pub fn is_comment(&self) -> bool {
        let tokens = self.tokens();
        let bytes = self.text.as_bytes();
        let first_non_ws = tokens.iter().find(|tok| {
            let end = tok.end.min(bytes.len());
            let start = tok.start.min(end);
            !bytes[start..end].iter().all(u8::is_ascii_whitespace)
        });
        match first_non_ws {
            Some(tok) => self.grammar.is_comment_scope(&tok.scopes),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{NullGrammar, ScopeRegistry};

    fn line_with_tags(tags: Vec<i32>, grammar: Arc<dyn Grammar>) -> TokenizedLine {
        TokenizedLine {
            text: "xxxxxxxxx".to_string(),
            line_ending: LineEnding::Lf,
            tags,
            rule_stack: RuleStack::empty(),
            open_scopes: Vec::new(),
            grammar,
        }
    }

    #[test]
    fn single_span_token() {
        let line = line_with_tags(vec![9], Arc::new(NullGrammar));
        let tokens = line.tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 9);
    }

    #[test]
    fn nested_scopes_produce_expected_token_ranges() {
        let mut reg = ScopeRegistry::new();
        let (open_a, close_a) = reg.intern("a");
        let (open_b, close_b) = reg.intern("b");
        #[derive(Debug)]
        struct G(ScopeRegistry);
        impl Grammar for G {
            fn name(&self) -> &str {
                "g"
            }
            fn scope_name(&self) -> &str {
                "source.g"
            }
            fn tokenize_line(
                &self,
                _t: &str,
                _r: Option<&RuleStack>,
                _f: bool,
            ) -> crate::grammar::TokenizeResult {
                unreachable!()
            }
            fn scope_for_id(&self, id: i32) -> Option<&str> {
                self.0.scope_for_id(id)
            }
            fn start_id_for_scope(&self, _n: &str) -> i32 {
                0
            }
            fn end_id_for_scope(&self, _n: &str) -> i32 {
                0
            }
        }
        let grammar: Arc<dyn Grammar> = Arc::new(G(reg));
        let line = line_with_tags(
            vec![open_a, 3, open_b, 4, close_b, 2, close_a],
            grammar,
        );
        let tokens = line.tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].start, tokens[0].end), (0, 3));
        assert_eq!(tokens[0].scopes, vec![open_a]);
        assert_eq!((tokens[1].start, tokens[1].end), (3, 7));
        assert_eq!(tokens[1].scopes, vec![open_a, open_b]);
        assert_eq!((tokens[2].start, tokens[2].end), (7, 9));
        assert_eq!(tokens[2].scopes, vec![open_a]);
    }

    #[test]
    fn token_at_buffer_column_covers_end_of_line() {
        let line = line_with_tags(vec![9], Arc::new(NullGrammar));
        assert!(line.token_at_buffer_column(0).is_some());
        assert!(line.token_at_buffer_column(8).is_some());
        assert!(line.token_at_buffer_column(9).is_some());
        assert!(line.token_at_buffer_column(10).is_none());
    }
}
