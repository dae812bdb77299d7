//! Tag stream folding.
//!
//! A grammar's tag stream for a line is a flat `Vec<i32>` read left to right:
//!
//! * A positive entry `n` is a span of `n` bytes at the current scope stack.
//! * A negative, odd entry is a scope open; it pushes itself onto the stack.
//! * A negative, even entry `t` is a scope close; it pops the stack down to
//!   (and including) the open entry `t + 1`.
//!
//! Folding a tag stream against a starting stack produces the stack in
//! effect at any point in the stream, most usefully at the end of the line
//! (the stack handed to the next line as `open_scopes`).

use crate::grammar::Grammar;
use crate::TextSource;

/// Whether `tag` is a scope-open entry (negative, odd).
pub fn is_scope_open(tag: i32) -> bool {
    tag < 0 && tag % 2 != 0
}

/// Whether `tag` is a scope-close entry (negative, even).
pub fn is_scope_close(tag: i32) -> bool {
    tag < 0 && tag % 2 == 0
}

/// Folds `tags` starting from `starting`, returning the resulting scope
/// stack (outermost first).
///
/// On an unmatched close (a close tag with no corresponding open left on the
/// stack) folding stops early and the partially-folded stack at that point is
/// returned; the event is logged so a malformed grammar doesn't silently
/// corrupt downstream tokenization without a trace.
pub fn scopes_from_tags(
    starting: &[i32],
    tags: &[i32],
    grammar: &dyn Grammar,
    buffer: &dyn TextSource,
) -> Vec<i32> {
    let mut scopes: Vec<i32> = starting.to_vec();
    for &tag in tags {
        if tag >= 0 {
            continue;
        }
        if is_scope_open(tag) {
            scopes.push(tag);
            continue;
        }
        let want = tag + 1;
        loop {
            match scopes.pop() {
                Some(top) if top == want => break,
                Some(_) => continue,
                None => {
                    tracing::error!(
                        target: "syntax.fold",
                        grammar = grammar.name(),
                        path = buffer.path().unwrap_or("<unknown>"),
                        unmatched_close = grammar.scope_for_id(want).unwrap_or("<unknown>"),
                        buffer_contents = buffer.full_text(),
                        "unmatched scope close during tag fold; abandoning rest of line"
                    );
                    return scopes;
                }
            }
        }
    }
    scopes
}
