//! Presentation-layer helper: dotted scope name -> CSS-style class string.
//!
//! This is the one piece of the tokenization core that looks past scope ids
//! toward how a renderer might use them; it's pure and cheap enough that
//! callers can leave the process-wide cache in place and never think about
//! it again.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Builds `syntax--a syntax--b syntax--c` from a dotted scope name like
/// `a.b.c`.
pub fn css_classes_for_scope(scope_name: &str) -> String {
    scope_name
        .split('.')
        .filter(|s| !s.is_empty())
        .map(|part| format!("syntax--{part}"))
        .collect::<Vec<_>>()
        .join(" ")
}

static CLASS_CACHE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();

/// Process-wide memoized [`css_classes_for_scope`].
pub fn cached_css_classes_for_scope(scope_name: &str) -> String {
    let cache = CLASS_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard
        .entry(scope_name.to_string())
        .or_insert_with(|| css_classes_for_scope(scope_name))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_class_per_component() {
        assert_eq!(
            css_classes_for_scope("comment.block.rust"),
            "syntax--comment syntax--block syntax--rust"
        );
    }

    #[test]
    fn cache_returns_same_result_as_uncached() {
        let direct = css_classes_for_scope("keyword.control");
        let cached = cached_css_classes_for_scope("keyword.control");
        assert_eq!(direct, cached);
    }
}
