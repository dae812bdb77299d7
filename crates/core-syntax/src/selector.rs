//! Scope selector matching, used by `bufferRangeForScopeAtPosition`-style
//! queries (see [`crate::queries`]).

use std::collections::HashSet;

/// Matches a resolved scope-name stack against some criterion.
///
/// Implementations see the full active scope stack (outermost first) at a
/// token, already resolved from tag ids to dotted names.
pub trait ScopeSelector {
    fn matches(&self, scope_names: &[String]) -> bool;
}

/// A selector of the form `.a.b.c`, matching if any scope in the stack has
/// dotted components that are a superset of `{a, b, c}`.
#[derive(Debug, Clone)]
pub struct DottedSelector {
    components: Vec<String>,
}

impl DottedSelector {
    pub fn parse(selector: &str) -> Self {
        let components = selector
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { components }
    }
}

impl ScopeSelector for DottedSelector {
    fn matches(&self, scope_names: &[String]) -> bool {
        if self.components.is_empty() {
            return false;
        }
        scope_names.iter().any(|name| {
            let parts: HashSet<&str> = name.split('.').collect();
            self.components.iter().all(|c| parts.contains(c.as_str()))
        })
    }
}
