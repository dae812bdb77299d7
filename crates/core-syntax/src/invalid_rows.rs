//! Sorted, unique set of rows whose cached tokenization is stale.

/// Rows are kept sorted ascending with no duplicates, so the scheduler can
/// always process the smallest invalid row first and a `rebase` after an
/// edit is a single linear pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InvalidRowSet {
    rows: Vec<usize>,
}

impl InvalidRowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn min(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    pub fn insert(&mut self, row: usize) {
        match self.rows.binary_search(&row) {
            Ok(_) => {}
            Err(idx) => self.rows.insert(idx, row),
        }
    }

    pub fn pop_min(&mut self) -> Option<usize> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.remove(0))
        }
    }

    /// Drops every row `<= row` from the front of the set.
    pub fn validate_up_to(&mut self, row: usize) {
        while let Some(min) = self.min() {
            if min <= row {
                self.pop_min();
            } else {
                break;
            }
        }
    }

    /// Rebases rows after an edit spanning `[start, old_end]` (inclusive)
    /// that changed the buffer's row count by `delta`.
    ///
    /// Rows before `start` are untouched. Rows inside the edited span
    /// collapse onto the row immediately following the edit's new extent
    /// (the safest single row to mark invalid, since we no longer know
    /// which specific sub-rows inside the edit were affected). Rows after
    /// the edited span shift by `delta`.
    pub fn rebase(&mut self, start: usize, old_end: usize, delta: isize) {
        for r in self.rows.iter_mut() {
            if *r < start {
                continue;
            }
            if *r <= old_end {
                *r = (old_end as isize + delta + 1).max(0) as usize;
            } else {
                *r = (*r as isize + delta).max(0) as usize;
            }
        }
        self.rows.sort_unstable();
        self.rows.dedup();
    }
}
