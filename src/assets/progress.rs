use std::collections::HashSet;

/// Completion accounting for a fixed set of named assets.
///
/// Each asset counts once no matter how many times it reports success, and
/// the completion signal fires exactly once, on the success that empties the
/// pending set. Unknown names are ignored.
#[derive(Debug)]
pub struct LoadProgress {
    pending: HashSet<String>,
    total: usize,
    complete_signalled: bool,
}

impl LoadProgress {
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        let pending: HashSet<String> = names.iter().map(ToString::to_string).collect();
        let total = pending.len();
        Self {
            pending,
            total,
            complete_signalled: false,
        }
    }

    /// Records a successful load of `name`. Returns `true` exactly once:
    /// when this call completes the set.
    pub fn mark_loaded(&mut self, name: &str) -> bool {
        self.pending.remove(name);
        if self.pending.is_empty() && !self.complete_signalled {
            self.complete_signalled = true;
            return true;
        }
        false
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.total - self.pending.len()
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}
