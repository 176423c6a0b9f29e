//! Pair-level undo history.
//!
//! Undoing pair creation pops the newest pair off the store and parks it here
//! with all of its data; redo puts it back. Per-pair marker moves keep their
//! own stacks on the pair itself.

use clipmarks_model::MarkerPair;

/// Default number of undone pairs kept for redo.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Stack of undone marker pairs.
#[derive(Debug, Clone)]
pub struct PairHistory {
    undone: Vec<MarkerPair>,
    max_entries: usize,
}

impl Default for PairHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl PairHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undone: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Park an undone pair. The oldest entry is dropped past the depth limit.
    pub fn push(&mut self, pair: MarkerPair) {
        self.undone.push(pair);
        while self.undone.len() > self.max_entries {
            self.undone.remove(0);
        }
        tracing::debug!(depth = self.undone.len(), "Pair parked for redo");
    }

    /// Take the most recently undone pair.
    pub fn pop(&mut self) -> Option<MarkerPair> {
        self.undone.pop()
    }

    pub fn peek(&self) -> Option<&MarkerPair> {
        self.undone.last()
    }

    pub fn clear(&mut self) {
        self.undone.clear();
    }

    pub fn len(&self) -> usize {
        self.undone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undone.is_empty()
    }
}
