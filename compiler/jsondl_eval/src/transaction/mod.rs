//! Transaction frames for speculative matching.
//!
//! Every alternative of an `|`, every negated match and every array
//! repetition runs in its own frame. A frame records the property names
//! it consumed, the furthest array index it matched, and the sets it
//! modified; committing folds all three into the parent frame, rolling
//! back discards them.

mod set;

use std::rc::Rc;

use rustc_hash::FxHashSet;

pub use set::TransactionalSet;

/// One frame of the transaction stack.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    /// Property names matched in this frame, if tracking is active.
    pub(crate) match_set: Option<FxHashSet<String>>,
    pub(crate) array_match_limit: usize,
    pub(crate) modified_sets: Vec<Rc<TransactionalSet>>,
}

impl Transaction {
    /// Child frame: tracks names iff `track_names`, inherits the limit.
    pub(crate) fn child(&self, track_names: bool) -> Self {
        Transaction {
            match_set: track_names.then(FxHashSet::default),
            array_match_limit: self.array_match_limit,
            modified_sets: Vec::new(),
        }
    }

    /// Fold a committed child frame at `depth` into this one.
    pub(crate) fn absorb(&mut self, child: Transaction, depth: usize) {
        if let (Some(names), Some(child_names)) = (&mut self.match_set, child.match_set) {
            names.extend(child_names);
        }
        self.array_match_limit = self.array_match_limit.max(child.array_match_limit);
        for set in child.modified_sets {
            if set.commit_layer(depth) {
                self.modified_sets.push(set);
            }
        }
    }

    /// Discard a frame at `depth`.
    pub(crate) fn discard(self, depth: usize) {
        for set in self.modified_sets {
            set.rollback_layer(depth);
        }
    }
}
