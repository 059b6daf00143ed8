//! Sets whose insertions follow the transaction stack.

use std::cell::RefCell;

use jsondl_ir::JsonValue;
use rustc_hash::FxHashSet;

/// Mutable set of JSON values with per-transaction staging.
///
/// Values are keyed by their compact JSON text. Insertions at depth 0 are
/// permanent; deeper insertions are staged in a layer for that depth until
/// the frame commits (merging into the layer below) or rolls back.
#[derive(Debug, Default)]
pub struct TransactionalSet {
    contents: RefCell<FxHashSet<String>>,
    /// Staged layers, strictly increasing in depth.
    layers: RefCell<Vec<(usize, FxHashSet<String>)>>,
}

impl TransactionalSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(value: &JsonValue) -> String {
        value.to_string()
    }

    pub fn contains(&self, value: &JsonValue) -> bool {
        let key = Self::key(value);
        self.contents.borrow().contains(&key)
            || self.layers.borrow().iter().any(|(_, layer)| layer.contains(&key))
    }

    /// Number of visible values, staged ones included.
    pub fn len(&self) -> usize {
        let contents = self.contents.borrow();
        let layers = self.layers.borrow();
        let mut seen: FxHashSet<&String> = contents.iter().collect();
        for (_, layer) in layers.iter() {
            seen.extend(layer.iter());
        }
        seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of permanently committed values.
    pub fn committed_len(&self) -> usize {
        self.contents.borrow().len()
    }

    /// Insert at transaction `depth`.
    ///
    /// Returns `(inserted, registered)`: whether the value was new, and
    /// whether a layer for `depth` was opened so the caller must register
    /// the set with the current frame.
    pub(crate) fn insert_at(&self, value: &JsonValue, depth: usize) -> (bool, bool) {
        if self.contains(value) {
            return (false, false);
        }
        let key = Self::key(value);
        if depth == 0 {
            self.contents.borrow_mut().insert(key);
            return (true, false);
        }
        let mut layers = self.layers.borrow_mut();
        match layers.last_mut() {
            Some((top, layer)) if *top == depth => {
                layer.insert(key);
                (true, false)
            }
            _ => {
                let mut layer = FxHashSet::default();
                layer.insert(key);
                layers.push((depth, layer));
                (true, true)
            }
        }
    }

    /// Merge the layer for `depth` into the one below.
    ///
    /// Returns `true` if a layer for `depth - 1` was opened, in which case
    /// the parent frame must register this set.
    pub(crate) fn commit_layer(&self, depth: usize) -> bool {
        let mut layers = self.layers.borrow_mut();
        let Some((top, staged)) = layers.pop() else {
            return false;
        };
        if top != depth {
            layers.push((top, staged));
            return false;
        }
        let target = depth - 1;
        if target == 0 {
            self.contents.borrow_mut().extend(staged);
            return false;
        }
        match layers.last_mut() {
            Some((below, layer)) if *below == target => {
                layer.extend(staged);
                false
            }
            _ => {
                layers.push((target, staged));
                true
            }
        }
    }

    /// Drop the layer for `depth`.
    pub(crate) fn rollback_layer(&self, depth: usize) {
        let mut layers = self.layers.borrow_mut();
        if layers.last().is_some_and(|(top, _)| *top == depth) {
            layers.pop();
        }
    }
}
