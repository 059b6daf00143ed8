//! RAII guard for transaction frames.

use std::ops::{Deref, DerefMut};

use super::ExecutionContext;

/// Open transaction frame.
///
/// Derefs to the [`ExecutionContext`]; nested matching goes through the
/// guard. Dropped without [`commit`](Self::commit), the frame rolls back.
pub struct TransactionGuard<'c, 'd> {
    cx: &'c mut ExecutionContext<'d>,
    committed: bool,
}

impl<'c, 'd> TransactionGuard<'c, 'd> {
    pub(super) fn new(cx: &'c mut ExecutionContext<'d>) -> Self {
        TransactionGuard {
            cx,
            committed: false,
        }
    }

    /// Fold this frame into its parent.
    pub fn commit(mut self) {
        self.cx.commit_transaction();
        self.committed = true;
    }

    /// Discard this frame explicitly.
    pub fn rollback(self) {
        drop(self);
    }
}

impl Drop for TransactionGuard<'_, '_> {
    fn drop(&mut self) {
        if !self.committed {
            self.cx.rollback_transaction();
        }
    }
}

impl<'d> Deref for TransactionGuard<'_, 'd> {
    type Target = ExecutionContext<'d>;

    fn deref(&self) -> &Self::Target {
        self.cx
    }
}

impl DerefMut for TransactionGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cx
    }
}
