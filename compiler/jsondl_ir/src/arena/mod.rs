//! Arena owning the nodes and declarations of one module.

use crate::ast::{Decl, Expr, ExprKind};
use crate::{DeclId, ExprId, ExprRange, Span};

/// Convert an arena length into a `u32` index.
///
/// # Panics
/// Panics if a module grows past `u32::MAX` entries.
#[inline]
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what} in one module"))
}

/// Flat storage for expressions, child lists and declarations.
///
/// # Index Spaces
///
/// - `exprs`: indexed by [`ExprId`]
/// - `expr_lists`: flat `Vec<ExprId>` indexed by [`ExprRange`]
/// - `decls`: indexed by [`DeclId`]
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    decls: Vec<Decl>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its ID.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(Expr::new(kind, span));
        id
    }

    /// Allocate a child list, returning its range.
    pub fn alloc_list(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "list entries");
        self.expr_lists.extend(items);
        let len = to_u32(self.expr_lists.len(), "list entries") - start;
        ExprRange::new(start, len)
    }

    /// Allocate a declaration, returning its ID.
    pub fn alloc_decl(&mut self, name: impl Into<String>, body: ExprId, span: Span) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        self.decls.push(Decl {
            name: name.into(),
            body,
            span,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// Get the expressions of a child list.
    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    /// Iterate over all declarations with their IDs.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId::new(to_u32(i, "declarations")), decl))
    }

    /// Number of declarations.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Number of allocated expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Returns `true` if no expressions have been allocated.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
