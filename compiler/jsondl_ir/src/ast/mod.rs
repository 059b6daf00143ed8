//! Syntax tree node types.
//!
//! Every pattern and value construct of the language is one variant of
//! [`ExprKind`]. The same node is both syntax and, once bound, the pattern
//! the engine evaluates; there is no separate lowering step.

use crate::{DeclId, ExprArena, ExprId, ExprRange, JsonValue, Span};

/// Identifier of the default export.
pub const DEFAULT_EXPORT: &str = "default";

/// Export id of a namespace import (`import * as ns from "..."`).
pub const NAMESPACE_IMPORT: &str = "*";

/// Occurrence bound attached to property and array patterns.
///
/// `max == None` means unbounded.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    /// `{1}`: exactly once. Default for array items and array patterns.
    pub const ONE: Cardinality = Cardinality::exactly(1);
    /// `?`
    pub const OPTIONAL: Cardinality = Cardinality::range(0, 1);
    /// `+`: default for property patterns.
    pub const ONE_OR_MORE: Cardinality = Cardinality::at_least(1);
    /// `*`
    pub const ANY: Cardinality = Cardinality::at_least(0);
    /// `-`: must not occur.
    pub const NEVER: Cardinality = Cardinality::exactly(0);

    pub const fn exactly(n: u32) -> Self {
        Cardinality {
            min: n,
            max: Some(n),
        }
    }

    pub const fn range(min: u32, max: u32) -> Self {
        Cardinality {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: u32) -> Self {
        Cardinality { min, max: None }
    }

    /// Check whether `count` occurrences satisfy this bound.
    #[inline]
    pub fn contains(self, count: usize) -> bool {
        count >= self.min as usize && self.allows(count)
    }

    /// Check whether `count` does not exceed the upper bound.
    #[inline]
    pub fn allows(self, count: usize) -> bool {
        self.max.map_or(true, |max| count <= max as usize)
    }

    /// Check whether one more occurrence may still be consumed after `count`.
    #[inline]
    pub fn has_room(self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max as usize)
    }
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression variants.
///
/// All children are indices into the owning [`ExprArena`].
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// JSON literal: `1`, `"abc"`, `null`, `true`
    Literal(JsonValue),

    /// Regular expression literal: `/ab+/i`
    Regex { source: String, flags: String },

    /// Identifier reference, resolved against the environment at evaluation.
    Reference(String),

    /// Member access: `ns.name`, `this.count`
    Member { expr: ExprId, name: String },

    /// Call: `lt(3)`, `listOf(string)`
    Call { callee: ExprId, args: ExprRange },

    /// Parametric pattern: `fn(item) [item*]`
    Function { params: Vec<String>, body: ExprId },

    /// Local environment: `let a = ..., b = ... in body`
    Let { decls: Vec<DeclId>, body: ExprId },

    /// `a | b | c`
    Or(ExprRange),

    /// `a & b & c`
    And(ExprRange),

    /// `!a`
    Not(ExprId),

    /// `{ name: value, ... }`: each entry is a property pattern (or an
    /// expression evaluating to one).
    Object(ExprRange),

    /// `name{min,max}: value` inside an object pattern.
    Property {
        name: ExprId,
        value: ExprId,
        cardinality: Cardinality,
    },

    /// `[ item, item* ]{min,max}`
    Array {
        items: ExprRange,
        cardinality: Cardinality,
    },

    /// One entry of an array pattern: `value{min,max}`
    ArrayItem {
        value: ExprId,
        cardinality: Cardinality,
    },

    /// `this`: the value currently being matched by the enclosing
    /// object or array pattern.
    This,

    /// `set`: a transactional set owned by this node.
    Set,
}

/// A named declaration (`const a = ...`, a `let` binding, or the default
/// export).
#[derive(Clone, Debug, PartialEq)]
pub struct Decl {
    pub name: String,
    pub body: ExprId,
    pub span: Span,
}

/// `import { a, b as c } from "./lib"` / `import * as ns from "./lib"`
#[derive(Clone, Debug, PartialEq)]
pub struct ImportDecl {
    /// Module specifier as written in the source.
    pub specifier: String,
    pub specifiers: Vec<ImportSpecifier>,
    pub span: Span,
}

/// One imported binding.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportSpecifier {
    /// Remote export id, `default`, or [`NAMESPACE_IMPORT`].
    pub export_id: String,
    /// Local identifier bound in the module scope.
    pub local_id: String,
    pub span: Span,
}

/// Top-level module item, in source order.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Import(ImportDecl),
    Const(DeclId),
    Export(DeclId),
}

/// Output of the parser: the node arena plus the module's items.
#[derive(Clone, Debug, Default)]
pub struct ParsedModule {
    pub arena: ExprArena,
    pub items: Vec<Item>,
}

impl ParsedModule {
    pub fn new(arena: ExprArena, items: Vec<Item>) -> Self {
        ParsedModule { arena, items }
    }
}
