//! jsondl IR - syntax tree types for the jsondl pattern language.
//!
//! This crate contains the data structures produced by the parser and
//! consumed by the binder:
//! - Spans for source locations
//! - `ExprId`/`DeclId` indices and `ExprRange` lists
//! - The `ExprKind` sum type covering every pattern and value node
//! - `ExprArena` owning the nodes of one module
//! - `ParsedModule` with its imports, declarations and exports
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId` indices
//! - **One arena per module**: nodes never reference nodes of another module
//!
//! The grammar itself lives outside this workspace. A parser builds modules
//! through [`ModuleBuilder`].

mod arena;
pub mod ast;
mod builder;
mod ids;
mod span;

pub use arena::ExprArena;
pub use ast::{
    Cardinality, Decl, Expr, ExprKind, ImportDecl, ImportSpecifier, Item, ParsedModule,
    DEFAULT_EXPORT, NAMESPACE_IMPORT,
};
pub use builder::ModuleBuilder;
pub use ids::{DeclId, ExprId, ExprRange};
pub use span::Span;

/// JSON value type used for literals and match candidates.
pub use serde_json::Value as JsonValue;
