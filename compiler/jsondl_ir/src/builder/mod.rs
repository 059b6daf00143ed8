//! Programmatic construction of parsed modules.
//!
//! The parser drives this API with real spans. Tests and embedders that
//! assemble patterns in code use the shorthand constructors, which attach
//! [`Span::DUMMY`].
//!
//! ```text
//! let mut m = ModuleBuilder::new();
//! let string = m.reference("string");
//! let name = m.property("name", string, Cardinality::ONE);
//! let person = m.object([name]);
//! m.export_const("person", person);
//! let parsed = m.finish();
//! ```

use crate::ast::{ImportDecl, ImportSpecifier, Item, ParsedModule, DEFAULT_EXPORT};
use crate::{Cardinality, DeclId, ExprArena, ExprId, ExprKind, JsonValue, Span};

/// Builder for a [`ParsedModule`].
#[derive(Default)]
pub struct ModuleBuilder {
    arena: ExprArena,
    items: Vec<Item>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an arbitrary node with a source span.
    pub fn expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc(kind, span)
    }

    fn node(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(kind, Span::DUMMY)
    }

    pub fn literal(&mut self, value: impl Into<JsonValue>) -> ExprId {
        self.node(ExprKind::Literal(value.into()))
    }

    pub fn null(&mut self) -> ExprId {
        self.node(ExprKind::Literal(JsonValue::Null))
    }

    pub fn regex(&mut self, source: &str, flags: &str) -> ExprId {
        self.node(ExprKind::Regex {
            source: source.to_owned(),
            flags: flags.to_owned(),
        })
    }

    pub fn reference(&mut self, name: &str) -> ExprId {
        self.node(ExprKind::Reference(name.to_owned()))
    }

    pub fn member(&mut self, expr: ExprId, name: &str) -> ExprId {
        self.node(ExprKind::Member {
            expr,
            name: name.to_owned(),
        })
    }

    pub fn call(&mut self, callee: ExprId, args: impl IntoIterator<Item = ExprId>) -> ExprId {
        let args = self.arena.alloc_list(args);
        self.node(ExprKind::Call { callee, args })
    }

    pub fn function(&mut self, params: &[&str], body: ExprId) -> ExprId {
        let params = params.iter().map(|p| (*p).to_owned()).collect();
        self.node(ExprKind::Function { params, body })
    }

    /// `let name = body, ... in expr`
    pub fn let_in(&mut self, decls: &[(&str, ExprId)], body: ExprId) -> ExprId {
        let decls = decls
            .iter()
            .map(|(name, expr)| self.arena.alloc_decl(*name, *expr, Span::DUMMY))
            .collect();
        self.node(ExprKind::Let { decls, body })
    }

    pub fn or(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprId {
        let items = self.arena.alloc_list(items);
        self.node(ExprKind::Or(items))
    }

    pub fn and(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprId {
        let items = self.arena.alloc_list(items);
        self.node(ExprKind::And(items))
    }

    pub fn not(&mut self, expr: ExprId) -> ExprId {
        self.node(ExprKind::Not(expr))
    }

    pub fn object(&mut self, properties: impl IntoIterator<Item = ExprId>) -> ExprId {
        let properties = self.arena.alloc_list(properties);
        self.node(ExprKind::Object(properties))
    }

    /// Property pattern with an arbitrary name pattern.
    pub fn property_matching(
        &mut self,
        name: ExprId,
        value: ExprId,
        cardinality: Cardinality,
    ) -> ExprId {
        self.node(ExprKind::Property {
            name,
            value,
            cardinality,
        })
    }

    /// Property pattern whose name is a string literal.
    pub fn property(&mut self, name: &str, value: ExprId, cardinality: Cardinality) -> ExprId {
        let name = self.literal(name);
        self.property_matching(name, value, cardinality)
    }

    pub fn array(
        &mut self,
        items: impl IntoIterator<Item = ExprId>,
        cardinality: Cardinality,
    ) -> ExprId {
        let items = self.arena.alloc_list(items);
        self.node(ExprKind::Array { items, cardinality })
    }

    pub fn item(&mut self, value: ExprId, cardinality: Cardinality) -> ExprId {
        self.node(ExprKind::ArrayItem { value, cardinality })
    }

    pub fn this(&mut self) -> ExprId {
        self.node(ExprKind::This)
    }

    pub fn set(&mut self) -> ExprId {
        self.node(ExprKind::Set)
    }

    /// `const name = body`
    pub fn const_decl(&mut self, name: &str, body: ExprId) -> DeclId {
        let id = self.arena.alloc_decl(name, body, Span::DUMMY);
        self.items.push(Item::Const(id));
        id
    }

    /// `export const name = body`
    pub fn export_const(&mut self, name: &str, body: ExprId) -> DeclId {
        let id = self.arena.alloc_decl(name, body, Span::DUMMY);
        self.items.push(Item::Export(id));
        id
    }

    /// `export default body` (or a bare trailing expression).
    pub fn export_default(&mut self, body: ExprId) -> DeclId {
        self.export_const(DEFAULT_EXPORT, body)
    }

    /// Add a declaration item with an explicit span.
    pub fn declare(&mut self, name: &str, body: ExprId, span: Span, exported: bool) -> DeclId {
        let id = self.arena.alloc_decl(name, body, span);
        self.items.push(if exported {
            Item::Export(id)
        } else {
            Item::Const(id)
        });
        id
    }

    /// `import { export_id as local_id, ... } from "specifier"`
    pub fn import(&mut self, specifier: &str, bindings: &[(&str, &str)]) {
        let specifiers = bindings
            .iter()
            .map(|(export_id, local_id)| ImportSpecifier {
                export_id: (*export_id).to_owned(),
                local_id: (*local_id).to_owned(),
                span: Span::DUMMY,
            })
            .collect();
        self.items.push(Item::Import(ImportDecl {
            specifier: specifier.to_owned(),
            specifiers,
            span: Span::DUMMY,
        }));
    }

    /// Read access to nodes allocated so far.
    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn finish(self) -> ParsedModule {
        ParsedModule::new(self.arena, self.items)
    }
}
