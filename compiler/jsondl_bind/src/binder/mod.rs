//! The module binder.

use std::rc::Rc;

use jsondl_diagnostic::{DiagnosticSink, ErrorCode};
use jsondl_eval::{
    ensure_sufficient_stack, Binding, Builtins, Module, ModuleParts, ScopeArena, ScopeId, Value,
};
use jsondl_ir::{
    DeclId, ExprArena, ExprId, ExprKind, ImportDecl, Item, ParsedModule, Span, DEFAULT_EXPORT,
    NAMESPACE_IMPORT,
};
use regex::{Regex, RegexBuilder};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{BindOptions, ModuleLoader};

/// Bind a parsed module.
///
/// Never fails: semantic errors go to `diagnostics` and binding continues.
/// Callers that need an error-free module check the sink afterwards.
#[tracing::instrument(level = "debug", skip_all, fields(items = parsed.items.len()))]
pub fn bind_module(
    parsed: ParsedModule,
    loader: &dyn ModuleLoader,
    builtins: &Rc<Builtins>,
    options: &BindOptions,
    diagnostics: &mut DiagnosticSink,
) -> Module {
    let ParsedModule { arena, items } = parsed;
    let mut scopes = ScopeArena::new(Rc::clone(builtins));
    let module_scope = scopes.push(None);

    let mut binder = Binder {
        arena: &arena,
        loader,
        options,
        diagnostics,
        scopes,
        scope: module_scope,
        dynamic_depth: 0,
        decl_scopes: vec![None; arena.decl_count()],
        let_scopes: FxHashMap::default(),
        regexes: FxHashMap::default(),
        exports: Vec::new(),
        uses_this: false,
        references: Vec::new(),
        failed_imports: FxHashSet::default(),
    };

    for item in &items {
        match item {
            Item::Import(import) => binder.bind_import(import),
            Item::Const(decl) => binder.bind_decl(*decl),
            Item::Export(decl) => {
                binder.bind_decl(*decl);
                binder.export(*decl);
            }
        }
    }
    if binder.exports.is_empty() {
        let _ = binder
            .diagnostics
            .error(ErrorCode::E1003, "a module should export something");
    }
    binder.check_references();

    tracing::debug!(
        exports = binder.exports.len(),
        scopes = binder.scopes.len(),
        "module bound"
    );

    let Binder {
        scopes,
        decl_scopes,
        let_scopes,
        regexes,
        exports,
        uses_this,
        ..
    } = binder;

    Module::from_parts(ModuleParts {
        arena,
        scopes,
        module_scope,
        decl_scopes,
        let_scopes,
        regexes,
        exports,
        uses_this,
    })
}

struct Binder<'a, 'd> {
    arena: &'a ExprArena,
    loader: &'a dyn ModuleLoader,
    options: &'a BindOptions,
    diagnostics: &'d mut DiagnosticSink,
    scopes: ScopeArena,
    /// Innermost scope of the walk.
    scope: ScopeId,
    /// Number of enclosing function bodies.
    dynamic_depth: u32,
    decl_scopes: Vec<Option<ScopeId>>,
    let_scopes: FxHashMap<ExprId, ScopeId>,
    regexes: FxHashMap<ExprId, Rc<Regex>>,
    exports: Vec<(String, DeclId)>,
    uses_this: bool,
    /// Every identifier reference with the scope it appeared in.
    references: Vec<(ScopeId, ExprId)>,
    /// Local names of imports whose module failed to load.
    failed_imports: FxHashSet<String>,
}

impl Binder<'_, '_> {
    fn define(&mut self, name: &str, binding: Binding, span: Span) {
        if !self.scopes.define(self.scope, name, binding) {
            let _ = self.diagnostics.error_at(
                ErrorCode::E1001,
                format!("duplicate identifier '{name}'"),
                span,
            );
        }
    }

    /// Run `f` in a new scope nested in the current one.
    fn in_new_scope<R>(&mut self, f: impl FnOnce(&mut Self, ScopeId) -> R) -> R {
        let scope = self.scopes.push(Some(self.scope));
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self, scope);
        self.scope = saved;
        result
    }

    fn bind_import(&mut self, import: &ImportDecl) {
        let Some(exports) =
            self.loader
                .import_module(import, self.options.base_dir(), self.diagnostics)
        else {
            tracing::debug!(specifier = %import.specifier, "import failed");
            self.failed_imports
                .extend(import.specifiers.iter().map(|s| s.local_id.clone()));
            return;
        };

        for specifier in &import.specifiers {
            let binding = if specifier.export_id == NAMESPACE_IMPORT {
                Binding::Value(Value::Exports(Rc::clone(&exports)))
            } else {
                Binding::Import {
                    exports: Rc::clone(&exports),
                    name: specifier.export_id.clone(),
                    specifier: import.specifier.clone(),
                }
            };
            self.define(&specifier.local_id, binding, specifier.span);
        }
    }

    fn bind_decl(&mut self, id: DeclId) {
        let arena = self.arena;
        let decl = arena.decl(id);
        self.bind_expr(decl.body);
        if self.dynamic_depth == 0 {
            self.decl_scopes[id.index()] = Some(self.scope);
        }
        if decl.name != DEFAULT_EXPORT {
            self.define(&decl.name, Binding::Decl(id), decl.span);
        }
    }

    fn export(&mut self, id: DeclId) {
        let arena = self.arena;
        let decl = arena.decl(id);
        if self.exports.iter().any(|(name, _)| *name == decl.name) {
            let _ = self.diagnostics.error_at(
                ErrorCode::E1002,
                format!("duplicate export '{}'", decl.name),
                decl.span,
            );
            return;
        }
        self.exports.push((decl.name.clone(), id));
    }

    fn bind_expr(&mut self, expr: ExprId) {
        ensure_sufficient_stack(|| self.bind_expr_inner(expr));
    }

    fn bind_list(&mut self, list: &[ExprId]) {
        for &expr in list {
            self.bind_expr(expr);
        }
    }

    fn bind_expr_inner(&mut self, expr: ExprId) {
        let arena = self.arena;
        match arena.kind(expr) {
            ExprKind::Literal(_) | ExprKind::Set => {}
            ExprKind::This => self.uses_this = true,
            ExprKind::Regex { source, flags } => self.compile_regex(expr, source, flags),
            ExprKind::Reference(_) => self.references.push((self.scope, expr)),
            ExprKind::Member { expr: object, .. } => self.bind_expr(*object),
            ExprKind::Call { callee, args } => {
                self.bind_expr(*callee);
                self.bind_list(arena.list(*args));
            }
            ExprKind::Function { params, body } => {
                let span = arena.span(expr);
                self.in_new_scope(|this, _| {
                    for param in params {
                        this.define(param, Binding::Param, span);
                    }
                    this.dynamic_depth += 1;
                    this.bind_expr(*body);
                    this.dynamic_depth -= 1;
                });
            }
            ExprKind::Let { decls, body } => {
                self.in_new_scope(|this, scope| {
                    if this.dynamic_depth == 0 {
                        this.let_scopes.insert(expr, scope);
                    }
                    for &decl in decls {
                        this.bind_decl(decl);
                    }
                    this.bind_expr(*body);
                });
            }
            ExprKind::Or(items) | ExprKind::And(items) | ExprKind::Object(items) => {
                self.bind_list(arena.list(*items));
            }
            ExprKind::Array { items, .. } => self.bind_list(arena.list(*items)),
            ExprKind::Not(inner) => self.bind_expr(*inner),
            ExprKind::Property { name, value, .. } => {
                self.bind_expr(*name);
                self.bind_expr(*value);
            }
            ExprKind::ArrayItem { value, .. } => self.bind_expr(*value),
        }
    }

    fn compile_regex(&mut self, expr: ExprId, source: &str, flags: &str) {
        let span = self.arena.span(expr);
        if !flags.is_empty() && flags != "i" {
            let _ = self.diagnostics.error_at(
                ErrorCode::E1004,
                format!("'{flags}': illegal regexp flag (only 'i' is allowed)"),
                span,
            );
            return;
        }
        match RegexBuilder::new(source).case_insensitive(flags == "i").build() {
            Ok(regex) => {
                self.regexes.insert(expr, Rc::new(regex));
            }
            Err(err) => {
                let _ = self
                    .diagnostics
                    .error_at(ErrorCode::E1005, err.to_string(), span);
            }
        }
    }

    /// Report references that resolve nowhere, now that every binding of
    /// the module is known.
    fn check_references(&mut self) {
        for &(scope, expr) in &self.references {
            let ExprKind::Reference(name) = self.arena.kind(expr) else {
                continue;
            };
            if self.failed_imports.contains(name) || self.scopes.lookup(scope, name).is_some() {
                continue;
            }
            let _ = self.diagnostics.error_at(
                ErrorCode::E1007,
                format!("'{name}' is not defined"),
                self.arena.span(expr),
            );
        }
    }
}
