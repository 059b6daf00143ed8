//! Compiled modules.
//!
//! A [`Module`] is the binder's output: the node arena, the scope arena,
//! compiled regexes, the export table and the per-declaration memo state.
//! [`Module::test`] evaluates an export on demand and matches a JSON value
//! against it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use jsondl_diagnostic::DiagnosticSink;
use jsondl_ir::{DeclId, ExprArena, ExprId, JsonValue, DEFAULT_EXPORT};
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::environment::{Env, ScopeArena, ScopeId};
use crate::{exec, DeclRef, EvalError, ExecutionContext, Exports, TestError, TransactionalSet, Value};

/// Memo state of a declaration with a fixed environment.
#[derive(Clone, Debug, Default)]
pub(crate) enum DeclState {
    #[default]
    Unevaluated,
    InProgress,
    Done(Value),
}

/// Everything the binder produces for one module.
pub struct ModuleParts {
    pub arena: ExprArena,
    pub scopes: ScopeArena,
    pub module_scope: ScopeId,
    /// Environment per declaration; `None` inside function bodies.
    pub decl_scopes: Vec<Option<ScopeId>>,
    /// Static scope of each `let` node bound outside function bodies.
    pub let_scopes: FxHashMap<ExprId, ScopeId>,
    pub regexes: FxHashMap<ExprId, Rc<Regex>>,
    /// Exports in source order, `default` included.
    pub exports: Vec<(String, DeclId)>,
    pub uses_this: bool,
}

/// Shared body of a module, referenced by closures and export handles.
pub(crate) struct ModuleBody {
    pub(crate) arena: ExprArena,
    pub(crate) scopes: ScopeArena,
    pub(crate) module_scope: ScopeId,
    decl_scopes: Vec<Option<ScopeId>>,
    decl_states: Vec<RefCell<DeclState>>,
    let_scopes: FxHashMap<ExprId, ScopeId>,
    regexes: FxHashMap<ExprId, Rc<Regex>>,
    sets: RefCell<FxHashMap<ExprId, Rc<TransactionalSet>>>,
    exports: Vec<(String, DeclId)>,
    pub(crate) uses_this: bool,
}

impl ModuleBody {
    pub(crate) fn decl_scope(&self, decl: DeclId) -> Option<ScopeId> {
        self.decl_scopes.get(decl.index()).copied().flatten()
    }

    pub(crate) fn decl_state(&self, decl: DeclId) -> &RefCell<DeclState> {
        &self.decl_states[decl.index()]
    }

    pub(crate) fn let_scope(&self, expr: ExprId) -> Option<ScopeId> {
        self.let_scopes.get(&expr).copied()
    }

    pub(crate) fn regex(&self, expr: ExprId) -> Option<&Rc<Regex>> {
        self.regexes.get(&expr)
    }

    /// Transactional set of a `set` node, created on first use.
    pub(crate) fn set(&self, expr: ExprId) -> Rc<TransactionalSet> {
        Rc::clone(self.sets.borrow_mut().entry(expr).or_default())
    }

    pub(crate) fn export(&self, name: &str) -> Option<DeclId> {
        self.exports
            .iter()
            .find(|(export, _)| export == name)
            .map(|&(_, decl)| decl)
    }
}

/// A bound module, ready to test values.
#[derive(Clone)]
pub struct Module {
    body: Rc<ModuleBody>,
}

impl Module {
    pub fn from_parts(parts: ModuleParts) -> Self {
        let decl_states = (0..parts.arena.decl_count())
            .map(|_| RefCell::new(DeclState::Unevaluated))
            .collect();
        Module {
            body: Rc::new(ModuleBody {
                arena: parts.arena,
                scopes: parts.scopes,
                module_scope: parts.module_scope,
                decl_scopes: parts.decl_scopes,
                decl_states,
                let_scopes: parts.let_scopes,
                regexes: parts.regexes,
                sets: RefCell::default(),
                exports: parts.exports,
                uses_this: parts.uses_this,
            }),
        }
    }

    pub fn arena(&self) -> &ExprArena {
        &self.body.arena
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.body.scopes
    }

    pub fn module_scope(&self) -> ScopeId {
        self.body.module_scope
    }

    /// Export ids in source order.
    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.body.exports.iter().map(|(name, _)| name.as_str())
    }

    pub fn default_export(&self) -> Option<DeclId> {
        self.body.export(DEFAULT_EXPORT)
    }

    pub fn has_export(&self, name: &str) -> bool {
        self.body.export(name).is_some()
    }

    /// Static scope recorded for `decl`, if it has a fixed environment.
    pub fn decl_scope(&self, decl: DeclId) -> Option<ScopeId> {
        self.body.decl_scope(decl)
    }

    /// Whether the memo of `decl` holds a value.
    pub fn is_evaluated(&self, decl: DeclId) -> bool {
        matches!(*self.body.decl_state(decl).borrow(), DeclState::Done(_))
    }

    pub fn uses_this(&self) -> bool {
        self.body.uses_this
    }

    /// Export table for serving this module through a loader.
    pub fn exports(&self) -> Rc<Exports> {
        let mut exports = Exports::new();
        for (name, decl) in &self.body.exports {
            exports.insert(
                name.clone(),
                Value::Declaration(DeclRef {
                    module: Rc::clone(&self.body),
                    decl: *decl,
                }),
            );
        }
        Rc::new(exports)
    }

    /// Match `value` against the default export.
    pub fn test(
        &self,
        value: &JsonValue,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<bool, TestError> {
        let decl = self.default_export().ok_or(TestError::NoDefaultExport)?;
        self.run(decl, value, diagnostics)
    }

    /// Match `value` against the export named `id`.
    pub fn test_export(
        &self,
        value: &JsonValue,
        id: &str,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<bool, TestError> {
        let decl = self
            .body
            .export(id)
            .ok_or_else(|| TestError::UnknownExport(id.to_owned()))?;
        self.run(decl, value, diagnostics)
    }

    /// Match `value` against any declaration with a fixed environment,
    /// exported or not.
    pub fn test_declaration(
        &self,
        value: &JsonValue,
        decl: DeclId,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<bool, TestError> {
        if decl.index() >= self.body.arena.decl_count() {
            return Err(TestError::UnknownDeclaration(decl.index()));
        }
        self.run(decl, value, diagnostics)
    }

    /// Id of the first declaration named `name`, at any depth.
    pub fn find_declaration(&self, name: &str) -> Option<DeclId> {
        self.body
            .arena
            .decls()
            .find(|(_, decl)| decl.name == name)
            .map(|(id, _)| id)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(export = %self.body.arena.decl(decl).name)
    )]
    fn run(
        &self,
        decl: DeclId,
        value: &JsonValue,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<bool, TestError> {
        let scope = self
            .body
            .decl_scope(decl)
            .ok_or_else(|| TestError::NoFixedEnvironment(self.body.arena.decl(decl).name.clone()))?;
        let errors_before = diagnostics.error_count();

        let mut cx = ExecutionContext::new(Env::Static(scope), diagnostics);
        let result = exec::eval_decl(&mut cx, &self.body, decl)
            .and_then(|pattern| exec::test_value(&mut cx, &pattern, value));
        let errors_after = cx.error_count();

        match result {
            Ok(matched) => {
                let matched = matched && errors_after == errors_before;
                tracing::debug!(matched, "test finished");
                Ok(matched)
            }
            Err(EvalError::Reported(_)) => Ok(false),
            Err(EvalError::Circular(circular)) => {
                tracing::debug!(origin = %circular.name, "test aborted by circular reference");
                Err(TestError::CircularReference {
                    name: circular.name,
                })
            }
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("exports", &self.export_names().collect::<Vec<_>>())
            .field("decls", &self.body.arena.decl_count())
            .finish_non_exhaustive()
    }
}
