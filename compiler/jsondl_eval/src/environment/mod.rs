//! Lexical scopes and runtime environments.
//!
//! The binder records one static [`Scope`] per module, `let` block and
//! function in a [`ScopeArena`]. Scopes are addressed by [`ScopeId`] and
//! link to their parent by index; the outermost lookup falls through to
//! the shared [`Builtins`].
//!
//! Evaluation runs in an [`Env`]: either a static scope, or a runtime
//! [`Frame`] created for a function call (or for a `let` block inside a
//! function body) and layered over the caller's environment.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use jsondl_ir::DeclId;
use rustc_hash::FxHashMap;

use crate::{Builtins, Closure, Exports, NativePattern, Value};

/// Index of a scope in a [`ScopeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// What an identifier is bound to in a static scope.
#[derive(Clone, Debug)]
pub enum Binding {
    /// Declaration of the owning module.
    Decl(DeclId),
    /// Fixed value: a namespace import.
    Value(Value),
    /// Named import, resolved against the exports when first used.
    Import {
        exports: Rc<Exports>,
        name: String,
        specifier: String,
    },
    /// Function parameter; only meaningful while binding.
    Param,
}

/// A single static scope.
#[derive(Debug)]
struct Scope {
    bindings: FxHashMap<String, Binding>,
    parent: Option<ScopeId>,
}

/// Result of a static lookup.
#[derive(Debug)]
pub enum Lookup<'a> {
    Binding(&'a Binding),
    Builtin(&'a Rc<NativePattern>),
}

/// Arena of static scopes rooted in the builtins.
#[derive(Debug)]
pub struct ScopeArena {
    builtins: Rc<Builtins>,
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new(builtins: Rc<Builtins>) -> Self {
        ScopeArena {
            builtins,
            scopes: Vec::new(),
        }
    }

    /// Create a scope nested in `parent` (or directly under the builtins).
    pub fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = u32::try_from(self.scopes.len())
            .unwrap_or_else(|_| panic!("scope arena exceeded u32::MAX scopes"));
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent,
        });
        ScopeId(id)
    }

    /// Bind `name` in `scope`.
    ///
    /// Returns `false`, leaving the existing binding in place, if `name`
    /// is already bound in this scope.
    pub fn define(&mut self, scope: ScopeId, name: impl Into<String>, binding: Binding) -> bool {
        let bindings = &mut self.scopes[scope.index()].bindings;
        let name = name.into();
        if bindings.contains_key(&name) {
            return false;
        }
        bindings.insert(name, binding);
        true
    }

    /// Binding of `name` in `scope` itself, ignoring parents.
    pub fn local(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        self.scopes[scope.index()].bindings.get(name)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    /// Walk from `scope` outward, then consult the builtins.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Lookup<'_>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(binding) = scope.bindings.get(name) {
                return Some(Lookup::Binding(binding));
            }
            current = scope.parent;
        }
        self.builtins.get(name).map(Lookup::Builtin)
    }

    pub fn builtins(&self) -> &Rc<Builtins> {
        &self.builtins
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Environment in which an expression is evaluated.
#[derive(Clone)]
pub enum Env {
    Static(ScopeId),
    Frame(Rc<Frame>),
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Env::Static(scope) => write!(f, "Static({scope:?})"),
            Env::Frame(frame) => write!(f, "Frame({} slots)", frame.slots.len()),
        }
    }
}

/// Runtime frame for a function call or a `let` block inside a function.
pub struct Frame {
    slots: FxHashMap<String, Slot>,
    parent: Env,
}

impl Frame {
    pub fn new(parent: Env) -> Self {
        Frame {
            slots: FxHashMap::default(),
            parent,
        }
    }

    /// Bind a call argument, left unevaluated until the parameter is used.
    pub fn bind_arg(&mut self, name: impl Into<String>, arg: Closure) {
        self.slots.insert(name.into(), Slot::Arg(arg));
    }

    /// Bind a declaration evaluated in this frame when looked up.
    pub fn bind_lazy(&mut self, name: impl Into<String>, decl: DeclId) {
        self.slots.insert(
            name.into(),
            Slot::Lazy {
                decl,
                busy: Cell::new(false),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn parent(&self) -> &Env {
        &self.parent
    }
}

/// Binding in a runtime frame.
pub enum Slot {
    /// Argument expression in the caller's environment, evaluated on each
    /// lookup.
    Arg(Closure),
    /// Declaration without a memo: its value depends on the enclosing
    /// call's arguments. `busy` is set while it is being evaluated.
    Lazy { decl: DeclId, busy: Cell<bool> },
}
