//! Runtime values produced by `evaluate`.
//!
//! Values are cheap to clone: everything beyond plain JSON is behind an
//! `Rc`. Closures hold their module weakly so that memoized declaration
//! values never keep their own module alive.

mod exports;

use std::fmt;
use std::rc::{Rc, Weak};

use jsondl_ir::{DeclId, ExprId, JsonValue};
use regex::Regex;

use crate::environment::Env;
use crate::module::ModuleBody;
use crate::native::NativePattern;
use crate::transaction::TransactionalSet;

pub use exports::Exports;

/// Result of evaluating an expression.
#[derive(Clone)]
pub enum Value {
    /// JSON literal, member of a JSON object, or `this`.
    Json(JsonValue),
    Regex(Rc<Regex>),
    /// Pattern node closed over its environment.
    Pattern(Closure),
    /// Parametric pattern awaiting arguments.
    Function(Closure),
    Native(Rc<NativePattern>),
    /// Native predicate applied to evaluated arguments.
    Bound {
        native: Rc<NativePattern>,
        args: Rc<[Value]>,
    },
    /// Namespace import or a loader-provided export table.
    Exports(Rc<Exports>),
    /// Export of another module, evaluated when first used.
    Declaration(DeclRef),
    Set(Rc<TransactionalSet>),
}

impl Value {
    /// Short description used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Json(_) => "literal",
            Value::Regex(_) => "regular expression",
            Value::Pattern(_) => "pattern",
            Value::Function(_) => "function",
            Value::Native(_) => "native pattern",
            Value::Bound { .. } => "native pattern",
            Value::Exports(_) => "module namespace",
            Value::Declaration(_) => "declaration",
            Value::Set(_) => "set",
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Value::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Rc<TransactionalSet>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::Json(value)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Json(value) => write!(f, "Json({value})"),
            Value::Regex(regex) => write!(f, "Regex(/{}/)", regex.as_str()),
            Value::Pattern(closure) => write!(f, "Pattern({:?})", closure.expr),
            Value::Function(closure) => write!(f, "Function({:?})", closure.expr),
            Value::Native(native) => write!(f, "Native({})", native.name()),
            Value::Bound { native, args } => {
                write!(f, "Bound({}, {} args)", native.name(), args.len())
            }
            Value::Exports(exports) => write!(f, "Exports({} entries)", exports.len()),
            Value::Declaration(decl) => write!(f, "Declaration({:?})", decl.decl),
            Value::Set(set) => write!(f, "Set({} entries)", set.len()),
        }
    }
}

/// A node of some module together with the environment it was evaluated in.
#[derive(Clone)]
pub struct Closure {
    pub(crate) module: Weak<ModuleBody>,
    pub expr: ExprId,
    pub(crate) env: Env,
}

impl Closure {
    pub(crate) fn new(module: &Rc<ModuleBody>, expr: ExprId, env: Env) -> Self {
        Closure {
            module: Rc::downgrade(module),
            expr,
            env,
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }
}

/// Handle on a declaration of a compiled module.
#[derive(Clone)]
pub struct DeclRef {
    pub(crate) module: Rc<ModuleBody>,
    pub decl: DeclId,
}

/// Deep JSON equality with numbers compared by value, so `1` equals `1.0`.
#[allow(clippy::float_cmp, reason = "exact numeric equality is the intended semantics")]
pub fn json_equal(left: &JsonValue, right: &JsonValue) -> bool {
    match (left, right) {
        (JsonValue::Number(l), JsonValue::Number(r)) => l == r || l.as_f64() == r.as_f64(),
        (JsonValue::Array(l), JsonValue::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| json_equal(l, r))
        }
        (JsonValue::Object(l), JsonValue::Object(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .all(|(key, l)| r.get(key).is_some_and(|r| json_equal(l, r)))
        }
        _ => left == right,
    }
}
