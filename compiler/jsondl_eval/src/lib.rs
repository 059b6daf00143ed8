//! Pattern evaluation engine for jsondl.
//!
//! A bound [`Module`] is tested against JSON values by evaluating its
//! declarations on demand and matching the resulting patterns:
//! - [`Value`]: results of evaluation (literals, regexes, closures, natives,
//!   namespaces, transactional sets)
//! - [`ScopeArena`] and [`Env`]: static scopes recorded by the binder and
//!   runtime frames for parametric patterns
//! - [`ExecutionContext`]: per-call state with the transaction stack
//! - [`Module`]: compiled unit with its export table
//!
//! # Evaluation model
//!
//! Declarations are evaluated lazily and at most once per module. Speculative
//! matches (alternatives, negation, array repetitions) run inside
//! transactions whose side effects are discarded unless committed.
//!
//! The engine is single-threaded. Modules and values share `Rc` handles and
//! are neither `Send` nor `Sync`.

mod builtins;
mod context;
mod environment;
mod errors;
mod exec;
mod module;
mod native;
mod stack;
mod transaction;
mod value;

pub use builtins::Builtins;
pub use context::{ExecutionContext, PathSegment, TransactionGuard};
pub use environment::{Binding, Env, Frame, Lookup, ScopeArena, ScopeId, Slot};
pub use errors::{BuiltinsError, Circular, CircularState, EvalError, EvalResult, TestError};
pub use module::{Module, ModuleParts};
pub use native::{NativeFn, NativePattern};
pub use stack::ensure_sufficient_stack;
pub use transaction::TransactionalSet;
pub use value::{json_equal, Closure, DeclRef, Exports, Value};
