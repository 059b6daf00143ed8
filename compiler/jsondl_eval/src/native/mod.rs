//! Native predicates implemented in Rust.

use std::fmt;

use jsondl_ir::JsonValue;

use crate::{EvalResult, ExecutionContext, Value};

/// Signature of a native predicate: `(context, candidate, arguments)`.
///
/// Arguments are the evaluated call arguments (empty when the native is
/// used bare). A predicate may report diagnostics through the context;
/// any reported error makes the enclosing `test` call fail.
pub type NativeFn = dyn Fn(&mut ExecutionContext<'_>, &JsonValue, &[Value]) -> EvalResult<bool>;

/// A named native predicate.
pub struct NativePattern {
    name: String,
    func: Box<NativeFn>,
}

impl NativePattern {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut ExecutionContext<'_>, &JsonValue, &[Value]) -> EvalResult<bool> + 'static,
    ) -> Self {
        NativePattern {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the predicate.
    pub fn call(
        &self,
        cx: &mut ExecutionContext<'_>,
        candidate: &JsonValue,
        args: &[Value],
    ) -> EvalResult<bool> {
        (self.func)(cx, candidate, args)
    }
}

impl fmt::Debug for NativePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativePattern")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
