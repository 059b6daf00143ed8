//! Declaration evaluation and cycle detection.
//!
//! Declarations with a fixed environment are memoized in their module,
//! unless the module reads `this`.
//! Declarations inside function bodies live in runtime frames and are
//! recomputed on each lookup; a busy flag guards them instead.
//!
//! Re-entering a declaration that is being evaluated raises a circular
//! condition tagged with that declaration. While the condition unwinds,
//! each declaration it leaves reports itself, until it leaves the origin.

use std::cell::Cell;
use std::rc::Rc;

use jsondl_ir::DeclId;

use super::evaluate;
use crate::environment::{Env, Frame};
use crate::errors::circular_reference;
use crate::module::{DeclState, ModuleBody};
use crate::{Circular, CircularState, EvalError, EvalResult, ExecutionContext, Value};

/// Evaluate a memoized declaration of `module`.
pub(crate) fn eval_decl(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    decl: DeclId,
) -> EvalResult<Value> {
    let state = module.decl_state(decl);
    let declaration = module.arena.decl(decl);
    let origin = std::ptr::from_ref(state) as usize;

    {
        let mut current = state.borrow_mut();
        match &*current {
            DeclState::Done(value) => return Ok(value.clone()),
            DeclState::InProgress => {
                tracing::debug!(name = %declaration.name, "declaration re-entered");
                return Err(EvalError::Circular(Circular::new(
                    origin,
                    declaration.name.clone(),
                )));
            }
            DeclState::Unevaluated => *current = DeclState::InProgress,
        }
    }

    let env = match module.decl_scope(decl) {
        Some(scope) => Env::Static(scope),
        None => cx.env().clone(),
    };
    let result = cx.with_env(env, |cx| evaluate(cx, module, declaration.body));

    match result {
        // A module that reads `this` may produce a different value per
        // subject, so its declarations are not memoized.
        Ok(value) if module.uses_this => {
            *state.borrow_mut() = DeclState::Unevaluated;
            Ok(value)
        }
        Ok(value) => {
            *state.borrow_mut() = DeclState::Done(value.clone());
            Ok(value)
        }
        Err(err) => {
            *state.borrow_mut() = DeclState::Unevaluated;
            Err(leave_declaration(cx, err, origin, &declaration.name))
        }
    }
}

/// Evaluate a per-call declaration slot of `frame`.
pub(super) fn eval_lazy(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    frame: &Rc<Frame>,
    decl: DeclId,
    busy: &Cell<bool>,
) -> EvalResult<Value> {
    let declaration = module.arena.decl(decl);
    let origin = std::ptr::from_ref(busy) as usize;
    if busy.replace(true) {
        tracing::debug!(name = %declaration.name, "local declaration re-entered");
        return Err(EvalError::Circular(Circular::new(
            origin,
            declaration.name.clone(),
        )));
    }

    let result = cx.with_env(Env::Frame(Rc::clone(frame)), |cx| {
        evaluate(cx, module, declaration.body)
    });
    busy.set(false);
    result.map_err(|err| leave_declaration(cx, err, origin, &declaration.name))
}

fn leave_declaration(
    cx: &mut ExecutionContext<'_>,
    err: EvalError,
    origin: usize,
    name: &str,
) -> EvalError {
    match err {
        EvalError::Circular(mut circular) if circular.state == CircularState::Propagating => {
            cx.report(circular_reference(name));
            if circular.origin == origin {
                circular.state = CircularState::Reported;
            }
            EvalError::Circular(circular)
        }
        other => other,
    }
}
