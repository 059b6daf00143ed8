//! The pattern engine.
//!
//! [`evaluate`] turns an expression into a [`Value`]; [`test_expr`] matches
//! a candidate against an expression. Both are exhaustive over `ExprKind`.
//! Pattern kinds (`|`, `&`, `!`, objects, properties, arrays) evaluate to a
//! closure over the current environment and are tested directly; every
//! other kind is evaluated first and the resulting value is tested.
//!
//! Ordinary failures are reported to the sink and make the enclosing test
//! return `false`. Circular references propagate as a fatal error.

mod array;
mod decl;

use std::rc::Rc;

use jsondl_ir::{Cardinality, ExprId, ExprKind, JsonValue};

use crate::context::PathSegment;
use crate::environment::{Binding, Env, Frame, Lookup, Slot};
use crate::errors::{
    arity_mismatch, item_outside_array, module_dropped, not_a_pattern, not_callable,
    not_exported, property_not_found, regex_unavailable, this_unavailable, undefined,
};
use crate::module::ModuleBody;
use crate::stack::ensure_sufficient_stack;
use crate::{json_equal, Closure, EvalError, EvalResult, ExecutionContext, Value};

pub(crate) use decl::eval_decl;

/// Evaluate `expr` of `module` in the context's current environment.
pub(crate) fn evaluate(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    expr: ExprId,
) -> EvalResult<Value> {
    ensure_sufficient_stack(|| evaluate_inner(cx, module, expr))
}

fn evaluate_inner(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    expr: ExprId,
) -> EvalResult<Value> {
    match module.arena.kind(expr) {
        ExprKind::Literal(value) => Ok(Value::Json(value.clone())),
        ExprKind::Regex { .. } => match module.regex(expr) {
            Some(regex) => Ok(Value::Regex(Rc::clone(regex))),
            None => Err(cx.fail(regex_unavailable().with_span(module.arena.span(expr)))),
        },
        ExprKind::Reference(name) => {
            let value = lookup(cx, module, name)?;
            force(cx, value)
        }
        ExprKind::Member { expr: object, name } => {
            let object = evaluate(cx, module, *object)?;
            member(cx, &object, name)
        }
        ExprKind::Call { callee, args } => {
            let callee = evaluate(cx, module, *callee)?;
            call(cx, module, callee, module.arena.list(*args))
        }
        ExprKind::Function { .. } => Ok(Value::Function(Closure::new(
            module,
            expr,
            cx.env().clone(),
        ))),
        ExprKind::Let { decls, body } => {
            let env = match module.let_scope(expr) {
                Some(scope) => Env::Static(scope),
                None => {
                    let mut frame = Frame::new(cx.env().clone());
                    for &decl in decls {
                        frame.bind_lazy(module.arena.decl(decl).name.clone(), decl);
                    }
                    Env::Frame(Rc::new(frame))
                }
            };
            cx.with_env(env, |cx| evaluate(cx, module, *body))
        }
        ExprKind::Or(_)
        | ExprKind::And(_)
        | ExprKind::Not(_)
        | ExprKind::Object(_)
        | ExprKind::Property { .. }
        | ExprKind::Array { .. }
        | ExprKind::ArrayItem { .. } => Ok(Value::Pattern(Closure::new(
            module,
            expr,
            cx.env().clone(),
        ))),
        ExprKind::This => match cx.subject() {
            Some(subject) => Ok(Value::Json(subject.clone())),
            None => Err(cx.fail(this_unavailable().with_span(module.arena.span(expr)))),
        },
        ExprKind::Set => Ok(Value::Set(module.set(expr))),
    }
}

/// Match `candidate` against `expr` of `module`.
pub(crate) fn test_expr(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    expr: ExprId,
    candidate: &JsonValue,
) -> EvalResult<bool> {
    let result = ensure_sufficient_stack(|| test_inner(cx, module, expr, candidate));
    match result {
        Err(EvalError::Reported(_)) => Ok(false),
        other => other,
    }
}

fn test_inner(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    expr: ExprId,
    candidate: &JsonValue,
) -> EvalResult<bool> {
    match module.arena.kind(expr) {
        ExprKind::Literal(value) => Ok(json_equal(value, candidate)),
        ExprKind::Regex { .. }
        | ExprKind::Reference(_)
        | ExprKind::Member { .. }
        | ExprKind::Call { .. }
        | ExprKind::Let { .. }
        | ExprKind::This => {
            let value = evaluate(cx, module, expr)?;
            test_value(cx, &value, candidate)
        }
        ExprKind::Function { .. } => Err(cx.fail(not_a_pattern("function"))),
        ExprKind::Set => Err(cx.fail(not_a_pattern("set"))),
        ExprKind::Or(items) => {
            let mut matched = false;
            for (index, &item) in module.arena.list(*items).iter().enumerate() {
                let mut tx = cx.begin();
                let ok = test_expr(&mut tx, module, item, candidate)?;
                tracing::trace!(alternative = index, ok, "or");
                if ok {
                    tx.commit();
                    matched = true;
                }
            }
            Ok(matched)
        }
        ExprKind::And(items) => {
            for &item in module.arena.list(*items) {
                if !test_expr(cx, module, item, candidate)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ExprKind::Not(inner) => {
            let mut tx = cx.begin();
            let matched = test_expr(&mut tx, module, *inner, candidate)?;
            tx.rollback();
            Ok(!matched)
        }
        ExprKind::Object(properties) => {
            if !candidate.is_object() {
                return Ok(false);
            }
            let properties = module.arena.list(*properties);
            with_subject(cx, module, candidate, |cx| {
                cx.with_path(PathSegment::Object, |cx| {
                    for &property in properties {
                        if !test_expr(cx, module, property, candidate)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                })
            })
        }
        ExprKind::Property {
            name,
            value,
            cardinality,
        } => test_property(cx, module, *name, *value, *cardinality, candidate),
        ExprKind::Array { items, cardinality } => {
            let items = module.arena.list(*items);
            array::test_array(cx, module, items, *cardinality, candidate)
        }
        ExprKind::ArrayItem { .. } => Err(cx.fail(item_outside_array())),
    }
}

/// Match `candidate` against an evaluated value.
pub(crate) fn test_value(
    cx: &mut ExecutionContext<'_>,
    value: &Value,
    candidate: &JsonValue,
) -> EvalResult<bool> {
    match value {
        Value::Json(literal) => Ok(json_equal(literal, candidate)),
        Value::Regex(regex) => Ok(candidate.as_str().is_some_and(|s| regex.is_match(s))),
        Value::Pattern(closure) => {
            let module = upgrade(cx, closure)?;
            cx.with_env(closure.env.clone(), |cx| {
                test_expr(cx, &module, closure.expr, candidate)
            })
        }
        Value::Native(native) => native.call(cx, candidate, &[]),
        Value::Bound { native, args } => native.call(cx, candidate, args),
        Value::Declaration(_) => {
            let forced = force(cx, value.clone())?;
            test_value(cx, &forced, candidate)
        }
        Value::Function(_) | Value::Exports(_) | Value::Set(_) => {
            Err(cx.fail(not_a_pattern(value.kind_name())))
        }
    }
}

fn upgrade(cx: &mut ExecutionContext<'_>, closure: &Closure) -> EvalResult<Rc<ModuleBody>> {
    closure
        .module
        .upgrade()
        .ok_or_else(|| cx.fail(module_dropped()))
}

/// Count own properties whose name matches `name` and whose value matches
/// `value`; any value mismatch fails immediately.
fn test_property(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    name: ExprId,
    value: ExprId,
    cardinality: Cardinality,
    candidate: &JsonValue,
) -> EvalResult<bool> {
    let Some(object) = candidate.as_object() else {
        return Ok(false);
    };
    let mut count = 0usize;
    for (key, child) in object {
        if !test_expr(cx, module, name, &JsonValue::String(key.clone()))? {
            continue;
        }
        cx.record_match(key);
        let mut tx = cx.begin_without_match_set();
        let matched = tx.with_path(PathSegment::Property(key.clone()), |cx| {
            test_expr(cx, module, value, child)
        })?;
        tx.commit();
        if !matched {
            return Ok(false);
        }
        count += 1;
    }
    Ok(cardinality.contains(count))
}

/// Track `this` while matching inside `module` when the module uses it.
pub(super) fn with_subject<'d, R>(
    cx: &mut ExecutionContext<'d>,
    module: &ModuleBody,
    candidate: &JsonValue,
    f: impl FnOnce(&mut ExecutionContext<'d>) -> R,
) -> R {
    if module.uses_this {
        cx.with_subject(candidate.clone(), f)
    } else {
        f(cx)
    }
}

/// Resolve `name` in the current environment.
fn lookup(cx: &mut ExecutionContext<'_>, module: &Rc<ModuleBody>, name: &str) -> EvalResult<Value> {
    let mut env = cx.env().clone();
    loop {
        match env {
            Env::Frame(frame) => {
                match frame.get(name) {
                    Some(Slot::Arg(arg)) => {
                        let Closure { expr, env: caller_env, .. } = arg.clone();
                        let caller = upgrade(cx, arg)?;
                        return cx.with_env(caller_env, |cx| evaluate(cx, &caller, expr));
                    }
                    Some(Slot::Lazy { decl, busy }) => {
                        return decl::eval_lazy(cx, module, &frame, *decl, busy);
                    }
                    None => {}
                }
                env = frame.parent().clone();
            }
            Env::Static(scope) => {
                return match module.scopes.lookup(scope, name) {
                    Some(Lookup::Binding(Binding::Decl(decl))) => {
                        let decl = *decl;
                        eval_decl(cx, module, decl)
                    }
                    Some(Lookup::Binding(Binding::Value(value))) => Ok(value.clone()),
                    Some(Lookup::Binding(Binding::Import {
                        exports,
                        name: remote,
                        specifier,
                    })) => match exports.get(remote) {
                        Some(value) => Ok(value.clone()),
                        None => Err(cx.fail(not_exported(remote, specifier))),
                    },
                    Some(Lookup::Builtin(native)) => Ok(Value::Native(Rc::clone(native))),
                    Some(Lookup::Binding(Binding::Param)) | None => {
                        Err(cx.fail(undefined(name)))
                    }
                };
            }
        }
    }
}

/// Evaluate declaration handles of other modules.
fn force(cx: &mut ExecutionContext<'_>, value: Value) -> EvalResult<Value> {
    match value {
        Value::Declaration(handle) => {
            let forced = eval_decl(cx, &handle.module, handle.decl)?;
            force(cx, forced)
        }
        other => Ok(other),
    }
}

fn member(cx: &mut ExecutionContext<'_>, object: &Value, name: &str) -> EvalResult<Value> {
    let found = match object {
        Value::Exports(exports) => exports.get(name).cloned(),
        Value::Json(JsonValue::Object(map)) => map.get(name).cloned().map(Value::Json),
        _ => None,
    };
    match found {
        Some(value) => force(cx, value),
        None => Err(cx.fail(property_not_found(name))),
    }
}

/// Apply `callee` to the argument expressions `args` of `module`.
///
/// Natives receive evaluated arguments. Functions bind each parameter to
/// its unevaluated argument, so an unused argument is never evaluated.
fn call(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    callee: Value,
    args: &[ExprId],
) -> EvalResult<Value> {
    match callee {
        Value::Native(native) => {
            let args = args
                .iter()
                .map(|&arg| evaluate(cx, module, arg))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Value::Bound {
                native,
                args: args.into(),
            })
        }
        Value::Function(closure) => {
            let function = upgrade(cx, &closure)?;
            let ExprKind::Function { params, body } = function.arena.kind(closure.expr) else {
                return Err(cx.fail(not_callable()));
            };
            if params.len() != args.len() {
                return Err(cx.fail(arity_mismatch(params.len(), args.len())));
            }
            let mut frame = Frame::new(closure.env.clone());
            for (param, &arg) in params.iter().zip(args) {
                frame.bind_arg(param.clone(), Closure::new(module, arg, cx.env().clone()));
            }
            let body = *body;
            cx.with_env(Env::Frame(Rc::new(frame)), |cx| evaluate(cx, &function, body))
        }
        _ => Err(cx.fail(not_callable())),
    }
}
