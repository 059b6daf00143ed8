//! Shared test utilities for phase tests.

use std::rc::Rc;

use jsondlc::{
    bind_module, compile, BindOptions, Builtins, DiagnosticSink, ErrorGuaranteed, JsonValue,
    MemoryLoader, Module, ModuleBuilder, NativePattern, TestError, Value,
};

/// A small predicate library standing in for an embedder's builtins.
pub fn natives() -> Vec<NativePattern> {
    vec![
        NativePattern::new("any", |_, _, _| Ok(true)),
        NativePattern::new("string", |_, v, _| Ok(v.is_string())),
        NativePattern::new("number", |_, v, _| Ok(v.is_number())),
        NativePattern::new("integer", |_, v, _| Ok(v.is_i64() || v.is_u64())),
        NativePattern::new("boolean", |_, v, _| Ok(v.is_boolean())),
        // lt(limit)
        NativePattern::new("lt", |cx, v, args| {
            let Some(limit) = args.first().and_then(Value::as_json).and_then(JsonValue::as_f64)
            else {
                return Err(cx.report_error("lt expects a numeric limit"));
            };
            Ok(v.as_f64().is_some_and(|n| n < limit))
        }),
        // unique(set): each value may be seen once
        NativePattern::new("unique", |cx, v, args| {
            let Some(set) = args.first().and_then(Value::as_set) else {
                return Err(cx.report_error("unique expects a set"));
            };
            if cx.set_insert(set, v) {
                Ok(true)
            } else {
                Err(cx.report_error(format!("duplicate value {v}")))
            }
        }),
    ]
}

pub fn builtins() -> Rc<Builtins> {
    Rc::new(Builtins::new(natives()).unwrap())
}

pub fn build(f: impl FnOnce(&mut ModuleBuilder)) -> jsondlc::ParsedModule {
    let mut builder = ModuleBuilder::new();
    f(&mut builder);
    builder.finish()
}

/// Bind with the given loader, returning the module and its diagnostics.
pub fn bind_in(
    loader: &MemoryLoader,
    f: impl FnOnce(&mut ModuleBuilder),
) -> (Module, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let module = bind_module(build(f), loader, &builtins(), &BindOptions::new(), &mut sink);
    (module, sink)
}

pub fn bind(f: impl FnOnce(&mut ModuleBuilder)) -> (Module, DiagnosticSink) {
    bind_in(&MemoryLoader::new(), f)
}

/// Compile, returning the outcome and the diagnostics.
pub fn try_compile(
    loader: &MemoryLoader,
    f: impl FnOnce(&mut ModuleBuilder),
) -> (Result<Module, ErrorGuaranteed>, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let result = compile(build(f), loader, &builtins(), &BindOptions::new(), &mut sink);
    (result, sink)
}

/// Compile a module that must bind cleanly.
pub fn compile_in(loader: &MemoryLoader, f: impl FnOnce(&mut ModuleBuilder)) -> Module {
    let (result, sink) = try_compile(loader, f);
    result.unwrap_or_else(|_| panic!("unexpected bind errors: {:?}", sink.messages()))
}

pub fn compile_ok(f: impl FnOnce(&mut ModuleBuilder)) -> Module {
    compile_in(&MemoryLoader::new(), f)
}

/// Test against the default export, returning the result and diagnostics.
pub fn run(module: &Module, value: &JsonValue) -> (Result<bool, TestError>, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let result = module.test(value, &mut sink);
    (result, sink)
}

/// Test against the default export; the run must not be aborted.
pub fn check(module: &Module, value: &JsonValue) -> bool {
    run(module, value).0.unwrap()
}

pub fn check_export(module: &Module, id: &str, value: &JsonValue) -> bool {
    let mut sink = DiagnosticSink::new();
    module.test_export(value, id, &mut sink).unwrap()
}
