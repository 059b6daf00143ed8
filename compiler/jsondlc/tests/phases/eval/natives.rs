//! Native predicates, calls and parametric patterns.

use std::rc::Rc;

use jsondlc::{
    Builtins, Cardinality, DeclId, DiagnosticSink, MemoryLoader, NativePattern, Severity,
    TestError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{build, check, compile_ok, natives, run};

#[test]
fn native_with_arguments() {
    let module = compile_ok(|m| {
        let lt = m.reference("lt");
        let ten = m.literal(10);
        let call = m.call(lt, [ten]);
        m.export_default(call);
    });
    assert!(check(&module, &json!(3)));
    assert!(!check(&module, &json!(10)));
    assert!(!check(&module, &json!("3")));
}

#[test]
fn native_error_fails_the_test_and_carries_path() {
    let module = compile_ok(|m| {
        let lt = m.reference("lt");
        let bad = m.literal("ten");
        let call = m.call(lt, [bad]);
        let prop = m.property("size", call, Cardinality::ONE);
        let object = m.object([prop]);
        m.export_default(object);
    });
    let (result, sink) = run(&module, &json!({"size": 1}));
    assert_eq!(result, Ok(false));
    let diag = sink.iter().next().cloned().unwrap();
    assert_eq!(diag.message, "lt expects a numeric limit");
    assert_eq!(diag.path.as_deref(), Some("$.size"));
}

#[test]
fn parametric_pattern() {
    // const pair = fn(a, b) [a, b]; default pair(string, number)
    let module = compile_ok(|m| {
        let a = m.reference("a");
        let b = m.reference("b");
        let array = m.array([a, b], Cardinality::ONE);
        let func = m.function(&["a", "b"], array);
        m.const_decl("pair", func);
        let pair = m.reference("pair");
        let string = m.reference("string");
        let number = m.reference("number");
        let call = m.call(pair, [string, number]);
        m.export_default(call);
    });
    assert!(check(&module, &json!(["x", 1])));
    assert!(!check(&module, &json!([1, "x"])));
}

#[test]
fn local_declarations_in_function_see_arguments() {
    // const bounded = fn(max) let small = lt(max) in [small*]
    let module = compile_ok(|m| {
        let lt = m.reference("lt");
        let max = m.reference("max");
        let small_body = m.call(lt, [max]);
        let small = m.reference("small");
        let item = m.item(small, Cardinality::ANY);
        let array = m.array([item], Cardinality::ONE);
        let let_in = m.let_in(&[("small", small_body)], array);
        let func = m.function(&["max"], let_in);
        m.const_decl("bounded", func);

        let bounded = m.reference("bounded");
        let five = m.literal(5);
        let under_five = m.call(bounded, [five]);
        m.export_const("underFive", under_five);

        let bounded = m.reference("bounded");
        let hundred = m.literal(100);
        let under_hundred = m.call(bounded, [hundred]);
        m.export_default(under_hundred);
    });
    assert!(check(&module, &json!([50, 99])));
    let mut sink = DiagnosticSink::new();
    assert_eq!(module.test_export(&json!([50]), "underFive", &mut sink), Ok(false));
    assert_eq!(module.test_export(&json!([1, 4]), "underFive", &mut sink), Ok(true));
}

#[test]
fn arguments_resolve_in_the_callers_scope() {
    // const x = string; const f = fn(y) let x = number in [x, y]; default f(x)
    let module = compile_ok(|m| {
        let string = m.reference("string");
        m.const_decl("x", string);
        let inner_x = m.reference("x");
        let y = m.reference("y");
        let array = m.array([inner_x, y], Cardinality::ONE);
        let number = m.reference("number");
        let let_in = m.let_in(&[("x", number)], array);
        let func = m.function(&["y"], let_in);
        m.const_decl("f", func);
        let f = m.reference("f");
        let x = m.reference("x");
        let call = m.call(f, [x]);
        m.export_default(call);
    });
    assert!(check(&module, &json!([1, "a"])));
    assert!(!check(&module, &json!([1, 2])));
}

#[test]
fn native_arguments_are_evaluated_at_the_call() {
    // const a = a; default lt(a)
    let module = compile_ok(|m| {
        let a = m.reference("a");
        m.const_decl("a", a);
        let lt = m.reference("lt");
        let a = m.reference("a");
        let call = m.call(lt, [a]);
        m.export_default(call);
    });
    let (result, _) = run(&module, &json!(1));
    assert_eq!(
        result,
        Err(TestError::CircularReference { name: "a".into() })
    );
}

#[test]
fn testing_individual_declarations() {
    // const digits = [integer*]
    // const bounded = fn(max) let small = lt(max) in [small*]
    // default bounded(5)
    let module = compile_ok(|m| {
        let integer = m.reference("integer");
        let item = m.item(integer, Cardinality::ANY);
        let digits = m.array([item], Cardinality::ONE);
        m.const_decl("digits", digits);

        let lt = m.reference("lt");
        let max = m.reference("max");
        let small_body = m.call(lt, [max]);
        let small = m.reference("small");
        let item = m.item(small, Cardinality::ANY);
        let array = m.array([item], Cardinality::ONE);
        let let_in = m.let_in(&[("small", small_body)], array);
        let func = m.function(&["max"], let_in);
        m.const_decl("bounded", func);

        let bounded = m.reference("bounded");
        let five = m.literal(5);
        let call = m.call(bounded, [five]);
        m.export_default(call);
    });
    let mut sink = DiagnosticSink::new();

    let digits = module.find_declaration("digits").unwrap();
    assert_eq!(module.test_declaration(&json!([1, 2]), digits, &mut sink), Ok(true));
    assert_eq!(module.test_declaration(&json!([1.5]), digits, &mut sink), Ok(false));

    let small = module.find_declaration("small").unwrap();
    assert_eq!(
        module.test_declaration(&json!(1), small, &mut sink),
        Err(TestError::NoFixedEnvironment("small".into()))
    );
    assert_eq!(
        module.test_declaration(&json!(1), DeclId::new(999), &mut sink),
        Err(TestError::UnknownDeclaration(999))
    );
    assert!(sink.is_empty());
}

#[test]
fn wrong_argument_count() {
    let module = compile_ok(|m| {
        let x = m.reference("x");
        let func = m.function(&["x"], x);
        m.const_decl("id", func);
        let id = m.reference("id");
        let one = m.literal(1);
        let two = m.literal(2);
        let call = m.call(id, [one, two]);
        m.export_default(call);
    });
    let (result, sink) = run(&module, &json!(1));
    assert_eq!(result, Ok(false));
    assert_eq!(sink.messages(), vec!["expected 1 argument, got 2"]);
}

#[test]
fn not_callable() {
    let module = compile_ok(|m| {
        let string = m.reference("string");
        let once = m.call(string, []);
        let twice = m.call(once, []);
        m.export_default(twice);
    });
    let (result, sink) = run(&module, &json!("x"));
    assert_eq!(result, Ok(false));
    assert_eq!(sink.messages(), vec!["expression is not callable"]);
}

#[test]
fn functions_and_sets_are_not_patterns() {
    let module = compile_ok(|m| {
        let x = m.reference("x");
        let func = m.function(&["x"], x);
        m.export_const("f", func);
        let set = m.set();
        m.export_default(set);
    });
    let (result, sink) = run(&module, &json!(1));
    assert_eq!(result, Ok(false));
    assert_eq!(sink.messages(), vec!["set can't be used as pattern"]);

    let mut sink = DiagnosticSink::new();
    assert_eq!(module.test_export(&json!(1), "f", &mut sink), Ok(false));
    assert_eq!(sink.messages(), vec!["function can't be used as pattern"]);
}

#[test]
fn warnings_do_not_fail_the_test() {
    let mut natives = natives();
    natives.push(NativePattern::new("legacy", |cx, v, _| {
        cx.report_warning("legacy is deprecated");
        Ok(v.is_string())
    }));
    let builtins = Rc::new(Builtins::new(natives).unwrap());
    let parsed = build(|m| {
        let legacy = m.reference("legacy");
        m.export_default(legacy);
    });
    let mut sink = DiagnosticSink::new();
    let module = jsondlc::compile(
        parsed,
        &MemoryLoader::new(),
        &builtins,
        &jsondlc::BindOptions::new(),
        &mut sink,
    )
    .unwrap();

    assert_eq!(module.test(&json!("x"), &mut sink), Ok(true));
    assert_eq!(module.test(&json!(1), &mut sink), Ok(false));
    assert_eq!(sink.error_count(), 0);
    let severities: Vec<_> = sink.iter().map(|d| d.severity).collect();
    assert_eq!(severities, vec![Severity::Warning, Severity::Warning]);
}

#[test]
fn item_outside_array() {
    let module = compile_ok(|m| {
        let any = m.reference("any");
        let item = m.item(any, Cardinality::ANY);
        m.export_default(item);
    });
    let (result, sink) = run(&module, &json!([]));
    assert_eq!(result, Ok(false));
    assert_eq!(
        sink.messages(),
        vec!["array item pattern used outside an array pattern"]
    );
}
