//! Evaluation across module boundaries.

use jsondlc::{Cardinality, DiagnosticSink, MemoryLoader, Module};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{bind_in, check, compile_in, compile_ok, run};

/// `export const id = string; export const point = { x: number, y: number };
/// export const listOf = fn(item) [item*]`
fn library() -> Module {
    compile_ok(|m| {
        let string = m.reference("string");
        m.export_const("id", string);

        let number = m.reference("number");
        let x = m.property("x", number, Cardinality::ONE);
        let number = m.reference("number");
        let y = m.property("y", number, Cardinality::ONE);
        let point = m.object([x, y]);
        m.export_const("point", point);

        let item = m.reference("item");
        let repeated = m.item(item, Cardinality::ANY);
        let array = m.array([repeated], Cardinality::ONE);
        let func = m.function(&["item"], array);
        m.export_const("listOf", func);
    })
}

fn loader_with_library() -> (MemoryLoader, Module) {
    let lib = library();
    let mut loader = MemoryLoader::new();
    loader.register_module("./geometry", &lib);
    (loader, lib)
}

#[test]
fn named_import() {
    let (loader, _lib) = loader_with_library();
    let module = compile_in(&loader, |m| {
        m.import("./geometry", &[("point", "pt")]);
        let pt = m.reference("pt");
        m.export_default(pt);
    });
    assert!(check(&module, &json!({"x": 1, "y": 2})));
    assert!(!check(&module, &json!({"x": 1})));
}

#[test]
fn namespace_member_and_remote_function() {
    let (loader, _lib) = loader_with_library();
    let module = compile_in(&loader, |m| {
        m.import("./geometry", &[("*", "geo")]);
        let geo = m.reference("geo");
        let list_of = m.member(geo, "listOf");
        let geo = m.reference("geo");
        let point = m.member(geo, "point");
        let call = m.call(list_of, [point]);
        m.export_default(call);
    });
    assert!(check(&module, &json!([{"x": 0, "y": 0}, {"x": 1, "y": 1}])));
    assert!(!check(&module, &json!([{"x": 0}])));
}

#[test]
fn imported_declarations_evaluate_lazily() {
    let (loader, lib) = loader_with_library();
    let module = compile_in(&loader, |m| {
        m.import("./geometry", &[("id", "id"), ("point", "point")]);
        let id = m.reference("id");
        m.export_default(id);
    });
    assert!(check(&module, &json!("abc")));

    let decl = |name: &str| lib.find_declaration(name).unwrap();
    assert!(lib.is_evaluated(decl("id")));
    assert!(!lib.is_evaluated(decl("point")));
}

#[test]
fn missing_named_export_fails_at_evaluation() {
    let (loader, _lib) = loader_with_library();
    let (module, sink) = bind_in(&loader, |m| {
        m.import("./geometry", &[("circle", "circle")]);
        let circle = m.reference("circle");
        m.export_default(circle);
    });
    assert!(sink.is_empty());

    let (result, sink) = run(&module, &json!({}));
    assert_eq!(result, Ok(false));
    assert_eq!(
        sink.messages(),
        vec!["'circle' is not exported by './geometry'"]
    );
}

#[test]
fn missing_namespace_member() {
    let (loader, _lib) = loader_with_library();
    let module = compile_in(&loader, |m| {
        m.import("./geometry", &[("*", "geo")]);
        let geo = m.reference("geo");
        let missing = m.member(geo, "circle");
        m.export_default(missing);
    });
    let (result, sink) = run(&module, &json!(1));
    assert_eq!(result, Ok(false));
    assert_eq!(sink.messages(), vec!["property 'circle' not found"]);
}

#[test]
fn modules_chain() {
    let (loader, _lib) = loader_with_library();
    let middle = compile_in(&loader, |m| {
        m.import("./geometry", &[("point", "point")]);
        let point = m.reference("point");
        let item = m.item(point, Cardinality::exactly(2));
        let segment = m.array([item], Cardinality::ONE);
        m.export_const("segment", segment);
    });
    let mut loader = loader;
    loader.register_module("./shapes", &middle);

    let module = compile_in(&loader, |m| {
        m.import("./shapes", &[("segment", "segment")]);
        let segment = m.reference("segment");
        m.export_default(segment);
    });
    assert!(check(&module, &json!([{"x": 0, "y": 0}, {"x": 3, "y": 4}])));
    assert!(!check(&module, &json!([{"x": 0, "y": 0}])));

    let mut sink = DiagnosticSink::new();
    assert_eq!(
        middle.test_export(&json!([{"x": 1, "y": 1}, {"x": 1, "y": 1}]), "segment", &mut sink),
        Ok(true)
    );
}
