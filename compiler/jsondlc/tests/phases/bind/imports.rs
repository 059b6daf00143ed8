//! Import resolution during binding.

use std::rc::Rc;

use jsondlc::{
    bind_module, BindOptions, DiagnosticSink, ErrorCode, Exports, MemoryLoader, NativePattern,
};
use pretty_assertions::assert_eq;

use crate::common::{bind, bind_in, build, builtins, compile_ok};

#[test]
fn unresolvable_specifier_is_one_error() {
    let (module, sink) = bind(|m| {
        m.import("./shapes", &[("point", "point"), ("*", "shapes")]);
        let point = m.reference("point");
        m.export_default(point);
    });
    assert_eq!(sink.messages(), vec!["cannot find module './shapes'"]);
    assert_eq!(sink.iter().next().and_then(|d| d.code), Some(ErrorCode::E1006));
    for local in ["point", "shapes"] {
        assert!(module.scopes().local(module.module_scope(), local).is_none());
    }
}

#[test]
fn relative_specifiers_use_base_dir() {
    let mut loader = MemoryLoader::new();
    let lib = compile_ok(|m| {
        let string = m.reference("string");
        m.export_const("id", string);
    });
    loader.register_module("schemas/common/ids", &lib);

    let parsed = build(|m| {
        m.import("../common/ids", &[("id", "id")]);
        let id = m.reference("id");
        m.export_default(id);
    });
    let mut sink = DiagnosticSink::new();
    let options = BindOptions::new().with_base_dir("schemas/api");
    let _ = bind_module(parsed, &loader, &builtins(), &options, &mut sink);
    assert!(sink.is_empty(), "{:?}", sink.messages());
}

#[test]
fn native_export_tables() {
    let mut loader = MemoryLoader::new();
    loader.register(
        "std/text",
        Rc::new(Exports::from_natives([NativePattern::new("nonEmpty", |_, v, _| {
            Ok(v.as_str().is_some_and(|s| !s.is_empty()))
        })])),
    );
    let (module, sink) = bind_in(&loader, |m| {
        m.import("std/text", &[("*", "text")]);
        let text = m.reference("text");
        let non_empty = m.member(text, "nonEmpty");
        m.export_default(non_empty);
    });
    assert!(sink.is_empty());
    assert!(crate::common::check(&module, &serde_json::json!("x")));
    assert!(!crate::common::check(&module, &serde_json::json!("")));
}
