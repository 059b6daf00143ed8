//! Logical combinators and transactional side effects.

use jsondlc::{Cardinality, ExprId, JsonValue, Module, ModuleBuilder};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

use crate::common::{check, check_export, compile_ok, run};

fn json_scalar() -> impl Strategy<Value = JsonValue> {
    prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::from),
        any::<i32>().prop_map(JsonValue::from),
        "[a-z]{0,8}".prop_map(JsonValue::from),
    ]
}

fn json_value() -> impl Strategy<Value = JsonValue> {
    json_scalar().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::from),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|map| JsonValue::Object(map.into_iter().collect())),
        ]
    })
}

/// Export `inner` as `expr` and `!expr` as the default.
fn with_negation(expr: impl Fn(&mut ModuleBuilder) -> ExprId) -> Module {
    compile_ok(|m| {
        let inner = expr(m);
        m.export_const("inner", inner);
        let negated = expr(m);
        let not = m.not(negated);
        m.export_default(not);
    })
}

proptest! {
    #[test]
    fn not_inverts_string(value in json_value()) {
        let module = with_negation(|m| m.reference("string"));
        prop_assert_eq!(check(&module, &value), !check_export(&module, "inner", &value));
    }

    #[test]
    fn not_inverts_object_shape(value in json_value()) {
        let module = with_negation(|m| {
            let any = m.reference("any");
            let prop = m.property("a", any, Cardinality::ONE);
            m.object([prop])
        });
        prop_assert_eq!(check(&module, &value), !check_export(&module, "inner", &value));
    }

    #[test]
    fn or_with_true_item_is_true_in_any_order(value in json_value(), first in any::<bool>()) {
        let module = compile_ok(|m| {
            let yes = m.reference("any");
            let no = m.not(yes);
            let yes = m.reference("any");
            let items = if first { [yes, no] } else { [no, yes] };
            let or = m.or(items);
            m.export_default(or);
        });
        prop_assert!(check(&module, &value));
    }
}

/// `const seen = set; export const probe = unique(seen)` plus a default
/// export built by `f` from a fresh `unique(seen)` call.
fn with_seen(f: impl FnOnce(&mut ModuleBuilder, ExprId)) -> Module {
    compile_ok(|m| {
        let set = m.set();
        m.const_decl("seen", set);
        let unique = m.reference("unique");
        let seen = m.reference("seen");
        let probe = m.call(unique, [seen]);
        m.export_const("probe", probe);

        let unique = m.reference("unique");
        let seen = m.reference("seen");
        let call = m.call(unique, [seen]);
        f(m, call);
    })
}

/// Whether `value` is still absent from the module's `seen` set.
fn still_unseen(module: &Module, value: &JsonValue) -> bool {
    let (ok, sink) = {
        let mut sink = jsondlc::DiagnosticSink::new();
        (module.test_export(value, "probe", &mut sink), sink)
    };
    ok == Ok(true) && !sink.has_errors()
}

#[test]
fn failed_alternative_leaves_no_set_mutation() {
    // (unique(seen) & 2) | number
    let module = with_seen(|m, call| {
        let two = m.literal(2);
        let first = m.and([call, two]);
        let number = m.reference("number");
        let or = m.or([first, number]);
        m.export_default(or);
    });
    assert!(check(&module, &json!(1)));
    assert!(still_unseen(&module, &json!(1)));
}

#[test]
fn committed_alternative_keeps_set_mutation() {
    let module = with_seen(|m, call| {
        let number = m.reference("number");
        let or = m.or([call, number]);
        m.export_default(or);
    });
    assert!(check(&module, &json!(5)));
    assert!(!still_unseen(&module, &json!(5)));
}

#[test]
fn negation_never_commits_set_mutation() {
    let module = with_seen(|m, call| {
        let not = m.not(call);
        m.export_default(not);
    });
    assert!(!check(&module, &json!("v")));
    assert!(still_unseen(&module, &json!("v")));
}

#[test]
fn outer_rollback_discards_inner_commit() {
    // ((unique(seen) | 0) & 2) | any
    let module = with_seen(|m, call| {
        let zero = m.literal(0);
        let inner = m.or([call, zero]);
        let two = m.literal(2);
        let outer = m.and([inner, two]);
        let any = m.reference("any");
        let or = m.or([outer, any]);
        m.export_default(or);
    });
    assert!(check(&module, &json!(9)));
    assert!(still_unseen(&module, &json!(9)));
}

#[test]
fn set_state_persists_across_calls() {
    let module = with_seen(|m, call| {
        m.export_default(call);
    });
    assert!(check(&module, &json!("a")));
    let (result, sink) = run(&module, &json!("a"));
    assert_eq!(result, Ok(false));
    assert_eq!(sink.messages(), vec!["duplicate value \"a\""]);
}

#[test]
fn unique_items_in_array() {
    // let s = set in [unique(s)*]
    let module = compile_ok(|m| {
        let set = m.set();
        let unique = m.reference("unique");
        let s = m.reference("s");
        let call = m.call(unique, [s]);
        let item = m.item(call, Cardinality::ANY);
        let array = m.array([item], Cardinality::ONE);
        let let_in = m.let_in(&[("s", set)], array);
        m.export_default(let_in);
    });
    assert!(check(&module, &json!([1, 2, 3])));
    // the set belongs to the module, so values seen above are rejected now
    assert!(!check(&module, &json!([4, 1])));
}

#[test]
fn and_short_circuits() {
    // string & unique(): unique without a set reports when tested
    let module = compile_ok(|m| {
        let string = m.reference("string");
        let unique = m.reference("unique");
        let call = m.call(unique, []);
        let and = m.and([string, call]);
        m.export_default(and);
    });
    let (result, sink) = run(&module, &json!(5));
    assert_eq!(result, Ok(false));
    assert!(sink.is_empty());

    let (result, sink) = run(&module, &json!("x"));
    assert_eq!(result, Ok(false));
    assert_eq!(sink.messages(), vec!["unique expects a set"]);
}
