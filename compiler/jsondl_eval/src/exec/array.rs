//! Array patterns.
//!
//! `[a, b*, c?]{min,max}` matches an array made of `min..=max` consecutive
//! repetitions of the item sequence. Items consume elements greedily; each
//! repetition runs in its own transaction. Arrays are closed: every element
//! must be consumed.

use std::rc::Rc;

use jsondl_ir::{Cardinality, ExprId, ExprKind, JsonValue};

use super::{test_expr, with_subject};
use crate::context::PathSegment;
use crate::module::ModuleBody;
use crate::{EvalResult, ExecutionContext};

pub(super) fn test_array(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    items: &[ExprId],
    cardinality: Cardinality,
    candidate: &JsonValue,
) -> EvalResult<bool> {
    let Some(elements) = candidate.as_array() else {
        return Ok(false);
    };

    with_subject(cx, module, candidate, |cx| {
        let mut index = 0;
        let mut repetitions = 0;
        while cardinality.has_room(repetitions) {
            let mut tx = cx.begin();
            let Some(next) = match_sequence(&mut tx, module, items, elements, index)? else {
                tracing::trace!(repetitions, index, "array repetition failed");
                break;
            };
            tx.commit();
            repetitions += 1;
            let advanced = next != index;
            index = next;
            if !advanced {
                break;
            }
        }

        let matched = cardinality.contains(repetitions) && index == elements.len();
        tracing::trace!(repetitions, index, matched, "array");
        if matched {
            cx.raise_array_match_limit(index);
        }
        Ok(matched)
    })
}

/// Match the item sequence once starting at `start`.
///
/// Returns the index after the last consumed element, or `None` if some
/// item fell short of its minimum.
fn match_sequence(
    cx: &mut ExecutionContext<'_>,
    module: &Rc<ModuleBody>,
    items: &[ExprId],
    elements: &[JsonValue],
    start: usize,
) -> EvalResult<Option<usize>> {
    let mut index = start;
    for &item in items {
        let (value, cardinality) = match module.arena.kind(item) {
            ExprKind::ArrayItem { value, cardinality } => (*value, *cardinality),
            _ => (item, Cardinality::ONE),
        };

        let mut count = 0;
        while cardinality.has_room(count) && index < elements.len() {
            let mut tx = cx.begin();
            let matched = tx.with_path(PathSegment::Index(index), |cx| {
                test_expr(cx, module, value, &elements[index])
            })?;
            if !matched {
                break;
            }
            tx.commit();
            count += 1;
            index += 1;
        }

        if !cardinality.contains(count) {
            return Ok(None);
        }
    }
    Ok(Some(index))
}
