use std::collections::VecDeque;
use std::rc::Rc;

use super::common::{Produced, ensure_attribute, selected, single_boolean};
use crate::engine::dispatch::DispatchOptions;
use crate::engine::runtime::ErrorKind;
use crate::engine::scope::Scope;
use crate::model::{NodeArray, NodeList, NodeRef};

pub(super) fn for_each(scope: &Rc<Scope>) -> Produced {
    ensure_attribute(scope, "produce")?;
    let mut results = NodeList::new();
    for item in selected(scope)? {
        let inner = scope.numbered_subscope().with_current(item).build()?;
        results.push_member(inner.require_attribute("produce")?);
    }
    Ok(Some(results))
}

pub(super) fn filter(scope: &Rc<Scope>) -> Produced {
    ensure_attribute(scope, "test")?;
    let mut results = NodeList::new();
    for item in selected(scope)? {
        let inner = scope.numbered_subscope().with_current(item.clone()).build()?;
        let test = inner.require_attribute("test")?;
        if !single_boolean(&inner, &test, "filter test")? {
            continue;
        }
        match inner.evaluate_nodelist_by_attribute("produce")? {
            Some(produced) => results.push_member(produced),
            None => results.push(item),
        }
    }
    Ok(Some(results))
}

/// Worklist rewrite: the head is tested; when true it is replaced by what
/// `produce` yields, otherwise it is emitted.
pub(super) fn while_(scope: &Rc<Scope>) -> Produced {
    ensure_attribute(scope, "test")?;
    ensure_attribute(scope, "produce")?;
    let limit = scope.limits().max_loop_iterations;
    let mut worklist: VecDeque<NodeRef> = selected(scope)?.into_iter().collect();
    let mut results = NodeList::new();
    let mut steps = 0usize;
    while let Some(item) = worklist.pop_front() {
        steps += 1;
        if steps > limit {
            return Err(scope.error(
                ErrorKind::TransformationInvalid,
                format!("while exceeded {limit} iterations"),
            ));
        }
        let inner = scope.numbered_subscope().with_current(item.clone()).build()?;
        let test = inner.require_attribute("test")?;
        if single_boolean(&inner, &test, "while test")? {
            let produced = inner.require_attribute("produce")?;
            for entry in produced.into_vec().into_iter().rev() {
                worklist.push_front(entry);
            }
        } else {
            results.push(item);
        }
    }
    Ok(Some(results))
}

pub(super) fn if_(scope: &Rc<Scope>) -> Produced {
    let test = scope.require_attribute("test")?;
    if single_boolean(scope, &test, "if test")? {
        Ok(Some(scope.evaluate_nodelist_by_attribute("produce")?.unwrap_or_default()))
    } else {
        Ok(Some(NodeList::new()))
    }
}

pub(super) fn choose(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let mut candidates = Vec::new();
    for entry in scope.require_attribute("templates")? {
        match entry {
            NodeRef::Scope(template) => candidates.push(template),
            other => {
                return Err(scope.error(
                    ErrorKind::TransformationUnexpectedType,
                    format!("choose candidates must be templates, got {}", other.value_type()?),
                ));
            }
        }
    }

    let options = DispatchOptions::default();
    let mut results = NodeList::new();
    for item in selected {
        let inner = scope.numbered_subscope().with_current(item).build()?;
        for template in &candidates {
            if let Some(produced) = inner.apply_template(template, &options)? {
                results.push_member(produced);
                break;
            }
        }
    }
    Ok(Some(results))
}

/// Left fold: `produce` sees the accumulator and the next item bundled as a
/// two-element node array and must yield exactly one entry.
pub(super) fn reduce(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    if selected.len() < 2 {
        return Err(scope.error(
            ErrorKind::ResultNodesUnexpectedNumber,
            format!("reduce needs at least two items, got {}", selected.len()),
        ));
    }
    let mut items = selected.into_iter();
    let Some(mut accumulator) = items.next() else {
        return Ok(Some(NodeList::new()));
    };
    for next in items {
        let pair = NodeArray::new([accumulator, next]);
        let inner = scope.numbered_subscope().with_current(pair).build()?;
        let produced = inner.require_attribute("produce")?;
        let Some(only) = produced.exactly_one() else {
            return Err(inner.error(
                ErrorKind::ResultNodesMultipleNodes,
                format!("reduce step must yield exactly one node, got {}", produced.len()),
            ));
        };
        accumulator = only.clone();
    }
    Ok(Some(NodeList::single(accumulator)))
}
