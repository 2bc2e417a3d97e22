use serde_json::Value;
use std::rc::Rc;

use super::common::{Produced, integer, selected, single};
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::model::{NodeArray, NodeList, NodeRef};

pub(super) fn current(scope: &Rc<Scope>) -> Produced {
    Ok(Some(scope.current_list()))
}

pub(super) fn first(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    Ok(Some(selected.first().cloned().into_iter().collect()))
}

pub(super) fn last(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    Ok(Some(selected.last().cloned().into_iter().collect()))
}

/// Scope over the same instruction whose context is the selection bundled
/// as a node array, for index attributes.
fn over_selection(scope: &Rc<Scope>, selected: &NodeList) -> Result<Rc<Scope>, Error> {
    scope.subscope().with_current(NodeArray::from(selected.clone())).build()
}

/// Normalise an index against `len`, negative counting from the end.
fn normalise(index: i64, len: usize) -> i64 {
    if index < 0 { index + len as i64 } else { index }
}

pub(super) fn nth(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let which = over_selection(scope, &selected)?.require_attribute("which")?;
    let mut results = NodeList::new();
    for entry in &which {
        let index = normalise(integer(scope, entry, "nth index")?, selected.len());
        if let Some(item) = usize::try_from(index).ok().and_then(|i| selected.get(i)) {
            results.push(item.clone());
        }
    }
    Ok(Some(results))
}

pub(super) fn slice(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let inner = over_selection(scope, &selected)?;
    let bound = |attribute: &str, default: i64| -> Result<i64, Error> {
        match inner.evaluate_nodelist_by_attribute(attribute)? {
            None => Ok(default),
            Some(list) => match list.exactly_one() {
                Some(entry) => integer(scope, entry, attribute),
                None => Err(scope.error(
                    ErrorKind::ResultNodesUnexpectedNumber,
                    format!("'{attribute}' must be exactly one index, got {}", list.len()),
                )),
            },
        }
    };
    let from = bound("from", 0)?;
    let to = bound("to", -1)?;

    if selected.is_empty() {
        return Ok(Some(NodeList::new()));
    }
    let max = selected.len() as i64 - 1;
    let from = normalise(from, selected.len()).clamp(0, max) as usize;
    let to = normalise(to, selected.len()).clamp(0, max) as usize;
    let items = selected.as_slice();
    Ok(Some(if from <= to {
        items[from..=to].iter().cloned().collect()
    } else {
        items[to..=from].iter().rev().cloned().collect()
    }))
}

pub(super) fn children(scope: &Rc<Scope>) -> Produced {
    let mut results = NodeList::new();
    for entry in selected(scope)? {
        match entry {
            NodeRef::Node(node) => results.extend(node.children()?.into_iter().map(NodeRef::from)),
            NodeRef::Array(array) => results.extend(array.iter().cloned()),
            NodeRef::Scope(_) => {}
        }
    }
    Ok(Some(results))
}

pub(super) fn parent(scope: &Rc<Scope>) -> Produced {
    Ok(Some(
        selected(scope)?
            .iter()
            .filter_map(|entry| entry.as_node().and_then(|node| node.parent()).map(NodeRef::from))
            .collect(),
    ))
}

pub(super) fn child(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let mut which = None;
    for attribute in ["name", "index", "which"] {
        if let Some(list) = scope.evaluate_nodelist_by_attribute(attribute)? {
            which = Some(list);
            break;
        }
    }
    let Some(which) = which else {
        return Err(scope.error(
            ErrorKind::TransformationMissingRequiredAttribute,
            "child needs one of 'name', 'index' or 'which'",
        ));
    };
    let Some(key) = which.exactly_one() else {
        return Err(scope.error(
            ErrorKind::ResultNodesUnexpectedNumber,
            format!("child selector must be exactly one node, got {}", which.len()),
        ));
    };
    let key = key.json()?.cloned().unwrap_or(Value::Null);

    let mut results = NodeList::new();
    for entry in &selected {
        match entry {
            NodeRef::Node(node) => {
                if let Some(found) = node.child(&key)? {
                    results.push(found);
                }
            }
            NodeRef::Array(array) => {
                if let Some(found) = array.child(&key) {
                    results.push(found.clone());
                }
            }
            NodeRef::Scope(_) => {}
        }
    }
    Ok(Some(results))
}

pub(super) fn name(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    Ok(Some(
        selected
            .iter()
            .filter_map(|entry| entry.as_node().and_then(|node| node.name()))
            .map(|name| NodeList::of_value(Value::String(name.to_owned())))
            .collect(),
    ))
}

pub(super) fn index(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    Ok(Some(
        selected
            .iter()
            .filter_map(|entry| entry.as_node().and_then(|node| node.index()))
            .map(|index| NodeList::of_value(Value::from(index)))
            .collect(),
    ))
}

pub(super) fn type_of(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let entry = single(scope, &selected, "type selection")?;
    Ok(Some(NodeList::of_value(Value::String(entry.value_type()?.as_str().to_owned()))))
}

pub(super) fn count(scope: &Rc<Scope>) -> Produced {
    Ok(Some(NodeList::of_value(Value::from(selected(scope)?.len()))))
}

pub(super) fn reverse(scope: &Rc<Scope>) -> Produced {
    Ok(Some(selected(scope)?.into_iter().rev().collect()))
}
