use serde_json::{Map, Value};
use std::rc::Rc;

use super::common::{Produced, integer, selected, selected_or_empty, single, string_operand};
use crate::engine::runtime::ErrorKind;
use crate::engine::scope::Scope;
use crate::model::{Document, NodeArray, NodeList, NodeRef};

pub(super) fn literal(scope: &Rc<Scope>) -> Produced {
    match scope.instruction_value().and_then(|instruction| instruction.get("value")) {
        Some(value) => Ok(Some(NodeList::of_value(value.clone()))),
        None => Err(scope.error(ErrorKind::TransformationMissingRequiredAttribute, "literal has no 'value'")),
    }
}

pub(super) fn array(scope: &Rc<Scope>) -> Produced {
    let values = selected_or_empty(scope)?.to_values().map_err(|e| scope.error(e.kind, e.message))?;
    Ok(Some(NodeList::of_value(Value::Array(values))))
}

pub(super) fn object(scope: &Rc<Scope>) -> Produced {
    let selected = selected_or_empty(scope)?;
    if selected.len() % 2 != 0 {
        return Err(scope.error(
            ErrorKind::ResultNodesNotEvenNumber,
            format!("object needs key/value pairs, got {} nodes", selected.len()),
        ));
    }
    let mut map = Map::new();
    for pair in selected.as_slice().chunks_exact(2) {
        let key = string_operand(scope, &pair[0], "object key")?;
        let value = pair[1].to_value().map_err(|e| scope.error(e.kind, e.message))?;
        map.insert(key.to_owned(), value);
    }
    Ok(Some(NodeList::of_value(Value::Object(map))))
}

pub(super) fn node_array(scope: &Rc<Scope>) -> Produced {
    Ok(Some(NodeList::single(NodeArray::from(selected_or_empty(scope)?))))
}

/// Inclusive integer range from `select` to `end`, descending when the
/// start is the larger bound.
pub(super) fn range(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let end = scope.require_attribute("end")?;
    let start = integer(scope, single(scope, &selected, "range start")?, "range start")?;
    let end = integer(scope, single(scope, &end, "range end")?, "range end")?;

    let limit = scope.limits().max_loop_iterations;
    if start.abs_diff(end) >= limit as u64 {
        return Err(scope.error(
            ErrorKind::TransformationInvalid,
            format!("range of {start}..{end} exceeds {limit} items"),
        ));
    }
    let values: Box<dyn Iterator<Item = i64>> =
        if start <= end { Box::new(start..=end) } else { Box::new((end..=start).rev()) };
    Ok(Some(values.map(|i| NodeList::of_value(Value::from(i))).collect()))
}

/// Combine the i-th element of every non-empty array, cycling shorter
/// arrays, into one node array of new documents.
pub(super) fn zip(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let mut arrays: Vec<&Vec<Value>> = Vec::new();
    for entry in &selected {
        match entry.json()? {
            Some(Value::Array(items)) if items.is_empty() => {}
            Some(Value::Array(items)) => arrays.push(items),
            _ => {
                return Err(scope.error(
                    ErrorKind::ResultNodeUnexpectedType,
                    format!("zip operands must be arrays, got {}", entry.value_type()?),
                ));
            }
        }
    }
    let extent = arrays.iter().map(|items| items.len()).max().unwrap_or(0);
    let rows = (0..extent).map(|i| {
        let row = arrays.iter().map(|items| items[i % items.len()].clone()).collect();
        NodeRef::from(Document::new(Value::Array(row)))
    });
    Ok(Some(NodeList::single(NodeArray::new(rows))))
}
