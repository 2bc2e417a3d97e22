use serde_json::Value;
use std::rc::Rc;

use super::common::{Produced, selected, string_operand};
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::model::{NodeList, NodeRef};

/// Text of a string or number entry.
fn scalar_text(scope: &Scope, entry: &NodeRef, what: &str) -> Result<String, Error> {
    match entry.json()? {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(scope.error(
            ErrorKind::ResultNodeUnexpectedType,
            format!("{what} must be a string or number, got {}", entry.value_type()?),
        )),
    }
}

/// Concatenate the selection, the i-th gap taking the i-th delimiter modulo
/// the number of delimiters.
pub(super) fn join(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let delimiters = match scope.evaluate_nodelist_by_attribute("delimiter")? {
        Some(list) => list.iter().map(|entry| scalar_text(scope, entry, "delimiter")).collect::<Result<Vec<_>, _>>()?,
        None => vec![String::new()],
    };
    if delimiters.is_empty() {
        return Err(scope.error(ErrorKind::ResultNodesUnexpectedNumber, "join needs at least one delimiter"));
    }

    let mut out = String::new();
    for (i, entry) in selected.iter().enumerate() {
        if i > 0 {
            out.push_str(&delimiters[(i - 1) % delimiters.len()]);
        }
        out.push_str(&scalar_text(scope, entry, "joined value")?);
    }
    Ok(Some(NodeList::of_value(Value::String(out))))
}

/// Character count of each selected string.
pub(super) fn length(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let mut results = NodeList::new();
    for entry in &selected {
        let text = string_operand(scope, entry, "length operand")?;
        results.push_member(NodeList::of_value(Value::from(text.chars().count())));
    }
    Ok(Some(results))
}
