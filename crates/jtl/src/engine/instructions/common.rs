use serde_json::{Number, Value};
use std::rc::Rc;

use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::model::{NodeList, NodeRef, integral, values_equal};

pub(super) type Produced = Result<Option<NodeList>, Error>;

/// `select`, defaulting to the context node.
pub(super) fn selected(scope: &Rc<Scope>) -> Result<NodeList, Error> {
    Ok(scope.evaluate_nodelist_by_attribute("select")?.unwrap_or_else(|| scope.current_list()))
}

/// `select`, defaulting to nothing.
pub(super) fn selected_or_empty(scope: &Rc<Scope>) -> Result<NodeList, Error> {
    Ok(scope.evaluate_nodelist_by_attribute("select")?.unwrap_or_default())
}

/// Fail early when an attribute that is only evaluated per item is absent.
pub(super) fn ensure_attribute(scope: &Rc<Scope>, attribute: &str) -> Result<(), Error> {
    if scope.has_attribute(attribute) {
        Ok(())
    } else {
        Err(scope.error(
            ErrorKind::TransformationMissingRequiredAttribute,
            format!("missing required attribute '{attribute}'"),
        ))
    }
}

pub(super) fn single<'a>(scope: &Scope, list: &'a NodeList, what: &str) -> Result<&'a NodeRef, Error> {
    list.exactly_one().ok_or_else(|| {
        scope.error(
            ErrorKind::ResultNodesMultipleNodes,
            format!("{what} must be exactly one node, got {}", list.len()),
        )
    })
}

pub(super) fn boolean(scope: &Scope, entry: &NodeRef, what: &str) -> Result<bool, Error> {
    match entry.json()? {
        Some(Value::Bool(b)) => Ok(*b),
        _ => Err(scope.error(
            ErrorKind::ResultNodeNotBoolean,
            format!("{what} must be a boolean, got {}", entry.value_type()?),
        )),
    }
}

/// The single boolean a test production evaluates to.
pub(super) fn single_boolean(scope: &Scope, list: &NodeList, what: &str) -> Result<bool, Error> {
    boolean(scope, single(scope, list, what)?, what)
}

pub(super) fn number<'a>(scope: &Scope, entry: &'a NodeRef, what: &str) -> Result<&'a Number, Error> {
    match entry.json()? {
        Some(Value::Number(n)) => Ok(n),
        _ => Err(scope.error(
            ErrorKind::ResultNodeUnexpectedType,
            format!("{what} must be a number, got {}", entry.value_type()?),
        )),
    }
}

pub(super) fn integer(scope: &Scope, entry: &NodeRef, what: &str) -> Result<i64, Error> {
    let n = number(scope, entry, what)?;
    integral(n).ok_or_else(|| scope.error(ErrorKind::ResultNodeUnexpectedType, format!("{what} must be an integer, got {n}")))
}

pub(super) fn string<'a>(scope: &Scope, entry: &'a NodeRef, what: &str) -> Result<&'a str, Error> {
    match entry.json()? {
        Some(Value::String(s)) => Ok(s),
        _ => Err(scope.error(
            ErrorKind::ResultNodeNotString,
            format!("{what} must be a string, got {}", entry.value_type()?),
        )),
    }
}

/// A string operand whose kind is checked as a value type rather than as a
/// test result, as `object` keys and `length` inputs are.
pub(super) fn string_operand<'a>(scope: &Scope, entry: &'a NodeRef, what: &str) -> Result<&'a str, Error> {
    match entry.json()? {
        Some(Value::String(s)) => Ok(s),
        _ => Err(scope.error(
            ErrorKind::ResultNodeUnexpectedType,
            format!("{what} must be a string, got {}", entry.value_type()?),
        )),
    }
}

pub(super) fn bool_result(b: bool) -> Produced {
    Ok(Some(NodeList::of_value(Value::Bool(b))))
}

/// Structural equality of two entries: JSON values deeply, node arrays
/// member-wise, scopes by identity.
pub(super) fn deep_equal(a: &NodeRef, b: &NodeRef) -> Result<bool, Error> {
    Ok(match (a, b) {
        (NodeRef::Node(x), NodeRef::Node(y)) => match (x.value()?, y.value()?) {
            (Some(v), Some(w)) => values_equal(v, w),
            (None, None) => true,
            _ => false,
        },
        (NodeRef::Array(x), NodeRef::Array(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (m, n) in x.iter().zip(y.iter()) {
                if !deep_equal(m, n)? {
                    return Ok(false);
                }
            }
            true
        }
        (NodeRef::Scope(_), NodeRef::Scope(_)) => a.same_node(b),
        _ => false,
    })
}
