use serde_json::Value;
use std::rc::Rc;

use super::common::{Produced, bool_result, boolean, deep_equal, selected, single, single_boolean};
use crate::engine::runtime::Error;
use crate::engine::scope::Scope;
use crate::model::NodeList;

pub(super) fn eq(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let compare = scope.require_attribute("compare")?;
    if selected.len() != compare.len() {
        return bool_result(false);
    }
    for (a, b) in selected.iter().zip(compare.iter()) {
        if !deep_equal(a, b)? {
            return bool_result(false);
        }
    }
    bool_result(true)
}

pub(super) fn same_node(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let compare = scope.require_attribute("compare")?;
    let a = single(scope, &selected, "sameNode selection")?;
    let b = single(scope, &compare, "sameNode comparison")?;
    bool_result(a.same_node(b))
}

pub(super) fn not(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    bool_result(!single_boolean(scope, &selected, "not operand")?)
}

fn operands(scope: &Rc<Scope>) -> Result<(bool, bool), Error> {
    let selected = selected(scope)?;
    let compare = scope.require_attribute("compare")?;
    let a = single(scope, &selected, "left operand")?;
    let b = single(scope, &compare, "right operand")?;
    Ok((boolean(scope, a, "left operand")?, boolean(scope, b, "right operand")?))
}

pub(super) fn and(scope: &Rc<Scope>) -> Produced {
    let (a, b) = operands(scope)?;
    bool_result(a && b)
}

pub(super) fn or(scope: &Rc<Scope>) -> Produced {
    let (a, b) = operands(scope)?;
    bool_result(a || b)
}

pub(super) fn xor(scope: &Rc<Scope>) -> Produced {
    let (a, b) = operands(scope)?;
    bool_result(a != b)
}

pub(super) fn any(scope: &Rc<Scope>) -> Produced {
    let mut found = false;
    for entry in &selected(scope)? {
        found |= boolean(scope, entry, "any operand")?;
    }
    bool_result(found)
}

pub(super) fn all(scope: &Rc<Scope>) -> Produced {
    let mut every = true;
    for entry in &selected(scope)? {
        every &= boolean(scope, entry, "all operand")?;
    }
    bool_result(every)
}

pub(super) fn true_(_scope: &Rc<Scope>) -> Produced {
    bool_result(true)
}

pub(super) fn false_(_scope: &Rc<Scope>) -> Produced {
    bool_result(false)
}

pub(super) fn null(_scope: &Rc<Scope>) -> Produced {
    Ok(Some(NodeList::of_value(Value::Null)))
}
