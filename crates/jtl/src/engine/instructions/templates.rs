use serde_json::Value;
use std::rc::Rc;

use super::common::{Produced, selected, single, string};
use crate::engine::dispatch::DispatchOptions;
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::model::{NodeList, NodeRef};

pub(super) fn transformation(scope: &Rc<Scope>) -> Produced {
    scope.run_transformation().map(Some)
}

pub(super) fn template(scope: &Rc<Scope>) -> Produced {
    Ok(Some(NodeList::single(scope.enclose())))
}

/// Register the selected templates on the nearest enclosing scope that
/// evaluates a production.
pub(super) fn declare_templates(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let Some(holder) = scope
        .lexical_chain()
        .find(|ancestor| matches!(ancestor.instruction_value(), Some(Value::Array(_))))
    else {
        return Err(scope.error(ErrorKind::TransformationInvalid, "declareTemplates outside of a production"));
    };
    for entry in selected {
        match entry {
            NodeRef::Scope(template) => holder.declare_template(template),
            other => {
                return Err(scope.error(
                    ErrorKind::TransformationUnexpectedType,
                    format!("only templates can be declared, got {}", other.value_type()?),
                ));
            }
        }
    }
    tracing::debug!(depth = holder.depth(), count = holder.templates().len(), "templates declared");
    Ok(None)
}

fn symbol_name(scope: &Rc<Scope>) -> Result<String, Error> {
    let names = scope.require_attribute("name")?;
    let entry = single(scope, &names, "variable name")?;
    Ok(string(scope, entry, "variable name")?.to_owned())
}

/// Bind `select` under `name` in the enclosing scope, visible to the
/// following instructions of the same production.
pub(super) fn variable(scope: &Rc<Scope>) -> Produced {
    let name = symbol_name(scope)?;
    let value = selected(scope)?;
    let Some(parent) = scope.parent() else {
        return Err(scope.error(ErrorKind::ImplementationError, "variable declared in a scope without parent"));
    };
    parent.declare_symbol(&name, value)?;
    Ok(None)
}

pub(super) fn call_variable(scope: &Rc<Scope>) -> Produced {
    let name = symbol_name(scope)?;
    match scope.get_symbol(&name)? {
        Some(value) => Ok(Some(value)),
        None => Err(scope.error(ErrorKind::TransformationUnknownVariable, format!("unknown variable '{name}'"))),
    }
}

pub(super) fn apply_templates(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let options = match scope.evaluate_nodelist_by_attribute("name")? {
        Some(names) => {
            let entry = single(scope, &names, "template name")?;
            DispatchOptions { name: entry.json()?.cloned() }
        }
        None => DispatchOptions::default(),
    };

    let mut results = NodeList::new();
    for item in selected {
        let inner = scope.numbered_subscope().with_current(item).build()?;
        match inner.apply_templates(&options)? {
            Some(produced) => results.push_member(produced),
            None => {
                return Err(inner.error(ErrorKind::TransformationNoMatchingTemplate, "no template matched"));
            }
        }
    }
    Ok(Some(results))
}

pub(super) fn iteration(scope: &Rc<Scope>) -> Produced {
    Ok(Some(NodeList::of_value(Value::from(scope.iteration()))))
}
