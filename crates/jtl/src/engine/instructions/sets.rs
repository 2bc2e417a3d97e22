//! Set operations over node lists.
//!
//! Membership is decided pairwise, so every operation is quadratic. Without a
//! `test` two entries are the same member when they are the same node; a
//! `test` production is evaluated with the pair bundled as the context.

use std::rc::Rc;

use super::common::{Produced, selected, single_boolean};
use crate::engine::runtime::Error;
use crate::engine::scope::Scope;
use crate::model::{NodeArray, NodeList, NodeRef};

struct Membership<'a> {
    scope: &'a Rc<Scope>,
    custom: bool,
}

impl<'a> Membership<'a> {
    fn new(scope: &'a Rc<Scope>) -> Self {
        Self { scope, custom: scope.has_attribute("test") }
    }

    fn same(&self, a: &NodeRef, b: &NodeRef) -> Result<bool, Error> {
        if !self.custom {
            return Ok(a.same_node(b));
        }
        let pair = NodeArray::new([a.clone(), b.clone()]);
        let inner = self.scope.subscope().with_current(pair).build()?;
        let result = inner.require_attribute("test")?;
        single_boolean(&inner, &result, "set test")
    }

    fn contains(&self, haystack: &[NodeRef], needle: &NodeRef) -> Result<bool, Error> {
        for entry in haystack {
            if self.same(needle, entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append `entries` to `out`, skipping those already present.
    fn extend_distinct(&self, out: &mut Vec<NodeRef>, entries: impl IntoIterator<Item = NodeRef>) -> Result<(), Error> {
        for entry in entries {
            if !self.contains(out, &entry)? {
                out.push(entry);
            }
        }
        Ok(())
    }
}

pub(super) fn union(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let compare = scope.evaluate_nodelist_by_attribute("compare")?.unwrap_or_default();
    let membership = Membership::new(scope);
    let mut out = Vec::new();
    membership.extend_distinct(&mut out, selected)?;
    membership.extend_distinct(&mut out, compare)?;
    Ok(Some(NodeList::from(out)))
}

pub(super) fn intersection(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let compare = scope.require_attribute("compare")?;
    let membership = Membership::new(scope);
    let mut out = Vec::new();
    for entry in selected {
        if membership.contains(compare.as_slice(), &entry)? && !membership.contains(&out, &entry)? {
            out.push(entry);
        }
    }
    Ok(Some(NodeList::from(out)))
}

pub(super) fn symmetric_difference(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let compare = scope.require_attribute("compare")?;
    let membership = Membership::new(scope);
    let mut out = Vec::new();
    for (side, other) in [(&selected, &compare), (&compare, &selected)] {
        for entry in side {
            if !membership.contains(other.as_slice(), entry)? && !membership.contains(&out, entry)? {
                out.push(entry.clone());
            }
        }
    }
    Ok(Some(NodeList::from(out)))
}

pub(super) fn unique(scope: &Rc<Scope>) -> Produced {
    let selected = selected(scope)?;
    let membership = Membership::new(scope);
    let mut out = Vec::new();
    membership.extend_distinct(&mut out, selected)?;
    Ok(Some(NodeList::from(out)))
}
