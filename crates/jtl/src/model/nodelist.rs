use core::fmt;
use serde_json::Value;
use std::rc::Rc;

use super::{Document, Node, ValueType, wrap_index};
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;

/// Entry of a [`NodeList`].
///
/// A document is represented by its root node, so this is a closed sum of
/// the three opaque shapes a result can take.
#[derive(Clone)]
pub enum NodeRef {
    Node(Node),
    Array(NodeArray),
    Scope(Rc<Scope>),
}

impl NodeRef {
    pub fn value_type(&self) -> Result<ValueType, Error> {
        match self {
            NodeRef::Node(node) => node.value_type(),
            NodeRef::Array(_) => Ok(ValueType::NodeArray),
            NodeRef::Scope(_) => Ok(ValueType::Scope),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            NodeRef::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<&Rc<Scope>> {
        match self {
            NodeRef::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    /// JSON value of a node entry; bundles and scopes have none.
    pub fn json(&self) -> Result<Option<&Value>, Error> {
        match self {
            NodeRef::Node(node) => node.value(),
            _ => Ok(None),
        }
    }

    /// Owned JSON rendering. A node array renders as an array of its members.
    pub fn to_value(&self) -> Result<Value, Error> {
        match self {
            NodeRef::Node(node) => Ok(node.value()?.cloned().unwrap_or(Value::Null)),
            NodeRef::Array(array) => {
                array.iter().map(NodeRef::to_value).collect::<Result<Vec<_>, _>>().map(Value::Array)
            }
            NodeRef::Scope(_) => Err(Error::new(
                ErrorKind::ResultNodeUnexpectedType,
                "a template scope has no JSON value",
            )),
        }
    }

    /// Identity comparison: same document and path, or the same bundle or scope.
    pub fn same_node(&self, other: &NodeRef) -> bool {
        match (self, other) {
            (NodeRef::Node(a), NodeRef::Node(b)) => a.same_node(b),
            (NodeRef::Array(a), NodeRef::Array(b)) => a.ptr_eq(b),
            (NodeRef::Scope(a), NodeRef::Scope(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Short diagnostic tag: a JSON pointer for nodes.
    pub fn describe(&self) -> String {
        match self {
            NodeRef::Node(node) if node.is_root() => "/".to_owned(),
            NodeRef::Node(node) => node.pointer(),
            NodeRef::Array(array) => format!("<nodeArray of {}>", array.len()),
            NodeRef::Scope(_) => "<scope>".to_owned(),
        }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Node(node) => node.fmt(f),
            NodeRef::Array(array) => array.fmt(f),
            NodeRef::Scope(_) => f.write_str("Scope"),
        }
    }
}

impl From<Node> for NodeRef {
    fn from(node: Node) -> Self {
        NodeRef::Node(node)
    }
}

impl From<Document> for NodeRef {
    fn from(doc: Document) -> Self {
        NodeRef::Node(doc.root())
    }
}

impl From<NodeArray> for NodeRef {
    fn from(array: NodeArray) -> Self {
        NodeRef::Array(array)
    }
}

impl From<Rc<Scope>> for NodeRef {
    fn from(scope: Rc<Scope>) -> Self {
        NodeRef::Scope(scope)
    }
}

/// Immutable, non-flattening bundle of node references.
#[derive(Clone)]
pub struct NodeArray(Rc<[NodeRef]>);

impl NodeArray {
    pub fn new(members: impl IntoIterator<Item = NodeRef>) -> Self {
        NodeArray(members.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.0.iter()
    }

    pub fn at(&self, index: usize) -> Option<&NodeRef> {
        self.0.get(index)
    }

    /// Member at a JSON index; negative counts from the end. Non-integers and
    /// out-of-range indices yield `None`.
    pub fn child(&self, which: &Value) -> Option<&NodeRef> {
        match which {
            Value::Number(n) => wrap_index(n, self.0.len()).and_then(|i| self.0.get(i)),
            _ => None,
        }
    }

    pub fn members(&self) -> NodeList {
        self.0.iter().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &NodeArray) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl From<NodeList> for NodeArray {
    fn from(list: NodeList) -> Self {
        NodeArray::new(list.0)
    }
}

/// Construction input for [`NodeList`]: either a single opaque entry or a
/// list whose entries are spliced in place.
#[derive(Debug, Clone)]
pub enum Member {
    Single(NodeRef),
    Spread(NodeList),
}

impl From<NodeRef> for Member {
    fn from(entry: NodeRef) -> Self {
        Member::Single(entry)
    }
}

impl From<Node> for Member {
    fn from(node: Node) -> Self {
        Member::Single(node.into())
    }
}

impl From<Document> for Member {
    fn from(doc: Document) -> Self {
        Member::Single(doc.into())
    }
}

impl From<NodeArray> for Member {
    fn from(array: NodeArray) -> Self {
        Member::Single(array.into())
    }
}

impl From<Rc<Scope>> for Member {
    fn from(scope: Rc<Scope>) -> Self {
        Member::Single(scope.into())
    }
}

impl From<NodeList> for Member {
    fn from(list: NodeList) -> Self {
        Member::Spread(list)
    }
}

/// Ordered result sequence. Always flat: nested lists are spliced in on
/// construction while node arrays stay single entries.
#[derive(Clone, Default)]
pub struct NodeList(Vec<NodeRef>);

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members<M: Into<Member>>(members: impl IntoIterator<Item = M>) -> Self {
        let mut list = NodeList::new();
        for member in members {
            list.push_member(member);
        }
        list
    }

    pub fn single(entry: impl Into<NodeRef>) -> Self {
        NodeList(vec![entry.into()])
    }

    /// Wrap a fresh JSON value as a new document.
    pub fn of_value(value: Value) -> Self {
        NodeList::single(Document::new(value))
    }

    pub fn push(&mut self, entry: impl Into<NodeRef>) {
        self.0.push(entry.into());
    }

    pub fn push_member(&mut self, member: impl Into<Member>) {
        match member.into() {
            Member::Single(entry) => self.0.push(entry),
            Member::Spread(list) => self.0.extend(list.0),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&NodeRef> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&NodeRef> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&NodeRef> {
        self.0.last()
    }

    pub fn as_slice(&self) -> &[NodeRef] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<NodeRef> {
        self.0
    }

    /// The only entry, if there is exactly one.
    pub fn exactly_one(&self) -> Option<&NodeRef> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Owned JSON rendering of every entry.
    pub fn to_values(&self) -> Result<Vec<Value>, Error> {
        self.0.iter().map(NodeRef::to_value).collect()
    }
}

impl fmt::Debug for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl FromIterator<NodeRef> for NodeList {
    fn from_iter<I: IntoIterator<Item = NodeRef>>(iter: I) -> Self {
        NodeList(iter.into_iter().collect())
    }
}

impl FromIterator<NodeList> for NodeList {
    fn from_iter<I: IntoIterator<Item = NodeList>>(iter: I) -> Self {
        NodeList::from_members(iter)
    }
}

impl Extend<NodeRef> for NodeList {
    fn extend<I: IntoIterator<Item = NodeRef>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for NodeList {
    type Item = NodeRef;
    type IntoIter = std::vec::IntoIter<NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a NodeRef;
    type IntoIter = std::slice::Iter<'a, NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<NodeRef>> for NodeList {
    fn from(entries: Vec<NodeRef>) -> Self {
        NodeList(entries)
    }
}
