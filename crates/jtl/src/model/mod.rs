//! Addressable value model.
//!
//! A [`Document`] owns a JSON value and anchors every [`Node`] built over it.
//! Nodes are cheap `(document, path)` references; their value is resolved on
//! demand. Identity is by document pointer plus path, never by content.

use compact_str::CompactString;
use core::fmt;
use serde_json::Value;
use smallvec::SmallVec;
use std::rc::Rc;

use crate::engine::runtime::{Error, ErrorKind};

pub mod nodelist;

pub use nodelist::{Member, NodeArray, NodeList, NodeRef};

/// One step of a node path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Index(usize),
    Key(CompactString),
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(CompactString::from(key))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            // RFC 6901 escaping
            PathSegment::Key(k) => f.write_str(&k.replace('~', "~0").replace('/', "~1")),
        }
    }
}

pub type Path = SmallVec<[PathSegment; 8]>;

/// Runtime type tag of a value or node reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    /// The path does not resolve to a value.
    Undefined,
    NodeArray,
    Scope,
}

impl ValueType {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => ValueType::Undefined,
            Some(Value::Null) => ValueType::Null,
            Some(Value::Bool(_)) => ValueType::Boolean,
            Some(Value::Number(_)) => ValueType::Number,
            Some(Value::String(_)) => ValueType::String,
            Some(Value::Array(_)) => ValueType::Array,
            Some(Value::Object(_)) => ValueType::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Undefined => "undefined",
            ValueType::NodeArray => "nodeArray",
            ValueType::Scope => "scope",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity-bearing root anchor wrapping a JSON value.
#[derive(Clone)]
pub struct Document(Rc<Value>);

impl Document {
    pub fn new(contents: Value) -> Self {
        Document(Rc::new(contents))
    }

    pub fn contents(&self) -> &Value {
        &self.0
    }

    /// The document viewed as a node with an empty path.
    pub fn root(&self) -> Node {
        Node { doc: self.clone(), path: Path::new() }
    }

    pub fn find_node(&self, path: impl IntoIterator<Item = PathSegment>) -> Node {
        Node { doc: self.clone(), path: path.into_iter().collect() }
    }

    /// Resolve `path` against the root value.
    ///
    /// A missing key or index yields `Ok(None)`. Stepping into a scalar is an
    /// `ImplementationError`: paths are only ever built from existing children.
    pub fn find_value(&self, path: &[PathSegment]) -> Result<Option<&Value>, Error> {
        let mut current: &Value = &self.0;
        for segment in path {
            let next = match (current, segment) {
                (Value::Array(items), PathSegment::Index(i)) => items.get(*i),
                (Value::Object(map), PathSegment::Key(k)) => map.get(k.as_str()),
                (Value::Array(_) | Value::Object(_), _) => None,
                (scalar, _) => {
                    return Err(Error::new(
                        ErrorKind::ImplementationError,
                        format!(
                            "cannot resolve segment '{segment}' through a {} value",
                            ValueType::of(Some(scalar))
                        ),
                    ));
                }
            };
            match next {
                Some(v) => current = v,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Document").field(&Rc::as_ptr(&self.0)).finish()
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Document::new(value)
    }
}

/// Path-addressed reference into a document's value tree.
#[derive(Clone)]
pub struct Node {
    doc: Document,
    path: Path,
}

impl Node {
    pub fn new(doc: Document, path: Path) -> Self {
        Node { doc, path }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn value(&self) -> Result<Option<&Value>, Error> {
        self.doc.find_value(&self.path)
    }

    pub fn value_type(&self) -> Result<ValueType, Error> {
        Ok(ValueType::of(self.value()?))
    }

    /// Node one segment further down. Does not check that the child exists.
    pub fn descend(&self, segment: impl Into<PathSegment>) -> Node {
        let mut path = self.path.clone();
        path.push(segment.into());
        Node { doc: self.doc.clone(), path }
    }

    pub fn parent(&self) -> Option<Node> {
        if self.path.is_empty() {
            return None;
        }
        let mut path = self.path.clone();
        path.pop();
        Some(Node { doc: self.doc.clone(), path })
    }

    /// Child nodes in store order; scalars have none.
    pub fn children(&self) -> Result<Vec<Node>, Error> {
        Ok(match self.value()? {
            Some(Value::Array(items)) => (0..items.len()).map(|i| self.descend(i)).collect(),
            Some(Value::Object(map)) => map.keys().map(|k| self.descend(k.as_str())).collect(),
            _ => Vec::new(),
        })
    }

    /// Single child by array index (negative counts from the end) or object key.
    pub fn child(&self, which: &Value) -> Result<Option<Node>, Error> {
        Ok(match (self.value()?, which) {
            (Some(Value::Array(items)), Value::Number(n)) => {
                wrap_index(n, items.len()).map(|i| self.descend(i))
            }
            (Some(Value::Object(map)), Value::String(key)) if map.contains_key(key) => {
                Some(self.descend(key.as_str()))
            }
            _ => None,
        })
    }

    /// Key under which this node sits in its parent object.
    pub fn name(&self) -> Option<&str> {
        match self.path.last() {
            Some(PathSegment::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }

    /// Position of this node in its parent array.
    pub fn index(&self) -> Option<usize> {
        match self.path.last() {
            Some(PathSegment::Index(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn same_node(&self, other: &Node) -> bool {
        self.doc.same_document(&other.doc) && self.path == other.path
    }

    /// JSON pointer of this node relative to its document.
    pub fn pointer(&self) -> String {
        self.path.iter().fold(String::new(), |mut acc, segment| {
            acc.push('/');
            acc.push_str(&segment.to_string());
            acc
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("doc", &self.doc).field("path", &self.pointer()).finish()
    }
}

impl From<Document> for Node {
    fn from(doc: Document) -> Self {
        doc.root()
    }
}

/// Normalise an array index: integral, negative values count from the end.
pub(crate) fn wrap_index(n: &serde_json::Number, len: usize) -> Option<usize> {
    let i = integral(n)?;
    let len = i64::try_from(len).ok()?;
    let i = if i < 0 { i + len } else { i };
    if (0..len).contains(&i) { usize::try_from(i).ok() } else { None }
}

/// Integer value of a JSON number, if it has no fractional part.
pub(crate) fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        #[allow(clippy::cast_possible_truncation)]
        Some(f as i64)
    } else {
        None
    }
}

/// Deep structural equality of two JSON values.
///
/// Numbers compare by numeric value, so `1` equals `1.0`. Objects compare
/// key-wise regardless of key order; arrays need equal length and pairwise
/// equal elements.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            #[allow(clippy::float_cmp)]
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => false,
    }
}
