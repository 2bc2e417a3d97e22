use jtl::{Document, ErrorKind, NodeArray, NodeList, NodeRef, ValueType};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn doc() -> Document {
    Document::new(json!({ "foo": ["bar", "xyz"], "n": null }))
}

fn values(list: &NodeList) -> Vec<Value> {
    list.to_values().unwrap()
}

#[rstest]
fn document_is_a_node_with_empty_path(doc: Document) {
    let root = doc.root();
    assert!(root.is_root());
    assert!(root.parent().is_none());
    assert_eq!(root.value_type().unwrap(), ValueType::Object);
    assert_eq!(root.pointer(), "");
}

#[rstest]
fn children_enumerate_in_store_order(doc: Document) {
    let children = doc.root().children().unwrap();
    let names: Vec<_> = children.iter().map(|c| c.name().unwrap().to_owned()).collect();
    assert_eq!(names, ["foo", "n"]);

    let items = children[0].children().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].index(), Some(1));
    assert_eq!(items[1].name(), None);
    assert_eq!(items[1].value().unwrap(), Some(&json!("xyz")));
    assert!(items[1].children().unwrap().is_empty());
}

#[rstest]
fn parent_strips_last_segment(doc: Document) {
    let bar = doc.root().descend("foo").descend(0usize);
    let foo = bar.parent().unwrap();
    assert!(foo.same_node(&doc.root().descend("foo")));
    assert!(foo.parent().unwrap().same_node(&doc.root()));
}

#[rstest]
fn missing_paths_are_undefined(doc: Document) {
    let missing = doc.root().descend("nope");
    assert_eq!(missing.value().unwrap(), None);
    assert_eq!(missing.value_type().unwrap(), ValueType::Undefined);
    assert_eq!(doc.root().descend("n").value_type().unwrap(), ValueType::Null);
}

#[rstest]
fn stepping_through_a_scalar_is_an_implementation_error(doc: Document) {
    let err = doc.root().descend("foo").descend(0usize).descend("deeper").value().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ImplementationError);
}

#[rstest]
#[case(json!("foo"), Some(json!(["bar", "xyz"])))]
#[case(json!("nope"), None)]
#[case(json!(0), None)]
fn object_child_lookup(doc: Document, #[case] which: Value, #[case] expected: Option<Value>) {
    let found = doc.root().child(&which).unwrap();
    assert_eq!(found.map(|n| n.value().unwrap().cloned().unwrap()), expected);
}

#[rstest]
#[case(json!(0), Some(json!("bar")))]
#[case(json!(-1), Some(json!("xyz")))]
#[case(json!(2), None)]
#[case(json!("0"), None)]
fn array_child_lookup(doc: Document, #[case] which: Value, #[case] expected: Option<Value>) {
    let foo = doc.root().descend("foo");
    let found = foo.child(&which).unwrap();
    assert_eq!(found.map(|n| n.value().unwrap().cloned().unwrap()), expected);
}

#[rstest]
fn same_node_is_reflexive_and_symmetric(doc: Document) {
    let a = doc.root().descend("foo");
    let b = doc.root().descend("foo");
    assert!(a.same_node(&a));
    assert!(a.same_node(&b) && b.same_node(&a));
}

#[rstest]
fn same_node_distinguishes_documents_with_equal_content() {
    let one = Document::new(json!({ "a": 1 }));
    let two = Document::new(json!({ "a": 1 }));
    assert!(!one.root().descend("a").same_node(&two.root().descend("a")));
    assert!(!NodeRef::from(one).same_node(&NodeRef::from(two)));
}

#[rstest]
fn nodelist_flattens_nested_lists() {
    let a = NodeList::of_value(json!(1));
    let b = NodeList::from_members([NodeList::of_value(json!(2)), NodeList::of_value(json!(3))]);
    let combined = NodeList::from_members([a.clone(), b.clone(), NodeList::new()]);
    assert_eq!(combined.len(), a.len() + b.len());
    assert_eq!(values(&combined), vec![json!(1), json!(2), json!(3)]);
}

#[rstest]
fn nodelist_keeps_node_arrays_opaque() {
    let bundle = NodeArray::new(NodeList::from_members([NodeList::of_value(json!(1)), NodeList::of_value(json!(2))]));
    let mut list = NodeList::new();
    list.push_member(bundle.clone());
    list.push_member(NodeList::of_value(json!(3)));
    assert_eq!(list.len(), 2);
    assert_eq!(list.first().unwrap().value_type().unwrap(), ValueType::NodeArray);
    assert_eq!(values(&list), vec![json!([1, 2]), json!(3)]);
}

#[rstest]
#[case(json!(0), Some(json!("a")))]
#[case(json!(-1), Some(json!("c")))]
#[case(json!(-3), Some(json!("a")))]
#[case(json!(3), None)]
#[case(json!(0.5), None)]
#[case(json!("x"), None)]
fn node_array_child_wraps_negative_indices(#[case] which: Value, #[case] expected: Option<Value>) {
    let bundle = NodeArray::new(
        ["a", "b", "c"].into_iter().map(|s| NodeRef::from(Document::new(json!(s)))),
    );
    let found = bundle.child(&which).map(|entry| entry.to_value().unwrap());
    assert_eq!(found, expected);
}

#[rstest]
fn node_array_identity() {
    let bundle = NodeArray::new([NodeRef::from(Document::new(json!(1)))]);
    let copy = bundle.clone();
    let other = NodeArray::new([NodeRef::from(Document::new(json!(1)))]);
    assert!(NodeRef::from(bundle.clone()).same_node(&NodeRef::from(copy)));
    assert!(!NodeRef::from(bundle).same_node(&NodeRef::from(other)));
}
