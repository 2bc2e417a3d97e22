use jtl::{Error, ErrorKind, Transformer};
use rstest::rstest;
use serde_json::{Value, json};

fn run(input: Value, instruction: Value) -> Result<Vec<Value>, Error> {
    let program = json!({
        "JTL": "transformation",
        "templates": [{
            "JTL": "template",
            "match": [{ "JTL": "literal", "value": true }],
            "produce": [instruction]
        }]
    });
    Transformer::new().transform_values(input, program)
}

fn lit(value: Value) -> Value {
    json!({ "JTL": "literal", "value": value })
}

fn lits(values: &[Value]) -> Value {
    Value::Array(values.iter().cloned().map(lit).collect())
}

fn kind(result: Result<Vec<Value>, Error>) -> ErrorKind {
    result.unwrap_err().kind()
}

#[rstest]
fn literal_values_are_raw_data() {
    // instruction-shaped data inside `value` is not evaluated
    let data = json!({ "JTL": "current" });
    assert_eq!(run(json!(1), lit(data.clone())).unwrap(), vec![data]);
    assert_eq!(kind(run(json!(1), json!({ "JTL": "literal" }))), ErrorKind::TransformationMissingRequiredAttribute);
}

#[rstest]
fn array_collapses_values() {
    assert_eq!(run(json!({}), json!({ "JTL": "array", "select": lits(&[json!(1), json!("a")]) })).unwrap(), vec![json!([1, "a"])]);
    assert_eq!(run(json!({}), json!({ "JTL": "array" })).unwrap(), vec![json!([])]);
}

#[rstest]
fn object_pairs_keys_and_values() {
    let out = run(json!({}), json!({ "JTL": "object", "select": lits(&[json!("k1"), json!("v1"), json!("k2"), json!([2])]) })).unwrap();
    assert_eq!(out, vec![json!({ "k1": "v1", "k2": [2] })]);
    assert_eq!(run(json!({}), json!({ "JTL": "object" })).unwrap(), vec![json!({})]);
}

#[rstest]
#[case(vec![json!("k1"), json!("v1"), json!("k2")], ErrorKind::ResultNodesNotEvenNumber)]
#[case(vec![json!(1), json!("v1")], ErrorKind::ResultNodeUnexpectedType)]
#[case(vec![json!("k1"), json!(1), json!(null), json!(2)], ErrorKind::ResultNodeUnexpectedType)]
fn object_rejects_malformed_pairs(#[case] select: Vec<Value>, #[case] expected: ErrorKind) {
    assert_eq!(kind(run(json!({}), json!({ "JTL": "object", "select": lits(&select) }))), expected);
}

#[rstest]
fn node_array_is_a_single_opaque_entry() {
    let bundle = json!({ "JTL": "nodeArray", "select": lits(&[json!(1), json!(2)]) });
    assert_eq!(run(json!({}), bundle.clone()).unwrap(), vec![json!([1, 2])]);
    assert_eq!(run(json!({}), json!({ "JTL": "count", "select": [bundle.clone()] })).unwrap(), vec![json!(1)]);
    assert_eq!(run(json!({}), json!({ "JTL": "count", "select": [{ "JTL": "children", "select": [bundle] }] })).unwrap(), vec![json!(2)]);
}

#[rstest]
#[case(1, 5, vec![1, 2, 3, 4, 5])]
#[case(5, 1, vec![5, 4, 3, 2, 1])]
#[case(-1, 1, vec![-1, 0, 1])]
#[case(3, 3, vec![3])]
fn range_is_inclusive(#[case] start: i64, #[case] end: i64, #[case] expected: Vec<i64>) {
    let out = run(json!({}), json!({ "JTL": "range", "select": [lit(json!(start))], "end": [lit(json!(end))] })).unwrap();
    assert_eq!(out, expected.into_iter().map(Value::from).collect::<Vec<_>>());
}

#[rstest]
#[case(json!(1.5), json!(3))]
#[case(json!(1), json!("3"))]
#[case(json!(null), json!(3))]
fn range_bounds_must_be_integers(#[case] start: Value, #[case] end: Value) {
    let result = run(json!({}), json!({ "JTL": "range", "select": [lit(start)], "end": [lit(end)] }));
    assert_eq!(kind(result), ErrorKind::ResultNodeUnexpectedType);
}

#[rstest]
fn range_requires_end() {
    assert_eq!(kind(run(json!(1), json!({ "JTL": "range" }))), ErrorKind::TransformationMissingRequiredAttribute);
}

#[rstest]
fn zip_cycles_shorter_arrays() {
    let out = run(
        json!({}),
        json!({ "JTL": "zip", "select": lits(&[json!([1, 2, 3]), json!(["a"]), json!([]), json!([true, false])]) }),
    )
    .unwrap();
    assert_eq!(out, vec![json!([[1, "a", true], [2, "a", false], [3, "a", true]])]);
}

#[rstest]
fn zip_of_nothing_is_an_empty_bundle() {
    assert_eq!(run(json!({}), json!({ "JTL": "zip", "select": [] })).unwrap(), vec![json!([])]);
    assert_eq!(kind(run(json!({}), json!({ "JTL": "zip", "select": lits(&[json!(1)]) }))), ErrorKind::ResultNodeUnexpectedType);
}

#[rstest]
#[case("add", json!(10), vec![json!(11), json!(12), json!(13)])]
#[case("subtract", json!(1), vec![json!(0), json!(1), json!(2)])]
#[case("multiply", json!(2), vec![json!(2), json!(4), json!(6)])]
#[case("divide", json!(2), vec![json!(0.5), json!(1), json!(1.5)])]
#[case("modulo", json!(2), vec![json!(1), json!(0), json!(1)])]
#[case("power", json!(2), vec![json!(1), json!(4), json!(9)])]
fn arithmetic_applies_per_item(#[case] op: &str, #[case] operand: Value, #[case] expected: Vec<Value>) {
    let out = run(json!([1, 2, 3]), json!({ "JTL": op, "select": [{ "JTL": "children" }], "compare": [lit(operand)] })).unwrap();
    assert_eq!(out, expected);
}

#[rstest]
fn arithmetic_type_errors() {
    let text = run(json!({}), json!({ "JTL": "add", "select": [lit(json!("x"))], "compare": [lit(json!(1))] }));
    assert_eq!(kind(text), ErrorKind::ResultNodeUnexpectedType);

    let by_zero = run(json!(1), json!({ "JTL": "divide", "compare": [lit(json!(0))] }));
    assert_eq!(kind(by_zero), ErrorKind::ResultNodeUnexpectedType);

    let two = run(json!(1), json!({ "JTL": "add", "compare": lits(&[json!(1), json!(2)]) }));
    assert_eq!(kind(two), ErrorKind::ResultNodesMultipleNodes);

    let missing = run(json!(1), json!({ "JTL": "add" }));
    assert_eq!(kind(missing), ErrorKind::TransformationMissingRequiredAttribute);
}

#[rstest]
#[case(lits(&[json!("a"), json!("b"), json!("c")]), Some(lits(&[json!("-"), json!("+")])), "a-b+c")]
#[case(lits(&[json!("a"), json!("b"), json!("c")]), None, "abc")]
#[case(lits(&[json!(1), json!(2.5)]), Some(lits(&[json!(", ")])), "1, 2.5")]
#[case(lits(&[json!("solo")]), Some(lits(&[json!("-")])), "solo")]
#[case(json!([]), None, "")]
fn join_cycles_delimiters(#[case] select: Value, #[case] delimiter: Option<Value>, #[case] expected: &str) {
    let mut instruction = json!({ "JTL": "join", "select": select });
    if let Some(delimiter) = delimiter {
        instruction["delimiter"] = delimiter;
    }
    assert_eq!(run(json!({}), instruction).unwrap(), vec![json!(expected)]);
}

#[rstest]
fn join_rejects_non_scalars() {
    let result = run(json!({}), json!({ "JTL": "join", "select": lits(&[json!("a"), json!(true)]) }));
    assert_eq!(kind(result), ErrorKind::ResultNodeUnexpectedType);

    let no_delimiters = run(json!({}), json!({ "JTL": "join", "select": lits(&[json!("a")]), "delimiter": [] }));
    assert_eq!(kind(no_delimiters), ErrorKind::ResultNodesUnexpectedNumber);
}

#[rstest]
fn length_counts_characters() {
    let out = run(json!(["héllo", ""]), json!({ "JTL": "length", "select": [{ "JTL": "children" }] })).unwrap();
    assert_eq!(out, vec![json!(5), json!(0)]);
}

#[rstest]
#[case(json!(5))]
#[case(json!(true))]
#[case(json!(["a"]))]
fn length_rejects_non_strings(#[case] input: Value) {
    assert_eq!(kind(run(input, json!({ "JTL": "length" }))), ErrorKind::ResultNodeUnexpectedType);
}
