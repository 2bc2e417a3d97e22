use jtl::{Error, ErrorKind, Limits, Transformer};
use rstest::rstest;
use serde_json::{Value, json};

fn program(instruction: Value) -> Value {
    json!({
        "JTL": "transformation",
        "templates": [{
            "JTL": "template",
            "match": [{ "JTL": "literal", "value": true }],
            "produce": [instruction]
        }]
    })
}

fn run(input: Value, instruction: Value) -> Result<Vec<Value>, Error> {
    Transformer::new().transform_values(input, program(instruction))
}

fn lit(value: Value) -> Value {
    json!({ "JTL": "literal", "value": value })
}

fn children() -> Value {
    json!({ "JTL": "children" })
}

fn is_type(name: &str) -> Value {
    json!({ "JTL": "eq", "select": [{ "JTL": "type" }], "compare": [lit(json!(name))] })
}

#[rstest]
fn for_each_maps_produce() {
    let out = run(
        json!([1, 2, 3]),
        json!({ "JTL": "forEach", "select": [children()], "produce": [{ "JTL": "add", "compare": [lit(json!(10))] }] }),
    )
    .unwrap();
    assert_eq!(out, vec![json!(11), json!(12), json!(13)]);
}

#[rstest]
fn for_each_numbers_its_iterations() {
    let out = run(json!(["a", "b", "c"]), json!({ "JTL": "forEach", "select": [children()], "produce": [{ "JTL": "iteration" }] }))
        .unwrap();
    assert_eq!(out, vec![json!(0), json!(1), json!(2)]);
}

#[rstest]
fn for_each_requires_produce() {
    let err = run(json!([1]), json!({ "JTL": "forEach", "select": [children()] })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransformationMissingRequiredAttribute);
}

#[rstest]
fn filter_keeps_matching_items() {
    let even = json!({ "JTL": "eq", "select": [{ "JTL": "modulo", "compare": [lit(json!(2))] }], "compare": [lit(json!(0))] });
    let kept = run(json!([1, 2, 3, 4]), json!({ "JTL": "filter", "select": [children()], "test": [even.clone()] })).unwrap();
    assert_eq!(kept, vec![json!(2), json!(4)]);

    let replaced = run(
        json!([1, 2, 3, 4]),
        json!({ "JTL": "filter", "select": [children()], "test": [even], "produce": [{ "JTL": "multiply", "compare": [lit(json!(10))] }] }),
    )
    .unwrap();
    assert_eq!(replaced, vec![json!(20), json!(40)]);
}

#[rstest]
fn filter_test_must_be_boolean() {
    let err = run(json!([1]), json!({ "JTL": "filter", "select": [children()], "test": [{ "JTL": "current" }] })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResultNodeNotBoolean);
}

#[rstest]
fn while_rewrites_the_worklist_head() {
    // flattens nested arrays depth-first
    let out = run(
        json!([[1, [2, 3]], 4]),
        json!({ "JTL": "while", "test": [is_type("array")], "produce": [children()] }),
    )
    .unwrap();
    assert_eq!(out, vec![json!(1), json!(2), json!(3), json!(4)]);
}

#[rstest]
fn while_is_bounded_by_the_loop_limit() {
    let transformer = Transformer::new().with_limits(Limits::default().with_max_loop_iterations(50));
    let endless = json!({ "JTL": "while", "test": [{ "JTL": "true" }], "produce": [{ "JTL": "current" }] });
    let err = transformer.transform_values(json!(1), program(endless)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransformationInvalid);
}

#[rstest]
#[case(true, vec![json!("yes")])]
#[case(false, vec![])]
fn if_produces_on_true(#[case] test: bool, #[case] expected: Vec<Value>) {
    let out = run(json!({}), json!({ "JTL": "if", "test": [lit(json!(test))], "produce": [lit(json!("yes"))] })).unwrap();
    assert_eq!(out, expected);
}

#[rstest]
fn if_without_produce_is_empty() {
    assert!(run(json!({}), json!({ "JTL": "if", "test": [{ "JTL": "true" }] })).unwrap().is_empty());
}

#[rstest]
fn if_test_is_required_and_single() {
    let missing = run(json!({}), json!({ "JTL": "if", "produce": [] })).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::TransformationMissingRequiredAttribute);

    let two = run(json!({}), json!({ "JTL": "if", "test": [{ "JTL": "true" }, { "JTL": "true" }] })).unwrap_err();
    assert_eq!(two.kind(), ErrorKind::ResultNodesMultipleNodes);
}

#[rstest]
fn choose_picks_the_first_matching_candidate() {
    let instruction = json!({
        "JTL": "choose",
        "select": [children()],
        "templates": [
            { "JTL": "template", "match": [is_type("number")], "produce": [lit(json!("num"))] },
            { "JTL": "template", "match": [is_type("string")], "produce": [lit(json!("str"))] },
            { "JTL": "template", "produce": [lit(json!("other"))] }
        ]
    });
    let out = run(json!([1, "a", null, 2]), instruction).unwrap();
    assert_eq!(out, vec![json!("num"), json!("str"), json!("other"), json!("num")]);
}

#[rstest]
fn choose_without_a_match_yields_nothing() {
    let instruction = json!({
        "JTL": "choose",
        "select": [children()],
        "templates": [{ "JTL": "template", "match": [{ "JTL": "false" }], "produce": [lit(json!("never"))] }]
    });
    assert!(run(json!([1, 2]), instruction).unwrap().is_empty());
}

#[rstest]
fn reduce_folds_left() {
    let sum = json!({
        "JTL": "add",
        "select": [{ "JTL": "child", "index": [lit(json!(0))] }],
        "compare": [{ "JTL": "child", "index": [lit(json!(1))] }]
    });
    let out = run(json!([1, 2, 3, 4]), json!({ "JTL": "reduce", "select": [children()], "produce": [sum] })).unwrap();
    assert_eq!(out, vec![json!(10)]);

    let join = json!({
        "JTL": "join",
        "select": [{ "JTL": "children" }],
        "delimiter": [lit(json!("/"))]
    });
    let out = run(json!(["a", "b", "c"]), json!({ "JTL": "reduce", "select": [children()], "produce": [join] })).unwrap();
    assert_eq!(out, vec![json!("a/b/c")]);
}

#[rstest]
fn reduce_needs_two_items() {
    let err = run(json!([1]), json!({ "JTL": "reduce", "select": [children()], "produce": [{ "JTL": "current" }] })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResultNodesUnexpectedNumber);
}

#[rstest]
fn reduce_step_must_yield_one_node() {
    let err = run(json!([1, 2]), json!({ "JTL": "reduce", "select": [children()], "produce": [{ "JTL": "children" }] })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResultNodesMultipleNodes);
}
