use runm_core::RunmError;
use runm_sweep::{node_from_value, sweeps_from_values, SweepNode};
use serde_json::Value;

fn parse(text: &str) -> Result<SweepNode, RunmError> {
    let value: Value = serde_json::from_str(text).expect("json");
    node_from_value(&value)
}

fn job_names(node: &SweepNode) -> Vec<String> {
    node.enumerate().map(|a| a.job_name()).collect()
}

#[test]
fn sequence_keeps_written_precision() {
    let node = parse(r#"{"type": "sequence", "parameter": "x", "from": 0, "to": 1, "by": 0.50}"#)
        .expect("sequence");
    assert_eq!(job_names(&node), ["x=0.00", "x=0.50", "x=1.00"]);
}

#[test]
fn sequence_accepts_string_bounds() {
    let node = parse(r#"{"type": "sequence", "parameter": "x", "from": "1", "to": "3", "by": "1"}"#)
        .expect("sequence");
    assert_eq!(job_names(&node), ["x=1", "x=2", "x=3"]);
}

#[test]
fn list_values_render_scalars() {
    let node = parse(r#"{"type": "list", "parameter": "v", "values": ["a", 2, 0.25, true]}"#)
        .expect("list");
    assert_eq!(job_names(&node), ["v=a", "v=2", "v=0.25", "v=true"]);
}

#[test]
fn composites_nest() {
    let node = parse(
        r#"{
            "type": "combination",
            "sweeps": [
                {"type": "list", "parameter": "a", "values": ["1", "2"]},
                {"type": "parallel", "sweeps": [
                    {"type": "list", "parameter": "b", "values": ["x"]},
                    {"type": "list", "parameter": "c", "values": ["y", "z"]}
                ]}
            ]
        }"#,
    )
    .expect("combination");
    assert_eq!(
        job_names(&node),
        ["a=1-b=x-c=y", "a=1-b=x-c=z", "a=2-b=x-c=y", "a=2-b=x-c=z"]
    );
}

#[test]
fn top_level_sweeps_form_a_combination() {
    let values: Vec<Value> = serde_json::from_str(
        r#"[
            {"type": "list", "parameter": "a", "values": ["1", "2"]},
            {"type": "list", "parameter": "b", "values": ["3"]}
        ]"#,
    )
    .expect("json");
    let node = sweeps_from_values(&values).expect("sweeps");
    assert!(matches!(node, SweepNode::Combination { ref children } if children.len() == 2));
    assert_eq!(job_names(&node), ["a=1-b=3", "a=2-b=3"]);
}

#[test]
fn unknown_type_is_rejected() {
    let err = parse(r#"{"type": "random", "parameter": "x"}"#).expect_err("unknown");
    match err {
        RunmError::Config(info) => {
            assert_eq!(info.code, "sweep_type");
            assert_eq!(info.context.get("type").map(String::as_str), Some("random"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_fields_are_rejected() {
    assert!(matches!(
        parse(r#"{"type": "sequence", "parameter": "x", "from": 0, "to": 1}"#),
        Err(RunmError::Config(_))
    ));
    assert!(matches!(
        parse(r#"{"type": "list", "values": ["a"]}"#),
        Err(RunmError::Config(_))
    ));
    assert!(matches!(parse(r#"{"type": "parallel"}"#), Err(RunmError::Config(_))));
    assert!(matches!(parse(r#"{"parameter": "x"}"#), Err(RunmError::Config(_))));
    assert!(matches!(parse(r#"["not", "an", "object"]"#), Err(RunmError::Config(_))));
}

#[test]
fn nested_list_values_are_rejected() {
    let err = parse(r#"{"type": "list", "parameter": "v", "values": [[1, 2]]}"#).expect_err("nested");
    assert_eq!(err.info().context.get("parameter").map(String::as_str), Some("v"));
}

#[test]
fn nonterminating_sequence_is_rejected_while_parsing() {
    let err = parse(r#"{"type": "sequence", "parameter": "x", "from": 0, "to": 5, "by": -1}"#)
        .expect_err("nonterminating");
    assert_eq!(err.info().code, "sequence_nonterminating");
}
