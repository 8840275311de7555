use runm_sweep::{ParameterAssignment, SweepNode};

fn assignment(pairs: &[(&str, &str)]) -> ParameterAssignment {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn value_list_keeps_list_order() {
    let node = SweepNode::list("p", ["c", "a", "b"]);
    let values: Vec<_> = node
        .enumerate()
        .map(|a| a.get("p").expect("p").to_string())
        .collect();
    assert_eq!(values, ["c", "a", "b"]);
}

#[test]
fn combination_varies_last_child_fastest() {
    let node = SweepNode::combination(vec![
        SweepNode::list("p1", ["a", "b"]),
        SweepNode::list("p2", ["x", "y"]),
    ]);
    let got: Vec<_> = node.enumerate().collect();
    assert_eq!(
        got,
        vec![
            assignment(&[("p1", "a"), ("p2", "x")]),
            assignment(&[("p1", "a"), ("p2", "y")]),
            assignment(&[("p1", "b"), ("p2", "x")]),
            assignment(&[("p1", "b"), ("p2", "y")]),
        ]
    );
}

#[test]
fn parallel_repeats_last_value_of_short_child() {
    let node = SweepNode::parallel(vec![
        SweepNode::list("p1", ["1", "2", "3"]),
        SweepNode::list("p2", ["x", "y"]),
    ]);
    let got: Vec<_> = node.enumerate().collect();
    assert_eq!(
        got,
        vec![
            assignment(&[("p1", "1"), ("p2", "x")]),
            assignment(&[("p1", "2"), ("p2", "y")]),
            assignment(&[("p1", "3"), ("p2", "y")]),
        ]
    );
}

#[test]
fn parallel_with_empty_child_never_drops_keys_of_others() {
    let node = SweepNode::parallel(vec![
        SweepNode::list("p1", Vec::<String>::new()),
        SweepNode::list("p2", ["x", "y"]),
    ]);
    let got: Vec<_> = node.enumerate().collect();
    assert_eq!(got, vec![assignment(&[("p2", "x")]), assignment(&[("p2", "y")])]);
}

#[test]
fn combination_later_child_overwrites_colliding_key_in_place() {
    let node = SweepNode::combination(vec![
        SweepNode::list("a", ["1"]),
        SweepNode::list("b", ["2"]),
        SweepNode::list("a", ["3", "4"]),
    ]);
    let got: Vec<_> = node.enumerate().collect();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].job_name(), "a=3-b=2");
    assert_eq!(got[1].job_name(), "a=4-b=2");
}

#[test]
fn nested_trees_compose() {
    let node = SweepNode::combination(vec![
        SweepNode::parallel(vec![
            SweepNode::list("lr", ["0.1", "0.2"]),
            SweepNode::list("decay", ["0.9", "0.8"]),
        ]),
        SweepNode::sequence("layers", "1", "3", "1").expect("sequence"),
    ]);
    let names: Vec<_> = node.enumerate().map(|a| a.job_name()).collect();
    assert_eq!(
        names,
        [
            "lr=0.1-decay=0.9-layers=1",
            "lr=0.1-decay=0.9-layers=2",
            "lr=0.1-decay=0.9-layers=3",
            "lr=0.2-decay=0.8-layers=1",
            "lr=0.2-decay=0.8-layers=2",
            "lr=0.2-decay=0.8-layers=3",
        ]
    );
}

#[test]
fn enumeration_is_restartable() {
    let node = SweepNode::combination(vec![
        SweepNode::list("p1", ["a", "b"]),
        SweepNode::parallel(vec![SweepNode::list("p2", ["x", "y", "z"])]),
    ]);
    let mut first = node.enumerate();
    let head = first.next().expect("first");
    let second: Vec<_> = node.enumerate().collect();
    let rest: Vec<_> = first.collect();
    assert_eq!(second.len(), 6);
    assert_eq!(second[0], head);
    assert_eq!(&second[1..], rest.as_slice());
}

#[test]
fn empty_combination_yields_single_empty_assignment() {
    let node = SweepNode::combination(Vec::new());
    let got: Vec<_> = node.enumerate().collect();
    assert_eq!(got, vec![ParameterAssignment::new()]);
}

#[test]
fn combination_with_empty_child_yields_nothing() {
    let node = SweepNode::combination(vec![
        SweepNode::list("p1", ["a", "b"]),
        SweepNode::list("p2", Vec::<String>::new()),
    ]);
    assert_eq!(node.enumerate().count(), 0);
}

#[test]
fn empty_parallel_yields_nothing() {
    assert_eq!(SweepNode::parallel(Vec::new()).enumerate().count(), 0);
}

#[test]
fn parameters_lists_names_once() {
    let node = SweepNode::combination(vec![
        SweepNode::list("a", ["1"]),
        SweepNode::parallel(vec![SweepNode::list("b", ["1"]), SweepNode::list("a", ["2"])]),
    ]);
    assert_eq!(node.parameters(), ["a", "b"]);
}
