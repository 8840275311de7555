use runm_core::RunmError;
use runm_sweep::{Decimal, SweepNode};

fn values(from: &str, to: &str, by: &str) -> Vec<String> {
    SweepNode::sequence("x", from, to, by)
        .expect("sequence")
        .enumerate()
        .map(|a| a.get("x").expect("x").to_string())
        .collect()
}

#[test]
fn half_steps_share_one_fractional_digit() {
    assert_eq!(values("0", "1", "0.5"), ["0.0", "0.5", "1.0"]);
}

#[test]
fn integer_sequences_are_zero_padded() {
    let got = values("0", "10", "1");
    assert_eq!(got.len(), 11);
    assert_eq!(got[0], "00");
    assert_eq!(got[9], "09");
    assert_eq!(got[10], "10");
    assert_eq!(values("1", "100", "33"), ["001", "034", "067", "100"]);
}

#[test]
fn upper_bound_is_inclusive_without_drift() {
    assert_eq!(values("0.1", "0.3", "0.1"), ["0.1", "0.2", "0.3"]);
    assert_eq!(values("0", "1", "0.3"), ["0.0", "0.3", "0.6", "0.9"]);
}

#[test]
fn written_trailing_zeros_widen_the_format() {
    assert_eq!(values("0.10", "0.30", "0.10"), ["0.10", "0.20", "0.30"]);
}

#[test]
fn negative_values_keep_sign_inside_width() {
    assert_eq!(values("-1", "1", "0.5"), ["-1.0", "-0.5", "0.0", "0.5", "1.0"]);
    assert_eq!(values("-5", "10", "5"), ["-5", "00", "05", "10"]);
}

#[test]
fn descending_bounds_yield_nothing() {
    assert!(values("5", "1", "1").is_empty());
    assert!(values("5", "1", "-1").is_empty());
}

#[test]
fn exponent_notation_is_accepted() {
    assert_eq!(values("1E1", "12", "1"), ["10", "11", "12"]);
    let d: Decimal = "2.5e-1".parse().expect("decimal");
    assert_eq!(d.to_string(), "0.25");
}

#[test]
fn zero_step_is_rejected() {
    let err = SweepNode::sequence("x", "0", "1", "0").expect_err("zero step");
    assert!(matches!(err, RunmError::Config(ref info) if info.code == "sequence_step_zero"));
}

#[test]
fn nonpositive_step_with_ascending_bounds_is_rejected() {
    let err = SweepNode::sequence("x", "0", "1", "-0.5").expect_err("negative step");
    assert!(matches!(err, RunmError::Config(ref info) if info.code == "sequence_nonterminating"));
}

#[test]
fn garbage_bounds_are_rejected() {
    assert!(matches!(
        SweepNode::sequence("x", "zero", "1", "1"),
        Err(RunmError::Config(_))
    ));
    assert!(matches!(
        SweepNode::sequence("x", "0", "1", "."),
        Err(RunmError::Config(_))
    ));
}

#[test]
fn decimals_compare_across_scales() {
    let a: Decimal = "1.50".parse().expect("a");
    let b: Decimal = "1.5".parse().expect("b");
    let c: Decimal = "1.49".parse().expect("c");
    assert_eq!(a, b);
    assert!(c < a);
    assert_eq!(a.checked_add(&c).expect("sum").to_string(), "2.99");
}
