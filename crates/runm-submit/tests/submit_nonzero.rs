mod support;

use runm_submit::{read_status, RunState, RunStatus, StatusTracker};
use runm_sweep::SweepNode;

#[test]
fn nonzero_exit_is_recorded_but_not_fatal() {
    let root = tempfile::tempdir().expect("root");
    let mut config = support::config(
        SweepNode::list("code", ["3", "0"]),
        Some(r#"echo "failing with $code" >&2; exit "$code""#),
    );
    config.use_environment_variables = true;
    let mut engine = support::engine(config);

    let mut out: Vec<u8> = Vec::new();
    let report = engine.submit_into(root.path(), &mut out).expect("submit");
    assert_eq!(report.jobs[0].state, RunState::ResultNonzero(3));
    assert_eq!(report.jobs[1].state, RunState::ResultOk);
    assert_eq!(report.failures().count(), 1);

    let failed = &report.jobs[0].job.run_path;
    assert_eq!(support::read(failed.join("runm_submit_returncode")), "3\n");
    assert!(!report.jobs[1].job.run_path.join("runm_submit_returncode").exists());

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains(
        "Completed submission code=3\nERROR: submission returned nonzero code 3\nfailing with 3\n---\n"
    ));
    assert!(text.ends_with("Submission complete.\n"));
}

#[test]
fn failed_submit_without_hooks_stays_submitted() {
    let root = tempfile::tempdir().expect("root");
    let config = support::config(SweepNode::list("p", ["a"]), Some("exit 7"));
    let mut engine = support::engine(config);
    let report = engine
        .submit_into(root.path(), &mut Vec::<u8>::new())
        .expect("submit");
    let run_path = &report.jobs[0].job.run_path;

    assert_eq!(read_status(run_path).expect("status").status, RunStatus::Submitted);
    let summary = StatusTracker::new(root.path()).scan().expect("scan").summary;
    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.error, 0);
    assert_eq!(summary.total(), 1);
}

#[cfg(unix)]
#[test]
fn signal_kill_reports_negative_signal() {
    let root = tempfile::tempdir().expect("root");
    let config = support::config(SweepNode::list("p", ["a"]), Some("kill -9 $$"));
    let mut engine = support::engine(config);
    let report = engine
        .submit_into(root.path(), &mut Vec::<u8>::new())
        .expect("submit");
    assert_eq!(report.jobs[0].state, RunState::ResultNonzero(-9));
}
