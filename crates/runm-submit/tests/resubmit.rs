mod support;

use std::fs;

use runm_core::errors::RunmError;
use runm_submit::{read_status, resubmit_with_env, RunStatus, StatusRecord};
use runm_submit::status::write_status;
use runm_sweep::SweepNode;

#[test]
fn resubmit_resets_status_and_replaces_artifacts() {
    let root = tempfile::tempdir().expect("root");
    let mut config = support::config(SweepNode::list("p", ["a"]), Some("exit 2"));
    config.thread_count = 1;
    let report = support::engine(config.clone())
        .submit_into(root.path(), &mut Vec::<u8>::new())
        .expect("submit");
    let run_path = report.jobs[0].job.run_path.clone();
    let params_before = support::read(run_path.join("parameters.json"));
    assert!(run_path.join("runm_submit_returncode").exists());
    write_status(&run_path, &StatusRecord::error(Some("first try".into()))).expect("status");

    config.submit_command = Some(r#"echo "rerun as $RUNM_RUN_NAME seed=${RUNM_RUN_SEED:-none}""#.into());
    let mut out: Vec<u8> = Vec::new();
    let output = resubmit_with_env(&config, &run_path, &support::base_env(), &mut out)
        .expect("resubmit");

    assert!(output.success());
    assert!(!run_path.join("runm_submit_returncode").exists());
    assert_eq!(
        support::read(run_path.join("runm_submit_stdout")),
        "rerun as demo-rerun seed=none\n"
    );
    assert_eq!(read_status(&run_path).expect("status").status, RunStatus::Submitted);
    assert_eq!(support::read(run_path.join("parameters.json")), params_before);

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("rerun as demo-rerun seed=none\n"));
}

#[test]
fn resubmit_records_nonzero_exit() {
    let run_dir = tempfile::tempdir().expect("run dir");
    let config = support::config(SweepNode::combination(Vec::new()), Some("exit 5"));
    let mut out: Vec<u8> = Vec::new();
    let output = resubmit_with_env(&config, run_dir.path(), &support::base_env(), &mut out)
        .expect("resubmit");
    assert_eq!(output.exit_code, 5);
    assert_eq!(support::read(run_dir.path().join("runm_submit_returncode")), "5\n");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("ERROR: submission returned nonzero code 5\n"));
}

#[test]
fn resubmit_requires_existing_directory_and_command() {
    let root = tempfile::tempdir().expect("root");
    let config = support::config(SweepNode::combination(Vec::new()), Some("true"));
    let err = resubmit_with_env(
        &config,
        &root.path().join("absent"),
        &support::base_env(),
        &mut Vec::<u8>::new(),
    )
    .expect_err("missing dir");
    assert!(matches!(err, RunmError::Io(_)));
    assert!(!root.path().join("absent").exists());

    fs::create_dir(root.path().join("present")).expect("dir");
    let no_command = support::config(SweepNode::combination(Vec::new()), None);
    let err = resubmit_with_env(
        &no_command,
        &root.path().join("present"),
        &support::base_env(),
        &mut Vec::<u8>::new(),
    )
    .expect_err("no command");
    assert!(matches!(err, RunmError::Config(_)));
}
