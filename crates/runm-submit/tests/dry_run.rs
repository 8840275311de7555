mod support;

use runm_submit::{read_status, RunStatus, RunState, ParametersFormat};
use runm_sweep::SweepNode;
use serde_json::Value;

#[test]
fn dry_run_prepares_everything_but_launches_nothing() {
    let root = tempfile::tempdir().expect("root");
    let mut config = support::config(
        SweepNode::list("p", ["a", "b"]),
        Some("touch launched"),
    );
    config.dry = true;
    config.runs = 2;
    let mut engine = support::engine(config);

    let mut out: Vec<u8> = Vec::new();
    let report = engine.submit_into(root.path(), &mut out).expect("submit");
    let ids: Vec<_> = report.jobs.iter().map(|job| job.job.job_id.as_str()).collect();
    assert_eq!(ids, ["p=a-1", "p=a-2", "p=b-1", "p=b-2"]);

    for outcome in &report.jobs {
        let run_path = &outcome.job.run_path;
        assert_eq!(outcome.state, RunState::DirCreated);
        assert_eq!(read_status(run_path).expect("status").status, RunStatus::Submitted);
        assert!(!run_path.join("launched").exists());

        let params: Value =
            serde_json::from_str(&support::read(run_path.join("parameters.json"))).expect("json");
        assert_eq!(params["run"], outcome.job.run_number.as_str());
        assert_eq!(params["randomSeed"], outcome.job.seed.as_str());
    }

    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(
        text,
        "Submitting job p=a-1...\n\
         Submitting job p=a-2...\n\
         Submitting job p=b-1...\n\
         Submitting job p=b-2...\n\
         ---\n\
         Waiting for submission to complete...\n\
         ---\n\
         Submission complete.\n"
    );
}

#[test]
fn dry_run_honors_flat_parameter_format() {
    let root = tempfile::tempdir().expect("root");
    let mut config = support::config(SweepNode::sequence("x", "1", "2", "1").expect("seq"), None);
    config.dry = true;
    config.parameters_filename = "params.csv".into();
    config.parameters_format = ParametersFormat::Csv;
    let mut engine = support::engine(config);

    let report = engine
        .submit_into(root.path(), &mut Vec::<u8>::new())
        .expect("submit");
    let first = &report.jobs[0].job;
    let text = support::read(first.run_path.join("params.csv"));
    let rows: Vec<_> = text.lines().collect();
    assert_eq!(rows, ["run,1".to_string(), format!("randomSeed,{}", first.seed), "x,1".to_string()]);
}

#[test]
fn empty_parallel_submits_nothing() {
    let root = tempfile::tempdir().expect("root");
    let mut config = support::config(SweepNode::parallel(Vec::new()), None);
    config.dry = true;
    let mut engine = support::engine(config);
    let report = engine
        .submit_into(root.path(), &mut Vec::<u8>::new())
        .expect("submit");
    assert!(report.jobs.is_empty());
}
