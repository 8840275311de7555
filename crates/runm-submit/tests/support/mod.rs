#![allow(dead_code)]

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use runm_core::rng::SeedGenerator;
use runm_submit::{Config, EnvMap, SubmissionEngine};
use runm_sweep::SweepNode;

/// Minimal environment for `sh -c` children.
pub fn base_env() -> EnvMap {
    let mut env = EnvMap::new();
    env.insert(
        "PATH".to_string(),
        std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string()),
    );
    env
}

/// Config rooted directly at the submission root, without timestamp folders.
pub fn config(sweep: SweepNode, submit_command: Option<&str>) -> Config {
    Config {
        name: "demo".to_string(),
        submit_command: submit_command.map(str::to_string),
        make_subdirectory: false,
        make_run_directory: false,
        sweep,
        ..Config::default()
    }
}

/// Engine with a deterministic seed source and a clean environment.
pub fn engine(config: Config) -> SubmissionEngine<StdRng> {
    SubmissionEngine::with_seed_source(config, SeedGenerator::from_seed(11))
        .expect("engine")
        .with_base_env(base_env())
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref()).expect("read file")
}
