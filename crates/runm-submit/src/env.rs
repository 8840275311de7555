//! Environment contract handed to every launched submit command.

use std::ffi::OsString;
use std::path::Path;

use indexmap::IndexMap;
use runm_sweep::ParameterAssignment;

use crate::config::Config;
use crate::params::value_text;

/// `{config.name}-{jobId}`.
pub const RUN_NAME: &str = "RUNM_RUN_NAME";
/// Absolute run directory.
pub const RUN_DIR: &str = "RUNM_RUN_DIR";
/// Zero-padded run number, multi-run sweeps only.
pub const RUN_NUM: &str = "RUNM_RUN_NUM";
/// Generated seed, fresh submissions only.
pub const RUN_SEED: &str = "RUNM_RUN_SEED";
/// Absolute config file path.
pub const CONFIG_FILE: &str = "RUNM_CONFIG_FILE";
/// Directory of the config file.
pub const CONFIG_DIR: &str = "RUNM_CONFIG_DIR";
/// Constants rendered as argument tokens.
///
/// Rendered from [`Config::constants`], which already holds the entries of
/// `constantsFile` merged over the inline ones, so file constants appear here
/// too.
pub const CONSTANT_ARGS: &str = "RUNM_CONSTANT_ARGS";
/// Sweep values rendered as argument tokens.
pub const SWEEP_ARGS: &str = "RUNM_SWEEP_ARGS";

/// Ordered environment passed to a shell process.
pub type EnvMap = IndexMap<String, String>;

/// Snapshot of the current process environment.
///
/// Variables whose name or value is not valid UTF-8 are left out with a
/// warning rather than handed to children in altered form.
pub fn inherited() -> EnvMap {
    utf8_variables(std::env::vars_os())
}

/// Keeps the UTF-8 pairs of `vars`, warning about every dropped variable.
pub fn utf8_variables<I>(vars: I) -> EnvMap
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                let name = match key {
                    Ok(key) => key,
                    Err(raw) => raw.to_string_lossy().into_owned(),
                };
                tracing::warn!(variable = %name, "skipping environment variable that is not UTF-8");
                None
            }
        })
        .collect()
}

/// Per-run values that only exist on a fresh submission.
#[derive(Debug, Clone, Copy)]
pub struct FreshRun<'a> {
    /// Job identifier.
    pub job_id: &'a str,
    /// Absolute run directory.
    pub run_path: &'a Path,
    /// Run number, set for multi-run sweeps.
    pub run_number: Option<&'a str>,
    /// Generated seed.
    pub seed: &'a str,
    /// Sweep values of the run.
    pub assignment: &'a ParameterAssignment,
}

/// Renders `prefix + name + delimiter + value` tokens joined by spaces.
pub fn render_arguments<'a, I>(prefix: &str, delimiter: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| format!("{prefix}{name}{delimiter}{value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn insert_config_identity(env: &mut EnvMap, config: &Config) {
    env.insert(CONFIG_FILE.into(), config.config_file.display().to_string());
    let config_dir = config
        .config_file
        .parent()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    env.insert(CONFIG_DIR.into(), config_dir);
}

/// Full contract for a newly planned run. `base` is cloned, never shared.
///
/// `RUNM_CONSTANT_ARGS` renders every constant, the constants file included.
pub fn fresh_submission(base: &EnvMap, config: &Config, run: FreshRun<'_>) -> EnvMap {
    let mut env = base.clone();
    env.insert(RUN_NAME.into(), format!("{}-{}", config.name, run.job_id));
    env.insert(RUN_DIR.into(), run.run_path.display().to_string());
    if let Some(run_number) = run.run_number {
        env.insert(RUN_NUM.into(), run_number.to_string());
    }
    env.insert(RUN_SEED.into(), run.seed.to_string());
    insert_config_identity(&mut env, config);
    if config.use_environment_variables {
        for (name, value) in run.assignment {
            env.insert(name.clone(), value.clone());
        }
    }
    env.insert(
        CONSTANT_ARGS.into(),
        render_arguments(
            &config.command_line_argument_prefix,
            &config.command_line_argument_delimiter,
            config
                .constants
                .iter()
                .map(|(name, value)| (name.as_str(), value_text(value))),
        ),
    );
    env.insert(
        SWEEP_ARGS.into(),
        render_arguments(
            &config.command_line_argument_prefix,
            &config.command_line_argument_delimiter,
            run.assignment
                .iter()
                .map(|(name, value)| (name.as_str(), value.clone())),
        ),
    );
    env
}

/// Reduced contract for re-invoking an existing run: no run number, seed, or
/// argument lists are regenerated.
pub fn resubmission(base: &EnvMap, config: &Config, run_dir: &Path) -> EnvMap {
    let mut env = base.clone();
    env.insert(RUN_NAME.into(), format!("{}-rerun", config.name));
    env.insert(RUN_DIR.into(), run_dir.display().to_string());
    insert_config_identity(&mut env, config);
    env
}
