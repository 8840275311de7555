use std::io::Write;
use std::path::Path;

use runm_core::errors::{ErrorInfo, RunmError};

use crate::config::{absolutize, Config};
use crate::env::{self, EnvMap};
use crate::shell::{clear_submit_artifacts, run_submit_command, CommandOutput};
use crate::status::{write_status, StatusRecord};

/// Re-invokes the submit command for an existing run directory using the
/// inherited process environment.
pub fn resubmit(
    config: &Config,
    run_dir: &Path,
    out: &mut dyn Write,
) -> Result<CommandOutput, RunmError> {
    resubmit_with_env(config, run_dir, &env::inherited(), out)
}

/// Re-invokes the submit command synchronously, outside the worker pool.
///
/// The parameter file is left untouched and no seed or run number is
/// regenerated. Previous artifacts are removed and the status record is
/// reset to `SUBMITTED` before launching.
pub fn resubmit_with_env(
    config: &Config,
    run_dir: &Path,
    base_env: &EnvMap,
    out: &mut dyn Write,
) -> Result<CommandOutput, RunmError> {
    let command = config
        .submit_command
        .as_deref()
        .filter(|command| !command.is_empty())
        .ok_or_else(|| {
            RunmError::Config(
                ErrorInfo::new("submit_command", "no submit command configured")
                    .with_hint("set submitCommand in the config"),
            )
        })?;
    let cwd = std::env::current_dir().map_err(|err| RunmError::io("current_dir", ".", err))?;
    let run_dir = absolutize(run_dir, &cwd);
    if !run_dir.is_dir() {
        return Err(RunmError::Io(
            ErrorInfo::new("run_directory_missing", "run directory does not exist")
                .with_path(&run_dir),
        ));
    }

    clear_submit_artifacts(&run_dir)?;
    write_status(&run_dir, &StatusRecord::submitted())?;
    let env = env::resubmission(base_env, config, &run_dir);
    let write_err = |err: std::io::Error| RunmError::io("report_write", &run_dir, err);

    writeln!(out, "Resubmitting {}...", run_dir.display()).map_err(write_err)?;
    tracing::info!(run_dir = %run_dir.display(), "resubmitting run");
    let output = run_submit_command(command, &run_dir, &env)?;
    writeln!(out, "Completed submission {}", run_dir.display()).map_err(write_err)?;
    if !output.success() {
        tracing::warn!(code = output.exit_code, "resubmitted command failed");
        writeln!(
            out,
            "ERROR: submission returned nonzero code {}",
            output.exit_code
        )
        .map_err(write_err)?;
    }
    for captured in [&output.stdout, &output.stderr] {
        if !captured.is_empty() {
            out.write_all(captured).map_err(write_err)?;
            if !captured.ends_with(b"\n") {
                writeln!(out).map_err(write_err)?;
            }
        }
    }
    Ok(output)
}
